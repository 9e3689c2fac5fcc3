//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - cosmological inputs and their validated form (`CosmologicalConstants`, `Cosmology`)
//! - model selection (`Model`) and calibration outputs (`Calibration`)
//! - sampled outputs (`DerivedCurve`, `CurveFile`) and run configuration

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::*;
