//! `gde-curves` library crate.
//!
//! The binary (`gde`) is a thin wrapper around this library so that:
//!
//! - the calibration and sweep logic is testable without spawning processes
//! - the numerical core (`math`, `models`, `observables`) can be reused from
//!   other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod observables;
pub mod plot;
pub mod report;
pub mod telemetry;
