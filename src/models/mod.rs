//! Background cosmology: the gDE density ratio, the Friedmann equation, and
//! the closed-form redshift fits.
//!
//! Everything here is a pure function of its inputs so that the calibrator and
//! the sweep code can call it from any thread.

pub mod friedmann;
pub mod redshift;

pub use friedmann::*;
pub use redshift::*;
