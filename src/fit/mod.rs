//! H0 calibration and parameter sweeps.
//!
//! Responsibilities:
//!
//! - calibrate H0 for one `(constants, model)` pair by bisection
//! - memoize calibrations across workers
//! - build redshift and parameter grids
//! - evaluate sweeps over `(γ, λ)` in parallel

pub mod cache;
pub mod calibrate;
pub mod grid;
pub mod sweep;

pub use cache::*;
pub use calibrate::*;
pub use grid::*;
pub use sweep::*;
