//! Numerical building blocks: adaptive quadrature and bracketed bisection.

pub mod bisect;
pub mod quad;

pub use bisect::*;
pub use quad::*;
