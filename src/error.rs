//! Error types.
//!
//! The numerical core reports failures through [`ModelError`], which keeps the
//! three failure families apart:
//!
//! - domain violations (`λ = 1`, `z ≤ -1`, invalid constants)
//! - integration failures ([`IntegrationError`])
//! - calibration failures ([`CalibrationError`])
//!
//! The binary converts everything into [`AppError`], which only carries a
//! process exit code and a message.

use thiserror::Error;

pub use crate::math::bisect::CalibrationError;
pub use crate::math::quad::IntegrationError;

/// Failure of a single model evaluation.
///
/// Errors are local to one parameter set: a sweep over many `(γ, λ)` tuples
/// stores them per point and keeps going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("lambda = 1 makes the dark-energy exponent 1/(1 - lambda) singular")]
    SingularExponent,

    #[error("redshift z = {z} is outside the physical domain z > -1")]
    RedshiftOutOfDomain { z: f64 },

    #[error("non-finite parameter {name} = {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },

    #[error("invalid cosmological constants: {0}")]
    InvalidConstants(String),

    #[error("transition redshift undefined for 3*gamma*(lambda - 1) = {psi}")]
    NoTransition { psi: f64 },

    #[error("equation of state diverges at z = {z} (dark-energy density crosses zero)")]
    Pole { z: f64 },

    #[error("{quantity} requires z > 0, got z = {z}")]
    NonPositiveRedshift { quantity: &'static str, z: f64 },

    #[error(transparent)]
    Integration(#[from] IntegrationError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

impl ModelError {
    /// Whether the error comes from invalid inputs rather than numerics.
    pub fn is_domain_error(&self) -> bool {
        !matches!(self, ModelError::Integration(_) | ModelError::Calibration(_))
    }
}

/// Process-level error: exit code + message.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        let code = if err.is_domain_error() { 2 } else { 4 };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
