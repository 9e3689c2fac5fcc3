//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - passed by value through the numerical core
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Which cosmological model to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Model {
    /// Cosmological-constant dark energy.
    Lcdm,
    /// Generalized dark energy with coupling `gamma` and exponent `lambda`.
    ///
    /// The analysed region is `gamma < 0`, `lambda < 0`. `lambda = 1` is
    /// singular and rejected by [`Model::validate`].
    Gde { gamma: f64, lambda: f64 },
}

impl Model {
    /// Build a validated gDE model.
    pub fn gde(gamma: f64, lambda: f64) -> Result<Self, ModelError> {
        let model = Model::Gde { gamma, lambda };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match *self {
            Model::Lcdm => Ok(()),
            Model::Gde { gamma, lambda } => {
                if !gamma.is_finite() {
                    return Err(ModelError::NonFiniteParameter { name: "gamma", value: gamma });
                }
                if !lambda.is_finite() {
                    return Err(ModelError::NonFiniteParameter { name: "lambda", value: lambda });
                }
                if lambda == 1.0 {
                    return Err(ModelError::SingularExponent);
                }
                Ok(())
            }
        }
    }

    /// Human-readable label for terminal output and legends.
    pub fn label(&self) -> String {
        match *self {
            Model::Lcdm => "LCDM".to_string(),
            Model::Gde { gamma, lambda } => format!("gDE(gamma={gamma}, lambda={lambda})"),
        }
    }

    /// Bit-exact key, used to memoize calibrations.
    pub fn key(&self) -> ModelKey {
        match *self {
            Model::Lcdm => ModelKey::Lcdm,
            Model::Gde { gamma, lambda } => ModelKey::Gde(gamma.to_bits(), lambda.to_bits()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKey {
    Lcdm,
    Gde(u64, u64),
}

/// A calibrated Hubble constant for one `(constants, model)` pair.
///
/// Derived functions take `h` from here instead of re-running the calibrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub model: Model,
    /// Reduced Hubble parameter h = H0 / (100 km/s/Mpc).
    pub h: f64,
    /// `T_true - T(h)` for the calibration statistic.
    pub residual: f64,
    pub iterations: usize,
    /// `false` when the iteration budget ran out before the tolerance was met.
    pub converged: bool,
}

impl Calibration {
    /// H0 in km/s/Mpc.
    pub fn hubble_constant(&self) -> f64 {
        100.0 * self.h
    }
}

/// A redshift-dependent quantity that can be sampled into a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Quantity {
    /// H(z) in km/s/Mpc.
    Hubble,
    /// E(z) = H(z)/H0.
    Expansion,
    /// Comoving distance D_M(z) in Mpc.
    ComovingDistance,
    /// Hubble distance D_H(z) = c/H(z) in Mpc.
    HubbleDistance,
    /// Volume-averaged distance D_V(z) in Mpc.
    VolumeDistance,
    /// Distance modulus μ(z) in mag.
    DistanceModulus,
    /// Dark-energy equation of state w(z).
    EquationOfState,
    /// Dark-energy density relative to today, Q(z).
    DarkEnergyRatio,
    /// H(z)/(1+z) in km/s/Mpc.
    BaoHubble,
    /// c·ln(1+z)/D_M(z) in km/s/Mpc.
    BaoDistance,
}

impl Quantity {
    pub fn display_name(self) -> &'static str {
        match self {
            Quantity::Hubble => "H(z)",
            Quantity::Expansion => "E(z)",
            Quantity::ComovingDistance => "D_M(z)",
            Quantity::HubbleDistance => "D_H(z)",
            Quantity::VolumeDistance => "D_V(z)",
            Quantity::DistanceModulus => "mu(z)",
            Quantity::EquationOfState => "w(z)",
            Quantity::DarkEnergyRatio => "Q(z)",
            Quantity::BaoHubble => "H(z)/(1+z)",
            Quantity::BaoDistance => "c ln(1+z)/D_M(z)",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Quantity::Hubble | Quantity::BaoHubble | Quantity::BaoDistance => "km/s/Mpc",
            Quantity::ComovingDistance | Quantity::HubbleDistance | Quantity::VolumeDistance => "Mpc",
            Quantity::DistanceModulus => "mag",
            Quantity::Expansion | Quantity::EquationOfState | Quantity::DarkEnergyRatio => "",
        }
    }

    /// Whether the quantity is undefined at z = 0 (0/0 or log of zero distance).
    pub fn needs_positive_z(self) -> bool {
        matches!(
            self,
            Quantity::VolumeDistance | Quantity::DistanceModulus | Quantity::BaoDistance
        )
    }
}

/// A scalar evaluated per `(γ, λ)` point in parameter sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GridQuantity {
    /// Calibrated H0 in km/s/Mpc.
    HubbleConstant,
    /// Ω_m0 = ω_m / h².
    MatterDensity,
    /// Transition redshift z†.
    TransitionRedshift,
    /// w(z = 0).
    EquationOfStateToday,
}

impl GridQuantity {
    pub fn display_name(self) -> &'static str {
        match self {
            GridQuantity::HubbleConstant => "H0 [km/s/Mpc]",
            GridQuantity::MatterDensity => "Omega_m0",
            GridQuantity::TransitionRedshift => "z_dagger",
            GridQuantity::EquationOfStateToday => "w0",
        }
    }

    /// Whether evaluating the quantity requires a calibrated H0.
    pub fn needs_calibration(self) -> bool {
        matches!(self, GridQuantity::HubbleConstant | GridQuantity::MatterDensity)
    }
}

/// Ordered `(z, value)` samples of one quantity for one calibrated model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedCurve {
    pub model: Model,
    pub label: String,
    pub quantity: Quantity,
    /// Reduced Hubble parameter the curve was evaluated with.
    pub h: f64,
    pub points: Vec<(f64, f64)>,
}

/// One supernova from a Pantheon light-curve parameter table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupernovaPoint {
    pub name: String,
    /// CMB-frame redshift.
    pub z: f64,
    /// Apparent B-band peak magnitude.
    pub mb: f64,
    pub mb_err: f64,
}

/// Absolute magnitude implied by one supernova, `M_B = m_b - μ(z)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeResidual {
    pub name: String,
    pub z: f64,
    pub absolute_magnitude: f64,
    pub error: f64,
}

/// A saved set of curves (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub constants: String,
    pub curves: Vec<DerivedCurve>,
}

/// Output options shared by the commands that produce curves.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub export_svg: Option<PathBuf>,
}

/// A curve run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub models: Vec<Model>,
    pub quantity: Quantity,
    pub z_min: f64,
    pub z_max: f64,
    pub z_step: f64,
    /// Sample redshift logarithmically with this many points instead of `z_step`.
    pub log_points: Option<usize>,
    pub output: OutputConfig,
}
