//! Cosmological input parameters.
//!
//! A [`CosmologicalConstants`] value is plain, serializable configuration.
//! [`Cosmology`] is the validated form used by every computation: it is built
//! once per constant set and carries the derived redshift markers (z*, z_d),
//! so nothing depends on process-wide state and several constant sets can be
//! used side by side.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::models::redshift::{z_drag, z_star};

/// Speed of light in km/s.
pub const SPEED_OF_LIGHT: f64 = 299_792.458;

/// Effective number of relativistic neutrino species.
pub const N_EFF_STANDARD: f64 = 3.046;

/// Physical photon density ω_γ for T_CMB = 2.7255 K.
pub const OMEGA_GAMMA: f64 = 2.469e-5;

/// What the H0 calibrator matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationTarget {
    /// Acoustic angle `θ = r_s(z*) / D_M(z*)`.
    AcousticAngle { theta: f64 },
    /// Comoving distance to `z_rec` fixed by `r* / θ*`.
    ///
    /// The statistic is `∫₀^{z_rec} dz / (H/100)`, compared with
    /// `100·r* / (c·θ*)`.
    AngularDistance { r_star: f64, theta_star: f64, z_rec: f64 },
}

/// Fixed inputs of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosmologicalConstants {
    pub label: String,
    /// Physical baryon density ω_b = Ω_b h².
    pub omega_b: f64,
    /// Physical cold dark matter density ω_c.
    pub omega_c: f64,
    /// Physical photon density ω_γ.
    pub omega_gamma: f64,
    pub n_eff: f64,
    /// Speed of light (km/s).
    pub speed_of_light: f64,
    pub target: CalibrationTarget,
    /// Absolute tolerance on the calibration statistic.
    pub tolerance: f64,
    /// Search bracket for the reduced Hubble parameter h = H0 / 100.
    pub h_bracket: [f64; 2],
    pub max_iterations: usize,
}

impl CosmologicalConstants {
    /// Planck 2018 Plik best fit (TT,TE,EE+lowE), calibrated on the acoustic angle.
    pub fn planck2018() -> Self {
        Self {
            label: "planck2018".to_string(),
            omega_b: 0.022383,
            omega_c: 0.12011,
            omega_gamma: OMEGA_GAMMA,
            n_eff: N_EFF_STANDARD,
            speed_of_light: SPEED_OF_LIGHT,
            target: CalibrationTarget::AcousticAngle { theta: 0.01040909 },
            tolerance: 1e-8,
            h_bracket: [0.4, 1.0],
            max_iterations: 100,
        }
    }

    /// Compressed CMB distance prior: ω_m = 0.1430, r* = 144.43 Mpc, 100θ* = 1.04110.
    pub fn compressed() -> Self {
        Self {
            label: "compressed".to_string(),
            omega_b: 0.022383,
            omega_c: 0.1430 - 0.022383,
            omega_gamma: OMEGA_GAMMA,
            n_eff: N_EFF_STANDARD,
            speed_of_light: SPEED_OF_LIGHT,
            target: CalibrationTarget::AngularDistance {
                r_star: 144.43,
                theta_star: 0.0104110,
                z_rec: 1089.92,
            },
            tolerance: 1e-6,
            h_bracket: [0.4, 0.9],
            max_iterations: 100,
        }
    }

    /// ω_m = ω_b + ω_c.
    pub fn omega_m(&self) -> f64 {
        self.omega_b + self.omega_c
    }

    /// Massless neutrino density ω_ν = ω_γ · (7/8)(4/11)^(4/3) · N_eff.
    pub fn omega_nu(&self) -> f64 {
        self.omega_gamma * (7.0 / 8.0) * (4.0_f64 / 11.0).powf(4.0 / 3.0) * self.n_eff
    }

    /// ω_r = ω_γ + ω_ν.
    pub fn omega_r(&self) -> f64 {
        self.omega_gamma + self.omega_nu()
    }

    /// Target value of the calibration statistic.
    pub fn target_value(&self) -> f64 {
        match self.target {
            CalibrationTarget::AcousticAngle { theta } => theta,
            CalibrationTarget::AngularDistance { r_star, theta_star, .. } => {
                100.0 * r_star / (self.speed_of_light * theta_star)
            }
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let positive = [
            ("omega_b", self.omega_b),
            ("omega_c", self.omega_c),
            ("omega_gamma", self.omega_gamma),
            ("speed_of_light", self.speed_of_light),
            ("tolerance", self.tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ModelError::InvalidConstants(format!("{name} must be finite and > 0, got {value}")));
            }
        }
        if !(self.n_eff.is_finite() && self.n_eff >= 0.0) {
            return Err(ModelError::InvalidConstants(format!(
                "n_eff must be finite and >= 0, got {}",
                self.n_eff
            )));
        }

        let [lo, hi] = self.h_bracket;
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && hi > lo) {
            return Err(ModelError::InvalidConstants(format!(
                "h_bracket must satisfy 0 < lo < hi, got [{lo}, {hi}]"
            )));
        }
        if self.max_iterations == 0 {
            return Err(ModelError::InvalidConstants("max_iterations must be >= 1".to_string()));
        }

        match self.target {
            CalibrationTarget::AcousticAngle { theta } => {
                if !(theta.is_finite() && theta > 0.0) {
                    return Err(ModelError::InvalidConstants(format!("theta must be > 0, got {theta}")));
                }
            }
            CalibrationTarget::AngularDistance { r_star, theta_star, z_rec } => {
                if !(r_star > 0.0 && theta_star > 0.0 && z_rec > 0.0)
                    || !(r_star.is_finite() && theta_star.is_finite() && z_rec.is_finite())
                {
                    return Err(ModelError::InvalidConstants(format!(
                        "angular distance target needs r_star, theta_star, z_rec > 0, got ({r_star}, {theta_star}, {z_rec})"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for CosmologicalConstants {
    fn default() -> Self {
        Self::planck2018()
    }
}

/// Redshifts of last scattering and baryon drag for one constant set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RedshiftMarkers {
    pub z_star: f64,
    pub z_drag: f64,
}

/// Validated constants plus everything derived from them once.
#[derive(Debug, Clone, PartialEq)]
pub struct Cosmology {
    constants: CosmologicalConstants,
    markers: RedshiftMarkers,
    omega_m: f64,
    omega_r: f64,
    fingerprint: u64,
}

impl Cosmology {
    pub fn new(constants: CosmologicalConstants) -> Result<Self, ModelError> {
        constants.validate()?;

        let omega_m = constants.omega_m();
        let omega_r = constants.omega_r();
        let markers = RedshiftMarkers {
            z_star: z_star(constants.omega_b, omega_m),
            z_drag: z_drag(constants.omega_b, omega_m),
        };
        if !(markers.z_star.is_finite() && markers.z_drag.is_finite()) {
            return Err(ModelError::InvalidConstants(format!(
                "redshift fits are not finite: z* = {}, z_d = {}",
                markers.z_star, markers.z_drag
            )));
        }

        let fingerprint = fingerprint(&constants);
        tracing::debug!(
            label = %constants.label,
            z_star = markers.z_star,
            z_drag = markers.z_drag,
            omega_m,
            omega_r,
            "cosmology ready"
        );

        Ok(Self {
            constants,
            markers,
            omega_m,
            omega_r,
            fingerprint,
        })
    }

    pub fn planck2018() -> Result<Self, ModelError> {
        Self::new(CosmologicalConstants::planck2018())
    }

    pub fn constants(&self) -> &CosmologicalConstants {
        &self.constants
    }

    pub fn markers(&self) -> RedshiftMarkers {
        self.markers
    }

    pub fn omega_b(&self) -> f64 {
        self.constants.omega_b
    }

    pub fn omega_gamma(&self) -> f64 {
        self.constants.omega_gamma
    }

    pub fn omega_m(&self) -> f64 {
        self.omega_m
    }

    pub fn omega_r(&self) -> f64 {
        self.omega_r
    }

    pub fn speed_of_light(&self) -> f64 {
        self.constants.speed_of_light
    }

    /// Hash of every numeric input; equal constant sets share cache entries.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

fn fingerprint(c: &CosmologicalConstants) -> u64 {
    let mut hasher = DefaultHasher::new();
    let mut bits = vec![
        c.omega_b,
        c.omega_c,
        c.omega_gamma,
        c.n_eff,
        c.speed_of_light,
        c.tolerance,
        c.h_bracket[0],
        c.h_bracket[1],
    ];
    match c.target {
        CalibrationTarget::AcousticAngle { theta } => bits.push(theta),
        CalibrationTarget::AngularDistance { r_star, theta_star, z_rec } => {
            bits.extend([r_star, theta_star, z_rec]);
        }
    }
    for v in bits {
        v.to_bits().hash(&mut hasher);
    }
    c.max_iterations.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radiation_density_includes_neutrinos() {
        let c = CosmologicalConstants::planck2018();
        // 2.469e-5 · (1 + 0.2271 · 3.046) ≈ 4.177e-5
        assert!((c.omega_r() - 4.177e-5).abs() < 2e-8, "got {}", c.omega_r());
        assert!((c.omega_m() - 0.142493).abs() < 1e-12);
    }

    #[test]
    fn compressed_target_is_dimensionless_distance() {
        let c = CosmologicalConstants::compressed();
        assert!((c.omega_m() - 0.1430).abs() < 1e-12);
        let expected = 100.0 * 144.43 / (SPEED_OF_LIGHT * 0.0104110);
        assert_eq!(c.target_value(), expected);
    }

    #[test]
    fn invalid_constants_are_rejected() {
        let mut c = CosmologicalConstants::planck2018();
        c.omega_b = -0.02;
        assert!(matches!(Cosmology::new(c), Err(ModelError::InvalidConstants(_))));

        let mut c = CosmologicalConstants::planck2018();
        c.h_bracket = [1.0, 0.4];
        assert!(Cosmology::new(c).is_err());
    }

    #[test]
    fn fingerprint_tracks_numeric_inputs_only() {
        let a = Cosmology::new(CosmologicalConstants::planck2018()).unwrap();
        let mut renamed = CosmologicalConstants::planck2018();
        renamed.label = "other".to_string();
        let b = Cosmology::new(renamed).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = Cosmology::new(CosmologicalConstants::compressed()).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn constants_round_trip_through_json() {
        let c = CosmologicalConstants::compressed();
        let text = serde_json::to_string(&c).unwrap();
        assert!(text.contains("\"kind\":\"angular_distance\""));
        let back: CosmologicalConstants = serde_json::from_str(&text).unwrap();
        assert_eq!(back.label, c.label);
        assert_eq!(back.max_iterations, c.max_iterations);
        assert!((back.omega_c - c.omega_c).abs() < 1e-15);
        assert!((back.target_value() - c.target_value()).abs() < 1e-12);
    }
}
