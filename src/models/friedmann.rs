//! Expansion history of ΛCDM and gDE.
//!
//! The gDE density relative to today is
//!
//! ```text
//! x = 1 - 3γ(λ - 1)·ln(1 + z)
//! Q = sign(x) · |x|^(1/(1 - λ))
//! ```
//!
//! `x` turns negative past the transition redshift and `1/(1 - λ)` is not an
//! integer, so the power is taken of `|x|` and the sign is restored afterwards
//! (sign(0) = +1). ΛCDM is the `Q ≡ 1` case.
//!
//! The expansion rate is
//!
//! ```text
//! H(z) = 100·sqrt(ω_m(1+z)³ + ω_r(1+z)⁴ + (h² - ω_m - ω_r)·Q(z))   [km/s/Mpc]
//! ```
//!
//! evaluated as `H = 100·h·E` with
//! `E² = 1 + Ω_m((1+z)³ - 1) + Ω_r((1+z)⁴ - 1) + Ω_de(Q - 1)`,
//! which is the same polynomial regrouped around today so that `E(0) = 1`
//! holds exactly.

use crate::domain::{Cosmology, Model};
use crate::error::ModelError;

/// Dark-energy density relative to today for gDE, `Q(z, γ, λ)`.
pub fn dark_energy_ratio(z: f64, gamma: f64, lambda: f64) -> Result<f64, ModelError> {
    check_redshift(z)?;
    Model::gde(gamma, lambda)?;
    Ok(DarkEnergy::new(Model::Gde { gamma, lambda }).ratio(z))
}

pub(crate) fn check_redshift(z: f64) -> Result<(), ModelError> {
    if z.is_nan() || z <= -1.0 {
        return Err(ModelError::RedshiftOutOfDomain { z });
    }
    Ok(())
}

/// `sign(x)·|x|^y` with sign(0) = +1.
fn signed_pow(x: f64, y: f64) -> f64 {
    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    sign * x.abs().powf(y)
}

/// Shape of the dark-energy density, with the exponent precomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DarkEnergy {
    Constant,
    Gde {
        /// ψ = 3γ(λ - 1)
        psi: f64,
        /// 1/(1 - λ)
        exponent: f64,
    },
}

impl DarkEnergy {
    /// Assumes a validated model.
    fn new(model: Model) -> Self {
        match model {
            Model::Lcdm => DarkEnergy::Constant,
            Model::Gde { gamma, lambda } => DarkEnergy::Gde {
                psi: 3.0 * gamma * (lambda - 1.0),
                exponent: 1.0 / (1.0 - lambda),
            },
        }
    }

    fn ratio(self, z: f64) -> f64 {
        match self {
            DarkEnergy::Constant => 1.0,
            DarkEnergy::Gde { psi, exponent } => signed_pow(1.0 - psi * z.ln_1p(), exponent),
        }
    }
}

/// Which physical integral an integrand feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// `c / H(z)`: comoving distance, in Mpc per unit redshift.
    Comoving,
    /// `c_s(z) / H(z)`: sound horizon.
    SoundSpeed,
    /// `100 / H(z)`: dimensionless distance in units of `c/100` Mpc.
    InverseHubble,
}

/// Expansion rate for a fixed `(model, h)` on a given cosmology.
///
/// Construction validates the inputs; evaluation is infallible and returns
/// NaN where the model is unphysical (`E² < 0`), which the integrator reports
/// as a non-finite integrand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Friedmann {
    h: f64,
    /// Ω_m = ω_m / h²
    omega_m: f64,
    /// Ω_r = ω_r / h²
    omega_r: f64,
    /// Ω_de = 1 - Ω_m - Ω_r
    omega_de: f64,
    dark_energy: DarkEnergy,
    speed_of_light: f64,
    /// 3ω_b / (4ω_γ), so that R(z) = baryon_photon / (1 + z).
    baryon_photon: f64,
}

impl Friedmann {
    pub fn new(cosmo: &Cosmology, model: Model, h: f64) -> Result<Self, ModelError> {
        model.validate()?;
        if !(h.is_finite() && h > 0.0) {
            return Err(ModelError::NonFiniteParameter { name: "h", value: h });
        }

        let h2 = h * h;
        let omega_m = cosmo.omega_m() / h2;
        let omega_r = cosmo.omega_r() / h2;
        Ok(Self {
            h,
            omega_m,
            omega_r,
            omega_de: 1.0 - omega_m - omega_r,
            dark_energy: DarkEnergy::new(model),
            speed_of_light: cosmo.speed_of_light(),
            baryon_photon: 3.0 * cosmo.omega_b() / (4.0 * cosmo.omega_gamma()),
        })
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    /// Q(z) for gDE, 1 for ΛCDM.
    pub fn dark_energy_ratio(&self, z: f64) -> f64 {
        self.dark_energy.ratio(z)
    }

    /// E²(z) = (H(z)/H0)².
    pub fn e_squared(&self, z: f64) -> f64 {
        let a3 = (1.0 + z).powi(3);
        let a4 = (1.0 + z).powi(4);
        1.0 + self.omega_m * (a3 - 1.0)
            + self.omega_r * (a4 - 1.0)
            + self.omega_de * (self.dark_energy.ratio(z) - 1.0)
    }

    /// E(z) = H(z)/H0.
    pub fn expansion_rate(&self, z: f64) -> f64 {
        self.e_squared(z).sqrt()
    }

    /// H(z) in km/s/Mpc.
    pub fn hubble(&self, z: f64) -> f64 {
        100.0 * self.h * self.expansion_rate(z)
    }

    /// Photon-baryon sound speed c_s(z) = c / sqrt(3(1 + R)), R = 3ω_b / (4ω_γ(1+z)).
    pub fn sound_speed(&self, z: f64) -> f64 {
        let r = self.baryon_photon / (1.0 + z);
        self.speed_of_light / (3.0 * (1.0 + r)).sqrt()
    }

    /// Build the integrand for one of the distance/horizon integrals.
    pub fn integrand(self, weighting: Weighting) -> impl Fn(f64) -> f64 {
        move |z| {
            let hz = self.hubble(z);
            match weighting {
                Weighting::Comoving => self.speed_of_light / hz,
                Weighting::SoundSpeed => self.sound_speed(z) / hz,
                Weighting::InverseHubble => 100.0 / hz,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosmo() -> Cosmology {
        Cosmology::planck2018().unwrap()
    }

    #[test]
    fn q_is_one_without_coupling() {
        for &lambda in &[-24.0, -4.0, 0.5, 3.0] {
            for &z in &[0.0, 0.5, 2.0, 1089.0] {
                let q = dark_energy_ratio(z, 0.0, lambda).unwrap();
                assert_eq!(q, 1.0, "z={z}, lambda={lambda}");
            }
        }
    }

    #[test]
    fn q_is_normalized_today() {
        for &(gamma, lambda) in &[(-0.015, -24.0), (-0.001, -4.0), (-0.02, -12.0), (0.3, 0.2)] {
            assert_eq!(dark_energy_ratio(0.0, gamma, lambda).unwrap(), 1.0);
        }
    }

    #[test]
    fn q_keeps_sign_of_negative_base() {
        // ψ = 3·(-0.015)·(-25) = 1.125; x = 1 - 1.125·ln(1+z) < 0 for z > e^{1/1.125} - 1 ≈ 1.43.
        let (gamma, lambda) = (-0.015, -24.0);
        let z = 5.0;
        let x: f64 = 1.0 - 1.125 * 6.0_f64.ln();
        let expected = -(x.abs().powf(1.0 / 25.0));
        let q = dark_energy_ratio(z, gamma, lambda).unwrap();
        assert!(q < 0.0);
        assert!((q - expected).abs() < 1e-14, "q={q}, expected={expected}");
    }

    #[test]
    fn q_rejects_domain_violations() {
        assert_eq!(dark_energy_ratio(0.5, -0.01, 1.0), Err(ModelError::SingularExponent));
        assert!(matches!(
            dark_energy_ratio(-1.0, -0.01, -4.0),
            Err(ModelError::RedshiftOutOfDomain { .. })
        ));
        assert!(matches!(
            dark_energy_ratio(f64::NAN, -0.01, -4.0),
            Err(ModelError::RedshiftOutOfDomain { .. })
        ));
    }

    #[test]
    fn sign_of_zero_base_is_positive() {
        assert_eq!(signed_pow(0.0, 0.04), 0.0);
        assert!(signed_pow(0.0, 0.04).is_sign_positive());
        assert!(signed_pow(-0.0, 0.04).is_sign_positive());
    }

    #[test]
    fn expansion_is_one_today() {
        let c = cosmo();
        for model in [Model::Lcdm, Model::Gde { gamma: -0.015, lambda: -24.0 }] {
            for &h in &[0.5, 0.6736, 0.9] {
                let f = Friedmann::new(&c, model, h).unwrap();
                assert_eq!(f.expansion_rate(0.0), 1.0);
                assert_eq!(f.hubble(0.0), 100.0 * h);
            }
        }
    }

    #[test]
    fn matches_physical_density_form() {
        // E-form and the ω-form of H(z) agree.
        let c = cosmo();
        let (gamma, lambda, h) = (-0.012, -16.0, 0.7);
        let f = Friedmann::new(&c, Model::Gde { gamma, lambda }, h).unwrap();
        for &z in &[0.3, 1.0, 3.0, 20.0] {
            let q = dark_energy_ratio(z, gamma, lambda).unwrap();
            let (wm, wr) = (c.omega_m(), c.omega_r());
            let direct = 100.0
                * (wm * (1.0 + z).powi(3) + wr * (1.0 + z).powi(4) + (h * h - wm - wr) * q).sqrt();
            let rel = (f.hubble(z) - direct).abs() / direct;
            assert!(rel < 1e-12, "z={z}: {} vs {direct}", f.hubble(z));
        }
    }

    #[test]
    fn sound_speed_approaches_relativistic_limit() {
        let c = cosmo();
        let f = Friedmann::new(&c, Model::Lcdm, 0.67).unwrap();
        let limit = crate::domain::SPEED_OF_LIGHT / 3.0_f64.sqrt();
        for z in [1e3, 1e6, 1e9] {
            let r = 3.0 * c.omega_b() / (4.0 * c.omega_gamma() * (1.0 + z));
            let closed = crate::domain::SPEED_OF_LIGHT / (3.0 * (1.0 + r)).sqrt();
            assert!((f.sound_speed(z) - closed).abs() <= 1e-12 * limit, "z={z}");
        }
        // R ~ 7e-7 at z = 1e9, so c_s sits ~R/2 below c/sqrt(3).
        let cs = f.sound_speed(1e9);
        assert!(cs < limit && (limit - cs) / limit < 1e-6, "c_s = {cs}");
        assert!(f.sound_speed(1000.0) < cs);
    }

    #[test]
    fn invalid_h_is_rejected() {
        assert!(Friedmann::new(&cosmo(), Model::Lcdm, 0.0).is_err());
        assert!(Friedmann::new(&cosmo(), Model::Lcdm, f64::NAN).is_err());
    }
}
