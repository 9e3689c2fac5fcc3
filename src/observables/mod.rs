//! Derived physical functions.
//!
//! Every function takes the cosmology, the model, and an already calibrated
//! reduced Hubble parameter `h`. None of them run the calibrator: callers
//! calibrate once (see [`crate::fit::find_h0`] / [`crate::fit::CalibrationCache`])
//! and pass `h` to as many evaluations as they need.
//!
//! Distances are in Mpc, rates in km/s/Mpc.

use crate::domain::{Cosmology, Model, Quantity};
use crate::error::ModelError;
use crate::math::{QuadOptions, integrate};
use crate::models::friedmann::check_redshift;
use crate::models::{Friedmann, Weighting};

pub mod curve;

pub use curve::*;

fn friedmann(cosmo: &Cosmology, model: Model, h: f64, z: f64) -> Result<Friedmann, ModelError> {
    check_redshift(z)?;
    Friedmann::new(cosmo, model, h)
}

fn require_positive(quantity: &'static str, z: f64) -> Result<(), ModelError> {
    if z > 0.0 {
        Ok(())
    } else {
        Err(ModelError::NonPositiveRedshift { quantity, z })
    }
}

/// H(z) in km/s/Mpc.
pub fn hubble(cosmo: &Cosmology, model: Model, h: f64, z: f64) -> Result<f64, ModelError> {
    Ok(friedmann(cosmo, model, h, z)?.hubble(z))
}

/// E(z) = H(z)/H0.
pub fn expansion_rate(cosmo: &Cosmology, model: Model, h: f64, z: f64) -> Result<f64, ModelError> {
    Ok(friedmann(cosmo, model, h, z)?.expansion_rate(z))
}

/// Comoving distance D_M(z) = c ∫₀^z dz'/H(z').
pub fn comoving_distance(cosmo: &Cosmology, model: Model, h: f64, z: f64) -> Result<f64, ModelError> {
    let f = friedmann(cosmo, model, h, z)?;
    let q = integrate(f.integrand(Weighting::Comoving), 0.0, z, &QuadOptions::default())?;
    Ok(q.value)
}

/// Hubble distance D_H(z) = c/H(z).
pub fn hubble_distance(cosmo: &Cosmology, model: Model, h: f64, z: f64) -> Result<f64, ModelError> {
    Ok(cosmo.speed_of_light() / hubble(cosmo, model, h, z)?)
}

/// Volume-averaged distance D_V(z) = (z·D_M²·D_H)^(1/3).
pub fn volume_distance(cosmo: &Cosmology, model: Model, h: f64, z: f64) -> Result<f64, ModelError> {
    require_positive("volume distance", z)?;
    let dm = comoving_distance(cosmo, model, h, z)?;
    let dh = hubble_distance(cosmo, model, h, z)?;
    Ok((z * dm * dm * dh).cbrt())
}

/// Distance modulus μ(z) = 5·log10(D_L / Mpc) + 25 with D_L = (1+z)·D_M.
pub fn distance_modulus(cosmo: &Cosmology, model: Model, h: f64, z: f64) -> Result<f64, ModelError> {
    require_positive("distance modulus", z)?;
    let dl = (1.0 + z) * comoving_distance(cosmo, model, h, z)?;
    Ok(5.0 * dl.log10() + 25.0)
}

/// Sound horizon ∫_{z_from}^∞ c_s(z)/H(z) dz.
pub fn sound_horizon(cosmo: &Cosmology, model: Model, h: f64, z_from: f64) -> Result<f64, ModelError> {
    let f = friedmann(cosmo, model, h, z_from)?;
    let q = integrate(
        f.integrand(Weighting::SoundSpeed),
        z_from,
        f64::INFINITY,
        &QuadOptions::default(),
    )?;
    Ok(q.value)
}

/// r_s(z*), the sound horizon at last scattering.
pub fn sound_horizon_star(cosmo: &Cosmology, model: Model, h: f64) -> Result<f64, ModelError> {
    sound_horizon(cosmo, model, h, cosmo.markers().z_star)
}

/// r_d = r_s(z_d), the sound horizon at the drag epoch.
pub fn sound_horizon_drag(cosmo: &Cosmology, model: Model, h: f64) -> Result<f64, ModelError> {
    sound_horizon(cosmo, model, h, cosmo.markers().z_drag)
}

/// BAO comparison quantity H(z)/(1+z).
pub fn bao_hubble(cosmo: &Cosmology, model: Model, h: f64, z: f64) -> Result<f64, ModelError> {
    Ok(hubble(cosmo, model, h, z)? / (1.0 + z))
}

/// BAO comparison quantity c·ln(1+z)/D_M(z).
pub fn bao_distance(cosmo: &Cosmology, model: Model, h: f64, z: f64) -> Result<f64, ModelError> {
    require_positive("BAO distance", z)?;
    let dm = comoving_distance(cosmo, model, h, z)?;
    Ok(cosmo.speed_of_light() * z.ln_1p() / dm)
}

/// |x| below which w(z) is reported as divergent.
const POLE_TOLERANCE: f64 = 1e-12;

/// Dark-energy equation of state w(z).
///
/// For gDE, `w = -1 + γ/x` with `x = 1 - 3γ(λ - 1)·ln(1+z)`, so `w` has a pole
/// where the density crosses zero (z = z†). ΛCDM is `w = -1`.
pub fn equation_of_state(model: Model, z: f64) -> Result<f64, ModelError> {
    check_redshift(z)?;
    model.validate()?;
    match model {
        Model::Lcdm => Ok(-1.0),
        Model::Gde { gamma, lambda } => {
            let x = 1.0 - 3.0 * gamma * (lambda - 1.0) * z.ln_1p();
            if x.abs() <= POLE_TOLERANCE {
                return Err(ModelError::Pole { z });
            }
            Ok(-1.0 + gamma / x)
        }
    }
}

/// Q(z) for gDE, 1 for ΛCDM.
pub fn dark_energy_ratio(model: Model, z: f64) -> Result<f64, ModelError> {
    match model {
        Model::Lcdm => {
            check_redshift(z)?;
            Ok(1.0)
        }
        Model::Gde { gamma, lambda } => crate::models::dark_energy_ratio(z, gamma, lambda),
    }
}

/// Present-day matter density parameter Ω_m0 = ω_m / h².
pub fn matter_density(cosmo: &Cosmology, h: f64) -> Result<f64, ModelError> {
    if !(h.is_finite() && h > 0.0) {
        return Err(ModelError::NonFiniteParameter { name: "h", value: h });
    }
    Ok(cosmo.omega_m() / (h * h))
}

/// Transition redshift z† = exp(1/ψ) - 1, ψ = 3γ(λ - 1), where Q changes sign.
///
/// ΛCDM has no transition. A negative ψ gives z† in (-1, 0), i.e. the sign
/// change lies in the future.
pub fn transition_redshift(model: Model) -> Result<f64, ModelError> {
    model.validate()?;
    match model {
        Model::Lcdm => Err(ModelError::NoTransition { psi: 0.0 }),
        Model::Gde { gamma, lambda } => {
            let psi = 3.0 * gamma * (lambda - 1.0);
            if psi == 0.0 || !psi.is_finite() {
                return Err(ModelError::NoTransition { psi });
            }
            let z = (1.0 / psi).exp_m1();
            if !z.is_finite() {
                return Err(ModelError::NoTransition { psi });
            }
            Ok(z)
        }
    }
}

/// Evaluate one [`Quantity`] at a single redshift.
pub fn evaluate(
    cosmo: &Cosmology,
    model: Model,
    h: f64,
    quantity: Quantity,
    z: f64,
) -> Result<f64, ModelError> {
    match quantity {
        Quantity::Hubble => hubble(cosmo, model, h, z),
        Quantity::Expansion => expansion_rate(cosmo, model, h, z),
        Quantity::ComovingDistance => comoving_distance(cosmo, model, h, z),
        Quantity::HubbleDistance => hubble_distance(cosmo, model, h, z),
        Quantity::VolumeDistance => volume_distance(cosmo, model, h, z),
        Quantity::DistanceModulus => distance_modulus(cosmo, model, h, z),
        Quantity::EquationOfState => equation_of_state(model, z),
        Quantity::DarkEnergyRatio => dark_energy_ratio(model, z),
        Quantity::BaoHubble => bao_hubble(cosmo, model, h, z),
        Quantity::BaoDistance => bao_distance(cosmo, model, h, z),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{BisectOptions, bisect};

    fn cosmo() -> Cosmology {
        Cosmology::planck2018().unwrap()
    }

    #[test]
    fn expansion_rate_is_exactly_one_today() {
        let c = cosmo();
        let gde = Model::Gde { gamma: -0.015, lambda: -24.0 };
        assert_eq!(expansion_rate(&c, Model::Lcdm, 0.6736, 0.0).unwrap(), 1.0);
        assert_eq!(expansion_rate(&c, gde, 0.71, 0.0).unwrap(), 1.0);
    }

    #[test]
    fn comoving_distance_vanishes_today() {
        let c = cosmo();
        assert_eq!(comoving_distance(&c, Model::Lcdm, 0.6736, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn comoving_distance_matches_low_redshift_limit() {
        // D_M ≈ c z / H0 for z ≪ 1.
        let c = cosmo();
        let h = 0.7;
        let z = 1e-3;
        let dm = comoving_distance(&c, Model::Lcdm, h, z).unwrap();
        let approx = SPEED * z / (100.0 * h);
        assert!((dm - approx).abs() / approx < 1e-3, "dm={dm}, approx={approx}");
    }

    const SPEED: f64 = crate::domain::SPEED_OF_LIGHT;

    #[test]
    fn lcdm_distances_have_standard_magnitudes() {
        let c = cosmo();
        let h = 0.6736;
        let dm = comoving_distance(&c, Model::Lcdm, h, 1.0).unwrap();
        // Planck 2018 ΛCDM: D_M(z=1) ≈ 3400 Mpc.
        assert!((3300.0..3500.0).contains(&dm), "D_M(1) = {dm}");

        let rd = sound_horizon_drag(&c, Model::Lcdm, h).unwrap();
        assert!((140.0..155.0).contains(&rd), "r_d = {rd}");
        let rs = sound_horizon_star(&c, Model::Lcdm, h).unwrap();
        assert!(rs < rd, "r_s(z*) = {rs} should be below r_d = {rd}");
    }

    #[test]
    fn hubble_is_monotone_before_transition() {
        let c = cosmo();
        // ψ = 3·0.005·25 = 0.375, z† = e^{1/0.375} - 1 ≈ 13.4.
        let model = Model::Gde { gamma: -0.005, lambda: -24.0 };
        assert!(transition_redshift(model).unwrap() > 5.0);
        let mut prev = 0.0;
        for i in 0..=100 {
            let z = 0.05 * i as f64;
            let hz = hubble(&c, model, 0.7, z).unwrap();
            assert!(hz >= prev, "H not monotone at z={z}: {hz} < {prev}");
            prev = hz;
        }
    }

    #[test]
    fn transition_redshift_matches_sign_change_of_q() {
        let (gamma, lambda) = (-0.015, -24.0);
        let model = Model::Gde { gamma, lambda };
        let closed = transition_redshift(model).unwrap();

        let numeric = bisect(
            |z| dark_energy_ratio(model, z),
            0.0,
            10.0,
            BisectOptions { tolerance: 1e-12, max_iterations: 200 },
        )
        .unwrap();
        assert!((numeric.root - closed).abs() < 1e-3, "bisect={}, closed={closed}", numeric.root);
    }

    #[test]
    fn transition_redshift_requires_coupling() {
        assert!(matches!(
            transition_redshift(Model::Gde { gamma: 0.0, lambda: -4.0 }),
            Err(ModelError::NoTransition { .. })
        ));
        assert!(transition_redshift(Model::Lcdm).is_err());
        assert_eq!(
            transition_redshift(Model::Gde { gamma: -0.01, lambda: 1.0 }),
            Err(ModelError::SingularExponent)
        );
    }

    #[test]
    fn equation_of_state_values() {
        assert_eq!(equation_of_state(Model::Lcdm, 3.0).unwrap(), -1.0);
        let model = Model::Gde { gamma: -0.015, lambda: -24.0 };
        // x(0) = 1, so w0 = -1 + γ.
        assert!((equation_of_state(model, 0.0).unwrap() - (-1.015)).abs() < 1e-15);
        // Phantom below the transition.
        assert!(equation_of_state(model, 1.0).unwrap() < -1.0);
    }

    #[test]
    fn equation_of_state_reports_pole() {
        let model = Model::Gde { gamma: -0.5, lambda: 0.0 };
        // ψ = 3·(-0.5)·(-1) = 1.5, so x = 0 at ln(1+z) = 2/3.
        let z = (2.0_f64 / 3.0).exp_m1();
        assert!(matches!(equation_of_state(model, z), Err(ModelError::Pole { .. })));
    }

    #[test]
    fn matter_density_scales_with_h() {
        let c = cosmo();
        let om = matter_density(&c, 0.6736).unwrap();
        assert!((om - 0.142493 / (0.6736 * 0.6736)).abs() < 1e-12);
        assert!(matter_density(&c, 0.0).is_err());
    }

    #[test]
    fn quantities_undefined_at_zero_redshift() {
        let c = cosmo();
        for q in [Quantity::VolumeDistance, Quantity::DistanceModulus, Quantity::BaoDistance] {
            assert!(q.needs_positive_z());
            assert!(matches!(
                evaluate(&c, Model::Lcdm, 0.7, q, 0.0),
                Err(ModelError::NonPositiveRedshift { .. })
            ));
        }
    }

    #[test]
    fn distance_modulus_is_consistent_with_comoving_distance() {
        let c = cosmo();
        let z = 0.5;
        let dm = comoving_distance(&c, Model::Lcdm, 0.7, z).unwrap();
        let mu = distance_modulus(&c, Model::Lcdm, 0.7, z).unwrap();
        assert!((mu - (5.0 * ((1.0 + z) * dm).log10() + 25.0)).abs() < 1e-12);
        assert!((40.0..45.0).contains(&mu), "mu(0.5) = {mu}");
    }

    #[test]
    fn redshift_domain_is_checked() {
        let c = cosmo();
        assert!(matches!(
            hubble(&c, Model::Lcdm, 0.7, -1.5),
            Err(ModelError::RedshiftOutOfDomain { .. })
        ));
    }
}
