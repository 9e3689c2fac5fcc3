//! H0 calibration.
//!
//! For a given constant set and model we look for the reduced Hubble
//! parameter `h` at which the predicted calibration statistic `T(h)` matches
//! the observed value:
//!
//! ```text
//! r(h) = T_true - T(h) = 0,   h ∈ [h_min, h_max]
//! ```
//!
//! `T` is either the acoustic angle `r_s(z*) / D_M(z*)` (two integrals) or the
//! dimensionless distance `∫₀^{z_rec} dz / (H/100)` (one integral). The first
//! grows with `h`, the second shrinks; the bisection reads the direction from
//! the bracket endpoints so both work unchanged.

use crate::domain::{CalibrationTarget, Calibration, Cosmology, Model};
use crate::error::ModelError;
use crate::math::{BisectOptions, QuadOptions, bisect, integrate};
use crate::models::{Friedmann, Weighting};
use crate::observables::{comoving_distance, sound_horizon_star};

/// The calibration statistic `T(h)` for `model`.
pub fn target_statistic(cosmo: &Cosmology, model: Model, h: f64) -> Result<f64, ModelError> {
    match cosmo.constants().target {
        CalibrationTarget::AcousticAngle { .. } => {
            let z_star = cosmo.markers().z_star;
            let rs = sound_horizon_star(cosmo, model, h)?;
            let dm = comoving_distance(cosmo, model, h, z_star)?;
            Ok(rs / dm)
        }
        CalibrationTarget::AngularDistance { z_rec, .. } => {
            let f = Friedmann::new(cosmo, model, h)?;
            let q = integrate(f.integrand(Weighting::InverseHubble), 0.0, z_rec, &QuadOptions::default())?;
            Ok(q.value)
        }
    }
}

/// Calibrate H0 for `model` on the bracket, tolerance and iteration budget of
/// the constant set.
///
/// Running out of iterations is not an error: the last midpoint is returned
/// with `converged = false`.
pub fn find_h0(cosmo: &Cosmology, model: Model) -> Result<Calibration, ModelError> {
    model.validate()?;

    let constants = cosmo.constants();
    let target = constants.target_value();
    let [lo, hi] = constants.h_bracket;
    let opts = BisectOptions {
        tolerance: constants.tolerance,
        max_iterations: constants.max_iterations,
    };

    let solution = bisect(
        |h| target_statistic(cosmo, model, h).map(|t| target - t),
        lo,
        hi,
        opts,
    )?;

    let calibration = Calibration {
        model,
        h: solution.root,
        residual: solution.residual,
        iterations: solution.iterations,
        converged: solution.converged,
    };

    if calibration.converged {
        tracing::debug!(
            model = %model.label(),
            h0 = calibration.hubble_constant(),
            residual = calibration.residual,
            iterations = calibration.iterations,
            "calibrated H0"
        );
    } else {
        tracing::warn!(
            model = %model.label(),
            h0 = calibration.hubble_constant(),
            residual = calibration.residual,
            iterations = calibration.iterations,
            "H0 calibration hit the iteration cap"
        );
    }

    Ok(calibration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CosmologicalConstants;
    use crate::error::CalibrationError;

    #[test]
    fn lcdm_compressed_prior_reproduces_h0() {
        let cosmo = Cosmology::new(CosmologicalConstants::compressed()).unwrap();
        let cal = find_h0(&cosmo, Model::Lcdm).unwrap();
        assert!(cal.converged);
        assert!(
            (cal.hubble_constant() - 67.4).abs() < 0.5,
            "H0 = {}",
            cal.hubble_constant()
        );
    }

    #[test]
    fn lcdm_acoustic_angle_calibration_is_pinned() {
        // θ = r_s(z*)/D_M(z*) with the Plik densities lands above the compressed-prior value.
        let cosmo = Cosmology::planck2018().unwrap();
        let cal = find_h0(&cosmo, Model::Lcdm).unwrap();
        assert!(cal.converged);
        assert!(
            (cal.hubble_constant() - 68.11).abs() < 0.05,
            "H0 = {}",
            cal.hubble_constant()
        );
    }

    #[test]
    fn statistic_round_trips_within_tolerance() {
        let cosmo = Cosmology::planck2018().unwrap();
        let model = Model::Gde { gamma: -0.015, lambda: -24.0 };
        let cal = find_h0(&cosmo, model).unwrap();
        assert!(cal.converged);

        let t = target_statistic(&cosmo, model, cal.h).unwrap();
        let target = cosmo.constants().target_value();
        assert!((t - target).abs() <= cosmo.constants().tolerance, "T(h) = {t}, target = {target}");
    }

    #[test]
    fn compressed_statistic_round_trips() {
        let cosmo = Cosmology::new(CosmologicalConstants::compressed()).unwrap();
        let cal = find_h0(&cosmo, Model::Lcdm).unwrap();
        let t = target_statistic(&cosmo, Model::Lcdm, cal.h).unwrap();
        assert!((t - cosmo.constants().target_value()).abs() <= 1e-6);
    }

    #[test]
    fn acoustic_angle_increases_with_h() {
        let cosmo = Cosmology::planck2018().unwrap();
        let lo = target_statistic(&cosmo, Model::Lcdm, 0.6).unwrap();
        let hi = target_statistic(&cosmo, Model::Lcdm, 0.8).unwrap();
        assert!(hi > lo);
    }

    #[test]
    fn singular_exponent_is_rejected_before_solving() {
        let cosmo = Cosmology::planck2018().unwrap();
        let err = find_h0(&cosmo, Model::Gde { gamma: -0.015, lambda: 1.0 }).unwrap_err();
        assert_eq!(err, ModelError::SingularExponent);
    }

    #[test]
    fn bracket_without_root_is_reported() {
        let mut constants = CosmologicalConstants::planck2018();
        constants.h_bracket = [0.8, 1.0];
        let cosmo = Cosmology::new(constants).unwrap();
        let err = find_h0(&cosmo, Model::Lcdm).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Calibration(CalibrationError::NotBracketed { .. })
        ));
    }

    #[test]
    fn small_budget_returns_unconverged_midpoint() {
        let mut constants = CosmologicalConstants::planck2018();
        constants.max_iterations = 3;
        let cosmo = Cosmology::new(constants).unwrap();
        let cal = find_h0(&cosmo, Model::Lcdm).unwrap();
        assert!(!cal.converged);
        assert_eq!(cal.iterations, 3);
        assert!(cal.h > 0.4 && cal.h < 1.0);
    }
}
