//! Reporting utilities: supernova magnitude residuals and terminal output.

use rayon::prelude::*;

use crate::domain::{Calibration, Cosmology, MagnitudeResidual, SupernovaPoint};
use crate::error::ModelError;
use crate::observables::distance_modulus;

pub mod format;

pub use format::*;

/// Inverse-variance weighted mean of the absolute magnitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeSummary {
    pub mean: f64,
    pub error: f64,
    pub count: usize,
}

/// `M_B = m_b - μ(z)` for every supernova, with the single calibrated `h`.
pub fn absolute_magnitudes(
    cosmo: &Cosmology,
    calibration: &Calibration,
    points: &[SupernovaPoint],
) -> Result<Vec<MagnitudeResidual>, ModelError> {
    points
        .par_iter()
        .map(|p| {
            let mu = distance_modulus(cosmo, calibration.model, calibration.h, p.z)?;
            Ok(MagnitudeResidual {
                name: p.name.clone(),
                z: p.z,
                absolute_magnitude: p.mb - mu,
                error: p.mb_err,
            })
        })
        .collect()
}

/// Weighted mean `Σ M_i/σ_i² / Σ 1/σ_i²` with error `1/sqrt(Σ 1/σ_i²)`.
///
/// Returns `None` when no residual has a positive, finite error.
pub fn weighted_mean(residuals: &[MagnitudeResidual]) -> Option<MagnitudeSummary> {
    let (mut sum_w, mut sum_wm, mut count) = (0.0, 0.0, 0usize);
    for r in residuals {
        if !(r.error.is_finite() && r.error > 0.0 && r.absolute_magnitude.is_finite()) {
            continue;
        }
        let w = 1.0 / (r.error * r.error);
        sum_w += w;
        sum_wm += w * r.absolute_magnitude;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(MagnitudeSummary {
        mean: sum_wm / sum_w,
        error: 1.0 / sum_w.sqrt(),
        count,
    })
}
