//! Sampling a derived quantity over a redshift grid.

use rayon::prelude::*;

use crate::domain::{Calibration, Cosmology, DerivedCurve, Quantity};
use crate::error::ModelError;

/// Evaluate `quantity` at every redshift in `zs` with the calibrated `h`.
///
/// Samples are computed in parallel and returned in the order of `zs`. The
/// first failing sample fails the whole curve.
pub fn sample_curve(
    cosmo: &Cosmology,
    calibration: &Calibration,
    quantity: Quantity,
    zs: &[f64],
) -> Result<DerivedCurve, ModelError> {
    let model = calibration.model;
    let h = calibration.h;

    let points = zs
        .par_iter()
        .map(|&z| super::evaluate(cosmo, model, h, quantity, z).map(|v| (z, v)))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        model = %model.label(),
        quantity = quantity.display_name(),
        samples = points.len(),
        "sampled curve"
    );

    Ok(DerivedCurve {
        model,
        label: model.label(),
        quantity,
        h,
        points,
    })
}
