//! Shared pipeline logic behind the CLI commands.
//!
//! Keeping this in one place keeps the workflow testable without spawning
//! processes:
//! constants -> calibration (cached, once per model) -> curves / sweeps / residuals
//!
//! The command handlers in `app` only print and export.

use rayon::prelude::*;

use crate::domain::{Calibration, Cosmology, DerivedCurve, MagnitudeResidual, Model, RunConfig, SupernovaPoint};
use crate::error::{AppError, ModelError};
use crate::fit::{CalibrationCache, arange, log_space};
use crate::io::ingest::SupernovaData;
use crate::observables::sample_curve;
use crate::report::{MagnitudeSummary, absolute_magnitudes, weighted_mean};

/// Calibrate every model, in parallel. Failures stay per model.
pub fn calibrate_models(
    cosmo: &Cosmology,
    cache: &CalibrationCache,
    models: &[Model],
) -> Vec<(Model, Result<Calibration, ModelError>)> {
    models
        .par_iter()
        .map(|&m| (m, cache.get_or_calibrate(cosmo, m)))
        .collect()
}

/// Redshift grid of a curve run.
///
/// Quantities undefined at `z = 0` drop non-positive redshifts instead of failing.
pub fn redshift_grid(config: &RunConfig) -> Result<Vec<f64>, AppError> {
    let mut zs = match config.log_points {
        Some(n) => {
            let z_min = if config.z_min > 0.0 { config.z_min } else { 1e-3 };
            log_space(z_min, config.z_max, n)?
        }
        None => arange(config.z_min, config.z_max, config.z_step)?,
    };
    if zs.iter().any(|&z| z <= -1.0) {
        return Err(AppError::new(2, "Redshifts must be > -1."));
    }

    if config.quantity.needs_positive_z() {
        let before = zs.len();
        zs.retain(|&z| z > 0.0);
        if zs.len() < before {
            tracing::warn!(
                quantity = config.quantity.display_name(),
                dropped = before - zs.len(),
                "dropping redshifts <= 0 where the quantity is undefined"
            );
        }
    }
    if zs.is_empty() {
        return Err(AppError::new(3, "Redshift grid is empty."));
    }
    Ok(zs)
}

/// All computed outputs of a `gde curve` run.
#[derive(Debug, Clone)]
pub struct CurveRun {
    pub calibrations: Vec<(Model, Result<Calibration, ModelError>)>,
    pub curves: Vec<DerivedCurve>,
}

/// Calibrate each model once and sample the requested quantity on the grid.
///
/// A model whose calibration fails is reported but does not stop the others;
/// a failing sample of a calibrated model fails the run.
pub fn run_curves(cosmo: &Cosmology, cache: &CalibrationCache, config: &RunConfig) -> Result<CurveRun, AppError> {
    if config.models.is_empty() {
        return Err(AppError::new(2, "No models selected (use --gde or drop --no-lcdm)."));
    }
    let zs = redshift_grid(config)?;
    let calibrations = calibrate_models(cosmo, cache, &config.models);

    let mut curves = Vec::new();
    for (_, result) in &calibrations {
        if let Ok(calibration) = result {
            curves.push(sample_curve(cosmo, calibration, config.quantity, &zs)?);
        }
    }
    if curves.is_empty() {
        return Err(AppError::new(4, "No model could be calibrated."));
    }

    tracing::info!(curves = curves.len(), samples = zs.len(), "curve run finished");
    Ok(CurveRun { calibrations, curves })
}

/// Per-model output of a Pantheon comparison.
#[derive(Debug, Clone)]
pub struct MagnitudeRun {
    pub calibration: Calibration,
    pub residuals: Vec<MagnitudeResidual>,
    pub summary: Option<MagnitudeSummary>,
}

/// Absolute magnitudes of every supernova for every model.
///
/// Failures stay per model, like [`calibrate_models`].
pub fn run_pantheon(
    cosmo: &Cosmology,
    cache: &CalibrationCache,
    data: &SupernovaData,
    models: &[Model],
) -> Result<Vec<(Model, Result<MagnitudeRun, ModelError>)>, AppError> {
    if models.is_empty() {
        return Err(AppError::new(2, "No models selected (use --gde or drop --no-lcdm)."));
    }
    let runs = models
        .iter()
        .map(|&model| (model, magnitudes_for(cosmo, cache, data, model)))
        .collect::<Vec<_>>();

    for (model, result) in &runs {
        if let Err(e) = result {
            tracing::warn!(model = %model.label(), error = %e, "no magnitudes for model");
        }
    }
    Ok(runs)
}

/// Sorted, de-duplicated positive redshifts of a table, for drawing μ(z) as a line.
pub fn plot_redshifts(points: &[SupernovaPoint]) -> Vec<f64> {
    let mut zs: Vec<f64> = points.iter().map(|p| p.z).filter(|z| z.is_finite() && *z > 0.0).collect();
    zs.sort_by(f64::total_cmp);
    zs.dedup();
    zs
}

fn magnitudes_for(
    cosmo: &Cosmology,
    cache: &CalibrationCache,
    data: &SupernovaData,
    model: Model,
) -> Result<MagnitudeRun, ModelError> {
    let calibration = cache.get_or_calibrate(cosmo, model)?;
    let residuals = absolute_magnitudes(cosmo, &calibration, &data.points)?;
    let summary = weighted_mean(&residuals);
    Ok(MagnitudeRun {
        calibration,
        residuals,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OutputConfig, Quantity};

    fn config(quantity: Quantity, z_min: f64) -> RunConfig {
        RunConfig {
            models: vec![Model::Lcdm],
            quantity,
            z_min,
            z_max: 1.0,
            z_step: 0.25,
            log_points: None,
            output: OutputConfig::default(),
        }
    }

    #[test]
    fn grid_drops_zero_for_distance_modulus() {
        let zs = redshift_grid(&config(Quantity::DistanceModulus, 0.0)).unwrap();
        assert_eq!(zs.len(), 4);
        assert!(zs[0] > 0.0);

        let zs = redshift_grid(&config(Quantity::Hubble, 0.0)).unwrap();
        assert_eq!(zs.len(), 5);
    }

    #[test]
    fn log_grid_starts_above_zero() {
        let mut c = config(Quantity::ComovingDistance, 0.0);
        c.log_points = Some(10);
        let zs = redshift_grid(&c).unwrap();
        assert_eq!(zs.len(), 10);
        assert!((zs[0] - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn empty_model_list_is_input_error() {
        let cosmo = Cosmology::planck2018().unwrap();
        let mut c = config(Quantity::Hubble, 0.0);
        c.models.clear();
        let err = run_curves(&cosmo, &CalibrationCache::new(), &c).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn pantheon_failures_stay_per_model() {
        let cosmo = Cosmology::planck2018().unwrap();
        let data = crate::io::parse_supernovae("#name zcmb zhel dz mb dmb\nsn-a 0.1 0.1 0 18.95 0.11\n").unwrap();
        // No sign change of the acoustic-angle residual over the bracket.
        let unbracketed = Model::Gde { gamma: -0.018, lambda: -24.0 };

        let runs = run_pantheon(&cosmo, &CalibrationCache::new(), &data, &[Model::Lcdm, unbracketed]).unwrap();
        assert_eq!(runs.len(), 2);
        let lcdm = runs[0].1.as_ref().unwrap();
        assert_eq!(lcdm.residuals.len(), 1);
        assert!(matches!(
            runs[1],
            (m, Err(ModelError::Calibration(_))) if m == unbracketed
        ));
    }

    #[test]
    fn plot_redshifts_are_sorted_and_unique() {
        let point = |z: f64| SupernovaPoint {
            name: String::new(),
            z,
            mb: 20.0,
            mb_err: 0.1,
        };
        let points: Vec<SupernovaPoint> = [0.5, 0.01, 0.5, 0.2, 0.0].into_iter().map(point).collect();
        assert_eq!(plot_redshifts(&points), vec![0.01, 0.2, 0.5]);
    }
}
