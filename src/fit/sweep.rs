//! Parameter sweeps over `(γ, λ)`.
//!
//! A sweep evaluates one [`GridQuantity`] per parameter tuple. Tuples are
//! independent, so they run in parallel; calibrations go through a shared
//! [`CalibrationCache`] so repeated tuples are solved once.
//!
//! Each point keeps its own `Result`: a tuple with no root in the H0 bracket or
//! a non-finite integrand is recorded and the sweep continues.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::{Cosmology, GridQuantity, Model};
use crate::error::ModelError;
use crate::observables::{equation_of_state, matter_density, transition_redshift};

use super::cache::CalibrationCache;

/// One evaluated `(γ, λ)` tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSample {
    pub gamma: f64,
    pub lambda: f64,
    pub value: Result<f64, ModelError>,
}

/// A tuple that failed inside a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepFailure {
    pub gamma: f64,
    pub lambda: f64,
    pub error: ModelError,
}

/// Values of one quantity on a `λ × γ` mesh.
#[derive(Debug, Clone)]
pub struct ParameterGrid {
    pub quantity: GridQuantity,
    pub gammas: Vec<f64>,
    pub lambdas: Vec<f64>,
    /// Row `i` is `lambdas[i]`, column `j` is `gammas[j]`. NaN where evaluation failed.
    pub values: DMatrix<f64>,
    pub failures: Vec<SweepFailure>,
}

impl ParameterGrid {
    /// Value at `(gammas[col], lambdas[row])`, `None` for failed points.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get((row, col)).copied().filter(|v| !v.is_nan())
    }
}

/// Evaluate `quantity` for a single gDE tuple.
pub fn evaluate_point(
    cosmo: &Cosmology,
    cache: &CalibrationCache,
    quantity: GridQuantity,
    gamma: f64,
    lambda: f64,
) -> Result<f64, ModelError> {
    let model = Model::gde(gamma, lambda)?;
    match quantity {
        GridQuantity::HubbleConstant => Ok(cache.get_or_calibrate(cosmo, model)?.hubble_constant()),
        GridQuantity::MatterDensity => {
            let calibration = cache.get_or_calibrate(cosmo, model)?;
            matter_density(cosmo, calibration.h)
        }
        GridQuantity::TransitionRedshift => transition_redshift(model),
        GridQuantity::EquationOfStateToday => equation_of_state(model, 0.0),
    }
}

/// Evaluate `quantity` for every `(γ, λ)` in `points`, in order.
pub fn sweep_line(
    cosmo: &Cosmology,
    cache: &CalibrationCache,
    quantity: GridQuantity,
    points: &[(f64, f64)],
) -> Vec<SweepSample> {
    let samples: Vec<SweepSample> = points
        .par_iter()
        .map(|&(gamma, lambda)| SweepSample {
            gamma,
            lambda,
            value: evaluate_point(cosmo, cache, quantity, gamma, lambda),
        })
        .collect();

    let failed = samples.iter().filter(|s| s.value.is_err()).count();
    tracing::info!(
        quantity = quantity.display_name(),
        points = samples.len(),
        failed,
        "sweep finished"
    );
    samples
}

/// H0-vs-γ style scan at fixed λ.
pub fn scan_gamma(
    cosmo: &Cosmology,
    cache: &CalibrationCache,
    quantity: GridQuantity,
    gammas: &[f64],
    lambda: f64,
) -> Vec<SweepSample> {
    let points: Vec<(f64, f64)> = gammas.iter().map(|&g| (g, lambda)).collect();
    sweep_line(cosmo, cache, quantity, &points)
}

/// H0-vs-λ style scan at fixed γ.
pub fn scan_lambda(
    cosmo: &Cosmology,
    cache: &CalibrationCache,
    quantity: GridQuantity,
    gamma: f64,
    lambdas: &[f64],
) -> Vec<SweepSample> {
    let points: Vec<(f64, f64)> = lambdas.iter().map(|&l| (gamma, l)).collect();
    sweep_line(cosmo, cache, quantity, &points)
}

/// Evaluate `quantity` on the full `gammas × lambdas` mesh.
pub fn sweep_grid(
    cosmo: &Cosmology,
    cache: &CalibrationCache,
    quantity: GridQuantity,
    gammas: &[f64],
    lambdas: &[f64],
) -> ParameterGrid {
    // Row-major over (λ, γ) so sample k lands at (k / n_gamma, k % n_gamma).
    let points: Vec<(f64, f64)> = lambdas
        .iter()
        .flat_map(|&l| gammas.iter().map(move |&g| (g, l)))
        .collect();
    let samples = sweep_line(cosmo, cache, quantity, &points);

    let mut failures = Vec::new();
    let mut values = Vec::with_capacity(samples.len());
    for sample in samples {
        match sample.value {
            Ok(v) => values.push(v),
            Err(error) => {
                values.push(f64::NAN);
                failures.push(SweepFailure {
                    gamma: sample.gamma,
                    lambda: sample.lambda,
                    error,
                });
            }
        }
    }

    ParameterGrid {
        quantity,
        gammas: gammas.to_vec(),
        lambdas: lambdas.to_vec(),
        values: DMatrix::from_row_slice(lambdas.len(), gammas.len(), &values),
        failures,
    }
}
