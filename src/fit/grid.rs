//! Sample grids for redshift curves and parameter sweeps.
//!
//! All grids are deterministic and include both endpoints.

use crate::error::AppError;

/// Largest number of points any grid may hold.
pub const MAX_GRID_POINTS: usize = 1_000_000;

fn check_size(n: f64) -> Result<usize, AppError> {
    if n > MAX_GRID_POINTS as f64 {
        return Err(AppError::new(
            2,
            format!("Grid would hold {n:.0} points (limit {MAX_GRID_POINTS}); use a coarser step."),
        ));
    }
    Ok(n as usize)
}

/// Points `start, start + step, ...` up to and including `stop`.
///
/// `stop` is kept when it falls on the grid up to floating-point noise.
pub fn arange(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, AppError> {
    if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
        return Err(AppError::new(
            2,
            format!("Invalid range: start={start}, stop={stop}, step={step} (must be finite)."),
        ));
    }
    if step <= 0.0 {
        return Err(AppError::new(2, format!("Step must be > 0, got {step}.")));
    }
    if stop < start {
        return Err(AppError::new(2, format!("Range end {stop} is below its start {start}.")));
    }

    let n = check_size(((stop - start) / step + 1e-9).floor() + 1.0)?;
    Ok((0..n).map(|i| start + step * i as f64).collect())
}

/// `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn linspace(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid range: min={min}, max={max} (must be finite and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Grid steps must be >= 2."));
    }
    check_size(steps as f64)?;

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out: Vec<f64> = (0..steps).map(|i| min + step * i as f64).collect();
    // Pin the last point so `max` is reproduced exactly.
    if let Some(last) = out.last_mut() {
        *last = max;
    }
    Ok(out)
}

/// `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid log range: min={min}, max={max} (must be finite, >0, and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Grid steps must be >= 2."));
    }
    check_size(steps as f64)?;

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}
