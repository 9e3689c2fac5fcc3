//! CSV exports.
//!
//! The exports are meant to be easy to consume in spreadsheets or plotting
//! scripts: one header line, one row per sample, no quoting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{DerivedCurve, MagnitudeResidual};
use crate::error::AppError;
use crate::fit::{ParameterGrid, SweepSample};

fn create(path: &Path) -> Result<BufWriter<File>, AppError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_err(e: std::io::Error) -> AppError {
    AppError::new(2, format!("Failed to write export CSV: {e}"))
}

/// One row per `(curve, z)` sample.
pub fn write_curves_csv(path: &Path, curves: &[DerivedCurve]) -> Result<(), AppError> {
    let mut file = create(path)?;
    writeln!(file, "model,quantity,h0,z,value").map_err(write_err)?;

    for curve in curves {
        for (z, value) in &curve.points {
            writeln!(
                file,
                "{},{},{:.6},{:.8},{:.10e}",
                curve.label.replace(',', ";"),
                curve.quantity.display_name().replace(',', ";"),
                100.0 * curve.h,
                z,
                value
            )
            .map_err(write_err)?;
        }
    }
    file.flush().map_err(write_err)
}

/// One row per `(γ, λ)` tuple; failed tuples keep an empty value and their error.
pub fn write_sweep_csv(path: &Path, samples: &[SweepSample]) -> Result<(), AppError> {
    let mut file = create(path)?;
    writeln!(file, "gamma,lambda,value,error").map_err(write_err)?;

    for s in samples {
        let (value, error) = match &s.value {
            Ok(v) => (format!("{v:.10}"), String::new()),
            Err(e) => (String::new(), e.to_string().replace(',', ";")),
        };
        writeln!(file, "{},{},{},{}", s.gamma, s.lambda, value, error).map_err(write_err)?;
    }
    file.flush().map_err(write_err)
}

/// Long format: one row per grid cell.
pub fn write_grid_csv(path: &Path, grid: &ParameterGrid) -> Result<(), AppError> {
    let mut file = create(path)?;
    writeln!(file, "gamma,lambda,value").map_err(write_err)?;

    for (i, lambda) in grid.lambdas.iter().enumerate() {
        for (j, gamma) in grid.gammas.iter().enumerate() {
            let value = grid.get(i, j).map(|v| format!("{v:.10}")).unwrap_or_default();
            writeln!(file, "{gamma},{lambda},{value}").map_err(write_err)?;
        }
    }
    file.flush().map_err(write_err)
}

/// Per-supernova absolute magnitudes, rows tagged by model label.
pub fn write_magnitudes_csv(path: &Path, groups: &[(&str, &[MagnitudeResidual])]) -> Result<(), AppError> {
    let mut file = create(path)?;
    writeln!(file, "model,name,z,absolute_magnitude,error").map_err(write_err)?;

    for (label, residuals) in groups {
        for r in *residuals {
            writeln!(
                file,
                "{},{},{:.6},{:.6},{:.6}",
                label.replace(',', ";"),
                r.name.replace(',', ";"),
                r.z,
                r.absolute_magnitude,
                r.error
            )
            .map_err(write_err)?;
        }
    }
    file.flush().map_err(write_err)
}
