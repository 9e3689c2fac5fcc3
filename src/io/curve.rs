//! Read/write curve JSON files.
//!
//! Curve JSON is the portable representation of a set of derived curves:
//! - the constant-set label and generation time
//! - per curve: model, calibrated h, quantity, and the sampled `(z, value)` points
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{Cosmology, CurveFile, DerivedCurve};
use crate::error::AppError;

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curves: &[DerivedCurve], cosmo: &Cosmology) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    let curve = CurveFile {
        tool: "gde".to_string(),
        generated_at: Utc::now(),
        constants: cosmo.constants().label.clone(),
        curves: curves.to_vec(),
    };

    serde_json::to_writer_pretty(file, &curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    if curve.curves.is_empty() {
        return Err(AppError::new(3, format!("Curve JSON '{}' contains no curves.", path.display())));
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Model, Quantity};

    #[test]
    fn curve_file_survives_disk() {
        let cosmo = Cosmology::planck2018().unwrap();
        let curves = vec![DerivedCurve {
            model: Model::Gde { gamma: -0.015, lambda: -24.0 },
            label: "gDE".to_string(),
            quantity: Quantity::Hubble,
            h: 0.7,
            points: vec![(0.0, 70.0), (1.0, 120.0)],
        }];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curves.json");
        write_curve_json(&path, &curves, &cosmo).unwrap();

        let back = read_curve_json(&path).unwrap();
        assert_eq!(back.tool, "gde");
        assert_eq!(back.constants, "planck2018");
        assert_eq!(back.curves.len(), 1);
        assert_eq!(back.curves[0].model, curves[0].model);
        assert_eq!(back.curves[0].quantity, Quantity::Hubble);
        assert_eq!(back.curves[0].points.len(), 2);
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = read_curve_json(Path::new("/nonexistent/curves.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
