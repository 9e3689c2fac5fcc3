//! Constant-set resolution: built-in presets or a JSON file.
//!
//! The JSON schema is the serde form of `CosmologicalConstants`, e.g.
//!
//! ```json
//! {
//!   "label": "custom",
//!   "omega_b": 0.0224, "omega_c": 0.12, "omega_gamma": 2.469e-5, "n_eff": 3.046,
//!   "speed_of_light": 299792.458,
//!   "target": { "kind": "acoustic_angle", "theta": 0.0104109 },
//!   "tolerance": 1e-8, "h_bracket": [0.4, 1.0], "max_iterations": 100
//! }
//! ```

use std::fs::File;
use std::path::Path;

use clap::ValueEnum;

use crate::domain::{CosmologicalConstants, Cosmology};
use crate::error::AppError;

/// Built-in constant sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Planck 2018 best fit, calibrated on the acoustic angle.
    #[value(name = "planck2018")]
    Planck2018,
    /// Compressed CMB distance prior, calibrated on the distance to recombination.
    Compressed,
}

impl Preset {
    pub fn constants(self) -> CosmologicalConstants {
        match self {
            Preset::Planck2018 => CosmologicalConstants::planck2018(),
            Preset::Compressed => CosmologicalConstants::compressed(),
        }
    }
}

/// Read a constants JSON file.
pub fn read_constants_json(path: &Path) -> Result<CosmologicalConstants, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open constants JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid constants JSON: {e}")))
}

/// Build the validated cosmology for a run: a file overrides the preset.
pub fn resolve_cosmology(preset: Preset, path: Option<&Path>) -> Result<Cosmology, AppError> {
    let constants = match path {
        Some(path) => read_constants_json(path)?,
        None => preset.constants(),
    };
    Ok(Cosmology::new(constants)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_overrides_preset() {
        let mut custom = CosmologicalConstants::planck2018();
        custom.label = "custom".to_string();
        custom.h_bracket = [0.5, 0.9];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("constants.json");
        std::fs::write(&path, serde_json::to_string_pretty(&custom).unwrap()).unwrap();

        let cosmo = resolve_cosmology(Preset::Compressed, Some(&path)).unwrap();
        assert_eq!(cosmo.constants().label, "custom");
        assert_eq!(cosmo.constants().h_bracket, [0.5, 0.9]);
    }

    #[test]
    fn invalid_constants_map_to_input_error() {
        let mut bad = CosmologicalConstants::planck2018();
        bad.tolerance = 0.0;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("constants.json");
        std::fs::write(&path, serde_json::to_string(&bad).unwrap()).unwrap();

        let err = resolve_cosmology(Preset::Planck2018, Some(&path)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn presets_resolve() {
        let cosmo = resolve_cosmology(Preset::Compressed, None).unwrap();
        assert_eq!(cosmo.constants().label, "compressed");
    }
}
