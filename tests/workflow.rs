//! End-to-end checks of the library workflow: constants -> calibration ->
//! curves, sweeps and supernova magnitudes.

use gde_curves::app::pipeline::{run_curves, run_pantheon};
use gde_curves::domain::{CosmologicalConstants, Cosmology, GridQuantity, Model, OutputConfig, Quantity, RunConfig};
use gde_curves::fit::{CalibrationCache, linspace, sweep_grid};
use gde_curves::io::{load_supernovae, read_curve_json, write_curve_json};

fn cosmology() -> Cosmology {
    Cosmology::planck2018().unwrap()
}

#[test]
fn lcdm_and_gde_share_one_cache() {
    let cosmo = Cosmology::new(CosmologicalConstants::compressed()).unwrap();
    let cache = CalibrationCache::new();
    let gde = Model::gde(-0.015, -24.0).unwrap();

    let lcdm = cache.get_or_calibrate(&cosmo, Model::Lcdm).unwrap();
    assert!(lcdm.converged);
    assert!((lcdm.hubble_constant() - 67.4).abs() < 0.5, "H0 = {}", lcdm.hubble_constant());

    let first = cache.get_or_calibrate(&cosmo, gde).unwrap();
    let again = cache.get_or_calibrate(&cosmo, gde).unwrap();
    assert_eq!(first, again);
    assert_eq!(cache.solves(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn curve_run_round_trips_through_json() {
    let cosmo = cosmology();
    let config = RunConfig {
        models: vec![Model::Lcdm, Model::gde(-0.015, -24.0).unwrap()],
        quantity: Quantity::ComovingDistance,
        z_min: 0.0,
        z_max: 2.0,
        z_step: 0.5,
        log_points: None,
        output: OutputConfig::default(),
    };
    let run = run_curves(&cosmo, &CalibrationCache::new(), &config).unwrap();
    assert_eq!(run.curves.len(), 2);
    for curve in &run.curves {
        assert_eq!(curve.points.len(), 5);
        assert!(curve.points[0].1.abs() < 1e-9);
        assert!(curve.points.windows(2).all(|w| w[1].1 > w[0].1));
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dm.json");
    write_curve_json(&path, &run.curves, &cosmo).unwrap();
    let loaded = read_curve_json(&path).unwrap();
    assert_eq!(loaded.curves.len(), 2);
    for (read, written) in loaded.curves.iter().zip(&run.curves) {
        assert_eq!(read.label, written.label);
        assert_eq!(read.points.len(), written.points.len());
        for (a, b) in read.points.iter().zip(&written.points) {
            assert!((a.1 - b.1).abs() <= 1e-9 * b.1.abs().max(1.0));
        }
    }
}

#[test]
fn grid_keeps_failed_cells_as_nan() {
    let cosmo = cosmology();
    let gammas = linspace(-0.02, -0.005, 4).unwrap();
    let lambdas = [-24.0, 1.0];
    let grid = sweep_grid(&cosmo, &CalibrationCache::new(), GridQuantity::TransitionRedshift, &gammas, &lambdas);

    assert_eq!(grid.values.shape(), (2, 4));
    assert_eq!(grid.failures.len(), 4);
    assert!(grid.failures.iter().all(|f| f.lambda == 1.0));
    for col in 0..4 {
        assert!(grid.get(0, col).is_some_and(|z| z > 0.0));
        assert!(grid.get(1, col).is_none());
    }
}

#[test]
fn pantheon_table_gives_plausible_absolute_magnitudes() {
    let table = "\
#name zcmb zhel dz mb dmb x1 dx1
sn-a 0.05 0.05 0 17.38 0.12 0 0
sn-b 0.10 0.10 0 18.95 0.11 0 0
sn-c 0.50 0.50 0 22.80 0.15 0 0
sn-d 0.20 0.20 0 nan-ish 0.10 0 0
";
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pantheon.txt");
    std::fs::write(&path, table).unwrap();

    let data = load_supernovae(&path).unwrap();
    assert_eq!(data.points.len(), 3);
    assert_eq!(data.row_errors.len(), 1);

    let cosmo = cosmology();
    let runs = run_pantheon(&cosmo, &CalibrationCache::new(), &data, &[Model::Lcdm]).unwrap();
    assert_eq!(runs.len(), 1);
    let run = runs[0].1.as_ref().unwrap();
    let summary = run.summary.unwrap();
    assert_eq!(summary.count, 3);
    assert!((-20.0..-18.5).contains(&summary.mean), "M_B = {}", summary.mean);
}
