//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - resolves the constant set into a validated `Cosmology`
//! - runs calibrations, curves, sweeps, or the Pantheon comparison
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Cli, Command, CurveArgs, GridArgs, ModelArgs, PantheonArgs, PlotArgs, ScanArgs, ScanAxis};
use crate::domain::{Cosmology, MagnitudeResidual, OutputConfig, Quantity, RunConfig};
use crate::error::AppError;
use crate::fit::{CalibrationCache, linspace, scan_gamma, scan_lambda, sweep_grid};

pub mod pipeline;

/// Entry point for the `gde` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    crate::telemetry::init_tracing(cli.log_json, cli.log_level);

    match cli.command {
        // Plotting a saved file needs no constants.
        Command::Plot(args) => handle_plot(&args),
        command => {
            let cosmo = crate::io::resolve_cosmology(cli.preset, cli.constants.as_deref())?;
            let cache = CalibrationCache::new();
            println!("{}", crate::report::format_cosmology(&cosmo));
            dispatch(&cosmo, &cache, command)
        }
    }
}

fn dispatch(cosmo: &Cosmology, cache: &CalibrationCache, command: Command) -> Result<(), AppError> {
    match command {
        Command::Calibrate(args) => handle_calibrate(cosmo, cache, &args),
        Command::Curve(args) => handle_curve(cosmo, cache, &args),
        Command::Scan(args) => handle_scan(cosmo, cache, &args),
        Command::Grid(args) => handle_grid(cosmo, cache, &args),
        Command::Pantheon(args) => handle_pantheon(cosmo, cache, &args),
        Command::Plot(args) => handle_plot(&args),
    }
}

fn handle_calibrate(cosmo: &Cosmology, cache: &CalibrationCache, args: &ModelArgs) -> Result<(), AppError> {
    let models = args.models();
    if models.is_empty() {
        return Err(AppError::new(2, "No models selected (use --gde or drop --no-lcdm)."));
    }
    let results = pipeline::calibrate_models(cosmo, cache, &models);
    println!("{}", crate::report::format_calibrations(cosmo, &results));

    // Every model failing is a numerical failure of the run.
    match results.first() {
        Some((_, Err(first))) if results.iter().all(|(_, r)| r.is_err()) => Err(first.clone().into()),
        _ => Ok(()),
    }
}

fn handle_curve(cosmo: &Cosmology, cache: &CalibrationCache, args: &CurveArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args);
    let run = pipeline::run_curves(cosmo, cache, &config)?;

    println!("{}", crate::report::format_calibrations(cosmo, &run.calibrations));
    if config.output.plot {
        println!(
            "{}",
            crate::plot::render_ascii_plot(&run.curves, &[], config.output.plot_width, config.output.plot_height)
        );
    } else {
        println!("{}", crate::report::format_curves(&run.curves));
    }

    if let Some(path) = &config.output.export_csv {
        crate::io::export::write_curves_csv(path, &run.curves)?;
    }
    if let Some(path) = &config.output.export_json {
        crate::io::curve::write_curve_json(path, &run.curves, cosmo)?;
    }
    if let Some(path) = &config.output.export_svg {
        crate::plot::write_svg_chart(path, &run.curves, &[], (1024, 768))?;
    }
    Ok(())
}

fn handle_scan(cosmo: &Cosmology, cache: &CalibrationCache, args: &ScanArgs) -> Result<(), AppError> {
    let values = linspace(args.from, args.to, args.steps)?;
    let samples = match args.vary {
        ScanAxis::Gamma => scan_gamma(cosmo, cache, args.quantity, &values, args.lambda),
        ScanAxis::Lambda => scan_lambda(cosmo, cache, args.quantity, args.gamma, &values),
    };

    println!("{}", crate::report::format_sweep(args.quantity, &samples));
    if let Some(path) = &args.export {
        crate::io::export::write_sweep_csv(path, &samples)?;
    }
    if samples.iter().all(|s| s.value.is_err()) {
        return Err(AppError::new(4, "Every point of the scan failed."));
    }
    Ok(())
}

fn handle_grid(cosmo: &Cosmology, cache: &CalibrationCache, args: &GridArgs) -> Result<(), AppError> {
    let gammas = linspace(args.gamma_min, args.gamma_max, args.gamma_steps)?;
    let lambdas = linspace(args.lambda_min, args.lambda_max, args.lambda_steps)?;
    let grid = sweep_grid(cosmo, cache, args.quantity, &gammas, &lambdas);

    println!("{}", crate::report::format_grid_summary(&grid));
    if let Some(path) = &args.export {
        crate::io::export::write_grid_csv(path, &grid)?;
    }
    if grid.failures.len() == grid.values.len() {
        return Err(AppError::new(4, "Every point of the grid failed."));
    }
    Ok(())
}

fn handle_pantheon(cosmo: &Cosmology, cache: &CalibrationCache, args: &PantheonArgs) -> Result<(), AppError> {
    let data = crate::io::ingest::load_supernovae(&args.table)?;
    if !data.row_errors.is_empty() {
        println!("Skipped {} of {} rows:", data.row_errors.len(), data.rows_read);
        for e in data.row_errors.iter().take(10) {
            println!("  line {}: {}", e.line, e.message);
        }
    }

    let models = args.models.models();
    let results = pipeline::run_pantheon(cosmo, cache, &data, &models)?;
    let mut runs = Vec::with_capacity(results.len());
    let mut first_error = None;
    for (model, result) in results {
        match result {
            Ok(run) => {
                println!(
                    "{}",
                    crate::report::format_magnitudes(&model.label(), &run.residuals, run.summary.as_ref())
                );
                runs.push(run);
            }
            Err(e) => {
                println!("{}: failed: {e}\n", model.label());
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) if runs.is_empty() => return Err(e.into()),
        _ => {}
    }

    if let Some(path) = &args.export {
        let labels: Vec<String> = runs.iter().map(|r| r.calibration.model.label()).collect();
        let groups: Vec<(&str, &[MagnitudeResidual])> = labels
            .iter()
            .zip(&runs)
            .map(|(label, run)| (label.as_str(), run.residuals.as_slice()))
            .collect();
        crate::io::export::write_magnitudes_csv(path, &groups)?;
    }

    if let Some(path) = &args.svg {
        let zs = pipeline::plot_redshifts(&data.points);
        let mut curves = Vec::with_capacity(runs.len());
        for run in &runs {
            curves.push(crate::observables::sample_curve(
                cosmo,
                &run.calibration,
                Quantity::DistanceModulus,
                &zs,
            )?);
        }
        // Data shown as m_b - <M_B> of the first model.
        let offset = runs.first().and_then(|r| r.summary).map(|s| s.mean).unwrap_or(0.0);
        let points: Vec<(f64, f64, f64)> = data.points.iter().map(|p| (p.z, p.mb - offset, p.mb_err)).collect();
        crate::plot::write_svg_chart(path, &curves, &points, (1024, 768))?;
    }
    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;
    match &args.svg {
        Some(path) => crate::plot::write_svg_chart(path, &curve.curves, &[], (1024, 768)),
        None => {
            println!(
                "{}",
                crate::plot::render_ascii_plot_from_curve_file(&curve, args.width, args.height)
            );
            Ok(())
        }
    }
}

pub fn run_config_from_args(args: &CurveArgs) -> RunConfig {
    RunConfig {
        models: args.models.models(),
        quantity: args.quantity,
        z_min: args.z_min,
        z_max: args.z_max,
        z_step: args.z_step,
        log_points: args.log_points,
        output: OutputConfig {
            plot: args.output.plot,
            plot_width: args.output.width,
            plot_height: args.output.height,
            export_csv: args.output.export.clone(),
            export_json: args.output.export_curve.clone(),
            export_svg: args.output.svg.clone(),
        },
    }
}
