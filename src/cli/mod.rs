//! Command-line parsing for the `gde` binary.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! numerical code: everything here resolves into domain types
//! (`Model`, `Quantity`, `RunConfig`) before any computation starts.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::Level;

use crate::domain::{GridQuantity, Model, Quantity};
use crate::io::Preset;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gde", version, about = "LCDM vs generalized dark energy: H0 calibration and derived curves")]
pub struct Cli {
    /// Built-in constant set.
    #[arg(long, global = true, value_enum, default_value_t = Preset::Compressed)]
    pub preset: Preset,

    /// Constants JSON file (overrides `--preset`).
    #[arg(long, global = true, value_name = "JSON")]
    pub constants: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value_t = Level::WARN)]
    pub log_level: Level,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calibrate H0 for each model and print H0, Omega_m0, sound horizons and z_dagger.
    Calibrate(ModelArgs),
    /// Sample a derived quantity over redshift for each model.
    Curve(CurveArgs),
    /// Scan a grid quantity along gamma or lambda with the other parameter fixed.
    Scan(ScanArgs),
    /// Evaluate a grid quantity on a gamma x lambda mesh.
    Grid(GridArgs),
    /// Absolute magnitudes M_B = m_b - mu(z) for a Pantheon table.
    Pantheon(PantheonArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
}

/// Model selection shared by the per-model commands.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// gDE model as `GAMMA,LAMBDA` (repeatable), e.g. `--gde=-0.015,-24`.
    #[arg(long = "gde", value_name = "GAMMA,LAMBDA", value_parser = parse_gde, allow_hyphen_values = true)]
    pub gde: Vec<Model>,

    /// Skip the LCDM reference model.
    #[arg(long)]
    pub no_lcdm: bool,
}

impl ModelArgs {
    /// LCDM first (unless disabled), then the gDE models in the order given.
    pub fn models(&self) -> Vec<Model> {
        let mut out = Vec::with_capacity(self.gde.len() + 1);
        if !self.no_lcdm {
            out.push(Model::Lcdm);
        }
        out.extend(self.gde.iter().copied());
        out
    }
}

/// Plot/export flags for commands that produce curves.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export samples to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export curves to JSON.
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,

    /// Write an SVG chart.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CurveArgs {
    #[command(flatten)]
    pub models: ModelArgs,

    /// Quantity to sample.
    #[arg(short, long, value_enum, default_value_t = Quantity::Hubble)]
    pub quantity: Quantity,

    /// Smallest redshift.
    #[arg(long, default_value_t = 0.0)]
    pub z_min: f64,

    /// Largest redshift.
    #[arg(long, default_value_t = 2.5)]
    pub z_max: f64,

    /// Redshift step for a linear grid.
    #[arg(long, default_value_t = 0.05)]
    pub z_step: f64,

    /// Use this many log-spaced redshifts instead of `--z-step`.
    #[arg(long)]
    pub log_points: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Which parameter a scan varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScanAxis {
    Gamma,
    Lambda,
}

#[derive(Debug, Args, Clone)]
pub struct ScanArgs {
    /// Quantity to evaluate per point.
    #[arg(short, long, value_enum, default_value_t = GridQuantity::HubbleConstant)]
    pub quantity: GridQuantity,

    /// Parameter to vary.
    #[arg(long, value_enum, default_value_t = ScanAxis::Gamma)]
    pub vary: ScanAxis,

    /// Fixed gamma (when varying lambda).
    #[arg(long, default_value_t = -0.015, allow_hyphen_values = true)]
    pub gamma: f64,

    /// Fixed lambda (when varying gamma).
    #[arg(long, default_value_t = -24.0, allow_hyphen_values = true)]
    pub lambda: f64,

    /// Start of the scanned range.
    #[arg(long, default_value_t = -0.02, allow_hyphen_values = true)]
    pub from: f64,

    /// End of the scanned range.
    #[arg(long, default_value_t = -0.001, allow_hyphen_values = true)]
    pub to: f64,

    /// Number of points.
    #[arg(long, default_value_t = 20)]
    pub steps: usize,

    /// Export samples to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct GridArgs {
    /// Quantity to evaluate per point.
    #[arg(short, long, value_enum, default_value_t = GridQuantity::HubbleConstant)]
    pub quantity: GridQuantity,

    #[arg(long, default_value_t = -0.02, allow_hyphen_values = true)]
    pub gamma_min: f64,

    #[arg(long, default_value_t = -0.001, allow_hyphen_values = true)]
    pub gamma_max: f64,

    #[arg(long, default_value_t = 10)]
    pub gamma_steps: usize,

    #[arg(long, default_value_t = -30.0, allow_hyphen_values = true)]
    pub lambda_min: f64,

    #[arg(long, default_value_t = -2.0, allow_hyphen_values = true)]
    pub lambda_max: f64,

    #[arg(long, default_value_t = 10)]
    pub lambda_steps: usize,

    /// Export the grid (long format) to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PantheonArgs {
    /// Pantheon light-curve parameter table (whitespace or comma separated).
    #[arg(long, value_name = "PATH")]
    pub table: PathBuf,

    #[command(flatten)]
    pub models: ModelArgs,

    /// Export per-supernova magnitudes to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Write an SVG chart of the distance modulus with the data points.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Curve JSON file produced by `gde curve --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write an SVG chart instead of printing.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}

/// Parse `GAMMA,LAMBDA` into a validated gDE model.
pub fn parse_gde(s: &str) -> Result<Model, String> {
    let (gamma, lambda) = s
        .split_once(',')
        .ok_or_else(|| format!("expected GAMMA,LAMBDA, got '{s}'"))?;
    let gamma: f64 = gamma
        .trim()
        .parse()
        .map_err(|_| format!("invalid gamma '{}'", gamma.trim()))?;
    let lambda: f64 = lambda
        .trim()
        .parse()
        .map_err(|_| format!("invalid lambda '{}'", lambda.trim()))?;
    Model::gde(gamma, lambda).map_err(|e| e.to_string())
}
