//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the numerical code stays free of presentation concerns
//! - output changes are localized

use crate::domain::{Calibration, Cosmology, DerivedCurve, GridQuantity, MagnitudeResidual, Model};
use crate::error::ModelError;
use crate::fit::{ParameterGrid, SweepSample};
use crate::observables::{
    matter_density, sound_horizon_drag, sound_horizon_star, transition_redshift,
};

use super::MagnitudeSummary;

/// Header block describing the constant set of a run.
pub fn format_cosmology(cosmo: &Cosmology) -> String {
    let c = cosmo.constants();
    let markers = cosmo.markers();
    let mut out = String::new();
    out.push_str(&format!("=== gde - constants: {} ===\n", c.label));
    out.push_str(&format!(
        "omega_b={:.6} omega_c={:.6} omega_m={:.6} omega_r={:.4e} N_eff={:.3}\n",
        c.omega_b,
        c.omega_c,
        cosmo.omega_m(),
        cosmo.omega_r(),
        c.n_eff
    ));
    out.push_str(&format!(
        "z*={:.2} z_d={:.2} | target={:.8} tol={:.1e} h in [{}, {}]\n",
        markers.z_star,
        markers.z_drag,
        c.target_value(),
        c.tolerance,
        c.h_bracket[0],
        c.h_bracket[1]
    ));
    out
}

/// One line per model: H0, Ω_m0, sound horizons, z†, solver status.
pub fn format_calibrations(cosmo: &Cosmology, results: &[(Model, Result<Calibration, ModelError>)]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<32} {:>9} {:>9} {:>9} {:>9} {:>9} {:>6} {:>10}",
            "model", "H0", "Omega_m0", "r_s(z*)", "r_d", "z_dagger", "iters", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<32} {:-<9} {:-<9} {:-<9} {:-<9} {:-<9} {:-<6} {:-<10}",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (model, result) in results {
        let label = truncate(&model.label(), 32);
        match result {
            Ok(cal) => {
                let om = fmt_opt(matter_density(cosmo, cal.h).ok(), 4);
                let rs = fmt_opt(sound_horizon_star(cosmo, *model, cal.h).ok(), 2);
                let rd = fmt_opt(sound_horizon_drag(cosmo, *model, cal.h).ok(), 2);
                let zt = fmt_opt(transition_redshift(*model).ok(), 3);
                let flag = if cal.converged { "" } else { " (not converged)" };
                out.push_str(
                    format!(
                        "{label:<32} {:>9.4} {om:>9} {rs:>9} {rd:>9} {zt:>9} {:>6} {:>10.2e}{flag}",
                        cal.hubble_constant(),
                        cal.iterations,
                        cal.residual,
                    )
                    .trim_end(),
                );
            }
            Err(e) => out.push_str(&format!("{label:<32} error: {e}")),
        }
        out.push('\n');
    }
    out
}

/// Sweep results as a `gamma lambda value` table.
pub fn format_sweep(quantity: GridQuantity, samples: &[SweepSample]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>10} {:>10} {:>16}\n", "gamma", "lambda", quantity.display_name()));
    out.push_str(&format!("{:-<10} {:-<10} {:-<16}\n", "", "", ""));
    for s in samples {
        let value = match &s.value {
            Ok(v) => format!("{v:>16.6}"),
            Err(e) => format!("{:>16} ({e})", "-"),
        };
        out.push_str(&format!("{:>10.5} {:>10.3} {value}\n", s.gamma, s.lambda));
    }
    out
}

/// Compact summary of a grid: shape, range of values, failures.
pub fn format_grid_summary(grid: &ParameterGrid) -> String {
    let finite: Vec<f64> = grid.values.iter().copied().filter(|v| v.is_finite()).collect();
    let mut out = String::new();
    out.push_str(&format!(
        "{} on {} lambda x {} gamma points\n",
        grid.quantity.display_name(),
        grid.lambdas.len(),
        grid.gammas.len()
    ));
    if let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) {
        out.push_str(&format!("range: [{min:.6}, {max:.6}]\n"));
    }
    out.push_str(&format!("failed points: {}\n", grid.failures.len()));
    for f in grid.failures.iter().take(10) {
        out.push_str(&format!("  gamma={} lambda={}: {}\n", f.gamma, f.lambda, f.error));
    }
    if grid.failures.len() > 10 {
        out.push_str(&format!("  ... {} more\n", grid.failures.len() - 10));
    }
    out
}

/// Sampled curve values, one column per curve (curves share the redshift grid).
pub fn format_curves(curves: &[DerivedCurve]) -> String {
    let Some(first) = curves.first() else {
        return String::new();
    };
    let mut out = String::new();
    out.push_str(&format!("{}\n", first.quantity.display_name()));
    out.push_str(&format!("{:>10}", "z"));
    for c in curves {
        out.push_str(&format!(" {:>18}", truncate(&c.label, 18)));
    }
    out.push('\n');

    for (i, (z, _)) in first.points.iter().enumerate() {
        out.push_str(&format!("{z:>10.4}"));
        for c in curves {
            match c.points.get(i) {
                Some((_, v)) => out.push_str(&format!(" {v:>18.6}")),
                None => out.push_str(&format!(" {:>18}", "-")),
            }
        }
        out.push('\n');
    }
    out
}

/// Per-model absolute magnitude summary.
pub fn format_magnitudes(label: &str, residuals: &[MagnitudeResidual], summary: Option<&MagnitudeSummary>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{label}: {} supernovae\n", residuals.len()));
    match summary {
        Some(s) => out.push_str(&format!(
            "  <M_B> = {:.4} +/- {:.4} (n={})\n",
            s.mean, s.error, s.count
        )),
        None => out.push_str("  <M_B> undefined (no usable errors)\n"),
    }
    out
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    v.map(|x| format!("{x:.decimals$}")).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Quantity;

    #[test]
    fn truncate_marks_cut_labels() {
        assert_eq!(truncate("LCDM", 8), "LCDM");
        assert_eq!(truncate("gDE(gamma=-0.015)", 8), "gDE(gam.");
    }

    #[test]
    fn failed_calibration_is_shown_inline() {
        let cosmo = Cosmology::planck2018().unwrap();
        let model = Model::Gde { gamma: -0.01, lambda: 1.0 };
        let text = format_calibrations(&cosmo, &[(model, Err(ModelError::SingularExponent))]);
        assert!(text.lines().nth(2).unwrap().contains("error: lambda = 1"));
    }

    #[test]
    fn curves_share_rows() {
        let mk = |label: &str, scale: f64| DerivedCurve {
            model: Model::Lcdm,
            label: label.to_string(),
            quantity: Quantity::Expansion,
            h: 0.7,
            points: vec![(0.0, scale), (1.0, 2.0 * scale)],
        };
        let text = format_curves(&[mk("a", 1.0), mk("b", 3.0)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[3].trim_start().starts_with("1.0000"));
        assert!(lines[3].ends_with("6.000000"));
    }
}
