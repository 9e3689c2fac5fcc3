//! Plotters-powered SVG chart of derived curves.
//!
//! All series and bounds are computed before drawing so the render step only
//! draws.

use std::path::Path;

use plotters::prelude::*;

use crate::domain::DerivedCurve;
use crate::error::AppError;

/// High-contrast palette, cycled per curve.
const PALETTE: [RGBColor; 6] = [
    RGBColor(0, 0, 0),
    RGBColor(214, 39, 40),
    RGBColor(31, 119, 180),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
    RGBColor(255, 127, 14),
];

/// Write `curves` (and optional `(z, value, error)` data points) to an SVG file.
pub fn write_svg_chart(
    path: &Path,
    curves: &[DerivedCurve],
    points: &[(f64, f64, f64)],
    size: (u32, u32),
) -> Result<(), AppError> {
    let Some(first) = curves.first() else {
        return Err(AppError::new(3, "No curves to plot."));
    };
    let (x_bounds, y_bounds) = bounds(curves, points)
        .ok_or_else(|| AppError::new(4, "Curves contain no finite samples to plot."))?;

    let y_label = if first.quantity.unit().is_empty() {
        first.quantity.display_name().to_string()
    } else {
        format!("{} [{}]", first.quantity.display_name(), first.quantity.unit())
    };

    draw(path, curves, points, size, x_bounds, y_bounds, &y_label)
        .map_err(|e| AppError::new(2, format!("Failed to write SVG chart '{}': {e}", path.display())))?;

    tracing::info!(path = %path.display(), curves = curves.len(), "wrote SVG chart");
    Ok(())
}

fn draw(
    path: &Path,
    curves: &[DerivedCurve],
    points: &[(f64, f64, f64)],
    size: (u32, u32),
    x: [f64; 2],
    y: [f64; 2],
    y_label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(y_label, ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x[0]..x[1], y[0]..y[1])?;

    chart
        .configure_mesh()
        .x_desc("z")
        .y_desc(y_label)
        .x_labels(8)
        .y_labels(8)
        .draw()?;

    for (idx, curve) in curves.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let samples: Vec<(f64, f64)> = curve
            .points
            .iter()
            .copied()
            .filter(|(z, v)| z.is_finite() && v.is_finite())
            .collect();
        chart
            .draw_series(LineSeries::new(samples, color.stroke_width(2)))?
            .label(format!("{} (H0={:.2})", curve.label, 100.0 * curve.h))
            .legend(move |(lx, ly)| PathElement::new(vec![(lx, ly), (lx + 20, ly)], color.stroke_width(2)));
    }

    if !points.is_empty() {
        let data = RGBColor(90, 90, 90);
        chart.draw_series(points.iter().map(|&(z, v, err)| {
            PathElement::new(vec![(z, v - err), (z, v + err)], data.stroke_width(1))
        }))?;
        chart.draw_series(points.iter().map(|&(z, v, _)| Circle::new((z, v), 3, data.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn bounds(curves: &[DerivedCurve], points: &[(f64, f64, f64)]) -> Option<([f64; 2], [f64; 2])> {
    let mut x = [f64::INFINITY, f64::NEG_INFINITY];
    let mut y = [f64::INFINITY, f64::NEG_INFINITY];
    let samples = curves
        .iter()
        .flat_map(|c| c.points.iter().map(|&(z, v)| (z, v, 0.0)))
        .chain(points.iter().copied());
    for (z, v, err) in samples {
        if !(z.is_finite() && v.is_finite()) {
            continue;
        }
        let err = if err.is_finite() { err.abs() } else { 0.0 };
        x = [x[0].min(z), x[1].max(z)];
        y = [y[0].min(v - err), y[1].max(v + err)];
    }
    if !(x[0].is_finite() && y[0].is_finite()) {
        return None;
    }
    if x[1] <= x[0] {
        x[1] = x[0] + 1.0;
    }
    let pad = ((y[1] - y[0]) * 0.05).max(1e-9);
    Some((x, [y[0] - pad, y[1] + pad]))
}
