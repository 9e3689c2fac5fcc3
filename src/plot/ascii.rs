//! ASCII plotting for terminal output.
//!
//! A fixed character grid shared by all curves of one quantity. The output is
//! deterministic, so the renderer is covered by a golden test.
//!
//! Curves get one glyph each (`-`, `*`, `+`, ...) and a legend line; data
//! points are drawn on top as `o`.

use crate::domain::{CurveFile, DerivedCurve};

const CURVE_GLYPHS: [char; 6] = ['-', '*', '+', '~', '=', '#'];

/// Render one or more curves of the same quantity, plus optional `(z, value)` points.
pub fn render_ascii_plot(curves: &[DerivedCurve], points: &[(f64, f64)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = || {
        curves
            .iter()
            .flat_map(|c| c.points.iter().copied())
            .chain(points.iter().copied())
            .filter(|(z, v)| z.is_finite() && v.is_finite())
    };
    let (z_min, z_max) = range(all().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(all().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let (y_min, y_max) = (y_min - pad, y_max + pad);
    let x_axis = Axis { lo: z_min, hi: z_max, cells: width, flipped: false };
    let y_axis = Axis { lo: y_min, hi: y_max, cells: height, flipped: true };

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first (so points can overlay).
    for (idx, curve) in curves.iter().enumerate() {
        let glyph = CURVE_GLYPHS[idx % CURVE_GLYPHS.len()];
        draw_curve(&mut grid, &curve.points, glyph, &x_axis, &y_axis);
    }
    for &(z, v) in points {
        if z.is_finite() && v.is_finite() {
            grid[y_axis.cell(v)][x_axis.cell(z)] = 'o';
        }
    }

    let mut out = String::new();
    let (name, unit) = curves
        .first()
        .map(|c| (c.quantity.display_name(), c.quantity.unit()))
        .unwrap_or(("y", ""));
    out.push_str(&format!(
        "Plot: z=[{z_min:.3}, {z_max:.3}] | {name}=[{y_min:.2}, {y_max:.2}]"
    ));
    if !unit.is_empty() {
        out.push(' ');
        out.push_str(unit);
    }
    out.push('\n');

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    for (idx, curve) in curves.iter().enumerate() {
        let glyph = CURVE_GLYPHS[idx % CURVE_GLYPHS.len()];
        out.push_str(&format!("  {glyph} {} (H0={:.2})\n", curve.label, 100.0 * curve.h));
    }
    if !points.is_empty() {
        out.push_str("  o data\n");
    }

    out
}

/// Render every curve stored in a curve JSON file.
pub fn render_ascii_plot_from_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    render_ascii_plot(&curve.curves, &[], width, height)
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

/// Maps a data interval onto `cells` grid positions.
struct Axis {
    lo: f64,
    hi: f64,
    cells: usize,
    /// Rows count downwards, so the y axis puts `hi` at cell 0.
    flipped: bool,
}

impl Axis {
    fn cell(&self, v: f64) -> usize {
        let last = self.cells.max(2) as f64 - 1.0;
        let u = ((v - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0);
        let pos = if self.flipped { last - u * last } else { u * last };
        pos.round() as usize
    }
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], glyph: char, x_axis: &Axis, y_axis: &Axis) {
    // Non-finite samples break the line.
    let mut prev: Option<(usize, usize)> = None;
    for &(z, v) in curve {
        if !(z.is_finite() && v.is_finite()) {
            prev = None;
            continue;
        }
        let cell = (x_axis.cell(z), y_axis.cell(v));
        let from = prev.unwrap_or(cell);
        draw_segment(grid, from, cell, glyph);
        prev = Some(cell);
    }
}

/// Fill the cells between two grid positions by stepping along the longer axis.
/// Occupied cells keep their glyph.
fn draw_segment(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), glyph: char) {
    let (x0, y0) = (from.0 as f64, from.1 as f64);
    let (dx, dy) = (to.0 as f64 - x0, to.1 as f64 - y0);
    let steps = dx.abs().max(dy.abs()) as usize;

    for i in 0..=steps {
        let t = if steps == 0 { 0.0 } else { i as f64 / steps as f64 };
        let x = (x0 + t * dx).round() as usize;
        let y = (y0 + t * dy).round() as usize;
        if let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)).filter(|c| **c == ' ') {
            *cell = glyph;
        }
    }
}
