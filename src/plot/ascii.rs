//! ASCII plotting for terminal output.
//!
//! Fixed-size character grids, deterministic so they can be golden-tested.
//!
//! Plot elements:
//! - observations: `o` (or a model-year glyph)
//! - fitted line: `-`
//! - histogram bars: `#`, kernel density: `*`

use crate::domain::{Covariate, FittedModel, Record};
use crate::math::stats::{kde, silverman_bandwidth};

/// First model year in the data; glyphs count up from `a`.
const FIRST_YEAR: u16 = 70;

/// MPG against displacement, optionally with a fitted curve overlay.
pub fn render_mpg_scatter(records: &[&Record], fit: Option<&FittedModel>, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64, char)> = records.iter().map(|r| (r.displacement, r.mpg, 'o')).collect();
    let Some((x_min, x_max)) = range(points.iter().map(|p| p.0)) else {
        return "Plot: not enough data\n".to_string();
    };
    let curve = fit.map(|f| sample_fit(f, records, x_min, x_max, width.max(2)));
    let mut out = String::from("MPG vs displacement\n");
    out.push_str(&render_plot(&points, curve.as_deref(), x_min, x_max, width, height));
    out
}

/// MPG against displacement, one glyph per model year (`a` = 1970).
pub fn render_year_scatter(records: &[&Record], width: usize, height: usize) -> String {
    let points: Vec<(f64, f64, char)> = records
        .iter()
        .map(|r| (r.displacement, r.mpg, year_glyph(r.model_year)))
        .collect();
    let Some((x_min, x_max)) = range(points.iter().map(|p| p.0)) else {
        return "Plot: not enough data\n".to_string();
    };
    let mut out = String::from("MPG vs displacement by model year\n");
    out.push_str(&render_plot(&points, None, x_min, x_max, width, height));

    let mut years: Vec<u16> = records.iter().map(|r| r.model_year).collect();
    years.sort_unstable();
    years.dedup();
    let legend: Vec<String> = years.iter().map(|y| format!("{}=19{y}", year_glyph(*y))).collect();
    out.push_str(&format!("Legend: {}\n", legend.join(" ")));
    out
}

fn year_glyph(year: u16) -> char {
    let offset = year.saturating_sub(FIRST_YEAR);
    if offset < 26 {
        char::from(b'a' + offset as u8)
    } else {
        '?'
    }
}

/// Histogram of `values` with a Gaussian KDE overlay.
///
/// Bars are scaled as densities so the KDE curve shares the y axis.
pub fn render_histogram(values: &[f64], label: &str, bins: usize, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let bins = bins.clamp(1, width);
    let Some((x_min, x_max)) = range(values.iter().copied()) else {
        return format!("Histogram of {label}: not enough data\n");
    };

    let bin_w = (x_max - x_min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let i = (((v - x_min) / bin_w) as usize).min(bins - 1);
        counts[i] += 1;
    }
    let n = values.len() as f64;
    let densities: Vec<f64> = counts.iter().map(|&c| c as f64 / (n * bin_w)).collect();

    let bw = silverman_bandwidth(values);
    let curve: Vec<(f64, f64)> = match bw {
        Some(bw) => (0..width)
            .map(|col| {
                let x = x_min + (col as f64 + 0.5) / width as f64 * (x_max - x_min);
                (x, kde(values, bw, x))
            })
            .collect(),
        None => Vec::new(),
    };

    let y_max = densities
        .iter()
        .copied()
        .chain(curve.iter().map(|p| p.1))
        .fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let mut grid = vec![vec![' '; width]; height];
    for col in 0..width {
        let bin = (col * bins / width).min(bins - 1);
        let top = map_y(densities[bin], 0.0, y_max, height);
        if densities[bin] > 0.0 {
            for row in grid.iter_mut().skip(top) {
                row[col] = '#';
            }
        }
    }
    for (col, &(_, d)) in curve.iter().enumerate() {
        grid[map_y(d, 0.0, y_max, height)][col] = '*';
    }

    let mut out = format!(
        "Histogram of {label}: x=[{x_min:.1}, {x_max:.1}] | density max={y_max:.4}"
    );
    if let Some(bw) = bw {
        out.push_str(&format!(" | kde bw={bw:.3}"));
    }
    out.push('\n');
    push_grid(&mut out, grid);
    out
}

fn render_plot(
    points: &[(f64, f64, char)],
    curve: Option<&[(f64, f64)]>,
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let ys = points
        .iter()
        .map(|p| p.1)
        .chain(curve.into_iter().flatten().map(|p| p.1));
    let (y_min, y_max) = range(ys).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it.
    if let Some(curve) = curve {
        draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);
    }
    for &(x, y, ch) in points {
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = ch;
    }

    let mut out = format!("Plot: x=[{x_min:.1}, {x_max:.1}] | y=[{y_min:.2}, {y_max:.2}]\n");
    push_grid(&mut out, grid);
    out
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

/// Predicted MPG along the displacement axis, holding other covariates at
/// their sample means.
fn sample_fit(fit: &FittedModel, records: &[&Record], x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n_rec = records.len().max(1) as f64;
    let coef = |c: Covariate| fit.coefficient(c).map_or(0.0, |k| k.estimate);
    let others: f64 = fit
        .spec
        .covariates
        .iter()
        .filter(|c| !matches!(c, Covariate::Displacement | Covariate::DisplacementSq))
        .map(|&c| coef(c) * records.iter().map(|r| c.value(r)).sum::<f64>() / n_rec)
        .sum();
    let base = fit.intercept().estimate + others;
    let (b_disp, b_sq) = (coef(Covariate::Displacement), coef(Covariate::DisplacementSq));

    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let d = x_min + u * (x_max - x_min);
            (d, base + b_disp * d + b_sq * d * d)
        })
        .collect()
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

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y max is row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
