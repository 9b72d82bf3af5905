//! SVG figures rendered with Plotters.
//!
//! Each figure is a standalone file in the output directory. Series data and
//! bounds are computed up front; the drawing functions only draw.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::domain::{Covariate, FittedModel, Record};
use crate::error::AppError;
use crate::math::stats::{kde, silverman_bandwidth};

const SIZE: (u32, u32) = (800, 600);
const BINS: usize = 20;

type DrawResult = Result<(), Box<dyn Error>>;

/// Write the four report figures into `dir`, creating it if needed.
///
/// `fit` is the simple model drawn over the scatter; pass `None` to omit it.
pub fn write_figures(dir: &Path, records: &[&Record], fit: Option<&FittedModel>) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::config(format!("Failed to create figures directory '{}': {e}", dir.display())))?;

    let mpg: Vec<f64> = records.iter().map(|r| r.mpg).collect();
    let displacement: Vec<f64> = records.iter().map(|r| r.displacement).collect();

    let figures: [(&str, Box<dyn Fn(&Path) -> DrawResult + '_>); 4] = [
        ("mpg_vs_displacement.svg", Box::new(|p: &Path| draw_scatter(p, records, fit))),
        ("mpg_by_model_year.svg", Box::new(|p: &Path| draw_year_scatter(p, records))),
        ("mpg_density.svg", Box::new(|p: &Path| draw_density(p, &mpg, "MPG"))),
        ("displacement_density.svg", Box::new(|p: &Path| draw_density(p, &displacement, "Displacement (cu in)"))),
    ];

    let mut written = Vec::with_capacity(figures.len());
    for (name, draw) in figures {
        let path = dir.join(name);
        draw(&path).map_err(|e| AppError::data(format!("Failed to render '{}': {e}", path.display())))?;
        info!(path = %path.display(), "wrote figure");
        written.push(path);
    }
    Ok(written)
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo.is_finite() && hi.is_finite() && hi > lo {
        let pad = (hi - lo) * 0.05;
        Some((lo - pad, hi + pad))
    } else {
        None
    }
}

fn draw_scatter(path: &Path, records: &[&Record], fit: Option<&FittedModel>) -> DrawResult {
    let (x0, x1) = bounds(records.iter().map(|r| r.displacement)).ok_or("not enough data")?;
    let (y0, y1) = bounds(records.iter().map(|r| r.mpg)).ok_or("not enough data")?;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("MPG vs displacement", ("sans-serif", 22))
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Displacement (cu in)")
        .y_desc("MPG")
        .draw()?;

    chart.draw_series(
        records
            .iter()
            .map(|r| Circle::new((r.displacement, r.mpg), 3, BLUE.mix(0.6).filled())),
    )?;

    if let Some(fit) = fit {
        let b0 = fit.intercept().estimate;
        let b1 = fit.coefficient(Covariate::Displacement).map_or(0.0, |c| c.estimate);
        let steps = 100;
        let line = (0..=steps).map(|i| {
            let d = x0 + (x1 - x0) * i as f64 / steps as f64;
            (d, b0 + b1 * d)
        });
        chart
            .draw_series(LineSeries::new(line, RED.stroke_width(2)))?
            .label(format!("model {}", fit.spec.label()))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn draw_year_scatter(path: &Path, records: &[&Record]) -> DrawResult {
    let (x0, x1) = bounds(records.iter().map(|r| r.displacement)).ok_or("not enough data")?;
    let (y0, y1) = bounds(records.iter().map(|r| r.mpg)).ok_or("not enough data")?;
    let (first, last) = records
        .iter()
        .fold((u16::MAX, u16::MIN), |(a, b), r| (a.min(r.model_year), b.max(r.model_year)));
    let span = f64::from(last.saturating_sub(first).max(1));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("MPG vs displacement by model year", ("sans-serif", 22))
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Displacement (cu in)")
        .y_desc("MPG")
        .draw()?;

    // Hue runs from red (earliest year) to blue (latest).
    let color = move |year: u16| HSLColor(f64::from(year - first) / span * 0.66, 0.8, 0.45);
    chart.draw_series(
        records
            .iter()
            .map(|r| Circle::new((r.displacement, r.mpg), 3, color(r.model_year).filled())),
    )?;

    for year in [first, last] {
        chart
            .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
            .label(format!("19{year}"))
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, color(year).filled()));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_density(path: &Path, values: &[f64], label: &str) -> DrawResult {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &v| (a.min(v), b.max(v)));
    if !lo.is_finite() || hi <= lo {
        return Err("not enough data".into());
    }

    let bin_w = (hi - lo) / BINS as f64;
    let mut counts = [0usize; BINS];
    for &v in values {
        counts[(((v - lo) / bin_w) as usize).min(BINS - 1)] += 1;
    }
    let n = values.len() as f64;
    let bars: Vec<(f64, f64, f64)> = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| (lo + i as f64 * bin_w, lo + (i + 1) as f64 * bin_w, c as f64 / (n * bin_w)))
        .collect();

    let curve: Vec<(f64, f64)> = match silverman_bandwidth(values) {
        Some(bw) => (0..=200)
            .map(|i| {
                let x = lo + (hi - lo) * i as f64 / 200.0;
                (x, kde(values, bw, x))
            })
            .collect(),
        None => Vec::new(),
    };

    let y_max = bars
        .iter()
        .map(|b| b.2)
        .chain(curve.iter().map(|p| p.1))
        .fold(0.0_f64, f64::max)
        * 1.1;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Distribution of {label}"), ("sans-serif", 22))
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(lo..hi, 0.0..y_max.max(f64::EPSILON))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(label)
        .y_desc("Density")
        .draw()?;

    chart.draw_series(
        bars.iter()
            .map(|&(x0, x1, d)| Rectangle::new([(x0, 0.0), (x1, d)], BLUE.mix(0.3).filled())),
    )?;
    chart.draw_series(LineSeries::new(curve, RED.stroke_width(2)))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRecord;
    use crate::prep::clean::derive;

    fn recs() -> Vec<Record> {
        (0..30)
            .map(|i| {
                let d = 80.0 + i as f64 * 10.0;
                let raw = RawRecord {
                    mpg: 40.0 - d / 15.0 + (i % 3) as f64,
                    cylinders: 4,
                    displacement: d,
                    horsepower: Some(90.0),
                    weight: 2000.0 + d * 5.0,
                    acceleration: 15.0,
                    model_year: 70 + (i % 13) as u16,
                    origin: 1,
                    car_name: format!("car {i}"),
                };
                derive(&raw, 90.0).unwrap()
            })
            .collect()
    }

    #[test]
    fn writes_all_figures() {
        let dir = std::env::temp_dir().join(format!("mpg-figures-{}", std::process::id()));
        let records = recs();
        let refs: Vec<&Record> = records.iter().collect();

        let paths = write_figures(&dir, &refs, None).unwrap();
        assert_eq!(paths.len(), 4);
        for p in &paths {
            let svg = fs::read_to_string(p).unwrap();
            assert!(svg.contains("<svg"));
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_sample_is_a_data_error() {
        let dir = std::env::temp_dir().join(format!("mpg-figures-empty-{}", std::process::id()));
        let err = write_figures(&dir, &[], None).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
        let _ = fs::remove_dir_all(&dir);
    }
}
