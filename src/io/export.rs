//! Export prepared records to CSV and model results to JSON.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::domain::{DatasetSource, FittedModel, ModelSpec, ReportConfig, Sample, TiePolicy};
use crate::error::AppError;
use crate::fit::NestedFits;
use crate::prep::Partition;
use crate::report::Narrative;

/// One CSV row: a prepared record with its split assignment.
#[derive(Debug, Serialize)]
struct RecordRow<'a> {
    id: usize,
    sample: Sample,
    car_name: &'a str,
    model_year: u16,
    mpg: f64,
    cylinders: u8,
    displacement: f64,
    horsepower: f64,
    weight: f64,
    acceleration: f64,
    log_horsepower: f64,
    hp_per_cylinder: f64,
    hp_per_weight: f64,
    weight_per_cylinder: f64,
    displacement_sq: f64,
}

/// Write every split record (both samples) to a CSV file, in id order.
pub fn write_records_csv(path: &Path, partition: &Partition) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::config(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for s in &partition.records {
        let r = &s.record;
        writer
            .serialize(RecordRow {
                id: s.id,
                sample: s.sample,
                car_name: &r.car_name,
                model_year: r.model_year,
                mpg: r.mpg,
                cylinders: r.cylinders,
                displacement: r.displacement,
                horsepower: r.horsepower,
                weight: r.weight,
                acceleration: r.acceleration,
                log_horsepower: r.log_horsepower,
                hp_per_cylinder: r.hp_per_cylinder,
                hp_per_weight: r.hp_per_weight,
                weight_per_cylinder: r.weight_per_cylinder,
                displacement_sq: r.displacement_sq,
            })
            .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to write export CSV: {e}")))?;
    Ok(())
}

/// Run settings echoed into the JSON export.
#[derive(Debug, Serialize)]
struct RunMeta {
    source: String,
    split_seed: u64,
    split_ratio: f64,
    tie_policy: TiePolicy,
    expected_missing: usize,
    generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct SkippedModel<'a> {
    spec: &'a ModelSpec,
    reason: &'a str,
}

#[derive(Debug, Serialize)]
struct ModelsFile<'a> {
    tool: &'static str,
    run: RunMeta,
    models: &'a [FittedModel],
    skipped: Vec<SkippedModel<'a>>,
    diagnostics: &'a Diagnostics,
    narrative: Option<&'a Narrative>,
}

fn describe_source(source: &DatasetSource) -> String {
    match source {
        DatasetSource::Remote(url) => url.clone(),
        DatasetSource::File(path) => path.display().to_string(),
        DatasetSource::Synthetic { n, seed } => format!("synthetic(n={n}, seed={seed})"),
    }
}

/// Write fitted models, diagnostics and headline figures to a JSON file.
pub fn write_models_json(
    path: &Path,
    fits: &NestedFits,
    diagnostics: &Diagnostics,
    narrative: Option<&Narrative>,
    config: &ReportConfig,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create models JSON '{}': {e}", path.display())))?;

    let doc = ModelsFile {
        tool: "mpg",
        run: RunMeta {
            source: describe_source(&config.source),
            split_seed: config.split_seed,
            split_ratio: config.split_ratio,
            tie_policy: config.tie_policy,
            expected_missing: config.expected_missing,
            generated_at: Utc::now(),
        },
        models: &fits.fits,
        skipped: fits
            .skipped
            .iter()
            .map(|(spec, reason)| SkippedModel { spec, reason })
            .collect(),
        diagnostics,
        narrative,
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::config(format!("Failed to write models JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::run_diagnostics;
    use crate::domain::{RawRecord, Record};
    use crate::fit::fit_nested;
    use crate::prep::clean::derive;
    use crate::prep::split;

    fn records() -> Vec<Record> {
        (0..40)
            .map(|i| {
                let d = 90.0 + (i * 37 % 300) as f64;
                let raw = RawRecord {
                    mpg: 42.0 - d / 12.0 + (i % 5) as f64 * 0.7,
                    cylinders: if d > 250.0 { 8 } else { 4 },
                    displacement: d,
                    horsepower: Some(60.0 + d / 3.0),
                    weight: 1800.0 + d * 6.0 + (i % 7) as f64 * 40.0,
                    acceleration: 12.0 + (i % 9) as f64 * 0.8,
                    model_year: 70 + (i % 13) as u16,
                    origin: 1,
                    car_name: format!("make \"{i}\", model"),
                };
                derive(&raw, 60.0 + d / 3.0).unwrap()
            })
            .collect()
    }

    fn tmp(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mpg-export-{}-{name}", std::process::id()))
    }

    #[test]
    fn records_csv_has_header_and_every_row() {
        let recs = records();
        let partition = split(&recs, 0.25, 7).unwrap();
        let path = tmp("records.csv");
        write_records_csv(&path, &partition).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "id");
        assert_eq!(&headers[1], "sample");
        assert_eq!(&headers[2], "car_name");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 40);
        // Names with quotes and commas survive quoting.
        assert_eq!(&rows[0][2], "make \"0\", model");
        let explore = rows.iter().filter(|r| &r[1] == "exploration").count();
        assert_eq!(explore, 10);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn models_json_lists_fits_and_diagnostics() {
        let recs = records();
        let refs: Vec<&Record> = recs.iter().collect();
        let fits = fit_nested(&refs).unwrap();
        let diagnostics = run_diagnostics(&refs, &fits, 4.0);
        let config = ReportConfig::with_source(DatasetSource::Synthetic { n: 40, seed: 1 });
        let path = tmp("models.json");

        write_models_json(&path, &fits, &diagnostics, None, &config).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["tool"], "mpg");
        assert_eq!(v["run"]["split_seed"], 3093);
        assert_eq!(v["run"]["source"], "synthetic(n=40, seed=1)");
        assert_eq!(v["models"].as_array().unwrap().len() + v["skipped"].as_array().unwrap().len(), 4);
        assert!(v["models"][0]["coefficients"][0]["se_robust"].is_number());
        assert!(v["models"][0].get("residuals").is_none());
        assert!(v["narrative"].is_null());
        let _ = std::fs::remove_file(&path);
    }
}
