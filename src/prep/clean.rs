//! Cleaning: drop missing horsepower, compute derived fields.
//!
//! Derived fields are only ever computed from a row whose horsepower has been
//! validated, so no record downstream can carry a missing value.

use tracing::{debug, warn};

use crate::domain::{RawRecord, Record};

/// Cleaning output plus what was dropped and why.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub records: Vec<Record>,
    /// Rows dropped because horsepower was the missing marker.
    pub dropped_missing_hp: usize,
    /// Rows dropped because a derived field would be undefined
    /// (non-positive horsepower, cylinders or weight).
    pub dropped_invalid: usize,
    /// Set when `dropped_missing_hp` differs from the expected count.
    pub missing_warning: Option<String>,
}

/// Clean `raw` into typed records.
///
/// A deviation from `expected_missing` is a data-quality warning only.
pub fn clean(raw: &[RawRecord], expected_missing: usize) -> CleanOutput {
    let mut records = Vec::with_capacity(raw.len());
    let mut dropped_missing_hp = 0usize;
    let mut dropped_invalid = 0usize;

    for row in raw {
        let Some(hp) = row.horsepower else {
            dropped_missing_hp += 1;
            continue;
        };
        match derive(row, hp) {
            Some(r) => records.push(r),
            None => {
                debug!(car = %row.car_name, year = row.model_year, "dropping row with invalid inputs");
                dropped_invalid += 1;
            }
        }
    }

    let missing_warning = (dropped_missing_hp != expected_missing).then(|| {
        let msg = format!(
            "Expected {expected_missing} rows with missing horsepower, found {dropped_missing_hp}."
        );
        warn!("{msg}");
        msg
    });

    CleanOutput {
        records,
        dropped_missing_hp,
        dropped_invalid,
        missing_warning,
    }
}

/// Build a cleaned record from a raw row and its validated horsepower.
///
/// Returns `None` when any derived field would be non-finite.
pub fn derive(raw: &RawRecord, horsepower: f64) -> Option<Record> {
    if !(horsepower > 0.0 && raw.weight > 0.0 && raw.cylinders > 0) {
        return None;
    }
    let cylinders = f64::from(raw.cylinders);

    let record = Record {
        car_name: raw.car_name.clone(),
        model_year: raw.model_year,
        mpg: raw.mpg,
        cylinders: raw.cylinders,
        displacement: raw.displacement,
        horsepower,
        weight: raw.weight,
        acceleration: raw.acceleration,
        log_horsepower: horsepower.ln(),
        hp_per_cylinder: horsepower / cylinders,
        hp_per_weight: horsepower / raw.weight,
        weight_per_cylinder: raw.weight / cylinders,
        displacement_sq: raw.displacement * raw.displacement,
    };

    let derived = [
        record.log_horsepower,
        record.hp_per_cylinder,
        record.hp_per_weight,
        record.weight_per_cylinder,
        record.displacement_sq,
    ];
    derived.iter().all(|v| v.is_finite()).then_some(record)
}
