//! Collapse repeated car names to their most recent model year.

use std::collections::{HashMap, HashSet};

use crate::domain::{Record, TiePolicy};

/// Keep, for each car name, the record(s) at the name's maximum model year.
///
/// Names are matched exactly. Output keeps input order and is never larger
/// than the input. With [`TiePolicy::KeepAll`] several records may survive
/// for one name when they share that maximum year; [`TiePolicy::First`] keeps
/// only the earliest of them.
pub fn dedup_latest(records: &[Record], ties: TiePolicy) -> Vec<Record> {
    let mut latest: HashMap<&str, u16> = HashMap::new();
    for r in records {
        latest
            .entry(r.car_name.as_str())
            .and_modify(|y| *y = (*y).max(r.model_year))
            .or_insert(r.model_year);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(latest.len());
    for r in records {
        if latest.get(r.car_name.as_str()) != Some(&r.model_year) {
            continue;
        }
        if ties == TiePolicy::First && !seen.insert(r.car_name.as_str()) {
            continue;
        }
        out.push(r.clone());
    }
    out
}

/// Names with more than one record after deduplication (max-year ties).
pub fn tied_names(records: &[Record]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.car_name.as_str()).or_default() += 1;
    }
    let mut names: Vec<String> = counts
        .into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|(name, _)| name.to_string())
        .collect();
    names.sort();
    names
}
