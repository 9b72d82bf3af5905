//! Seeded exploration/evaluation split.
//!
//! Ids `1..=N` are assigned in input order, shuffled with a seeded `StdRng`,
//! and the first `round(ratio * N)` shuffled ids form the exploration sample.
//! Membership therefore depends only on `(seed, N, ratio)` and record order.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::{Record, Sample, SplitRecord};
use crate::error::AppError;

/// Records annotated with sample membership, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub records: Vec<SplitRecord>,
    pub ratio: f64,
    pub seed: u64,
}

impl Partition {
    pub fn exploration(&self) -> Vec<&Record> {
        self.sample(Sample::Exploration)
    }

    pub fn evaluation(&self) -> Vec<&Record> {
        self.sample(Sample::Evaluation)
    }

    pub fn sample(&self, which: Sample) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| r.sample == which)
            .map(|r| &r.record)
            .collect()
    }

    /// `(exploration, evaluation)` sizes.
    pub fn counts(&self) -> (usize, usize) {
        let n_explore = self
            .records
            .iter()
            .filter(|r| r.sample == Sample::Exploration)
            .count();
        (n_explore, self.records.len() - n_explore)
    }
}

/// Number of exploration records for `n` records at `ratio`.
pub fn exploration_size(n: usize, ratio: f64) -> usize {
    ((ratio * n as f64).round() as usize).min(n)
}

/// Partition `records` into exploration and evaluation samples.
pub fn split(records: &[Record], ratio: f64, seed: u64) -> Result<Partition, AppError> {
    if !(ratio.is_finite() && ratio > 0.0 && ratio < 1.0) {
        return Err(AppError::config(format!(
            "Split ratio must be in (0, 1), got {ratio}."
        )));
    }

    let n = records.len();
    let mut ids: Vec<usize> = (1..=n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    ids.shuffle(&mut rng);

    let mut membership = vec![Sample::Evaluation; n];
    for &id in ids.iter().take(exploration_size(n, ratio)) {
        membership[id - 1] = Sample::Exploration;
    }

    let records = records
        .iter()
        .zip(membership)
        .enumerate()
        .map(|(i, (record, sample))| SplitRecord {
            id: i + 1,
            sample,
            record: record.clone(),
        })
        .collect();

    Ok(Partition {
        records,
        ratio,
        seed,
    })
}
