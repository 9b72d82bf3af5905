//! Synthetic Auto MPG style table for offline runs and tests.
//!
//! The generated text uses the exact source layout (including `?` horsepower
//! markers and repeated car names across model years), so it exercises the
//! same parse/clean/dedup path as the real dataset.
//!
//! Relations are loosely calibrated to the real data: MPG falls with
//! displacement at a decreasing rate, rises with model year, and falls with
//! weight. The numbers are illustrative only.

use std::fmt::Write as _;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

const MAKES: [&str; 10] = [
    "ford",
    "chevrolet",
    "toyota",
    "datsun",
    "plymouth",
    "amc",
    "dodge",
    "honda",
    "volkswagen",
    "buick",
];

/// Every `MISSING_EVERY`-th row (offset by `MISSING_OFFSET`) gets a `?` horsepower.
const MISSING_EVERY: usize = 60;
const MISSING_OFFSET: usize = 7;

/// Generate `n` rows of synthetic data, deterministic in `seed`.
pub fn generate(n: usize, seed: u64) -> Result<String, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::<f64>::new(0.0, 1.0)
        .map_err(|e| AppError::data(format!("Noise distribution error: {e}")))?;

    // About four rows per three names, so some names repeat across years.
    let n_names = (n * 3 / 4).max(1);
    let mut out = String::with_capacity(n * 80);

    for i in 0..n {
        let name_idx = i % n_names;
        let make = MAKES[name_idx % MAKES.len()];
        let name = format!("{make} model {name_idx}");

        let cylinders: u8 = *[4u8, 4, 4, 6, 8].choose(&mut rng).unwrap_or(&4);
        let (d_mean, d_sd) = match cylinders {
            4 => (110.0, 20.0),
            6 => (220.0, 25.0),
            _ => (340.0, 45.0),
        };
        let displacement: f64 = (d_mean + d_sd * noise.sample(&mut rng)).max(60.0);
        let horsepower: f64 = (0.35 * displacement + 30.0 + 8.0 * noise.sample(&mut rng)).max(40.0);
        let weight: f64 = (1500.0 + 6.5 * displacement + 200.0 * noise.sample(&mut rng)).max(1500.0);
        let acceleration: f64 = (22.0 - 0.05 * horsepower + 1.2 * noise.sample(&mut rng)).max(8.0);
        let model_year: u16 = rng.gen_range(70..=82);
        let origin: u8 = if cylinders == 4 { rng.gen_range(1..=3) } else { 1 };

        let mpg: f64 = (55.0 - 0.16 * displacement + 0.00022 * displacement * displacement
            - 0.003 * weight
            + 0.7 * (f64::from(model_year) - 76.0)
            + 2.5 * noise.sample(&mut rng))
        .max(9.0);

        let hp_field = if i % MISSING_EVERY == MISSING_OFFSET {
            "?".to_string()
        } else {
            format!("{horsepower:.1}")
        };

        let _ = writeln!(
            out,
            "{mpg:.1}   {cylinders}   {displacement:.1}   {hp_field}   {weight:.0}.   {acceleration:.1}   {model_year}  {origin}\t\"{name}\""
        );
    }

    Ok(out)
}

/// Number of `?` markers `generate(n, _)` emits.
pub fn expected_missing(n: usize) -> usize {
    (0..n).filter(|i| i % MISSING_EVERY == MISSING_OFFSET).count()
}
