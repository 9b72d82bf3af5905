//! Finite-variance checks for the outcome and covariates.
//!
//! The best linear predictor is well-defined only when second moments exist;
//! in a finite sample we check that each sample variance is finite and
//! positive. The result is informational and never changes any estimate.

use serde::Serialize;

use crate::domain::{Covariate, Record};
use crate::math::stats::sample_variance;

#[derive(Debug, Clone, Serialize)]
pub struct VarianceCheck {
    pub variable: &'static str,
    pub variance: Option<f64>,
    pub ok: bool,
}

/// Variables checked: MPG plus every modelled covariate.
pub fn variance_checks(records: &[&Record]) -> Vec<VarianceCheck> {
    let mut out = Vec::with_capacity(Covariate::ALL.len() + 1);
    let mpg: Vec<f64> = records.iter().map(|r| r.mpg).collect();
    out.push(check("mpg", &mpg));
    for c in Covariate::ALL {
        let values: Vec<f64> = records.iter().map(|r| c.value(r)).collect();
        out.push(check(c.name(), &values));
    }
    out
}

fn check(variable: &'static str, values: &[f64]) -> VarianceCheck {
    let variance = sample_variance(values);
    let ok = variance.is_some_and(|v| v.is_finite() && v > 0.0);
    VarianceCheck {
        variable,
        variance,
        ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRecord;
    use crate::prep::clean::derive;

    fn rec(mpg: f64, year: u16) -> Record {
        let raw = RawRecord {
            mpg,
            cylinders: 4,
            displacement: 100.0 + mpg,
            horsepower: Some(80.0),
            weight: 2000.0 + mpg * 10.0,
            acceleration: 15.0 + mpg / 10.0,
            model_year: year,
            origin: 1,
            car_name: "x".to_string(),
        };
        derive(&raw, 80.0).unwrap()
    }

    #[test]
    fn constant_column_fails_check() {
        let recs = vec![rec(20.0, 76), rec(25.0, 76), rec(30.0, 76)];
        let refs: Vec<&Record> = recs.iter().collect();
        let checks = variance_checks(&refs);
        assert_eq!(checks.len(), 6);
        let year = checks.iter().find(|c| c.variable == "model_year").unwrap();
        assert!(!year.ok);
        assert!(checks.iter().filter(|c| c.variable != "model_year").all(|c| c.ok));
    }

    #[test]
    fn single_record_has_no_variance() {
        let recs = vec![rec(20.0, 70)];
        let refs: Vec<&Record> = recs.iter().collect();
        assert!(variance_checks(&refs).iter().all(|c| !c.ok && c.variance.is_none()));
    }
}
