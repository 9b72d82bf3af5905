//! Shared domain types.
//!
//! Records are fixed, typed structs: column names are resolved once at parse
//! time and every later stage works with named fields. Stages never mutate
//! their input; they return new vectors.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One row of the source table as parsed, before cleaning.
///
/// `horsepower` is `None` when the source field holds the `?` marker.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub mpg: f64,
    pub cylinders: u8,
    pub displacement: f64,
    pub horsepower: Option<f64>,
    pub weight: f64,
    pub acceleration: f64,
    /// Two-digit model year (70 = 1970).
    pub model_year: u16,
    pub origin: u8,
    pub car_name: String,
}

/// A cleaned car model-year with all derived fields populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub car_name: String,
    pub model_year: u16,
    pub mpg: f64,
    pub cylinders: u8,
    pub displacement: f64,
    pub horsepower: f64,
    pub weight: f64,
    pub acceleration: f64,

    pub log_horsepower: f64,
    pub hp_per_cylinder: f64,
    pub hp_per_weight: f64,
    pub weight_per_cylinder: f64,
    pub displacement_sq: f64,
}

/// Which sample a record was assigned to by the splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sample {
    Exploration,
    Evaluation,
}

impl Sample {
    pub fn label(self) -> &'static str {
        match self {
            Sample::Exploration => "exploration",
            Sample::Evaluation => "evaluation",
        }
    }
}

/// A record annotated with its synthetic id and sample membership.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRecord {
    /// Dense, 1-based, in deduplicated input order.
    pub id: usize,
    pub sample: Sample,
    pub record: Record,
}

/// Regressors used by the nested models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Covariate {
    Displacement,
    DisplacementSq,
    Weight,
    Acceleration,
    ModelYear,
}

impl Covariate {
    pub const ALL: [Covariate; 5] = [
        Covariate::Displacement,
        Covariate::DisplacementSq,
        Covariate::Weight,
        Covariate::Acceleration,
        Covariate::ModelYear,
    ];

    pub fn value(self, r: &Record) -> f64 {
        match self {
            Covariate::Displacement => r.displacement,
            Covariate::DisplacementSq => r.displacement_sq,
            Covariate::Weight => r.weight,
            Covariate::Acceleration => r.acceleration,
            Covariate::ModelYear => f64::from(r.model_year),
        }
    }

    /// Short column-style name (used in exports and the table).
    pub fn name(self) -> &'static str {
        match self {
            Covariate::Displacement => "displacement",
            Covariate::DisplacementSq => "displacement_sq",
            Covariate::Weight => "weight",
            Covariate::Acceleration => "acceleration",
            Covariate::ModelYear => "model_year",
        }
    }
}

/// One regression specification: `mpg ~ 1 + covariates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    /// 1-based position in the nested sequence.
    pub index: usize,
    pub covariates: Vec<Covariate>,
}

impl ModelSpec {
    pub fn new(index: usize, covariates: Vec<Covariate>) -> Self {
        Self { index, covariates }
    }

    /// The four nested specifications, each a superset of the previous one.
    pub fn nested() -> Vec<ModelSpec> {
        use Covariate::*;
        vec![
            ModelSpec::new(1, vec![Displacement]),
            ModelSpec::new(2, vec![Displacement, DisplacementSq]),
            ModelSpec::new(3, vec![Displacement, DisplacementSq, Weight]),
            ModelSpec::new(
                4,
                vec![Displacement, DisplacementSq, Weight, Acceleration, ModelYear],
            ),
        ]
    }

    /// Number of estimated coefficients including the intercept.
    pub fn coef_len(&self) -> usize {
        self.covariates.len() + 1
    }

    pub fn label(&self) -> String {
        format!("({})", self.index)
    }

    pub fn contains(&self, covariate: Covariate) -> bool {
        self.covariates.contains(&covariate)
    }
}

/// An estimated coefficient with its inference.
#[derive(Debug, Clone, Serialize)]
pub struct Coefficient {
    /// `"(Intercept)"` or the covariate name.
    pub name: String,
    pub estimate: f64,
    /// Classical OLS standard error.
    pub se_classical: f64,
    /// HC1 heteroskedasticity-robust standard error.
    pub se_robust: f64,
    /// `estimate / se_robust`.
    pub t_stat: f64,
    /// Two-sided p-value from Student-t with the residual degrees of freedom.
    pub p_value: f64,
}

/// A fitted OLS model.
#[derive(Debug, Clone, Serialize)]
pub struct FittedModel {
    pub spec: ModelSpec,
    /// Intercept first, then covariates in spec order.
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    /// Residual standard error `sqrt(SSR / (n - k))`.
    pub sigma: f64,
    pub n: usize,
    /// Residual degrees of freedom `n - k`.
    pub df_resid: usize,
    #[serde(skip)]
    pub residuals: Vec<f64>,
}

impl FittedModel {
    pub fn intercept(&self) -> &Coefficient {
        &self.coefficients[0]
    }

    /// The coefficient for `covariate`, if the model includes it.
    pub fn coefficient(&self, covariate: Covariate) -> Option<&Coefficient> {
        let pos = self.spec.covariates.iter().position(|&c| c == covariate)?;
        self.coefficients.get(pos + 1)
    }
}

/// How the deduplicator treats several records sharing a name and the
/// maximum model year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TiePolicy {
    /// Keep every record at the maximum year.
    #[default]
    KeepAll,
    /// Keep only the first such record in input order.
    First,
}

/// Where the raw table comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
    Remote(String),
    File(PathBuf),
    Synthetic { n: usize, seed: u64 },
}

/// A full run's configuration as understood by the pipeline.
///
/// Derived from CLI flags (plus `.env` and defaults).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub source: DatasetSource,
    pub expected_missing: usize,
    pub tie_policy: TiePolicy,
    pub split_ratio: f64,
    pub split_seed: u64,
    pub vif_threshold: f64,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_records: Option<PathBuf>,
    pub export_models: Option<PathBuf>,
    pub figures_dir: Option<PathBuf>,
}

impl ReportConfig {
    pub const DEFAULT_SEED: u64 = 3093;
    pub const DEFAULT_RATIO: f64 = 0.333;
    pub const DEFAULT_EXPECTED_MISSING: usize = 6;
    pub const DEFAULT_VIF_THRESHOLD: f64 = 4.0;

    /// Defaults for a given source, matching the CLI defaults.
    pub fn with_source(source: DatasetSource) -> Self {
        Self {
            source,
            expected_missing: Self::DEFAULT_EXPECTED_MISSING,
            tie_policy: TiePolicy::KeepAll,
            split_ratio: Self::DEFAULT_RATIO,
            split_seed: Self::DEFAULT_SEED,
            vif_threshold: Self::DEFAULT_VIF_THRESHOLD,
            plot: false,
            plot_width: 72,
            plot_height: 20,
            export_records: None,
            export_models: None,
            figures_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_specs_are_supersets() {
        let specs = ModelSpec::nested();
        assert_eq!(specs.len(), 4);
        for pair in specs.windows(2) {
            let (small, large) = (&pair[0], &pair[1]);
            assert!(large.covariates.len() > small.covariates.len());
            assert!(small.covariates.iter().all(|c| large.contains(*c)));
        }
        assert_eq!(specs[3].coef_len(), 6);
    }
}
