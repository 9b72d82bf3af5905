//! Dataset acquisition: remote fetch, local file, or synthetic table.

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::data::parse::{ParsedTable, parse_table};
use crate::data::synthetic;
use crate::domain::DatasetSource;
use crate::error::AppError;

/// The UCI Machine Learning Repository copy of the Auto MPG data.
pub const DEFAULT_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/auto-mpg/auto-mpg.data";

/// Environment variable (or `.env` entry) overriding the default URL.
pub const URL_ENV: &str = "MPG_DATA_URL";

/// Resolve the dataset URL: explicit flag, then `MPG_DATA_URL`, then the default.
pub fn resolve_url(explicit: Option<&str>) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }
    dotenvy::dotenv().ok();
    std::env::var(URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_URL.to_string())
}

/// Read the raw table text for `source`.
pub fn read_source(source: &DatasetSource) -> Result<String, AppError> {
    match source {
        DatasetSource::Remote(url) => fetch_text(url),
        DatasetSource::File(path) => {
            info!(path = %path.display(), "reading dataset from file");
            std::fs::read_to_string(path).map_err(|e| {
                AppError::config(format!("Failed to read dataset '{}': {e}", path.display()))
            })
        }
        DatasetSource::Synthetic { n, seed } => {
            info!(n, seed, "generating synthetic dataset");
            synthetic::generate(*n, *seed)
        }
    }
}

/// Read and parse the table for `source`.
pub fn load(source: &DatasetSource) -> Result<ParsedTable, AppError> {
    let text = read_source(source)?;
    parse_table(&text)
}

/// Fetch the table over HTTP. Any transport or status failure is fatal.
pub fn fetch_text(url: &str) -> Result<String, AppError> {
    info!(url, "fetching dataset");
    let resp = Client::new()
        .get(url)
        .send()
        .map_err(|e| AppError::data(format!("Dataset request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::data(format!(
            "Dataset request failed with status {}.",
            resp.status()
        )));
    }

    let body = resp
        .text()
        .map_err(|e| AppError::data(format!("Failed to read dataset response: {e}")))?;
    debug!(bytes = body.len(), "dataset downloaded");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins() {
        assert_eq!(resolve_url(Some("http://localhost/x")), "http://localhost/x");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = read_source(&DatasetSource::File("/definitely/not/here.data".into())).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }

    #[test]
    fn synthetic_source_parses() {
        let table = load(&DatasetSource::Synthetic { n: 50, seed: 1 }).unwrap();
        assert_eq!(table.records.len(), 50);
        assert!(table.row_errors.is_empty());
    }
}
