//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - parsed and cleaned car records (`RawRecord`, `Record`, `SplitRecord`)
//! - model specifications and fit outputs (`ModelSpec`, `FittedModel`)
//! - run configuration (`ReportConfig`, `DatasetSource`, `TiePolicy`)

pub mod types;

pub use types::*;
