//! `mpg-report` library crate.
//!
//! The binary (`mpg`) is a thin wrapper around this library so that:
//!
//! - the analysis is testable without spawning processes
//! - every stage (load, clean, dedup, split, fit, diagnose, report) can be
//!   driven on its own from tests or other front-ends

pub mod app;
pub mod cli;
pub mod data;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod prep;
pub mod report;
