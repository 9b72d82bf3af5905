//! Dataset loading.
//!
//! - fetch / read / generate the raw table (`source`)
//! - parse it into typed rows (`parse`)
//! - synthetic tables for offline runs (`synthetic`)

pub mod parse;
pub mod source;
pub mod synthetic;

pub use parse::{ParsedTable, RowError, parse_table};
pub use source::{DEFAULT_URL, load, resolve_url};
