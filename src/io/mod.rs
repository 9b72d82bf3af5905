//! Result exports: prepared records (CSV) and fitted models (JSON).

pub mod export;

pub use export::*;
