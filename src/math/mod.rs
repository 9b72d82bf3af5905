//! Numerical utilities: least squares, t-distribution tails, descriptive stats.

pub mod dist;
pub mod ols;
pub mod stats;

pub use dist::*;
pub use ols::*;
