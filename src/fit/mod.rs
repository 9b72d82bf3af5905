//! Model fitting.
//!
//! Responsibilities:
//!
//! - OLS for a single specification (`fitter`)
//! - classical and HC1 coefficient covariance (`robust`)
//! - the nested sequence of MPG models (`nested`)

pub mod fitter;
pub mod nested;
pub mod robust;

pub use fitter::*;
pub use nested::*;
