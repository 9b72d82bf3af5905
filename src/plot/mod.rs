//! Plotting: ASCII charts for the terminal and SVG figures on disk.

pub mod ascii;
pub mod svg;

pub use ascii::{render_histogram, render_mpg_scatter, render_year_scatter};
pub use svg::write_figures;
