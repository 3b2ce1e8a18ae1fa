//! Trend chart support: display bounds and a terminal line chart.

pub mod ascii;
pub mod bounds;

pub use ascii::*;
pub use bounds::*;
