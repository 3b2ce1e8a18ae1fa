//! `biomass-prices` library crate.
//!
//! The binary (`bp`) is a thin wrapper around this library so that:
//!
//! - normalization and lookup are testable without spawning processes
//! - the dataset can be reused by other front ends (a web page, a bot)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod stats;
