//! Command-line parsing for the biomass price explorer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the normalization and lookup code.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::data::DEFAULT_TIMEOUT;
use crate::domain::{AVERAGE_LOCATION, AverageStrategy, DEFAULT_MATERIAL, PriceSource};
use crate::logging::LogFormat;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bp", version, about = "Biomass pellet & briquette price explorer (sheet-backed)")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prices, trend charts and data completeness for one location (default).
    Show(ShowArgs),
    /// Best buy / best sell, reference prices and the cheapest locations.
    Market(MarketArgs),
    /// List the locations and materials present in the data.
    List(ListArgs),
    /// Write the normalized dataset as a JSON snapshot and/or CSV.
    Export(ExportArgs),
}

/// Where the price table comes from.
///
/// Precedence: `--snapshot`, then `--file`, then `--url`, then `PRICE_SHEET_URL`.
#[derive(Debug, Parser, Clone)]
pub struct SourceArgs {
    /// Sheet API endpoint returning a JSON array of rows.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Local file with the same JSON array the API returns.
    #[arg(long, value_name = "JSON")]
    pub file: Option<PathBuf>,

    /// Snapshot written by `bp export --json`.
    #[arg(long, value_name = "JSON")]
    pub snapshot: Option<PathBuf>,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,
}

/// How current prices and computed averages are derived.
#[derive(Debug, Parser, Clone)]
pub struct PriceArgs {
    /// Field supplying the current price.
    #[arg(long, value_enum, default_value_t = PriceSource::Column)]
    pub price_source: PriceSource,

    /// Statistic used when no AVERAGE row exists.
    #[arg(long, value_enum, default_value_t = AverageStrategy::Mean)]
    pub average: AverageStrategy,
}

#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub prices: PriceArgs,

    /// Location to show (case-insensitive). AVERAGE shows the nationwide view.
    #[arg(short, long, default_value = AVERAGE_LOCATION)]
    pub location: String,

    /// Pellet material.
    #[arg(long, default_value = DEFAULT_MATERIAL)]
    pub pellet_material: String,

    /// Briquette material.
    #[arg(long, default_value = DEFAULT_MATERIAL)]
    pub briquette_material: String,

    /// Disable the terminal trend charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 48)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 10)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct MarketArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub prices: PriceArgs,

    /// Pellet material for the reference price.
    #[arg(long, default_value = DEFAULT_MATERIAL)]
    pub pellet_material: String,

    /// Briquette material for the reference price.
    #[arg(long, default_value = DEFAULT_MATERIAL)]
    pub briquette_material: String,

    /// Show the N cheapest locations per fuel type.
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Also list rows skipped during normalization.
    #[arg(long)]
    pub report: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write a JSON snapshot (reloadable with `--snapshot`).
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Write one CSV row per entry.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}
