//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves the data source and loads the price table
//! - builds the requested view
//! - prints reports/charts and writes optional exports

use std::time::Duration;

use clap::Parser;

use crate::cli::{Command, ExportArgs, ListArgs, MarketArgs, PriceArgs, ShowArgs, SourceArgs};
use crate::data::DataSource;
use crate::domain::{Location, Material};
use crate::error::{AppError, EXIT_USAGE};
use crate::io::ingest::Ingested;
use crate::logging::{LogConfig, init_logging};
use crate::report::ChartSize;

use self::pipeline::ViewOptions;

pub mod pipeline;

/// Entry point for the `bp` binary.
pub fn run() -> Result<(), AppError> {
    // We want `bp` and `bp -l Punjab` to behave like `bp show ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format))?;

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Market(args) => handle_market(args),
        Command::List(args) => handle_list(args),
        Command::Export(args) => handle_export(args),
    }
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let options = show_options(&args)?;
    let ingested = load(&args.source)?;

    let view = pipeline::location_view(&ingested.dataset, &options);
    let chart = (!args.no_plot).then_some(ChartSize {
        width: args.width,
        height: args.height,
    });

    println!(
        "{}",
        crate::report::format_location_view(&view, &options, chart, crate::report::current_seasonal_note())
    );
    Ok(())
}

fn handle_market(args: MarketArgs) -> Result<(), AppError> {
    let options = ViewOptions {
        pellet_material: Material::new(Some(args.pellet_material.as_str())),
        briquette_material: Material::new(Some(args.briquette_material.as_str())),
        ..price_options(&args.prices)
    };
    let ingested = load(&args.source)?;

    let summary = pipeline::market_summary(&ingested.dataset, &options, args.top);
    println!("{}", crate::report::format_market(&summary, &options));
    Ok(())
}

fn handle_list(args: ListArgs) -> Result<(), AppError> {
    let source = resolve_source(&args.source)?;
    let ingested = pipeline::load_dataset(&source, timeout(&args.source))?;

    if args.report {
        println!(
            "{}",
            crate::report::format_build_report(&ingested.report, &source.describe())
        );
    }
    println!("{}", crate::report::format_catalog(&ingested.dataset));
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.json.is_none() && args.csv.is_none() {
        return Err(AppError::new(EXIT_USAGE, "Nothing to export: pass --json and/or --csv."));
    }
    let ingested = load(&args.source)?;

    if let Some(path) = &args.json {
        crate::io::snapshot::write_snapshot_json(path, &ingested.dataset)?;
        tracing::info!(path = %path.display(), entries = ingested.dataset.len(), "wrote snapshot");
    }
    if let Some(path) = &args.csv {
        crate::io::export::write_dataset_csv(path, &ingested.dataset)?;
        tracing::info!(path = %path.display(), entries = ingested.dataset.len(), "wrote csv");
    }
    Ok(())
}

fn load(args: &SourceArgs) -> Result<Ingested, AppError> {
    let source = resolve_source(args)?;
    pipeline::load_dataset(&source, timeout(args))
}

fn resolve_source(args: &SourceArgs) -> Result<DataSource, AppError> {
    Ok(DataSource::resolve(
        args.snapshot.clone(),
        args.file.clone(),
        args.url.clone(),
    )?)
}

fn timeout(args: &SourceArgs) -> Duration {
    Duration::from_secs(args.timeout.max(1))
}

fn price_options(args: &PriceArgs) -> ViewOptions {
    ViewOptions {
        price_source: args.price_source,
        strategy: args.average,
        ..ViewOptions::default()
    }
}

pub fn show_options(args: &ShowArgs) -> Result<ViewOptions, AppError> {
    let location = Location::new(&args.location)
        .ok_or_else(|| AppError::new(EXIT_USAGE, "--location must not be blank."))?;
    Ok(ViewOptions {
        location,
        pellet_material: Material::new(Some(args.pellet_material.as_str())),
        briquette_material: Material::new(Some(args.briquette_material.as_str())),
        ..price_options(&args.prices)
    })
}

/// Rewrite argv so `bp` defaults to `bp show`.
///
/// Rules:
/// - `bp`                      -> `bp show`
/// - `bp -l Punjab ...`        -> `bp show -l Punjab ...`
/// - `bp --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("show".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "market" | "list" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "show flags".
    if arg1.starts_with('-') {
        argv.insert(1, "show".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_show() {
        assert_eq!(rewrite_args(args(&["bp"])), args(&["bp", "show"]));
        assert_eq!(
            rewrite_args(args(&["bp", "-l", "Punjab"])),
            args(&["bp", "show", "-l", "Punjab"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(args(&["bp", "market"])), args(&["bp", "market"]));
        assert_eq!(rewrite_args(args(&["bp", "--help"])), args(&["bp", "--help"]));
    }

    #[test]
    fn show_options_normalize_names() {
        let cli = Cli::parse_from(rewrite_args(args(&[
            "bp",
            "--location",
            " punjab ",
            "--pellet-material",
            "husk",
        ])));
        let Command::Show(show) = cli.command else {
            panic!("expected show");
        };
        let options = show_options(&show).unwrap();
        assert_eq!(options.location, Location::new("Punjab").unwrap());
        assert_eq!(options.pellet_material, Material::new(Some("Husk")));
        assert_eq!(options.briquette_material, Material::standard());
    }

    #[test]
    fn blank_location_is_a_usage_error() {
        let cli = Cli::parse_from(args(&["bp", "show", "--location", "  "]));
        let Command::Show(show) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(show_options(&show).unwrap_err().exit_code(), EXIT_USAGE);
    }
}
