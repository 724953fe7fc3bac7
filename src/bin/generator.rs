//! Config Field Generator CLI
//!
//! Reconciles the connector OpenAPI spec against the config field catalog
//! and writes the updated catalog plus a change log when anything changed.
//!
//! Usage:
//!   config-field-generator --spec open-api-spec.json --catalog fields.json
//!   config-field-generator --check

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use connector_config_fields::{Generator, GeneratorConfig, PathOverrides};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "config-field-generator")]
#[command(about = "Reconcile the connector OpenAPI spec with the config field catalog")]
struct Cli {
    /// Config file (fieldgen.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// OpenAPI specification
    #[arg(short, long)]
    spec: Option<PathBuf>,

    /// Field catalog to reconcile
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Write the updated catalog here instead of over the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Change log file
    #[arg(long)]
    change_log: Option<PathBuf>,

    /// Report changes without writing; exit 1 if the catalog is out of date
    #[arg(long)]
    check: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut config =
        GeneratorConfig::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    config.apply_overrides(PathOverrides {
        spec: cli.spec,
        catalog: cli.catalog,
        output_catalog: cli.output,
        change_log: cli.change_log,
    });

    let format = config.change_log_format();
    let summary = Generator::new(config).check_only(cli.check).run()?;

    println!(
        "🔍 Reconciled {} services, {} catalog fields",
        summary.services.len(),
        summary.catalog_size
    );

    if !summary.outcome.updated {
        println!("✅ No changes detected - catalog is in sync");
    } else {
        for line in summary.outcome.change_log.lines(&format) {
            println!("   {}", line);
        }
        if summary.written {
            println!("📝 Catalog and change log updated");
        } else {
            eprintln!("\n⚠️  Catalog is out of date with the OpenAPI spec");
        }
    }

    Ok(summary.exit_code(cli.check))
}
