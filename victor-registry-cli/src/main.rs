//! victor-registry - integrity checks and PyPI sync for the vertical registry

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use victor_registry_core::catalog::{self, pypi::DEFAULT_PYPI_URL, PypiCatalog};
use victor_registry_core::sync::{IndexSync, SyncAction, SyncSummary, VersionChange};
use victor_registry_core::validator::{self, IndexValidator, PackageValidator};
use victor_registry_core::{RegistryConfig, ValidationReport};

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "victor-registry",
    about = "Validate and sync the Victor vertical registry",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON lines
    #[clap(long, global = true)]
    log_json: bool,

    /// Registry root (defaults to $VICTOR_REGISTRY_ROOT, then the nearest
    /// directory above the current one containing index.json)
    #[clap(long, global = true)]
    root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate index.json and every package it registers
    ValidateIndex {
        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Validate a single package directory
    ValidatePackage {
        /// Package directory to validate
        path: PathBuf,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Merge published victor-* packages from PyPI into index.json
    Sync {
        /// Report what would change without writing index.json
        #[clap(long)]
        dry_run: bool,

        /// PyPI-compatible server to query
        #[clap(long, default_value = DEFAULT_PYPI_URL)]
        pypi_url: String,
    },

    /// List the validation rules in evaluation order
    Rules,
}

fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    // Reports own stdout; logs always go to stderr
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_json);
    debug!("Parsed arguments: {:?}", cli);

    let result = match cli.command {
        Command::ValidateIndex { json } => validate_index_command(cli.root, json),
        Command::ValidatePackage { path, json } => validate_package_command(path, json),
        Command::Sync { dry_run, pypi_url } => sync_command(cli.root, dry_run, pypi_url).await,
        Command::Rules => {
            rules_command();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("ERROR: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

fn validate_index_command(root: Option<PathBuf>, json: bool) -> Result<()> {
    let config = RegistryConfig::discover(root)?;
    info!("Validating {}", config.index_path().display());

    let report = validator::validate_index(&config)?;
    emit_report(&report, json)
}

fn validate_package_command(path: PathBuf, json: bool) -> Result<()> {
    info!("Validating package directory: {}", path.display());

    let report = validator::validate_package(&path)?;
    emit_report(&report, json)
}

/// Print a report and exit non-zero when it failed
fn emit_report(report: &ValidationReport, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            report.to_json().context("Failed to serialize report")?
        );
    } else {
        print!("{}", report.render_text());
    }

    if !report.passed() {
        std::process::exit(report.exit_code());
    }

    Ok(())
}

async fn sync_command(root: Option<PathBuf>, dry_run: bool, pypi_url: String) -> Result<()> {
    let config = RegistryConfig::discover(root)?;

    println!("Syncing from {pypi_url}...");
    println!("Index: {}", config.index_path().display());
    if dry_run {
        println!("DRY RUN MODE - No changes will be made");
    }
    println!();

    let packages = catalog::fetch_or_empty(&PypiCatalog::new(pypi_url)).await;
    let summary = IndexSync::new(config, dry_run).run(&packages)?;

    if packages.is_empty() {
        println!("No victor-* packages found");
        return Ok(());
    }

    print_sync_summary(&summary);
    Ok(())
}

fn print_sync_summary(summary: &SyncSummary) {
    if summary.actions.is_empty() {
        println!("All verticals are up to date");
    }

    for action in &summary.actions {
        match action {
            SyncAction::Updated {
                name,
                from,
                to,
                change,
            } => {
                let note = match change {
                    VersionChange::Downgrade => " (downgrade)",
                    _ => "",
                };
                println!("  Updating {name} from {from} to {to}{note}");
            }
            SyncAction::Added { name, version } => {
                println!("  New package: {name} {version}");
            }
        }
    }

    println!();
    if summary.written {
        println!("Updated {}", summary.index_path.display());
    } else {
        println!("Dry run - no changes made");
    }
    println!("Sync complete: {} vertical(s)", summary.total_verticals);
}

fn rules_command() {
    println!("Index rules:");
    for (id, description) in IndexValidator::new().rules() {
        println!("  {id:<18} {description}");
    }
    println!();
    println!("Package rules:");
    for (id, description) in PackageValidator::new().rules() {
        println!("  {id:<18} {description}");
    }
}
