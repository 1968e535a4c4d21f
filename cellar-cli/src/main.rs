//! cellar - a CLI driver for the struct-store package experiment.
//!
//! Thin dispatch over the library crates: `cellar-fetch` downloads,
//! `cellar-parse` reads control files, `cellar-resolve` orders installs, and
//! `cellar-store` is the database all of it reads and writes. This binary's
//! own job is argument parsing, configuration loading, logging setup, and
//! translating each subcommand into calls on those crates.

mod commands;
mod config;
mod error;
mod schema;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{FetchArgs, GcArgs, ImportArgs, InspectArgs, PlanArgs};
use config::Config;
use error::{CliError, Result};

/// cellar - fetch, import, and order packages in a struct-store.
#[derive(Parser, Debug)]
#[command(name = "cellar")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A package-manager experiment over a struct-store", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true, env = "CELLAR_VERBOSE")]
    verbose: bool,

    /// Path to a `cellar.toml` configuration file.
    #[arg(short, long, global = true, env = "CELLAR_CONFIG")]
    config: Option<PathBuf>,

    /// Disable ANSI color in log output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download a file over HTTP(S), retrying transient failures.
    Fetch {
        url: String,
        dest: PathBuf,

        /// Expected SHA-256 checksum (lowercase hex) of the downloaded file.
        #[arg(long)]
        checksum: Option<String>,
    },

    /// Parse a control file and merge its packages into a store.
    Import {
        control_file: PathBuf,
        store_path: PathBuf,
    },

    /// Compute an install order for one or more packages already in a store.
    Plan {
        store_path: PathBuf,

        #[arg(required = true)]
        packages: Vec<String>,

        /// Print install batches instead of one flat, ordered list.
        #[arg(long)]
        parallel: bool,
    },

    /// Run (or, without `--force`, conditionally run) garbage collection.
    Gc {
        store_path: PathBuf,

        /// Collect regardless of how much has been allocated since the last
        /// collection.
        #[arg(long)]
        force: bool,
    },

    /// Print a store's header fields for debugging.
    Inspect { store_path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.no_color)?;
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch { url, dest, checksum } => commands::run_fetch(FetchArgs {
            url,
            dest,
            checksum,
            retry: config.retry_policy(),
        }),
        Commands::Import { control_file, store_path } => commands::run_import(ImportArgs {
            control_file,
            store_path,
            store_options: config.store_options(),
        }),
        Commands::Plan { store_path, packages, parallel } => {
            commands::run_plan(PlanArgs { store_path, packages, parallel })
        },
        Commands::Gc { store_path, force } => commands::run_gc(GcArgs {
            store_path,
            force,
            store_options: config.store_options(),
        }),
        Commands::Inspect { store_path } => commands::run_inspect(InspectArgs { store_path }),
    }
}

fn init_logging(verbose: bool, no_color: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = fmt::layer().with_ansi(!no_color).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| CliError::Config(format!("failed to initialize logging: {e}")))?;

    Ok(())
}
