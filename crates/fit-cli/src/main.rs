//! `fit`: command line for the lift-record store.
//!
//! Reads `fit.toml` (or the path given with `--config`) plus `FIT_*`
//! environment variables, opens the SQLite store and runs one subcommand.
//!
//! # Usage
//!
//! ```text
//! fit import lifts.csv --compact
//! fit record --day 15/03/2024 --exercise squat --weight 100 --reps 8 --sets 3
//! fit pb SQUAT DEADLIFT
//! fit query 'SELECT "User", MAX("Weight") FROM historic_exercises GROUP BY 1'
//! fit serve
//! ```

mod commands;
mod config;
mod render;
mod sheet;

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fit_core::lift::LIFTS_TABLE;
use fit_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "fit", version, about = "Lift records: import, dedupe, query")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "fit.toml", global = true)]
  config: PathBuf,

  /// Print results as JSON instead of text tables.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Replace the lift table with the rows of a CSV export.
  Import {
    #[arg(value_name = "FILE")]
    file:    PathBuf,
    /// Compact the rows before writing them.
    #[arg(long)]
    compact: bool,
  },

  /// Append the rows of a CSV export to the lift table.
  Append {
    #[arg(value_name = "FILE")]
    file: PathBuf,
  },

  /// Record a single set.
  Record {
    /// Session date, DD/MM/YYYY.
    #[arg(long)]
    day:      String,
    #[arg(long)]
    exercise: String,
    #[arg(long)]
    weight:   String,
    /// A count or a range such as 8-10.
    #[arg(long)]
    reps:     String,
    #[arg(long)]
    sets:     String,
    #[arg(long)]
    notes:    Option<String>,
    /// Defaults to `default_user` from the configuration.
    #[arg(long)]
    user:     Option<String>,
  },

  /// List recorded lifts.
  Lifts {
    #[arg(long)]
    exercise: Option<String>,
    #[arg(long)]
    user:     Option<String>,
  },

  /// List everyone with recorded lifts.
  Lifters,

  /// Rewrite the lift table without duplicate performances.
  Compact,

  /// Personal bests per lifter, optionally for some exercises only.
  Pb {
    #[arg(value_name = "EXERCISE")]
    exercises: Vec<String>,
  },

  /// Exercise catalog.
  #[command(subcommand)]
  Catalog(CatalogCommand),

  /// Run read-only SQL.
  Query { sql: String },

  /// Run the SQL block of an assistant reply read from FILE or stdin.
  RunResponse {
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
  },

  /// Describe a table the way the assistant is told about it.
  Context {
    #[arg(default_value = LIFTS_TABLE)]
    table:       String,
    #[arg(long)]
    description: Option<String>,
  },

  /// List tables.
  Tables,

  /// Rewrite the lift table with integer reps. Ranges such as 8-10 are lost.
  Migrate {
    #[arg(long, default_value = LIFTS_TABLE)]
    table: String,
  },

  /// Serve the JSON API.
  Serve {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
  },
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
  /// Replace the catalog with the rows of a CSV export.
  Import {
    #[arg(value_name = "FILE")]
    file: PathBuf,
  },
  /// File an ad-hoc exercise under MISC.
  AddMisc { exercise: String },
  /// List the planned sessions.
  Sessions,
  /// List catalog exercises, optionally for one session.
  List {
    #[arg(long)]
    session: Option<String>,
  },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;
  let store = SqliteStore::open(&cfg.store)
    .with_context(|| format!("failed to open store in {:?}", cfg.store.db_dir))?;

  let runner = commands::Runner { store, cfg, json: cli.json };
  runner.run(cli.command).await
}
