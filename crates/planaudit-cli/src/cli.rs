//! planaudit - report logged queries whose SQLite plan contains a full scan
//!
//! Reads a query log written by the application's statement instrumentation,
//! explains every query against a reference database with the same schema,
//! and prints each query whose plan scans a whole table.

mod logging;

use anyhow::Context;
use clap::Parser;
use logging::LoggingConfig;
use planaudit_core::config::{DEFAULT_DATABASE_PATH, DEFAULT_LOG_PATH};
use planaudit_core::{AuditConfig, ErrorPolicy, read_log};
use planaudit_driver_sqlite::ReferenceDatabase;
use planaudit_services::Auditor;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "planaudit")]
#[command(version)]
#[command(about = "Report logged queries whose SQLite plan contains a full scan")]
#[command(long_about = "Report logged queries whose SQLite plan contains a full scan

The query log holds one line per distinct query:
  Query: <sql> was executed <n> times

Each query is explained (never executed) against a reference database whose
schema matches the application's, with a dummy 0 bound to every `?`.
Queries whose plan mentions SCAN are printed with their execution count and
plan rows. Diagnostics go to stderr; RUST_LOG overrides the log filter.

EXAMPLES:
  # Audit ./queries.log against ./test.db
  planaudit

  # Build the reference database from a schema dump instead
  planaudit --schema schema.sql --log app-queries.log

  # Report what can be checked and skip the rest
  planaudit --keep-going")]
struct Args {
    /// Query log to audit
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_LOG_PATH)]
    log: PathBuf,

    /// Reference database with the application's schema
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_DATABASE_PATH)]
    database: PathBuf,

    /// Build an in-memory reference database from this schema script instead of --database
    #[arg(short, long, value_name = "FILE", conflicts_with = "database")]
    schema: Option<PathBuf>,

    /// Skip malformed lines and failing queries instead of stopping
    #[arg(short, long)]
    keep_going: bool,

    /// Log more detail to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn audit_config(&self) -> AuditConfig {
        let policy = if self.keep_going {
            ErrorPolicy::Continue
        } else {
            ErrorPolicy::Abort
        };

        let config = AuditConfig::new()
            .with_log_path(&self.log)
            .with_database_path(&self.database)
            .with_error_policy(policy);

        match &self.schema {
            Some(schema) => config.with_schema_path(schema),
            None => config,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init(LoggingConfig::verbose(args.verbose)).context("Failed to initialize logging")?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Starting planaudit");

    run(&args.audit_config())
}

fn run(config: &AuditConfig) -> anyhow::Result<()> {
    let log_text = read_log(&config.log_path)
        .with_context(|| format!("Failed to read query log {}", config.log_path.display()))?;

    let db = ReferenceDatabase::from_config(config).context("Failed to open reference database")?;

    let auditor = Auditor::new(db).with_error_policy(config.error_policy);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    auditor
        .run(&log_text, &mut out)
        .context("Query log audit aborted")?;
    out.flush()?;

    Ok(())
}
