//! CLI smoke entry point.
//!
//! Opens the configured roster database and prints the core version plus
//! per-table row counts and orphan counts. Settings come from flags or the
//! same `ROSTER_*` variables `RosterConfig::from_env` reads.

use clap::Parser;
use log::error;
use roster_core::db::schema::{row_count, Table};
use roster_core::{core_version, default_log_level, Roster, RosterConfig};
use std::path::PathBuf;
use std::process::ExitCode;

/// Inspect a roster database.
#[derive(Parser, Debug)]
#[command(name = "roster", version)]
struct Cli {
    /// SQLite file to open; omit for an in-memory database
    #[arg(long, env = "ROSTER_DB_PATH")]
    db: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "ROSTER_LOG_LEVEL", default_value_t = default_log_level().to_string())]
    log_level: String,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "ROSTER_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

impl From<Cli> for RosterConfig {
    fn from(cli: Cli) -> Self {
        Self {
            db_path: cli.db,
            log_level: cli.log_level,
            log_dir: cli.log_dir,
        }
    }
}

fn main() -> ExitCode {
    let config = RosterConfig::from(Cli::parse());
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("roster: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &RosterConfig) -> Result<(), String> {
    config.init_logging()?;
    let conn = config.open_connection().map_err(|err| err.to_string())?;

    println!("roster_core version={}", core_version());
    for table in Table::ALL {
        let count = row_count(&conn, table).map_err(|err| err.to_string())?;
        println!("table={} rows={count}", table.name());
    }

    let roster = Roster::new(&conn);
    let orphaned_members = roster.orphaned_members().map_err(|err| err.to_string())?;
    let orphaned_reviews = roster.orphaned_reviews().map_err(|err| err.to_string())?;
    println!(
        "orphans members={} reviews={}",
        orphaned_members.len(),
        orphaned_reviews.len()
    );
    Ok(())
}
