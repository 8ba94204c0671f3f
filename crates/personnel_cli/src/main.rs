//! Console front end for the personnel store.
//!
//! # Responsibility
//! - Resolve runtime config from flags and environment.
//! - Own the single store session for the process lifetime.
//! - Run the interactive menu against stdin/stdout.

mod console;

use clap::Parser;
use personnel_core::{
    init_from_config, open_session, AppConfig, EmployeeService, SqliteEmployeeRepository,
};
use std::io;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "personnel",
    version = personnel_core::core_version(),
    about = "Employee record manager"
)]
struct Cli {
    /// SQLite database file, or `:memory:` for a throwaway store.
    #[arg(long, env = "PERSONNEL_DB")]
    db: Option<String>,
    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "PERSONNEL_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; stderr when omitted.
    #[arg(long, env = "PERSONNEL_LOG_DIR")]
    log_dir: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match AppConfig::from_raw(
        cli.db.as_deref(),
        cli.log_level.as_deref(),
        cli.log_dir.as_deref(),
    ) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let session = open_session(&config);
    if !session.is_available() {
        eprintln!("warning: database is unavailable; every action will fail until restart");
    }

    let outcome = match SqliteEmployeeRepository::try_new(&session) {
        Ok(repo) => {
            let service = EmployeeService::new(repo);
            let stdin = io::stdin();
            console::run(&service, stdin.lock(), io::stdout())
        }
        Err(err) => {
            eprintln!("cannot use database: {err}");
            Ok(())
        }
    };

    if let Err(err) = session.close() {
        log::warn!("event=db_close module=cli status=error error={err}");
    }
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("console error: {err}");
            ExitCode::FAILURE
        }
    }
}
