//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `scopedsession_core` linkage and SQLite session wiring.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `scopedsession_cli [db_path]` (in-memory database when omitted).

use scopedsession_core::{
    core_version, ScopedSessionRunner, SessionError, SqliteSessionConfig, SqliteSessionFactory,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match std::env::args_os().nth(1) {
        Some(path) => SqliteSessionConfig::file(path),
        None => SqliteSessionConfig::memory(),
    };
    let runner = ScopedSessionRunner::new(SqliteSessionFactory::new(config));

    println!("scopedsession_core version={}", core_version());

    // Why: going through the runner, not a bare Connection, checks the factory
    // and close path too; the session is closed before anything is printed.
    let probed = runner.run_with_result(|session| -> Result<String, SessionError> {
        let version = session.query_row("SELECT sqlite_version();", [], |row| row.get(0))?;
        Ok(version)
    });

    match probed {
        Ok(version) => {
            println!("sqlite_version={version}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error={err}");
            ExitCode::FAILURE
        }
    }
}
