//! Scoped session execution over pluggable persistence backends.
//! Every session handed to caller logic is closed before control returns.

pub mod db;
pub mod logging;
pub mod session;

pub use db::{
    DbTarget, SessionError, SessionResult, SqliteSession, SqliteSessionConfig, SqliteSessionFactory,
};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use session::{ScopedSessionRunner, Session, SessionFactory, SessionId};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
