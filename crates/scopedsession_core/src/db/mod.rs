//! SQLite backend for the session capability traits.
//!
//! # Responsibility
//! - Open and configure one `rusqlite::Connection` per session.
//! - Map connection open/configure/close failures into `SessionError`.
//!
//! # Invariants
//! - Every returned session has its configured pragmas applied.
//! - Closing goes through `Connection::close` so close failures are reported.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod config;
mod factory;

pub use config::{DbTarget, SqliteSessionConfig};
pub use factory::{SqliteSession, SqliteSessionFactory};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    Open {
        target: String,
        source: rusqlite::Error,
    },
    Configure(rusqlite::Error),
    Close(rusqlite::Error),
    Sqlite(rusqlite::Error),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "failed to open sqlite session on {target}: {source}")
            }
            Self::Configure(err) => write!(f, "failed to configure sqlite session: {err}"),
            Self::Close(err) => write!(f, "failed to close sqlite session: {err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Configure(err) | Self::Close(err) | Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for SessionError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
