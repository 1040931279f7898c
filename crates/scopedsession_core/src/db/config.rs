//! SQLite session settings.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Where each new session connects.
///
/// `Memory` gives every session its own private, empty database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DbTarget {
    File {
        path: PathBuf,
    },
    #[default]
    Memory,
}

impl DbTarget {
    /// Short label used in `db_open` log events.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Memory => "memory",
        }
    }
}

impl Display for DbTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File { path } => write!(f, "`{}`", path.display()),
            Self::Memory => write!(f, ":memory:"),
        }
    }
}

/// Connection settings applied to every session a factory creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteSessionConfig {
    pub target: DbTarget,
    pub busy_timeout_ms: u64,
    pub foreign_keys: bool,
    /// SQL batch run right after the connection opens.
    pub init_sql: Option<String>,
}

impl Default for SqliteSessionConfig {
    fn default() -> Self {
        Self {
            target: DbTarget::Memory,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            foreign_keys: true,
            init_sql: None,
        }
    }
}

impl SqliteSessionConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            target: DbTarget::File { path: path.into() },
            ..Self::default()
        }
    }

    pub fn memory() -> Self {
        Self::default()
    }

    pub fn with_init_sql(mut self, sql: impl Into<String>) -> Self {
        self.init_sql = Some(sql.into());
        self
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
