//! Connection-per-session factory over `rusqlite`.
//!
//! # Invariants
//! - A session is handed out only after bootstrap succeeded.
//! - A connection that fails bootstrap is dropped, never returned.

use super::config::{DbTarget, SqliteSessionConfig};
use super::{SessionError, SessionResult};
use crate::session::{Session, SessionFactory};
use log::{debug, error};
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::time::Instant;

/// Opens a new SQLite connection for every session.
#[derive(Debug, Clone, Default)]
pub struct SqliteSessionFactory {
    config: SqliteSessionConfig,
}

impl SqliteSessionFactory {
    pub fn new(config: SqliteSessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SqliteSessionConfig {
        &self.config
    }
}

impl SessionFactory for SqliteSessionFactory {
    type Session = SqliteSession;
    type Error = SessionError;

    /// # Side effects
    /// - Opens a connection and applies pragmas plus `init_sql`.
    /// - Emits `db_open` events with duration and status.
    fn create_session(&self) -> SessionResult<SqliteSession> {
        let started_at = Instant::now();
        let target = &self.config.target;
        debug!("event=db_open module=db status=start mode={}", target.mode());

        let opened = match target {
            DbTarget::File { path } => Connection::open(path),
            DbTarget::Memory => Connection::open_in_memory(),
        };
        let conn = match opened {
            Ok(conn) => conn,
            Err(source) => {
                error!(
                    "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                    target.mode(),
                    started_at.elapsed().as_millis(),
                    source
                );
                return Err(SessionError::Open {
                    target: target.to_string(),
                    source,
                });
            }
        };

        if let Err(err) = configure(&conn, &self.config) {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_configure_failed error={}",
                target.mode(),
                started_at.elapsed().as_millis(),
                err
            );
            return Err(SessionError::Configure(err));
        }

        debug!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            target.mode(),
            started_at.elapsed().as_millis()
        );
        Ok(SqliteSession { conn })
    }
}

fn configure(conn: &Connection, config: &SqliteSessionConfig) -> rusqlite::Result<()> {
    if config.foreign_keys {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    } else {
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
    }
    conn.busy_timeout(config.busy_timeout())?;
    if let Some(sql) = config.init_sql.as_deref() {
        conn.execute_batch(sql)?;
    }
    Ok(())
}

/// One SQLite connection, usable as a `Connection` through deref.
#[derive(Debug)]
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Deref for SqliteSession {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl DerefMut for SqliteSession {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Session for SqliteSession {
    type Error = SessionError;

    fn close(self) -> SessionResult<()> {
        self.conn
            .close()
            .map_err(|(_conn, err)| SessionError::Close(err))
    }
}
