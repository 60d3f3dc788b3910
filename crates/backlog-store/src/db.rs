//! Database connection management

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Connection settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbConfig {
    /// How long a writer waits on a locked database before failing
    pub busy_timeout_ms: u64,
    /// Use the WAL journal (ignored by in-memory databases)
    pub wal: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            wal: true,
        }
    }
}

/// Open a SQLite database at the given path with foreign keys enforced
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let conn = Connection::open(path).map_err(from_rusqlite)?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;
    Ok(conn)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(from_rusqlite)?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;
    Ok(conn)
}

/// Open, configure and migrate a database file
pub fn open_configured<P: AsRef<Path>>(path: P, config: &DbConfig) -> Result<Connection> {
    let mut conn = open(path)?;
    configure_with(&conn, config)?;
    crate::migrations::apply_migrations(&mut conn)?;
    Ok(conn)
}

/// Configure a connection with the default settings
pub fn configure(conn: &Connection) -> Result<()> {
    configure_with(conn, &DbConfig::default())
}

/// Configure a connection
///
/// Foreign keys are always enforced: the story → epic → session references
/// are what turn a dangling parent into a constraint violation.
pub fn configure_with(conn: &Connection, config: &DbConfig) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;

    if config.wal {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(from_rusqlite)?;
    }

    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(from_rusqlite)?;

    Ok(())
}
