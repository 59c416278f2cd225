//! Local durable store — small key/value state in the app data directory.
//!
//! Unencrypted SQLite database at `~/MecmoIntake/intake.db`. The only
//! state the core is required to keep across restarts is the record
//! number; the store is a general key/value table so nothing here is
//! specific to that key.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::config;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cannot create data directory: {0}")]
    DataDir(#[from] std::io::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Stored value for {key} is not an integer: {value}")]
    InvalidValue { key: String, value: String },
}

/// Handle to the local durable store.
pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    /// Open (or create) the store in the given directory.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("intake.db"))?;
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open the store in the default app data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(&config::app_data_dir())
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Read a value. `None` if the key has never been written.
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Write (or overwrite) a value.
    pub fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO local_state (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Read an integer value.
    pub fn get_i64(&self, key: &str) -> Result<Option<i64>, StoreError> {
        match self.get(key)? {
            Some(value) => {
                let parsed = value.parse().map_err(|_| StoreError::InvalidValue {
                    key: key.to_string(),
                    value,
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Write an integer value.
    pub fn put_i64(&self, key: &str, value: i64) -> Result<(), StoreError> {
        self.put(key, &value.to_string())
    }
}

fn configure_pragmas(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations.
fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../resources/migrations/001_local_state.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running store migration v{version}");
            conn.execute_batch(sql).map_err(|e| StoreError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet).
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}
