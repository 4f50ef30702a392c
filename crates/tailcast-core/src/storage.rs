use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::TailcastError;
use crate::models::settings::{API_KEY, MODEL_NAME};
use crate::models::PersistedSettings;

const SCHEMA_V1: &str = include_str!("../../../migrations/001_settings.sql");

/// SQLite-backed key/value store for user settings.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, TailcastError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, TailcastError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    // ── Raw key/value access ────────────────────────────────────

    pub fn get_setting(&self, key: &str) -> Result<Option<String>, TailcastError> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), TailcastError> {
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete_setting(&self, key: &str) -> Result<(), TailcastError> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Typed settings ──────────────────────────────────────────

    pub fn load_settings(&self) -> Result<PersistedSettings, TailcastError> {
        Ok(PersistedSettings {
            api_key: self.get_setting(API_KEY)?,
            model_name: self.get_setting(MODEL_NAME)?,
        })
    }

    /// Write every field that is `Some`; `None` fields are left as stored.
    pub fn save_settings(&self, settings: &PersistedSettings) -> Result<(), TailcastError> {
        if let Some(ref key) = settings.api_key {
            self.set_setting(API_KEY, key)?;
        }
        if let Some(ref model) = settings.model_name {
            self.set_setting(MODEL_NAME, model)?;
        }
        Ok(())
    }
}

fn run_migrations(conn: &Connection) -> Result<(), TailcastError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
        tracing::debug!(from = version, "applied settings schema v1");
    }
    Ok(())
}
