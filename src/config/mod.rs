//! Key-value settings backed by SQLite.
//!
//! Shares a database with [`AuthStorage`](crate::auth::AuthStorage). Only
//! settings live here; symptom text and results are never written to disk.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::sync::Mutex;

use crate::consts::MODEL_CONFIG_KEY;

/// Persistent key-value settings store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the settings table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open config database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create config table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row("SELECT value FROM config WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value (upsert).
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM config WHERE key = ?1", [key])?;
        Ok(())
    }

    /// The model picked with `/model`, if any.
    pub fn model(&self) -> Result<Option<String>> {
        self.get(MODEL_CONFIG_KEY)
    }

    pub fn set_model(&self, model: &str) -> Result<()> {
        self.set(MODEL_CONFIG_KEY, model)
    }
}
