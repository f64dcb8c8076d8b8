//! SQLite-backed storage implementation.
//!
//! Uses `rusqlite` (with bundled SQLite) wrapped in an `Arc<Mutex<Connection>>`
//! to satisfy the `Send + Sync` requirements. All blocking calls are offloaded
//! to a thread-pool via `tokio::task::spawn_blocking`.
//!
//! # Schema
//!
//! - `workspaces` — one JSON blob per key, with the time it was last saved.

use std::sync::{Arc, Mutex};

use apigraph::Workspace;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use super::{Storage, StorageError};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS workspaces (
    key       TEXT PRIMARY KEY,
    data      TEXT NOT NULL,
    saved_at  TEXT NOT NULL
);
";

// ---------------------------------------------------------------------------
// SqliteStorage
// ---------------------------------------------------------------------------

/// SQLite-backed implementation of [`Storage`].
///
/// Holds a single database connection protected by a `Mutex`. All operations
/// run inside `spawn_blocking` to avoid blocking the async runtime.
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (or create) the SQLite database at `path` and apply the schema.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database (data is lost when dropped).
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// When the workspace under `key` was last saved (RFC 3339), if ever.
    pub async fn saved_at(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            conn.query_row(
                "SELECT saved_at FROM workspaces WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(map_err)
        })
        .await
        .map_err(|e| StorageError::Internal(format!("task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// Error conversions
// ---------------------------------------------------------------------------

fn map_err(e: rusqlite::Error) -> StorageError {
    StorageError::Internal(e.to_string())
}

// ---------------------------------------------------------------------------
// Storage impl
// ---------------------------------------------------------------------------

#[async_trait]
impl Storage for SqliteStorage {
    async fn load_workspace(&self, key: &str) -> Result<Option<Workspace>, StorageError> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            let data: Option<String> = conn
                .query_row(
                    "SELECT data FROM workspaces WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
                .map_err(map_err)?;

            match data {
                None => Ok(None),
                Some(json) => serde_json::from_str(&json)
                    .map(Some)
                    .map_err(|e| StorageError::Corrupt {
                        key,
                        reason: e.to_string(),
                    }),
            }
        })
        .await
        .map_err(|e| StorageError::Internal(format!("task join error: {e}")))?
    }

    async fn save_workspace(&self, key: &str, workspace: &Workspace) -> Result<(), StorageError> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();
        let data = serde_json::to_string(workspace)
            .map_err(|e| StorageError::Internal(format!("JSON error: {e}")))?;
        let saved_at = chrono::Utc::now().to_rfc3339();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            conn.execute(
                "INSERT INTO workspaces (key, data, saved_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET data = excluded.data, saved_at = excluded.saved_at",
                params![key, data, saved_at],
            )
            .map_err(map_err)?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::Internal(format!("task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
