//! Storage abstraction layer for the editor service.
//!
//! The [`Storage`] trait is the contract between the editor and persistence.
//! A stored value is a whole [`Workspace`] (document header plus graph),
//! addressed by a string key; the service uses
//! [`apigraph::WORKSPACE_KEY`]. Derived state (the projected document and its
//! issues) is never stored.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemoryStorage`] | Tests and ephemeral sessions |
//! | [`SqliteStorage`] | Durable single-file database |
//!
//! [`MemoryStorage`]: memory::MemoryStorage
//! [`SqliteStorage`]: sqlite::SqliteStorage

pub mod memory;
pub mod sqlite;

use apigraph::Workspace;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Errors that storage operations can return.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The stored value under `key` could not be decoded as a workspace.
    #[error("stored workspace {key:?} is unreadable: {reason}")]
    Corrupt { key: String, reason: String },

    /// An unexpected error in the underlying storage backend.
    #[error("internal storage error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// The persistence contract for workspaces.
///
/// Implementations must be `Send + Sync + 'static` so they can be held in an
/// `Arc<dyn Storage>`.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Return the workspace stored under `key`, or `None` if nothing has been
    /// saved there yet.
    async fn load_workspace(&self, key: &str) -> Result<Option<Workspace>, StorageError>;

    /// Store `workspace` under `key`, replacing any previous value.
    async fn save_workspace(&self, key: &str, workspace: &Workspace) -> Result<(), StorageError>;
}
