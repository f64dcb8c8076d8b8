//! Public surface for the `apigraph-server` crate.
//!
//! Exposes the router builder, the editor and the storage types so that
//! tests and embedding crates can run the service in-process without
//! spawning a subprocess.

pub mod config;
pub mod editor;
pub mod error;
pub mod handlers;
pub mod router;
pub mod storage;
pub mod validation;

use apigraph::Workspace;

pub use config::ServerConfig;
pub use editor::{EditError, Editor};
pub use handlers::AppState;
pub use router::build_router;
pub use storage::{memory::MemoryStorage, sqlite::SqliteStorage, Storage, StorageError};
pub use validation::{ValidationReport, ValidationScheduler};

/// Restore the workspace stored under `key` (empty when nothing is stored)
/// and wrap it in an [`Editor`]. With `validate_on_load`, a validation run
/// is scheduled immediately so issues exist before the first edit.
pub async fn restore_editor(
    storage: &dyn Storage,
    key: &str,
    config: &ServerConfig,
) -> Result<Editor, StorageError> {
    let workspace = match storage.load_workspace(key).await? {
        Some(ws) => {
            tracing::info!(
                key,
                nodes = ws.graph.len(),
                edges = ws.graph.edge_count(),
                "workspace restored"
            );
            ws
        }
        None => {
            tracing::info!(key, "no stored workspace; starting empty");
            Workspace::default()
        }
    };

    let editor = Editor::new(workspace, ValidationScheduler::new(config.validation_delay));
    if config.validate_on_load {
        let generation = editor.validate_now();
        tracing::debug!(generation, "validation scheduled after restore");
    }
    Ok(editor)
}
