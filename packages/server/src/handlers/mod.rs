//! HTTP request handlers for the editor service.
//!
//! Each submodule covers a logical group of endpoints. Handlers are thin
//! async functions that receive Axum extractors, call the [`Editor`] and
//! return `Result<impl IntoResponse, AppError>`. All graph logic lives in
//! the editor and the core library.

pub mod document;
pub mod graph;
pub mod validation;
pub mod workspace;

use std::sync::Arc;

use crate::{editor::Editor, storage::Storage};

/// Shared application state threaded through all Axum handlers via [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    pub editor: Arc<Editor>,
    pub storage: Arc<dyn Storage>,
    /// Key the workspace is saved under.
    pub workspace_key: String,
}
