//! Persistence handler — `POST /v1/checkpoint`.

use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub key: String,
    pub nodes: usize,
    pub edges: usize,
    pub saved_at: String,
}

/// `POST /v1/checkpoint` — save the current workspace to storage.
pub async fn checkpoint(State(state): State<AppState>) -> Result<Json<Checkpoint>, AppError> {
    let workspace = state.editor.workspace();
    state
        .storage
        .save_workspace(&state.workspace_key, &workspace)
        .await?;
    tracing::info!(
        key = %state.workspace_key,
        nodes = workspace.graph.len(),
        edges = workspace.graph.edge_count(),
        "workspace saved"
    );
    Ok(Json(Checkpoint {
        key: state.workspace_key.clone(),
        nodes: workspace.graph.len(),
        edges: workspace.graph.edge_count(),
        saved_at: chrono::Utc::now().to_rfc3339(),
    }))
}
