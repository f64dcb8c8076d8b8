//! Document handlers: header, projected document and export.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use apigraph::{export, Document, DocumentHeader, ExportFormat};

use super::AppState;
use crate::error::AppError;

/// `GET /v1/header`
pub async fn get_header(State(state): State<AppState>) -> Json<DocumentHeader> {
    Json(state.editor.header())
}

/// `PUT /v1/header` — replace the header; re-projects and schedules validation.
pub async fn put_header(
    State(state): State<AppState>,
    payload: Result<Json<DocumentHeader>, JsonRejection>,
) -> Result<Json<DocumentHeader>, AppError> {
    let Json(header) = payload?;
    state.editor.set_header(header);
    Ok(Json(state.editor.header()))
}

/// `GET /v1/document` — the document projected from the current graph.
pub async fn get_document(State(state): State<AppState>) -> Json<Document> {
    Json(state.editor.document())
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

/// `GET /v1/export?format=json|yaml` — the document as text, JSON by default.
pub async fn export_document(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<Response, AppError> {
    let format = match params.format.as_deref() {
        None => ExportFormat::default(),
        Some(f) => f.parse::<ExportFormat>().map_err(AppError::BadRequest)?,
    };
    let body = export::export(&state.editor.document(), format)?;
    let disposition = format!("attachment; filename=\"openapi.{}\"", format.extension());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
