//! Application-level error type returned by handlers.
//!
//! All variants serialise to the [`ErrorResponse`] JSON body and map to the
//! appropriate HTTP status code.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use apigraph::ExportError;

use crate::editor::EditError;
use crate::storage::StorageError;

/// Body of every error response.
///
/// ```json
/// { "error": "a model node cannot be linked to a path node", "code": "connection_rejected" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable description of the problem.
    pub error: String,

    /// Machine-readable error code.
    ///
    /// | `code` | HTTP status |
    /// |--------|------------|
    /// | `invalid_parameter` | 400 |
    /// | `not_found` | 404 |
    /// | `id_conflict` | 409 |
    /// | `invalid_patch` | 422 |
    /// | `connection_rejected` | 422 |
    /// | `missing_endpoint` | 422 |
    /// | `internal_error` | 500 |
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }
}

/// Well-known error codes.
pub mod codes {
    pub const INVALID_PARAMETER: &str = "invalid_parameter";
    pub const NOT_FOUND: &str = "not_found";
    pub const ID_CONFLICT: &str = "id_conflict";
    pub const INVALID_PATCH: &str = "invalid_patch";
    pub const CONNECTION_REJECTED: &str = "connection_rejected";
    pub const MISSING_ENDPOINT: &str = "missing_endpoint";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// An error that a handler can return; converts directly to an HTTP response.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    /// 422 with a specific code.
    Unprocessable(&'static str, String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, codes::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, codes::INVALID_PARAMETER, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, codes::ID_CONFLICT, msg),
            AppError::Unprocessable(code, msg) => (StatusCode::UNPROCESSABLE_ENTITY, code, msg),
            AppError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR, msg)
            }
        };
        let body = ErrorResponse::new(code, message);
        (status, Json(body)).into_response()
    }
}

impl From<EditError> for AppError {
    fn from(e: EditError) -> Self {
        let msg = e.to_string();
        match e {
            EditError::NodeNotFound(_) | EditError::EdgeNotFound(_) => AppError::NotFound(msg),
            EditError::NodeIdTaken(_) | EditError::EdgeIdTaken(_) => AppError::Conflict(msg),
            EditError::MissingEndpoint { .. } => {
                AppError::Unprocessable(codes::MISSING_ENDPOINT, msg)
            }
            EditError::InvalidPatch(_) => AppError::Unprocessable(codes::INVALID_PATCH, msg),
            EditError::Connect(_) => AppError::Unprocessable(codes::CONNECTION_REJECTED, msg),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}
