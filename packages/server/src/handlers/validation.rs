//! Validation handlers: current report, on-demand runs and the live stream.

use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Serialize;
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};

use super::AppState;
use crate::validation::ValidationReport;

/// `GET /v1/issues` — the latest committed report.
pub async fn get_issues(State(state): State<AppState>) -> Json<ValidationReport> {
    Json(state.editor.report())
}

#[derive(Debug, Serialize)]
pub struct Scheduled {
    pub generation: u64,
}

/// `POST /v1/validate` → 202 with the generation of the scheduled run.
pub async fn validate(State(state): State<AppState>) -> (StatusCode, Json<Scheduled>) {
    let generation = state.editor.validate_now();
    (StatusCode::ACCEPTED, Json(Scheduled { generation }))
}

/// `GET /v1/issues/stream` — Server-Sent Events, one `report` event per
/// change, starting with the current report.
pub async fn stream_issues(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.editor.scheduler().subscribe();
    let stream = WatchStream::new(rx).map(|report| {
        let event = Event::default()
            .event("report")
            .id(report.generation.to_string());
        Ok(event
            .json_data(&report)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string())))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
