//! Assembles the Axum [`Router`] from all handler modules.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{document, graph, validation, workspace, AppState};

/// Build the complete application router with shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Graph
        .route("/v1/graph", get(graph::get_graph))
        .route("/v1/nodes", post(graph::add_node))
        .route(
            "/v1/nodes/{id}",
            get(graph::get_node)
                .patch(graph::update_node)
                .delete(graph::remove_node),
        )
        .route("/v1/edges", post(graph::add_edge))
        .route("/v1/edges/{id}", delete(graph::remove_edge))
        .route("/v1/connect", post(graph::connect))
        .route("/v1/selection", put(graph::set_selection))
        .route("/v1/policy", get(graph::get_policy))
        // Document
        .route(
            "/v1/header",
            get(document::get_header).put(document::put_header),
        )
        .route("/v1/document", get(document::get_document))
        .route("/v1/export", get(document::export_document))
        // Validation
        .route("/v1/issues", get(validation::get_issues))
        .route("/v1/issues/stream", get(validation::stream_issues))
        .route("/v1/validate", post(validation::validate))
        // Persistence
        .route("/v1/checkpoint", post(workspace::checkpoint))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
