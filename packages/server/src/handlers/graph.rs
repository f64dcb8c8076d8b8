//! Graph handlers: nodes, edges, connect, selection and the connection table.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use apigraph::{
    legal_targets, ConnectRequest, Edge, EdgeDraft, Node, NodeDraft, NodeKind, NodeUpdate,
    CONNECTION_RULES,
};

use super::AppState;
use crate::{editor::GraphView, error::AppError};

/// `GET /v1/graph` — nodes and edges in insertion order, plus the selection.
pub async fn get_graph(State(state): State<AppState>) -> Json<GraphView> {
    Json(state.editor.graph())
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Body of `POST /v1/nodes`. Either a full draft, or just a `kind` for a node
/// with the designer defaults.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NewNode {
    Draft(NodeDraft),
    Kind {
        kind: NodeKind,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        label: Option<String>,
    },
}

impl From<NewNode> for NodeDraft {
    fn from(body: NewNode) -> Self {
        match body {
            NewNode::Draft(draft) => draft,
            NewNode::Kind { kind, id, label } => {
                let mut draft = NodeDraft::new(kind);
                draft.id = id;
                if let Some(label) = label {
                    draft.label = label;
                }
                draft
            }
        }
    }
}

/// `POST /v1/nodes` → 201 with the stored node, 409 when the id is taken.
pub async fn add_node(
    State(state): State<AppState>,
    payload: Result<Json<NewNode>, JsonRejection>,
) -> Result<(StatusCode, Json<Node>), AppError> {
    let Json(body) = payload?;
    let node = state.editor.add_node(body.into())?;
    tracing::debug!(id = %node.id, kind = %node.kind(), "node added");
    Ok((StatusCode::CREATED, Json(node)))
}

/// `GET /v1/nodes/{id}`
pub async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Node>, AppError> {
    Ok(Json(state.editor.node(&id)?))
}

/// `PATCH /v1/nodes/{id}` — merge a label and/or property patch.
pub async fn update_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NodeUpdate>, JsonRejection>,
) -> Result<Json<Node>, AppError> {
    let Json(update) = payload?;
    Ok(Json(state.editor.update_node(&id, update)?))
}

/// `DELETE /v1/nodes/{id}` → 204. Incident edges go with it.
pub async fn remove_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.editor.remove_node(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// `POST /v1/edges` — raw insert, no policy check.
pub async fn add_edge(
    State(state): State<AppState>,
    payload: Result<Json<EdgeDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Edge>), AppError> {
    let Json(draft) = payload?;
    let edge = state.editor.add_edge(draft)?;
    Ok((StatusCode::CREATED, Json(edge)))
}

/// `DELETE /v1/edges/{id}` → 204.
pub async fn remove_edge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.editor.remove_edge(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /v1/connect` — policy-checked link. 422 `connection_rejected` when
/// the kinds may not be linked or an endpoint is missing.
pub async fn connect(
    State(state): State<AppState>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Edge>), AppError> {
    let Json(request) = payload?;
    match state.editor.connect(request) {
        Ok(edge) => Ok((StatusCode::CREATED, Json(edge))),
        Err(e) => {
            tracing::debug!("connect refused: {e}");
            Err(e.into())
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub selected_id: Option<String>,
}

/// `PUT /v1/selection` — `{"selectedId": "<id>"}` or `{"selectedId": null}`.
pub async fn set_selection(
    State(state): State<AppState>,
    payload: Result<Json<Selection>, JsonRejection>,
) -> Result<Json<Selection>, AppError> {
    let Json(body) = payload?;
    let selected_id = state.editor.set_selection(body.selected_id.as_deref())?;
    Ok(Json(Selection { selected_id }))
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PolicyRule {
    pub source: NodeKind,
    pub target: NodeKind,
}

#[derive(Debug, Serialize)]
pub struct PolicyEntry {
    pub kind: NodeKind,
    pub targets: Vec<NodeKind>,
}

#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub rules: Vec<PolicyRule>,
    pub kinds: Vec<PolicyEntry>,
}

/// `GET /v1/policy` — the connection table, as pairs and per source kind.
pub async fn get_policy() -> Json<PolicyResponse> {
    let rules = CONNECTION_RULES
        .iter()
        .map(|&(source, target)| PolicyRule { source, target })
        .collect();
    let kinds = NodeKind::ALL
        .iter()
        .map(|&kind| PolicyEntry {
            kind,
            targets: legal_targets(kind),
        })
        .collect();
    Json(PolicyResponse { rules, kinds })
}
