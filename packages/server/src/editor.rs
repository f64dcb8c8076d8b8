//! The editor controller: the single writer of the workspace.
//!
//! All reads and mutations go through one [`RwLock`]. A mutation that
//! changes the graph or header re-projects the document and schedules a
//! validation run before the lock is released, so the order of scheduled
//! runs always matches the order of mutations and every run sees an owned
//! snapshot of the document it was scheduled for. Selection changes do not
//! touch the document and schedule nothing.

use std::sync::RwLock;

use apigraph::{
    ConnectError, ConnectRequest, Document, DocumentHeader, Edge, EdgeDraft, Node, NodeDraft,
    NodeUpdate, Workspace,
};
use serde::Serialize;
use thiserror::Error;

use crate::validation::{ValidationReport, ValidationScheduler};

/// Why an editor operation did nothing.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("node {0:?} not found")]
    NodeNotFound(String),

    #[error("edge {0:?} not found")]
    EdgeNotFound(String),

    #[error("node id {0:?} is already in use")]
    NodeIdTaken(String),

    #[error("edge id {0:?} is already in use")]
    EdgeIdTaken(String),

    #[error("edge endpoints must both exist (source {source_id:?}, target {target_id:?})")]
    MissingEndpoint { source_id: String, target_id: String },

    #[error("patch does not fit node {0:?}")]
    InvalidPatch(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),
}

/// Read view of the graph, including the selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphView {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<String>,
}

struct Session {
    workspace: Workspace,
    document: Document,
}

pub struct Editor {
    session: RwLock<Session>,
    scheduler: ValidationScheduler,
}

impl Editor {
    /// Wrap a restored (or empty) workspace. Nothing is scheduled; call
    /// [`Editor::validate_now`] to compute issues eagerly.
    pub fn new(workspace: Workspace, scheduler: ValidationScheduler) -> Self {
        let document = workspace.document();
        Self {
            session: RwLock::new(Session {
                workspace,
                document,
            }),
            scheduler,
        }
    }

    // --- reads ---------------------------------------------------------------

    pub fn graph(&self) -> GraphView {
        let s = self.session.read().unwrap();
        let graph = &s.workspace.graph;
        GraphView {
            nodes: graph.nodes().to_vec(),
            edges: graph.edges().to_vec(),
            selected_id: graph.selected_id().map(str::to_string),
        }
    }

    pub fn node(&self, id: &str) -> Result<Node, EditError> {
        let s = self.session.read().unwrap();
        s.workspace
            .graph
            .node(id)
            .cloned()
            .ok_or_else(|| EditError::NodeNotFound(id.to_string()))
    }

    pub fn header(&self) -> DocumentHeader {
        self.session.read().unwrap().workspace.header.clone()
    }

    /// The document projected from the current state.
    pub fn document(&self) -> Document {
        self.session.read().unwrap().document.clone()
    }

    /// A copy of the persisted part of the state.
    pub fn workspace(&self) -> Workspace {
        self.session.read().unwrap().workspace.clone()
    }

    pub fn report(&self) -> ValidationReport {
        self.scheduler.report()
    }

    pub fn scheduler(&self) -> &ValidationScheduler {
        &self.scheduler
    }

    // --- mutations -----------------------------------------------------------

    pub fn add_node(&self, draft: NodeDraft) -> Result<Node, EditError> {
        let requested = draft.id.clone();
        self.mutate(|ws| match ws.graph.add_node(draft) {
            Some(id) => ws
                .graph
                .node(&id)
                .cloned()
                .ok_or(EditError::NodeNotFound(id)),
            None => Err(EditError::NodeIdTaken(requested.unwrap_or_default())),
        })
    }

    pub fn update_node(&self, id: &str, update: NodeUpdate) -> Result<Node, EditError> {
        self.mutate(|ws| {
            if ws.graph.node(id).is_none() {
                return Err(EditError::NodeNotFound(id.to_string()));
            }
            if !ws.graph.update_node(id, update) {
                return Err(EditError::InvalidPatch(id.to_string()));
            }
            ws.graph
                .node(id)
                .cloned()
                .ok_or_else(|| EditError::NodeNotFound(id.to_string()))
        })
    }

    pub fn remove_node(&self, id: &str) -> Result<(), EditError> {
        self.mutate(|ws| {
            if ws.graph.remove_node(id) {
                Ok(())
            } else {
                Err(EditError::NodeNotFound(id.to_string()))
            }
        })
    }

    /// Insert an edge without the connection policy check.
    pub fn add_edge(&self, draft: EdgeDraft) -> Result<Edge, EditError> {
        self.mutate(|ws| {
            if ws.graph.node(&draft.source_id).is_none() || ws.graph.node(&draft.target_id).is_none() {
                return Err(EditError::MissingEndpoint {
                    source_id: draft.source_id,
                    target_id: draft.target_id,
                });
            }
            let requested = draft.id.clone();
            match ws.graph.add_edge(draft) {
                Some(id) => ws
                    .graph
                    .edge(&id)
                    .cloned()
                    .ok_or(EditError::EdgeNotFound(id)),
                None => Err(EditError::EdgeIdTaken(requested.unwrap_or_default())),
            }
        })
    }

    pub fn remove_edge(&self, id: &str) -> Result<(), EditError> {
        self.mutate(|ws| {
            if ws.graph.remove_edge(id) {
                Ok(())
            } else {
                Err(EditError::EdgeNotFound(id.to_string()))
            }
        })
    }

    /// Link two nodes if the connection policy allows it.
    pub fn connect(&self, request: ConnectRequest) -> Result<Edge, EditError> {
        self.mutate(|ws| {
            let id = ws.graph.connect(request)?;
            ws.graph
                .edge(&id)
                .cloned()
                .ok_or(EditError::EdgeNotFound(id))
        })
    }

    pub fn set_header(&self, header: DocumentHeader) {
        let mut s = self.session.write().unwrap();
        s.workspace.header = header;
        self.commit(&mut s);
    }

    /// Set or clear the selection. Does not schedule validation.
    pub fn set_selection(&self, id: Option<&str>) -> Result<Option<String>, EditError> {
        let mut s = self.session.write().unwrap();
        if !s.workspace.graph.set_selected(id) {
            return Err(EditError::NodeNotFound(id.unwrap_or_default().to_string()));
        }
        Ok(s.workspace.graph.selected_id().map(str::to_string))
    }

    /// Schedule a validation run of the current document and return its
    /// generation.
    pub fn validate_now(&self) -> u64 {
        let s = self.session.read().unwrap();
        self.scheduler.schedule(s.document.clone())
    }

    /// Run `f` under the write lock and commit on success. A failed `f`
    /// must leave the workspace untouched.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Workspace) -> Result<T, EditError>,
    ) -> Result<T, EditError> {
        let mut s = self.session.write().unwrap();
        let out = f(&mut s.workspace)?;
        self.commit(&mut s);
        Ok(out)
    }

    // Re-project and schedule while the caller still holds the write lock.
    fn commit(&self, s: &mut Session) {
        s.document = s.workspace.document();
        let generation = self.scheduler.schedule(s.document.clone());
        tracing::debug!(generation, "workspace changed; validation scheduled");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
