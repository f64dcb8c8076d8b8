//! The persisted unit of work: a graph plus the document header it is
//! projected under.
//!
//! Only the graph's nodes and edges and the header are stored. The projected
//! document and its issues are derived values and are recomputed after a
//! load. Selection is session state and is never written.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::graph::Graph;
use crate::projector::{project, DocumentHeader};

/// Storage key under which the workspace is saved.
pub const WORKSPACE_KEY: &str = "apigraph.workspace";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Workspace {
    #[serde(default)]
    pub header: DocumentHeader,
    #[serde(default)]
    pub graph: Graph,
}

impl Workspace {
    pub fn new(header: DocumentHeader, graph: Graph) -> Self {
        Self { header, graph }
    }

    /// Project the graph under this workspace's header.
    pub fn document(&self) -> Document {
        project(&self.graph, &self.header)
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConnectRequest, NodeDraft, NodeKind};

    #[test]
    fn round_trip_drops_selection_only() {
        let mut ws = Workspace::default();
        let p = ws.graph.add_node(NodeDraft::new(NodeKind::Path)).unwrap();
        let o = ws.graph.add_node(NodeDraft::new(NodeKind::Operation)).unwrap();
        ws.graph.connect(ConnectRequest::new(&p, &o)).unwrap();
        ws.graph.set_selected(Some(&p));
        ws.header.info.title = "Pets".into();

        let json = serde_json::to_string(&ws).unwrap();
        let restored: Workspace = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.header.info.title, "Pets");
        assert_eq!(restored.graph.nodes(), ws.graph.nodes());
        assert_eq!(restored.graph.edges(), ws.graph.edges());
        assert_eq!(restored.graph.selected_id(), None);
        assert_eq!(restored.document(), ws.document());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let ws: Workspace = serde_json::from_str("{}").unwrap();
        assert!(ws.graph.is_empty());
        assert_eq!(ws.header, DocumentHeader::default());
    }
}
