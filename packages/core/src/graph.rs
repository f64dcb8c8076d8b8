use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::policy::can_connect;
use crate::types::{
    new_id, ConnectRequest, Edge, EdgeDraft, Node, NodeDraft, NodeKind, NodeProperties,
    NodeUpdate,
};

/// Why [`Graph::connect`] refused to create an edge.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("source node {0:?} does not exist")]
    MissingSource(String),

    #[error("target node {0:?} does not exist")]
    MissingTarget(String),

    #[error("a {from} node cannot be linked to a {to} node")]
    Rejected { from: NodeKind, to: NodeKind },
}

/// The designer graph: typed nodes, directed edges, and the current selection.
///
/// Nodes and edges are kept in insertion order; the projector relies on that
/// order to produce the same document for the same graph every time.
///
/// Invariants held by every operation:
/// - node ids and edge ids are unique;
/// - every edge's endpoints exist;
/// - the selection, when set, names an existing node.
///
/// No operation fails loudly. Unknown ids and conflicting inputs leave the
/// graph unchanged; the return value says whether anything happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GraphData", into = "GraphData")]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    selected: Option<String>,
}

/// Persisted shape of a [`Graph`]. Selection is UI state and is not stored.
#[derive(Debug, Default, Serialize, Deserialize)]
struct GraphData {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl From<GraphData> for Graph {
    fn from(data: GraphData) -> Self {
        Graph::from_parts(data.nodes, data.edges)
    }
}

impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        GraphData {
            nodes: graph.nodes,
            edges: graph.edges,
        }
    }
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from stored nodes and edges, re-establishing the
    /// invariants: later duplicates of a node or edge id are dropped, as are
    /// edges whose endpoints are missing.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut g = Self::new();
        for node in nodes {
            if g.node(&node.id).is_none() {
                g.nodes.push(node);
            }
        }
        for edge in edges {
            if g.edge(&edge.id).is_none()
                && g.node(&edge.source_id).is_some()
                && g.node(&edge.target_id).is_some()
            {
                g.edges.push(edge);
            }
        }
        g
    }

    // --- mutation ------------------------------------------------------------

    /// Append a node, assigning a UUIDv7 id if the draft has none.
    ///
    /// Property shape is not checked. Returns the node's id, or `None` if the
    /// draft's id is already taken.
    pub fn add_node(&mut self, draft: NodeDraft) -> Option<String> {
        let id = draft.id.unwrap_or_else(new_id);
        if self.node(&id).is_some() {
            return None;
        }
        self.nodes.push(Node {
            id: id.clone(),
            label: draft.label,
            properties: draft.properties,
        });
        Some(id)
    }

    /// Merge `update` into the node's label and properties.
    ///
    /// The label is overwritten. Property keys are merged one level deep:
    /// supplied keys replace or extend, siblings stay, nested values such as
    /// `schema` are replaced whole. A `kind` key in the patch is ignored.
    ///
    /// All-or-nothing: if the merged record no longer fits the node's kind,
    /// nothing changes and `false` is returned. Also `false` for an unknown id.
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        let properties = match update.properties {
            Some(patch) => match merge_properties(&node.properties, patch) {
                Some(merged) => merged,
                None => return false,
            },
            None => node.properties.clone(),
        };
        if let Some(label) = update.label {
            node.label = label;
        }
        node.properties = properties;
        true
    }

    /// Remove a node, every edge touching it, and the selection if it pointed
    /// at it. Returns `false` if no such node exists.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges.retain(|e| e.source_id != id && e.target_id != id);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        true
    }

    /// Insert an edge without consulting the connection policy.
    ///
    /// Both endpoints must exist and the id (assigned when absent) must be
    /// free; otherwise nothing is inserted and `None` is returned.
    pub fn add_edge(&mut self, draft: EdgeDraft) -> Option<String> {
        if self.node(&draft.source_id).is_none() || self.node(&draft.target_id).is_none() {
            return None;
        }
        let id = draft.id.unwrap_or_else(new_id);
        if self.edge(&id).is_some() {
            return None;
        }
        self.edges.push(Edge {
            id: id.clone(),
            source_id: draft.source_id,
            target_id: draft.target_id,
            source_handle: draft.source_handle,
            target_handle: draft.target_handle,
        });
        Some(id)
    }

    /// Remove an edge by id. Returns `false` if no such edge exists.
    pub fn remove_edge(&mut self, id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        self.edges.len() != before
    }

    /// Set or clear the selection. Selecting an unknown id is ignored and
    /// returns `false`.
    pub fn set_selected(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.selected = None;
                true
            }
            Some(id) if self.node(id).is_some() => {
                self.selected = Some(id.to_string());
                true
            }
            Some(_) => false,
        }
    }

    /// Link two existing nodes if the connection policy allows their kinds.
    ///
    /// On success a new edge with a fresh id is inserted and its id returned.
    /// On failure the graph is untouched and the reason is returned.
    pub fn connect(&mut self, request: ConnectRequest) -> Result<String, ConnectError> {
        let from = self
            .node(&request.source_id)
            .map(Node::kind)
            .ok_or_else(|| ConnectError::MissingSource(request.source_id.clone()))?;
        let to = self
            .node(&request.target_id)
            .map(Node::kind)
            .ok_or_else(|| ConnectError::MissingTarget(request.target_id.clone()))?;
        if !can_connect(from, to) {
            return Err(ConnectError::Rejected { from, to });
        }
        let id = new_id();
        self.edges.push(Edge {
            id: id.clone(),
            source_id: request.source_id,
            target_id: request.target_id,
            source_handle: request.source_handle,
            target_handle: request.target_handle,
        });
        Ok(id)
    }

    // --- queries -------------------------------------------------------------

    /// Retrieve a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Retrieve an edge by id.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&Node> {
        self.selected.as_deref().and_then(|id| self.node(id))
    }

    /// All nodes of a given kind, in insertion order.
    pub fn by_kind(&self, kind: NodeKind) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.kind() == kind).collect()
    }

    /// The nodes `id` links to, in edge insertion order.
    pub fn outgoing(&self, id: &str) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|e| e.source_id == id)
            .filter_map(|e| self.node(&e.target_id))
            .collect()
    }

    /// The nodes that link to `id`, in edge insertion order.
    pub fn incoming(&self, id: &str) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|e| e.target_id == id)
            .filter_map(|e| self.node(&e.source_id))
            .collect()
    }

    /// Nodes the projected document leaves out: those no path node reaches
    /// through a chain of policy-legal edges. Security schemes are never
    /// detached since they are registered document-wide. Detached nodes stay
    /// in the graph as work in progress.
    pub fn detached(&self) -> Vec<&Node> {
        let mut reached: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&Node> = VecDeque::new();
        for path in self.by_kind(NodeKind::Path) {
            reached.insert(path.id.as_str());
            queue.push_back(path);
        }
        while let Some(current) = queue.pop_front() {
            for next in self.outgoing(&current.id) {
                if can_connect(current.kind(), next.kind()) && reached.insert(next.id.as_str()) {
                    queue.push_back(next);
                }
            }
        }
        self.nodes
            .iter()
            .filter(|n| n.kind() != NodeKind::SecurityScheme)
            .filter(|n| !reached.contains(n.id.as_str()))
            .collect()
    }
}

// Shallow merge through the JSON form, then back into the typed variant.
fn merge_properties(current: &NodeProperties, patch: Map<String, Value>) -> Option<NodeProperties> {
    let Ok(Value::Object(mut merged)) = serde_json::to_value(current) else {
        return None;
    };
    for (key, value) in patch {
        if key == "kind" {
            continue;
        }
        merged.insert(key, value);
    }
    serde_json::from_value(Value::Object(merged)).ok()
}

// --- tests -------------------------------------------------------------------
