//! Typed node/edge graph for composing API descriptions.
//!
//! A user assembles an API from typed nodes (path, operation, parameter,
//! response, model, security scheme) joined by directed edges. This crate
//! holds that graph, decides which links are legal, derives an OpenAPI 3.0
//! document from it, and checks the document for structural problems. It
//! does no I/O; the `apigraph-server` and `apigraph` CLI crates build on it.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | Node and edge types: [`Node`], [`NodeKind`], [`NodeProperties`], [`Edge`] |
//! | [`policy`] | The connection table and [`can_connect`] |
//! | [`graph`] | [`Graph`] and its mutation/connect/selection API |
//! | [`document`] | The projected [`Document`] object model |
//! | [`projector`] | Graph → document via [`project`] |
//! | [`validation`] | Structural rules via [`validate`] |
//! | [`export`] | JSON and YAML-like text output |
//! | [`render`] | Plain-text rendering of graphs and issues |
//! | [`workspace`] | The persisted [`Workspace`] value |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use apigraph::{project, validate, ConnectRequest, DocumentHeader, Graph, NodeDraft, NodeKind};
//!
//! let mut graph = Graph::new();
//! let path = graph.add_node(NodeDraft::new(NodeKind::Path)).unwrap();
//! let op = graph.add_node(NodeDraft::new(NodeKind::Operation)).unwrap();
//! graph.connect(ConnectRequest::new(&path, &op))?;
//!
//! let document = project(&graph, &DocumentHeader::default());
//! for issue in validate(&document) {
//!     println!("{}: {}", issue.severity, issue.message);
//! }
//! ```

pub mod document;
pub mod export;
pub mod graph;
pub mod policy;
pub mod projector;
pub mod render;
pub mod types;
pub mod validation;
pub mod workspace;

pub use document::Document;
pub use export::{ExportError, ExportFormat};
pub use graph::{ConnectError, Graph};
pub use policy::{can_connect, legal_targets, CONNECTION_RULES};
pub use projector::{project, DocumentHeader};
pub use types::{
    ConnectRequest, Edge, EdgeDraft, HttpMethod, Node, NodeDraft, NodeKind, NodeProperties,
    NodeUpdate,
};
pub use validation::{validate, Issue, IssueSummary, Severity};
pub use workspace::{Workspace, WORKSPACE_KEY};
