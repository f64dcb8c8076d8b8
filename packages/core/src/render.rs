//! Human-readable text rendering of [`Graph`]s and validation [`Issue`]s.
//!
//! The output is stable plain text suitable for terminals and logs. It is
//! not a canonical format; only the JSON document is normative.

use crate::graph::Graph;
use crate::types::{Node, NodeKind, NodeProperties};
use crate::validation::{Issue, IssueSummary};

/// Render a single [`Node`] on one line: short id, kind, label and the one
/// property that identifies it best.
///
/// ```text
/// [0195a3c1]  operation  GET  get listPets
/// ```
pub fn render_node(node: &Node) -> String {
    let detail = match &node.properties {
        NodeProperties::Path(p) => p.path.clone(),
        NodeProperties::Operation(o) if o.operation_id.is_empty() => o.method.to_string(),
        NodeProperties::Operation(o) => format!("{} {}", o.method, o.operation_id),
        NodeProperties::Parameter(p) => format!("{} in {}", p.name, p.location),
        NodeProperties::Response(r) => format!("{} {}", r.status_code, truncate(&r.description, 40)),
        NodeProperties::Model(m) => format!("{} ({})", m.name, m.schema_type),
        NodeProperties::SecurityScheme(s) => s.scheme_type.to_string(),
    };
    format!(
        "[{}]  {}  {}  {}",
        short_id(&node.id),
        node.kind(),
        truncate(&node.label, 40),
        detail
    )
}

/// Render an entire [`Graph`] as a summary grouped by node kind, with each
/// node's outgoing links listed under it.
///
/// ```text
/// API Graph  3 nodes, 2 edges
/// ───────────────────────────
///
/// PATHS (1)
///   [0195a3c1]  path  /pets  /pets
///     → [0195a3c2] GET
///
/// OPERATIONS (1)
///   [0195a3c2]  operation  GET  get listPets
///     → [0195a3c3] 200
/// ```
pub fn render_graph(graph: &Graph) -> String {
    let total = graph.len();
    let edges = graph.edge_count();
    let header = format!(
        "API Graph  {} node{}, {} edge{}",
        total,
        if total == 1 { "" } else { "s" },
        edges,
        if edges == 1 { "" } else { "s" }
    );
    let rule = "─".repeat(header.chars().count());

    let mut out = format!("{}\n{}\n", header, rule);

    let groups = [
        (NodeKind::Path, "PATHS"),
        (NodeKind::Operation, "OPERATIONS"),
        (NodeKind::Parameter, "PARAMETERS"),
        (NodeKind::Response, "RESPONSES"),
        (NodeKind::Model, "MODELS"),
        (NodeKind::SecurityScheme, "SECURITY SCHEMES"),
    ];

    for (kind, label) in groups {
        let nodes = graph.by_kind(kind);
        if nodes.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(&format!("{} ({})\n", label, nodes.len()));
        for n in nodes {
            out.push_str(&format!("  {}\n", render_node(n)));
            for target in graph.outgoing(&n.id) {
                out.push_str(&format!("    → [{}] {}\n", short_id(&target.id), target.label));
            }
        }
    }

    let detached = graph.detached();
    if !detached.is_empty() && detached.len() < total {
        out.push('\n');
        out.push_str(&format!("Not reachable from any path: {}\n", detached.len()));
    }

    out
}

/// Render an issue list, one issue per line, followed by a count line.
///
/// ```text
/// error    info.title                  API title is required
/// warning  paths./pets.get.operationId Operation GET /pets is missing an operationId
///
/// 1 error, 1 warning
/// ```
pub fn render_issues(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return "No issues found.\n".to_string();
    }

    let locations: Vec<String> = issues.iter().map(|i| location(&i.path)).collect();
    let width = locations.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (issue, loc) in issues.iter().zip(&locations) {
        out.push_str(&format!(
            "{:<8} {:<width$} {}\n",
            issue.severity.to_string(),
            loc,
            issue.message,
            width = width
        ));
    }

    let summary = IssueSummary::of(issues);
    out.push('\n');
    out.push_str(&format!(
        "{} error{}, {} warning{}",
        summary.errors,
        if summary.errors == 1 { "" } else { "s" },
        summary.warnings,
        if summary.warnings == 1 { "" } else { "s" }
    ));
    if summary.infos > 0 {
        out.push_str(&format!(", {} info", summary.infos));
    }
    out.push('\n');
    out
}

// --- helpers -----------------------------------------------------------------

fn location(path: &[String]) -> String {
    if path.is_empty() {
        "(document)".to_string()
    } else {
        path.join(".")
    }
}

fn truncate(s: &str, max: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let boundary = s
            .char_indices()
            .nth(max - 1)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        format!("{}…", &s[..boundary])
    }
}

fn short_id(id: &str) -> &str {
    // first 8 hex chars
    match id.char_indices().nth(8) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::types::{ConnectRequest, EdgeDraft, NodeDraft};
    use crate::validation::validate;

    #[test]
    fn render_graph_groups_by_kind() {
        let mut g = Graph::new();
        let p = g
            .add_node(NodeDraft::new(NodeKind::Path).with_id("0195a3c1-path"))
            .unwrap();
        let o = g
            .add_node(NodeDraft::new(NodeKind::Operation).with_id("0195a3c2-op"))
            .unwrap();
        g.connect(ConnectRequest::new(p, o)).unwrap();

        let rendered = render_graph(&g);
        assert!(rendered.starts_with("API Graph  2 nodes, 1 edge\n"));
        assert!(rendered.contains("PATHS (1)"));
        assert!(rendered.contains("OPERATIONS (1)"));
        assert!(rendered.contains("→ [0195a3c2] GET"));
        assert!(!rendered.contains("MODELS"));
    }

    #[test]
    fn render_graph_counts_unreachable_nodes() {
        let mut g = Graph::new();
        g.add_node(NodeDraft::new(NodeKind::Path));
        g.add_node(NodeDraft::new(NodeKind::Model));
        assert!(render_graph(&g).contains("Not reachable from any path: 1"));
    }

    #[test]
    fn render_graph_counts_illegally_linked_models_but_not_schemes() {
        let mut g = Graph::new();
        let p = g.add_node(NodeDraft::new(NodeKind::Path)).unwrap();
        let o = g.add_node(NodeDraft::new(NodeKind::Operation)).unwrap();
        let m = g.add_node(NodeDraft::new(NodeKind::Model)).unwrap();
        g.add_node(NodeDraft::new(NodeKind::SecurityScheme));
        g.connect(ConnectRequest::new(&p, &o)).unwrap();
        g.add_edge(EdgeDraft::new(&o, &m)).unwrap();
        assert!(render_graph(&g).contains("Not reachable from any path: 1"));
    }

    #[test]
    fn render_issues_lists_each_issue() {
        let doc: Document = serde_json::from_str(r#"{ "openapi": "3.0.3", "info": {} }"#).unwrap();
        let rendered = render_issues(&validate(&doc));
        assert!(rendered.contains("info.title"));
        assert!(rendered.contains("API version is required"));
        assert!(rendered.ends_with("3 errors, 1 warning\n"));
    }

    #[test]
    fn render_issues_when_clean() {
        assert_eq!(render_issues(&[]), "No issues found.\n");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ééééé", 3), "éé…");
        assert_eq!(truncate("short", 10), "short");
    }
}
