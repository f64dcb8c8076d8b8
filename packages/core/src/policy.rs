//! The connection policy: which node kinds may be linked, and in which
//! direction.
//!
//! The relation is a fixed table of ordered `(source, target)` pairs. It is
//! neither symmetric nor transitive, and it is total: every pair of kinds
//! yields an answer.

use crate::types::NodeKind;

/// Every legal `(source kind, target kind)` pair.
pub const CONNECTION_RULES: [(NodeKind, NodeKind); 5] = [
    (NodeKind::Path, NodeKind::Operation),
    (NodeKind::Operation, NodeKind::Parameter),
    (NodeKind::Operation, NodeKind::Response),
    (NodeKind::Parameter, NodeKind::Model),
    (NodeKind::Response, NodeKind::Model),
];

/// `true` iff an edge from a `source`-kind node to a `target`-kind node is legal.
pub fn can_connect(source: NodeKind, target: NodeKind) -> bool {
    CONNECTION_RULES.contains(&(source, target))
}

/// Kinds a node of `source` kind may link to, in table order.
pub fn legal_targets(source: NodeKind) -> Vec<NodeKind> {
    CONNECTION_RULES
        .iter()
        .filter(|(s, _)| *s == source)
        .map(|(_, t)| *t)
        .collect()
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_the_table_is_legal() {
        let mut legal = 0;
        for s in NodeKind::ALL {
            for t in NodeKind::ALL {
                let expected = CONNECTION_RULES.contains(&(s, t));
                assert_eq!(can_connect(s, t), expected, "{s} -> {t}");
                if expected {
                    legal += 1;
                }
            }
        }
        assert_eq!(legal, 5);
    }

    #[test]
    fn relation_is_directional() {
        assert!(can_connect(NodeKind::Path, NodeKind::Operation));
        assert!(!can_connect(NodeKind::Operation, NodeKind::Path));
        assert!(!can_connect(NodeKind::Model, NodeKind::Path));
    }

    #[test]
    fn relation_is_not_transitive() {
        // path -> operation -> response -> model, but no shortcut edges
        assert!(!can_connect(NodeKind::Path, NodeKind::Response));
        assert!(!can_connect(NodeKind::Operation, NodeKind::Model));
    }

    #[test]
    fn security_schemes_have_no_partners() {
        assert!(legal_targets(NodeKind::SecurityScheme).is_empty());
        for k in NodeKind::ALL {
            assert!(!can_connect(k, NodeKind::SecurityScheme));
        }
    }

    #[test]
    fn legal_targets_of_operation() {
        assert_eq!(
            legal_targets(NodeKind::Operation),
            vec![NodeKind::Parameter, NodeKind::Response]
        );
    }
}
