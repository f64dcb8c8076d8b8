//! Structural validation of a projected [`Document`].
//!
//! [`validate`] runs a fixed sequence of presence/structure rules and returns
//! every finding as an [`Issue`]. Rules never short-circuit each other; the
//! only skips are the `info` sub-rules when `info` itself is absent and the
//! per-path rules when `paths` is absent. Rule order is part of the contract:
//!
//! 1. `openapi` present and a 3.x version
//! 2. `info` present
//! 3. `info.title` non-empty
//! 4. `info.version` non-empty
//! 5. `info.description` non-empty (warning)
//! 6. `paths` present (error) and non-empty (warning)
//! 7. every path item has at least one recognised verb (warning)
//! 8. every operation has an `operationId` (warning) and responses (error)
//!
//! Operations are visited in the verb order of [`HttpMethod::ALL`]. Blank
//! strings count as missing. No reference resolution or schema checks are
//! performed.

use serde::{Deserialize, Serialize};

use crate::document::{Document, Info, Operation};
use crate::types::{new_id, HttpMethod};

/// How serious an [`Issue`] is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A single finding. Issues are regenerated wholesale on every run; only
/// `id` differs between two runs over the same document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    /// Fresh UUIDv7 per run.
    pub id: String,
    /// Document keys locating the problem, outermost first.
    pub path: Vec<String>,
    pub message: String,
    pub severity: Severity,
    /// Stable code of the rule that produced the issue.
    pub rule: String,
}

impl Issue {
    fn new(path: &[&str], message: impl Into<String>, severity: Severity, rule: &str) -> Self {
        Self {
            id: new_id(),
            path: path.iter().map(|s| s.to_string()).collect(),
            message: message.into(),
            severity,
            rule: rule.to_string(),
        }
    }
}

/// Per-severity counts of an issue list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueSummary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl IssueSummary {
    pub fn of(issues: &[Issue]) -> Self {
        let mut summary = Self::default();
        for issue in issues {
            match issue.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
        }
        summary
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }
}

/// Run every rule against `document`, in order.
pub fn validate(document: &Document) -> Vec<Issue> {
    let mut issues = Vec::new();

    check_version(document, &mut issues);

    match &document.info {
        None => issues.push(Issue::new(
            &["info"],
            "Info object is required",
            Severity::Error,
            "info-required",
        )),
        Some(info) => check_info(info, &mut issues),
    }

    match &document.paths {
        None => issues.push(Issue::new(
            &["paths"],
            "Paths object is required",
            Severity::Error,
            "paths-required",
        )),
        Some(paths) if paths.is_empty() => issues.push(Issue::new(
            &["paths"],
            "API has no paths defined",
            Severity::Warning,
            "paths-empty",
        )),
        Some(paths) => {
            for (path, item) in paths {
                if !item.has_operations() {
                    issues.push(Issue::new(
                        &["paths", path],
                        format!("Path {path} has no operations defined"),
                        Severity::Warning,
                        "path-operations-missing",
                    ));
                }
                for (method, operation) in item.operations() {
                    check_operation(path, method, operation, &mut issues);
                }
            }
        }
    }

    issues
}

fn check_version(document: &Document, issues: &mut Vec<Issue>) {
    match document.openapi.as_deref().filter(|v| !is_blank(v)) {
        None => issues.push(Issue::new(
            &["openapi"],
            "OpenAPI version is required",
            Severity::Error,
            "openapi-required",
        )),
        Some(v) if !v.trim_start().starts_with("3.") => issues.push(Issue::new(
            &["openapi"],
            format!("Only OpenAPI 3.x is supported, found {v:?}"),
            Severity::Error,
            "openapi-version",
        )),
        Some(_) => {}
    }
}

fn check_info(info: &Info, issues: &mut Vec<Issue>) {
    if is_blank(&info.title) {
        issues.push(Issue::new(
            &["info", "title"],
            "API title is required",
            Severity::Error,
            "info-title-required",
        ));
    }
    if is_blank(&info.version) {
        issues.push(Issue::new(
            &["info", "version"],
            "API version is required",
            Severity::Error,
            "info-version-required",
        ));
    }
    if info.description.as_deref().is_none_or(is_blank) {
        issues.push(Issue::new(
            &["info", "description"],
            "API description is recommended",
            Severity::Warning,
            "info-description-recommended",
        ));
    }
}

fn check_operation(path: &str, method: HttpMethod, op: &Operation, issues: &mut Vec<Issue>) {
    let verb = method.as_str();
    let upper = verb.to_ascii_uppercase();

    if op.operation_id.as_deref().is_none_or(is_blank) {
        issues.push(Issue::new(
            &["paths", path, verb, "operationId"],
            format!("Operation {upper} {path} is missing an operationId"),
            Severity::Warning,
            "operation-id-missing",
        ));
    }
    if op.responses.as_ref().is_none_or(|r| r.is_empty()) {
        issues.push(Issue::new(
            &["paths", path, verb, "responses"],
            format!("Operation {upper} {path} has no responses defined"),
            Severity::Error,
            "operation-responses-missing",
        ));
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

// --- tests -------------------------------------------------------------------
