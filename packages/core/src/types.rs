//! Core data types of the designer graph.
//!
//! This module defines the vertices and edges a user composes an API
//! description from: [`Node`], [`NodeKind`], the per-kind property structs
//! gathered in [`NodeProperties`], and [`Edge`]. All types serialise to and
//! from JSON with camelCase keys; the wire name of each kind is its camelCase
//! variant name (e.g. `"securityScheme"`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Extensions, MediaType, OAuthFlows, Schema};

/// The closed set of node kinds. Determines a node's property shape and its
/// legal edge partners (see [`crate::policy`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// A URL path template such as `/pets/{id}`.
    Path,
    /// One HTTP verb bound to a path.
    Operation,
    /// A reusable data schema.
    Model,
    /// An input of an operation.
    Parameter,
    /// One possible result of an operation, keyed by status code.
    Response,
    /// A document-wide authentication scheme.
    SecurityScheme,
}

impl NodeKind {
    /// Every kind, in palette order.
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Path,
        NodeKind::Operation,
        NodeKind::Model,
        NodeKind::Parameter,
        NodeKind::Response,
        NodeKind::SecurityScheme,
    ];

    /// Label given to a freshly created node of this kind.
    pub fn default_label(self) -> &'static str {
        match self {
            NodeKind::Path => "/new-path",
            NodeKind::Operation => "GET",
            NodeKind::Model => "NewModel",
            NodeKind::Parameter => "parameter",
            NodeKind::Response => "200",
            NodeKind::SecurityScheme => "Auth",
        }
    }
}

/// Formats the kind as its camelCase wire-format string (e.g. `"securityScheme"`).
impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Path => write!(f, "path"),
            NodeKind::Operation => write!(f, "operation"),
            NodeKind::Model => write!(f, "model"),
            NodeKind::Parameter => write!(f, "parameter"),
            NodeKind::Response => write!(f, "response"),
            NodeKind::SecurityScheme => write!(f, "securityScheme"),
        }
    }
}

/// Parses a [`NodeKind`] from its wire-format string.
impl std::str::FromStr for NodeKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(NodeKind::Path),
            "operation" => Ok(NodeKind::Operation),
            "model" => Ok(NodeKind::Model),
            "parameter" => Ok(NodeKind::Parameter),
            "response" => Ok(NodeKind::Response),
            "securityScheme" | "security-scheme" => Ok(NodeKind::SecurityScheme),
            _ => Err(format!(
                "unknown node kind {:?}; expected one of: \
                 path, operation, model, parameter, response, securityScheme",
                s
            )),
        }
    }
}

/// HTTP verbs recognised as path-item operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[default]
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// All verbs in the order the format lists them. Validation walks
    /// operations in this order.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, so node labels such as `"GET"` parse too.
impl std::str::FromStr for HttpMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| {
                format!(
                    "unknown HTTP method {:?}; expected one of: \
                     get, put, post, delete, options, head, patch, trace",
                    s
                )
            })
    }
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    #[default]
    Query,
    Header,
    Path,
    Cookie,
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Cookie => write!(f, "cookie"),
        }
    }
}

/// Primitive schema types offered for models.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    #[default]
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaType::Object => write!(f, "object"),
            SchemaType::Array => write!(f, "array"),
            SchemaType::String => write!(f, "string"),
            SchemaType::Number => write!(f, "number"),
            SchemaType::Integer => write!(f, "integer"),
            SchemaType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Authentication mechanisms a security scheme may declare.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SecuritySchemeType {
    ApiKey,
    #[default]
    Http,
    #[serde(rename = "oauth2")]
    OAuth2,
    OpenIdConnect,
}

impl std::fmt::Display for SecuritySchemeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecuritySchemeType::ApiKey => write!(f, "apiKey"),
            SecuritySchemeType::Http => write!(f, "http"),
            SecuritySchemeType::OAuth2 => write!(f, "oauth2"),
            SecuritySchemeType::OpenIdConnect => write!(f, "openIdConnect"),
        }
    }
}

/// Where an `apiKey` security scheme reads its key from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

impl std::fmt::Display for ApiKeyLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiKeyLocation::Query => write!(f, "query"),
            ApiKeyLocation::Header => write!(f, "header"),
            ApiKeyLocation::Cookie => write!(f, "cookie"),
        }
    }
}

// --- per-kind properties -----------------------------------------------------
//
// Every field defaults, so a partially-filled payload always deserialises.
// Keys the struct does not name are kept in `extra`.

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PathProperties {
    pub path: String,
    pub summary: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct OperationProperties {
    pub method: HttpMethod,
    pub operation_id: String,
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    pub deprecated: bool,
    #[serde(flatten)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ParameterProperties {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub description: String,
    pub required: bool,
    pub deprecated: bool,
    pub allow_empty_value: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(flatten)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseProperties {
    pub status_code: String,
    pub description: String,
    pub content: IndexMap<String, MediaType>,
    #[serde(flatten)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelProperties {
    pub name: String,
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    pub description: String,
    pub properties: IndexMap<String, Schema>,
    /// Names of required properties. Persisted and projected as-is.
    pub required: Vec<String>,
    #[serde(flatten)]
    pub extra: Extensions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SecuritySchemeProperties {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,
    pub description: String,
    /// Header, query or cookie name for `apiKey` schemes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,
    #[serde(flatten)]
    pub extra: Extensions,
}

/// Kind-specific payload of a node, tagged by `kind`.
///
/// The variant *is* the node's kind, so a node can never carry properties of
/// the wrong shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeProperties {
    Path(PathProperties),
    Operation(OperationProperties),
    Model(ModelProperties),
    Parameter(ParameterProperties),
    Response(ResponseProperties),
    SecurityScheme(SecuritySchemeProperties),
}

impl NodeProperties {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeProperties::Path(_) => NodeKind::Path,
            NodeProperties::Operation(_) => NodeKind::Operation,
            NodeProperties::Model(_) => NodeKind::Model,
            NodeProperties::Parameter(_) => NodeKind::Parameter,
            NodeProperties::Response(_) => NodeKind::Response,
            NodeProperties::SecurityScheme(_) => NodeKind::SecurityScheme,
        }
    }

    /// The starting payload the designer gives a new node of `kind`.
    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Path => NodeProperties::Path(PathProperties {
                path: "/new-path".into(),
                summary: "New path".into(),
                ..Default::default()
            }),
            NodeKind::Operation => NodeProperties::Operation(OperationProperties {
                summary: "New operation".into(),
                ..Default::default()
            }),
            NodeKind::Model => {
                let mut properties = IndexMap::new();
                properties.insert("id".to_string(), Schema::of_type("string"));
                properties.insert("name".to_string(), Schema::of_type("string"));
                NodeProperties::Model(ModelProperties {
                    name: "NewModel".into(),
                    properties,
                    ..Default::default()
                })
            }
            NodeKind::Parameter => NodeProperties::Parameter(ParameterProperties {
                name: "parameter".into(),
                schema: Some(Schema::of_type("string")),
                ..Default::default()
            }),
            NodeKind::Response => {
                let mut content = IndexMap::new();
                content.insert(
                    "application/json".to_string(),
                    MediaType {
                        schema: Some(Schema::of_type("object")),
                        ..Default::default()
                    },
                );
                NodeProperties::Response(ResponseProperties {
                    status_code: "200".into(),
                    description: "Successful response".into(),
                    content,
                    ..Default::default()
                })
            }
            NodeKind::SecurityScheme => {
                NodeProperties::SecurityScheme(SecuritySchemeProperties {
                    scheme: Some("bearer".into()),
                    bearer_format: Some("JWT".into()),
                    ..Default::default()
                })
            }
        }
    }
}

/// A vertex of the designer graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Unique for the lifetime of the graph.
    pub id: String,

    /// Display string shown on the canvas.
    #[serde(default)]
    pub label: String,

    pub properties: NodeProperties,
}

impl Node {
    /// Create a node of `kind` with a fresh UUIDv7 id and the designer's
    /// default label and properties.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: new_id(),
            label: kind.default_label().to_string(),
            properties: NodeProperties::default_for(kind),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.properties.kind()
    }
}

/// Input to [`Graph::add_node`](crate::Graph::add_node). The graph assigns an
/// id when none is supplied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub label: String,
    pub properties: NodeProperties,
}

impl NodeDraft {
    /// A draft of `kind` with the default label and properties.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: None,
            label: kind.default_label().to_string(),
            properties: NodeProperties::default_for(kind),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl From<Node> for NodeDraft {
    fn from(node: Node) -> Self {
        Self {
            id: Some(node.id),
            label: node.label,
            properties: node.properties,
        }
    }
}

/// Partial update for [`Graph::update_node`](crate::Graph::update_node).
///
/// `label` replaces the label outright. `properties` is merged shallowly into
/// the node's current properties: listed keys are added or overwritten,
/// other keys are untouched, nested objects are replaced wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, Value>>,
}

/// A directed link between two nodes.
///
/// `target_handle` travels as `targetTag` on the wire; `targetHandle` is
/// accepted when reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(
        rename = "targetTag",
        alias = "targetHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_handle: Option<String>,
}

/// Input to [`Graph::add_edge`](crate::Graph::add_edge).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source_id: String,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(
        rename = "targetTag",
        alias = "targetHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_handle: Option<String>,
}

impl EdgeDraft {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            id: None,
            source_id: source_id.into(),
            target_id: target_id.into(),
            source_handle: None,
            target_handle: None,
        }
    }
}

/// A candidate link passed to [`Graph::connect`](crate::Graph::connect).
/// The edge id is always generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub source_id: String,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(
        rename = "targetTag",
        alias = "targetHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_handle: Option<String>,
}

impl ConnectRequest {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            source_handle: None,
            target_handle: None,
        }
    }
}

/// A fresh UUIDv7 string. Used for node, edge and issue ids.
pub(crate) fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

// --- tests -------------------------------------------------------------------
