//! Graph → document projection.
//!
//! [`project`] folds the designer graph into a [`Document`] by walking
//! outward from every path node along the edges the connection policy
//! allows: path → operation → parameter/response → model. The walk visits
//! path nodes in node insertion order and children in edge insertion order,
//! and only order-preserving maps are written, so the same graph always
//! yields a byte-identical document.
//!
//! Where the graph leaves a required field empty, a fixed fallback is used:
//!
//! | Missing | Fallback |
//! |---------|----------|
//! | path string | the path node's label |
//! | operation responses | `200: "Successful operation"` |
//! | response status code | `default` |
//! | response description | `No description` |
//! | model / parameter name | the node's label |
//! | security scheme name | the node's label, then its id |
//!
//! Nodes no path reaches are left out of the document. Security schemes are
//! the exception: no edge can reach them, and they are document-wide, so
//! every security-scheme node is registered under `components`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::document::{
    Components, Document, Info, MediaType, Operation, Parameter, PathItem, Response, Schema,
    SecurityScheme, Server, Tag,
};
use crate::graph::Graph;
use crate::types::{
    ModelProperties, Node, NodeKind, NodeProperties, OperationProperties, ParameterProperties,
    ResponseProperties, SecuritySchemeProperties,
};

/// Status code of the response added to operations that have none.
pub const DEFAULT_STATUS_CODE: &str = "200";
/// Description of the response added to operations that have none.
pub const DEFAULT_RESPONSE_DESCRIPTION: &str = "Successful operation";
/// Media type under which a linked model is attached to a response.
pub const JSON_MEDIA_TYPE: &str = "application/json";

const FALLBACK_STATUS_CODE: &str = "default";
const FALLBACK_RESPONSE_DESCRIPTION: &str = "No description";

/// Document-level fields the graph does not model: format version, API
/// metadata and servers. Persisted next to the graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
}

impl Default for DocumentHeader {
    fn default() -> Self {
        Self {
            openapi: "3.0.3".into(),
            info: Info {
                title: "New API".into(),
                description: Some("API description".into()),
                version: "1.0.0".into(),
                ..Info::default()
            },
            servers: Vec::new(),
        }
    }
}

/// Build the document described by `graph` under `header`.
pub fn project(graph: &Graph, header: &DocumentHeader) -> Document {
    let mut paths: IndexMap<String, PathItem> = IndexMap::new();
    let mut components = Components::default();
    let mut tags: Vec<Tag> = Vec::new();

    for path_node in graph.by_kind(NodeKind::Path) {
        let NodeProperties::Path(props) = &path_node.properties else {
            continue;
        };
        let key = non_blank(&props.path).unwrap_or(&path_node.label).to_string();
        let item = paths.entry(key).or_insert_with(|| PathItem {
            summary: non_blank(&props.summary).map(str::to_string),
            description: non_blank(&props.description).map(str::to_string),
            ..PathItem::default()
        });

        for op_node in graph.outgoing(&path_node.id) {
            let NodeProperties::Operation(op_props) = &op_node.properties else {
                continue;
            };
            let slot = item.slot_mut(op_props.method);
            if slot.is_some() {
                continue;
            }
            let operation = project_operation(graph, op_node, op_props, &mut components);
            for tag in &operation.tags {
                if !tags.iter().any(|t| &t.name == tag) {
                    tags.push(Tag {
                        name: tag.clone(),
                        ..Tag::default()
                    });
                }
            }
            *slot = Some(operation);
        }
    }

    for node in graph.by_kind(NodeKind::SecurityScheme) {
        let NodeProperties::SecurityScheme(props) = &node.properties else {
            continue;
        };
        let name = non_blank(&node.label).unwrap_or(&node.id).to_string();
        components
            .security_schemes
            .entry(name)
            .or_insert_with(|| project_security_scheme(props));
    }

    Document {
        openapi: Some(header.openapi.clone()),
        info: Some(header.info.clone()),
        servers: header.servers.clone(),
        paths: Some(paths),
        components: Some(components),
        tags,
        extensions: IndexMap::new(),
    }
}

fn project_operation(
    graph: &Graph,
    node: &Node,
    props: &OperationProperties,
    components: &mut Components,
) -> Operation {
    let mut parameters = Vec::new();
    let mut responses: IndexMap<String, Response> = IndexMap::new();

    for child in graph.outgoing(&node.id) {
        match &child.properties {
            NodeProperties::Parameter(p) => {
                parameters.push(project_parameter(graph, child, p, components));
            }
            NodeProperties::Response(r) => {
                let code = non_blank(&r.status_code)
                    .unwrap_or(FALLBACK_STATUS_CODE)
                    .to_string();
                if !responses.contains_key(&code) {
                    let response = project_response(graph, child, r, components);
                    responses.insert(code, response);
                }
            }
            _ => {}
        }
    }

    if responses.is_empty() {
        responses.insert(
            DEFAULT_STATUS_CODE.to_string(),
            Response {
                description: DEFAULT_RESPONSE_DESCRIPTION.to_string(),
                ..Response::default()
            },
        );
    }

    let mut tags: Vec<String> = Vec::new();
    for tag in props.tags.iter().filter_map(|t| non_blank(t)) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    Operation {
        tags,
        summary: non_blank(&props.summary).map(str::to_string),
        description: non_blank(&props.description).map(str::to_string),
        operation_id: non_blank(&props.operation_id).map(str::to_string),
        parameters,
        responses: Some(responses),
        deprecated: props.deprecated.then_some(true),
        ..Operation::default()
    }
}

fn project_parameter(
    graph: &Graph,
    node: &Node,
    props: &ParameterProperties,
    components: &mut Components,
) -> Parameter {
    let schema = match linked_model(graph, node, components) {
        Some(name) => Some(Schema::reference_to(&name)),
        None => props.schema.clone(),
    };
    Parameter {
        name: non_blank(&props.name).unwrap_or(&node.label).to_string(),
        location: props.location.to_string(),
        description: non_blank(&props.description).map(str::to_string),
        required: props.required.then_some(true),
        deprecated: props.deprecated.then_some(true),
        allow_empty_value: props.allow_empty_value.then_some(true),
        schema,
        extensions: IndexMap::new(),
    }
}

fn project_response(
    graph: &Graph,
    node: &Node,
    props: &ResponseProperties,
    components: &mut Components,
) -> Response {
    let mut content = props.content.clone();
    if let Some(name) = linked_model(graph, node, components) {
        content.insert(
            JSON_MEDIA_TYPE.to_string(),
            MediaType {
                schema: Some(Schema::reference_to(&name)),
                ..MediaType::default()
            },
        );
    }
    Response {
        description: non_blank(&props.description)
            .unwrap_or(FALLBACK_RESPONSE_DESCRIPTION)
            .to_string(),
        content,
        extensions: IndexMap::new(),
    }
}

/// Register every model `node` links to and return the first one's name.
fn linked_model(graph: &Graph, node: &Node, components: &mut Components) -> Option<String> {
    let mut first = None;
    for child in graph.outgoing(&node.id) {
        let NodeProperties::Model(props) = &child.properties else {
            continue;
        };
        let name = non_blank(&props.name).unwrap_or(&child.label).to_string();
        components
            .schemas
            .entry(name.clone())
            .or_insert_with(|| project_model(props));
        first.get_or_insert(name);
    }
    first
}

fn project_model(props: &ModelProperties) -> Schema {
    Schema {
        schema_type: Some(props.schema_type.to_string()),
        description: non_blank(&props.description).map(str::to_string),
        properties: props.properties.clone(),
        required: props.required.clone(),
        ..Schema::default()
    }
}

fn project_security_scheme(props: &SecuritySchemeProperties) -> SecurityScheme {
    SecurityScheme {
        scheme_type: props.scheme_type.to_string(),
        description: non_blank(&props.description).map(str::to_string),
        name: props.name.clone(),
        location: props.location.map(|l| l.to_string()),
        scheme: props.scheme.clone(),
        bearer_format: props.bearer_format.clone(),
        flows: props.flows.clone(),
        open_id_connect_url: props.open_id_connect_url.clone(),
        extensions: IndexMap::new(),
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// --- tests -------------------------------------------------------------------
