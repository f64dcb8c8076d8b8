//! Text export of a [`Document`].
//!
//! JSON is the canonical format and round-trips exactly. The YAML-like form
//! is a lossy text transform of the JSON: `"key":` becomes `key:` and every
//! remaining double quote is dropped. It is intended for reading, not for
//! feeding back into a parser.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::document::Document;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialise document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("invalid document JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

impl ExportFormat {
    /// Suggested file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Yaml => "application/yaml",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            _ => Err(format!("unknown export format {s:?}; expected json or yaml")),
        }
    }
}

/// Pretty-printed JSON with two-space indentation.
pub fn to_json(document: &Document) -> Result<String, ExportError> {
    serde_json::to_string_pretty(document).map_err(ExportError::Serialize)
}

pub fn from_json(text: &str) -> Result<Document, ExportError> {
    serde_json::from_str(text).map_err(ExportError::Parse)
}

pub fn to_yaml_like(document: &Document) -> Result<String, ExportError> {
    let json = to_json(document)?;
    let unquoted_keys = QUOTED_KEY_RE.replace_all(&json, "$1:");
    Ok(unquoted_keys.replace('"', ""))
}

/// Export in the requested format.
pub fn export(document: &Document, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => to_json(document),
        ExportFormat::Yaml => to_yaml_like(document),
    }
}

/// `"([^"]+)":`
static QUOTED_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)":"#).expect("invalid key regex"));

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::projector::{project, DocumentHeader};
    use crate::document::{
        Components, Contact, Extensions, Info, License, MediaType, OAuthFlow, OAuthFlows,
        Operation, Parameter, PathItem, Response, Schema, SecurityScheme, Server, Tag,
    };
    use crate::projector::JSON_MEDIA_TYPE;
    use crate::types::{ConnectRequest, NodeDraft, NodeKind};
    use indexmap::IndexMap;
    use serde_json::{json, Value};

    fn sample() -> Document {
        let mut g = Graph::new();
        let p = g.add_node(NodeDraft::new(NodeKind::Path)).unwrap();
        let o = g.add_node(NodeDraft::new(NodeKind::Operation)).unwrap();
        let r = g.add_node(NodeDraft::new(NodeKind::Response)).unwrap();
        let m = g.add_node(NodeDraft::new(NodeKind::Model)).unwrap();
        g.connect(ConnectRequest::new(&p, &o)).unwrap();
        g.connect(ConnectRequest::new(&o, &r)).unwrap();
        g.connect(ConnectRequest::new(&r, &m)).unwrap();
        project(&g, &DocumentHeader::default())
    }

    #[test]
    fn json_is_pretty_and_reparses_identically() {
        let doc = sample();
        let text = to_json(&doc).unwrap();
        assert!(text.starts_with("{\n  \"openapi\": \"3.0.3\""));
        assert_eq!(from_json(&text).unwrap(), doc);
    }

    fn extensions(pairs: &[(&str, Value)]) -> Extensions {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    // Every optional field filled, plus extension keys at each level.
    fn populated() -> Document {
        let pet = Schema {
            schema_type: Some("object".into()),
            description: Some("A pet".into()),
            properties: IndexMap::from([
                ("id".to_string(), Schema::of_type("integer")),
                (
                    "tags".to_string(),
                    Schema {
                        schema_type: Some("array".into()),
                        items: Some(Box::new(Schema::of_type("string"))),
                        ..Schema::default()
                    },
                ),
            ]),
            required: vec!["id".into()],
            example: Some(Value::Null),
            extensions: extensions(&[("x-nullable", Value::Null), ("minProperties", json!(1))]),
            ..Schema::default()
        };
        let limit = Parameter {
            name: "limit".into(),
            location: "query".into(),
            description: Some("Page size".into()),
            required: Some(false),
            deprecated: Some(true),
            allow_empty_value: Some(true),
            schema: Some(Schema {
                format: Some("int32".into()),
                ..Schema::of_type("integer")
            }),
            extensions: extensions(&[("x-max", json!(100))]),
        };
        let ok = Response {
            description: "A pet".into(),
            content: IndexMap::from([(
                JSON_MEDIA_TYPE.to_string(),
                MediaType {
                    schema: Some(Schema::reference_to("Pet")),
                    example: Some(json!({ "id": 1 })),
                    extensions: extensions(&[("x-sample", json!("fido"))]),
                },
            )]),
            extensions: extensions(&[("x-cache", json!(false))]),
        };
        let gone = Response {
            description: "Gone".into(),
            content: IndexMap::from([(
                "text/plain".to_string(),
                MediaType {
                    example: Some(Value::Null),
                    ..MediaType::default()
                },
            )]),
            ..Response::default()
        };
        let get = Operation {
            tags: vec!["pets".into()],
            summary: Some("Show a pet".into()),
            description: Some("Longer text".into()),
            operation_id: Some("showPet".into()),
            parameters: vec![limit.clone()],
            responses: Some(IndexMap::from([
                ("200".to_string(), ok),
                ("410".to_string(), gone),
            ])),
            deprecated: Some(true),
            security: Some(vec![IndexMap::from([(
                "oauth".to_string(),
                vec!["read:pets".to_string()],
            )])]),
            extensions: extensions(&[("x-rate-limit", json!(10))]),
        };
        let oauth = SecurityScheme {
            scheme_type: "oauth2".into(),
            description: Some("OAuth".into()),
            flows: Some(OAuthFlows {
                authorization_code: Some(OAuthFlow {
                    authorization_url: Some("https://auth.example.com/authorize".into()),
                    token_url: Some("https://auth.example.com/token".into()),
                    refresh_url: Some("https://auth.example.com/refresh".into()),
                    scopes: IndexMap::from([("read:pets".to_string(), "Read pets".to_string())]),
                    extensions: extensions(&[("x-pkce", json!(true))]),
                }),
                client_credentials: Some(OAuthFlow {
                    token_url: Some("https://auth.example.com/token".into()),
                    ..OAuthFlow::default()
                }),
                ..OAuthFlows::default()
            }),
            ..SecurityScheme::default()
        };
        let api_key = SecurityScheme {
            scheme_type: "apiKey".into(),
            name: Some("X-Key".into()),
            location: Some("header".into()),
            ..SecurityScheme::default()
        };
        let bearer = SecurityScheme {
            scheme_type: "http".into(),
            scheme: Some("bearer".into()),
            bearer_format: Some("JWT".into()),
            open_id_connect_url: Some("https://auth.example.com/.well-known".into()),
            ..SecurityScheme::default()
        };

        Document {
            openapi: Some("3.0.3".into()),
            info: Some(Info {
                title: "Pets".into(),
                description: Some("Pet store".into()),
                terms_of_service: Some("https://example.com/terms".into()),
                contact: Some(Contact {
                    name: Some("API team".into()),
                    url: Some("https://example.com".into()),
                    email: Some("api@example.com".into()),
                    extensions: extensions(&[("x-slack", json!("#api"))]),
                }),
                license: Some(License {
                    name: "MIT".into(),
                    url: Some("https://opensource.org/licenses/MIT".into()),
                    extensions: Extensions::new(),
                }),
                version: "1.2.0".into(),
                extensions: extensions(&[("x-logo", json!({ "url": "logo.png" }))]),
            }),
            servers: vec![Server {
                url: "https://api.example.com".into(),
                description: Some("Production".into()),
                extensions: extensions(&[("x-region", json!("eu"))]),
            }],
            paths: Some(IndexMap::from([(
                "/pets/{id}".to_string(),
                PathItem {
                    summary: Some("One pet".into()),
                    description: Some("Pet by id".into()),
                    get: Some(get),
                    delete: Some(Operation {
                        responses: Some(IndexMap::new()),
                        ..Operation::default()
                    }),
                    parameters: vec![limit],
                    extensions: extensions(&[("x-internal", json!(true))]),
                    ..PathItem::default()
                },
            )])),
            components: Some(Components {
                schemas: IndexMap::from([("Pet".to_string(), pet)]),
                security_schemes: IndexMap::from([
                    ("oauth".to_string(), oauth),
                    ("key".to_string(), api_key),
                    ("bearer".to_string(), bearer),
                ]),
                extensions: extensions(&[("x-generated", json!(true))]),
            }),
            tags: vec![Tag {
                name: "pets".into(),
                description: Some("Pet operations".into()),
                extensions: extensions(&[("x-order", json!(1))]),
            }],
            extensions: extensions(&[("x-generator", json!("apigraph"))]),
        }
    }

    #[test]
    fn populated_document_reparses_identically() {
        let doc = populated();
        let text = to_json(&doc).unwrap();
        assert!(text.contains("\"example\": null"));
        assert!(text.contains("\"x-nullable\": null"));
        assert_eq!(from_json(&text).unwrap(), doc);
    }

    #[test]
    fn yaml_like_strips_quotes() {
        let text = to_yaml_like(&sample()).unwrap();
        assert!(!text.contains('"'));
        assert!(text.contains("openapi: 3.0.3"));
        assert!(text.contains("$ref: #/components/schemas/NewModel"));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(from_json("{ not json"), Err(ExportError::Parse(_))));
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert_eq!("yml".parse::<ExportFormat>(), Ok(ExportFormat::Yaml));
        assert!("toml".parse::<ExportFormat>().is_err());
    }
}
