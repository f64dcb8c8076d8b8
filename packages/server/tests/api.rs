//! End-to-end tests that drive the router in-process.

use std::sync::Arc;
use std::time::Duration;

use apigraph::{Workspace, WORKSPACE_KEY};
use apigraph_server::{
    build_router, restore_editor, AppState, Editor, MemoryStorage, ServerConfig, Storage,
    ValidationScheduler,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
}

fn app_with(storage: Arc<dyn Storage>, editor: Editor) -> TestApp {
    let state = AppState {
        editor: Arc::new(editor),
        storage,
        workspace_key: WORKSPACE_KEY.to_string(),
    };
    TestApp {
        router: build_router(state.clone()),
        state,
    }
}

fn app() -> TestApp {
    app_with(
        Arc::new(MemoryStorage::new()),
        Editor::new(
            Workspace::default(),
            ValidationScheduler::new(Duration::ZERO),
        ),
    )
}

impl TestApp {
    async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    async fn add(&self, kind: &str) -> String {
        let (status, node) = self.call("POST", "/v1/nodes", Some(json!({ "kind": kind }))).await;
        assert_eq!(status, StatusCode::CREATED);
        node["id"].as_str().unwrap().to_string()
    }

    async fn connect(&self, source: &str, target: &str) -> (StatusCode, Value) {
        self.call(
            "POST",
            "/v1/connect",
            Some(json!({ "sourceId": source, "targetId": target })),
        )
        .await
    }

    async fn settled_report(&self) -> Value {
        let mut rx = self.state.editor.scheduler().subscribe();
        let latest = self.state.editor.scheduler().latest_generation();
        tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|r| !r.validating && r.generation == latest),
        )
        .await
        .expect("validation did not settle")
        .expect("scheduler dropped");
        self.call("GET", "/v1/issues", None).await.1
    }
}

#[tokio::test]
async fn pets_scenario_gets_default_response_and_no_responses_error() {
    let app = app();
    let p = app.add("path").await;
    let o = app.add("operation").await;
    let (status, _) = app
        .call(
            "PATCH",
            &format!("/v1/nodes/{p}"),
            Some(json!({ "properties": { "path": "/pets" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, edge) = app.connect(&p, &o).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(edge["sourceId"], p.as_str());

    let (_, doc) = app.call("GET", "/v1/document", None).await;
    assert_eq!(
        doc["paths"]["/pets"]["get"]["responses"]["200"]["description"],
        "Successful operation"
    );

    let report = app.settled_report().await;
    let issues = report["issues"].as_array().unwrap();
    assert!(!issues.iter().any(|i| i["rule"] == "operation-responses-missing"));
    assert!(issues.iter().any(|i| i["rule"] == "operation-id-missing"));
}

#[tokio::test]
async fn illegal_connect_is_rejected_and_graph_unchanged() {
    let app = app();
    let m = app.add("model").await;
    let p = app.add("path").await;

    let (status, body) = app.connect(&m, &p).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "connection_rejected");

    let (_, graph) = app.call("GET", "/v1/graph", None).await;
    assert_eq!(graph["edges"].as_array().unwrap().len(), 0);
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn node_lifecycle() {
    let app = app();
    let (status, node) = app
        .call(
            "POST",
            "/v1/nodes",
            Some(json!({ "id": "n1", "label": "Pet", "properties": { "kind": "model", "name": "Pet" } })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(node["properties"]["kind"], "model");

    let (status, body) = app
        .call("POST", "/v1/nodes", Some(json!({ "kind": "path", "id": "n1" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "id_conflict");

    let (status, body) = app
        .call(
            "PATCH",
            "/v1/nodes/n1",
            Some(json!({ "properties": { "required": "id" } })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "invalid_patch");

    let (status, _) = app.call("DELETE", "/v1/nodes/n1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.call("GET", "/v1/nodes/n1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn removing_a_node_cascades_edges() {
    let app = app();
    let p = app.add("path").await;
    let o = app.add("operation").await;
    let r = app.add("response").await;
    app.connect(&p, &o).await;
    app.connect(&o, &r).await;

    let (status, _) = app.call("DELETE", &format!("/v1/nodes/{o}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, graph) = app.call("GET", "/v1/graph", None).await;
    assert!(graph["edges"].as_array().unwrap().is_empty());
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn raw_edges_bypass_policy_but_need_endpoints() {
    let app = app();
    let m = app.add("model").await;
    let p = app.add("path").await;

    let (status, edge) = app
        .call(
            "POST",
            "/v1/edges",
            Some(json!({ "sourceId": m, "targetId": p })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .call(
            "POST",
            "/v1/edges",
            Some(json!({ "sourceId": m, "targetId": "ghost" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let id = edge["id"].as_str().unwrap();
    let (status, _) = app.call("DELETE", &format!("/v1/edges/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call("DELETE", &format!("/v1/edges/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn selection_set_and_clear() {
    let app = app();
    let p = app.add("path").await;

    let (status, body) = app
        .call("PUT", "/v1/selection", Some(json!({ "selectedId": p })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selectedId"], p.as_str());

    let (status, _) = app
        .call("PUT", "/v1/selection", Some(json!({ "selectedId": "ghost" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app
        .call("PUT", "/v1/selection", Some(json!({ "selectedId": null })))
        .await;
    assert!(body["selectedId"].is_null());
}

#[tokio::test]
async fn policy_lists_the_connection_table() {
    let app = app();
    let (status, body) = app.call("GET", "/v1/policy", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rules"].as_array().unwrap().len(), 5);
    assert_eq!(body["rules"][0], json!({ "source": "path", "target": "operation" }));
}

#[tokio::test]
async fn header_update_flows_into_document() {
    let app = app();
    let (_, mut header) = app.call("GET", "/v1/header", None).await;
    assert_eq!(header["openapi"], "3.0.3");
    header["info"]["title"] = json!("Pet Store");

    let (status, _) = app.call("PUT", "/v1/header", Some(header)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, doc) = app.call("GET", "/v1/document", None).await;
    assert_eq!(doc["info"]["title"], "Pet Store");
}

#[tokio::test]
async fn export_formats() {
    let app = app();
    app.add("path").await;

    let (status, body) = app.call("GET", "/v1/export?format=yaml", None).await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap();
    assert!(text.contains("openapi: 3.0.3"));
    assert!(!text.contains('"'));

    let (status, body) = app.call("GET", "/v1/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["openapi"], "3.0.3");

    let (status, body) = app.call("GET", "/v1/export?format=toml", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_parameter");
}

#[tokio::test]
async fn validate_endpoint_returns_generation() {
    let app = app();
    let (status, body) = app.call("POST", "/v1/validate", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["generation"], 1);

    let report = app.settled_report().await;
    assert_eq!(report["generation"], 1);
    assert_eq!(report["issues"][0]["rule"], "paths-empty");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/v1/connect")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkpoint_then_restore() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let config = ServerConfig {
        validation_delay: Duration::ZERO,
        ..ServerConfig::default()
    };

    let first = app_with(
        Arc::clone(&storage),
        restore_editor(storage.as_ref(), WORKSPACE_KEY, &config)
            .await
            .unwrap(),
    );
    let p = first.add("path").await;
    let o = first.add("operation").await;
    first.connect(&p, &o).await;
    first
        .call("PUT", "/v1/selection", Some(json!({ "selectedId": p })))
        .await;
    let (status, body) = first.call("POST", "/v1/checkpoint", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodes"], 2);

    let second = app_with(
        Arc::clone(&storage),
        restore_editor(storage.as_ref(), WORKSPACE_KEY, &config)
            .await
            .unwrap(),
    );
    let (_, graph) = second.call("GET", "/v1/graph", None).await;
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(graph["edges"].as_array().unwrap().len(), 1);
    assert!(graph.get("selectedId").is_none());

    // Issues are recomputed eagerly after a restore.
    let report = second.settled_report().await;
    assert_eq!(report["generation"], 1);
    assert!(report["issues"]
        .as_array()
        .unwrap()
        .iter()
        .any(|i| i["rule"] == "operation-id-missing"));
}

#[tokio::test]
async fn issue_stream_starts_with_current_report() {
    let app = app();
    let req = Request::builder()
        .method("GET")
        .uri("/v1/issues/stream")
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/event-stream"));

    let mut body = resp.into_body();
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("no event received")
        .expect("stream ended")
        .unwrap();
    let data = frame.into_data().unwrap();
    let text = String::from_utf8_lossy(&data);
    assert!(text.contains("event: report"));
    assert!(text.contains("\"generation\":0"));
}
