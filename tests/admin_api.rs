//! End-to-end tests for the admin API.

use std::sync::Arc;

use mockapi::{MemoryStore, ServerConfig};
use serde_json::{json, Value};

mod common;
use common::TestServer;

fn user_endpoint() -> Value {
    json!({
        "method": "GET",
        "pathTemplate": "/users/:id",
        "validationRule": "",
        "responseBody": "{\"id\":1}",
        "statusCode": 200
    })
}

#[tokio::test]
async fn test_crud_round_trip() {
    let (server, _store) = TestServer::with_memory_store().await;

    let res = server
        .client
        .post(server.url("/api/endpoints"))
        .json(&user_endpoint())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["pathTemplate"], "/users/:id");

    let res = server.client.get(server.url("/api/endpoints")).send().await.unwrap();
    let all: Value = res.json().await.unwrap();
    assert_eq!(all.as_array().unwrap().len(), 1);

    // Newly created endpoint serves traffic immediately.
    let res = server.client.get(server.url("/mock/users/7")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let mut changed = user_endpoint();
    changed["statusCode"] = json!(202);
    let res = server
        .client
        .put(server.url(&format!("/api/endpoints/{}", id)))
        .json(&changed)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["statusCode"], 202);

    let res = server.client.get(server.url("/mock/users/7")).send().await.unwrap();
    assert_eq!(res.status(), 202);

    let res = server
        .client
        .delete(server.url(&format!("/api/endpoints/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = server
        .client
        .get(server.url(&format!("/api/endpoints/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_unknown_ids() {
    let (server, _store) = TestServer::with_memory_store().await;

    let res = server
        .client
        .put(server.url("/api/endpoints/missing"))
        .json(&user_endpoint())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Endpoint not found");

    let res = server
        .client
        .delete(server.url("/api/endpoints/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_invalid_definitions_rejected() {
    let (server, store) = TestServer::with_memory_store().await;

    let mut bad = user_endpoint();
    bad["pathTemplate"] = json!("users");
    bad["statusCode"] = json!(700);
    let res = server
        .client
        .post(server.url("/api/endpoints"))
        .json(&bad)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["details"].as_array().unwrap().len(), 2);

    let mut bad_method = user_endpoint();
    bad_method["method"] = json!("TRACE");
    let res = server
        .client
        .post(server.url("/api/endpoints"))
        .json(&bad_method)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = server
        .client
        .post(server.url("/api/endpoints"))
        .header("content-type", "application/json")
        .body("{ nope")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    assert!(mockapi::EndpointRepository::is_empty(store.as_ref()));
}

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let mut config = ServerConfig::default();
    config.admin.api_key = Some("secret".into());
    let server = TestServer::start(config, Arc::new(MemoryStore::new())).await;

    let res = server.client.get(server.url("/api/endpoints")).send().await.unwrap();
    assert_eq!(res.status(), 401);

    let res = server
        .client
        .get(server.url("/api/endpoints"))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = server
        .client
        .get(server.url("/api/endpoints"))
        .bearer_auth("secret")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    // Mock traffic is never behind the key.
    let res = server.client.get(server.url("/mock/anything")).send().await.unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_admin_disabled() {
    let mut config = ServerConfig::default();
    config.admin.enabled = false;
    let server = TestServer::start(config, Arc::new(MemoryStore::new())).await;

    let res = server.client.get(server.url("/api/endpoints")).send().await.unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_status() {
    let (server, _store) = TestServer::with_memory_store().await;
    let res = server.client.get(server.url("/api/status")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["endpoints"], 0);
}
