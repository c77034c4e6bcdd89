//! Hot reload driven by real filesystem events.

use std::time::Duration;

use serde_json::json;

mod common;
use common::{client, TestServer};

fn route(data: serde_json::Value) -> serde_json::Value {
    json!({ "path": "/a", "method": "GET", "status": 200, "data": data })
}

async fn body(server: &TestServer, target: &str) -> (u16, String) {
    let res = client().get(server.url(target)).send().await.unwrap();
    (res.status().as_u16(), res.text().await.unwrap())
}

#[tokio::test]
async fn test_include_edit_is_served() {
    let server = TestServer::start(
        &[
            ("api.json", json!({ "routers": [ { "include": "a.json" } ] })),
            ("a.json", route(json!({ "a": 1 }))),
        ],
        true,
    )
    .await;
    assert_eq!(body(&server, "/a").await, (200, r#"{"a":1}"#.to_string()));

    // Let the watcher settle before editing.
    tokio::time::sleep(Duration::from_millis(200)).await;
    server.write("a.json", &route(json!({ "a": 2 })));

    assert!(server.wait_for_generation(1).await, "reload never happened");
    assert_eq!(body(&server, "/a").await, (200, r#"{"a":2}"#.to_string()));
}

#[tokio::test]
async fn test_malformed_include_keeps_serving() {
    let server = TestServer::start(
        &[
            ("api.json", json!({ "routers": [ { "include": "a.json" } ] })),
            ("a.json", route(json!({ "a": 1 }))),
        ],
        true,
    )
    .await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    server.write_raw("a.json", r#"{ "path": "/a", "method": "#);
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(server.routes.generation(), 0);
    assert_eq!(body(&server, "/a").await, (200, r#"{"a":1}"#.to_string()));

    // A later fix is picked up.
    server.write("a.json", &route(json!({ "a": 3 })));
    assert!(server.wait_for_generation(1).await, "reload never happened");
    assert_eq!(body(&server, "/a").await, (200, r#"{"a":3}"#.to_string()));
}

#[tokio::test]
async fn test_entry_edit_adds_route() {
    let server = TestServer::start(
        &[("api.json", json!({ "routers": [ route(json!({ "a": 1 })) ] }))],
        true,
    )
    .await;
    assert_eq!(body(&server, "/b").await.0, 404);

    tokio::time::sleep(Duration::from_millis(200)).await;
    server.write(
        "api.json",
        &json!({ "routers": [
            route(json!({ "a": 1 })),
            { "path": "/b", "method": "GET", "status": 202, "data": { "b": true } }
        ] }),
    );

    assert!(server.wait_for_generation(1).await, "reload never happened");
    assert_eq!(body(&server, "/b").await, (202, r#"{"b":true}"#.to_string()));
    assert_eq!(body(&server, "/a").await, (200, r#"{"a":1}"#.to_string()));
}
