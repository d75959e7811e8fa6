//! HTTP adapter tests, driven in-process and over a real listener.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use chain_router::config::parse_config;
use chain_router::config::schema::ServerConfig;
use chain_router::{HttpServer, Shutdown};

fn app() -> (HttpServer, Router) {
    let server = HttpServer::new(&ServerConfig::default(), common::endpoints());
    let router = server.router();
    (server, router)
}

async fn call(router: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_match_returns_chain_and_params() {
    let (_server, router) = app();
    let (status, body) = call(router, "GET", "/users/24").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chain"], "by-id");
    assert_eq!(body["fallback"], false);
    assert_eq!(body["params"]["ID"], 24);
    assert_eq!(body["params"]["Tp"], "");
    assert_eq!(body["tail"], json!([]));
}

#[tokio::test]
async fn test_empty_remainder_hits_empty_pattern_chain() {
    let (_server, router) = app();
    let (status, body) = call(router.clone(), "GET", "/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chain"], "all");

    let (status, body) = call(router, "GET", "/users/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chain"], "all");
}

#[tokio::test]
async fn test_unmatched_path_is_404() {
    let (_server, router) = app();
    let (status, body) = call(router.clone(), "GET", "/users/123/active").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no chain matched");

    let (status, body) = call(router, "GET", "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no endpoint");
}

#[tokio::test]
async fn test_conversion_failure_is_404() {
    let (_server, router) = app();
    let (status, body) = call(router, "GET", "/users/99999999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ID"));
}

#[tokio::test]
async fn test_trailing_slash_is_ignored() {
    let (_server, router) = app();
    let (status, body) = call(router.clone(), "GET", "/users/24/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chain"], "by-id");

    let (status, body) = call(router, "GET", "/users/group/335/active/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chain"], "group-status");
    assert_eq!(body["params"]["GID"], 335);
}

#[tokio::test]
async fn test_segments_are_percent_decoded() {
    let (_server, router) = app();
    let (status, body) = call(router.clone(), "GET", "/files/docs/a%20b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tail"], json!(["a b"]));

    let (status, body) = call(router, "GET", "/files/caf%C3%A9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallback"], true);
    assert_eq!(body["params"]["Root"], "café");
}

#[tokio::test]
async fn test_unknown_method_is_405() {
    let (_server, router) = app();
    let (status, _) = call(router, "DELETE", "/users/24").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_patch_mirrors_put() {
    let (_server, router) = app();
    let (status, body) = call(router, "PATCH", "/users/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chain"], "update");
}

#[tokio::test]
async fn test_info_describes_endpoint() {
    let (_server, router) = app();
    let (status, body) = call(router, "GET", "/users/.info").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "Users");
    let get = &body["methods"]["GET"];
    assert_eq!(get["summary"], "Read users");
    assert_eq!(get["params"]["GID"], "u64");
    let by_id = get["chains"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "by-id")
        .unwrap();
    assert_eq!(by_id["tokens"][0]["varName"], "ID");
    assert_eq!(by_id["tokens"][0]["description"], "user id");
}

#[tokio::test]
async fn test_default_and_tail() {
    let (_server, router) = app();

    let (status, body) = call(router.clone(), "GET", "/files/docs/a/b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallback"], false);
    assert_eq!(body["params"]["Root"], "docs");
    assert_eq!(body["tail"], json!(["a", "b"]));

    let (status, body) = call(router, "GET", "/files/123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallback"], true);
}

#[tokio::test]
async fn test_reload_swaps_or_keeps_endpoints() {
    let (server, router) = app();

    let broken = parse_config(
        r#"
[[endpoints]]
prefix = "/users"
params = { ID = "u64" }
[[endpoints.methods.GET.chains]]
name = "broken"
tokens = [{ expr = "(", var = "ID" }]
"#,
    )
    .unwrap();
    assert!(!server.state().apply(&broken));
    let (status, _) = call(router.clone(), "GET", "/users/24").await;
    assert_eq!(status, StatusCode::OK);

    let replacement = parse_config(
        r#"
[[endpoints]]
prefix = "/orders"
params = { ID = "u64" }
[[endpoints.methods.GET.chains]]
name = "order"
tokens = [{ expr = '\d+', var = "ID" }]
"#,
    )
    .unwrap();
    assert!(server.state().apply(&replacement));

    let (status, _) = call(router.clone(), "GET", "/users/24").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = call(router, "GET", "/orders/5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chain"], "order");
}

#[tokio::test]
async fn test_serve_until_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&ServerConfig::default(), common::endpoints());

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, None, shutdown.subscribe()));

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    stream
        .write_all(b"GET /users/24 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("\"by-id\""));

    shutdown.trigger();
    handle.await.unwrap().unwrap();
}
