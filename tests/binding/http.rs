//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::Arc;

use param_bind::request::{Method, Request};
use param_bind::{Bind, Service};
use serde_json::{json, Value};

use crate::support::{binder_with_db, ListUsers, NewUser, Paging};

/// Path params are visible to handlers; `handler` is the route's own capture.
#[derive(Debug, Clone, Default, Bind)]
struct Signup {
    #[bind(param, name = "handler")]
    route: String,
    #[bind(body)]
    user: NewUser,
    #[bind(nested)]
    paging: Paging,
}

fn test_service() -> Arc<Service<Request, Value>> {
    let service = Service::new(binder_with_db())
        .handler("ping", || json!({ "pong": true }))
        .unwrap()
        .handler("users", |q: ListUsers| {
            json!({ "page": q.page, "tenant": q.tenant, "session": q.session })
        })
        .unwrap()
        .handler("signup", |s: Signup| {
            json!({ "route": s.route, "name": s.user.name, "order": format!("{:?}", s.paging.order) })
        })
        .unwrap()
        .handler("method", |m: Method| json!(m.as_str()))
        .unwrap();
    Arc::new(service)
}

async fn start_server(service: Arc<Service<Request, Value>>) -> String {
    serve_router(param_bind::http::router(service)).await
}

/// Bind to port 0 and return the actual address.
async fn serve_router(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_check() {
    let base = start_server(test_service()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["handlers"], json!(["method", "ping", "signup", "users"]));
}

#[tokio::test]
async fn query_header_and_cookie_binding() {
    let base = start_server(test_service()).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/users?page=7"))
        .header("X-Tenant", "acme")
        .header("Cookie", "sid=s9")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "page": 7, "tenant": "acme", "session": "s9" }));
}

#[tokio::test]
async fn json_body_binding() {
    let base = start_server(test_service()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/signup?order=desc"))
        .json(&json!({ "name": "Ann", "email": "ann@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "route": "signup", "name": "Ann", "order": "Desc" }));
}

#[tokio::test]
async fn method_is_forwarded() {
    let base = start_server(test_service()).await;
    let client = reqwest::Client::new();

    let resp = client.delete(format!("{base}/method")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!("DELETE"));
}

#[tokio::test]
async fn missing_values_are_bad_requests() {
    let base = start_server(test_service()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/users")).send().await.unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("x-tenant"));
}

#[tokio::test]
async fn unknown_handler_is_not_found() {
    let base = start_server(test_service()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/nope")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn route_capture_is_a_path_param() {
    let base = start_server(test_service()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/signup"))
        .json(&json!({ "name": "Cy", "email": "cy@example.com" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["route"], "signup");
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let app = param_bind::http::router_with_body_limit(test_service(), 1024);
    let base = serve_router(app).await;
    let client = reqwest::Client::new();

    let name = "n".repeat(4096);
    let resp = client
        .post(format!("{base}/signup"))
        .json(&json!({ "name": name, "email": "big@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);

    let resp = client
        .post(format!("{base}/signup"))
        .json(&json!({ "name": "Di", "email": "di@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}
