//! HTTP transport: serve a [`Service`] over axum.
//!
//! Requires the `http` feature.
//!
//! ## Routes
//!
//! - `GET /health`: `{ "ok": true, "handlers": [...] }`.
//! - `ANY /:handler`: binds the handler's arguments from the HTTP request and
//!   returns its output as JSON. Binding errors map through
//!   [`BindError::status_code`]. The route's own capture is visible to
//!   handlers as the path param `handler`, so `#[bind(param, name =
//!   "handler")]` reads the dispatched name.
//!
//! Request bodies larger than [`BODY_LIMIT`] (or the limit passed to
//! [`router_with_body_limit`]) are rejected with `413 Payload Too Large`.
//!
//! ```ignore
//! let service = Arc::new(Service::new(binder).handler("users.list", list_users)?);
//! param_bind::http::serve(service, "0.0.0.0:3000").await?;
//! ```

use std::sync::Arc;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, FromRequest, FromRequestParts, Path, RawPathParams, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::error::BindError;
use crate::request::Request;
use crate::service::Service;

/// Largest request body accepted by [`router`], in bytes.
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for Request {
    type Rejection = Response;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let mut request = Request::new(parts.method.as_str(), target);

        for (name, value) in parts.headers.iter() {
            if let Ok(value) = value.to_str() {
                request = request.header(name.as_str(), value);
            }
        }

        if let Ok(params) = RawPathParams::from_request_parts(&mut parts, state).await {
            for (name, value) in params.iter() {
                request = request.param(name, value);
            }
        }

        // the `Bytes` extractor honours `DefaultBodyLimit`
        let bytes = Bytes::from_request(axum::extract::Request::from_parts(parts, body), state)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(request.body(bytes.to_vec()))
    }
}

/// Build an axum `Router` that dispatches to the service's handlers.
pub fn router<R>(service: Arc<Service<Request, R>>) -> Router
where
    R: Serialize + Send + 'static,
{
    router_with_body_limit(service, BODY_LIMIT)
}

/// Like [`router`], with request bodies capped at `limit` bytes.
pub fn router_with_body_limit<R>(service: Arc<Service<Request, R>>, limit: usize) -> Router
where
    R: Serialize + Send + 'static,
{
    Router::new()
        .route("/health", get(health_handler::<R>))
        .route("/:handler", any(dispatch_handler::<R>))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(service)
}

/// Serve the service over HTTP at `addr` (e.g. `"0.0.0.0:3000"`).
pub async fn serve<R>(service: Arc<Service<Request, R>>, addr: &str) -> Result<(), std::io::Error>
where
    R: Serialize + Send + 'static,
{
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr, "serving handlers over http");
    axum::serve(listener, app).await
}

async fn health_handler<R: 'static>(
    State(service): State<Arc<Service<Request, R>>>,
) -> impl IntoResponse {
    Json(json!({ "ok": true, "handlers": service.handlers() }))
}

async fn dispatch_handler<R: Serialize + 'static>(
    State(service): State<Arc<Service<Request, R>>>,
    Path(name): Path<String>,
    request: Request,
) -> Response {
    match service.dispatch(&name, &request) {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => error_response(&e),
    }
}

fn error_response(err: &BindError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::warn!(error = %err, "handler dispatch failed");
    }
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
