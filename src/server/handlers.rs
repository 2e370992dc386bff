use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::info;

use crate::error::ProcessError;
use crate::providers::Provider;

use super::models::{ProcessRequest, ProcessResponse};
use super::process::{failure_response, handle_request};
use super::state::ServerState;

pub async fn run_server<P>(state: ServerState<P>, addr: &str) -> Result<()>
where
    P: Provider + Clone + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind server address {}", addr))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router<P>(state: ServerState<P>) -> Router
where
    P: Provider + Clone + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/process", post(process::<P>))
        .with_state(Arc::new(state))
        .layer(axum::middleware::from_fn(cors_middleware))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type,authorization"),
    );
}

async fn process<P>(
    State(state): State<Arc<ServerState<P>>>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> (StatusCode, Json<ProcessResponse>)
where
    P: Provider + Clone + 'static,
{
    let (status, response) = match payload {
        Ok(Json(request)) => handle_request(state.as_ref(), request).await,
        Err(rejection) => failure_response(
            state.as_ref(),
            &ProcessError::MalformedBody(rejection.body_text()),
        ),
    };
    (status, Json(response))
}
