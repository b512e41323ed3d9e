//! Certificate order storefront library.
//!
//! This crate provides the order wizard web application as a library,
//! allowing it to be tested and reused. The binary in `main.rs` adds
//! Sentry, logging and the listener around [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Build the application router with all routes and middleware.
///
/// Sentry layers are not included; the binary adds them outermost.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());
    let max_upload_bytes = state.config().max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(max_upload_bytes))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri().path(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable while no order endpoint is configured,
/// since every submission would fail.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.webhook().is_configured() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;

    fn test_app(vars: &[(&str, &str)]) -> Router {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let config = StorefrontConfig::from_lookup(&|key| vars.get(key).cloned()).unwrap();
        app(AppState::new(config).unwrap())
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app(&[]).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_readiness_requires_endpoint() {
        let response = test_app(&[]).oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let app = test_app(&[("ORDER_WEBHOOK_URL", "https://hooks.example.com/orders")]);
        let response = app.oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_redirects_to_order() {
        let response = test_app(&[]).oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/order");
    }

    #[tokio::test]
    async fn test_order_page_starts_on_upload() {
        let response = test_app(&[]).oneshot(get("/order")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        assert!(response.headers().contains_key("x-request-id"));

        let body = body_text(response).await;
        assert!(body.contains("Step 1 of 4"));
        assert!(body.contains("name=\"image\""));
    }

    #[tokio::test]
    async fn test_next_without_image_is_refused() {
        let request = Request::builder()
            .method("POST")
            .uri("/order/next")
            .body(Body::empty())
            .unwrap();
        let response = test_app(&[]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Please upload an image"));
    }

    #[tokio::test]
    async fn test_unknown_size_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/order/size")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("size=9x9"))
            .unwrap();
        let response = test_app(&[]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_phone_script_uses_server_rule() {
        let script = include_str!("../static/js/phone-filter.js");
        assert!(script.contains("/^[0-9 ()+-]*$/"));
        // A rejected edit restores the last accepted value, like the server.
        assert!(script.contains("input.value = accepted"));

        assert!(certificate_order_core::PhoneNumber::parse("0123456789 ()+-").is_ok());
        assert!(certificate_order_core::PhoneNumber::parse("\t").is_err());
    }

    #[tokio::test]
    async fn test_submit_outside_review_is_conflict() {
        let request = Request::builder()
            .method("POST")
            .uri("/order/submit")
            .body(Body::empty())
            .unwrap();
        let response = test_app(&[]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
