#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod attempt;
mod error;
mod format;
mod http_client;
mod outcome;
mod placeholder;
mod request;
mod server;
mod style;
mod types;
mod validate;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

pub use attempt::{Attempt, ImagePayload, UpstreamAuth, UpstreamRequest, UpstreamResponse};
pub use error::{AttemptFailure, InvalidInput, Result, StickerError};
pub use format::ImageFormat;
pub use outcome::{AttemptReport, GenerationOutcome};
pub use placeholder::{PLACEHOLDER_FORMAT, PLACEHOLDER_METHOD, render as render_placeholder};
pub use server::{GeneratorServerBuilder, Server};
pub use style::StylePreset;
pub use types::{Dimensions, GenerationRequest, Quality, StickerResponse, StyleInfo, StylesResponse};
pub use validate::Limits;

use request::JsonBody;

/// Path of the sticker generation endpoint
pub const GENERATE_PATH: &str = "/api/generate-sticker";

/// Path of the style listing endpoint
pub const STYLES_PATH: &str = "/api/styles";

/// Build the sticker generation server from configuration
///
/// # Errors
///
/// Returns an error if an attempt cannot be built from its configuration
pub fn build_server(config: &sticker_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        GeneratorServerBuilder::new(&config.generator)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize sticker generator: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for sticker generation
///
/// `OPTIONS` is answered with an empty 200 and every method other than
/// `POST` or `OPTIONS` with 405.
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route(
        GENERATE_PATH,
        post(generate).options(preflight).fallback(method_not_allowed),
    )
}

/// Create the router listing the available sticker styles
pub fn styles_router() -> Router {
    Router::new().route(STYLES_PATH, get(list_styles))
}

/// Handle sticker generation requests
async fn generate(State(server): State<Arc<Server>>, JsonBody(body): JsonBody) -> Result<Json<StickerResponse>> {
    let request = GenerationRequest::from_body(&body, server.limits()).inspect_err(|e| {
        tracing::debug!(reason = %e, "rejected sticker request");
    })?;

    tracing::debug!(
        prompt_chars = request.prompt.chars().count(),
        size = %request.dimensions,
        style = request.style.map(StylePreset::name),
        "sticker generation handler called"
    );

    let outcome = server.generate(&request).await?;
    let response = outcome.into_response(&request, jiff::Timestamp::now().to_string());

    tracing::debug!(method = %response.method, placeholder = response.is_placeholder, "sticker generation complete");

    Ok(Json(response))
}

/// Pre-flight requests succeed with an empty body
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> StickerError {
    StickerError::InvalidMethod
}

async fn list_styles() -> Json<StylesResponse> {
    Json(StylesResponse {
        styles: StylePreset::catalog(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use http::{Method, Request};
    use http_body_util::BodyExt;
    use sticker_config::{AttemptConfig, AttemptType, Config};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        let mut config = Config::default();
        config.generator.timeout = Duration::from_millis(500);
        config.generator.attempts.insert(
            "unreachable".to_string(),
            AttemptConfig {
                base_url: Some("http://127.0.0.1:9".parse().unwrap()),
                ..AttemptConfig::new(AttemptType::Pollinations)
            },
        );

        endpoint_router()
            .with_state(build_server(&config).unwrap())
            .merge(styles_router())
    }

    async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, body)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(GENERATE_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn preflight_is_empty_ok() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(GENERATE_PATH)
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let request = Request::builder().method(method).uri(GENERATE_PATH).body(Body::empty()).unwrap();

            let (status, body) = send(request).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(body, br#"{"error":"Method not allowed"}"#);
        }
    }

    #[tokio::test]
    async fn empty_prompt_is_bad_request() {
        let (status, body) = send(post_json(r#"{"prompt": ""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, br#"{"error":"Prompt cannot be empty"}"#);
    }

    #[tokio::test]
    async fn wrong_content_type_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri(GENERATE_PATH)
            .header("content-type", "text/plain")
            .body(Body::from(r#"{"prompt": "a red fox"}"#))
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, br#"{"error":"Content-Type must be application/json"}"#);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (status, body) = send(post_json("{prompt: a red fox")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, br#"{"error":"Request body must be valid JSON"}"#);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let padding = "x".repeat(2 * 1024 * 1024);
        let (status, _) = send(post_json(&format!(r#"{{"prompt": "a red fox", "padding": "{padding}"}}"#))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn unreachable_upstream_yields_placeholder() {
        let (status, body) = send(post_json(r#"{"prompt": "a red fox", "size": "256x256"}"#)).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["isPlaceholder"], true);
        assert_eq!(json["method"], "placeholder");
        assert_eq!(json["width"], 256);
        assert_eq!(json["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn styles_are_listed() {
        let request = Request::builder().uri(STYLES_PATH).body(Body::empty()).unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["styles"].as_array().unwrap().len(), StylePreset::ALL.len());
        assert_eq!(json["styles"][0]["name"], "classic");
    }
}
