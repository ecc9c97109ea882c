use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StickerError>;

/// Errors surfaced to the caller of the sticker endpoint
///
/// Upstream failures never appear here: they are absorbed per attempt and
/// end in the placeholder image.
#[derive(Debug, Error)]
pub enum StickerError {
    /// HTTP method other than `POST` or `OPTIONS`
    #[error("Method not allowed")]
    InvalidMethod,

    /// Request body or prompt failed validation
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    /// Request body exceeded the size limit
    #[error("Request body is too large, limit is {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Generator configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected fault outside the attempt loop
    #[error("{0}")]
    Internal(String),
}

/// Validation failures, each with a stable caller-facing message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("Content-Type must be application/json")]
    ContentType,

    #[error("Request body must be valid JSON")]
    MalformedJson,

    #[error("Request body must be a JSON object")]
    BodyNotObject,

    #[error("Failed to read request body")]
    UnreadableBody,

    #[error("Prompt is required")]
    PromptMissing,

    #[error("Prompt must be a string")]
    PromptNotString,

    #[error("Prompt cannot be empty")]
    PromptEmpty,

    #[error("Prompt must be at most {max} characters")]
    PromptTooLong { max: usize },
}

impl StickerError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidMethod => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Client error body: `{"error": "..."}`
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Server fault body: `{"error": "...", "details": "..."}`
#[derive(Debug, Serialize)]
struct FaultResponse {
    error: &'static str,
    details: String,
}

impl IntoResponse for StickerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "sticker generation failed");

            let body = FaultResponse {
                error: "Sticker generation failed",
                details: self.to_string(),
            };
            return (status, Json(body)).into_response();
        }

        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Why a single upstream attempt did not produce an image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    /// Connection, TLS, or body read failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// No complete response within the per-call ceiling
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Upstream answered 429
    #[error("rate limited (status 429)")]
    RateLimited { retry_after: Option<Duration> },

    /// Upstream rejected the credentials
    #[error("authorization rejected (status {status}): {excerpt}")]
    Unauthorized { status: u16, excerpt: String },

    /// Upstream rejected the payload
    #[error("bad request (status {status}): {excerpt}")]
    BadRequest { status: u16, excerpt: String },

    /// Any other non-success status
    #[error("upstream error (status {status}): {excerpt}")]
    Upstream { status: u16, excerpt: String },

    /// Success status without a usable image
    #[error("unexpected content: {0}")]
    UnexpectedContent(String),
}

impl AttemptFailure {
    /// Machine-readable failure kind for logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport_failure",
            Self::Timeout(_) => "timeout",
            Self::RateLimited { .. } => "rate_limited",
            Self::Unauthorized { .. } => "auth_error",
            Self::BadRequest { .. } => "bad_request",
            Self::Upstream { .. } => "upstream_error",
            Self::UnexpectedContent(_) => "unexpected_content",
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(error: StickerError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_method_body() {
        let (status, body) = body_json(StickerError::InvalidMethod).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, serde_json::json!({ "error": "Method not allowed" }));
    }

    #[tokio::test]
    async fn validation_error_body_carries_reason() {
        let (status, body) = body_json(InvalidInput::PromptTooLong { max: 500 }.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Prompt must be at most 500 characters");
    }

    #[tokio::test]
    async fn internal_fault_body_has_details() {
        let (status, body) = body_json(StickerError::Internal("no generation attempts configured".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Sticker generation failed");
        assert_eq!(body["details"], "no generation attempts configured");
    }

    #[test]
    fn timeout_message_in_millis() {
        let failure = AttemptFailure::Timeout(Duration::from_millis(1500));
        assert_eq!(failure.to_string(), "timed out after 1500ms");
        assert_eq!(failure.kind(), "timeout");
    }
}
