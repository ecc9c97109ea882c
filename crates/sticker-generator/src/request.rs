use axum::body::Body;
use serde_json::Value;

use crate::error::{InvalidInput, StickerError};

/// Body limit for sticker requests (1 MiB)
const BODY_LIMIT_BYTES: usize = 1 << 20;

/// Extractor for the raw JSON request body
///
/// Keeps the body as an untyped [`Value`] so prompt validation can tell a
/// missing prompt from one of the wrong type.
pub struct JsonBody(pub Value);

impl<S> axum::extract::FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = StickerError;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        let is_json = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_json_content_type);

        if !is_json {
            return Err(InvalidInput::ContentType.into());
        }

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                StickerError::PayloadTooLarge {
                    limit: BODY_LIMIT_BYTES,
                }
            } else {
                tracing::debug!(error = %err, "failed to read request body");
                InvalidInput::UnreadableBody.into()
            }
        })?;

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|_| InvalidInput::MalformedJson.into())
    }
}

/// `application/json`, optionally with parameters such as `charset`
fn is_json_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}
