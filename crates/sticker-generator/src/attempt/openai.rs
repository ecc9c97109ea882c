use http::Method;
use serde::Deserialize;

use super::{Attempt, ImagePayload, UpstreamAuth, UpstreamRequest, UpstreamResponse, decode_base64_image, excerpt};
use crate::{error::AttemptFailure, types::GenerationRequest};

pub(super) const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub(super) const DEFAULT_MODEL: &str = "dall-e-3";

/// Wire format for the `OpenAI` image generation API response
#[derive(Deserialize)]
struct OpenAiImageResponse {
    #[serde(default)]
    data: Vec<OpenAiImageData>,
}

#[derive(Deserialize)]
struct OpenAiImageData {
    b64_json: Option<String>,
}

/// `POST {base}/images/generations` asking for `b64_json`
pub(super) fn build(attempt: &Attempt, request: &GenerationRequest, prompt: &str) -> UpstreamRequest {
    let body = serde_json::json!({
        "model": attempt.model,
        "prompt": prompt,
        "n": 1,
        "size": request.dimensions.to_string(),
        "quality": request.quality.as_str(),
        "response_format": "b64_json",
    });

    UpstreamRequest {
        method: Method::POST,
        url: attempt.endpoint(["images", "generations"]),
        auth: attempt.api_key.clone().map(UpstreamAuth::Bearer),
        body: Some(body),
    }
}

/// Image at `data[0].b64_json`
pub(super) fn parse(response: &UpstreamResponse) -> Result<ImagePayload, AttemptFailure> {
    let wire_response: OpenAiImageResponse = serde_json::from_slice(&response.body).map_err(|e| {
        AttemptFailure::UnexpectedContent(format!("invalid image envelope ({e}): {}", excerpt(&response.body)))
    })?;

    let data = wire_response
        .data
        .into_iter()
        .find_map(|d| d.b64_json)
        .ok_or_else(|| AttemptFailure::UnexpectedContent("no b64_json image in response".to_string()))?;

    decode_base64_image(&data, None)
}
