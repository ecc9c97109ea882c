use http::Method;
use serde::Deserialize;

use super::{Attempt, ImagePayload, UpstreamAuth, UpstreamRequest, UpstreamResponse, decode_base64_image, excerpt};
use crate::error::AttemptFailure;

pub(super) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub(super) const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

/// `POST {base}/models/{model}:generateContent` with image and text modalities
pub(super) fn build(attempt: &Attempt, prompt: &str) -> UpstreamRequest {
    let method_segment = format!("{}:generateContent", attempt.model);

    let body = serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }],
        }],
        "generationConfig": {
            "responseModalities": ["IMAGE", "TEXT"],
        },
    });

    UpstreamRequest {
        method: Method::POST,
        url: attempt.endpoint(["models", method_segment.as_str()]),
        auth: attempt.api_key.clone().map(UpstreamAuth::GoogApiKey),
        body: Some(body),
    }
}

/// First `inlineData` part across candidates; text parts are only logged
pub(super) fn parse(response: &UpstreamResponse) -> Result<ImagePayload, AttemptFailure> {
    let wire_response: GenerateContentResponse = serde_json::from_slice(&response.body).map_err(|e| {
        AttemptFailure::UnexpectedContent(format!("invalid generateContent response ({e}): {}", excerpt(&response.body)))
    })?;

    let parts = wire_response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts);

    let mut commentary = Vec::new();

    for part in parts {
        if let Some(inline) = part.inline_data {
            return decode_base64_image(&inline.data, inline.mime_type.as_deref());
        }

        if let Some(text) = part.text {
            tracing::debug!(text = %excerpt(text.as_bytes()), "gemini returned text part");
            commentary.push(text);
        }
    }

    let reason = if commentary.is_empty() {
        "no inline image data in response".to_string()
    } else {
        format!("no inline image data, model said: {}", excerpt(commentary.join(" ").as_bytes()))
    };

    Err(AttemptFailure::UnexpectedContent(reason))
}
