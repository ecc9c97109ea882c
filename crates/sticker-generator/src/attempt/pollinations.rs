use http::Method;

use super::{Attempt, ImagePayload, UpstreamAuth, UpstreamRequest, UpstreamResponse, excerpt};
use crate::{error::AttemptFailure, format::ImageFormat, types::GenerationRequest};

pub(super) const DEFAULT_BASE_URL: &str = "https://image.pollinations.ai";
pub(super) const DEFAULT_MODEL: &str = "flux";

/// `GET {base}/prompt/{prompt}?model=..&width=..&height=..&nologo=true&private=true`
pub(super) fn build(attempt: &Attempt, request: &GenerationRequest, prompt: &str) -> UpstreamRequest {
    let mut url = attempt.endpoint(["prompt", prompt]);

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("model", &attempt.model)
            .append_pair("width", &request.dimensions.width.to_string())
            .append_pair("height", &request.dimensions.height.to_string())
            .append_pair("nologo", "true")
            .append_pair("private", "true");

        // The template already rewrites the prompt; keep the upstream from doing it again
        if attempt.enhance_prompt {
            query.append_pair("enhance", "false");
        }

        if let Some(seed) = request.seed {
            query.append_pair("seed", &seed.to_string());
        }
    }

    UpstreamRequest {
        method: Method::GET,
        url,
        auth: attempt.api_key.clone().map(UpstreamAuth::Bearer),
        body: None,
    }
}

/// Expects raw image bytes with an `image/*` content type
pub(super) fn parse(response: &UpstreamResponse) -> Result<ImagePayload, AttemptFailure> {
    let content_type = response.content_type.as_deref().unwrap_or_default();

    if !content_type.trim_start().to_ascii_lowercase().starts_with("image/") {
        return Err(AttemptFailure::UnexpectedContent(format!(
            "expected an image, got '{content_type}': {}",
            excerpt(&response.body)
        )));
    }

    Ok(ImagePayload {
        format: ImageFormat::detect(&response.body, Some(content_type)),
        bytes: response.body.to_vec(),
    })
}
