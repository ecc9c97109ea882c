use base64::Engine as _;

use crate::{
    attempt::ImagePayload,
    error::AttemptFailure,
    placeholder::{PLACEHOLDER_FORMAT, PLACEHOLDER_METHOD},
    types::{GenerationRequest, StickerResponse},
};

/// Result of walking the attempt list
#[derive(Debug)]
pub enum GenerationOutcome {
    /// An upstream produced an image
    Generated {
        image: ImagePayload,
        method: String,
        enhanced_prompt: Option<String>,
    },
    /// Every attempt failed
    Placeholder { svg: String, failures: Vec<AttemptReport> },
}

/// Failure of one named attempt
#[derive(Debug, Clone)]
pub struct AttemptReport {
    pub attempt: String,
    pub failure: AttemptFailure,
}

impl std::fmt::Display for AttemptReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.attempt, self.failure)
    }
}

impl GenerationOutcome {
    /// Shape the outcome into the response envelope
    pub fn into_response(self, request: &GenerationRequest, timestamp: String) -> StickerResponse {
        let (bytes, format, method, enhanced_prompt, is_placeholder, errors) = match self {
            Self::Generated {
                image,
                method,
                enhanced_prompt,
            } => (image.bytes, image.format, method, enhanced_prompt, false, Vec::new()),
            Self::Placeholder { svg, failures } => (
                svg.into_bytes(),
                PLACEHOLDER_FORMAT,
                PLACEHOLDER_METHOD.to_string(),
                None,
                true,
                failures.iter().map(ToString::to_string).collect(),
            ),
        };

        StickerResponse {
            success: true,
            image: base64::engine::general_purpose::STANDARD.encode(bytes),
            format: format.as_str(),
            width: request.dimensions.width,
            height: request.dimensions.height,
            method,
            is_placeholder,
            prompt: request.prompt.clone(),
            enhanced_prompt,
            style: request.style.map(|style| style.name()),
            quality: request.quality,
            seed: request.seed,
            timestamp,
            errors,
        }
    }
}
