mod gemini;
mod openai;
mod pollinations;

use std::time::Duration;

use axum::body::Bytes;
use http::{Method, StatusCode};
use secrecy::SecretString;
use sticker_config::{AttemptConfig, AttemptType};
use url::Url;

use crate::{
    error::{AttemptFailure, StickerError},
    format::ImageFormat,
    types::GenerationRequest,
};

/// Longest body excerpt kept in failure reports
const EXCERPT_CHARS: usize = 200;

/// One configured way of asking an upstream for an image
///
/// Building the request and parsing the response are pure functions of
/// their inputs; the network call lives in [`Server`](crate::Server).
#[derive(Debug, Clone)]
pub struct Attempt {
    name: String,
    kind: AttemptType,
    base_url: Url,
    model: String,
    api_key: Option<SecretString>,
    enhance_prompt: bool,
}

/// Outbound request produced by an attempt
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub auth: Option<UpstreamAuth>,
    pub body: Option<serde_json::Value>,
}

/// How the API key is presented upstream
#[derive(Debug, Clone)]
pub enum UpstreamAuth {
    /// `Authorization: Bearer <key>`
    Bearer(SecretString),
    /// `x-goog-api-key: <key>`
    GoogApiKey(SecretString),
}

/// Fully read upstream response
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub retry_after: Option<Duration>,
    pub body: Bytes,
}

/// Decoded image returned by a successful attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl Attempt {
    /// Build an attempt from configuration
    pub fn from_config(name: &str, config: &AttemptConfig) -> Result<Self, StickerError> {
        let base_url = match config.base_url {
            Some(ref url) => url.clone(),
            None => default_base_url(config.attempt_type)?,
        };

        if base_url.cannot_be_a_base() {
            return Err(StickerError::Config(format!(
                "base URL for attempt '{name}' cannot carry a path: {base_url}"
            )));
        }

        if config.attempt_type.requires_api_key() && config.api_key.is_none() {
            return Err(StickerError::Config(format!("API key required for attempt '{name}'")));
        }

        Ok(Self {
            name: name.to_string(),
            kind: config.attempt_type,
            base_url,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| default_model(config.attempt_type).to_string()),
            api_key: config.api_key.clone(),
            enhance_prompt: config.enhance_prompt,
        })
    }

    /// Attempt name, reported as the response `method`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prompt text sent upstream, enhanced when this attempt asks for it
    pub fn prompt_for(&self, request: &GenerationRequest) -> String {
        if self.enhance_prompt {
            request.enhanced_prompt()
        } else {
            request.prompt.clone()
        }
    }

    /// Whether [`Attempt::prompt_for`] rewrites the prompt
    pub const fn enhances_prompt(&self) -> bool {
        self.enhance_prompt
    }

    /// Build the upstream request for a validated generation request
    pub fn build_request(&self, request: &GenerationRequest) -> UpstreamRequest {
        let prompt = self.prompt_for(request);

        match self.kind {
            AttemptType::Pollinations => pollinations::build(self, request, &prompt),
            AttemptType::Openai => openai::build(self, request, &prompt),
            AttemptType::Gemini => gemini::build(self, &prompt),
        }
    }

    /// Classify an upstream response and extract the image
    pub fn parse_response(&self, response: &UpstreamResponse) -> Result<ImagePayload, AttemptFailure> {
        check_status(response)?;

        if response.body.is_empty() {
            return Err(AttemptFailure::UnexpectedContent("empty response body".to_string()));
        }

        match self.kind {
            AttemptType::Pollinations => pollinations::parse(response),
            AttemptType::Openai => openai::parse(response),
            AttemptType::Gemini => gemini::parse(response),
        }
    }

    /// Base URL with extra path segments appended
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();

        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url
    }
}

/// Map a non-success status to its failure kind
fn check_status(response: &UpstreamResponse) -> Result<(), AttemptFailure> {
    let status = response.status;

    if status.is_success() {
        return Ok(());
    }

    let code = status.as_u16();
    let excerpt = excerpt(&response.body);

    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => AttemptFailure::RateLimited {
            retry_after: response.retry_after,
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AttemptFailure::Unauthorized { status: code, excerpt },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            AttemptFailure::BadRequest { status: code, excerpt }
        }
        _ => AttemptFailure::Upstream { status: code, excerpt },
    })
}

/// Short single-line preview of a response body
pub(crate) fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut chars = collapsed.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();

    if chars.next().is_some() { format!("{head}…") } else { head }
}

/// Decode a base64 image field and detect its format
fn decode_base64_image(data: &str, declared_mime: Option<&str>) -> Result<ImagePayload, AttemptFailure> {
    use base64::Engine as _;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| AttemptFailure::UnexpectedContent(format!("invalid base64 image data: {e}")))?;

    if bytes.is_empty() {
        return Err(AttemptFailure::UnexpectedContent("empty image data".to_string()));
    }

    let format = ImageFormat::detect(&bytes, declared_mime);
    Ok(ImagePayload { bytes, format })
}

fn default_base_url(kind: AttemptType) -> Result<Url, StickerError> {
    let url = match kind {
        AttemptType::Pollinations => pollinations::DEFAULT_BASE_URL,
        AttemptType::Openai => openai::DEFAULT_BASE_URL,
        AttemptType::Gemini => gemini::DEFAULT_BASE_URL,
    };

    Url::parse(url).map_err(|e| StickerError::Config(format!("invalid default base URL {url}: {e}")))
}

const fn default_model(kind: AttemptType) -> &'static str {
    match kind {
        AttemptType::Pollinations => pollinations::DEFAULT_MODEL,
        AttemptType::Openai => openai::DEFAULT_MODEL,
        AttemptType::Gemini => gemini::DEFAULT_MODEL,
    }
}
