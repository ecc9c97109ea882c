use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Smallest accepted sticker side in pixels
pub const MIN_DIMENSION: u32 = 64;

/// Largest accepted sticker side in pixels
pub const MAX_DIMENSION: u32 = 2048;

/// Sticker generation configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Longest accepted prompt, counted in characters after trimming
    #[serde(default = "default_max_prompt_length")]
    pub max_prompt_length: usize,
    /// Ceiling for a single outbound call, including the response body
    #[serde(
        default = "default_timeout",
        deserialize_with = "duration_str::deserialize_duration"
    )]
    pub timeout: Duration,
    /// Upper bound on a `Retry-After` hint honoured before the single retry
    #[serde(
        default = "default_max_retry_delay",
        deserialize_with = "duration_str::deserialize_duration"
    )]
    pub max_retry_delay: Duration,
    /// Largest random jitter added to a rate-limit wait
    #[serde(
        default = "default_retry_jitter",
        deserialize_with = "duration_str::deserialize_duration"
    )]
    pub retry_jitter: Duration,
    /// Width used when the request carries no usable size
    #[serde(default = "default_dimension")]
    pub default_width: u32,
    /// Height used when the request carries no usable size
    #[serde(default = "default_dimension")]
    pub default_height: u32,
    /// Upstream attempts, tried in declaration order
    #[serde(default)]
    pub attempts: IndexMap<String, AttemptConfig>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_prompt_length: default_max_prompt_length(),
            timeout: default_timeout(),
            max_retry_delay: default_max_retry_delay(),
            retry_jitter: default_retry_jitter(),
            default_width: default_dimension(),
            default_height: default_dimension(),
            attempts: IndexMap::new(),
        }
    }
}

/// Configuration for a single upstream attempt
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttemptConfig {
    /// Upstream API shape
    #[serde(rename = "type")]
    pub attempt_type: AttemptType,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model identifier override
    #[serde(default)]
    pub model: Option<String>,
    /// API key
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Wrap the prompt in the sticker enhancement template
    #[serde(default = "default_enhance_prompt")]
    pub enhance_prompt: bool,
}

impl AttemptConfig {
    /// Minimal attempt of the given type with all defaults
    pub const fn new(attempt_type: AttemptType) -> Self {
        Self {
            attempt_type,
            base_url: None,
            model: None,
            api_key: None,
            enhance_prompt: true,
        }
    }
}

/// Supported upstream API shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptType {
    /// Pollinations prompt URL returning raw image bytes
    Pollinations,
    /// `OpenAI` images API returning a base64 JSON envelope
    Openai,
    /// Gemini `generateContent` returning inline image data
    Gemini,
}

impl AttemptType {
    /// Whether an API key must be configured for this upstream
    pub const fn requires_api_key(self) -> bool {
        matches!(self, Self::Openai | Self::Gemini)
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_prompt_length() -> usize {
    500
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout() -> Duration {
    Duration::from_secs(25)
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_retry_delay() -> Duration {
    Duration::from_secs(10)
}

#[allow(clippy::missing_const_for_fn)]
fn default_retry_jitter() -> Duration {
    Duration::from_millis(250)
}

#[allow(clippy::missing_const_for_fn)]
fn default_dimension() -> u32 {
    512
}

#[allow(clippy::missing_const_for_fn)]
fn default_enhance_prompt() -> bool {
    true
}
