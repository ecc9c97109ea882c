use serde::Serialize;

use crate::style::StylePreset;

/// Validated sticker generation request
///
/// Built by [`GenerationRequest::from_body`](crate::GenerationRequest::from_body);
/// optional hints are already coerced to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Trimmed prompt text
    pub prompt: String,
    /// Seed forwarded to upstreams that accept one
    pub seed: Option<u64>,
    /// Requested rendering quality
    pub quality: Quality,
    /// Sticker style preset
    pub style: Option<StylePreset>,
    /// Output dimensions
    pub dimensions: Dimensions,
}

impl GenerationRequest {
    /// Request for a prompt with every optional hint at its default
    pub fn new(prompt: impl Into<String>, dimensions: Dimensions) -> Self {
        Self {
            prompt: prompt.into(),
            seed: None,
            quality: Quality::Standard,
            style: None,
            dimensions,
        }
    }

    /// Prompt wrapped in the sticker template
    ///
    /// Pure function of the request: the same input always produces the
    /// same text.
    pub fn enhanced_prompt(&self) -> String {
        let style = self
            .style
            .map(|style| format!("{} ", style.description()))
            .unwrap_or_default();

        format!(
            "Create a sticker design: {}. {style}{}The design should be suitable for printing as a sticker with clear borders and vibrant colors.",
            self.prompt,
            self.quality.descriptor(),
        )
    }
}

/// Sticker width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Rendering quality hint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Standard,
    Hd,
}

impl Quality {
    /// Parse a quality hint, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "hd" => Some(Self::Hd),
            _ => None,
        }
    }

    /// Wire value used by upstream APIs
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Hd => "hd",
        }
    }

    /// Sentence appended to enhanced prompts, with trailing space
    const fn descriptor(self) -> &'static str {
        match self {
            Self::Standard => "",
            Self::Hd => "Render it in high detail with crisp edges. ",
        }
    }
}

/// Successful response envelope, also used for the placeholder
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerResponse {
    pub success: bool,
    /// Base64-encoded image bytes
    pub image: String,
    /// Image format (`png`, `jpeg`, `webp`, `gif`, `svg+xml`)
    pub format: &'static str,
    pub width: u32,
    pub height: u32,
    /// Name of the attempt that produced the image, or `placeholder`
    pub method: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_placeholder: bool,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<&'static str>,
    pub quality: Quality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// RFC 3339 generation time
    pub timestamp: String,
    /// One line per failed attempt, only on placeholder responses
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Entry in the style listing
#[derive(Debug, Clone, Serialize)]
pub struct StyleInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// Response for the style listing endpoint
#[derive(Debug, Clone, Serialize)]
pub struct StylesResponse {
    pub styles: Vec<StyleInfo>,
}
