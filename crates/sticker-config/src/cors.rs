use serde::Deserialize;

/// Cross-origin settings for the sticker endpoint
///
/// Methods and headers are fixed by the endpoint contract (`POST, OPTIONS`
/// and `Content-Type`); only the allowed origin is configurable.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Origin` ("*" or a single origin)
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
        }
    }
}

fn default_allow_origin() -> String {
    "*".to_string()
}
