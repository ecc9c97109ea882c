use serde_json::{Map, Value};
use sticker_config::{GeneratorConfig, MAX_DIMENSION, MIN_DIMENSION};

use crate::{
    error::InvalidInput,
    style::StylePreset,
    types::{Dimensions, GenerationRequest, Quality},
};

/// Request limits derived from the generator configuration
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_prompt_length: usize,
    pub default_dimensions: Dimensions,
}

impl Limits {
    pub const fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            max_prompt_length: config.max_prompt_length,
            default_dimensions: Dimensions::new(config.default_width, config.default_height),
        }
    }
}

impl GenerationRequest {
    /// Validate a JSON request body
    ///
    /// Only the prompt is strictly checked. `size`, `seed`, `quality` and
    /// `style` fall back to defaults when missing or malformed.
    pub fn from_body(body: &Value, limits: &Limits) -> Result<Self, InvalidInput> {
        let fields = body.as_object().ok_or(InvalidInput::BodyNotObject)?;

        let prompt = validate_prompt(fields, limits.max_prompt_length)?;

        Ok(Self {
            prompt,
            seed: fields.get("seed").and_then(Value::as_u64),
            quality: fields
                .get("quality")
                .and_then(Value::as_str)
                .and_then(Quality::parse)
                .unwrap_or_default(),
            style: fields
                .get("style")
                .and_then(Value::as_str)
                .and_then(StylePreset::from_name),
            dimensions: fields
                .get("size")
                .and_then(parse_size)
                .unwrap_or(limits.default_dimensions),
        })
    }
}

fn validate_prompt(fields: &Map<String, Value>, max_len: usize) -> Result<String, InvalidInput> {
    let prompt = match fields.get("prompt") {
        None | Some(Value::Null) => return Err(InvalidInput::PromptMissing),
        Some(Value::String(prompt)) => prompt.trim(),
        Some(_) => return Err(InvalidInput::PromptNotString),
    };

    if prompt.is_empty() {
        return Err(InvalidInput::PromptEmpty);
    }

    if prompt.chars().count() > max_len {
        return Err(InvalidInput::PromptTooLong { max: max_len });
    }

    Ok(prompt.to_string())
}

/// Parse `"WxH"`, `"N"`, `N` or `{width, height}`
fn parse_size(value: &Value) -> Option<Dimensions> {
    let (width, height) = match value {
        Value::String(size) => {
            let size = size.trim();
            match size.split_once(['x', 'X']) {
                Some((width, height)) => (width.trim().parse().ok()?, height.trim().parse().ok()?),
                None => {
                    let side = size.parse().ok()?;
                    (side, side)
                }
            }
        }
        Value::Number(side) => {
            let side = side.as_u64()?;
            (side, side)
        }
        Value::Object(size) => (size.get("width")?.as_u64()?, size.get("height")?.as_u64()?),
        _ => return None,
    };

    Some(Dimensions::new(dimension(width)?, dimension(height)?))
}

fn dimension(value: u64) -> Option<u32> {
    u32::try_from(value)
        .ok()
        .filter(|side| (MIN_DIMENSION..=MAX_DIMENSION).contains(side))
}
