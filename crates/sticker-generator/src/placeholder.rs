use crate::{format::ImageFormat, types::Dimensions};

/// Method name reported for fallback images
pub const PLACEHOLDER_METHOD: &str = "placeholder";

/// Format of the fallback image
pub const PLACEHOLDER_FORMAT: ImageFormat = ImageFormat::Svg;

/// Prompt characters embedded in the fallback image
const PROMPT_PREVIEW_CHARS: usize = 40;

/// Render the fallback sticker as SVG
///
/// Output depends only on the prompt and dimensions.
pub fn render(prompt: &str, dimensions: Dimensions) -> String {
    let Dimensions { width, height } = dimensions;
    let short_side = width.min(height);
    let inset = short_side / 32;
    let radius = short_side / 8;
    let title_size = (short_side / 12).max(8);
    let caption_size = (short_side / 24).max(6);

    format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"##,
            r##"<rect x="{i}" y="{i}" width="{rw}" height="{rh}" rx="{r}" fill="#f4f4f5" stroke="#a1a1aa" stroke-width="{sw}" stroke-dasharray="12 8"/>"##,
            r##"<text x="50%" y="45%" text-anchor="middle" font-family="sans-serif" font-size="{ts}" fill="#52525b">Sticker unavailable</text>"##,
            r##"<text x="50%" y="58%" text-anchor="middle" font-family="sans-serif" font-size="{cs}" fill="#71717a">{caption}</text>"##,
            "</svg>",
        ),
        w = width,
        h = height,
        i = inset,
        rw = width - 2 * inset,
        rh = height - 2 * inset,
        r = radius,
        sw = (short_side / 128).max(1),
        ts = title_size,
        cs = caption_size,
        caption = escape_xml(&preview(prompt)),
    )
}

fn preview(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(PROMPT_PREVIEW_CHARS).collect();

    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if c.is_control() => escaped.push(' '),
            c => escaped.push(c),
        }
    }

    escaped
}
