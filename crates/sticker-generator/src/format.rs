/// Image encodings the endpoint reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
    Gif,
    Svg,
}

impl ImageFormat {
    /// Detect the format from magic bytes, then the declared MIME type,
    /// falling back to PNG
    pub fn detect(bytes: &[u8], declared_mime: Option<&str>) -> Self {
        Self::sniff(bytes)
            .or_else(|| declared_mime.and_then(Self::from_mime))
            .unwrap_or_else(|| {
                tracing::debug!(
                    head = ?&bytes[..bytes.len().min(4)],
                    "unrecognized image format, assuming png"
                );
                Self::Png
            })
    }

    fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, 0x50, 0x4E, 0x47, ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some(Self::Webp),
            [0x47, 0x49, 0x46, 0x38, ..] => Some(Self::Gif),
            [b'<', b's', b'v', b'g', ..] | [b'<', b'?', b'x', b'm', b'l', ..] => Some(Self::Svg),
            _ => None,
        }
    }

    /// Map a MIME type such as `image/png; charset=binary` to a format
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

        match essence.as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            "image/svg+xml" => Some(Self::Svg),
            _ => None,
        }
    }

    /// Name reported in the response `format` field
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Svg => "svg+xml",
        }
    }
}
