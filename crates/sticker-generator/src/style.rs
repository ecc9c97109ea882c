use crate::types::StyleInfo;

/// Named sticker style, expanded into a descriptive sentence when the
/// prompt is enhanced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylePreset {
    Classic,
    Minimalist,
    Psychedelic,
    StreetArt,
    Botanical,
    Neon,
    Cartoon,
    Mandala,
}

impl StylePreset {
    pub const ALL: [Self; 8] = [
        Self::Classic,
        Self::Minimalist,
        Self::Psychedelic,
        Self::StreetArt,
        Self::Botanical,
        Self::Neon,
        Self::Cartoon,
        Self::Mandala,
    ];

    /// Look up a preset by name; `-` and `_` are interchangeable and case
    /// is ignored
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|style| style.name() == normalized)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Minimalist => "minimalist",
            Self::Psychedelic => "psychedelic",
            Self::StreetArt => "street_art",
            Self::Botanical => "botanical",
            Self::Neon => "neon",
            Self::Cartoon => "cartoon",
            Self::Mandala => "mandala",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Classic => {
                "Use a vintage 70s aesthetic with bold colors, retro typography, clean lines and high contrast."
            }
            Self::Minimalist => {
                "Keep it minimalist with simple geometric lines, a monochromatic palette and modern typography."
            }
            Self::Psychedelic => {
                "Make it psychedelic with vibrant rainbow colors, swirling patterns and groovy 60s-inspired elements."
            }
            Self::StreetArt => {
                "Give it a street art look with graffiti-inspired elements, urban colors, bold outlines and edgy lettering."
            }
            Self::Botanical => {
                "Draw it as a vintage botanical illustration with detailed linework, natural tones and neat labeling."
            }
            Self::Neon => {
                "Use a cyberpunk neon style with glowing colors, circuit patterns and a dark background with bright highlights."
            }
            Self::Cartoon => {
                "Draw it as a friendly cartoon character with bright colors and a playful, family-friendly design."
            }
            Self::Mandala => {
                "Arrange it as an intricate mandala with sacred geometry, symmetric patterns and peaceful colors."
            }
        }
    }

    /// All presets in listing order
    pub fn catalog() -> Vec<StyleInfo> {
        Self::ALL
            .into_iter()
            .map(|style| StyleInfo {
                name: style.name(),
                description: style.description(),
            })
            .collect()
    }
}
