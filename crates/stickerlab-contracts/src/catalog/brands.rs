use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrandId {
    RedDevils,
    Hoodplaka,
    #[serde(rename = "JJ674")]
    Jj674,
    Palzflow,
    Custom,
}

impl BrandId {
    pub const ALL: [BrandId; 5] = [
        BrandId::RedDevils,
        BrandId::Hoodplaka,
        BrandId::Jj674,
        BrandId::Palzflow,
        BrandId::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BrandId::RedDevils => "RED_DEVILS",
            BrandId::Hoodplaka => "HOODPLAKA",
            BrandId::Jj674 => "JJ674",
            BrandId::Palzflow => "PALZFLOW",
            BrandId::Custom => "CUSTOM",
        }
    }

    /// Accepts the stored id (`RED_DEVILS`) as well as CLI spellings like
    /// `red-devils`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|brand| brand.as_str() == normalized)
    }

    pub fn profile(self) -> &'static BrandProfile {
        BRANDS
            .iter()
            .find(|profile| profile.id == self)
            .unwrap_or(&BRANDS[0])
    }
}

impl std::fmt::Display for BrandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrandProfile {
    pub id: BrandId,
    pub name: &'static str,
    pub description: &'static str,
    pub colors: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub icon: &'static str,
}

pub static BRANDS: [BrandProfile; 5] = [
    BrandProfile {
        id: BrandId::RedDevils,
        name: "Red Devils Division",
        description: "Fussball, Leidenschaft, Ultras, Aggressiv & Stolz.",
        colors: &["#EF4444", "#000000", "#FFFFFF"],
        keywords: &[
            "Official 1. FC Kaiserslautern crest",
            "Red round shield with white circle",
            "Text '1. FCK' inside logo",
            "Red Devil mascot face",
            "Betzenberg Stadium aesthetics",
            "Kaiserslautern Ultra visuals",
            "Rot-Teufel aesthetics",
        ],
        icon: "Flame",
    },
    BrandProfile {
        id: BrandId::Hoodplaka,
        name: "Hoodplaka67",
        description: "Der Shop. Streetwear, Urban, Beton & Style.",
        colors: &["#F59E0B", "#1F2937"],
        keywords: &[
            "Hoodplaka67 official logo typography",
            "urban streetwear brand identity",
            "graffiti tag 67",
            "concrete grey and warning orange",
            "modern hypebeast fashion aesthetic",
            "sticker bombing culture",
        ],
        icon: "ShoppingBag",
    },
    BrandProfile {
        id: BrandId::Jj674,
        name: "JJ674 (Künstler)",
        description: "Künstlerisch, Abstrakt, Einzigartig.",
        colors: &["#8B5CF6", "#EC4899"],
        keywords: &[
            "JJ674 artist signature",
            "abstract expressionism style",
            "vibrant purple and pink splashes",
            "creative paint texture",
            "surreal artistic composition",
            "hand-drawn sketch elements",
        ],
        icon: "Palette",
    },
    BrandProfile {
        id: BrandId::Palzflow,
        name: "PalzFlow",
        description: "Flow, Dynamik, Musik & Bewegung.",
        colors: &["#06B6D4", "#3B82F6"],
        keywords: &[
            "PalzFlow official music logo",
            "dynamic sound waves visualization",
            "liquid blue aesthetic",
            "hip hop and rap culture visuals",
            "microphone and flow energy",
            "cool cyan tones",
        ],
        icon: "Mic2",
    },
    BrandProfile {
        id: BrandId::Custom,
        name: "Freestyle",
        description: "Kein Limit. Dein eigenes Ding.",
        colors: &["#ffffff", "#666666"],
        keywords: &[],
        icon: "Star",
    },
];
