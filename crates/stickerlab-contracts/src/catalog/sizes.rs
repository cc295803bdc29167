use serde::{Deserialize, Serialize};

use super::shapes::ShapeId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "3:4")]
    Portrait3x4,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait9x16,
        AspectRatio::Landscape16x9,
        AspectRatio::Landscape4x3,
        AspectRatio::Portrait3x4,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait3x4 => "3:4",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim();
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == normalized)
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical print format. `dim` is the human-readable label shown to the
/// user and is what the print-sheet packer parses into millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintSize {
    pub label: &'static str,
    pub dim: &'static str,
    pub ratio: AspectRatio,
    pub shape: Option<ShapeId>,
    pub prompt_add: Option<&'static str>,
}

pub const DEFAULT_PRINT_SIZE_LABEL: &str = "Quadrat";

pub static PRINT_SIZES: [PrintSize; 8] = [
    PrintSize {
        label: "DIN A4",
        dim: "21,0 x 29,7 cm",
        ratio: AspectRatio::Portrait3x4,
        shape: Some(ShapeId::Square),
        prompt_add: None,
    },
    PrintSize {
        label: "DIN A5",
        dim: "14,8 x 21,0 cm",
        ratio: AspectRatio::Portrait3x4,
        shape: Some(ShapeId::Square),
        prompt_add: None,
    },
    PrintSize {
        label: "DIN A6",
        dim: "10,5 x 14,8 cm",
        ratio: AspectRatio::Portrait3x4,
        shape: Some(ShapeId::Square),
        prompt_add: None,
    },
    PrintSize {
        label: "DIN A7",
        dim: "7,4 x 10,5 cm",
        ratio: AspectRatio::Portrait3x4,
        shape: Some(ShapeId::Square),
        prompt_add: None,
    },
    PrintSize {
        label: "Ultra Wide",
        dim: "20,0 x 5,0 cm",
        ratio: AspectRatio::Landscape16x9,
        shape: Some(ShapeId::Square),
        prompt_add: Some("wide rectangular format layout"),
    },
    PrintSize {
        label: "Quadrat",
        dim: "9,5 x 9,5 cm",
        ratio: AspectRatio::Square,
        shape: Some(ShapeId::Square),
        prompt_add: None,
    },
    PrintSize {
        label: "Kreis",
        dim: "⌀ 9,5 cm",
        ratio: AspectRatio::Square,
        shape: Some(ShapeId::Circle),
        prompt_add: None,
    },
    PrintSize {
        label: "Rechteck",
        dim: "7,0 x 5,0 cm",
        ratio: AspectRatio::Landscape4x3,
        shape: Some(ShapeId::Square),
        prompt_add: None,
    },
];

pub fn find_print_size(label: &str) -> Option<&'static PrintSize> {
    PRINT_SIZES.iter().find(|size| size.label == label)
}

/// Resolves a stored size label, falling back to the square entry when the
/// label is missing or unknown.
pub fn print_size_or_default(label: Option<&str>) -> &'static PrintSize {
    label
        .and_then(find_print_size)
        .unwrap_or_else(default_print_size)
}

pub fn default_print_size() -> &'static PrintSize {
    find_print_size(DEFAULT_PRINT_SIZE_LABEL).unwrap_or(&PRINT_SIZES[5])
}
