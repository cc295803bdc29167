use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeId {
    /// Die-cut along the subject's silhouette. Adds no shape instruction.
    #[default]
    Contour,
    Circle,
    Square,
    Shield,
    Hexagon,
    Stamp,
}

impl ShapeId {
    pub const ALL: [ShapeId; 6] = [
        ShapeId::Contour,
        ShapeId::Circle,
        ShapeId::Square,
        ShapeId::Shield,
        ShapeId::Hexagon,
        ShapeId::Stamp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeId::Contour => "contour",
            ShapeId::Circle => "circle",
            ShapeId::Square => "square",
            ShapeId::Shield => "shield",
            ShapeId::Hexagon => "hexagon",
            ShapeId::Stamp => "stamp",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|shape| shape.as_str() == normalized)
    }

    pub fn shape(self) -> &'static StickerShape {
        SHAPES
            .iter()
            .find(|shape| shape.id == self)
            .unwrap_or(&SHAPES[0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickerShape {
    pub id: ShapeId,
    pub name: &'static str,
    pub prompt_instruction: &'static str,
    pub icon: &'static str,
}

pub static SHAPES: [StickerShape; 6] = [
    StickerShape {
        id: ShapeId::Contour,
        name: "✂️ Konturschnitt",
        prompt_instruction: "Die-cut sticker shape following the exact contour of the subject, white border around the silhouette.",
        icon: "✂️",
    },
    StickerShape {
        id: ShapeId::Circle,
        name: "⚪ Kreis / Rund",
        prompt_instruction: "Perfectly circular sticker shape, round badge format, content contained within a circle.",
        icon: "⚪",
    },
    StickerShape {
        id: ShapeId::Square,
        name: "⬜ Quadratisch",
        prompt_instruction: "Square sticker shape with slightly rounded corners, filling the entire square canvas.",
        icon: "⬜",
    },
    StickerShape {
        id: ShapeId::Shield,
        name: "🛡️ Wappen",
        prompt_instruction: "Heraldic shield shape sticker, classic football crest format, pointed bottom.",
        icon: "🛡️",
    },
    StickerShape {
        id: ShapeId::Hexagon,
        name: "⬡ Hexagon",
        prompt_instruction: "Hexagonal sticker shape, honeycomb geometry, modern six-sided format.",
        icon: "⬡",
    },
    StickerShape {
        id: ShapeId::Stamp,
        name: "🎫 Briefmarke",
        prompt_instruction: "Postage stamp shape with perforated edges, vintage stamp aesthetic.",
        icon: "🎫",
    },
];
