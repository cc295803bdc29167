use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleId {
    #[default]
    #[serde(rename = "vector")]
    Vector,
    #[serde(rename = "badge")]
    Badge,
    #[serde(rename = "graffiti")]
    Graffiti,
    #[serde(rename = "3d-render")]
    Render3d,
    #[serde(rename = "holographic")]
    Holographic,
    #[serde(rename = "cyberpunk")]
    Cyberpunk,
    #[serde(rename = "y2k")]
    Y2k,
    #[serde(rename = "sketch")]
    Sketch,
    #[serde(rename = "watercolor")]
    Watercolor,
    #[serde(rename = "oil-painting")]
    OilPainting,
    #[serde(rename = "pop-art")]
    PopArt,
    #[serde(rename = "pixel")]
    Pixel,
    #[serde(rename = "tattoo-trad")]
    TattooTrad,
    #[serde(rename = "stencil")]
    Stencil,
    #[serde(rename = "grunge")]
    Grunge,
    #[serde(rename = "horror")]
    Horror,
    #[serde(rename = "embroidery")]
    Embroidery,
    #[serde(rename = "gold-foil")]
    GoldFoil,
    #[serde(rename = "vintage-worn")]
    VintageWorn,
    #[serde(rename = "neon-sign")]
    NeonSign,
    #[serde(rename = "low-poly")]
    LowPoly,
    #[serde(rename = "psychedelic")]
    Psychedelic,
    #[serde(rename = "paper-cut")]
    PaperCut,
    #[serde(rename = "blueprint")]
    Blueprint,
    #[serde(rename = "kawaii")]
    Kawaii,
    #[serde(rename = "black-metal")]
    BlackMetal,
    #[serde(rename = "synthwave")]
    Synthwave,
    #[serde(rename = "collage")]
    Collage,
    #[serde(rename = "woodblock")]
    Woodblock,
    #[serde(rename = "clay")]
    Clay,
}

impl StyleId {
    pub const ALL: [StyleId; 30] = [
        StyleId::Vector,
        StyleId::Badge,
        StyleId::Graffiti,
        StyleId::Render3d,
        StyleId::Holographic,
        StyleId::Cyberpunk,
        StyleId::Y2k,
        StyleId::Sketch,
        StyleId::Watercolor,
        StyleId::OilPainting,
        StyleId::PopArt,
        StyleId::Pixel,
        StyleId::TattooTrad,
        StyleId::Stencil,
        StyleId::Grunge,
        StyleId::Horror,
        StyleId::Embroidery,
        StyleId::GoldFoil,
        StyleId::VintageWorn,
        StyleId::NeonSign,
        StyleId::LowPoly,
        StyleId::Psychedelic,
        StyleId::PaperCut,
        StyleId::Blueprint,
        StyleId::Kawaii,
        StyleId::BlackMetal,
        StyleId::Synthwave,
        StyleId::Collage,
        StyleId::Woodblock,
        StyleId::Clay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleId::Vector => "vector",
            StyleId::Badge => "badge",
            StyleId::Graffiti => "graffiti",
            StyleId::Render3d => "3d-render",
            StyleId::Holographic => "holographic",
            StyleId::Cyberpunk => "cyberpunk",
            StyleId::Y2k => "y2k",
            StyleId::Sketch => "sketch",
            StyleId::Watercolor => "watercolor",
            StyleId::OilPainting => "oil-painting",
            StyleId::PopArt => "pop-art",
            StyleId::Pixel => "pixel",
            StyleId::TattooTrad => "tattoo-trad",
            StyleId::Stencil => "stencil",
            StyleId::Grunge => "grunge",
            StyleId::Horror => "horror",
            StyleId::Embroidery => "embroidery",
            StyleId::GoldFoil => "gold-foil",
            StyleId::VintageWorn => "vintage-worn",
            StyleId::NeonSign => "neon-sign",
            StyleId::LowPoly => "low-poly",
            StyleId::Psychedelic => "psychedelic",
            StyleId::PaperCut => "paper-cut",
            StyleId::Blueprint => "blueprint",
            StyleId::Kawaii => "kawaii",
            StyleId::BlackMetal => "black-metal",
            StyleId::Synthwave => "synthwave",
            StyleId::Collage => "collage",
            StyleId::Woodblock => "woodblock",
            StyleId::Clay => "clay",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == normalized)
    }

    pub fn style(self) -> &'static StickerStyle {
        STYLES
            .iter()
            .find(|style| style.id == self)
            .unwrap_or(&STYLES[0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickerStyle {
    pub id: StyleId,
    pub name: &'static str,
    pub prompt_modifier: &'static str,
}

pub static STYLES: [StickerStyle; 30] = [
    StickerStyle {
        id: StyleId::Vector,
        name: "Vektor Clean",
        prompt_modifier: "clean vector art, thick white border, flat colors, minimalist vector graphics, professional adobe illustrator style",
    },
    StickerStyle {
        id: StyleId::Badge,
        name: "Wappen / Badge",
        prompt_modifier: "circular badge logo, embroidery patch style, tactical emblem, shield shape, high detail, official team crest aesthetic",
    },
    StickerStyle {
        id: StyleId::Graffiti,
        name: "Street Graffiti",
        prompt_modifier: "urban graffiti style, spray paint texture, wildstyle lettering, street art sticker, vibrant colors, with drip effects",
    },
    StickerStyle {
        id: StyleId::Render3d,
        name: "3D Glossy",
        prompt_modifier: "3d blender render, glossy plastic material, cute toy aesthetic, isometric view, soft studio lighting, c4d style",
    },
    StickerStyle {
        id: StyleId::Holographic,
        name: "Holografisch",
        prompt_modifier: "holographic sticker effect, iridescent colors, shiny metallic finish, prism texture, vaporwave aesthetic",
    },
    StickerStyle {
        id: StyleId::Cyberpunk,
        name: "Cyberpunk Neon",
        prompt_modifier: "cyberpunk aesthetic, glowing neon lines, dark futuristic background, glitch effect, high tech ui elements",
    },
    StickerStyle {
        id: StyleId::Y2k,
        name: "Y2K Ästhetik",
        prompt_modifier: "Y2K aesthetic, year 2000 style, chrome liquid shapes, tribal tattoos, futuristic blobs, metallic silver and acid green",
    },
    StickerStyle {
        id: StyleId::Sketch,
        name: "Bleistift Skizze",
        prompt_modifier: "hand-drawn pencil sketch, rough graphite lines, artistic shading, sketchbook style, white border",
    },
    StickerStyle {
        id: StyleId::Watercolor,
        name: "Aquarell",
        prompt_modifier: "watercolor painting style, soft paint splashes, artistic dripping, pastel colors on white paper texture",
    },
    StickerStyle {
        id: StyleId::OilPainting,
        name: "Ölgemälde",
        prompt_modifier: "impasto oil painting style, thick visible brushstrokes, rich textures, classical art vibe",
    },
    StickerStyle {
        id: StyleId::PopArt,
        name: "Pop Art Comic",
        prompt_modifier: "pop art comic style, roy lichtenstein aesthetics, halftone dots, bold black outlines, vibrant primary colors, pow bang boom style",
    },
    StickerStyle {
        id: StyleId::Pixel,
        name: "Pixel Art",
        prompt_modifier: "8-bit pixel art, retro video game sprite, limited color palette, blocky design, arcade aesthetic",
    },
    StickerStyle {
        id: StyleId::TattooTrad,
        name: "Tattoo Old School",
        prompt_modifier: "american traditional tattoo flash, bold black outlines, limited color palette (red, yellow, green, black), vintage sailor jerry style",
    },
    StickerStyle {
        id: StyleId::Stencil,
        name: "Banksy Stencil",
        prompt_modifier: "stencil art style, banksy aesthetic, black spray paint on white, high contrast, political street art vibe",
    },
    StickerStyle {
        id: StyleId::Grunge,
        name: "Dark Grunge",
        prompt_modifier: "dark grunge aesthetic, distressed textures, scratched metal, horror punk vibe, gloomy atmosphere",
    },
    StickerStyle {
        id: StyleId::Horror,
        name: "Horror / Zombie",
        prompt_modifier: "horror style, zombie aesthetic, dripping slime, scary details, undead monster, spooky halloween vibe",
    },
    StickerStyle {
        id: StyleId::Embroidery,
        name: "Gestickt / Patch",
        prompt_modifier: "embroidered patch texture, visible thread stitches, fabric texture, tactical velcro patch look",
    },
    StickerStyle {
        id: StyleId::GoldFoil,
        name: "Goldfolie Luxus",
        prompt_modifier: "gold foil sticker, shiny metallic gold texture, luxury branding, premium black and gold contrast, elegant serif fonts",
    },
    StickerStyle {
        id: StyleId::VintageWorn,
        name: "Retro Abgenutzt",
        prompt_modifier: "vintage retro sticker, distressed texture, worn out look, faded colors, 70s advertising style, grunge edges",
    },
    StickerStyle {
        id: StyleId::NeonSign,
        name: "Leuchtreklame",
        prompt_modifier: "neon sign aesthetic, glowing glass tubes, night club vibe, brick wall background (isolated), electric colors",
    },
    StickerStyle {
        id: StyleId::LowPoly,
        name: "Low Poly",
        prompt_modifier: "low poly art, geometric shapes, angular polygons, minimalist 3d style, crystalline structure",
    },
    StickerStyle {
        id: StyleId::Psychedelic,
        name: "Psychedelisch",
        prompt_modifier: "psychedelic art, trippy swirling colors, optical illusions, 60s hippie poster style, vibrant acid colors",
    },
    StickerStyle {
        id: StyleId::PaperCut,
        name: "Papierkunst",
        prompt_modifier: "layered paper cutout art, paper craft style, subtle shadows between layers, craft aesthetic",
    },
    StickerStyle {
        id: StyleId::Blueprint,
        name: "Blaupause",
        prompt_modifier: "technical blueprint style, white lines on blue background, architectural drawing, schematic details",
    },
    StickerStyle {
        id: StyleId::Kawaii,
        name: "Kawaii Cute",
        prompt_modifier: "kawaii aesthetic, japanese cute mascot style, big eyes, pastel colors, bubbly round shapes, adorable die-cut sticker",
    },
    StickerStyle {
        id: StyleId::BlackMetal,
        name: "Black Metal",
        prompt_modifier: "black metal logo style, illegible spiky typography, roots and branches texture, dark satanic aesthetic, monochromatic black and white",
    },
    StickerStyle {
        id: StyleId::Synthwave,
        name: "Synthwave 80s",
        prompt_modifier: "synthwave 80s aesthetic, retro sunset, grid landscape, chrome typography, purple and teal colors, outrun style",
    },
    StickerStyle {
        id: StyleId::Collage,
        name: "Collage Mix",
        prompt_modifier: "mixed media collage, ransom note letters, ripped paper textures, chaotic composition, punk rock fanzine style",
    },
    StickerStyle {
        id: StyleId::Woodblock,
        name: "Holzschnitt",
        prompt_modifier: "woodblock print style, linocut, rough carving textures, bold black ink, folk art aesthetic",
    },
    StickerStyle {
        id: StyleId::Clay,
        name: "Knete / Clay",
        prompt_modifier: "plasticine claymation style, wallace and gromit aesthetic, fingerprint textures, stop motion look, soft lighting",
    },
];
