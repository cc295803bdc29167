#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCategory {
    Ultras,
    Street,
    Art,
    Basic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickerTemplate {
    pub id: &'static str,
    pub label: &'static str,
    pub category: TemplateCategory,
    pub prompt_addition: &'static str,
    pub icon: &'static str,
}

impl StickerTemplate {
    /// Appends this template's snippet to `prompt`, comma-separated when the
    /// prompt already has content.
    pub fn append_to(&self, prompt: &str) -> String {
        let separator = if prompt.trim().is_empty() { "" } else { ", " };
        format!("{prompt}{separator}{}", self.prompt_addition)
    }
}

pub fn find_template(id: &str) -> Option<&'static StickerTemplate> {
    let normalized = id.trim().to_ascii_lowercase();
    TEMPLATES.iter().find(|template| template.id == normalized)
}

pub static TEMPLATES: [StickerTemplate; 15] = [
    StickerTemplate {
        id: "pyro",
        label: "Pyro Fackel",
        category: TemplateCategory::Ultras,
        prompt_addition: "holding a burning red bengal flare, thick red smoke billowing, aggressive atmosphere",
        icon: "🔥",
    },
    StickerTemplate {
        id: "megaphone",
        label: "Megaphon",
        category: TemplateCategory::Ultras,
        prompt_addition: "holding a megaphone, shouting ultras leader, dynamic pose",
        icon: "📢",
    },
    StickerTemplate {
        id: "drum",
        label: "Trommel",
        category: TemplateCategory::Ultras,
        prompt_addition: "beating a large stadium drum, ultras curve atmosphere",
        icon: "🥁",
    },
    StickerTemplate {
        id: "balaclava",
        label: "Sturmhaube",
        category: TemplateCategory::Ultras,
        prompt_addition: "wearing a tactical balaclava mask, anonymous aggressive look, street hooligan vibe",
        icon: "🥷",
    },
    StickerTemplate {
        id: "banner",
        label: "Zaunfahne",
        category: TemplateCategory::Ultras,
        prompt_addition: "large ultras banner hanging on fence, old german typography",
        icon: "🚩",
    },
    StickerTemplate {
        id: "spraycan",
        label: "Spraydose",
        category: TemplateCategory::Street,
        prompt_addition: "holding a spray paint can, dripping paint nozzle, graffiti artist vibe",
        icon: "🥫",
    },
    StickerTemplate {
        id: "concrete",
        label: "Beton Wand",
        category: TemplateCategory::Street,
        prompt_addition: "cracked concrete wall background, urban decay texture, street corner",
        icon: "🧱",
    },
    StickerTemplate {
        id: "sneaker",
        label: "Air Max",
        category: TemplateCategory::Street,
        prompt_addition: "detailed fresh sneakers, nike air max style, streetwear fashion focus",
        icon: "👟",
    },
    StickerTemplate {
        id: "boombox",
        label: "Ghettoblaster",
        category: TemplateCategory::Street,
        prompt_addition: "retro 90s boombox ghettoblaster on shoulder, hip hop culture vibe",
        icon: "📻",
    },
    StickerTemplate {
        id: "skull",
        label: "Totenkopf",
        category: TemplateCategory::Basic,
        prompt_addition: "stylized skull emblem, ominous dark aesthetic",
        icon: "💀",
    },
    StickerTemplate {
        id: "laurel",
        label: "Lorbeerkranz",
        category: TemplateCategory::Basic,
        prompt_addition: "surrounded by a golden laurel wreath, victory emblem style",
        icon: "🌿",
    },
    StickerTemplate {
        id: "shield",
        label: "Wappenschild",
        category: TemplateCategory::Basic,
        prompt_addition: "classic heraldic shield shape background, medieval crest style",
        icon: "🛡️",
    },
    StickerTemplate {
        id: "wings",
        label: "Engelsflügel",
        category: TemplateCategory::Art,
        prompt_addition: "large spread angel wings in background, ethereal holy aura",
        icon: "🪽",
    },
    StickerTemplate {
        id: "drips",
        label: "Paint Drips",
        category: TemplateCategory::Art,
        prompt_addition: "heavy dripping paint effects, liquid slime texture melting down",
        icon: "💧",
    },
    StickerTemplate {
        id: "lightning",
        label: "Blitze",
        category: TemplateCategory::Art,
        prompt_addition: "electric lightning bolts surrounding the subject, high energy power",
        icon: "⚡",
    },
];

#[cfg(test)]
mod tests {
    use super::find_template;

    #[test]
    fn append_separates_with_comma_only_when_prompt_has_text() {
        let Some(pyro) = find_template("pyro") else {
            panic!("pyro template missing");
        };
        assert_eq!(pyro.append_to("   "), format!("   {}", pyro.prompt_addition));
        assert_eq!(
            pyro.append_to("Teufel"),
            format!("Teufel, {}", pyro.prompt_addition)
        );
    }
}
