/// What a model call is used for. Each task maps to one capability a model
/// must advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTask {
    PromptEnhancement,
    LocationContext,
    ImageAnalysis,
    ImageSynthesis,
}

impl ModelTask {
    pub const ALL: [ModelTask; 4] = [
        ModelTask::PromptEnhancement,
        ModelTask::LocationContext,
        ModelTask::ImageAnalysis,
        ModelTask::ImageSynthesis,
    ];

    pub fn capability(self) -> &'static str {
        match self {
            ModelTask::PromptEnhancement => "search",
            ModelTask::LocationContext => "maps",
            ModelTask::ImageAnalysis => "vision",
            ModelTask::ImageSynthesis => "image",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelTask::PromptEnhancement => "prompt_enhancement",
            ModelTask::LocationContext => "location_context",
            ModelTask::ImageAnalysis => "image_analysis",
            ModelTask::ImageSynthesis => "image_synthesis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub provider: String,
    pub capabilities: Vec<String>,
}

impl ModelSpec {
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|item| item == capability)
    }
}

/// Known models in preference order: the first model supporting a
/// capability is the default for tasks needing it.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
}

impl ModelRegistry {
    pub fn new(models: Option<Vec<ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|model| model.name == name)
    }

    pub fn by_capability(&self, capability: &str) -> Vec<ModelSpec> {
        self.models
            .iter()
            .filter(|model| model.supports(capability))
            .cloned()
            .collect()
    }

    pub fn ensure(&self, name: &str, capability: &str) -> Option<ModelSpec> {
        let model = self.get(name)?;
        if model.supports(capability) {
            return Some(model.clone());
        }
        None
    }
}

fn default_models() -> Vec<ModelSpec> {
    let spec = |name: &str, provider: &str, capabilities: &[&str]| ModelSpec {
        name: name.to_string(),
        provider: provider.to_string(),
        capabilities: capabilities
            .iter()
            .map(|item| (*item).to_string())
            .collect(),
    };

    vec![
        spec("gemini-3-flash-preview", "gemini", &["text", "search"]),
        spec("gemini-2.5-flash", "gemini", &["text", "maps", "search"]),
        spec("gemini-3-pro-preview", "gemini", &["text", "vision"]),
        spec("gemini-2.5-flash-image", "gemini", &["image", "edit"]),
        spec("gemini-3-pro-image-preview", "gemini", &["image", "edit"]),
        spec("dryrun-text-1", "dryrun", &["text", "search", "maps", "vision"]),
        spec("dryrun-image-1", "dryrun", &["image", "edit"]),
    ]
}
