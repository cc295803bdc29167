use std::collections::HashMap;

use super::registry::{ModelRegistry, ModelSpec, ModelTask};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: ModelSpec,
    pub requested: Option<String>,
    pub fallback_reason: Option<String>,
}

/// Resolves which model serves each task, honoring per-task overrides when
/// the requested model supports the task.
#[derive(Debug, Clone)]
pub struct ModelRoster {
    pub registry: ModelRegistry,
    overrides: HashMap<ModelTask, String>,
}

impl ModelRoster {
    pub fn new(registry: Option<ModelRegistry>) -> Self {
        Self {
            registry: registry.unwrap_or_else(|| ModelRegistry::new(None)),
            overrides: HashMap::new(),
        }
    }

    /// Roster whose every task resolves to an offline dryrun model.
    pub fn dryrun() -> Self {
        Self::new(None)
            .with_override(ModelTask::PromptEnhancement, "dryrun-text-1")
            .with_override(ModelTask::LocationContext, "dryrun-text-1")
            .with_override(ModelTask::ImageAnalysis, "dryrun-text-1")
            .with_override(ModelTask::ImageSynthesis, "dryrun-image-1")
    }

    pub fn with_override(mut self, task: ModelTask, model: impl Into<String>) -> Self {
        self.overrides.insert(task, model.into());
        self
    }

    pub fn select(&self, task: ModelTask) -> Result<ModelSelection, String> {
        let capability = task.capability();
        let requested = self.overrides.get(&task).map(String::as_str);
        let (fallback_reason, requested_text) = if let Some(requested_value) = requested {
            if let Some(model) = self.registry.ensure(requested_value, capability) {
                return Ok(ModelSelection {
                    model,
                    requested: Some(requested_value.to_string()),
                    fallback_reason: None,
                });
            }
            (
                Some(format!(
                    "Requested model '{requested_value}' unavailable for task '{}'.",
                    task.as_str()
                )),
                Some(requested_value.to_string()),
            )
        } else {
            (None, None)
        };

        let candidates = self.registry.by_capability(capability);
        let Some(model) = candidates.first().cloned() else {
            return Err(format!(
                "No models available for capability '{capability}'."
            ));
        };
        Ok(ModelSelection {
            model,
            requested: requested_text,
            fallback_reason,
        })
    }

    /// Model name for `task`, falling back to the registry head when
    /// selection fails.
    pub fn model_for(&self, task: ModelTask) -> String {
        self.select(task)
            .map(|selection| selection.model.name)
            .unwrap_or_else(|_| default_model_name(task).to_string())
    }
}

impl Default for ModelRoster {
    fn default() -> Self {
        Self::new(None)
    }
}

fn default_model_name(task: ModelTask) -> &'static str {
    match task {
        ModelTask::PromptEnhancement => "gemini-3-flash-preview",
        ModelTask::LocationContext => "gemini-2.5-flash",
        ModelTask::ImageAnalysis => "gemini-3-pro-preview",
        ModelTask::ImageSynthesis => "gemini-2.5-flash-image",
    }
}
