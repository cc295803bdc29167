mod registry;
mod selectors;

pub use registry::{ModelRegistry, ModelSpec, ModelTask};
pub use selectors::{ModelRoster, ModelSelection};

#[cfg(test)]
mod tests {
    use super::{ModelRegistry, ModelRoster, ModelSpec, ModelTask};

    #[test]
    fn default_roster_matches_task_defaults() {
        let roster = ModelRoster::default();
        assert_eq!(
            roster.model_for(ModelTask::PromptEnhancement),
            "gemini-3-flash-preview"
        );
        assert_eq!(roster.model_for(ModelTask::LocationContext), "gemini-2.5-flash");
        assert_eq!(roster.model_for(ModelTask::ImageAnalysis), "gemini-3-pro-preview");
        assert_eq!(
            roster.model_for(ModelTask::ImageSynthesis),
            "gemini-2.5-flash-image"
        );
    }

    #[test]
    fn override_falls_back_when_model_lacks_capability() {
        let roster = ModelRoster::new(None)
            .with_override(ModelTask::ImageSynthesis, "gemini-3-pro-preview");
        let selection = roster.select(ModelTask::ImageSynthesis).unwrap_or_else(|err| {
            panic!("selection failed: {err}");
        });
        assert_eq!(selection.model.name, "gemini-2.5-flash-image");
        assert_eq!(selection.requested.as_deref(), Some("gemini-3-pro-preview"));
        assert_eq!(
            selection.fallback_reason.as_deref(),
            Some("Requested model 'gemini-3-pro-preview' unavailable for task 'image_synthesis'.")
        );
    }

    #[test]
    fn override_is_honored_when_supported() {
        let roster = ModelRoster::new(None)
            .with_override(ModelTask::ImageSynthesis, "gemini-3-pro-image-preview");
        assert_eq!(
            roster.model_for(ModelTask::ImageSynthesis),
            "gemini-3-pro-image-preview"
        );
    }

    #[test]
    fn dryrun_roster_routes_every_task_offline() {
        let roster = ModelRoster::dryrun();
        for task in ModelTask::ALL {
            let selection = roster.select(task).unwrap_or_else(|err| panic!("{err}"));
            assert_eq!(selection.model.provider, "dryrun");
        }
    }

    #[test]
    fn select_errors_when_no_model_has_capability() {
        let registry = ModelRegistry::new(Some(vec![ModelSpec {
            name: "text-only".to_string(),
            provider: "dryrun".to_string(),
            capabilities: vec!["text".to_string()],
        }]));
        let err = ModelRoster::new(Some(registry))
            .select(ModelTask::ImageSynthesis)
            .err()
            .unwrap_or_default();
        assert_eq!(err, "No models available for capability 'image'.");
    }
}
