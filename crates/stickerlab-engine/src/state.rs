//! Selection state as an explicit reducer. `apply` only mutates the state
//! and returns the side effects the driver has to run; it never touches the
//! network or the store.

use std::collections::BTreeSet;

use stickerlab_contracts::catalog::{
    find_print_size, find_template, AspectRatio, BrandId, ShapeId, StyleId,
    DEFAULT_PRINT_SIZE_LABEL,
};
use stickerlab_contracts::records::{now_millis, GeneratedSticker};
use uuid::Uuid;

use crate::client::{GenerationOutcome, GenerationPlan};
use crate::composer::effective_subject;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectBrand(BrandId),
    SelectStyle(StyleId),
    SelectShape(ShapeId),
    /// Print-size label; also selects the size's aspect ratio and shape.
    SelectSize(String),
    SetAspectRatio(AspectRatio),
    SetPrompt(String),
    /// Template id from the catalog.
    AppendTemplate(String),
    SetEditPrompt(String),
    ToggleWebGrounding,
    ToggleCutLine,
    ToggleAsset(String),
    /// Compressed data URI of a manual reference upload.
    ReferenceUploaded(String),
    /// Analysis text for the reference `image` it was produced from.
    ReferenceAnalyzed { image: String, analysis: String },
    ClearReference,
    Generate,
    Edit,
    GenerationSucceeded(GenerationOutcome),
    GenerationFailed(String),
    LoadHistory(GeneratedSticker),
    DeleteHistory(String),
    DeleteAsset(String),
    TogglePrintQueue(GeneratedSticker),
    DismissError,
    Notice(String),
    DismissNotice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Library selections still have to be resolved to images by the
    /// driver; see [`GenerationPlan::library_asset_ids`].
    Generate(GenerationPlan),
    AnalyzeReference { image: String },
    DeleteHistoryRecord { id: String },
    DeleteLibraryAsset { id: String },
    RecordHistory(GeneratedSticker),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudioState {
    pub brand_id: BrandId,
    pub style_id: StyleId,
    pub shape_id: ShapeId,
    pub aspect_ratio: AspectRatio,
    pub size_label: String,
    pub prompt: String,
    pub edit_prompt: String,
    pub use_search: bool,
    pub cut_line: bool,
    pub reference_image: Option<String>,
    pub image_analysis: Option<String>,
    pub is_analyzing: bool,
    pub selected_assets: BTreeSet<String>,
    pub print_queue: Vec<GeneratedSticker>,
    pub current: Option<GeneratedSticker>,
    pub is_generating: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pending: Option<GenerationPlan>,
}

impl Default for StudioState {
    fn default() -> Self {
        Self {
            brand_id: BrandId::RedDevils,
            style_id: StyleId::default(),
            shape_id: ShapeId::default(),
            aspect_ratio: AspectRatio::default(),
            size_label: DEFAULT_PRINT_SIZE_LABEL.to_string(),
            prompt: String::new(),
            edit_prompt: String::new(),
            use_search: true,
            cut_line: false,
            reference_image: None,
            image_analysis: None,
            is_analyzing: false,
            selected_assets: BTreeSet::new(),
            print_queue: Vec::new(),
            current: None,
            is_generating: false,
            error: None,
            notice: None,
            pending: None,
        }
    }
}

impl StudioState {
    pub fn in_print_queue(&self, id: &str) -> bool {
        self.print_queue.iter().any(|sticker| sticker.id == id)
    }

    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::SelectBrand(brand) => {
                self.set_brand(brand);
                Vec::new()
            }
            Action::SelectStyle(style) => {
                self.style_id = style;
                Vec::new()
            }
            Action::SelectShape(shape) => {
                self.shape_id = shape;
                Vec::new()
            }
            Action::SelectSize(label) => {
                if let Some(size) = find_print_size(&label) {
                    self.size_label = size.label.to_string();
                    self.aspect_ratio = size.ratio;
                    if let Some(shape) = size.shape {
                        self.shape_id = shape;
                    }
                }
                Vec::new()
            }
            Action::SetAspectRatio(ratio) => {
                self.aspect_ratio = ratio;
                Vec::new()
            }
            Action::SetPrompt(prompt) => {
                self.prompt = prompt;
                Vec::new()
            }
            Action::AppendTemplate(id) => {
                if let Some(template) = find_template(&id) {
                    self.prompt = template.append_to(&self.prompt);
                }
                Vec::new()
            }
            Action::SetEditPrompt(prompt) => {
                self.edit_prompt = prompt;
                Vec::new()
            }
            Action::ToggleWebGrounding => {
                self.use_search = !self.use_search;
                Vec::new()
            }
            Action::ToggleCutLine => {
                self.cut_line = !self.cut_line;
                Vec::new()
            }
            Action::ToggleAsset(id) => {
                if !self.selected_assets.remove(&id) {
                    self.selected_assets.insert(id);
                }
                Vec::new()
            }
            Action::ReferenceUploaded(image) => {
                self.reference_image = Some(image.clone());
                self.image_analysis = None;
                self.is_analyzing = true;
                vec![Effect::AnalyzeReference { image }]
            }
            Action::ReferenceAnalyzed { image, analysis } => {
                // Results for a replaced or cleared upload are stale.
                if self.reference_image.as_deref() == Some(image.as_str()) {
                    self.is_analyzing = false;
                    self.image_analysis = Some(analysis).filter(|text| !text.trim().is_empty());
                }
                Vec::new()
            }
            Action::ClearReference => {
                self.reference_image = None;
                self.image_analysis = None;
                self.is_analyzing = false;
                Vec::new()
            }
            Action::Generate => self.start_generation(),
            Action::Edit => self.start_edit(),
            Action::GenerationSucceeded(outcome) => self.finish_generation(outcome),
            Action::GenerationFailed(message) => {
                self.is_generating = false;
                self.pending = None;
                self.error = Some(message);
                Vec::new()
            }
            Action::LoadHistory(sticker) => {
                self.load_history(sticker);
                Vec::new()
            }
            Action::DeleteHistory(id) => {
                self.print_queue.retain(|sticker| sticker.id != id);
                vec![Effect::DeleteHistoryRecord { id }]
            }
            Action::DeleteAsset(id) => {
                self.selected_assets.remove(&id);
                vec![Effect::DeleteLibraryAsset { id }]
            }
            Action::TogglePrintQueue(sticker) => {
                if self.in_print_queue(&sticker.id) {
                    self.print_queue.retain(|queued| queued.id != sticker.id);
                } else {
                    self.print_queue.push(sticker);
                }
                Vec::new()
            }
            Action::DismissError => {
                self.error = None;
                Vec::new()
            }
            Action::Notice(message) => {
                self.notice = Some(message);
                Vec::new()
            }
            Action::DismissNotice => {
                self.notice = None;
                Vec::new()
            }
        }
    }

    fn set_brand(&mut self, brand: BrandId) {
        if self.brand_id != brand {
            self.selected_assets.clear();
        }
        self.brand_id = brand;
    }

    fn start_generation(&mut self) -> Vec<Effect> {
        if self.prompt.trim().is_empty() || self.is_generating {
            return Vec::new();
        }
        let size = find_print_size(&self.size_label);
        let plan = GenerationPlan {
            prompt: self.prompt.clone(),
            subject: effective_subject(&self.prompt, self.shape_id, size),
            brand_id: self.brand_id,
            style_id: self.style_id,
            shape_id: self.shape_id,
            aspect_ratio: self.aspect_ratio,
            size_label: self.size_label.clone(),
            library_asset_ids: self.selected_assets.iter().cloned().collect(),
            reference_images: self.reference_image.iter().cloned().collect(),
            image_analysis: self
                .reference_image
                .as_ref()
                .and(self.image_analysis.clone()),
            use_search: self.use_search,
            cut_line: self.cut_line,
            parent: None,
        };
        self.begin(plan)
    }

    fn start_edit(&mut self) -> Vec<Effect> {
        if self.edit_prompt.trim().is_empty() || self.is_generating {
            return Vec::new();
        }
        let Some(parent) = self.current.clone() else {
            return Vec::new();
        };
        let plan = GenerationPlan {
            prompt: self.edit_prompt.clone(),
            subject: self.edit_prompt.clone(),
            brand_id: self.brand_id,
            style_id: self.style_id,
            shape_id: self.shape_id,
            aspect_ratio: self.aspect_ratio,
            size_label: self.size_label.clone(),
            library_asset_ids: Vec::new(),
            reference_images: Vec::new(),
            image_analysis: None,
            use_search: false,
            cut_line: self.cut_line,
            parent: Some(parent),
        };
        self.begin(plan)
    }

    fn begin(&mut self, plan: GenerationPlan) -> Vec<Effect> {
        self.is_generating = true;
        self.error = None;
        self.pending = Some(plan.clone());
        vec![Effect::Generate(plan)]
    }

    fn finish_generation(&mut self, outcome: GenerationOutcome) -> Vec<Effect> {
        self.is_generating = false;
        let Some(plan) = self.pending.take() else {
            return Vec::new();
        };
        let record = match plan.parent.as_ref() {
            Some(parent) => {
                self.edit_prompt.clear();
                parent.derive_edit(
                    outcome.image_url,
                    &plan.prompt,
                    plan.style_id,
                    plan.shape_id,
                )
            }
            None => GeneratedSticker {
                id: Uuid::new_v4().to_string(),
                image_url: outcome.image_url,
                prompt: plan.prompt,
                timestamp: now_millis(),
                brand_id: plan.brand_id,
                style_id: plan.style_id,
                shape_id: Some(plan.shape_id),
                enhanced_prompt: Some(outcome.enhanced_prompt),
                aspect_ratio: Some(plan.aspect_ratio),
                size_label: Some(plan.size_label),
            },
        };
        self.current = Some(record.clone());
        vec![Effect::RecordHistory(record)]
    }

    fn load_history(&mut self, sticker: GeneratedSticker) {
        self.prompt = sticker.recall_prompt();
        self.set_brand(sticker.brand_id);
        self.style_id = sticker.style_id;
        if let Some(shape) = sticker.shape_id {
            self.shape_id = shape;
        }
        if let Some(ratio) = sticker.aspect_ratio {
            self.aspect_ratio = ratio;
        }
        if let Some(label) = sticker.size_label.as_ref() {
            self.size_label = label.clone();
        }
        self.current = Some(sticker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(image: &str) -> GenerationOutcome {
        GenerationOutcome {
            image_url: image.to_string(),
            enhanced_prompt: "enhanced".to_string(),
            composed_prompt: "composed".to_string(),
        }
    }

    fn generated(state: &mut StudioState, prompt: &str) -> GeneratedSticker {
        state.apply(Action::SetPrompt(prompt.to_string()));
        state.apply(Action::Generate);
        let effects =
            state.apply(Action::GenerationSucceeded(outcome("data:image/png;base64,AAAA")));
        match effects.as_slice() {
            [Effect::RecordHistory(record)] => record.clone(),
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn switching_brand_clears_asset_selection() {
        let mut state = StudioState::default();
        state.apply(Action::ToggleAsset("a1".to_string()));
        state.apply(Action::ToggleAsset("a2".to_string()));
        state.apply(Action::SelectBrand(BrandId::RedDevils));
        assert_eq!(state.selected_assets.len(), 2);
        state.apply(Action::SelectBrand(BrandId::Hoodplaka));
        assert!(state.selected_assets.is_empty());
    }

    #[test]
    fn deleting_a_selected_asset_drops_it_from_the_selection() {
        let mut state = StudioState::default();
        state.apply(Action::ToggleAsset("a1".to_string()));
        state.apply(Action::ToggleAsset("a2".to_string()));
        let effects = state.apply(Action::DeleteAsset("a1".to_string()));
        assert_eq!(effects, vec![Effect::DeleteLibraryAsset { id: "a1".to_string() }]);
        assert_eq!(state.selected_assets.iter().collect::<Vec<_>>(), ["a2"]);
    }

    #[test]
    fn size_selection_sets_ratio_and_shape() {
        let mut state = StudioState::default();
        state.apply(Action::SelectSize("Kreis".to_string()));
        assert_eq!(state.size_label, "Kreis");
        assert_eq!(state.aspect_ratio, AspectRatio::Square);
        assert_eq!(state.shape_id, ShapeId::Circle);

        state.apply(Action::SelectSize("DIN A5".to_string()));
        assert_eq!(state.aspect_ratio, AspectRatio::Portrait3x4);
        assert_eq!(state.shape_id, ShapeId::Circle);

        state.apply(Action::SelectSize("Billboard".to_string()));
        assert_eq!(state.size_label, "DIN A5");
    }

    #[test]
    fn blank_prompt_or_running_generation_does_not_start_another() {
        let mut state = StudioState::default();
        assert!(state.apply(Action::Generate).is_empty());
        state.apply(Action::SetPrompt("Betze".to_string()));
        assert_eq!(state.apply(Action::Generate).len(), 1);
        assert!(state.is_generating);
        assert!(state.apply(Action::Generate).is_empty());
    }

    #[test]
    fn generation_plan_merges_shape_and_manual_reference() {
        let mut state = StudioState::default();
        state.apply(Action::SelectShape(ShapeId::Stamp));
        state.apply(Action::SetPrompt("Betze".to_string()));
        state.apply(Action::ToggleAsset("lib-1".to_string()));
        state.apply(Action::ReferenceUploaded("data:image/jpeg;base64,REF".to_string()));
        state.apply(Action::ReferenceAnalyzed {
            image: "data:image/jpeg;base64,REF".to_string(),
            analysis: "red crest".to_string(),
        });

        let effects = state.apply(Action::Generate);
        let Some(Effect::Generate(plan)) = effects.first() else {
            panic!("expected a generate effect");
        };
        assert!(plan.subject.contains("shape of a 🎫 Briefmarke"));
        assert_eq!(plan.library_asset_ids, ["lib-1"]);
        assert_eq!(plan.reference_images, ["data:image/jpeg;base64,REF"]);
        assert_eq!(plan.image_analysis.as_deref(), Some("red crest"));
        assert!(!plan.is_edit());
    }

    #[test]
    fn success_records_the_selection_and_failure_only_sets_error() {
        let mut state = StudioState::default();
        let record = generated(&mut state, "Teufel jagt Adler");
        assert!(!state.is_generating);
        assert_eq!(record.prompt, "Teufel jagt Adler");
        assert_eq!(record.aspect_ratio, Some(AspectRatio::Square));
        assert_eq!(record.size_label.as_deref(), Some("Quadrat"));
        assert_eq!(record.enhanced_prompt.as_deref(), Some("enhanced"));
        assert_eq!(state.current.as_ref(), Some(&record));

        state.apply(Action::Generate);
        let effects = state.apply(Action::GenerationFailed("No image generated.".to_string()));
        assert!(effects.is_empty());
        assert!(!state.is_generating);
        assert_eq!(state.error.as_deref(), Some("No image generated."));
        assert_eq!(state.current.as_ref(), Some(&record));
    }

    #[test]
    fn edit_requires_a_result_and_derives_a_new_record() {
        let mut state = StudioState::default();
        state.apply(Action::SetEditPrompt("add flames".to_string()));
        assert!(state.apply(Action::Edit).is_empty());

        let parent = generated(&mut state, "Teufel jagt Adler");
        state.apply(Action::SetEditPrompt("add flames".to_string()));
        let effects = state.apply(Action::Edit);
        let Some(Effect::Generate(plan)) = effects.first() else {
            panic!("expected a generate effect");
        };
        assert!(plan.is_edit());
        assert!(!plan.should_enrich());

        let effects =
            state.apply(Action::GenerationSucceeded(outcome("data:image/png;base64,EDIT")));
        let Some(Effect::RecordHistory(child)) = effects.first() else {
            panic!("expected a history record");
        };
        assert_eq!(child.prompt, "Edit: add flames (Original: Teufel jagt Adler)");
        assert_eq!(child.enhanced_prompt, parent.enhanced_prompt);
        assert_ne!(child.id, parent.id);
        assert!(state.edit_prompt.is_empty());
    }

    #[test]
    fn loading_history_restores_the_selection() {
        let mut state = StudioState::default();
        state.apply(Action::ToggleAsset("a1".to_string()));
        let sticker = GeneratedSticker {
            id: "h1".to_string(),
            image_url: "data:image/png;base64,AAAA".to_string(),
            prompt: "Edit: mehr Rauch (Original: Westkurve)".to_string(),
            timestamp: 1,
            brand_id: BrandId::Palzflow,
            style_id: StyleId::Graffiti,
            shape_id: Some(ShapeId::Hexagon),
            enhanced_prompt: None,
            aspect_ratio: Some(AspectRatio::Landscape16x9),
            size_label: Some("Ultra Wide".to_string()),
        };
        state.apply(Action::LoadHistory(sticker.clone()));
        assert_eq!(state.prompt, "mehr Rauch");
        assert_eq!(state.brand_id, BrandId::Palzflow);
        assert!(state.selected_assets.is_empty());
        assert_eq!(state.style_id, StyleId::Graffiti);
        assert_eq!(state.shape_id, ShapeId::Hexagon);
        assert_eq!(state.aspect_ratio, AspectRatio::Landscape16x9);
        assert_eq!(state.size_label, "Ultra Wide");
        assert_eq!(state.current, Some(sticker));
    }

    #[test]
    fn deleting_history_removes_it_from_the_print_queue() {
        let mut state = StudioState::default();
        let first = generated(&mut state, "one");
        let second = generated(&mut state, "two");
        state.apply(Action::TogglePrintQueue(first.clone()));
        state.apply(Action::TogglePrintQueue(second.clone()));
        let effects = state.apply(Action::DeleteHistory(first.id.clone()));
        assert_eq!(effects, vec![Effect::DeleteHistoryRecord { id: first.id.clone() }]);
        assert_eq!(state.print_queue, vec![second.clone()]);

        state.apply(Action::TogglePrintQueue(second));
        assert!(state.print_queue.is_empty());
    }

    #[test]
    fn templates_append_with_separator() {
        let mut state = StudioState::default();
        state.apply(Action::AppendTemplate("missing-template".to_string()));
        assert!(state.prompt.is_empty());
        state.apply(Action::SetPrompt("Betze".to_string()));
        let first = stickerlab_contracts::catalog::TEMPLATES[0];
        state.apply(Action::AppendTemplate(first.id.to_string()));
        assert_eq!(state.prompt, format!("Betze, {}", first.prompt_addition));
    }

    #[test]
    fn analysis_is_dropped_once_the_reference_is_cleared() {
        let mut state = StudioState::default();
        let effects =
            state.apply(Action::ReferenceUploaded("data:image/jpeg;base64,R".to_string()));
        assert_eq!(
            effects,
            vec![Effect::AnalyzeReference {
                image: "data:image/jpeg;base64,R".to_string()
            }]
        );
        assert!(state.is_analyzing);
        state.apply(Action::ClearReference);
        state.apply(Action::ReferenceAnalyzed {
            image: "data:image/jpeg;base64,R".to_string(),
            analysis: "late answer".to_string(),
        });
        assert_eq!(state.image_analysis, None);
        assert!(!state.is_analyzing);
    }

    #[test]
    fn analysis_of_a_replaced_reference_is_ignored() {
        let mut state = StudioState::default();
        state.apply(Action::ReferenceUploaded("data:image/jpeg;base64,OLD".to_string()));
        state.apply(Action::ReferenceUploaded("data:image/jpeg;base64,NEW".to_string()));

        state.apply(Action::ReferenceAnalyzed {
            image: "data:image/jpeg;base64,OLD".to_string(),
            analysis: "old crest".to_string(),
        });
        assert_eq!(state.image_analysis, None);
        assert!(state.is_analyzing);

        state.apply(Action::ReferenceAnalyzed {
            image: "data:image/jpeg;base64,NEW".to_string(),
            analysis: "new crest".to_string(),
        });
        assert_eq!(state.image_analysis.as_deref(), Some("new crest"));
        assert!(!state.is_analyzing);
    }
}
