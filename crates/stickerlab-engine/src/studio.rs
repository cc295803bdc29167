use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use stickerlab_contracts::events::{EventWriter, RejectReason, StudioEvent};
use stickerlab_contracts::records::{now_millis, LibraryAsset};
use stickerlab_contracts::storage::KeyValueStore;
use tracing::{info, warn};

use crate::client::{GenerationPlan, StickerClient};
use crate::error::{StickerError, StickerResult};
use crate::export::{print_sheet_filename, render_print_sheet};
use crate::imaging::compress_for_storage;
use crate::packer::PageFormat;
use crate::state::{Action, Effect, StudioState};
use crate::vault::{Persisted, SessionSnapshot, StickerVault};

/// Owns the selection state and runs its effects against the vault and the
/// generation client, one action at a time.
pub struct Studio<S: KeyValueStore> {
    state: StudioState,
    vault: StickerVault<S>,
    client: StickerClient,
    events: Option<EventWriter>,
}

impl<S: KeyValueStore> Studio<S> {
    pub fn new(client: StickerClient, vault: StickerVault<S>) -> Self {
        Self {
            state: StudioState::default(),
            vault,
            client,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventWriter) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> &StudioState {
        &self.state
    }

    pub fn vault(&self) -> &StickerVault<S> {
        &self.vault
    }

    pub fn client(&self) -> &StickerClient {
        &self.client
    }

    /// Applies `action` and every follow-up action its effects produce.
    pub fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(next) = queue.pop_front() {
            for effect in self.state.apply(next) {
                if let Some(follow_up) = self.run_effect(effect) {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    /// Compresses and stores an asset under the active brand. Capacity and
    /// storage failures also surface as a notice.
    pub fn upload_library_asset(
        &mut self,
        name: &str,
        bytes: &[u8],
    ) -> StickerResult<LibraryAsset> {
        let brand = self.state.brand_id;
        let image = match compress_for_storage(bytes) {
            Ok(image) => image,
            Err(err) => {
                self.dispatch(Action::Notice(format!("Image could not be processed: {name}")));
                return Err(err);
            }
        };
        let asset = LibraryAsset::new(brand, name, image);
        match self.vault.add_library_asset(asset.clone()) {
            Ok(()) => {
                self.emit(StudioEvent::LibraryAssetAdded {
                    asset_id: asset.id.clone(),
                    brand,
                    name: name.to_string(),
                });
                Ok(asset)
            }
            Err(err) => {
                let reason = match &err {
                    StickerError::LibraryFull { .. } => RejectReason::LibraryFull,
                    _ => RejectReason::Storage,
                };
                self.emit(StudioEvent::LibraryAssetRejected {
                    brand,
                    name: name.to_string(),
                    reason,
                });
                self.dispatch(Action::Notice(err.to_string()));
                Err(err)
            }
        }
    }

    /// Compresses a manual reference image and runs its analysis.
    pub fn upload_reference(&mut self, bytes: &[u8]) -> StickerResult<()> {
        let image = compress_for_storage(bytes)?;
        self.dispatch(Action::ReferenceUploaded(image));
        Ok(())
    }

    pub fn print_sheet(&self, format: PageFormat) -> StickerResult<Vec<u8>> {
        render_print_sheet(&self.state.print_queue, format)
    }

    /// Renders the print queue and writes it into `dir` under a generated
    /// name.
    pub fn write_print_sheet(&self, format: PageFormat, dir: &Path) -> StickerResult<PathBuf> {
        let bytes = self.print_sheet(format)?;
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join(print_sheet_filename(format, now_millis()));
        fs::write(&path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
        self.emit(StudioEvent::PrintSheetWritten {
            path: path.to_string_lossy().into_owned(),
            format: format.as_str().to_string(),
            items: self.state.print_queue.len(),
            bytes: bytes.len(),
        });
        info!(path = %path.display(), items = self.state.print_queue.len(), "print sheet written");
        Ok(path)
    }

    /// Puts the stored print queue and last result back into the state.
    pub fn restore_session(&mut self) {
        let session = self.vault.load_session();
        self.state.print_queue = session.print_queue;
        if let Some(current) = session.current {
            self.dispatch(Action::LoadHistory(current));
        }
    }

    pub fn save_session(&mut self) -> StickerResult<()> {
        let session = SessionSnapshot {
            print_queue: self.state.print_queue.clone(),
            current: self.state.current.clone(),
        };
        self.vault.save_session(&session)
    }

    fn run_effect(&mut self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::Generate(plan) => Some(self.run_generation(plan)),
            Effect::AnalyzeReference { image } => {
                let analysis = self.client.analyze_reference(&image);
                Some(Action::ReferenceAnalyzed { image, analysis })
            }
            Effect::DeleteHistoryRecord { id } => match self.vault.delete_history(&id) {
                Ok(_) => None,
                Err(err) => Some(Action::Notice(format!("History entry not deleted: {err}"))),
            },
            Effect::DeleteLibraryAsset { id } => match self.vault.delete_library_asset(&id) {
                Ok(_) => None,
                Err(err) => Some(Action::Notice(format!("Library asset not deleted: {err}"))),
            },
            Effect::RecordHistory(record) => {
                if self.vault.record_generation(record) == Persisted::No {
                    warn!("generation kept for this session only");
                }
                None
            }
        }
    }

    fn run_generation(&mut self, mut plan: GenerationPlan) -> Action {
        self.resolve_library_references(&mut plan);
        self.emit(StudioEvent::GenerationStarted {
            brand: plan.brand_id,
            style: plan.style_id,
            aspect_ratio: plan.aspect_ratio,
            size_label: plan.size_label.clone(),
            edit: plan.is_edit(),
            enrich: plan.should_enrich(),
            references: plan.reference_images.len(),
            transport: self.client.transport_name().to_string(),
        });
        match self.client.generate(&plan) {
            Ok(outcome) => {
                self.emit(StudioEvent::GenerationFinished {
                    brand: plan.brand_id,
                    enhanced_prompt: outcome.enhanced_prompt.clone(),
                    image_bytes: outcome.image_url.len(),
                });
                Action::GenerationSucceeded(outcome)
            }
            Err(err) => {
                warn!(error = %err, "generation failed");
                self.emit(StudioEvent::GenerationFailed {
                    brand: plan.brand_id,
                    error: err.to_string(),
                });
                Action::GenerationFailed(err.to_string())
            }
        }
    }

    /// Library selections go first, in library order, followed by the
    /// manual upload already in the plan.
    fn resolve_library_references(&self, plan: &mut GenerationPlan) {
        if plan.library_asset_ids.is_empty() {
            return;
        }
        let mut images: Vec<String> = self
            .vault
            .brand_library(plan.brand_id)
            .into_iter()
            .filter(|asset| plan.library_asset_ids.contains(&asset.id))
            .map(|asset| asset.image.clone())
            .collect();
        images.append(&mut plan.reference_images);
        plan.reference_images = images;
    }

    fn emit(&self, event: StudioEvent) {
        let Some(events) = self.events.as_ref() else {
            return;
        };
        if let Err(err) = events.emit(event) {
            warn!(error = %format!("{err:#}"), "event not recorded");
        }
    }
}
