//! History and per-brand library, kept in memory and mirrored to a
//! key-value store under fixed keys.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stickerlab_contracts::catalog::BrandId;
use stickerlab_contracts::records::{GeneratedSticker, LibraryAsset};
use stickerlab_contracts::storage::{KeyValueStore, HISTORY_KEY, LIBRARY_KEY, SESSION_KEY};
use tracing::{debug, warn};

use crate::error::{StickerError, StickerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persisted {
    Yes,
    /// The store refused the write; the in-memory view still has the change.
    No,
}

/// Print queue and last result, carried between CLI invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub print_queue: Vec<GeneratedSticker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<GeneratedSticker>,
}

pub struct StickerVault<S: KeyValueStore> {
    store: S,
    history: Vec<GeneratedSticker>,
    library: Vec<LibraryAsset>,
    history_limit: usize,
    library_limit_per_brand: usize,
}

impl<S: KeyValueStore> StickerVault<S> {
    /// Loads both collections. Unreadable or corrupt entries start empty.
    pub fn open(store: S, history_limit: usize, library_limit_per_brand: usize) -> Self {
        let mut history: Vec<GeneratedSticker> = load_list(&store, HISTORY_KEY);
        history.truncate(history_limit);
        let library = load_list(&store, LIBRARY_KEY);
        Self {
            store,
            history,
            library,
            history_limit,
            library_limit_per_brand,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Newest first.
    pub fn history(&self) -> &[GeneratedSticker] {
        &self.history
    }

    pub fn library(&self) -> &[LibraryAsset] {
        &self.library
    }

    pub fn brand_library(&self, brand: BrandId) -> Vec<&LibraryAsset> {
        self.library
            .iter()
            .filter(|asset| asset.brand_id == brand)
            .collect()
    }

    pub fn find_history(&self, id: &str) -> Option<&GeneratedSticker> {
        self.history.iter().find(|sticker| sticker.id == id)
    }

    pub fn find_asset(&self, id: &str) -> Option<&LibraryAsset> {
        self.library.iter().find(|asset| asset.id == id)
    }

    pub fn record_generation(&mut self, sticker: GeneratedSticker) -> Persisted {
        self.history.insert(0, sticker);
        self.history.truncate(self.history_limit);
        match write_list(&mut self.store, HISTORY_KEY, &self.history) {
            Ok(()) => Persisted::Yes,
            Err(err) => {
                warn!(error = %err, "history not persisted; keeping it in memory");
                Persisted::No
            }
        }
    }

    /// Prepends `asset` to its brand's partition. Rejected when the brand is
    /// at its cap; rolled back when the store refuses the write.
    pub fn add_library_asset(&mut self, asset: LibraryAsset) -> StickerResult<()> {
        let brand = asset.brand_id;
        if self.brand_library(brand).len() >= self.library_limit_per_brand {
            return Err(StickerError::LibraryFull {
                brand,
                limit: self.library_limit_per_brand,
            });
        }

        let previous = self.library.clone();
        let (same_brand, others): (Vec<_>, Vec<_>) = self
            .library
            .drain(..)
            .partition(|existing| existing.brand_id == brand);
        self.library = std::iter::once(asset)
            .chain(same_brand)
            .chain(others)
            .collect();

        if let Err(err) = write_list(&mut self.store, LIBRARY_KEY, &self.library) {
            self.library = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Returns whether a record was removed. Memory is only updated once the
    /// store has accepted the shorter list.
    pub fn delete_history(&mut self, id: &str) -> StickerResult<bool> {
        let Some(remaining) = without(&self.history, |sticker| sticker.id == id) else {
            return Ok(false);
        };
        write_list(&mut self.store, HISTORY_KEY, &remaining)?;
        self.history = remaining;
        Ok(true)
    }

    pub fn delete_library_asset(&mut self, id: &str) -> StickerResult<bool> {
        let Some(remaining) = without(&self.library, |asset| asset.id == id) else {
            return Ok(false);
        };
        write_list(&mut self.store, LIBRARY_KEY, &remaining)?;
        self.library = remaining;
        Ok(true)
    }

    pub fn load_session(&self) -> SessionSnapshot {
        load_value(&self.store, SESSION_KEY).unwrap_or_default()
    }

    pub fn save_session(&mut self, session: &SessionSnapshot) -> StickerResult<()> {
        let raw = serde_json::to_string(session).map_err(anyhow::Error::from)?;
        self.store.set(SESSION_KEY, &raw)?;
        Ok(())
    }
}

/// `None` when nothing matches `drop`.
fn without<T: Clone>(rows: &[T], drop: impl Fn(&T) -> bool) -> Option<Vec<T>> {
    let remaining: Vec<T> = rows.iter().filter(|row| !drop(row)).cloned().collect();
    (remaining.len() != rows.len()).then_some(remaining)
}

/// Rows are decoded one by one so a single unreadable row does not take the
/// rest of the list with it.
fn load_list<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Vec<T> {
    let rows: Vec<Value> = load_value(store, key).unwrap_or_default();
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(key, index, error = %err, "skipping unreadable stored row");
                None
            }
        })
        .collect()
}

fn load_value<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(key, error = %err, "stored entry unreadable; starting empty");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "stored entry corrupt; starting empty");
            None
        }
    }
}

fn write_list<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: &str,
    rows: &[T],
) -> StickerResult<()> {
    let raw = serde_json::to_string(rows).map_err(anyhow::Error::from)?;
    store.set(key, &raw)?;
    debug!(key, rows = rows.len(), bytes = raw.len(), "persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use stickerlab_contracts::catalog::{AspectRatio, BrandId, ShapeId, StyleId};
    use stickerlab_contracts::records::{GeneratedSticker, LibraryAsset};
    use stickerlab_contracts::storage::{
        KeyValueStore, MemoryStore, StorageError, HISTORY_KEY, LIBRARY_KEY,
    };

    use super::*;

    fn sticker(id: &str) -> GeneratedSticker {
        GeneratedSticker {
            id: id.to_string(),
            image_url: format!("data:image/png;base64,{id}"),
            prompt: format!("prompt {id}"),
            timestamp: 0,
            brand_id: BrandId::RedDevils,
            style_id: StyleId::Vector,
            shape_id: Some(ShapeId::Contour),
            enhanced_prompt: None,
            aspect_ratio: Some(AspectRatio::Square),
            size_label: Some("Quadrat".to_string()),
        }
    }

    fn asset(brand: BrandId, name: &str) -> LibraryAsset {
        LibraryAsset::new(brand, name, "data:image/jpeg;base64,AAAA")
    }

    #[test]
    fn history_keeps_newest_records_up_to_the_cap() -> Result<()> {
        let mut vault = StickerVault::open(MemoryStore::new(), 3, 50);
        for idx in 0..7 {
            assert_eq!(vault.record_generation(sticker(&format!("s{idx}"))), Persisted::Yes);
            assert!(vault.history().len() <= 3);
        }
        let ids: Vec<_> = vault.history().iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, ["s6", "s5", "s4"]);

        let stored = vault.store().get(HISTORY_KEY)?.unwrap_or_default();
        let stored: Vec<GeneratedSticker> = serde_json::from_str(&stored)?;
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].id, "s6");
        Ok(())
    }

    #[test]
    fn history_quota_failure_keeps_memory_state() {
        let mut vault = StickerVault::open(MemoryStore::with_capacity_bytes(40), 12, 50);
        assert_eq!(vault.record_generation(sticker("big")), Persisted::No);
        assert_eq!(vault.history().len(), 1);
        assert_eq!(vault.store().used_bytes(), 0);
    }

    #[test]
    fn library_prepends_within_brand_and_keeps_other_brands() -> Result<()> {
        let mut vault = StickerVault::open(MemoryStore::new(), 12, 50);
        vault.add_library_asset(asset(BrandId::Hoodplaka, "a.png"))?;
        vault.add_library_asset(asset(BrandId::Palzflow, "b.png"))?;
        vault.add_library_asset(asset(BrandId::Hoodplaka, "c.png"))?;

        let names: Vec<_> = vault.library().iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["c.png", "a.png", "b.png"]);
        let hood: Vec<_> = vault
            .brand_library(BrandId::Hoodplaka)
            .iter()
            .map(|row| row.name.as_str())
            .collect();
        assert_eq!(hood, ["c.png", "a.png"]);
        Ok(())
    }

    #[test]
    fn library_at_cap_rejects_without_touching_store() -> Result<()> {
        let mut vault = StickerVault::open(MemoryStore::new(), 12, 2);
        vault.add_library_asset(asset(BrandId::Hoodplaka, "1.png"))?;
        vault.add_library_asset(asset(BrandId::Hoodplaka, "2.png"))?;
        let stored_before = vault.store().get(LIBRARY_KEY)?;

        let err = vault.add_library_asset(asset(BrandId::Hoodplaka, "3.png"));
        assert!(matches!(
            err,
            Err(StickerError::LibraryFull { brand: BrandId::Hoodplaka, limit: 2 })
        ));
        assert_eq!(vault.library().len(), 2);
        assert_eq!(vault.store().get(LIBRARY_KEY)?, stored_before);

        vault.add_library_asset(asset(BrandId::Jj674, "other.png"))?;
        assert_eq!(vault.library().len(), 3);
        Ok(())
    }

    #[test]
    fn library_storage_failure_rolls_back() -> Result<()> {
        let mut vault = StickerVault::open(MemoryStore::with_capacity_bytes(400), 12, 50);
        vault.add_library_asset(asset(BrandId::Custom, "small.png"))?;
        let before = vault.library().to_vec();

        let huge = LibraryAsset::new(BrandId::Custom, "huge.png", "x".repeat(1000));
        let err = vault.add_library_asset(huge);
        assert!(matches!(
            err,
            Err(StickerError::Storage(StorageError::QuotaExceeded { .. }))
        ));
        assert_eq!(vault.library(), before.as_slice());
        Ok(())
    }

    #[test]
    fn deletes_filter_by_id_and_persist() -> Result<()> {
        let mut vault = StickerVault::open(MemoryStore::new(), 12, 50);
        vault.record_generation(sticker("a"));
        vault.record_generation(sticker("b"));
        assert!(vault.delete_history("a")?);
        assert!(!vault.delete_history("missing")?);

        let reopened = StickerVault::open(vault.store().clone(), 12, 50);
        assert_eq!(reopened.history().len(), 1);
        assert_eq!(reopened.history()[0].id, "b");
        Ok(())
    }

    #[test]
    fn corrupt_entries_load_as_empty() -> Result<()> {
        let mut store = MemoryStore::new();
        store.set(HISTORY_KEY, "{not json")?;
        store.set(LIBRARY_KEY, "[]")?;
        let vault = StickerVault::open(store, 12, 50);
        assert!(vault.history().is_empty());
        assert!(vault.library().is_empty());
        Ok(())
    }

    #[test]
    fn unreadable_history_row_does_not_take_the_others_with_it() -> Result<()> {
        let mut store = MemoryStore::new();
        let good = serde_json::to_value(sticker("good"))?;
        let mut odd = serde_json::to_value(sticker("odd"))?;
        odd["styleId"] = serde_json::json!("neon-2099");
        let broken = serde_json::json!({ "id": "broken", "timestamp": "yesterday" });
        store.set(HISTORY_KEY, &serde_json::to_string(&[odd, broken, good])?)?;

        let mut vault = StickerVault::open(store, 12, 50);
        let ids: Vec<_> = vault.history().iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, ["odd", "good"]);
        assert_eq!(vault.history()[0].style_id, StyleId::Vector);

        vault.record_generation(sticker("new"));
        let stored = vault.store().get(HISTORY_KEY)?.unwrap_or_default();
        let stored: Vec<GeneratedSticker> = serde_json::from_str(&stored)?;
        let ids: Vec<_> = stored.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, ["new", "odd", "good"]);
        Ok(())
    }

    /// Accepts writes until frozen.
    #[derive(Default)]
    struct FreezableStore {
        inner: MemoryStore,
        frozen: bool,
    }

    impl KeyValueStore for FreezableStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.frozen {
                return Err(StorageError::Backend(anyhow::anyhow!("store is read-only")));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_delete_leaves_memory_untouched() -> Result<()> {
        let mut vault = StickerVault::open(FreezableStore::default(), 12, 50);
        vault.record_generation(sticker("keep"));
        vault.add_library_asset(asset(BrandId::Palzflow, "wave.png"))?;
        let asset_id = vault.library()[0].id.clone();
        vault.store.frozen = true;

        assert!(vault.delete_history("keep").is_err());
        assert!(vault.delete_library_asset(&asset_id).is_err());
        assert_eq!(vault.history().len(), 1);
        assert_eq!(vault.library().len(), 1);

        vault.store.frozen = false;
        assert!(vault.delete_history("keep")?);
        assert!(vault.history().is_empty());
        Ok(())
    }

    #[test]
    fn session_round_trips_through_the_store() -> Result<()> {
        let mut vault = StickerVault::open(MemoryStore::new(), 12, 50);
        assert_eq!(vault.load_session(), SessionSnapshot::default());
        let session = SessionSnapshot {
            print_queue: vec![sticker("q1")],
            current: Some(sticker("q1")),
        };
        vault.save_session(&session)?;
        assert_eq!(vault.load_session(), session);
        Ok(())
    }
}
