use stickerlab_contracts::catalog::BrandId;
use stickerlab_contracts::storage::StorageError;

/// Failures a caller needs to tell apart. Best-effort enrichment failures
/// never surface here; they degrade inside the client.
#[derive(Debug, thiserror::Error)]
pub enum StickerError {
    #[error("GEMINI_API_KEY, GOOGLE_API_KEY or API_KEY not set")]
    MissingCredential,
    #[error("No image generated.")]
    NoImageProduced,
    #[error("library for {brand} is full (limit {limit}); delete an old asset first")]
    LibraryFull { brand: BrandId, limit: usize },
    #[error("storage write failed: {0}")]
    Storage(#[from] StorageError),
    #[error("image could not be processed: {0}")]
    InvalidImage(String),
    #[error("print queue is empty")]
    EmptyPrintQueue,
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

pub type StickerResult<T> = Result<T, StickerError>;
