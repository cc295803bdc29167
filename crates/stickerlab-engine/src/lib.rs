pub mod client;
pub mod composer;
pub mod config;
pub mod error;
pub mod export;
pub mod imaging;
pub mod packer;
pub mod state;
pub mod studio;
pub mod vault;

pub use client::{
    ContentTransport, DryrunTransport, GeminiTransport, GenerationOutcome, GenerationPlan,
    StickerClient,
};
pub use config::StudioConfig;
pub use error::{StickerError, StickerResult};
pub use state::{Action, Effect, StudioState};
pub use studio::Studio;
pub use vault::{Persisted, SessionSnapshot, StickerVault};
