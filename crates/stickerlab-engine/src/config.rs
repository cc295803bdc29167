use std::env;
use std::path::PathBuf;

use crate::error::{StickerError, StickerResult};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_HISTORY_LIMIT: usize = 12;
pub const DEFAULT_LIBRARY_LIMIT_PER_BRAND: usize = 50;
pub const DEFAULT_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT_S: f64 = 90.0;

/// Runtime settings, resolved from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub data_dir: PathBuf,
    pub history_limit: usize,
    pub library_limit_per_brand: usize,
    pub storage_quota_bytes: usize,
    pub request_timeout_s: f64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            data_dir: PathBuf::from(".stickerlab"),
            history_limit: DEFAULT_HISTORY_LIMIT,
            library_limit_per_brand: DEFAULT_LIBRARY_LIMIT_PER_BRAND,
            storage_quota_bytes: DEFAULT_STORAGE_QUOTA_BYTES,
            request_timeout_s: DEFAULT_REQUEST_TIMEOUT_S,
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        Self {
            api_key: non_empty("GEMINI_API_KEY")
                .or_else(|| non_empty("GOOGLE_API_KEY"))
                .or_else(|| non_empty("API_KEY")),
            api_base: non_empty("GEMINI_API_BASE")
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            data_dir: non_empty("STICKERLAB_HOME")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            history_limit: non_empty("STICKERLAB_HISTORY_LIMIT")
                .and_then(|value| value.parse::<usize>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.history_limit),
            library_limit_per_brand: non_empty("STICKERLAB_LIBRARY_LIMIT")
                .and_then(|value| value.parse::<usize>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.library_limit_per_brand),
            storage_quota_bytes: non_empty("STICKERLAB_STORAGE_QUOTA_BYTES")
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(defaults.storage_quota_bytes),
            request_timeout_s: non_empty("STICKERLAB_REQUEST_TIMEOUT")
                .and_then(|value| value.parse::<f64>().ok())
                .filter(|value| value.is_finite())
                .map(|value| value.clamp(15.0, 300.0))
                .unwrap_or(defaults.request_timeout_s),
        }
    }

    pub fn require_api_key(&self) -> StickerResult<&str> {
        self.api_key
            .as_deref()
            .ok_or(StickerError::MissingCredential)
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join("events.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::StudioConfig;
    use crate::error::StickerError;

    fn config_from(pairs: &[(&str, &str)]) -> StudioConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        StudioConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config, StudioConfig::default());
        assert!(matches!(
            config.require_api_key(),
            Err(StickerError::MissingCredential)
        ));
    }

    #[test]
    fn api_key_falls_back_through_known_variables() {
        let config = config_from(&[("GEMINI_API_KEY", "  "), ("API_KEY", "k-3")]);
        assert_eq!(config.api_key.as_deref(), Some("k-3"));
        let config = config_from(&[("GOOGLE_API_KEY", "k-2"), ("API_KEY", "k-3")]);
        assert_eq!(config.api_key.as_deref(), Some("k-2"));
    }

    #[test]
    fn numeric_settings_parse_and_clamp() {
        let config = config_from(&[
            ("GEMINI_API_BASE", "http://localhost:9000/v1/"),
            ("STICKERLAB_HISTORY_LIMIT", "3"),
            ("STICKERLAB_LIBRARY_LIMIT", "0"),
            ("STICKERLAB_REQUEST_TIMEOUT", "2"),
            ("STICKERLAB_HOME", "/tmp/stickers"),
        ]);
        assert_eq!(config.api_base, "http://localhost:9000/v1");
        assert_eq!(config.history_limit, 3);
        assert_eq!(config.library_limit_per_brand, 50);
        assert_eq!(config.request_timeout_s, 15.0);
        assert_eq!(config.store_path(), std::path::PathBuf::from("/tmp/stickers/store.json"));
    }
}
