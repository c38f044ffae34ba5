use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse synchronizer config: {0}")]
    Parse(String),
    #[error("invalid synchronizer config: {0}")]
    Invalid(&'static str),
}

/// Tunables for [`StateSynchronizer`](crate::StateSynchronizer). Every field
/// has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynchronizerConfig {
    /// Prefix the app is served under, e.g. `/stac`. Empty for the origin root.
    pub base_path: String,
    /// Quiet period before a viewport change is written to the URL.
    pub viewport_debounce_ms: u32,
    /// Rewrite alias and legacy URLs to their canonical form after a
    /// successful load.
    pub canonicalize_paths: bool,
    /// Upper bound on `rel=next` pages read while looking for a collection.
    pub max_collection_pages: usize,
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            viewport_debounce_ms: 300,
            canonicalize_paths: true,
            max_collection_pages: 10,
        }
    }
}

impl SynchronizerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_collection_pages == 0 {
            return Err(ConfigError::Invalid("maxCollectionPages must be at least 1"));
        }
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(ConfigError::Invalid("basePath must start with '/'"));
        }
        Ok(())
    }
}
