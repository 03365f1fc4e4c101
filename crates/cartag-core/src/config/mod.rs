//! Configuration management for cartag.
//!
//! Configuration is loaded from `config.toml` in the platform config
//! directory, falling back to defaults when the file is absent. Every section
//! implements `Default`, so a partial file only overrides what it names.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::review::ReviewPolicy;
use crate::tagging::prompts::PromptBank;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for cartag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Uncertainty gating and review queue settings
    pub active_learning: ActiveLearningConfig,

    /// Classifier backbone settings
    pub classifier: ClassifierConfig,

    /// Prompt categories and their canonical labels
    pub prompts: PromptConfig,

    /// Image discovery settings
    pub discovery: DiscoveryConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.cartag.cartag/config.toml
    /// - Linux: ~/.config/cartag/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\cartag\config\config.toml
    ///
    /// Falls back to ~/.cartag/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "cartag", "cartag")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".cartag").join("config.toml")
            })
    }

    /// Get the resolved data directory path (with ~ expansion).
    pub fn data_dir(&self) -> PathBuf {
        let path_str = self.general.data_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Where the review queue is written: `<data_dir>/processed/review_queue.json`.
    pub fn review_queue_path(&self) -> PathBuf {
        self.data_dir().join("processed").join("review_queue.json")
    }

    /// Build the prompt bank from the configured categories.
    pub fn prompt_bank(&self) -> PromptBank {
        PromptBank::from_config(&self.prompts)
    }

    /// Policy used to select the review queue.
    pub fn review_policy(&self) -> ReviewPolicy {
        ReviewPolicy::queue(&self.active_learning)
    }

    /// Policy used to flag `needs_annotation` at tagging time.
    pub fn annotation_gate(&self) -> ReviewPolicy {
        ReviewPolicy::annotation_gate(&self.active_learning)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
