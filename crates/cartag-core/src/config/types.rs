//! Sub-configuration structs with defaults for the car tagging domain.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::tagging::classifier::{ClassifierProvider, DEFAULT_LOGIT_SCALE};
use crate::types::CATEGORY_ANGLES;

pub use crate::tagging::prompts::{PromptCategoryConfig, PromptConfig, PromptEntry};

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Root directory for predictions and the review queue
    pub data_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("~/.cartag"),
        }
    }
}

/// Uncertainty gating and review queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveLearningConfig {
    /// Entropy at or above which a sample needs review
    pub entropy_threshold: f64,

    /// Margin at or below which a sample needs annotation at tagging time.
    /// Negative disables the margin gate.
    pub margin_threshold: f64,

    /// Maximum number of samples in a review queue
    pub max_items: usize,

    /// Category whose uncertainty decides review
    pub gating_category: String,

    /// Also apply the margin gate when building the review queue
    pub queue_margin_gate: bool,
}

impl Default for ActiveLearningConfig {
    fn default() -> Self {
        Self {
            entropy_threshold: 1.1,
            margin_threshold: 0.25,
            max_items: 200,
            gating_category: CATEGORY_ANGLES.to_string(),
            queue_margin_gate: false,
        }
    }
}

/// Vision-language classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Backbone family ("siglip" or "clip")
    pub provider: ClassifierProvider,

    /// Model identifier, reported in logs
    pub model_name: String,

    /// Temperature applied to cosine similarities before softmax
    pub logit_scale: f64,

    /// Prompts kept per category in `top_predictions`
    pub top_k: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierProvider::Siglip,
            model_name: "google/siglip-base-patch16-224".to_string(),
            logit_scale: DEFAULT_LOGIT_SCALE,
            top_k: 3,
        }
    }
}

/// Image discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Supported input formats
    pub supported_formats: Vec<String>,

    /// Cap on images taken from one directory (0 = no cap)
    pub max_images_per_dir: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            max_images_per_dir: 0,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
