//! Core data types for tagged car photos.
//!
//! A [`Sample`] is the full auto-tagging record for one image. It is created
//! once by the tagger, persisted by the caller, and read back when a review
//! queue is built.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::records::{lenient, lenient_map, lenient_uncertainty};
use crate::uncertainty::{ProbabilityDistribution, UncertaintyScores};

/// Viewing angle category (also the default gating category for review).
pub const CATEGORY_ANGLES: &str = "angles";
/// Brand category.
pub const CATEGORY_BRANDS: &str = "brands";
/// Design style category.
pub const CATEGORY_STYLES: &str = "styles";
/// Interior part category.
pub const CATEGORY_INTERIOR: &str = "interior_parts";

/// Label used when a category is missing or its best prompt has no mapping.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// The label a category resolved to, with the winning prompt's probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLabel {
    pub label: String,
    pub confidence: f64,
}

impl ResolvedLabel {
    /// "Unknown" with zero confidence.
    pub fn unknown() -> Self {
        Self {
            label: UNKNOWN_LABEL.to_string(),
            confidence: 0.0,
        }
    }

    /// Whether this resolved to a real label.
    pub fn is_known(&self) -> bool {
        !self.label.is_empty() && self.label != UNKNOWN_LABEL
    }
}

impl Default for ResolvedLabel {
    fn default() -> Self {
        Self::unknown()
    }
}

/// A prompt and its probability, used for top-k diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPrompt {
    pub label: String,
    pub score: f64,
}

impl From<(&str, f64)> for TopPrompt {
    fn from((label, score): (&str, f64)) -> Self {
        Self {
            label: label.to_string(),
            score,
        }
    }
}

/// The complete auto-tagging record for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    // === Identification ===
    /// Stable identifier ("auto_<file stem>" for tagger output)
    pub image_id: String,

    /// Path to the source image
    pub image_path: PathBuf,

    /// Which collection the image came from
    #[serde(default)]
    pub source: String,

    // === Resolved labels ===
    #[serde(default)]
    pub angle: ResolvedLabel,

    #[serde(default)]
    pub brand: ResolvedLabel,

    #[serde(default)]
    pub style: ResolvedLabel,

    #[serde(default)]
    pub interior_part: ResolvedLabel,

    /// Mean of the non-zero category confidences
    #[serde(default)]
    pub confidence: f64,

    /// Known resolved labels, in angle/brand/style/interior order
    #[serde(default, deserialize_with = "lenient")]
    pub auto_tags: Vec<String>,

    /// Tags added by a human reviewer
    #[serde(default, deserialize_with = "lenient")]
    pub manual_tags: Vec<String>,

    /// Tagging-time review flag (entropy OR margin gate on the gating category)
    #[serde(default)]
    pub needs_annotation: bool,

    // === Diagnostics ===
    /// Top-k prompts per category, descending
    #[serde(default, deserialize_with = "lenient_map")]
    pub top_predictions: BTreeMap<String, Vec<TopPrompt>>,

    /// Full per-prompt distribution per category
    #[serde(default, deserialize_with = "lenient_map")]
    pub probabilities: BTreeMap<String, ProbabilityDistribution>,

    /// Uncertainty per category
    #[serde(default, deserialize_with = "lenient_uncertainty")]
    pub uncertainty: BTreeMap<String, UncertaintyScores>,
}

impl Sample {
    /// Create a sample with only identification set; every label is "Unknown".
    pub fn new(image_id: impl Into<String>, image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_id: image_id.into(),
            image_path: image_path.into(),
            source: String::new(),
            angle: ResolvedLabel::unknown(),
            brand: ResolvedLabel::unknown(),
            style: ResolvedLabel::unknown(),
            interior_part: ResolvedLabel::unknown(),
            confidence: 0.0,
            auto_tags: vec![],
            manual_tags: vec![],
            needs_annotation: false,
            top_predictions: BTreeMap::new(),
            probabilities: BTreeMap::new(),
            uncertainty: BTreeMap::new(),
        }
    }

    /// Attach an uncertainty record for a category.
    pub fn with_uncertainty(mut self, category: &str, scores: UncertaintyScores) -> Self {
        self.uncertainty.insert(category.to_string(), scores);
        self
    }

    /// Uncertainty for a category, if it was scored.
    pub fn uncertainty_for(&self, category: &str) -> Option<&UncertaintyScores> {
        self.uncertainty.get(category)
    }

    /// The highest-scoring prompt for a category.
    pub fn top_prompt(&self, category: &str) -> Option<TopPrompt> {
        self.probabilities
            .get(category)
            .map(|dist| TopPrompt::from(dist.top()))
    }
}

/// Statistics for a tagging batch.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TagStats {
    /// Images tagged successfully
    pub succeeded: usize,

    /// Images that failed and were skipped
    pub failed: usize,

    /// Tagged images flagged for annotation
    pub flagged: usize,

    /// Total tagging time in seconds
    pub total_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(entropy: f64) -> UncertaintyScores {
        UncertaintyScores {
            entropy,
            margin: 0.5,
            max_confidence: 0.6,
        }
    }

    #[test]
    fn test_sample_roundtrip_preserves_uncertainty() {
        let sample = Sample::new("auto_911", "/cars/porsche/911.jpg")
            .with_uncertainty(CATEGORY_ANGLES, scores(1.3));
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"image_id\":\"auto_911\""));

        let parsed: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.uncertainty_for(CATEGORY_ANGLES), Some(&scores(1.3)));
        assert!(parsed.uncertainty_for(CATEGORY_BRANDS).is_none());
    }

    #[test]
    fn test_minimal_record_defaults() {
        let parsed: Sample =
            serde_json::from_str(r#"{"image_id":"a","image_path":"a.jpg"}"#).unwrap();
        assert_eq!(parsed.angle, ResolvedLabel::unknown());
        assert!(parsed.auto_tags.is_empty());
        assert!(parsed.uncertainty.is_empty());
        assert!(!parsed.needs_annotation);
    }

    #[test]
    fn test_resolved_label_is_known() {
        assert!(!ResolvedLabel::unknown().is_known());
        let label = ResolvedLabel {
            label: "Ferrari".to_string(),
            confidence: 0.8,
        };
        assert!(label.is_known());
    }

    #[test]
    fn test_top_prompt_missing_category() {
        let sample = Sample::new("x", "x.jpg");
        assert!(sample.top_prompt(CATEGORY_ANGLES).is_none());
    }
}
