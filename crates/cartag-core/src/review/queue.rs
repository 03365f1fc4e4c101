//! The review queue payload handed to annotators.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::Result;
use crate::types::Sample;

use super::selector::select_for_review;
use super::summary::{summarise, ReviewSummary};
use super::ReviewPolicy;

/// Provenance of a generated queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMetadata {
    /// Where the samples came from (usually the predictions file path)
    pub source: String,

    /// Number of samples in the queue
    pub count: usize,

    pub entropy_threshold: f64,

    /// Present only when the margin gate was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_threshold: Option<f64>,

    pub max_items: usize,

    pub gating_category: String,
}

impl QueueMetadata {
    /// Admission rule in words, e.g. "entropy >= 1.1 or margin <= 0.25".
    pub fn criteria(&self) -> String {
        match self.margin_threshold {
            Some(margin) => format!(
                "entropy >= {} or margin <= {}",
                self.entropy_threshold, margin
            ),
            None => format!("entropy >= {}", self.entropy_threshold),
        }
    }
}

/// A ranked, capped list of samples needing manual annotation.
///
/// Regenerated wholesale on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewQueue {
    pub metadata: QueueMetadata,
    pub samples: Vec<ReviewSummary>,
}

impl ReviewQueue {
    /// Select, rank, and summarise samples under `policy`.
    pub fn build(source: impl Into<String>, samples: &[Sample], policy: &ReviewPolicy) -> Self {
        let summaries: Vec<ReviewSummary> = select_for_review(samples, policy)
            .into_iter()
            .map(|sample| summarise(sample, &policy.gating_category))
            .collect();

        let metadata = QueueMetadata {
            source: source.into(),
            count: summaries.len(),
            entropy_threshold: policy.entropy_threshold,
            margin_threshold: policy
                .margin_gate_enabled()
                .then_some(policy.margin_threshold),
            max_items: policy.max_items,
            gating_category: policy.gating_category.clone(),
        };

        tracing::info!(
            "Review queue: {} of {} samples selected ({})",
            metadata.count,
            samples.len(),
            metadata.criteria()
        );

        Self {
            metadata,
            samples: summaries,
        }
    }

    /// Number of queued samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Write the queue as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        std::io::Write::flush(&mut writer)?;

        tracing::info!(
            "Review queue saved to {:?} (samples: {})",
            path,
            self.samples.len()
        );
        Ok(())
    }

    /// Read a previously saved queue.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CATEGORY_ANGLES;
    use crate::uncertainty::UncertaintyScores;

    fn sample(id: &str, entropy: f64) -> Sample {
        Sample::new(id, format!("/cars/{id}.jpg")).with_uncertainty(
            CATEGORY_ANGLES,
            UncertaintyScores {
                entropy,
                margin: 0.5,
                max_confidence: 0.4,
            },
        )
    }

    #[test]
    fn test_build_metadata() {
        let samples = vec![sample("a", 0.2), sample("b", 1.5), sample("c", 2.0)];
        let queue = ReviewQueue::build("predictions.jsonl", &samples, &ReviewPolicy::default());

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.metadata.count, 2);
        assert_eq!(queue.metadata.source, "predictions.jsonl");
        assert_eq!(queue.metadata.entropy_threshold, 1.1);
        assert_eq!(queue.metadata.margin_threshold, None);
        assert_eq!(queue.metadata.criteria(), "entropy >= 1.1");
        assert_eq!(queue.samples[0].image_id, "c");
        assert_eq!(queue.samples[1].image_id, "b");
    }

    #[test]
    fn test_margin_threshold_recorded_when_enabled() {
        let policy = ReviewPolicy::default().with_margin_threshold(0.25);
        let queue = ReviewQueue::build("x", &[], &policy);
        assert!(queue.is_empty());
        assert_eq!(queue.metadata.margin_threshold, Some(0.25));
        assert_eq!(queue.metadata.criteria(), "entropy >= 1.1 or margin <= 0.25");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("review_queue.json");
        let samples = vec![sample("a", 1.3)];
        let queue = ReviewQueue::build("batch", &samples, &ReviewPolicy::default());

        queue.save(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"metadata\""));
        assert!(!content.contains("margin_threshold"));

        let loaded = ReviewQueue::load(&path).unwrap();
        assert_eq!(loaded, queue);
    }
}
