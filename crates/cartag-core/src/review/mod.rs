//! Active-learning review queue selection.
//!
//! Samples whose gating-category uncertainty passes the [`ReviewPolicy`] are
//! ranked by entropy (most uncertain first) and capped, then projected into
//! [`ReviewSummary`] views for the human annotator.
//!
//! Two gates exist in the tagging workflow:
//!
//! - at tagging time, a sample is flagged `needs_annotation` when
//!   `entropy >= entropy_threshold OR margin <= margin_threshold`
//! - the standalone queue builder filters on entropy alone
//!
//! Both are expressed by the same policy; the queue builder simply runs with
//! the margin gate disabled ([`MARGIN_GATE_DISABLED`]).

pub mod queue;
pub mod selector;
pub mod summary;

pub use queue::{QueueMetadata, ReviewQueue};
pub use selector::{rank_candidates, select_for_review, ReviewCandidate, Reviewable};
pub use summary::{summarise, ReviewSummary};

use crate::config::ActiveLearningConfig;
use crate::types::CATEGORY_ANGLES;
use crate::uncertainty::UncertaintyScores;

/// Margin threshold that never triggers (margins are always >= 0).
pub const MARGIN_GATE_DISABLED: f64 = -1.0;

/// Admission thresholds and queue size for review selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPolicy {
    /// Admit when gating entropy is at or above this (nats)
    pub entropy_threshold: f64,

    /// Admit when gating margin is at or below this; negative disables the gate
    pub margin_threshold: f64,

    /// Maximum number of samples kept after ranking
    pub max_items: usize,

    /// Category whose uncertainty decides admission
    pub gating_category: String,
}

impl Default for ReviewPolicy {
    /// Matches the standalone queue builder: entropy >= 1.1, no margin gate, 200 items.
    fn default() -> Self {
        Self {
            entropy_threshold: 1.1,
            margin_threshold: MARGIN_GATE_DISABLED,
            max_items: 200,
            gating_category: CATEGORY_ANGLES.to_string(),
        }
    }
}

impl ReviewPolicy {
    /// Entropy-only policy with the given cap.
    pub fn entropy_only(entropy_threshold: f64, max_items: usize) -> Self {
        Self {
            entropy_threshold,
            max_items,
            ..Self::default()
        }
    }

    /// Enable the margin gate.
    pub fn with_margin_threshold(mut self, margin_threshold: f64) -> Self {
        self.margin_threshold = margin_threshold;
        self
    }

    /// Use a different gating category.
    pub fn with_gating_category(mut self, category: impl Into<String>) -> Self {
        self.gating_category = category.into();
        self
    }

    /// The tagging-time `needs_annotation` gate: entropy OR margin.
    pub fn annotation_gate(config: &ActiveLearningConfig) -> Self {
        Self {
            entropy_threshold: config.entropy_threshold,
            margin_threshold: config.margin_threshold,
            max_items: config.max_items,
            gating_category: config.gating_category.clone(),
        }
    }

    /// The review-queue policy. The margin gate is only applied when
    /// `queue_margin_gate` is set, matching the entropy-only builder by default.
    pub fn queue(config: &ActiveLearningConfig) -> Self {
        let margin_threshold = if config.queue_margin_gate {
            config.margin_threshold
        } else {
            MARGIN_GATE_DISABLED
        };
        Self {
            margin_threshold,
            ..Self::annotation_gate(config)
        }
    }

    /// Whether the margin gate can ever trigger.
    pub fn margin_gate_enabled(&self) -> bool {
        self.margin_threshold >= 0.0
    }

    /// Whether a sample with these scores needs human review.
    pub fn admits(&self, scores: &UncertaintyScores) -> bool {
        scores.entropy >= self.entropy_threshold || scores.margin <= self.margin_threshold
    }
}
