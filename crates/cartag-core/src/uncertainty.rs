//! Uncertainty estimation over a single category's probability distribution.
//!
//! Turns the classifier's per-prompt probabilities into three independent
//! signals used for active learning:
//!
//! - **entropy**: Shannon entropy in nats, `0` for one-hot, `ln(n)` for uniform
//! - **margin**: gap between the top two probabilities
//! - **max_confidence**: the highest probability
//!
//! Everything here is a pure function of its input, so scoring can be
//! spread across threads without coordination.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PipelineError, PipelineResult};

/// Lower clamp applied to every probability before taking its logarithm.
///
/// Keeps exact zeros from producing `-inf`/NaN. The reported entropy is a
/// slightly damped approximation for distributions with exact zeros.
pub const PROBABILITY_FLOOR: f64 = 1e-8;

/// Uncertainty summary for one (sample, category) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyScores {
    /// Shannon entropy in nats (always >= 0)
    pub entropy: f64,

    /// Top-1 minus top-2 probability (top-1 itself when there is no runner-up)
    pub margin: f64,

    /// Highest probability in the distribution
    pub max_confidence: f64,
}

/// Shannon entropy `-Σ p·ln(p)` in nats, with each `p` clamped to
/// `[PROBABILITY_FLOOR, 1.0]`.
///
/// # Panics
///
/// Panics on an empty slice: entropy of no candidates is undefined and the
/// caller is expected to reject empty categories before scoring.
pub fn entropy(probabilities: &[f64]) -> f64 {
    assert!(
        !probabilities.is_empty(),
        "entropy is undefined for an empty distribution"
    );
    let sum: f64 = probabilities
        .iter()
        .map(|p| p.clamp(PROBABILITY_FLOOR, 1.0))
        .map(|p| p * p.ln())
        .sum();
    let h = -sum;
    if h > 0.0 {
        h
    } else {
        0.0
    }
}

/// Gap between the highest and second-highest probability.
///
/// A single-candidate distribution has no runner-up, so its margin is the
/// top probability itself. That reads as maximally confident, which is the
/// intended signal: a category with one prompt never needs review on margin.
///
/// # Panics
///
/// Panics on an empty slice.
pub fn margin(probabilities: &[f64]) -> f64 {
    assert!(
        !probabilities.is_empty(),
        "margin is undefined for an empty distribution"
    );
    let mut top1 = f64::NEG_INFINITY;
    let mut top2 = f64::NEG_INFINITY;
    for &p in probabilities {
        if p > top1 {
            top2 = top1;
            top1 = p;
        } else if p > top2 {
            top2 = p;
        }
    }
    if probabilities.len() < 2 {
        top1
    } else {
        top1 - top2
    }
}

/// Highest probability in the distribution, `0.0` for an empty slice.
pub fn max_confidence(probabilities: &[f64]) -> f64 {
    probabilities.iter().copied().fold(0.0, f64::max)
}

/// Compute all three uncertainty signals for one distribution.
///
/// # Panics
///
/// Panics on an empty slice (see [`entropy`]).
pub fn compute_uncertainty(probabilities: &[f64]) -> UncertaintyScores {
    UncertaintyScores {
        entropy: entropy(probabilities),
        margin: margin(probabilities),
        max_confidence: max_confidence(probabilities),
    }
}

/// Ordered mapping from candidate label to probability for one category.
///
/// Always holds at least one entry. Entry order is the classifier's prompt
/// order and is preserved through serialization (as a JSON object).
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityDistribution {
    entries: Vec<(String, f64)>,
}

impl ProbabilityDistribution {
    /// Build a distribution from `(label, probability)` pairs.
    ///
    /// Returns `EmptyDistribution` when `entries` is empty.
    pub fn new(category: &str, entries: Vec<(String, f64)>) -> PipelineResult<Self> {
        if entries.is_empty() {
            return Err(PipelineError::EmptyDistribution {
                category: category.to_string(),
            });
        }
        Ok(Self { entries })
    }

    /// Zip a category's prompts with the classifier's probabilities.
    pub fn from_prompts(
        category: &str,
        prompts: &[String],
        probabilities: &[f64],
    ) -> PipelineResult<Self> {
        if prompts.len() != probabilities.len() {
            return Err(PipelineError::PromptMismatch {
                category: category.to_string(),
                expected: prompts.len(),
                actual: probabilities.len(),
            });
        }
        let entries = prompts
            .iter()
            .cloned()
            .zip(probabilities.iter().copied())
            .collect();
        Self::new(category, entries)
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A distribution is never empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidate labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Probabilities in label order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, p)| *p).collect()
    }

    /// Probability of a specific label.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, p)| *p)
    }

    /// The highest-probability entry. Ties go to the earliest label.
    pub fn top(&self) -> (&str, f64) {
        let mut best = &self.entries[0];
        for entry in &self.entries[1..] {
            if entry.1 > best.1 {
                best = entry;
            }
        }
        (best.0.as_str(), best.1)
    }

    /// The `k` highest-probability entries, descending. Ties keep label order.
    pub fn top_k(&self, k: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .entries
            .iter()
            .map(|(label, p)| (label.as_str(), *p))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    /// Uncertainty signals for this distribution.
    pub fn uncertainty(&self) -> UncertaintyScores {
        compute_uncertainty(&self.probabilities())
    }
}

impl Serialize for ProbabilityDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, p) in &self.entries {
            map.serialize_entry(label, p)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProbabilityDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = ProbabilityDistribution;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a non-empty map of label to probability")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, p)) = access.next_entry::<String, f64>()? {
                    entries.push((label, p));
                }
                if entries.is_empty() {
                    return Err(de::Error::invalid_length(0, &self));
                }
                Ok(ProbabilityDistribution { entries })
            }
        }

        deserializer.deserialize_map(DistributionVisitor)
    }
}
