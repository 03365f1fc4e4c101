//! Threshold admission, entropy ranking, and truncation.

use crate::types::Sample;
use crate::uncertainty::UncertaintyScores;

use super::ReviewPolicy;

/// Anything that can report uncertainty for a gating category.
pub trait Reviewable {
    /// Uncertainty for `category`, or `None` when it was never scored.
    fn uncertainty(&self, category: &str) -> Option<&UncertaintyScores>;
}

impl Reviewable for Sample {
    fn uncertainty(&self, category: &str) -> Option<&UncertaintyScores> {
        self.uncertainty_for(category)
    }
}

/// A bare score record is its own gating uncertainty, whatever the category.
impl Reviewable for UncertaintyScores {
    fn uncertainty(&self, _category: &str) -> Option<&UncertaintyScores> {
        Some(self)
    }
}

impl<T: Reviewable + ?Sized> Reviewable for &T {
    fn uncertainty(&self, category: &str) -> Option<&UncertaintyScores> {
        (**self).uncertainty(category)
    }
}

/// An admitted item and the entropy it is ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewCandidate<T> {
    pub priority: f64,
    pub item: T,
}

/// Admit items passing the policy and sort them by entropy, descending.
///
/// Items with no uncertainty for the gating category are dropped whatever
/// the thresholds. The sort is stable: equal entropies keep input order.
/// No truncation is applied.
pub fn rank_candidates<T, I>(items: I, policy: &ReviewPolicy) -> Vec<ReviewCandidate<T>>
where
    T: Reviewable,
    I: IntoIterator<Item = T>,
{
    let mut missing = 0usize;
    let mut candidates: Vec<ReviewCandidate<T>> = items
        .into_iter()
        .filter_map(|item| {
            let priority = match item.uncertainty(&policy.gating_category) {
                Some(scores) if policy.admits(scores) => scores.entropy,
                Some(_) => return None,
                None => {
                    missing += 1;
                    return None;
                }
            };
            Some(ReviewCandidate { priority, item })
        })
        .collect();

    if missing > 0 {
        tracing::debug!(
            "{missing} item(s) have no '{}' uncertainty and were excluded",
            policy.gating_category
        );
    }

    candidates.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    candidates
}

/// Select the most uncertain items for review, at most `policy.max_items`.
///
/// Pure function of (items, policy): the same input always yields the same
/// queue in the same order.
pub fn select_for_review<T, I>(items: I, policy: &ReviewPolicy) -> Vec<T>
where
    T: Reviewable,
    I: IntoIterator<Item = T>,
{
    let mut ranked = rank_candidates(items, policy);
    let admitted = ranked.len();
    ranked.truncate(policy.max_items);

    tracing::debug!(
        "Review selection: {} admitted, {} kept (max {})",
        admitted,
        ranked.len(),
        policy.max_items
    );

    ranked.into_iter().map(|c| c.item).collect()
}
