//! Annotator-facing projection of a selected sample.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::{
    Sample, TopPrompt, CATEGORY_ANGLES, CATEGORY_BRANDS, CATEGORY_INTERIOR, CATEGORY_STYLES,
};
use crate::uncertainty::UncertaintyScores;

/// What a reviewer sees for one queued sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub image_id: String,
    pub image_path: PathBuf,
    pub confidence: f64,
    pub angle: String,
    pub brand: String,
    pub style: String,
    pub interior_part: String,
    pub auto_tags: Vec<String>,

    /// Gating-category uncertainty that admitted the sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<UncertaintyScores>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_angle: Option<TopPrompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_brand: Option<TopPrompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_style: Option<TopPrompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_interior: Option<TopPrompt>,
}

/// Project a sample into its review summary.
///
/// `best_*` hold the single highest-scoring prompt per category and are
/// absent when that category was never scored.
pub fn summarise(sample: &Sample, gating_category: &str) -> ReviewSummary {
    ReviewSummary {
        image_id: sample.image_id.clone(),
        image_path: sample.image_path.clone(),
        confidence: sample.confidence,
        angle: sample.angle.label.clone(),
        brand: sample.brand.label.clone(),
        style: sample.style.label.clone(),
        interior_part: sample.interior_part.label.clone(),
        auto_tags: sample.auto_tags.clone(),
        uncertainty: sample.uncertainty_for(gating_category).copied(),
        best_angle: sample.top_prompt(CATEGORY_ANGLES),
        best_brand: sample.top_prompt(CATEGORY_BRANDS),
        best_style: sample.top_prompt(CATEGORY_STYLES),
        best_interior: sample.top_prompt(CATEGORY_INTERIOR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResolvedLabel;
    use crate::uncertainty::ProbabilityDistribution;

    #[test]
    fn test_summary_picks_best_prompt() {
        let mut sample = Sample::new("auto_gt", "/cars/ferrari/gt.jpg");
        sample.angle = ResolvedLabel {
            label: "1-前45".to_string(),
            confidence: 0.41,
        };
        sample.auto_tags = vec!["1-前45".to_string()];
        let dist = ProbabilityDistribution::new(
            CATEGORY_ANGLES,
            vec![
                ("front view of a car".to_string(), 0.39),
                ("45 degree front angle of a car".to_string(), 0.41),
                ("side view of a car".to_string(), 0.20),
            ],
        )
        .unwrap();
        sample = sample.with_uncertainty(CATEGORY_ANGLES, dist.uncertainty());
        sample.probabilities.insert(CATEGORY_ANGLES.to_string(), dist);

        let summary = summarise(&sample, CATEGORY_ANGLES);
        assert_eq!(summary.angle, "1-前45");
        assert_eq!(
            summary.best_angle,
            Some(TopPrompt {
                label: "45 degree front angle of a car".to_string(),
                score: 0.41
            })
        );
        assert!(summary.best_brand.is_none());
        assert!(summary.uncertainty.is_some());
        assert_eq!(summary.brand, "Unknown");
    }

    #[test]
    fn test_absent_categories_are_omitted_from_json() {
        let summary = summarise(&Sample::new("x", "x.jpg"), CATEGORY_ANGLES);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("best_angle"));
        assert!(!json.contains("uncertainty"));
        assert!(json.contains("\"auto_tags\":[]"));
    }
}
