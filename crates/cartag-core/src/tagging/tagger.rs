//! Per-image tagging: classify every category, resolve labels, score uncertainty.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::error::PipelineError;
use crate::review::ReviewPolicy;
use crate::types::{
    ResolvedLabel, Sample, TagStats, TopPrompt, CATEGORY_ANGLES, CATEGORY_BRANDS,
    CATEGORY_INTERIOR, CATEGORY_STYLES,
};
use crate::uncertainty::ProbabilityDistribution;

use super::classifier::VisionClassifier;
use super::discovery::ImageDiscovery;
use super::prompts::PromptBank;

/// Default number of prompts kept per category in `top_predictions`.
const DEFAULT_TOP_K: usize = 3;

/// Default `source` recorded on tagged samples.
const DEFAULT_SOURCE: &str = "brand_images";

/// Result of tagging a batch of images.
#[derive(Debug, Default)]
pub struct TagBatch {
    pub samples: Vec<Sample>,
    pub stats: TagStats,
}

/// Tags car photos using a classifier and a prompt bank.
pub struct Tagger {
    classifier: Box<dyn VisionClassifier>,
    prompts: PromptBank,
    gate: ReviewPolicy,
    top_k: usize,
    source: String,
}

impl Tagger {
    /// Create a tagger. `gate` decides the `needs_annotation` flag.
    pub fn new(
        classifier: Box<dyn VisionClassifier>,
        prompts: PromptBank,
        gate: ReviewPolicy,
    ) -> Self {
        Self {
            classifier,
            prompts,
            gate,
            top_k: DEFAULT_TOP_K,
            source: DEFAULT_SOURCE.to_string(),
        }
    }

    /// Create a tagger with prompts, annotation gate, and top-k from config.
    pub fn from_config(classifier: Box<dyn VisionClassifier>, config: &Config) -> Self {
        tracing::info!(
            "Tagger using {} ({} {})",
            classifier.name(),
            config.classifier.provider,
            config.classifier.model_name
        );
        Self::new(
            classifier,
            PromptBank::from_config(&config.prompts),
            ReviewPolicy::annotation_gate(&config.active_learning),
        )
        .with_top_k(config.classifier.top_k)
    }

    /// Number of prompts kept per category in `top_predictions`.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Collection name recorded on every sample.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Score every category for one image.
    pub fn classify(
        &self,
        image: &Path,
    ) -> Result<BTreeMap<String, ProbabilityDistribution>, PipelineError> {
        let mut distributions = BTreeMap::new();
        for category in self.prompts.categories() {
            let probabilities = self
                .classifier
                .predict_probabilities(image, &category.prompts)?;
            let dist = ProbabilityDistribution::from_prompts(
                &category.name,
                &category.prompts,
                &probabilities,
            )?;
            distributions.insert(category.name.clone(), dist);
        }
        Ok(distributions)
    }

    /// Tag a single image.
    pub fn tag(&self, image: &Path) -> Result<Sample, PipelineError> {
        let distributions = self.classify(image)?;

        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut sample = Sample::new(format!("auto_{stem}"), image);
        sample.source = self.source.clone();

        sample.angle = self.resolve(&distributions, CATEGORY_ANGLES);
        sample.brand = self.resolve(&distributions, CATEGORY_BRANDS);
        sample.style = self.resolve(&distributions, CATEGORY_STYLES);
        sample.interior_part = self.resolve(&distributions, CATEGORY_INTERIOR);

        let resolved = [&sample.angle, &sample.brand, &sample.style, &sample.interior_part];
        sample.auto_tags = resolved
            .iter()
            .filter(|r| r.is_known())
            .map(|r| r.label.clone())
            .collect();

        let positive: Vec<f64> = resolved
            .iter()
            .map(|r| r.confidence)
            .filter(|c| *c > 0.0)
            .collect();
        sample.confidence = if positive.is_empty() {
            0.0
        } else {
            positive.iter().sum::<f64>() / positive.len() as f64
        };

        for (category, dist) in distributions {
            sample.uncertainty.insert(category.clone(), dist.uncertainty());
            sample.top_predictions.insert(
                category.clone(),
                dist.top_k(self.top_k).into_iter().map(TopPrompt::from).collect(),
            );
            sample.probabilities.insert(category, dist);
        }

        sample.needs_annotation = sample
            .uncertainty_for(&self.gate.gating_category)
            .is_some_and(|scores| self.gate.admits(scores));

        tracing::debug!(
            "Tagged {:?}: angle={} brand={} confidence={:.3} needs_annotation={}",
            image,
            sample.angle.label,
            sample.brand.label,
            sample.confidence,
            sample.needs_annotation
        );
        Ok(sample)
    }

    /// Tag a batch of images. Failures are logged and skipped, never fatal.
    pub fn tag_batch<P: AsRef<Path>>(&self, images: &[P]) -> TagBatch {
        let start = Instant::now();
        let mut batch = TagBatch::default();

        for image in images {
            let image = image.as_ref();
            match self.tag(image) {
                Ok(sample) => {
                    batch.stats.succeeded += 1;
                    if sample.needs_annotation {
                        batch.stats.flagged += 1;
                    }
                    batch.samples.push(sample);
                }
                Err(e) => {
                    batch.stats.failed += 1;
                    tracing::error!("Failed: {:?} - {}", image, e);
                }
            }
        }

        batch.stats.total_seconds = start.elapsed().as_secs_f64();
        tracing::info!(
            "Tagged {} image(s): {} failed, {} flagged for annotation ({:.1}s)",
            batch.stats.succeeded,
            batch.stats.failed,
            batch.stats.flagged,
            batch.stats.total_seconds
        );
        batch
    }

    /// Discover and tag every supported image under `dir`.
    pub fn tag_directory(&self, dir: &Path, config: &Config) -> TagBatch {
        let files = ImageDiscovery::new(config.discovery.clone()).discover(dir);
        if files.is_empty() {
            tracing::warn!("No supported image files found at {:?}", dir);
        }
        self.tag_batch(&files)
    }

    /// The winning prompt's canonical label, or "Unknown" when the category
    /// was not scored. An unmapped winner keeps its probability as confidence.
    fn resolve(
        &self,
        distributions: &BTreeMap<String, ProbabilityDistribution>,
        category: &str,
    ) -> ResolvedLabel {
        match distributions.get(category) {
            Some(dist) => {
                let (prompt, probability) = dist.top();
                ResolvedLabel {
                    label: self.prompts.resolve(category, prompt).to_string(),
                    confidence: probability,
                }
            }
            None => ResolvedLabel::unknown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagging::prompts::{PromptCategoryConfig, PromptConfig, PromptEntry};
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Returns fixed probabilities per (image, category-first-prompt).
    struct FixedClassifier {
        by_image: HashMap<PathBuf, HashMap<String, Vec<f64>>>,
    }

    impl VisionClassifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict_probabilities(
            &self,
            image: &Path,
            prompts: &[String],
        ) -> Result<Vec<f64>, PipelineError> {
            self.by_image
                .get(image)
                .and_then(|m| m.get(&prompts[0]))
                .cloned()
                .ok_or_else(|| PipelineError::Classify {
                    path: image.to_path_buf(),
                    message: "unknown image".to_string(),
                })
        }
    }

    fn entry(text: &str, label: Option<&str>) -> PromptEntry {
        PromptEntry {
            text: text.to_string(),
            label: label.map(str::to_string),
        }
    }

    fn bank() -> PromptBank {
        PromptBank::from_config(&PromptConfig {
            categories: vec![
                PromptCategoryConfig {
                    name: "angles".to_string(),
                    prompts: vec![
                        entry("front view", Some("4-正前")),
                        entry("rear view", Some("5-正后")),
                        entry("side view", Some("2-正侧")),
                    ],
                },
                PromptCategoryConfig {
                    name: "brands".to_string(),
                    prompts: vec![entry("Honda car", Some("Honda")), entry("odd car", None)],
                },
            ],
        })
    }

    fn tagger(entries: Vec<(&str, Vec<f64>, Vec<f64>)>) -> Tagger {
        let by_image = entries
            .into_iter()
            .map(|(path, angles, brands)| {
                let mut m = HashMap::new();
                m.insert("front view".to_string(), angles);
                m.insert("Honda car".to_string(), brands);
                (PathBuf::from(path), m)
            })
            .collect();
        Tagger::new(
            Box::new(FixedClassifier { by_image }),
            bank(),
            ReviewPolicy::entropy_only(1.1, 200).with_margin_threshold(0.25),
        )
    }

    #[test]
    fn test_confident_image() {
        let t = tagger(vec![("/cars/civic.jpg", vec![0.9, 0.05, 0.05], vec![0.8, 0.2])]);
        let sample = t.tag(Path::new("/cars/civic.jpg")).unwrap();

        assert_eq!(sample.image_id, "auto_civic");
        assert_eq!(sample.source, "brand_images");
        assert_eq!(sample.angle.label, "4-正前");
        assert_eq!(sample.brand.label, "Honda");
        assert_eq!(sample.style, ResolvedLabel::unknown());
        assert_eq!(sample.auto_tags, vec!["4-正前", "Honda"]);
        assert!((sample.confidence - 0.85).abs() < 1e-12);
        assert!(!sample.needs_annotation);

        let angles = sample.uncertainty_for("angles").unwrap();
        assert!((angles.entropy - 0.394).abs() < 1e-3);
        assert_eq!(sample.top_predictions["angles"].len(), 3);
        assert_eq!(sample.top_predictions["brands"][0].label, "Honda car");
    }

    #[test]
    fn test_low_margin_flags_annotation() {
        let t = tagger(vec![("a.jpg", vec![0.5, 0.45, 0.05], vec![0.9, 0.1])]);
        let sample = t.tag(Path::new("a.jpg")).unwrap();
        assert!(sample.uncertainty_for("angles").unwrap().entropy < 1.1);
        assert!(sample.needs_annotation);
    }

    #[test]
    fn test_unmapped_winner_is_unknown_but_counts_confidence() {
        let t = tagger(vec![("b.jpg", vec![1.0, 0.0, 0.0], vec![0.3, 0.7])]);
        let sample = t.tag(Path::new("b.jpg")).unwrap();
        assert_eq!(sample.brand.label, "Unknown");
        assert!((sample.brand.confidence - 0.7).abs() < 1e-12);
        assert_eq!(sample.auto_tags, vec!["4-正前"]);
        assert!((sample.confidence - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_probability_count_mismatch_is_error() {
        let t = tagger(vec![("c.jpg", vec![0.5, 0.5], vec![0.5, 0.5])]);
        let err = t.tag(Path::new("c.jpg")).unwrap_err();
        assert!(matches!(err, PipelineError::PromptMismatch { .. }));
    }

    #[test]
    fn test_batch_skips_failures() {
        let t = tagger(vec![
            ("ok.jpg", vec![0.34, 0.33, 0.33], vec![0.5, 0.5]),
            ("bad.jpg", vec![], vec![]),
        ]);
        let batch = t.tag_batch(&["ok.jpg", "bad.jpg", "missing.jpg"]);
        assert_eq!(batch.stats.succeeded, 1);
        assert_eq!(batch.stats.failed, 2);
        assert_eq!(batch.stats.flagged, 1);
        assert_eq!(batch.samples[0].image_id, "auto_ok");
    }
}
