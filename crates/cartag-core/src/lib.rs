//! cartag core - uncertainty-driven review for zero-shot car photo tagging.
//!
//! A vision-language classifier scores each photo against prompt tables for
//! angle, brand, style, color and interior part. The per-category probability
//! distributions are kept, reduced to uncertainty scores, and used to pick the
//! samples an annotator should look at first.
//!
//! ```text
//! Images → Classify → Resolve labels + Uncertainty → Samples → Review queue
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use cartag_core::{Config, ReviewQueue, Tagger};
//!
//! fn main() -> cartag_core::Result<()> {
//!     let config = Config::load()?;
//!     let tagger = Tagger::from_config(my_classifier(), &config);
//!
//!     let batch = tagger.tag_directory("./brand_images".as_ref(), &config);
//!     let queue = ReviewQueue::build("brand_images", &batch.samples, &config.review_policy());
//!     queue.save(&config.review_queue_path())?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod math;
pub mod output;
pub mod records;
pub mod review;
pub mod tagging;
pub mod types;
pub mod uncertainty;

// Re-exports for convenient access
pub use config::Config;
pub use error::{CartagError, ConfigError, PipelineError, PipelineResult, Result};
pub use output::{OutputFormat, OutputWriter};
pub use records::{load_samples, save_samples, save_samples_with_config, LoadedSamples};
pub use review::{select_for_review, ReviewPolicy, ReviewQueue, ReviewSummary, Reviewable};
pub use tagging::{EmbeddingClassifier, PromptBank, TagBatch, Tagger, VisionClassifier};
pub use types::{ResolvedLabel, Sample, TagStats, TopPrompt};
pub use uncertainty::{
    compute_uncertainty, entropy, margin, max_confidence, ProbabilityDistribution,
    UncertaintyScores,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
