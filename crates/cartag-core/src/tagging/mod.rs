//! Zero-shot car photo tagging.
//!
//! Each image is scored against every prompt category; the winning prompt is
//! resolved to a canonical label and the full distribution is kept so the
//! review selector can rank uncertain samples later.

pub mod classifier;
pub mod discovery;
pub mod prompts;
pub mod tagger;

pub use classifier::{ClassifierProvider, EmbeddingClassifier, VisionClassifier};
pub use discovery::ImageDiscovery;
pub use prompts::{CategoryPrompts, PromptBank, PromptCategoryConfig, PromptConfig, PromptEntry};
pub use tagger::{TagBatch, Tagger};
