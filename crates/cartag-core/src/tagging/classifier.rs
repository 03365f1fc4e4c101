//! The classifier capability the tagger depends on.
//!
//! A classifier turns one image and a list of text prompts into a probability
//! distribution over those prompts. Backbones (SigLIP, CLIP, ...) live behind
//! [`VisionClassifier`] so the tagger and the review selector never see them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::error::PipelineError;
use crate::math::{dot, l2_normalize_in_place, softmax};

/// Which vision-language backbone produced the embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierProvider {
    #[default]
    Siglip,
    Clip,
}

impl std::fmt::Display for ClassifierProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierProvider::Siglip => write!(f, "siglip"),
            ClassifierProvider::Clip => write!(f, "clip"),
        }
    }
}

/// Zero-shot classification over a prompt list.
pub trait VisionClassifier: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Probability of each prompt for the image, in prompt order.
    fn predict_probabilities(
        &self,
        image: &Path,
        prompts: &[String],
    ) -> Result<Vec<f64>, PipelineError>;
}

/// Default temperature applied to cosine similarities before softmax.
pub const DEFAULT_LOGIT_SCALE: f64 = 100.0;

/// Classifier over pre-computed image and prompt embeddings.
///
/// Probabilities are `softmax(logit_scale · cosine)` across the requested
/// prompts. Embeddings are L2-normalized on insert so the dot product is the
/// cosine similarity.
pub struct EmbeddingClassifier {
    provider: ClassifierProvider,
    name: String,
    logit_scale: f64,
    embedding_dim: usize,
    images: HashMap<PathBuf, Vec<f32>>,
    prompts: HashMap<String, Vec<f32>>,
}

impl EmbeddingClassifier {
    pub fn new(provider: ClassifierProvider, embedding_dim: usize, logit_scale: f64) -> Self {
        Self {
            provider,
            name: format!("{provider}-embeddings"),
            logit_scale,
            embedding_dim,
            images: HashMap::new(),
            prompts: HashMap::new(),
        }
    }

    /// Create an empty classifier with the provider and logit scale from config.
    pub fn from_config(config: &ClassifierConfig, embedding_dim: usize) -> Self {
        Self::new(config.provider, embedding_dim, config.logit_scale)
    }

    /// Backbone that produced the embeddings.
    pub fn provider(&self) -> ClassifierProvider {
        self.provider
    }

    /// Register an image embedding.
    pub fn insert_image(
        &mut self,
        path: impl Into<PathBuf>,
        embedding: Vec<f32>,
    ) -> Result<(), PipelineError> {
        let path = path.into();
        let embedding = self.normalized(embedding, &path.display().to_string())?;
        self.images.insert(path, embedding);
        Ok(())
    }

    /// Register a prompt's text embedding.
    pub fn insert_prompt(
        &mut self,
        prompt: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Result<(), PipelineError> {
        let prompt = prompt.into();
        let embedding = self.normalized(embedding, &prompt)?;
        self.prompts.insert(prompt, embedding);
        Ok(())
    }

    /// Number of registered images.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    fn normalized(&self, mut embedding: Vec<f32>, what: &str) -> Result<Vec<f32>, PipelineError> {
        if embedding.len() != self.embedding_dim {
            return Err(PipelineError::Model {
                message: format!(
                    "Embedding for '{what}' has {} dims, expected {}",
                    embedding.len(),
                    self.embedding_dim
                ),
            });
        }
        l2_normalize_in_place(&mut embedding);
        Ok(embedding)
    }
}

impl VisionClassifier for EmbeddingClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_probabilities(
        &self,
        image: &Path,
        prompts: &[String],
    ) -> Result<Vec<f64>, PipelineError> {
        let image_embedding = self.images.get(image).ok_or_else(|| PipelineError::Classify {
            path: image.to_path_buf(),
            message: "no embedding registered for image".to_string(),
        })?;

        let logits = prompts
            .iter()
            .map(|prompt| {
                self.prompts
                    .get(prompt)
                    .map(|text| self.logit_scale * dot(image_embedding, text))
                    .ok_or_else(|| PipelineError::Classify {
                        path: image.to_path_buf(),
                        message: format!("no embedding registered for prompt '{prompt}'"),
                    })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        Ok(softmax(&logits))
    }
}
