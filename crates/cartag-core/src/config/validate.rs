//! Configuration validation with range checks.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let al = &self.active_learning;
        if !al.entropy_threshold.is_finite() {
            return Err(ConfigError::ValidationError(
                "active_learning.entropy_threshold must be finite".into(),
            ));
        }
        if !al.margin_threshold.is_finite() {
            return Err(ConfigError::ValidationError(
                "active_learning.margin_threshold must be finite".into(),
            ));
        }
        if al.max_items == 0 {
            return Err(ConfigError::ValidationError(
                "active_learning.max_items must be > 0".into(),
            ));
        }
        if self.classifier.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "classifier.top_k must be > 0".into(),
            ));
        }
        if !(self.classifier.logit_scale.is_finite() && self.classifier.logit_scale > 0.0) {
            return Err(ConfigError::ValidationError(
                "classifier.logit_scale must be > 0".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format '{}' must be json or jsonl",
                self.output.format
            )));
        }

        for category in &self.prompts.categories {
            if category.prompts.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "prompt category '{}' has no prompts",
                    category.name
                )));
            }
            let mut seen = HashSet::new();
            for entry in &category.prompts {
                if !seen.insert(entry.text.as_str()) {
                    return Err(ConfigError::ValidationError(format!(
                        "prompt '{}' appears twice in category '{}'",
                        entry.text, category.name
                    )));
                }
            }
        }

        if !self
            .prompts
            .categories
            .iter()
            .any(|c| c.name == al.gating_category)
        {
            return Err(ConfigError::ValidationError(format!(
                "active_learning.gating_category '{}' is not a prompt category",
                al.gating_category
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PromptEntry;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan_threshold() {
        let mut config = Config::default();
        config.active_learning.entropy_threshold = f64::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("entropy_threshold"));
    }

    #[test]
    fn test_validate_accepts_disabled_margin_gate() {
        let mut config = Config::default();
        config.active_learning.margin_threshold = -1.0;
        assert!(config.validate().is_ok());
        assert!(!config.annotation_gate().margin_gate_enabled());
    }

    #[test]
    fn test_validate_rejects_unknown_output_format() {
        let mut config = Config::default();
        config.output.format = "csv".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.format"));
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let mut config = Config::default();
        config.classifier.top_k = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }

    #[test]
    fn test_validate_rejects_nonpositive_logit_scale() {
        let mut config = Config::default();
        config.classifier.logit_scale = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logit_scale"));
    }

    #[test]
    fn test_validate_rejects_empty_category() {
        let mut config = Config::default();
        config.prompts.categories[1].prompts.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("has no prompts"));
    }

    #[test]
    fn test_validate_rejects_duplicate_prompt() {
        let mut config = Config::default();
        let dup: PromptEntry = config.prompts.categories[0].prompts[0].clone();
        config.prompts.categories[0].prompts.push(dup);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("appears twice"));
    }

    #[test]
    fn test_validate_rejects_unknown_gating_category() {
        let mut config = Config::default();
        config.active_learning.gating_category = "wheels".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("wheels"));
    }
}
