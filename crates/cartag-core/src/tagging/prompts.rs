//! Prompt bank for zero-shot car attribute classification.
//!
//! Each category (angle, brand, style, ...) owns an ordered list of text
//! prompts scored against the image, plus an optional mapping from prompt to
//! the canonical dataset label it stands for. Several prompts may share a
//! label (e.g. "car interior" and "car dashboard" both mean `10-内饰`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{
    CATEGORY_ANGLES, CATEGORY_BRANDS, CATEGORY_INTERIOR, CATEGORY_STYLES, UNKNOWN_LABEL,
};

/// One prompt and the canonical label it resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptEntry {
    /// Text scored by the vision-language model
    pub text: String,

    /// Canonical dataset label; prompts without one resolve to "Unknown"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PromptEntry {
    fn mapped(text: &str, label: &str) -> Self {
        Self {
            text: text.to_string(),
            label: Some(label.to_string()),
        }
    }

    fn unmapped(text: &str) -> Self {
        Self {
            text: text.to_string(),
            label: None,
        }
    }
}

/// Prompts for a single attribute category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptCategoryConfig {
    /// Category key ("angles", "brands", ...)
    pub name: String,

    /// Prompts in scoring order
    pub prompts: Vec<PromptEntry>,
}

/// Prompt tables for every category, in scoring order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub categories: Vec<PromptCategoryConfig>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        let category = |name: &str, prompts: Vec<PromptEntry>| PromptCategoryConfig {
            name: name.to_string(),
            prompts,
        };

        let angles = [
            ("front view of a car", "4-正前"),
            ("rear view of a car", "5-正后"),
            ("side view of a car", "2-正侧"),
            ("45 degree front angle of a car", "1-前45"),
            ("45 degree rear angle of a car", "3-后45"),
            ("car interior", "10-内饰"),
            ("car dashboard", "10-内饰"),
            ("car steering wheel", "11-方向盘"),
            ("car seats", "14-座椅"),
            ("car headlights", "6-头灯"),
            ("car taillights", "7-尾灯"),
            ("car grille", "8-格栅"),
            ("car wheels", "8-轮毂"),
            ("car spoiler", "9-尾翼"),
            ("car console", "13-CONSOLE"),
            ("car door panel", "15-门板"),
            ("car sunroof", "17-天窗"),
            ("car trunk", "18-后备箱"),
            ("car front trunk", "19-前备箱"),
            ("car air vents", "20-出风口"),
            ("car instrument panel", "21-仪表屏"),
            ("car diffuser", "22-扩散器"),
            ("car C-pillar", "23-C柱"),
            ("car charging port", "24-充电口"),
        ];

        let brands = [
            "Cadillac", "Ferrari", "Honda", "MINI", "Nissan", "Porsche", "Smart", "Toyota",
        ];

        let styles = [
            ("electric car", "新能源"),
            ("hybrid car", "新能源"),
            ("sports car", "运动"),
            ("luxury car", "豪华"),
            ("concept car", "概念车"),
            ("vintage car", "复古"),
            ("modern car", "现代"),
            ("classic car", "经典"),
            ("business car", "商务"),
            ("family car", "家用"),
            ("off-road car", "越野"),
            ("racing car", "跑车"),
            ("SUV car", "SUV"),
            ("sedan car", "轿车"),
            ("hatchback car", "掀背车"),
            ("convertible car", "敞篷车"),
        ];

        let colors = [
            "black car",
            "white car",
            "silver car",
            "gray car",
            "red car",
            "blue car",
            "green car",
            "yellow car",
            "orange car",
            "purple car",
            "brown car",
            "gold car",
            "champagne car",
            "pearl white car",
        ];

        let interior = [
            ("close up of a car gear shifter", "16-球头"),
            ("car gear knob detail", "16-球头"),
            ("luxury car gear lever", "16-旋钮"),
            ("close up of car steering wheel controls", "11-方向盘"),
            ("car drive mode dial", "16-旋钮"),
            ("close up of car seat stitching", "14-座椅"),
            ("close up of car door trim", "15-门板"),
            ("car climate control vent detail", "20-出风口"),
        ];

        Self {
            categories: vec![
                category(
                    CATEGORY_ANGLES,
                    angles.iter().map(|(t, l)| PromptEntry::mapped(t, l)).collect(),
                ),
                category(
                    CATEGORY_BRANDS,
                    brands
                        .iter()
                        .map(|b| PromptEntry::mapped(&format!("{b} car"), b))
                        .collect(),
                ),
                category(
                    CATEGORY_STYLES,
                    styles.iter().map(|(t, l)| PromptEntry::mapped(t, l)).collect(),
                ),
                category("colors", colors.iter().map(|t| PromptEntry::unmapped(t)).collect()),
                category(
                    CATEGORY_INTERIOR,
                    interior.iter().map(|(t, l)| PromptEntry::mapped(t, l)).collect(),
                ),
            ],
        }
    }
}

/// A category's prompts ready for scoring.
#[derive(Debug, Clone)]
pub struct CategoryPrompts {
    pub name: String,
    pub prompts: Vec<String>,
    labels: HashMap<String, String>,
}

/// The full set of categories the tagger scores, in order.
#[derive(Debug, Clone)]
pub struct PromptBank {
    categories: Vec<CategoryPrompts>,
}

impl PromptBank {
    /// Build a prompt bank from configuration.
    pub fn from_config(config: &PromptConfig) -> Self {
        let categories = config
            .categories
            .iter()
            .map(|c| CategoryPrompts {
                name: c.name.clone(),
                prompts: c.prompts.iter().map(|p| p.text.clone()).collect(),
                labels: c
                    .prompts
                    .iter()
                    .filter_map(|p| p.label.clone().map(|l| (p.text.clone(), l)))
                    .collect(),
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "Prompt bank: {} categories, {} prompts",
            categories.len(),
            categories.iter().map(|c| c.prompts.len()).sum::<usize>()
        );

        Self { categories }
    }

    /// All categories in scoring order.
    pub fn categories(&self) -> &[CategoryPrompts] {
        &self.categories
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&CategoryPrompts> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Canonical label for a prompt, or "Unknown" when unmapped.
    pub fn resolve(&self, category: &str, prompt: &str) -> &str {
        self.category(category)
            .and_then(|c| c.labels.get(prompt))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LABEL)
    }

    /// Total number of prompts across all categories.
    pub fn prompt_count(&self) -> usize {
        self.categories.iter().map(|c| c.prompts.len()).sum()
    }
}

impl Default for PromptBank {
    fn default() -> Self {
        Self::from_config(&PromptConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_category_sizes() {
        let bank = PromptBank::default();
        let sizes: Vec<(&str, usize)> = bank
            .categories()
            .iter()
            .map(|c| (c.name.as_str(), c.prompts.len()))
            .collect();
        assert_eq!(
            sizes,
            vec![
                ("angles", 24),
                ("brands", 8),
                ("styles", 16),
                ("colors", 14),
                ("interior_parts", 8),
            ]
        );
        assert_eq!(bank.prompt_count(), 70);
    }

    #[test]
    fn test_resolve_shared_label() {
        let bank = PromptBank::default();
        assert_eq!(bank.resolve("angles", "car interior"), "10-内饰");
        assert_eq!(bank.resolve("angles", "car dashboard"), "10-内饰");
        assert_eq!(bank.resolve("brands", "Porsche car"), "Porsche");
    }

    #[test]
    fn test_resolve_unmapped_is_unknown() {
        let bank = PromptBank::default();
        assert_eq!(bank.resolve("colors", "red car"), "Unknown");
        assert_eq!(bank.resolve("angles", "a photo of a boat"), "Unknown");
        assert_eq!(bank.resolve("missing", "front view of a car"), "Unknown");
    }

    #[test]
    fn test_custom_vocabulary() {
        let config = PromptConfig {
            categories: vec![PromptCategoryConfig {
                name: "angles".to_string(),
                prompts: vec![
                    PromptEntry::mapped("top view", "top"),
                    PromptEntry::unmapped("blurry photo"),
                ],
            }],
        };
        let bank = PromptBank::from_config(&config);
        assert_eq!(bank.categories().len(), 1);
        assert_eq!(bank.resolve("angles", "top view"), "top");
        assert_eq!(bank.resolve("angles", "blurry photo"), "Unknown");
        assert!(bank.category("brands").is_none());
    }
}
