//! Extractor configuration
//!
//! Selectors, locale label tables and marker phrases. Every field has a
//! default matching the supported product pages, and a partial JSON
//! document can override any subset of them. Label lists are overridden
//! per field: `{"labels": {"calories": ["Energía"]}}` replaces only the
//! calorie fragments, and an empty list disables a field.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

/// Canonical field a localized row label can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Calories,
    Protein,
    TotalFat,
    TotalCarbohydrate,
    Sodium,
    TotalSugars,
    IncludesAddedSugars,
    Ingredients,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExtractorConfig {
    pub selectors: SelectorConfig,
    pub labels: LabelTable,
    pub markers: MarkerConfig,
}

impl ExtractorConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ExtractError::Config(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }
}

/// CSS selectors describing the page's structural contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One match per product
    pub container: String,
    /// Inner content region; the container itself is used when absent
    pub content: String,
    pub title: String,
    /// Region holding description and size paragraphs
    pub text_region: String,
    /// Paragraph-like elements inside the text region
    pub paragraphs: String,
    pub image: String,
    /// `src`-equivalent attributes tried in order
    pub image_attributes: Vec<String>,
    pub nutrition: String,
    pub row: String,
    pub label_cell: String,
    /// Value cells tried in order; the first with text wins
    pub value_cells: Vec<String>,
    pub daily_value_cell: String,
    pub ingredients_heading: String,
    /// Tag the element after an ingredients heading must have
    pub ingredients_paragraph_tag: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: "div.product-information".to_string(),
            content: ".product-information__content".to_string(),
            title: "h3.cmp-title__text".to_string(),
            text_region: ".text:not(.footer__mobile-accordion)".to_string(),
            paragraphs: "p, label".to_string(),
            image: "img.cmp-image__image".to_string(),
            image_attributes: vec!["src".to_string(), "data-src".to_string()],
            nutrition: ".nutritional-information".to_string(),
            row: ".nutritional-information__row".to_string(),
            label_cell: ".column1".to_string(),
            value_cells: vec![".column3".to_string(), ".column2".to_string()],
            daily_value_cell: ".column4".to_string(),
            ingredients_heading: "h3".to_string(),
            ingredients_paragraph_tag: "p".to_string(),
        }
    }
}

/// Field key → label fragments, union across locales. Adding a locale means
/// extending the lists, not adding code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<FieldKey, Vec<String>>",
    into = "BTreeMap<FieldKey, Vec<String>>"
)]
pub struct LabelTable(pub BTreeMap<FieldKey, Vec<String>>);

/// Keys present in the override replace the defaults; the rest are kept.
impl From<BTreeMap<FieldKey, Vec<String>>> for LabelTable {
    fn from(overrides: BTreeMap<FieldKey, Vec<String>>) -> Self {
        let mut table = LabelTable::default();
        table.0.extend(overrides);
        table
    }
}

impl From<LabelTable> for BTreeMap<FieldKey, Vec<String>> {
    fn from(table: LabelTable) -> Self {
        table.0
    }
}

impl LabelTable {
    pub fn candidates(&self, key: FieldKey) -> &[String] {
        self.0.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &[String])> {
        self.0.iter().map(|(key, names)| (*key, names.as_slice()))
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        let entries: [(FieldKey, &[&str]); 8] = [
            (FieldKey::Calories, &["NĂNG LƯỢNG", "エネルギー", "Calories"]),
            (FieldKey::Protein, &["CHẤT ĐẠM", "たんぱく質", "Protein"]),
            (FieldKey::TotalFat, &["CHẤT BÉO", "脂質", "Total Fat"]),
            (
                FieldKey::TotalCarbohydrate,
                &["CARBOHYDRATE", "CHẤT BỘT ĐƯỜNG", "炭水化物", "Total Carbohydrate"],
            ),
            (FieldKey::Sodium, &["NATRI", "食塩相当量", "Sodium"]),
            (FieldKey::TotalSugars, &["ĐƯỜNG", "Total Sugars"]),
            (FieldKey::IncludesAddedSugars, &["Includes Added Sugars"]),
            (FieldKey::Ingredients, &["Thành phần", "原材料名", "Ingredients"]),
        ];

        LabelTable(
            entries
                .iter()
                .map(|(key, names)| (*key, names.iter().map(|n| n.to_string()).collect()))
                .collect(),
        )
    }
}

/// Free-text marker phrases scanned in paragraphs and row text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub available_sizes: Vec<String>,
    /// Most specific first; the first marker with a matching row wins
    pub serving_size: Vec<String>,
    pub servings_per_container: Vec<String>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            available_sizes: vec![
                "Có các loại bao bì:".to_string(),
                "Available Sizes:".to_string(),
                "内容量:".to_string(),
                "内容量：".to_string(),
            ],
            serving_size: vec![
                "Serving Size".to_string(),
                "GIÁ TRỊ DINH DƯỠNG TRONG".to_string(),
                "当たり".to_string(),
            ],
            servings_per_container: vec![
                "Servings Per Container".to_string(),
                "per container".to_string(),
            ],
        }
    }
}
