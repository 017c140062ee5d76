//! JSON export of extracted products, and merging of per-page exports

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ExtractError, Result};
use crate::model::ProductRecord;

/// Fixed name of the downloadable artifact
pub const EXPORT_FILE_NAME: &str = "coca-cola-products.json";

/// Default name of the combined multi-page export
pub const MERGED_FILE_NAME: &str = "concatenated_products.json";

/// Market code in image paths such as `/content/dam/onexp/vn/...`
static COUNTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"onexp/([a-z]{2})/").unwrap());

/// A product tagged with the market its image was published for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryProduct {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub country: String,
}

/// Indented JSON, two spaces per level.
pub fn to_pretty_json(products: &[ProductRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(products)?)
}

/// Write `products` to [`EXPORT_FILE_NAME`] inside `dir`.
pub fn write_export(dir: &Path, products: &[ProductRecord]) -> Result<PathBuf> {
    if products.is_empty() {
        return Err(ExtractError::Config(
            "no data to export, extract a page first".to_string(),
        ));
    }

    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, to_pretty_json(products)?)?;
    info!(path = %path.display(), count = products.len(), "export written");
    Ok(path)
}

/// Two-letter market code from an image link, or `"unknown"`.
pub fn country_from_image_link(link: &str) -> String {
    COUNTRY_RE
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| "unknown".to_string(), |m| m.as_str().to_string())
}

/// Concatenate per-page exports in the given order, tagging every product
/// with its country. Missing or malformed files are skipped.
pub fn merge_exports<P: AsRef<Path>>(paths: &[P]) -> Vec<CountryProduct> {
    let mut merged = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let products = match read_export(path) {
            Ok(products) => products,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping export");
                continue;
            }
        };

        info!(path = %path.display(), count = products.len(), "merged export");
        merged.extend(products.into_iter().map(|product| CountryProduct {
            country: country_from_image_link(&product.product_image_link),
            product,
        }));
    }

    merged
}

fn read_export(path: &Path) -> Result<Vec<ProductRecord>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Number of merged products per country, sorted by country code.
pub fn country_counts(products: &[CountryProduct]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for product in products {
        *counts.entry(product.country.clone()).or_insert(0) += 1;
    }
    counts
}

/// Write a merged list as indented JSON to `path`.
pub fn write_merged(path: &Path, products: &[CountryProduct]) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(products)?)?;
    info!(path = %path.display(), count = products.len(), "merged export written");
    Ok(())
}
