//! Nutrition facts scraper for multi-locale product pages
//!
//! Extracts structured product records from an already-loaded page:
//! - Product name, description, available sizes and image link
//! - Nutrition rows matched by localized labels (Vietnamese, Japanese, English)
//! - Ingredients lists from labeled rows or headed paragraphs
//!
//! Exposed to hosts through a Rust API, an FFI interface and JSON export.

pub mod config;
pub mod dom;
pub mod error;
pub mod export;
pub mod extractors;
pub mod ffi;
pub mod host;
pub mod model;

pub use config::{ExtractorConfig, FieldKey};
pub use error::{ExtractError, Result};
pub use extractors::ProductExtractor;
pub use ffi::*;
pub use host::{invoke, InvocationOutcome, PageContext};
pub use model::{Nutrient, NutritionFacts, ProductRecord, Sugars};
