//! Host invocation contract
//!
//! The host hands over the active page (its URL and loaded markup) and gets
//! back either the product list or a single descriptive failure.

use std::fmt;

use tracing::{info, warn};
use url::Url;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};
use crate::extractors::ProductExtractor;
use crate::model::ProductRecord;

/// Schemes of browser-internal pages that must never be scraped
const RESTRICTED_SCHEMES: &[&str] = &[
    "chrome",
    "chrome-extension",
    "about",
    "edge",
    "view-source",
    "devtools",
];

/// What the host knows about the active page
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub url: Option<String>,
    pub html: Option<String>,
}

impl PageContext {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            html: Some(html.into()),
        }
    }
}

/// Summary of a successful run, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    Products(usize),
    NoProducts,
}

impl InvocationOutcome {
    pub fn from_records(records: &[ProductRecord]) -> Self {
        match records.len() {
            0 => InvocationOutcome::NoProducts,
            n => InvocationOutcome::Products(n),
        }
    }

    /// Export is only offered when something was found.
    pub fn can_export(&self) -> bool {
        matches!(self, InvocationOutcome::Products(_))
    }
}

impl fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationOutcome::Products(1) => write!(f, "Extracted 1 product."),
            InvocationOutcome::Products(n) => write!(f, "Extracted {} products.", n),
            InvocationOutcome::NoProducts => write!(
                f,
                "No products found on this page with a recognizable structure."
            ),
        }
    }
}

/// Run extraction for the page the host supplied.
pub fn invoke(page: &PageContext, config: &ExtractorConfig) -> Result<Vec<ProductRecord>> {
    let html = page.html.as_deref().ok_or(ExtractError::NoActivePage)?;

    let origin = match page.url.as_deref() {
        Some(url) => {
            if is_restricted(url) {
                return Err(ExtractError::RestrictedPage {
                    url: url.to_string(),
                });
            }
            page_origin(url)
        }
        None => None,
    };

    info!(url = page.url.as_deref().unwrap_or("<unknown>"), "extracting products");

    let mut extractor = ProductExtractor::new(config.clone());
    if let Some(origin) = origin {
        extractor = extractor.with_origin(origin);
    }
    extractor.extract_html(html)
}

/// True for browser-internal pages.
pub fn is_restricted(url: &str) -> bool {
    let scheme = match Url::parse(url) {
        Ok(parsed) => parsed.scheme().to_string(),
        Err(_) => match url.split_once(':') {
            Some((scheme, _)) => scheme.trim().to_ascii_lowercase(),
            None => return false,
        },
    };
    RESTRICTED_SCHEMES.contains(&scheme.as_str())
}

/// `scheme://host[:port]` of a page URL; `None` for opaque or invalid URLs.
pub fn page_origin(url: &str) -> Option<Url> {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            warn!(url, error = %e, "page url is not valid, relative links will be dropped");
            return None;
        }
    };

    let origin = parsed.origin();
    if !origin.is_tuple() {
        return None;
    }
    Url::parse(&origin.ascii_serialization()).ok()
}
