//! Error types for the extraction engine
//!
//! Missing elements, rows and unparseable numbers never surface here; they
//! become zero values on the record. Only invocation-level failures and bad
//! configuration are errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no active page to extract from")]
    NoActivePage,

    #[error("cannot run on restricted page: {url}")]
    RestrictedPage { url: String },

    #[error("invalid label or marker pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("failed to serialize products: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
