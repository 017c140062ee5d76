//! Per-container field extraction: name, description, sizes and image

use tracing::warn;
use url::Url;

use crate::dom::{collapse_whitespace, DocumentNode};

use super::patterns::Fragment;

/// Description paragraphs and the size listing pulled from a text region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub description: String,
    pub available_sizes: Vec<String>,
}

/// Title text from the content region, falling back to the whole container.
pub fn product_name<N: DocumentNode>(container: &N, content: &N, title: &N::Query) -> String {
    content
        .find_first(title)
        .or_else(|| container.find_first(title))
        .map(|el| collapse_whitespace(&el.inner_text()))
        .unwrap_or_default()
}

/// Split the text region's paragraphs into description and sizes.
pub fn text_block<N: DocumentNode>(
    content: &N,
    text_region: &N::Query,
    paragraphs: &N::Query,
    size_markers: &[Fragment],
) -> TextBlock {
    let Some(region) = content.find_first(text_region) else {
        return TextBlock::default();
    };

    let mut block = TextBlock::default();
    let mut parts = Vec::new();

    // A paragraph nested in another match is already part of its text
    let matched = region.find_all(paragraphs);
    let outermost = matched
        .iter()
        .filter(|p| !matched.iter().any(|outer| p.is_descendant_of(outer)));

    for paragraph in outermost {
        let text = paragraph.inner_text();
        match strip_size_marker(&text, size_markers) {
            Some(rest) => block.available_sizes = split_sizes(rest),
            None => {
                let flat = collapse_whitespace(&text);
                if !flat.is_empty() {
                    parts.push(flat);
                }
            }
        }
    }

    block.description = collapse_whitespace(&parts.join(" "));
    block
}

/// Text after the first size marker found, if any marker is present.
fn strip_size_marker<'t>(text: &'t str, markers: &[Fragment]) -> Option<&'t str> {
    markers
        .iter()
        .find_map(|marker| marker.find(text))
        .map(|range| &text[range.end..])
}

/// Size entries separated by commas or line breaks.
pub fn split_sizes(text: &str) -> Vec<String> {
    text.split([',', '，', '、', '\n'])
        .map(|s| s.trim().trim_start_matches([':', '：']).trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Absolute image URL from the first populated `src`-like attribute.
pub fn image_link<N: DocumentNode>(
    container: &N,
    image: &N::Query,
    attributes: &[String],
    origin: Option<&Url>,
) -> String {
    container
        .find_first(image)
        .and_then(|img| {
            attributes
                .iter()
                .filter_map(|name| img.attribute(name))
                .find(|value| !value.trim().is_empty())
        })
        .map(|src| resolve_url(&src, origin))
        .unwrap_or_default()
}

/// Resolve `src` against the page origin. Unresolvable input yields an empty
/// string; without an origin only already-absolute URLs survive.
pub fn resolve_url(src: &str, origin: Option<&Url>) -> String {
    let src = src.trim();
    if src.is_empty() {
        return String::new();
    }

    let resolved = match origin {
        Some(base) => base.join(src),
        None => Url::parse(src),
    };

    match resolved {
        Ok(url) => url.to_string(),
        Err(e) => {
            warn!(src, error = %e, "could not resolve image url");
            String::new()
        }
    }
}
