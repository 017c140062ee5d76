//! Value cleaning and numeric parsing for nutrition rows

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{collapse_whitespace, DocumentNode};
use crate::model::Nutrient;

use super::labels::LabelMatcher;
use super::patterns::Fragment;

static LEADING_NON_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^0-9]+").unwrap());
static NUMERIC_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9.,]+").unwrap());
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());
static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9]+(?:[.,][0-9]+)?\s*(?:kcal|ml|mg|kg|oz|g|l)?").unwrap()
});

/// Clean a raw value cell into a bare number string.
///
/// `"≤12,5 g"` becomes `"12.5"`, `"5g （1%）"` becomes `"5"`. Returns `None`
/// when nothing numeric is left.
pub fn clean_value(raw: &str) -> Option<String> {
    let normalized = normalize_width(raw);

    // Drop annotations: everything from the first opening bracket on
    let unannotated = match normalized.find(['(', '[']) {
        Some(pos) => &normalized[..pos],
        None => normalized.as_str(),
    };

    // Leading inequality markers and other non-digits
    let unprefixed = LEADING_NON_DIGITS_RE.replace(unannotated, "");

    // First space-separated token, then only its leading numeric run
    let token = unprefixed.split_whitespace().next().unwrap_or("");
    let numeric = NUMERIC_RUN_RE.find(token).map_or("", |m| m.as_str());

    // Only the first comma is a decimal separator; anything from a second
    // one on is dropped
    let decimal = numeric.replacen(',', ".", 1);
    let cleaned = decimal.split(',').next().unwrap_or("");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Parse a cleaned value as a float. Anything unparseable is `None`.
pub fn parse_number(cleaned: Option<&str>) -> Option<f64> {
    cleaned?.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// First run of digits in `text`, as an integer.
pub fn first_integer(text: &str) -> Option<u32> {
    let normalized = normalize_width(text);
    DIGITS_RE.find(&normalized)?.as_str().parse().ok()
}

/// Daily-value text is kept only when it carries a percent sign.
pub fn daily_value(text: &str) -> String {
    if text.contains('%') || text.contains('％') {
        collapse_whitespace(text)
    } else {
        String::new()
    }
}

/// Text of the first value cell (in configured order) that has any.
pub fn value_text<N: DocumentNode>(row: &N, value_cells: &[N::Query]) -> Option<String> {
    value_cells
        .iter()
        .filter_map(|query| row.find_first(query))
        .map(|cell| collapse_whitespace(&cell.inner_text()))
        .find(|text| !text.is_empty())
}

/// Value and daily value of a matched row; zero values when unmatched.
pub fn nutrient<N: DocumentNode>(
    row: Option<&N>,
    value_cells: &[N::Query],
    daily_value_cell: &N::Query,
) -> Nutrient {
    let Some(row) = row else {
        return Nutrient::default();
    };

    let cleaned = value_text(row, value_cells).and_then(|text| clean_value(&text));
    let daily = row
        .find_first(daily_value_cell)
        .map(|cell| daily_value(&cell.inner_text()))
        .unwrap_or_default();

    Nutrient {
        value: parse_number(cleaned.as_deref()),
        daily_value: daily,
    }
}

/// Serving size from the row matching the most specific marker.
///
/// Markers are tried in configured order and the first row (document order)
/// containing the current marker wins; later rows never overwrite it. The
/// value cell is preferred. Without one, the row text is searched for a
/// quantity: after the marker (`Serving Size: 1 can`), else the last one
/// before it (`100ml当たり`).
pub fn serving_size<N: DocumentNode>(
    matcher: &LabelMatcher<N>,
    markers: &[Fragment],
    value_cells: &[N::Query],
) -> String {
    for marker in markers {
        let Some((row, text)) = matcher.rows().find(|(_, text)| marker.is_match(text)) else {
            continue;
        };

        if let Some(value) = value_text(row, value_cells) {
            return value;
        }

        let flat = normalize_width(&collapse_whitespace(text));
        if let Some(range) = marker.find(&flat) {
            return quantity_near_marker(&flat, range.start, range.end);
        }
    }

    String::new()
}

fn quantity_near_marker(text: &str, start: usize, end: usize) -> String {
    let after = text[end..]
        .trim_start_matches([':', '：', ')', '）', ']', '］', ' '])
        .trim();
    if after.chars().any(|c| c.is_ascii_digit()) {
        return after.to_string();
    }

    QUANTITY_RE
        .find_iter(&text[..start])
        .last()
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

pub fn servings_per_container<N: DocumentNode>(
    matcher: &LabelMatcher<N>,
    markers: &[Fragment],
) -> Option<u32> {
    markers.iter().find_map(|marker| {
        matcher
            .rows()
            .find(|(_, text)| marker.is_match(text))
            .and_then(|(_, text)| first_integer(text))
    })
}

/// Fold full-width digits and punctuation to ASCII.
fn normalize_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            '．' => '.',
            '，' => ',',
            '（' => '(',
            '［' => '[',
            c => c,
        })
        .collect()
}
