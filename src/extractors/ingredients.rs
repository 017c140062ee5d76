//! Ingredients section lookup and list splitting

use tracing::debug;

use crate::config::FieldKey;
use crate::dom::{collapse_whitespace, DocumentNode};

use super::labels::LabelMatcher;
use super::patterns::Fragment;
use super::values::value_text;

/// Raw ingredients text, trying the labeled row first and then a heading
/// followed by a paragraph.
pub fn ingredients_text<N: DocumentNode>(
    region: &N,
    matcher: &LabelMatcher<N>,
    value_cells: &[N::Query],
    heading: &N::Query,
    paragraph_tag: &str,
    headers: &[Fragment],
) -> Option<String> {
    let from_row = matcher
        .row_for(FieldKey::Ingredients)
        .and_then(|row| row.next_element_sibling())
        .and_then(|next| value_text(&next, value_cells));
    if from_row.is_some() {
        return from_row;
    }

    let header = region.find_all(heading).into_iter().find(|h| {
        let text = collapse_whitespace(&h.inner_text());
        headers.iter().any(|header| header.is_match(&text))
    })?;

    let next = header.next_element_sibling()?;
    if !next.tag_name().eq_ignore_ascii_case(paragraph_tag) {
        debug!(tag = next.tag_name(), "ingredients heading not followed by a paragraph");
        return None;
    }

    Some(next.inner_text())
}

/// Split ingredients text into trimmed, non-empty entries.
///
/// Only the first line counts. A single trailing period is dropped, and
/// commas (ASCII or full-width), ideographic commas and en-dashes separate
/// entries.
pub fn split_ingredients(text: &str) -> Vec<String> {
    let first_line = text.lines().next().unwrap_or("");
    let normalized = first_line.replace('，', ",");
    let trimmed = normalized.trim();
    let trimmed = trimmed
        .strip_suffix('.')
        .or_else(|| trimmed.strip_suffix('。'))
        .unwrap_or(trimmed);

    trimmed
        .split([',', '、', '–'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelTable;
    use crate::dom::document_root;
    use crate::extractors::patterns::{compile_fragments, LabelPatterns};
    use scraper::{ElementRef, Html};

    fn labels() -> LabelPatterns {
        LabelPatterns::compile(&LabelTable::default()).unwrap()
    }

    #[test]
    fn test_split_trailing_period() {
        assert_eq!(
            split_ingredients("Water, Sugar, Caffeine."),
            vec!["Water", "Sugar", "Caffeine"]
        );
    }

    #[test]
    fn test_split_ideographic() {
        assert_eq!(
            split_ingredients("水、砂糖、カフェイン"),
            vec!["水", "砂糖", "カフェイン"]
        );
        assert_eq!(
            split_ingredients("果糖ぶどう糖液糖，炭酸 – 香料。"),
            vec!["果糖ぶどう糖液糖", "炭酸", "香料"]
        );
    }

    #[test]
    fn test_split_first_line_only() {
        assert_eq!(
            split_ingredients("Nước bão hòa CO2, đường mía\nSản xuất tại Việt Nam"),
            vec!["Nước bão hòa CO2", "đường mía"]
        );
        assert!(split_ingredients(" , ,. ").is_empty());
        assert!(split_ingredients("").is_empty());
    }

    fn queries() -> (
        scraper::Selector,
        scraper::Selector,
        Vec<scraper::Selector>,
        scraper::Selector,
    ) {
        (
            ElementRef::compile(".nutritional-information__row").unwrap(),
            ElementRef::compile(".column1").unwrap(),
            vec![ElementRef::compile(".column3").unwrap()],
            ElementRef::compile("h3").unwrap(),
        )
    }

    #[test]
    fn test_ingredients_from_labeled_row() {
        let html = Html::parse_fragment(
            r#"
            <div class="nutritional-information">
                <div class="nutritional-information__row"><div class="column1">原材料名</div></div>
                <div class="nutritional-information__row"><div class="column3">水、砂糖、カフェイン</div></div>
            </div>
            "#,
        );
        let root = document_root(&html);
        let (row, label, values, heading) = queries();
        let labels = labels();
        let headers = labels.fragments(FieldKey::Ingredients);
        let matcher = LabelMatcher::new(&root, &row, &label, &labels);

        let text = ingredients_text(&root, &matcher, &values, &heading, "p", headers);
        assert_eq!(text.as_deref(), Some("水、砂糖、カフェイン"));
    }

    #[test]
    fn test_ingredients_from_heading() {
        let html = Html::parse_fragment(
            r#"
            <div class="nutritional-information">
                <h3>Thành phần</h3>
                <p>Nước bão hòa CO2, đường mía, màu tự nhiên (150d).</p>
            </div>
            "#,
        );
        let root = document_root(&html);
        let (row, label, values, heading) = queries();
        let labels = labels();
        let headers = labels.fragments(FieldKey::Ingredients);
        let matcher = LabelMatcher::new(&root, &row, &label, &labels);

        let text = ingredients_text(&root, &matcher, &values, &heading, "p", headers).unwrap();
        assert_eq!(
            split_ingredients(&text),
            vec!["Nước bão hòa CO2", "đường mía", "màu tự nhiên (150d)"]
        );
    }

    #[test]
    fn test_heading_must_precede_paragraph() {
        let html = Html::parse_fragment(
            r#"<div><h3>Ingredients</h3><ul><li>Water</li></ul></div>"#,
        );
        let root = document_root(&html);
        let (row, label, values, heading) = queries();
        let headers = compile_fragments(&["Ingredients".to_string()]).unwrap();
        let matcher = LabelMatcher::new(&root, &row, &label, &labels());

        assert_eq!(
            ingredients_text(&root, &matcher, &values, &heading, "p", &headers),
            None
        );
    }
}
