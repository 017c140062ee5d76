//! Localized row label matching
//!
//! Each nutrition row is classified once against the whole label table.
//! A row belongs to the field whose candidate fragment matches the longest
//! stretch of its label, so "CHẤT BỘT ĐƯỜNG" is carbohydrate even though it
//! also contains the sugar fragment "ĐƯỜNG". A row never serves two fields.

use tracing::trace;

use crate::config::FieldKey;
use crate::dom::{collapse_whitespace, DocumentNode};

use super::patterns::LabelPatterns;

/// Classified rows of one nutrition region, in document order
pub struct LabelMatcher<N> {
    rows: Vec<ClassifiedRow<N>>,
}

struct ClassifiedRow<N> {
    node: N,
    text: String,
    field: Option<FieldKey>,
}

impl<N: DocumentNode> LabelMatcher<N> {
    pub fn new(region: &N, row: &N::Query, label: &N::Query, labels: &LabelPatterns) -> Self {
        let rows = region
            .find_all(row)
            .into_iter()
            .map(|node| {
                let field = node
                    .find_first(label)
                    .and_then(|cell| labels.classify(&collapse_whitespace(&cell.inner_text())));
                if let Some(key) = field {
                    trace!(?key, "matched nutrition row");
                }
                let text = node.inner_text();
                ClassifiedRow { node, text, field }
            })
            .collect();

        Self { rows }
    }

    /// First row (document order) resolved to `key`.
    pub fn row_for(&self, key: FieldKey) -> Option<&N> {
        self.rows
            .iter()
            .find(|row| row.field == Some(key))
            .map(|row| &row.node)
    }

    /// Every row with its full rendered text.
    pub fn rows(&self) -> impl Iterator<Item = (&N, &str)> {
        self.rows.iter().map(|row| (&row.node, row.text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
