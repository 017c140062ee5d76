//! Compiled label and marker patterns
//!
//! Every configured fragment becomes a case-insensitive literal regex. They
//! are compiled once per extraction, alongside the selectors.

use std::ops::Range;

use regex::Regex;

use crate::config::{ExtractorConfig, FieldKey, LabelTable};
use crate::error::Result;

/// One configured phrase, matched case-insensitively anywhere in a text
#[derive(Debug, Clone)]
pub struct Fragment {
    regex: Regex,
    chars: usize,
}

impl Fragment {
    /// `None` for a blank phrase, which would otherwise match everything.
    pub fn new(phrase: &str) -> Result<Option<Self>> {
        if phrase.trim().is_empty() {
            return Ok(None);
        }
        let regex = Regex::new(&format!("(?i){}", regex::escape(phrase)))?;
        Ok(Some(Self {
            regex,
            chars: phrase.chars().count(),
        }))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Byte range of the first occurrence in `text`.
    pub fn find(&self, text: &str) -> Option<Range<usize>> {
        self.regex.find(text).map(|m| m.range())
    }

    /// Length of the phrase in characters.
    pub fn char_len(&self) -> usize {
        self.chars
    }
}

/// Compile a phrase list, dropping blank entries.
pub fn compile_fragments(phrases: &[String]) -> Result<Vec<Fragment>> {
    let mut fragments = Vec::with_capacity(phrases.len());
    for phrase in phrases {
        if let Some(fragment) = Fragment::new(phrase)? {
            fragments.push(fragment);
        }
    }
    Ok(fragments)
}

/// Compiled [`LabelTable`], in table order
#[derive(Debug, Clone)]
pub struct LabelPatterns {
    fields: Vec<(FieldKey, Vec<Fragment>)>,
}

impl LabelPatterns {
    pub fn compile(table: &LabelTable) -> Result<Self> {
        let fields = table
            .iter()
            .map(|(key, phrases)| Ok((key, compile_fragments(phrases)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { fields })
    }

    pub fn fragments(&self, key: FieldKey) -> &[Fragment] {
        self.fields
            .iter()
            .find(|(field, _)| *field == key)
            .map(|(_, fragments)| fragments.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a label to its canonical field. The longest matching
    /// fragment decides; ties go to table order.
    pub fn classify(&self, label: &str) -> Option<FieldKey> {
        let mut best: Option<(FieldKey, usize)> = None;
        for (key, fragments) in &self.fields {
            for fragment in fragments {
                if !fragment.is_match(label) {
                    continue;
                }
                if best.map_or(true, |(_, len)| fragment.char_len() > len) {
                    best = Some((*key, fragment.char_len()));
                }
            }
        }
        best.map(|(key, _)| key)
    }
}

/// Everything text-based an extraction run matches against
#[derive(Debug, Clone)]
pub struct Patterns {
    pub labels: LabelPatterns,
    pub available_sizes: Vec<Fragment>,
    /// Most specific first
    pub serving_size: Vec<Fragment>,
    pub servings_per_container: Vec<Fragment>,
}

impl Patterns {
    pub fn compile(config: &ExtractorConfig) -> Result<Self> {
        Ok(Self {
            labels: LabelPatterns::compile(&config.labels)?,
            available_sizes: compile_fragments(&config.markers.available_sizes)?,
            serving_size: compile_fragments(&config.markers.serving_size)?,
            servings_per_container: compile_fragments(&config.markers.servings_per_container)?,
        })
    }
}
