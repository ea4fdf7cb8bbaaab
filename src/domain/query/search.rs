//! Free-text search: gating, scoring and highlights.
//!
//! Per searchable field (ASCII-lowercased, null read as empty):
//! exact match 3, prefix 2, substring 1; with several query tokens each
//! token found adds 0.5. An item matches iff its total is above zero. The SQL
//! pipeline evaluates the same weights.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::field::{FieldValue, ListEntity};
use super::request::SearchSpec;
use crate::shared::ListResult;

pub const EXACT_WEIGHT: f64 = 3.0;
pub const PREFIX_WEIGHT: f64 = 2.0;
pub const CONTAINS_WEIGHT: f64 = 1.0;
pub const TOKEN_WEIGHT: f64 = 0.5;

/// A validated, normalized search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    tokens: Vec<String>,
}

impl SearchQuery {
    /// Trims and validates the query; fewer than two characters is an error.
    pub fn parse(spec: &SearchSpec) -> ListResult<Self> {
        let trimmed = SearchSpec {
            query: spec.query.trim().to_string(),
        };
        trimmed.validate()?;

        let text = trimmed.query.to_ascii_lowercase();
        let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        let tokens = if tokens.len() > 1 { tokens } else { Vec::new() };

        Ok(Self { text, tokens })
    }

    /// Lowercased query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Individual tokens; empty for single-word queries.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn score_text(&self, text: &str) -> f64 {
        let hay = text.to_ascii_lowercase();

        let mut score = if hay == self.text {
            EXACT_WEIGHT
        } else if hay.starts_with(&self.text) {
            PREFIX_WEIGHT
        } else if hay.contains(&self.text) {
            CONTAINS_WEIGHT
        } else {
            0.0
        };

        for token in &self.tokens {
            if hay.contains(token.as_str()) {
                score += TOKEN_WEIGHT;
            }
        }
        score
    }

    /// Matched spans of `text`, in original case. Whole-query matches are
    /// preferred; token matches are reported only when the query as a whole
    /// does not occur.
    pub fn highlight_text(&self, text: &str) -> Vec<String> {
        let hay = text.to_ascii_lowercase();
        let spans = find_spans(&hay, &self.text);
        let spans = if spans.is_empty() {
            let mut spans: Vec<(usize, usize)> = self
                .tokens
                .iter()
                .flat_map(|t| find_spans(&hay, t))
                .collect();
            spans.sort_unstable();
            spans
        } else {
            spans
        };

        // ASCII lowercasing keeps byte offsets, so spans index the original.
        spans
            .into_iter()
            .filter_map(|(start, end)| text.get(start..end))
            .map(str::to_string)
            .collect()
    }
}

fn find_spans(hay: &str, needle: &str) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }
    hay.match_indices(needle)
        .map(|(start, m)| (start, start + m.len()))
        .collect()
}

/// Relevance of one matched item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub score: f64,
    pub highlights: Vec<String>,
}

fn searchable_texts<T: ListEntity>(item: &T) -> impl Iterator<Item = String> + '_ {
    T::schema()
        .searchable_fields()
        .map(move |f| match item.field_value(f.name) {
            FieldValue::Text(s) => s,
            _ => String::new(),
        })
}

pub fn score<T: ListEntity>(query: &SearchQuery, item: &T) -> f64 {
    searchable_texts(item).map(|t| query.score_text(&t)).sum()
}

pub fn highlights<T: ListEntity>(query: &SearchQuery, item: &T) -> Vec<String> {
    searchable_texts(item)
        .flat_map(|t| query.highlight_text(&t))
        .collect()
}

/// `Some` iff the item matches the query.
pub fn evaluate<T: ListEntity>(query: &SearchQuery, item: &T) -> Option<SearchResult> {
    let score = score(query, item);
    (score > 0.0).then(|| SearchResult {
        score,
        highlights: highlights(query, item),
    })
}
