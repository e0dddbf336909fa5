//! Fuzzy term leaf: terms within a bounded edit distance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::term::{escape_text, write_boost};
use crate::util::levenshtein::FuzzyMatcher;

/// A query that matches terms within `max_edits` edits of `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyTermQuery {
    /// The field to search in.
    pub field: String,
    /// The term text to compare against.
    pub text: String,
    /// Maximum Levenshtein distance.
    pub max_edits: u32,
    /// Number of leading characters that must match exactly.
    pub prefix_length: u32,
    /// The boost factor for this query.
    pub boost: f32,
}

impl FuzzyTermQuery {
    /// Create a new fuzzy query allowing one edit.
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        FuzzyTermQuery {
            field: field.into(),
            text: text.into(),
            max_edits: 1,
            prefix_length: 0,
            boost: 1.0,
        }
    }

    /// Set the maximum edit distance.
    pub fn with_max_edits(mut self, max_edits: u32) -> Self {
        self.max_edits = max_edits;
        self
    }

    /// Set the exact-match prefix length.
    pub fn with_prefix_length(mut self, prefix_length: u32) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Build the matcher used to filter the lexicon.
    pub fn matcher(&self) -> FuzzyMatcher {
        FuzzyMatcher::new(&self.text, self.max_edits as usize)
            .with_prefix_length(self.prefix_length as usize)
    }
}

impl fmt::Display for FuzzyTermQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}~", self.field, escape_text(&self.text))?;
        if self.max_edits != 1 {
            write!(f, "{}", self.max_edits)?;
        }
        write_boost(f, self.boost)
    }
}
