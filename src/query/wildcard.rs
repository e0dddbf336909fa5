//! Prefix and wildcard pattern leaves.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HalberdError, Result};
use crate::query::term::write_boost;

/// A query that matches every term starting with a prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixQuery {
    /// The field to search in.
    pub field: String,
    /// The prefix; empty matches every term in the field.
    pub text: String,
    /// The boost factor for this query.
    pub boost: f32,
}

impl PrefixQuery {
    /// Create a new prefix query.
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        PrefixQuery {
            field: field.into(),
            text: text.into(),
            boost: 1.0,
        }
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Check if a term matches the prefix.
    pub fn matches(&self, term: &str) -> bool {
        term.starts_with(self.text.as_str())
    }
}

impl fmt::Display for PrefixQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}*", self.field, self.text)?;
        write_boost(f, self.boost)
    }
}

/// A query that matches terms against a glob pattern.
///
/// `*` matches zero or more characters and `?` exactly one. Every other
/// character, including a backslash, is literal: escapes were already
/// resolved when the query was parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildcardQuery {
    /// The field to search in.
    pub field: String,
    /// The glob pattern.
    pub text: String,
    /// The boost factor for this query.
    pub boost: f32,
}

impl WildcardQuery {
    /// Create a new wildcard query.
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        WildcardQuery {
            field: field.into(),
            text: text.into(),
            boost: 1.0,
        }
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// The literal text before the first wildcard character.
    pub fn literal_prefix(&self) -> &str {
        let end = self.text.find(['*', '?']).unwrap_or(self.text.len());
        &self.text[..end]
    }

    /// Compile the pattern into an anchored regex.
    pub fn compile(&self) -> Result<Regex> {
        compile_pattern(&self.text)
    }
}

impl fmt::Display for WildcardQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.text)?;
        write_boost(f, self.boost)
    }
}

/// Compile a glob pattern into a regex matching whole terms.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    let mut regex_pattern = String::with_capacity(pattern.len() + 8);
    regex_pattern.push('^');

    let mut buffer = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '*' => regex_pattern.push_str(".*"),
            '?' => regex_pattern.push('.'),
            c => regex_pattern.push_str(&regex::escape(c.encode_utf8(&mut buffer))),
        }
    }

    regex_pattern.push('$');

    Regex::new(&regex_pattern)
        .map_err(|e| HalberdError::query(format!("Invalid wildcard pattern: {e}")))
}
