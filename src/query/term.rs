//! Single-term leaves: exact terms, morphological variations and `Every`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Escape query-syntax characters so rendered text parses back to itself.
pub(crate) fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_whitespace()
            || matches!(
                c,
                '\\' | '"' | ':' | '*' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '~'
            )
        {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Write a `^boost` suffix when the boost is not the default.
pub(crate) fn write_boost(f: &mut fmt::Formatter<'_>, boost: f32) -> fmt::Result {
    if boost != 1.0 {
        write!(f, "^{boost}")?;
    }
    Ok(())
}

/// A query that matches documents containing a specific term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermQuery {
    /// The field to search in.
    pub field: String,
    /// The term text, already unescaped.
    pub text: String,
    /// The boost factor for this query.
    pub boost: f32,
}

impl TermQuery {
    /// Create a new term query.
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        TermQuery {
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
}

impl fmt::Display for TermQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, escape_text(&self.text))?;
        write_boost(f, self.boost)
    }
}

/// A query matching every morphological variant of a word (e.g. all words
/// sharing its stem). Resolved against the lexicon by `simplify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationsQuery {
    /// The field to search in.
    pub field: String,
    /// The base word.
    pub text: String,
    /// The boost factor for this query.
    pub boost: f32,
}

impl VariationsQuery {
    /// Create a new variations query.
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        VariationsQuery {
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
}

impl fmt::Display for VariationsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:<{}>", self.field, escape_text(&self.text))?;
        write_boost(f, self.boost)
    }
}

/// A query matching every document, or every document with a value in
/// `field` when one is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EveryQuery {
    /// Restricting field, if any.
    pub field: Option<String>,
    /// The boost factor for this query.
    pub boost: f32,
}

impl EveryQuery {
    /// Create a query matching every document.
    pub fn new() -> Self {
        EveryQuery {
            field: None,
            boost: 1.0,
        }
    }

    /// Create a query matching every document with a value in `field`.
    pub fn in_field<S: Into<String>>(field: S) -> Self {
        EveryQuery {
            field: Some(field.into()),
            boost: 1.0,
        }
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl Default for EveryQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EveryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}:<every>")?,
            None => f.write_str("*:*")?,
        }
        write_boost(f, self.boost)
    }
}
