//! Error types for the Halberd library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`HalberdError`] enum. Parse failures carry the byte span of the
//! offending input in a [`ParseError`].
//!
//! # Examples
//!
//! ```
//! use halberd::error::{HalberdError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(HalberdError::query("And requires at least one child"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::ops::Range;

use thiserror::Error;

/// An error produced while parsing a query string.
///
/// The parser is permissive, so this only occurs for unterminated quoted
/// phrases and unterminated range brackets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at {}..{}", span.start, span.end)]
pub struct ParseError {
    /// Human readable description.
    pub message: String,
    /// Byte span of the offending input.
    pub span: Range<usize>,
}

impl ParseError {
    /// Create a new parse error covering `span`.
    pub fn new<S: Into<String>>(message: S, span: Range<usize>) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

/// The main error type for Halberd operations.
#[derive(Error, Debug)]
pub enum HalberdError {
    /// Malformed query text.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Query construction errors (invariant violations).
    #[error("Query error: {0}")]
    Query(String),

    /// Index reader errors (closed reader, unknown postings, etc.)
    #[error("Index error: {0}")]
    Index(String),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// Field-related errors
    #[error("Field error: {0}")]
    Field(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with HalberdError.
pub type Result<T> = std::result::Result<T, HalberdError>;

impl HalberdError {
    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        HalberdError::Query(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S, span: Range<usize>) -> Self {
        HalberdError::Parse(ParseError::new(msg, span))
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        HalberdError::Index(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        HalberdError::Schema(msg.into())
    }

    /// Create a new field error.
    pub fn field<S: Into<String>>(msg: S) -> Self {
        HalberdError::Field(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HalberdError::Other(msg.into())
    }

    /// Create an error for a reader that has already been closed.
    pub fn closed() -> Self {
        HalberdError::Index("Index reader is closed".to_string())
    }
}
