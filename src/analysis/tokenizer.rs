//! Field value tokenization for the reference index.
//!
//! `Text` fields are split on Unicode word boundaries (UAX #29) and lowercased;
//! `Id` and `Numeric` fields index their whole trimmed value as one token.

use unicode_segmentation::UnicodeSegmentation;

use crate::schema::FieldType;

/// A token with its word position inside the field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Normalized token text.
    pub text: String,
    /// Zero-based word position.
    pub position: u32,
    /// Byte offset of the first character in the field value.
    pub start: usize,
    /// Byte offset just past the last character.
    pub end: usize,
}

/// Split a field value into indexed tokens according to its field type.
pub fn analyze(field_type: FieldType, value: &str) -> Vec<Token> {
    match field_type {
        FieldType::Text => value
            .unicode_word_indices()
            .enumerate()
            .map(|(position, (start, word))| Token {
                text: field_type.normalize(word),
                position: position as u32,
                start,
                end: start + word.len(),
            })
            .collect(),
        FieldType::Id | FieldType::Numeric => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                let start = value.len() - value.trim_start().len();
                vec![Token {
                    text: field_type.normalize(trimmed),
                    position: 0,
                    start,
                    end: start + trimmed.len(),
                }]
            }
        }
    }
}
