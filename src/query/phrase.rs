//! Phrase query implementation for exact and proximity phrase matching.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::term::{escape_text, write_boost};

/// A query that matches documents containing an ordered sequence of words.
///
/// `slop` is the number of extra positions allowed between consecutive words;
/// zero requires the words to be adjacent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseQuery {
    /// The field to search in.
    pub field: String,
    /// The words of the phrase, in order.
    pub words: Vec<String>,
    /// Maximum extra distance between consecutive words.
    pub slop: u32,
    /// The boost factor for this query.
    pub boost: f32,
}

impl PhraseQuery {
    /// Create a new exact phrase query.
    pub fn new<S: Into<String>>(field: S, words: Vec<String>) -> Self {
        PhraseQuery {
            field: field.into(),
            words,
            slop: 0,
            boost: 1.0,
        }
    }

    /// Set the slop.
    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Count phrase occurrences given each word's positions in one document.
    ///
    /// `positions[i]` holds the ascending positions of `words[i]`. An
    /// occurrence starts at a position of the first word and is extended greedily
    /// to the nearest following position of each next word within `slop`.
    pub fn count_matches(&self, positions: &[Vec<u32>]) -> u32 {
        if positions.is_empty() || positions.len() != self.words.len() {
            return 0;
        }

        let mut matches = 0;
        'starts: for &start in &positions[0] {
            let mut previous = start;
            for word_positions in &positions[1..] {
                let next = word_positions
                    .iter()
                    .copied()
                    .find(|&pos| pos > previous && pos - previous - 1 <= self.slop);
                match next {
                    Some(pos) => previous = pos,
                    None => continue 'starts,
                }
            }
            matches += 1;
        }
        matches
    }
}

impl fmt::Display for PhraseQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<String> = self.words.iter().map(|w| escape_text(w)).collect();
        write!(f, "{}:\"{}\"", self.field, words.join(" "))?;
        if self.slop > 0 {
            write!(f, "~{}", self.slop)?;
        }
        write_boost(f, self.boost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(words: &[&str]) -> PhraseQuery {
        PhraseQuery::new("body", words.iter().map(|w| w.to_string()).collect())
    }

    #[test]
    fn test_exact_matches() {
        let query = phrase(&["quick", "brown"]);
        // "the quick brown fox saw a quick red brown dog"
        let positions = vec![vec![1, 6], vec![2, 8]];
        assert_eq!(query.count_matches(&positions), 1);
    }

    #[test]
    fn test_sloppy_matches() {
        let query = phrase(&["quick", "brown"]).with_slop(1);
        let positions = vec![vec![1, 6], vec![2, 8]];
        assert_eq!(query.count_matches(&positions), 2);
    }

    #[test]
    fn test_missing_word() {
        let query = phrase(&["quick", "brown"]);
        assert_eq!(query.count_matches(&[vec![1], vec![]]), 0);
        assert_eq!(query.count_matches(&[vec![1]]), 0);
    }

    #[test]
    fn test_display() {
        let query = phrase(&["alfa", "bravo"]).with_slop(2).with_boost(1.5);
        assert_eq!(query.to_string(), "body:\"alfa bravo\"~2^1.5");
    }
}
