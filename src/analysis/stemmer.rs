//! Stemmers used to resolve `Variations` query leaves.
//!
//! Two words are variations of each other when their stems are equal.

use std::fmt::Debug;

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync + Debug {
    /// Stem a word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;

    /// Check whether two words share a stem.
    fn is_variation(&self, word: &str, candidate: &str) -> bool {
        self.stem(word) == self.stem(candidate)
    }
}

/// Stemmer that strips common English suffixes, longest first.
#[derive(Debug, Clone)]
pub struct SimpleStemmer {
    /// Suffixes sorted by descending length.
    suffixes: Vec<String>,
}

impl Default for SimpleStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleStemmer {
    /// Create a new simple stemmer.
    pub fn new() -> Self {
        Self::with_suffixes(
            [
                "ations", "ation", "ings", "ing", "ied", "ies", "edly", "ed", "ers", "er",
                "est", "ly", "es", "s", "ment", "ness", "ful",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
    }

    /// Create a simple stemmer with custom suffixes.
    pub fn with_suffixes(mut suffixes: Vec<String>) -> Self {
        suffixes.sort_by_key(|suffix| std::cmp::Reverse(suffix.len()));
        SimpleStemmer { suffixes }
    }
}

impl Stemmer for SimpleStemmer {
    fn stem(&self, word: &str) -> String {
        let word = word.to_lowercase();

        if word.chars().count() <= 3 {
            return word;
        }

        for suffix in &self.suffixes {
            if word.len() > suffix.len() + 2 && word.ends_with(suffix.as_str()) {
                let mut stem = word[..word.len() - suffix.len()].to_string();
                // "ies"/"ied" come from a "y" ending.
                if suffix == "ies" || suffix == "ied" {
                    stem.push('y');
                }
                return stem;
            }
        }

        word
    }

    fn name(&self) -> &'static str {
        "simple"
    }
}

/// Stemmer that leaves words unchanged; only exact (case-insensitive) matches
/// count as variations.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_lowercase()
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}
