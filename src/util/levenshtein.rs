//! Edit distance used to expand fuzzy terms against a lexicon.

use std::cmp::min;

/// Calculate the Levenshtein distance between two strings.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    bounded_distance(&a, &b, usize::MAX, false).unwrap_or(usize::MAX)
}

/// Calculate the Levenshtein distance, giving up with `None` as soon as it is
/// certain to exceed `threshold`.
pub fn levenshtein_distance_threshold(s1: &str, s2: &str, threshold: usize) -> Option<usize> {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    bounded_distance(&a, &b, threshold, false)
}

/// Calculate the Damerau-Levenshtein (optimal string alignment) distance,
/// where swapping two adjacent characters counts as one edit.
pub fn damerau_levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    bounded_distance(&a, &b, usize::MAX, true).unwrap_or(usize::MAX)
}

/// Three-row dynamic programming over char slices with early exit once the
/// distance can no longer come back under `threshold`.
fn bounded_distance(a: &[char], b: &[char], threshold: usize, transpositions: bool) -> Option<usize> {
    if a.len().abs_diff(b.len()) > threshold {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        let distance = a.len().max(b.len());
        return (distance <= threshold).then_some(distance);
    }

    let mut before_prev: Vec<usize> = vec![0; b.len() + 1];
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];
    let mut prev_row_min = 0;

    for i in 1..=a.len() {
        curr[0] = i;
        let mut row_min = i;

        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut cell = min(min(prev[j] + 1, curr[j - 1] + 1), prev[j - 1] + cost);

            if transpositions && i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                cell = min(cell, before_prev[j - 2] + 1);
            }

            curr[j] = cell;
            row_min = min(row_min, cell);
        }

        // A transposition can still reach back over one row.
        if row_min > threshold && (!transpositions || prev_row_min > threshold) {
            return None;
        }
        prev_row_min = row_min;

        std::mem::swap(&mut before_prev, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b.len()];
    (distance <= threshold).then_some(distance)
}

/// Matches many lexicon candidates against one query word.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    query_chars: Vec<char>,
    max_edits: usize,
    prefix_length: usize,
    transpositions: bool,
}

impl FuzzyMatcher {
    /// Create a matcher accepting candidates within `max_edits` edits of `query`.
    pub fn new(query: &str, max_edits: usize) -> Self {
        FuzzyMatcher {
            query_chars: query.chars().collect(),
            max_edits,
            prefix_length: 0,
            transpositions: false,
        }
    }

    /// Require the first `prefix_length` characters to match exactly.
    pub fn with_prefix_length(mut self, prefix_length: usize) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    /// Count a swap of adjacent characters as a single edit.
    pub fn with_transpositions(mut self, transpositions: bool) -> Self {
        self.transpositions = transpositions;
        self
    }

    /// Get the edit distance to `candidate` if it is within the limit.
    pub fn distance(&self, candidate: &str) -> Option<usize> {
        let candidate_chars: Vec<char> = candidate.chars().collect();

        let prefix = self.prefix_length.min(self.query_chars.len());
        if candidate_chars.len() < prefix || candidate_chars[..prefix] != self.query_chars[..prefix] {
            return None;
        }

        bounded_distance(
            &self.query_chars,
            &candidate_chars,
            self.max_edits,
            self.transpositions,
        )
    }

    /// Check whether `candidate` is within the edit limit.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.distance(candidate).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("", "a"), 1);
        assert_eq!(levenshtein_distance("a", ""), 1);
        assert_eq!(levenshtein_distance("ab", "ac"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("search", "serach"), 2);
    }

    #[test]
    fn test_levenshtein_distance_threshold() {
        assert_eq!(levenshtein_distance_threshold("kitten", "sitting", 3), Some(3));
        assert_eq!(levenshtein_distance_threshold("kitten", "sitting", 2), None);
        assert_eq!(levenshtein_distance_threshold("a", "abc", 1), None);
        assert_eq!(levenshtein_distance_threshold("a", "ab", 1), Some(1));
    }

    #[test]
    fn test_damerau_levenshtein_distance() {
        assert_eq!(damerau_levenshtein_distance("ab", "ba"), 1);
        assert_eq!(damerau_levenshtein_distance("search", "serach"), 1);
        assert_eq!(damerau_levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_fuzzy_matcher() {
        let matcher = FuzzyMatcher::new("bear", 1);

        assert!(matcher.is_match("bear"));
        assert!(matcher.is_match("beer"));
        assert!(matcher.is_match("bears"));
        assert!(!matcher.is_match("bee"));
        assert_eq!(matcher.distance("pear"), Some(1));
    }

    #[test]
    fn test_fuzzy_matcher_prefix_and_transpositions() {
        let matcher = FuzzyMatcher::new("bear", 1).with_prefix_length(1);
        assert!(!matcher.is_match("pear"));

        let matcher = FuzzyMatcher::new("bear", 1).with_transpositions(true);
        assert!(matcher.is_match("baer"));
        assert!(!FuzzyMatcher::new("bear", 1).is_match("baer"));
    }
}
