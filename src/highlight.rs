//! Passage extraction and highlighting of query words in field text.
//!
//! Matched words are grouped into passages: a match joins an existing passage
//! when its context window overlaps it and the grown passage stays within
//! [`HighlightConfig::max_chars`]; otherwise it starts a new one. Passages are
//! ranked by how many matches and distinct words they hold, then widened to
//! whole words and marked up.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::analysis::analyze;
use crate::query::QueryNode;
use crate::schema::FieldType;

/// Configuration for highlighting.
#[derive(Debug, Clone)]
pub struct HighlightConfig {
    /// HTML tag wrapped around matched words.
    pub tag: String,
    /// CSS class added to the tag.
    pub css_class: Option<String>,
    /// Maximum number of passages returned.
    pub max_passages: usize,
    /// Maximum length of a passage in bytes, before widening to whole words.
    pub max_chars: usize,
    /// Context kept before a match, in bytes.
    pub chars_before: usize,
    /// Context kept after a match, in bytes.
    pub chars_after: usize,
    /// Separator placed between passages by [`FieldHighlight::combined_text`].
    pub separator: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            tag: "mark".to_string(),
            css_class: None,
            max_passages: 5,
            max_chars: 200,
            chars_before: 20,
            chars_after: 20,
            separator: " ... ".to_string(),
        }
    }
}

impl HighlightConfig {
    /// Create a new highlight configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTML tag.
    pub fn tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set the CSS class of the tag.
    pub fn css_class<S: Into<String>>(mut self, css_class: S) -> Self {
        self.css_class = Some(css_class.into());
        self
    }

    /// Set the maximum number of passages.
    pub fn max_passages(mut self, max_passages: usize) -> Self {
        self.max_passages = max_passages;
        self
    }

    /// Set the maximum passage length.
    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Set the context kept around each match.
    pub fn context(mut self, before: usize, after: usize) -> Self {
        self.chars_before = before;
        self.chars_after = after;
        self
    }

    /// Build the opening tag.
    pub fn opening_tag(&self) -> String {
        match &self.css_class {
            Some(css_class) => format!("<{} class=\"{}\">", self.tag, css_class),
            None => format!("<{}>", self.tag),
        }
    }

    /// Build the closing tag.
    pub fn closing_tag(&self) -> String {
        format!("</{}>", self.tag)
    }
}

/// One matched word inside a passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageMatch {
    /// The normalized word.
    pub word: String,
    /// Word position in the field.
    pub position: u32,
    /// Byte offset of the match.
    pub start: usize,
    /// Byte offset just past the match.
    pub end: usize,
}

/// A byte range of field text holding one or more matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// First byte of the passage.
    pub start: usize,
    /// Byte just past the passage.
    pub end: usize,
    /// Matches in text order.
    pub matches: Vec<PassageMatch>,
}

impl Passage {
    fn new(found: PassageMatch, config: &HighlightConfig, text_len: usize) -> Self {
        Passage {
            start: found.start.saturating_sub(config.chars_before),
            end: (found.end + config.chars_after).min(text_len),
            matches: vec![found],
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the passage is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The distinct words matched in this passage.
    pub fn terms(&self) -> BTreeSet<&str> {
        self.matches.iter().map(|m| m.word.as_str()).collect()
    }

    /// Matches weighted by the number of distinct words, favouring variety.
    pub fn score(&self) -> f64 {
        (self.matches.len() * self.terms().len()) as f64
    }

    /// Whether the window of `start..end` touches this passage's window.
    fn overlaps(&self, start: usize, end: usize, config: &HighlightConfig) -> bool {
        let lower = self.start.saturating_sub(config.chars_before);
        let upper = self.end + config.chars_after;
        (start > lower && start < upper) || (end > lower && end < upper)
    }

    /// The length this passage would have after taking in `start..end`.
    fn grown_len(&self, start: usize, end: usize, config: &HighlightConfig) -> usize {
        let start = start.saturating_sub(config.chars_before);
        let end = end + config.chars_after;
        end.max(self.end) - start.min(self.start)
    }

    fn add(&mut self, found: PassageMatch, config: &HighlightConfig, text_len: usize) {
        self.start = self.start.min(found.start.saturating_sub(config.chars_before));
        self.end = self.end.max(found.end + config.chars_after).min(text_len);
        self.matches.push(found);
    }
}

/// A marked-up passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightFragment {
    /// The passage text with matches wrapped in tags.
    pub text: String,
    /// Byte offset of the passage in the field text.
    pub start_offset: usize,
    /// Byte offset just past the passage.
    pub end_offset: usize,
    /// Passage score.
    pub score: f64,
}

/// The highlighted passages of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldHighlight {
    /// Field name.
    pub field: String,
    /// Fragments, best first.
    pub fragments: Vec<HighlightFragment>,
}

impl FieldHighlight {
    /// Join every fragment with `separator`.
    pub fn combined_text(&self, separator: &str) -> String {
        self.fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Finds and marks up passages of field text containing query words.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    config: HighlightConfig,
}

impl Highlighter {
    /// Create a new highlighter.
    pub fn new(config: HighlightConfig) -> Self {
        Highlighter { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Group the occurrences of `words` in `text` into passages, best first.
    ///
    /// `text` is analyzed as a value of `field_type`, so `words` must be in
    /// the normalized form the index stores.
    pub fn passages(&self, field_type: FieldType, text: &str, words: &BTreeSet<String>) -> Vec<Passage> {
        let config = &self.config;
        let mut passages: Vec<Passage> = Vec::new();

        for token in analyze(field_type, text) {
            if !words.contains(&token.text) {
                continue;
            }
            let found = PassageMatch {
                word: token.text,
                position: token.position,
                start: token.start,
                end: token.end,
            };
            let host = passages.iter_mut().find(|passage| {
                passage.overlaps(found.start, found.end, config)
                    && passage.grown_len(found.start, found.end, config) <= config.max_chars
            });
            match host {
                Some(passage) => passage.add(found, config, text.len()),
                None => passages.push(Passage::new(found, config, text.len())),
            }
        }

        for passage in &mut passages {
            passage.start = word_start(text, passage.start);
            passage.end = word_end(text, passage.end);
        }
        passages.sort_by(|a, b| b.score().total_cmp(&a.score()).then(a.start.cmp(&b.start)));
        passages.truncate(config.max_passages);
        passages
    }

    /// Mark up the matches of one passage.
    pub fn format(&self, text: &str, passage: &Passage) -> String {
        let opening = self.config.opening_tag();
        let closing = self.config.closing_tag();

        let mut result = String::with_capacity(passage.len() + passage.matches.len() * 16);
        let mut last = passage.start;
        for found in &passage.matches {
            if found.start < last {
                continue;
            }
            result.push_str(&text[last..found.start]);
            result.push_str(&opening);
            result.push_str(&text[found.start..found.end]);
            result.push_str(&closing);
            last = found.end;
        }
        if last < passage.end {
            result.push_str(&text[last..passage.end]);
        }
        result
    }

    /// Highlight the words `query` searches for in `field`.
    ///
    /// Phrase words count as matches on their own.
    pub fn highlight(
        &self,
        query: &QueryNode,
        field: &str,
        field_type: FieldType,
        text: &str,
    ) -> FieldHighlight {
        let words: BTreeSet<String> = query
            .all_terms(true)
            .into_iter()
            .filter(|(term_field, _)| term_field == field)
            .map(|(_, word)| word)
            .collect();

        let fragments = self
            .passages(field_type, text, &words)
            .iter()
            .map(|passage| HighlightFragment {
                text: self.format(text, passage),
                start_offset: passage.start,
                end_offset: passage.end,
                score: passage.score(),
            })
            .collect();

        FieldHighlight {
            field: field.to_string(),
            fragments,
        }
    }
}

/// Move `idx` back to a char boundary and then to the start of its word.
fn word_start(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    while let Some(c) = text[..idx].chars().next_back() {
        if !c.is_alphanumeric() {
            break;
        }
        idx -= c.len_utf8();
    }
    idx
}

/// Move `idx` forward to a char boundary and then to the end of its word.
fn word_end(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    while let Some(c) = text[idx..].chars().next() {
        if !c.is_alphanumeric() {
            break;
        }
        idx += c.len_utf8();
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "The quick brown fox jumps over the lazy dog. A fox is quick.";

    fn words(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|w| w.to_string()).collect()
    }

    fn highlighter() -> Highlighter {
        Highlighter::new(HighlightConfig::new().context(10, 10).max_chars(40))
    }

    #[test]
    fn test_separate_passages() {
        let passages = highlighter().passages(FieldType::Text, TEXT, &words(&["fox"]));

        assert_eq!(passages.len(), 2);
        assert_eq!(&TEXT[passages[0].start..passages[0].end], "quick brown fox jumps over");
        assert_eq!(&TEXT[passages[1].start..passages[1].end], "lazy dog. A fox is quick.");
        assert_eq!(passages[0].matches[0].position, 3);
    }

    #[test]
    fn test_matches_join_passages() {
        let passages = highlighter().passages(FieldType::Text, TEXT, &words(&["fox", "quick"]));

        assert_eq!(passages.len(), 2);
        for passage in &passages {
            assert_eq!(passage.matches.len(), 2);
            assert_eq!(passage.terms(), BTreeSet::from(["fox", "quick"]));
            assert_eq!(passage.score(), 4.0);
        }
        assert_eq!(passages[0].start, 0);
    }

    #[test]
    fn test_format() {
        let highlighter = highlighter();
        let passages = highlighter.passages(FieldType::Text, TEXT, &words(&["fox", "quick"]));

        assert_eq!(
            highlighter.format(TEXT, &passages[0]),
            "The <mark>quick</mark> brown <mark>fox</mark> jumps over"
        );
        assert_eq!(
            highlighter.format(TEXT, &passages[1]),
            "lazy dog. A <mark>fox</mark> is <mark>quick</mark>."
        );
    }

    #[test]
    fn test_highlight_query() {
        let highlighter = Highlighter::new(
            HighlightConfig::new()
                .tag("em")
                .css_class("hit")
                .context(10, 10)
                .max_chars(40)
                .max_passages(1),
        );
        let query = QueryNode::or(vec![
            QueryNode::term("body", "dog"),
            QueryNode::term("title", "fox"),
        ]);
        let highlight = highlighter.highlight(&query, "body", FieldType::Text, TEXT);

        assert_eq!(highlight.field, "body");
        assert_eq!(highlight.fragments.len(), 1);
        assert_eq!(
            highlight.fragments[0].text,
            "over the lazy <em class=\"hit\">dog</em>. A fox is"
        );
    }

    #[test]
    fn test_no_matches() {
        let highlight = Highlighter::default().highlight(
            &QueryNode::term("body", "zebra"),
            "body",
            FieldType::Text,
            TEXT,
        );
        assert!(highlight.fragments.is_empty());
        assert_eq!(highlight.combined_text(" ... "), "");
    }

    #[test]
    fn test_multibyte_boundaries() {
        let text = "café crème brûlée";
        let highlighter = Highlighter::new(HighlightConfig::new().context(3, 3));
        let passages = highlighter.passages(FieldType::Text, text, &words(&["crème"]));

        assert_eq!(passages.len(), 1);
        assert_eq!(&text[passages[0].start..passages[0].end], "café crème brûlée");
    }
}
