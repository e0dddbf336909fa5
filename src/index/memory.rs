//! In-memory reference index.
//!
//! Holds per-field sorted lexicons with positional postings plus the length
//! statistics weighting models need. It exists so the query core can be run
//! end to end; it has no persistence, segments or deletions.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHashMap;
use tracing::debug;

use crate::analysis::analyze;
use crate::error::{HalberdError, Result};
use crate::index::reader::{DocId, IndexReader, IndexStatistics, Posting};
use crate::schema::Schema;

/// An in-memory inverted index over a [`Schema`].
#[derive(Debug)]
pub struct MemoryIndex {
    schema: Schema,
    /// field -> term -> postings (ascending doc IDs).
    terms: AHashMap<String, BTreeMap<String, Vec<Posting>>>,
    doc_lengths: Vec<u64>,
    doc_field_lengths: Vec<AHashMap<String, u64>>,
    field_lengths: AHashMap<String, u64>,
    total_term_count: u64,
    closed: AtomicBool,
}

impl MemoryIndex {
    /// Create an empty index for `schema`.
    pub fn new(schema: Schema) -> Self {
        MemoryIndex {
            schema,
            terms: AHashMap::new(),
            doc_lengths: Vec::new(),
            doc_field_lengths: Vec::new(),
            field_lengths: AHashMap::new(),
            total_term_count: 0,
            closed: AtomicBool::new(false),
        }
    }

    /// Get the schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Add a document given as `(field, value)` pairs and return its ID.
    ///
    /// A field may appear more than once; later values continue the word
    /// positions of earlier ones.
    pub fn add_document(&mut self, fields: &[(&str, &str)]) -> Result<DocId> {
        if self.is_closed() {
            return Err(HalberdError::closed());
        }
        for (field, _) in fields {
            if !self.schema.has_field(field) {
                return Err(HalberdError::field(format!("Unknown field '{field}'")));
            }
        }

        let doc_id = self.doc_lengths.len() as DocId;
        let mut field_lengths: AHashMap<String, u64> = AHashMap::new();
        let mut doc_terms: AHashMap<(String, String), Vec<u32>> = AHashMap::new();

        for (field, value) in fields {
            let Some(field_type) = self.schema.field_type(field) else {
                continue;
            };
            let offset = field_lengths.get(*field).copied().unwrap_or(0) as u32;
            let tokens = analyze(field_type, value);

            for token in &tokens {
                doc_terms
                    .entry((field.to_string(), token.text.clone()))
                    .or_default()
                    .push(offset + token.position);
            }
            *field_lengths.entry(field.to_string()).or_insert(0) += tokens.len() as u64;
        }

        for ((field, term), positions) in doc_terms {
            let postings = self
                .terms
                .entry(field)
                .or_default()
                .entry(term)
                .or_default();
            postings.push(Posting {
                doc_id,
                frequency: positions.len() as u32,
                positions,
            });
        }

        let doc_length: u64 = field_lengths.values().sum();
        for (field, length) in &field_lengths {
            *self.field_lengths.entry(field.clone()).or_insert(0) += length;
        }
        self.total_term_count += doc_length;
        self.doc_lengths.push(doc_length);
        self.doc_field_lengths.push(field_lengths);

        debug!(doc_id, doc_length, "added document to memory index");
        Ok(doc_id)
    }

    /// Close the index; subsequent reader calls fail.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(HalberdError::closed())
        } else {
            Ok(())
        }
    }

    fn term_postings(&self, field: &str, term: &str) -> Option<&Vec<Posting>> {
        self.terms.get(field).and_then(|lexicon| lexicon.get(term))
    }
}

impl IndexStatistics for MemoryIndex {
    fn doc_count_all(&self) -> u64 {
        self.doc_lengths.len() as u64
    }

    fn total_term_count(&self) -> u64 {
        self.total_term_count
    }

    fn field_length(&self, field: &str) -> u64 {
        self.field_lengths.get(field).copied().unwrap_or(0)
    }

    fn doc_length(&self, doc_id: DocId) -> u64 {
        self.doc_lengths.get(doc_id as usize).copied().unwrap_or(0)
    }

    fn doc_field_length(&self, doc_id: DocId, field: &str) -> u64 {
        self.doc_field_lengths
            .get(doc_id as usize)
            .and_then(|lengths| lengths.get(field))
            .copied()
            .unwrap_or(0)
    }

    fn doc_frequency(&self, field: &str, term: &str) -> u64 {
        self.term_postings(field, term)
            .map(|postings| postings.len() as u64)
            .unwrap_or(0)
    }

    fn term_count(&self, field: &str, term: &str) -> u64 {
        self.term_postings(field, term)
            .map(|postings| postings.iter().map(|p| p.frequency as u64).sum())
            .unwrap_or(0)
    }
}

impl IndexReader for MemoryIndex {
    fn fieldname_to_num(&self, field: &str) -> Option<usize> {
        self.schema.field_number(field)
    }

    fn lexicon(&self, field: &str) -> Result<Vec<String>> {
        self.ensure_open()?;
        Ok(self
            .terms
            .get(field)
            .map(|lexicon| lexicon.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn postings(&self, field: &str, term: &str) -> Result<Vec<Posting>> {
        self.ensure_open()?;
        Ok(self.term_postings(field, term).cloned().unwrap_or_default())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn contains_term(&self, field: &str, term: &str) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.term_postings(field, term).is_some())
    }

    fn doc_vector(&self, doc_id: DocId, field: &str) -> Result<Vec<(String, u32)>> {
        self.ensure_open()?;
        let Some(lexicon) = self.terms.get(field) else {
            return Ok(Vec::new());
        };
        Ok(lexicon
            .iter()
            .filter_map(|(term, postings)| {
                let idx = postings.binary_search_by_key(&doc_id, |p| p.doc_id).ok()?;
                Some((term.clone(), postings[idx].frequency))
            })
            .collect())
    }

    fn expand_prefix(&self, field: &str, prefix: &str) -> Result<Vec<String>> {
        self.ensure_open()?;
        let Some(lexicon) = self.terms.get(field) else {
            return Ok(Vec::new());
        };
        Ok(lexicon
            .range(prefix.to_string()..)
            .map(|(term, _)| term)
            .take_while(|term| term.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn sample_index() -> MemoryIndex {
        let schema = Schema::new()
            .with_field("key", FieldType::Id)
            .unwrap()
            .with_field("value", FieldType::Text)
            .unwrap();
        let mut index = MemoryIndex::new(schema);
        index
            .add_document(&[("key", "a"), ("value", "alfa bravo charlie delta echo")])
            .unwrap();
        index
            .add_document(&[("key", "b"), ("value", "foxtrot golf alfa alfa")])
            .unwrap();
        index
    }

    #[test]
    fn test_statistics() {
        let index = sample_index();

        assert_eq!(index.doc_count_all(), 2);
        assert_eq!(index.field_length("value"), 9);
        assert_eq!(index.total_term_count(), 11);
        assert_eq!(index.doc_length(1), 5);
        assert_eq!(index.doc_field_length(0, "value"), 5);
        assert_eq!(index.doc_frequency("value", "alfa"), 2);
        assert_eq!(index.term_count("value", "alfa"), 3);
        assert_eq!(index.term_count("value", "zulu"), 0);
        assert_eq!(index.doc_length(99), 0);
    }

    #[test]
    fn test_lexicon_and_postings() {
        let index = sample_index();

        assert_eq!(index.lexicon("key").unwrap(), vec!["a", "b"]);
        assert_eq!(
            index.expand_prefix("value", "f").unwrap(),
            vec!["foxtrot".to_string()]
        );

        let postings = index.postings("value", "alfa").unwrap();
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[1].doc_id, 1);
        assert_eq!(postings[1].frequency, 2);
        assert_eq!(postings[1].positions, vec![2, 3]);
        assert!(index.contains_term("value", "golf").unwrap());
        assert!(!index.contains_term("value", "hotel").unwrap());
    }

    #[test]
    fn test_doc_vector() {
        let index = sample_index();

        assert_eq!(
            index.doc_vector(1, "value").unwrap(),
            vec![
                ("alfa".to_string(), 2),
                ("foxtrot".to_string(), 1),
                ("golf".to_string(), 1)
            ]
        );
        assert!(index.doc_vector(7, "value").unwrap().is_empty());
        assert!(index.doc_vector(0, "missing").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_field() {
        let mut index = sample_index();
        assert!(index.add_document(&[("missing", "x")]).is_err());
        assert_eq!(index.fieldname_to_num("value"), Some(1));
        assert_eq!(index.fieldname_to_num("missing"), None);
    }

    #[test]
    fn test_closed_reader() {
        let index = sample_index();
        index.close();

        assert!(index.is_closed());
        assert!(index.lexicon("value").is_err());
        assert!(index.postings("value", "alfa").is_err());
        assert!(index.doc_vector(0, "value").is_err());
        // Statistics stay available.
        assert_eq!(index.doc_count_all(), 2);
    }
}
