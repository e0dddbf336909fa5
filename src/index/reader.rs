//! Index reader traits for statistics, lexicon and posting access.

use std::fmt::Debug;

use crate::error::Result;

/// Document identifier. Documents are numbered densely from zero.
pub type DocId = u64;

/// One document entry of a posting list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// The document containing the term.
    pub doc_id: DocId,
    /// Number of occurrences of the term in the document's field.
    pub frequency: u32,
    /// Word positions of the occurrences, ascending.
    pub positions: Vec<u32>,
}

impl Posting {
    /// Create a posting without position information.
    pub fn new(doc_id: DocId, frequency: u32) -> Self {
        Posting {
            doc_id,
            frequency,
            positions: Vec::new(),
        }
    }
}

/// Read-only collection and document statistics used by weighting models.
///
/// Every accessor is total: unknown fields, terms or documents report zero.
pub trait IndexStatistics: Send + Sync + Debug {
    /// Total number of indexed documents.
    fn doc_count_all(&self) -> u64;

    /// Total number of term occurrences in the whole index.
    fn total_term_count(&self) -> u64;

    /// Total number of term occurrences in a field across all documents.
    fn field_length(&self, field: &str) -> u64;

    /// Total number of term occurrences in a document (all fields).
    fn doc_length(&self, doc_id: DocId) -> u64;

    /// Number of term occurrences in one field of one document.
    fn doc_field_length(&self, doc_id: DocId, field: &str) -> u64;

    /// Number of documents containing a term in a field.
    fn doc_frequency(&self, field: &str, term: &str) -> u64;

    /// Total number of occurrences of a term in a field across all documents.
    fn term_count(&self, field: &str, term: &str) -> u64;
}

/// Trait for index readers.
///
/// Reader access is fallible: a closed or unreachable reader reports an error,
/// which callers propagate rather than retry.
pub trait IndexReader: IndexStatistics {
    /// Translate a field name to the reader's field number.
    fn fieldname_to_num(&self, field: &str) -> Option<usize>;

    /// Get the sorted distinct terms indexed for a field.
    fn lexicon(&self, field: &str) -> Result<Vec<String>>;

    /// Get the posting list of a term, ordered by document ID.
    fn postings(&self, field: &str, term: &str) -> Result<Vec<Posting>>;

    /// Check if the reader is closed.
    fn is_closed(&self) -> bool;

    /// Check whether a term has any postings in a field.
    fn contains_term(&self, field: &str, term: &str) -> Result<bool> {
        Ok(!self.postings(field, term)?.is_empty())
    }

    /// Get the terms of one document's field with their frequencies, in
    /// lexicon order.
    fn doc_vector(&self, doc_id: DocId, field: &str) -> Result<Vec<(String, u32)>> {
        let mut vector = Vec::new();
        for term in self.lexicon(field)? {
            let postings = self.postings(field, &term)?;
            if let Ok(idx) = postings.binary_search_by_key(&doc_id, |p| p.doc_id) {
                vector.push((term, postings[idx].frequency));
            }
        }
        Ok(vector)
    }

    /// Get the lexicon entries of a field that start with `prefix`, in order.
    fn expand_prefix(&self, field: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lexicon(field)?
            .into_iter()
            .filter(|term| term.starts_with(prefix))
            .collect())
    }
}
