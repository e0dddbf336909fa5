//! Search results and pagination.

use std::collections::BTreeSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{HalberdError, Result};
use crate::index::reader::DocId;
use crate::search::searcher::Hit;

/// The outcome of a search: the ranked hits kept within the limit, plus the
/// set of every matching document, including those ranked past the limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Results {
    hits: Vec<Hit>,
    docs: BTreeSet<DocId>,
}

impl Results {
    /// Create results from ranked hits and the full set of matching documents.
    ///
    /// Hit documents are always part of the matching set.
    pub fn new(hits: Vec<Hit>, docs: BTreeSet<DocId>) -> Self {
        let mut docs = docs;
        docs.extend(hits.iter().map(|hit| hit.doc_id));
        Results { hits, docs }
    }

    /// Number of ranked hits.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether there are no ranked hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Number of matching documents, ranked or not.
    pub fn total(&self) -> usize {
        self.docs.len()
    }

    /// Get the ranked hits.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Get the hit at rank `n`.
    pub fn get(&self, n: usize) -> Option<&Hit> {
        self.hits.get(n)
    }

    /// Get every matching document.
    pub fn docs(&self) -> &BTreeSet<DocId> {
        &self.docs
    }

    /// Whether `doc_id` matched the search.
    pub fn contains(&self, doc_id: DocId) -> bool {
        self.docs.contains(&doc_id)
    }

    /// Iterate over the ranked document IDs.
    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.hits.iter().map(|hit| hit.doc_id)
    }

    /// Iterate over the ranked hits.
    pub fn iter(&self) -> std::slice::Iter<'_, Hit> {
        self.hits.iter()
    }

    /// Take the ranked hits.
    pub fn into_hits(self) -> Vec<Hit> {
        self.hits
    }

    /// Append the hits of `other` after these ones.
    ///
    /// Documents that already matched this search, ranked or not, are not
    /// added again. The matching sets are united.
    pub fn extend(&mut self, other: &Results) {
        let docs = &self.docs;
        let appended: Vec<Hit> = other
            .hits
            .iter()
            .filter(|hit| !docs.contains(&hit.doc_id))
            .cloned()
            .collect();
        self.hits.extend(appended);
        self.docs.extend(other.docs.iter().copied());
    }

    /// Keep only the documents that also matched `other`, preserving rank order.
    pub fn filter(&mut self, other: &Results) {
        self.docs.retain(|doc_id| other.docs.contains(doc_id));
        let docs = &self.docs;
        self.hits.retain(|hit| docs.contains(&hit.doc_id));
    }
}

impl<'a> IntoIterator for &'a Results {
    type Item = &'a Hit;
    type IntoIter = std::slice::Iter<'a, Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

/// Splits ranked hits into fixed-size pages numbered from one.
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'r> {
    results: &'r Results,
    per_page: usize,
}

impl<'r> Paginator<'r> {
    /// Create a paginator showing `per_page` hits per page.
    pub fn new(results: &'r Results, per_page: usize) -> Result<Self> {
        if per_page == 0 {
            return Err(HalberdError::other("Page length must be positive"));
        }
        Ok(Paginator { results, per_page })
    }

    /// Get the page length.
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Number of pages. Empty results still have one, empty, page.
    pub fn page_count(&self) -> usize {
        self.results.len().div_ceil(self.per_page).max(1)
    }

    /// Range of ranks shown on page `page`; empty outside `1..=page_count()`.
    pub fn page_range(&self, page: usize) -> Range<usize> {
        if page == 0 {
            return 0..0;
        }
        let len = self.results.len();
        let lower = ((page - 1) * self.per_page).min(len);
        let upper = (lower + self.per_page).min(len);
        lower..upper
    }

    /// Get the hits on page `page`.
    pub fn page(&self, page: usize) -> &'r [Hit] {
        &self.results.hits()[self.page_range(page)]
    }
}
