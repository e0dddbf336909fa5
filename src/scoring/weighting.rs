//! The weighting interface and the statistics helpers shared by models.

use std::fmt::Debug;

use crate::index::reader::{DocId, IndexStatistics};

/// A relevance model scoring one (document, term) pair.
///
/// Implementations are stateless apart from their tuning parameters and read
/// every statistic they need from `stats`. Scoring is total: degenerate
/// statistics (zero lengths, zero frequencies, empty index) produce `0.0`,
/// never NaN or an infinity.
pub trait Weighting: Send + Sync + Debug {
    /// Score `term` in `field` of document `doc_id`.
    ///
    /// `weight` is the term frequency in the document multiplied by the query
    /// boost; `qtf` is the number of times the term occurs in the query.
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        field: &str,
        term: &str,
        doc_id: DocId,
        weight: f64,
        qtf: u32,
    ) -> f64;

    /// Get the model name.
    fn name(&self) -> &'static str;
}

/// Replace NaN and infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Inverse document frequency: `ln(N / (df + 1)) + 1`; zero for an empty index.
pub fn idf(stats: &dyn IndexStatistics, field: &str, term: &str) -> f64 {
    let doc_count = stats.doc_count_all();
    if doc_count == 0 {
        return 0.0;
    }
    let df = stats.doc_frequency(field, term) as f64;
    (doc_count as f64 / (df + 1.0)).ln() + 1.0
}

/// Average number of term occurrences in `field` per document.
pub fn avg_field_length(stats: &dyn IndexStatistics, field: &str) -> f64 {
    let doc_count = stats.doc_count_all();
    if doc_count == 0 {
        return 0.0;
    }
    stats.field_length(field) as f64 / doc_count as f64
}

/// Average number of term occurrences per document.
pub fn avg_doc_length(stats: &dyn IndexStatistics) -> f64 {
    let doc_count = stats.doc_count_all();
    if doc_count == 0 {
        return 0.0;
    }
    stats.total_term_count() as f64 / doc_count as f64
}

/// A document's length divided by the average document length.
pub fn doc_length_ratio(stats: &dyn IndexStatistics, doc_id: DocId) -> f64 {
    let average = avg_doc_length(stats);
    if average == 0.0 {
        return 0.0;
    }
    stats.doc_length(doc_id) as f64 / average
}

/// A document's field length divided by the average length of that field.
pub fn field_length_ratio(stats: &dyn IndexStatistics, doc_id: DocId, field: &str) -> f64 {
    let average = avg_field_length(stats, field);
    if average == 0.0 {
        return 0.0;
    }
    stats.doc_field_length(doc_id, field) as f64 / average
}

/// Fixed statistics for exercising models without an index.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct FixedStatistics {
    pub doc_count: u64,
    pub total_terms: u64,
    pub field_length: u64,
    pub doc_length: u64,
    pub doc_field_length: u64,
    pub doc_frequency: u64,
    pub term_count: u64,
}

#[cfg(test)]
impl FixedStatistics {
    pub(crate) fn typical() -> Self {
        FixedStatistics {
            doc_count: 1000,
            total_terms: 120_000,
            field_length: 60_000,
            doc_length: 150,
            doc_field_length: 60,
            doc_frequency: 50,
            term_count: 80,
        }
    }

    pub(crate) fn empty() -> Self {
        FixedStatistics {
            doc_count: 0,
            total_terms: 0,
            field_length: 0,
            doc_length: 0,
            doc_field_length: 0,
            doc_frequency: 0,
            term_count: 0,
        }
    }
}

#[cfg(test)]
impl IndexStatistics for FixedStatistics {
    fn doc_count_all(&self) -> u64 {
        self.doc_count
    }

    fn total_term_count(&self) -> u64 {
        self.total_terms
    }

    fn field_length(&self, _field: &str) -> u64 {
        self.field_length
    }

    fn doc_length(&self, _doc_id: DocId) -> u64 {
        self.doc_length
    }

    fn doc_field_length(&self, _doc_id: DocId, _field: &str) -> u64 {
        self.doc_field_length
    }

    fn doc_frequency(&self, _field: &str, _term: &str) -> u64 {
        self.doc_frequency
    }

    fn term_count(&self, _field: &str, _term: &str) -> u64 {
        self.term_count
    }
}
