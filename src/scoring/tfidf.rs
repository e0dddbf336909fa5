//! Vector-space style models: TF-IDF, Cosine and raw Frequency.

use crate::index::reader::{DocId, IndexStatistics};
use crate::scoring::weighting::{Weighting, finite_or_zero, idf};

/// Query maximum frequency used by [`Cosine`]. Fixed at one.
const QUERY_MAX_FREQUENCY: f64 = 1.0;

/// Plain `weight * idf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdf;

impl Weighting for TfIdf {
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        field: &str,
        term: &str,
        _doc_id: DocId,
        weight: f64,
        _qtf: u32,
    ) -> f64 {
        finite_or_zero(weight * idf(stats, field, term))
    }

    fn name(&self) -> &'static str {
        "tf_idf"
    }
}

/// Cosine: `((1 + ln w) * idf) * ((0.5 + 0.5 * qtf / QMF) * idf)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl Weighting for Cosine {
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        field: &str,
        term: &str,
        _doc_id: DocId,
        weight: f64,
        qtf: u32,
    ) -> f64 {
        if weight <= 0.0 {
            return 0.0;
        }
        let idf = idf(stats, field, term);
        let doc_term_weight = (1.0 + weight.ln()) * idf;
        let query_term_weight = (0.5 + 0.5 * qtf as f64 / QUERY_MAX_FREQUENCY) * idf;
        finite_or_zero(doc_term_weight * query_term_weight)
    }

    fn name(&self) -> &'static str {
        "cosine"
    }
}

/// Total occurrences of the term in the field across the whole index.
///
/// This ignores the document and the weight, so every document matching the
/// term gets the same score. It is a baseline rather than a ranking.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frequency;

impl Weighting for Frequency {
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        field: &str,
        term: &str,
        _doc_id: DocId,
        _weight: f64,
        _qtf: u32,
    ) -> f64 {
        stats.term_count(field, term) as f64
    }

    fn name(&self) -> &'static str {
        "frequency"
    }
}
