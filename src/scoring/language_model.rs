//! Hiemstra's language model.

use crate::index::reader::{DocId, IndexStatistics};
use crate::scoring::weighting::{Weighting, finite_or_zero};

/// Hiemstra LM with smoothing `c`:
/// `ln(1 + (c * w * fieldLength) / ((1 - c) * termCount * docLength))`.
#[derive(Debug, Clone, Copy)]
pub struct HiemstraLm {
    c: f64,
}

impl Default for HiemstraLm {
    fn default() -> Self {
        Self::new(0.15)
    }
}

impl HiemstraLm {
    /// Create a Hiemstra language model.
    pub fn new(c: f64) -> Self {
        HiemstraLm { c }
    }

    /// Get `c`.
    pub fn c(&self) -> f64 {
        self.c
    }
}

impl Weighting for HiemstraLm {
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        field: &str,
        term: &str,
        doc_id: DocId,
        weight: f64,
        _qtf: u32,
    ) -> f64 {
        let term_count = stats.term_count(field, term) as f64;
        let doc_length = stats.doc_length(doc_id) as f64;
        let denominator = (1.0 - self.c) * term_count * doc_length;
        if denominator == 0.0 {
            return 0.0;
        }
        let numerator = self.c * weight * stats.field_length(field) as f64;
        finite_or_zero((1.0 + numerator / denominator).ln())
    }

    fn name(&self) -> &'static str {
        "hiemstra_lm"
    }
}
