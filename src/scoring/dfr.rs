//! Divergence-from-randomness models: DFree, DLH13 and InL2.

use std::f64::consts::PI;

use crate::index::reader::{DocId, IndexStatistics};
use crate::scoring::weighting::{Weighting, avg_doc_length, avg_field_length, finite_or_zero};

/// Parameter-free DFR model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DFree;

impl Weighting for DFree {
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        field: &str,
        term: &str,
        doc_id: DocId,
        weight: f64,
        qtf: u32,
    ) -> f64 {
        let doc_length = stats.doc_length(doc_id) as f64;
        let term_count = stats.term_count(field, term) as f64;
        if weight <= 0.0 || doc_length == 0.0 || term_count == 0.0 {
            return 0.0;
        }

        let prior = weight / doc_length;
        let post = (weight + 1.0) / doc_length;
        let inv_prior = stats.field_length(field) as f64 / term_count;
        let norm = weight * (post / prior).log2();

        finite_or_zero(
            -(qtf as f64)
                * norm
                * (weight * -(prior * inv_prior).log2()
                    + (weight + 1.0) * (post * inv_prior).log2()
                    + 0.5 * (post / prior).log2()),
        )
    }

    fn name(&self) -> &'static str {
        "dfree"
    }
}

/// DLH13 hypergeometric DFR model with smoothing `k`.
#[derive(Debug, Clone, Copy)]
pub struct Dlh13 {
    k: f64,
}

impl Default for Dlh13 {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Dlh13 {
    /// Create a DLH13 model.
    pub fn new(k: f64) -> Self {
        Dlh13 { k }
    }

    /// Get `k`.
    pub fn k(&self) -> f64 {
        self.k
    }
}

impl Weighting for Dlh13 {
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        field: &str,
        term: &str,
        doc_id: DocId,
        weight: f64,
        qtf: u32,
    ) -> f64 {
        let doc_length = stats.doc_length(doc_id) as f64;
        let term_count = stats.term_count(field, term) as f64;
        let doc_count = stats.doc_count_all() as f64;
        if weight <= 0.0 || doc_length == 0.0 || term_count == 0.0 || doc_count == 0.0 {
            return 0.0;
        }

        let f = weight / doc_length;
        let avg_length = avg_field_length(stats, field);
        let information = weight * ((weight * avg_length / doc_length) * (doc_count / term_count)).log2();
        let correction = 0.5 * (2.0 * PI * weight * (1.0 - f)).log2();

        finite_or_zero(-(qtf as f64) * (information + correction) / (weight + self.k))
    }

    fn name(&self) -> &'static str {
        "dlh13"
    }
}

/// InL2: inverse document frequency with Laplace after-effect and length
/// normalization 2.
#[derive(Debug, Clone, Copy)]
pub struct InL2 {
    c: f64,
}

impl Default for InL2 {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl InL2 {
    /// Create an InL2 model.
    pub fn new(c: f64) -> Self {
        InL2 { c }
    }

    /// Get `c`.
    pub fn c(&self) -> f64 {
        self.c
    }
}

impl Weighting for InL2 {
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        field: &str,
        term: &str,
        doc_id: DocId,
        weight: f64,
        qtf: u32,
    ) -> f64 {
        let doc_length = stats.doc_length(doc_id) as f64;
        if doc_length == 0.0 {
            return 0.0;
        }

        let tf = weight * (1.0 + self.c * avg_doc_length(stats) / doc_length).ln();
        let norm = 1.0 / (tf + 1.0);
        let df = stats.doc_frequency(field, term) as f64;
        let idf_dfr = ((stats.doc_count_all() as f64 + 1.0) / (df + 0.5)).log2();

        finite_or_zero(tf * idf_dfr * qtf as f64 * norm)
    }

    fn name(&self) -> &'static str {
        "inl2"
    }
}
