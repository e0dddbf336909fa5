//! BM25F, the default weighting model.

use ahash::AHashMap;

use crate::index::reader::{DocId, IndexStatistics};
use crate::scoring::weighting::{Weighting, field_length_ratio, finite_or_zero, idf};

/// BM25F with per-field length normalization and boosts.
///
/// `score = idf * (w + K1 + 1) / (w + K1 * ((1 - B) + B * fieldLenRatio))`,
/// where `w` is first multiplied by the field's boost.
#[derive(Debug, Clone)]
pub struct Bm25f {
    /// Length normalization strength.
    b: f64,
    /// Term frequency saturation.
    k1: f64,
    /// Per-field overrides of `b`.
    field_b: AHashMap<String, f64>,
    /// Per-field multipliers applied to the weight.
    field_boost: AHashMap<String, f64>,
}

impl Default for Bm25f {
    fn default() -> Self {
        Self::new(0.75, 1.2)
    }
}

impl Bm25f {
    /// Create a BM25F model with the given `b` and `k1`.
    pub fn new(b: f64, k1: f64) -> Self {
        Bm25f {
            b,
            k1,
            field_b: AHashMap::new(),
            field_boost: AHashMap::new(),
        }
    }

    /// Override `b` for one field.
    pub fn with_field_b<S: Into<String>>(mut self, field: S, b: f64) -> Self {
        self.field_b.insert(field.into(), b);
        self
    }

    /// Multiply weights in one field by `boost`.
    pub fn with_field_boost<S: Into<String>>(mut self, field: S, boost: f64) -> Self {
        self.field_boost.insert(field.into(), boost);
        self
    }

    /// Get `b`.
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Get `k1`.
    pub fn k1(&self) -> f64 {
        self.k1
    }
}

impl Weighting for Bm25f {
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        field: &str,
        term: &str,
        doc_id: DocId,
        weight: f64,
        _qtf: u32,
    ) -> f64 {
        let weight = weight * self.field_boost.get(field).copied().unwrap_or(1.0);
        let b = self.field_b.get(field).copied().unwrap_or(self.b);
        let idf = idf(stats, field, term);
        let ratio = field_length_ratio(stats, doc_id, field);

        finite_or_zero(idf * (weight + self.k1 + 1.0) / (weight + self.k1 * ((1.0 - b) + b * ratio)))
    }

    fn name(&self) -> &'static str {
        "bm25f"
    }
}
