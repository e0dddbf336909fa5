//! Weighting models scoring (document, term) pairs from index statistics.
//!
//! Every model implements [`Weighting`]. Models only depend on the
//! [`IndexStatistics`](crate::index::IndexStatistics) trait, so they can be
//! exercised against any index, including fixed statistics in tests.

pub mod bm25f;
pub mod config;
pub mod dfr;
pub mod expansion;
pub mod language_model;
pub mod tfidf;
pub mod weighting;

pub use self::bm25f::Bm25f;
pub use self::config::{WeightingConfig, WeightingRegistry};
pub use self::dfr::{DFree, Dlh13, InL2};
pub use self::expansion::{Bo1Model, Bo2Model, Expander, ExpansionModel, KlModel};
pub use self::language_model::HiemstraLm;
pub use self::tfidf::{Cosine, Frequency, TfIdf};
pub use self::weighting::{
    Weighting, avg_doc_length, avg_field_length, doc_length_ratio, field_length_ratio,
    finite_or_zero, idf,
};
