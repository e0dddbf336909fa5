//! # Halberd
//!
//! The retrieval core of a full-text search library.
//!
//! ## Features
//!
//! - A closed query-tree model with structural equality
//! - A permissive query-string parser (fields, boosts, phrases, ranges, wildcards)
//! - Tree algebra: `apply`, `replace`, term collection, `normalize`, `simplify`
//! - Eight interchangeable weighting models (BM25F, Cosine, DFree, DLH13,
//!   Hiemstra LM, InL2, TF-IDF, Frequency)
//! - Query expansion from top documents (Bo1, Bo2, KL)
//! - A lazily built field sort cache
//! - An in-memory reference index and a searcher to evaluate query trees
//! - Result merging, filtering and pagination
//! - Passage highlighting

pub mod analysis;
pub mod error;
pub mod highlight;
pub mod index;
pub mod query;
pub mod schema;
pub mod scoring;
pub mod search;
pub mod sorting;
pub mod util;

pub mod prelude {
    pub use crate::error::{HalberdError, ParseError, Result};
    pub use crate::highlight::{HighlightConfig, Highlighter};
    pub use crate::index::{DocId, IndexReader, IndexStatistics, MemoryIndex, Posting};
    pub use crate::query::{QueryNode, QueryParser, SimplifyConfig};
    pub use crate::schema::{FieldType, Schema};
    pub use crate::scoring::{Expander, ExpansionModel, Weighting, WeightingConfig};
    pub use crate::search::{Hit, Paginator, Results, Searcher};
    pub use crate::sorting::FieldSorter;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
