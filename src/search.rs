//! Searching: evaluating query trees into ranked or field-sorted hits.

pub mod results;
pub mod searcher;

pub use self::results::{Paginator, Results};
pub use self::searcher::{Hit, Searcher};
