//! Index capabilities consumed by the query core.
//!
//! The physical index is not part of this crate. Query algebra, scoring and
//! sorting only see it through two traits: [`IndexStatistics`] (infallible
//! collection/document statistics used by weighting models) and
//! [`IndexReader`] (fallible lexicon and posting access). [`MemoryIndex`] is an
//! in-memory reference implementation of both.

pub mod memory;
pub mod reader;

pub use self::memory::MemoryIndex;
pub use self::reader::{DocId, IndexReader, IndexStatistics, Posting};
