//! Text analysis helpers.
//!
//! The query core does not own an analysis chain; these are the two small
//! pieces it relies on: splitting field values into words for the reference
//! index, and the stemmer that defines when two lexicon words are morphological
//! variations of each other.

pub mod stemmer;
pub mod tokenizer;

pub use self::stemmer::{IdentityStemmer, SimpleStemmer, Stemmer};
pub use self::tokenizer::{Token, analyze};
