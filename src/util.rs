//! Shared utility modules used across Halberd components.

pub mod levenshtein;
