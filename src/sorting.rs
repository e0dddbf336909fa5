//! Score-independent result ordering by the value of a field.
//!
//! A [`FieldSorter`] ranks every document by the position of its value in the
//! field's lexicon. The rank table is built once, on the first call to
//! [`FieldSorter::doc_orders`], and reused afterwards. It is never updated:
//! create a new sorter after the index changes.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HalberdError, Result};
use crate::index::reader::{DocId, IndexReader};

/// What order documents without a value in the sort field receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValues {
    /// Order `-1` in both directions, so they sort after every ranked document.
    #[default]
    Last,
    /// Rank equal to the document ID. The resulting order is not comparable
    /// with real ranks.
    Identity,
}

/// Sorter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortConfig {
    /// Policy for documents without a value.
    #[serde(default)]
    pub missing: MissingValues,
}

impl SortConfig {
    /// Set the missing value policy.
    pub fn with_missing(mut self, missing: MissingValues) -> Self {
        self.missing = missing;
        self
    }
}

#[derive(Debug)]
enum SortCache {
    Unbuilt,
    Built {
        /// Rank per document ID; `None` when the document has no value.
        ranks: Vec<Option<u64>>,
        /// Highest rank assigned.
        limit: u64,
    },
}

/// Lazily built rank table over one field of an index.
#[derive(Debug)]
pub struct FieldSorter<'a> {
    reader: &'a dyn IndexReader,
    field: String,
    config: SortConfig,
    cache: RwLock<SortCache>,
}

impl<'a> FieldSorter<'a> {
    /// Create a sorter over `field` with the default configuration.
    pub fn new<S: Into<String>>(reader: &'a dyn IndexReader, field: S) -> Self {
        Self::with_config(reader, field, SortConfig::default())
    }

    /// Create a sorter over `field`.
    pub fn with_config<S: Into<String>>(
        reader: &'a dyn IndexReader,
        field: S,
        config: SortConfig,
    ) -> Self {
        FieldSorter {
            reader,
            field: field.into(),
            config,
            cache: RwLock::new(SortCache::Unbuilt),
        }
    }

    /// Get the sort field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the configuration.
    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Check whether the rank table has been built.
    pub fn is_built(&self) -> bool {
        matches!(*self.cache.read(), SortCache::Built { .. })
    }

    /// Compute the sort order of each document in `docs`.
    ///
    /// A higher order sorts first. Normally `order = limit - rank`, so the
    /// lexically smallest value comes first; with `reversed` the order is the
    /// rank itself. Documents are yielded in input order.
    pub fn doc_orders(
        &self,
        docs: &[DocId],
        reversed: bool,
    ) -> Result<impl Iterator<Item = (DocId, i64)> + use<>> {
        self.ensure_built()?;

        let cache = self.cache.read();
        let SortCache::Built { ranks, limit } = &*cache else {
            return Err(HalberdError::other("sort cache is not built"));
        };
        let limit = *limit as i64;

        let orders: Vec<(DocId, i64)> = docs
            .iter()
            .map(|&doc_id| {
                let rank = ranks.get(doc_id as usize).copied().flatten();
                let order = match (rank, self.config.missing) {
                    (Some(rank), _) => ordered(rank as i64, limit, reversed),
                    (None, MissingValues::Identity) => ordered(doc_id as i64, limit, reversed),
                    (None, MissingValues::Last) => -1,
                };
                (doc_id, order)
            })
            .collect();

        Ok(orders.into_iter())
    }

    fn ensure_built(&self) -> Result<()> {
        if self.is_built() {
            return Ok(());
        }

        let mut cache = self.cache.write();
        // Another caller may have built it while we waited for the lock.
        if let SortCache::Built { .. } = *cache {
            return Ok(());
        }
        *cache = self.build()?;
        Ok(())
    }

    fn build(&self) -> Result<SortCache> {
        if self.reader.fieldname_to_num(&self.field).is_none() {
            return Err(HalberdError::field(format!(
                "Cannot sort on unknown field '{}'",
                self.field
            )));
        }

        let doc_count = self.reader.doc_count_all() as usize;
        let mut ranks = vec![None; doc_count];
        let lexicon = self.reader.lexicon(&self.field)?;

        for (rank, term) in lexicon.iter().enumerate() {
            for posting in self.reader.postings(&self.field, term)? {
                let doc = posting.doc_id as usize;
                if doc >= ranks.len() {
                    ranks.resize(doc + 1, None);
                }
                ranks[doc] = Some(rank as u64);
            }
        }
        let limit = lexicon.len().saturating_sub(1) as u64;

        debug!(
            field = %self.field,
            docs = ranks.len(),
            values = lexicon.len(),
            "built field sort cache"
        );
        Ok(SortCache::Built { ranks, limit })
    }
}

fn ordered(rank: i64, limit: i64, reversed: bool) -> i64 {
    if reversed { rank } else { limit - rank }
}
