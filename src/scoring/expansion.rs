//! Query expansion from the terms of top-ranked documents.
//!
//! An [`Expander`] collects the term vectors of the best documents of a first
//! search and ranks their words with an [`ExpansionModel`], comparing how
//! concentrated each word is in those documents against its frequency in the
//! whole collection. The best words form a new query.

use std::fmt::Debug;

use ahash::AHashMap;
use tracing::debug;

use crate::error::Result;
use crate::index::reader::{DocId, IndexReader, IndexStatistics};
use crate::query::QueryNode;
use crate::scoring::weighting::finite_or_zero;

/// Scores candidate expansion words.
///
/// `weight_in_top` is the word's total weight in the top documents,
/// `weight_in_collection` its total count in the field across the index and
/// `top_total` the summed weight of every word in the top documents.
pub trait ExpansionModel: Send + Sync + Debug {
    /// Score one candidate word.
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        weight_in_top: f64,
        weight_in_collection: f64,
        top_total: f64,
    ) -> f64;

    /// The divisor that maps the best score into a comparable range.
    fn normalizer(&self, stats: &dyn IndexStatistics, max_weight: f64, top_total: f64) -> f64;

    /// Get the model name.
    fn name(&self) -> &'static str;
}

/// `w * log2((1 + f) / f) + log2(1 + f)`, zero when `f` is not positive.
fn bose_einstein(weight: f64, f: f64) -> f64 {
    if f <= 0.0 || !f.is_finite() {
        return 0.0;
    }
    finite_or_zero(weight * ((1.0 + f) / f).log2() + (1.0 + f).log2())
}

/// Bose-Einstein 1: `f` is the word's mean frequency per document.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bo1Model;

impl ExpansionModel for Bo1Model {
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        weight_in_top: f64,
        weight_in_collection: f64,
        _top_total: f64,
    ) -> f64 {
        let doc_count = stats.doc_count_all() as f64;
        if doc_count == 0.0 {
            return 0.0;
        }
        bose_einstein(weight_in_top, weight_in_collection / doc_count)
    }

    fn normalizer(&self, stats: &dyn IndexStatistics, max_weight: f64, _top_total: f64) -> f64 {
        let doc_count = stats.doc_count_all() as f64;
        if doc_count == 0.0 {
            return 0.0;
        }
        bose_einstein(max_weight, max_weight / doc_count)
    }

    fn name(&self) -> &'static str {
        "bo1"
    }
}

/// Bose-Einstein 2: `f` is the word's expected weight in the top documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bo2Model;

impl ExpansionModel for Bo2Model {
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        weight_in_top: f64,
        _weight_in_collection: f64,
        top_total: f64,
    ) -> f64 {
        let total = stats.total_term_count() as f64;
        if total == 0.0 {
            return 0.0;
        }
        bose_einstein(weight_in_top, weight_in_top * top_total / total)
    }

    fn normalizer(&self, stats: &dyn IndexStatistics, max_weight: f64, _top_total: f64) -> f64 {
        let total = stats.total_term_count() as f64;
        if total == 0.0 {
            return 0.0;
        }
        let doc_count = stats.doc_count_all() as f64;
        bose_einstein(max_weight, max_weight * doc_count / total)
    }

    fn name(&self) -> &'static str {
        "bo2"
    }
}

/// Kullback-Leibler divergence of the top documents from the collection.
///
/// Words relatively rarer in the top documents than in the collection score
/// zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct KlModel;

impl ExpansionModel for KlModel {
    fn score(
        &self,
        stats: &dyn IndexStatistics,
        weight_in_top: f64,
        weight_in_collection: f64,
        top_total: f64,
    ) -> f64 {
        let total = stats.total_term_count() as f64;
        if total == 0.0 || top_total <= 0.0 || weight_in_top <= 0.0 {
            return 0.0;
        }
        let in_top = weight_in_top / top_total;
        let in_collection = weight_in_collection / total;
        if in_top < in_collection {
            return 0.0;
        }
        finite_or_zero(in_top * (in_top / (weight_in_top / total)).log2())
    }

    fn normalizer(&self, stats: &dyn IndexStatistics, max_weight: f64, top_total: f64) -> f64 {
        let total = stats.total_term_count() as f64;
        if total == 0.0 || top_total <= 0.0 {
            return 0.0;
        }
        finite_or_zero(max_weight * (total / top_total).log2() * top_total)
    }

    fn name(&self) -> &'static str {
        "kl"
    }
}

/// Ranks the words of a set of top documents as expansion terms for one field.
#[derive(Debug)]
pub struct Expander<'a> {
    reader: &'a dyn IndexReader,
    field: String,
    model: Box<dyn ExpansionModel>,
    /// Collection count of every lexicon word of the field.
    collection_weight: AHashMap<String, f64>,
    /// Summed weight of each word over the added documents.
    top_weight: AHashMap<String, f64>,
    top_total: f64,
}

impl<'a> Expander<'a> {
    /// Create an expander using [`Bo1Model`].
    pub fn new<S: Into<String>>(reader: &'a dyn IndexReader, field: S) -> Result<Self> {
        Self::with_model(reader, field, Box::new(Bo1Model))
    }

    /// Create an expander with an explicit model.
    ///
    /// Reads the whole lexicon of `field` once; a closed reader is an error.
    pub fn with_model<S: Into<String>>(
        reader: &'a dyn IndexReader,
        field: S,
        model: Box<dyn ExpansionModel>,
    ) -> Result<Self> {
        let field = field.into();
        let collection_weight: AHashMap<String, f64> = reader
            .lexicon(&field)?
            .into_iter()
            .map(|word| {
                let count = reader.term_count(&field, &word) as f64;
                (word, count)
            })
            .collect();

        debug!(field, words = collection_weight.len(), model = model.name(), "created expander");
        Ok(Expander {
            reader,
            field,
            model,
            collection_weight,
            top_weight: AHashMap::new(),
            top_total: 0.0,
        })
    }

    /// Get the field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the model.
    pub fn model(&self) -> &dyn ExpansionModel {
        self.model.as_ref()
    }

    /// Summed weight of every word added so far.
    pub fn top_total(&self) -> f64 {
        self.top_total
    }

    /// Add the term vector of one top document as `(word, weight)` pairs.
    pub fn add<I, S>(&mut self, term_vector: I)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        for (word, weight) in term_vector {
            *self.top_weight.entry(word.into()).or_insert(0.0) += weight;
            self.top_total += weight;
        }
    }

    /// Add one indexed document, reading its term vector from the reader.
    pub fn add_document(&mut self, doc_id: DocId) -> Result<()> {
        let vector = self.reader.doc_vector(doc_id, &self.field)?;
        self.add(
            vector
                .into_iter()
                .map(|(word, frequency)| (word, f64::from(frequency))),
        );
        Ok(())
    }

    /// Get the `number` best words with their weights, best first.
    ///
    /// Weights are divided by the model's normalizer when `normalize` is set,
    /// otherwise by the best raw score. Ties are broken by word.
    pub fn expanded_terms(&self, number: usize, normalize: bool) -> Vec<(String, f64)> {
        let stats: &dyn IndexStatistics = self.reader;

        let mut max_weight = 0.0f64;
        let mut scored: Vec<(String, f64)> = self
            .top_weight
            .iter()
            .map(|(word, weight)| {
                let in_collection = self.collection_weight.get(word).copied().unwrap_or(0.0);
                let score = self.model.score(stats, *weight, in_collection, self.top_total);
                max_weight = max_weight.max(score);
                (word.clone(), score)
            })
            .collect();

        let norm = if normalize {
            self.model.normalizer(stats, max_weight, self.top_total)
        } else {
            max_weight
        };
        for (_, score) in &mut scored {
            *score = if norm == 0.0 { 0.0 } else { finite_or_zero(*score / norm) };
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(number);
        scored
    }

    /// Build an `Or` of the best words, each boosted by its normalized weight.
    ///
    /// Words with a zero weight are left out; with none left the query is
    /// `Null`.
    pub fn expanded_query(&self, number: usize) -> QueryNode {
        let mut terms: Vec<QueryNode> = self
            .expanded_terms(number, true)
            .into_iter()
            .filter(|(_, weight)| *weight > 0.0)
            .map(|(word, weight)| QueryNode::term(self.field.as_str(), word).with_boost(weight as f32))
            .collect();

        match terms.len() {
            0 => QueryNode::Null,
            1 => terms.remove(0),
            _ => QueryNode::or(terms),
        }
    }
}
