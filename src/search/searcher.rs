//! Query tree evaluation over an index reader.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{HalberdError, Result};
use crate::index::reader::{DocId, IndexReader, IndexStatistics};
use crate::query::{PhraseQuery, QueryNode, RangeQuery, SimplifyConfig};
use crate::scoring::{Expander, Weighting};
use crate::search::results::Results;
use crate::sorting::{FieldSorter, SortConfig};

/// Matching documents and their accumulated scores, ordered by document ID.
type Scores = BTreeMap<DocId, f64>;

/// A search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// The matching document.
    pub doc_id: DocId,
    /// The relevance score. Sorted searches still report it.
    pub score: f64,
}

/// Evaluates query trees against one reader with one weighting model.
///
/// Pattern leaves are expanded through [`QueryNode::simplify_with`] before
/// evaluation. Field sorters are created on demand and kept for the lifetime
/// of the searcher, so their rank tables are built at most once.
#[derive(Debug)]
pub struct Searcher<'a> {
    reader: &'a dyn IndexReader,
    weighting: Box<dyn Weighting>,
    simplify_config: SimplifyConfig,
    sort_config: SortConfig,
    sorters: Mutex<AHashMap<String, Arc<FieldSorter<'a>>>>,
}

impl<'a> Searcher<'a> {
    /// Create a searcher.
    pub fn new(reader: &'a dyn IndexReader, weighting: Box<dyn Weighting>) -> Self {
        Searcher {
            reader,
            weighting,
            simplify_config: SimplifyConfig::default(),
            sort_config: SortConfig::default(),
            sorters: Mutex::new(AHashMap::new()),
        }
    }

    /// Set the configuration used to expand pattern leaves.
    pub fn with_simplify_config(mut self, config: SimplifyConfig) -> Self {
        self.simplify_config = config;
        self
    }

    /// Set the configuration of field sorters created by this searcher.
    pub fn with_sort_config(mut self, config: SortConfig) -> Self {
        self.sort_config = config;
        self
    }

    /// Get the reader.
    pub fn reader(&self) -> &'a dyn IndexReader {
        self.reader
    }

    /// Get the weighting model.
    pub fn weighting(&self) -> &dyn Weighting {
        self.weighting.as_ref()
    }

    /// Get the sorter for `field`, creating it on first use.
    pub fn sorter(&self, field: &str) -> Arc<FieldSorter<'a>> {
        let mut sorters = self.sorters.lock();
        sorters
            .entry(field.to_string())
            .or_insert_with(|| {
                Arc::new(FieldSorter::with_config(self.reader, field, self.sort_config))
            })
            .clone()
    }

    /// Find the `limit` best scoring documents, by descending score then
    /// ascending document ID.
    pub fn search(&self, query: &QueryNode, limit: usize) -> Result<Vec<Hit>> {
        Ok(self.search_results(query, limit)?.into_hits())
    }

    /// Like [`Searcher::search`], also keeping the set of every matching
    /// document.
    pub fn search_results(&self, query: &QueryNode, limit: usize) -> Result<Results> {
        let scores = self.matches(query)?;
        let docs: BTreeSet<DocId> = scores.keys().copied().collect();

        let mut hits: Vec<Hit> = scores
            .into_iter()
            .map(|(doc_id, score)| Hit { doc_id, score })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
        hits.truncate(limit);

        debug!(query = %query, hits = hits.len(), total = docs.len(), "search complete");
        Ok(Results::new(hits, docs))
    }

    /// Get the `number` most characteristic words of `field` in `docs`,
    /// ranked by [`Bo1Model`](crate::scoring::Bo1Model).
    pub fn key_terms(&self, docs: &[DocId], field: &str, number: usize) -> Result<Vec<(String, f64)>> {
        let mut expander = Expander::new(self.reader, field)?;
        for &doc_id in docs {
            expander.add_document(doc_id)?;
        }
        Ok(expander.expanded_terms(number, true))
    }

    /// Find matching documents ordered by their value in `field` rather than
    /// by score. Ties keep ascending document ID order.
    pub fn search_sorted(
        &self,
        query: &QueryNode,
        field: &str,
        reversed: bool,
        limit: usize,
    ) -> Result<Vec<Hit>> {
        let scores = self.matches(query)?;
        let docs: Vec<DocId> = scores.keys().copied().collect();

        let sorter = self.sorter(field);
        let mut ordered: Vec<(DocId, i64)> = sorter.doc_orders(&docs, reversed)?.collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ordered.truncate(limit);

        let hits: Vec<Hit> = ordered
            .into_iter()
            .map(|(doc_id, _)| Hit {
                doc_id,
                score: scores.get(&doc_id).copied().unwrap_or(0.0),
            })
            .collect();

        debug!(query = %query, field, reversed, hits = hits.len(), "sorted search complete");
        Ok(hits)
    }

    /// Evaluate a query into every matching document and its score.
    pub fn matches(&self, query: &QueryNode) -> Result<BTreeMap<DocId, f64>> {
        if self.reader.is_closed() {
            return Err(HalberdError::closed());
        }

        let query = query.normalize().simplify_with(self.reader, &self.simplify_config)?;
        let evaluation = Evaluation {
            searcher: self,
            query_frequencies: query_frequencies(&query),
        };
        evaluation.evaluate(&query)
    }
}

/// Count how often each (field, term) pair occurs in the query.
fn query_frequencies(query: &QueryNode) -> AHashMap<(String, String), u32> {
    fn visit(node: &QueryNode, counts: &mut AHashMap<(String, String), u32>) {
        match node {
            QueryNode::Term(q) => {
                *counts.entry((q.field.clone(), q.text.clone())).or_insert(0) += 1;
            }
            QueryNode::Phrase(q) => {
                for word in &q.words {
                    *counts.entry((q.field.clone(), word.clone())).or_insert(0) += 1;
                }
            }
            other => {
                for child in other.children() {
                    visit(child, counts);
                }
            }
        }
    }

    let mut counts = AHashMap::new();
    visit(query, &mut counts);
    counts
}

struct Evaluation<'s, 'a> {
    searcher: &'s Searcher<'a>,
    query_frequencies: AHashMap<(String, String), u32>,
}

impl Evaluation<'_, '_> {
    fn stats(&self) -> &dyn IndexStatistics {
        self.searcher.reader
    }

    fn qtf(&self, field: &str, term: &str) -> u32 {
        self.query_frequencies
            .get(&(field.to_string(), term.to_string()))
            .copied()
            .unwrap_or(1)
    }

    fn score(&self, field: &str, term: &str, doc_id: DocId, weight: f64) -> f64 {
        let qtf = self.qtf(field, term);
        self.searcher
            .weighting
            .score(self.stats(), field, term, doc_id, weight, qtf)
    }

    fn evaluate(&self, node: &QueryNode) -> Result<Scores> {
        let scores = match node {
            QueryNode::Term(q) => self.term(&q.field, &q.text, q.boost)?,
            QueryNode::Phrase(q) => self.phrase(q)?,
            QueryNode::Prefix(_)
            | QueryNode::Wildcard(_)
            | QueryNode::FuzzyTerm(_)
            | QueryNode::Variations(_) => {
                let config = &self.searcher.simplify_config;
                self.evaluate(&node.simplify_with(self.searcher.reader, config)?)?
            }
            QueryNode::TermRange(q) => {
                let terms: Vec<String> = self
                    .searcher
                    .reader
                    .lexicon(&q.field)?
                    .into_iter()
                    .filter(|term| q.contains(term))
                    .collect();
                self.terms(&q.field, &terms, q.boost)?
            }
            QueryNode::NumericRange(q) => {
                let terms = self.numeric_terms(q)?;
                self.terms(&q.field, &terms, q.boost)?
            }
            QueryNode::Every(q) => self.every(q.field.as_deref(), q.boost as f64),
            QueryNode::And(q) => {
                let mut positive = Vec::new();
                let mut excluded = Scores::new();
                for child in &q.children {
                    match child {
                        QueryNode::Not(not) => excluded.extend(self.evaluate(&not.child)?),
                        other => positive.push(self.evaluate(other)?),
                    }
                }
                // Only negations: everything not excluded.
                let mut scores = if positive.is_empty() {
                    self.every(None, 1.0)
                } else {
                    intersect(positive)
                };
                scores.retain(|doc_id, _| !excluded.contains_key(doc_id));
                scale(scores, q.boost)
            }
            QueryNode::Or(q) => {
                let mut scores = Scores::new();
                for child in &q.children {
                    for (doc_id, score) in self.evaluate(child)? {
                        *scores.entry(doc_id).or_insert(0.0) += score;
                    }
                }
                scale(scores, q.boost)
            }
            QueryNode::Not(q) => {
                let excluded = self.evaluate(&q.child)?;
                let mut scores = self.every(None, q.boost as f64);
                scores.retain(|doc_id, _| !excluded.contains_key(doc_id));
                scores
            }
            QueryNode::AndNot(q) => {
                let excluded = self.evaluate(&q.negative)?;
                let mut scores = self.evaluate(&q.positive)?;
                scores.retain(|doc_id, _| !excluded.contains_key(doc_id));
                scale(scores, q.boost)
            }
            QueryNode::Null => Scores::new(),
        };
        trace!(node = %node, matches = scores.len(), "evaluated query node");
        Ok(scores)
    }

    fn term(&self, field: &str, text: &str, boost: f32) -> Result<Scores> {
        let mut scores = Scores::new();
        for posting in self.searcher.reader.postings(field, text)? {
            let weight = posting.frequency as f64 * boost as f64;
            scores.insert(posting.doc_id, self.score(field, text, posting.doc_id, weight));
        }
        Ok(scores)
    }

    fn terms(&self, field: &str, terms: &[String], boost: f32) -> Result<Scores> {
        let mut scores = Scores::new();
        for text in terms {
            for (doc_id, score) in self.term(field, text, boost)? {
                *scores.entry(doc_id).or_insert(0.0) += score;
            }
        }
        Ok(scores)
    }

    fn numeric_terms(&self, query: &RangeQuery<f64>) -> Result<Vec<String>> {
        Ok(self
            .searcher
            .reader
            .lexicon(&query.field)?
            .into_iter()
            .filter(|term| term.parse::<f64>().is_ok_and(|value| query.contains(&value)))
            .collect())
    }

    fn phrase(&self, query: &PhraseQuery) -> Result<Scores> {
        let reader = self.searcher.reader;
        let mut scores = Scores::new();
        if query.words.is_empty() {
            return Ok(scores);
        }

        // Positions of every word, per document holding all of them.
        let mut candidates: BTreeMap<DocId, Vec<Vec<u32>>> = BTreeMap::new();
        for (i, word) in query.words.iter().enumerate() {
            let postings = reader.postings(&query.field, word)?;
            if i == 0 {
                for posting in postings {
                    candidates.insert(posting.doc_id, vec![posting.positions]);
                }
            } else {
                let mut by_doc: AHashMap<DocId, Vec<u32>> = postings
                    .into_iter()
                    .map(|posting| (posting.doc_id, posting.positions))
                    .collect();
                candidates.retain(|doc_id, positions| match by_doc.remove(doc_id) {
                    Some(next) => {
                        positions.push(next);
                        true
                    }
                    None => false,
                });
            }
        }

        for (doc_id, positions) in candidates {
            let matches = query.count_matches(&positions);
            if matches == 0 {
                continue;
            }
            let weight = matches as f64 * query.boost as f64;
            let score: f64 = query
                .words
                .iter()
                .map(|word| self.score(&query.field, word, doc_id, weight))
                .sum();
            scores.insert(doc_id, score);
        }
        Ok(scores)
    }

    fn every(&self, field: Option<&str>, score: f64) -> Scores {
        let stats = self.stats();
        (0..stats.doc_count_all())
            .filter(|&doc_id| field.is_none_or(|field| stats.doc_field_length(doc_id, field) > 0))
            .map(|doc_id| (doc_id, score))
            .collect()
    }
}

fn intersect(mut children: Vec<Scores>) -> Scores {
    // Start from the smallest set.
    children.sort_by_key(|scores| scores.len());
    let mut iter = children.into_iter();
    let Some(mut scores) = iter.next() else {
        return Scores::new();
    };
    for other in iter {
        scores.retain(|doc_id, _| other.contains_key(doc_id));
        for (doc_id, score) in scores.iter_mut() {
            if let Some(extra) = other.get(doc_id) {
                *score += extra;
            }
        }
    }
    scores
}

fn scale(mut scores: Scores, boost: f32) -> Scores {
    if boost != 1.0 {
        for score in scores.values_mut() {
            *score *= boost as f64;
        }
    }
    scores
}
