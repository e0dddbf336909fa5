//! Expansion of pattern leaves against the index lexicon.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::analysis::stemmer::{SimpleStemmer, Stemmer};
use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::boolean::{AndNotQuery, NotQuery};
use crate::query::node::QueryNode;
use crate::query::term::TermQuery;

/// Configuration for [`QueryNode::simplify_with`].
#[derive(Debug, Clone)]
pub struct SimplifyConfig {
    /// Multiplier applied to the boost of terms expanded from `Variations`.
    pub variations_boost_factor: f32,
    /// Relation deciding which lexicon words are variants of a `Variations` word.
    pub stemmer: Arc<dyn Stemmer>,
    /// Maximum number of terms a single pattern leaf may expand to.
    pub max_expansions: Option<usize>,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        SimplifyConfig {
            variations_boost_factor: 1.0,
            stemmer: Arc::new(SimpleStemmer::new()),
            max_expansions: None,
        }
    }
}

impl SimplifyConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the boost multiplier for variation expansions.
    pub fn with_variations_boost_factor(mut self, factor: f32) -> Self {
        self.variations_boost_factor = factor;
        self
    }

    /// Set the stemmer used to resolve variations.
    pub fn with_stemmer(mut self, stemmer: Arc<dyn Stemmer>) -> Self {
        self.stemmer = stemmer;
        self
    }

    /// Cap the number of expansions per pattern leaf.
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }
}

impl QueryNode {
    /// Expand pattern leaves into disjunctions of concrete terms using the
    /// default [`SimplifyConfig`].
    pub fn simplify(&self, reader: &dyn IndexReader) -> Result<QueryNode> {
        self.simplify_with(reader, &SimplifyConfig::default())
    }

    /// Expand every `Prefix`, `Wildcard`, `FuzzyTerm` and `Variations` leaf
    /// into an `Or` of the matching lexicon terms, in lexicon order.
    ///
    /// Each expanded term inherits the leaf's field and boost. A leaf matching
    /// no term becomes `Null` and a leaf matching one term becomes that `Term`.
    /// Other nodes pass through unchanged. Reader failures propagate.
    pub fn simplify_with(
        &self,
        reader: &dyn IndexReader,
        config: &SimplifyConfig,
    ) -> Result<QueryNode> {
        let simplified = match self {
            QueryNode::Prefix(q) => {
                let terms = reader.expand_prefix(&q.field, &q.text)?;
                expansion(&q.field, terms, q.boost, config, self)
            }
            QueryNode::Wildcard(q) => {
                let regex = q.compile()?;
                let terms = reader
                    .expand_prefix(&q.field, q.literal_prefix())?
                    .into_iter()
                    .filter(|term| regex.is_match(term))
                    .collect();
                expansion(&q.field, terms, q.boost, config, self)
            }
            QueryNode::FuzzyTerm(q) => {
                let matcher = q.matcher();
                let terms = reader
                    .lexicon(&q.field)?
                    .into_iter()
                    .filter(|term| matcher.is_match(term))
                    .collect();
                expansion(&q.field, terms, q.boost, config, self)
            }
            QueryNode::Variations(q) => {
                let terms = reader
                    .lexicon(&q.field)?
                    .into_iter()
                    .filter(|term| config.stemmer.is_variation(&q.text, term))
                    .collect();
                let boost = q.boost * config.variations_boost_factor;
                expansion(&q.field, terms, boost, config, self)
            }
            QueryNode::And(q) => {
                QueryNode::And(q.with_children(simplify_all(&q.children, reader, config)?))
            }
            QueryNode::Or(q) => {
                QueryNode::Or(q.with_children(simplify_all(&q.children, reader, config)?))
            }
            QueryNode::Not(q) => QueryNode::Not(NotQuery {
                child: Box::new(q.child.simplify_with(reader, config)?),
                boost: q.boost,
            }),
            QueryNode::AndNot(q) => QueryNode::AndNot(AndNotQuery {
                positive: Box::new(q.positive.simplify_with(reader, config)?),
                negative: Box::new(q.negative.simplify_with(reader, config)?),
                boost: q.boost,
            }),
            leaf => leaf.clone(),
        };
        Ok(simplified)
    }
}

fn simplify_all(
    children: &[QueryNode],
    reader: &dyn IndexReader,
    config: &SimplifyConfig,
) -> Result<Vec<QueryNode>> {
    children
        .iter()
        .map(|child| child.simplify_with(reader, config))
        .collect()
}

fn expansion(
    field: &str,
    mut terms: Vec<String>,
    boost: f32,
    config: &SimplifyConfig,
    source: &QueryNode,
) -> QueryNode {
    if let Some(max) = config.max_expansions {
        if terms.len() > max {
            warn!(
                query = %source,
                matched = terms.len(),
                max,
                "pattern expansion truncated"
            );
            terms.truncate(max);
        }
    }
    debug!(query = %source, expansions = terms.len(), "expanded pattern leaf");

    let mut nodes: Vec<QueryNode> = terms
        .into_iter()
        .map(|text| {
            trace!(field, text = %text, "expansion term");
            QueryNode::Term(TermQuery::new(field, text).with_boost(boost))
        })
        .collect();

    match nodes.len() {
        0 => QueryNode::Null,
        1 => nodes.remove(0),
        _ => QueryNode::or(nodes),
    }
}
