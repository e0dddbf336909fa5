//! Boolean compounds: conjunction, disjunction and negation.

use serde::{Deserialize, Serialize};

use crate::error::{HalberdError, Result};
use crate::query::node::QueryNode;

/// The children of an `And` or `Or` node.
///
/// The child list is never empty; construction through
/// [`BooleanQuery::try_new`] rejects an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanQuery {
    /// Sub-queries, in order.
    pub children: Vec<QueryNode>,
    /// The boost factor for this query.
    pub boost: f32,
}

impl BooleanQuery {
    /// Create a compound from a non-empty child list.
    pub fn try_new(children: Vec<QueryNode>) -> Result<Self> {
        if children.is_empty() {
            return Err(HalberdError::query(
                "Boolean query requires at least one child",
            ));
        }
        Ok(BooleanQuery {
            children,
            boost: 1.0,
        })
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Rebuild with a new child list, keeping the boost.
    pub(crate) fn with_children(&self, children: Vec<QueryNode>) -> Self {
        BooleanQuery {
            children,
            boost: self.boost,
        }
    }
}

/// Pure complement of a query; meaningful inside a positive context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotQuery {
    /// The negated query.
    pub child: Box<QueryNode>,
    /// The boost factor for this query.
    pub boost: f32,
}

impl NotQuery {
    /// Negate a query.
    pub fn new(child: QueryNode) -> Self {
        NotQuery {
            child: Box::new(child),
            boost: 1.0,
        }
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

/// Documents matching `positive` but not `negative`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndNotQuery {
    /// The query documents must match.
    pub positive: Box<QueryNode>,
    /// The query documents must not match.
    pub negative: Box<QueryNode>,
    /// The boost factor for this query.
    pub boost: f32,
}

impl AndNotQuery {
    /// Create a new `positive ANDNOT negative` query.
    pub fn new(positive: QueryNode, negative: QueryNode) -> Self {
        AndNotQuery {
            positive: Box::new(positive),
            negative: Box::new(negative),
            boost: 1.0,
        }
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}
