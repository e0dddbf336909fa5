//! The query tree.
//!
//! [`QueryNode`] is a closed set of leaf and compound variants. Nodes are
//! plain values: every transformation (`apply`, `replace`, `normalize`,
//! `simplify`) returns a new tree and leaves its input untouched, so a parsed
//! tree can be shared across threads and reused across searches.
//!
//! Equality is structural: same variant, same attributes, same boost and,
//! for compounds, the same children in the same order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::boolean::{AndNotQuery, BooleanQuery, NotQuery};
use crate::query::fuzzy::FuzzyTermQuery;
use crate::query::phrase::PhraseQuery;
use crate::query::range::{Bound, RangeQuery};
use crate::query::term::{EveryQuery, TermQuery, VariationsQuery, write_boost};
use crate::query::wildcard::{PrefixQuery, WildcardQuery};

/// A node of a query tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNode {
    /// Exact single-term match.
    Term(TermQuery),
    /// Ordered proximity match of several words.
    Phrase(PhraseQuery),
    /// Every term starting with a prefix.
    Prefix(PrefixQuery),
    /// Every term matching a glob pattern.
    Wildcard(WildcardQuery),
    /// Every term within an edit distance.
    FuzzyTerm(FuzzyTermQuery),
    /// Every morphological variant of a word.
    Variations(VariationsQuery),
    /// Lexicographic range over term text.
    TermRange(RangeQuery<String>),
    /// Range over numeric values.
    NumericRange(RangeQuery<f64>),
    /// Every document, optionally restricted to those with a field value.
    Every(EveryQuery),
    /// All children must match.
    And(BooleanQuery),
    /// Any child may match.
    Or(BooleanQuery),
    /// Complement of the child.
    Not(NotQuery),
    /// Positive minus negative.
    AndNot(AndNotQuery),
    /// Matches nothing.
    Null,
}

impl QueryNode {
    /// Create a term query.
    pub fn term<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        QueryNode::Term(TermQuery::new(field, text))
    }

    /// Create an exact phrase query.
    pub fn phrase<F: Into<String>, W: Into<String>>(
        field: F,
        words: impl IntoIterator<Item = W>,
    ) -> Self {
        QueryNode::Phrase(PhraseQuery::new(
            field,
            words.into_iter().map(Into::into).collect(),
        ))
    }

    /// Create a prefix query.
    pub fn prefix<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        QueryNode::Prefix(PrefixQuery::new(field, text))
    }

    /// Create a wildcard query.
    pub fn wildcard<F: Into<String>, T: Into<String>>(field: F, pattern: T) -> Self {
        QueryNode::Wildcard(WildcardQuery::new(field, pattern))
    }

    /// Create a fuzzy term query.
    pub fn fuzzy<F: Into<String>, T: Into<String>>(field: F, text: T, max_edits: u32) -> Self {
        QueryNode::FuzzyTerm(FuzzyTermQuery::new(field, text).with_max_edits(max_edits))
    }

    /// Create a variations query.
    pub fn variations<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        QueryNode::Variations(VariationsQuery::new(field, text))
    }

    /// Create a term range with inclusive, optional bounds.
    pub fn term_range<F: Into<String>>(field: F, start: Option<&str>, end: Option<&str>) -> Self {
        QueryNode::TermRange(RangeQuery::inclusive(
            field,
            start.map(str::to_string),
            end.map(str::to_string),
        ))
    }

    /// Create a numeric range with inclusive, optional bounds.
    pub fn numeric_range<F: Into<String>>(field: F, start: Option<f64>, end: Option<f64>) -> Self {
        QueryNode::NumericRange(RangeQuery::inclusive(field, start, end))
    }

    /// Create a term range with explicit bounds.
    pub fn term_range_bounds<F: Into<String>>(
        field: F,
        lower: Bound<String>,
        upper: Bound<String>,
    ) -> Self {
        QueryNode::TermRange(RangeQuery::new(field, lower, upper))
    }

    /// Match every document.
    pub fn every() -> Self {
        QueryNode::Every(EveryQuery::new())
    }

    /// Match every document with a value in `field`.
    pub fn every_in<F: Into<String>>(field: F) -> Self {
        QueryNode::Every(EveryQuery::in_field(field))
    }

    /// Create a conjunction. Fails on an empty child list.
    pub fn try_and(children: Vec<QueryNode>) -> Result<Self> {
        Ok(QueryNode::And(BooleanQuery::try_new(children)?))
    }

    /// Create a disjunction. Fails on an empty child list.
    pub fn try_or(children: Vec<QueryNode>) -> Result<Self> {
        Ok(QueryNode::Or(BooleanQuery::try_new(children)?))
    }

    /// Create a conjunction.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty.
    pub fn and(children: Vec<QueryNode>) -> Self {
        match Self::try_and(children) {
            Ok(node) => node,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a disjunction.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty.
    pub fn or(children: Vec<QueryNode>) -> Self {
        match Self::try_or(children) {
            Ok(node) => node,
            Err(e) => panic!("{e}"),
        }
    }

    /// Negate a query.
    pub fn not(child: QueryNode) -> Self {
        QueryNode::Not(NotQuery::new(child))
    }

    /// Create a `positive ANDNOT negative` query.
    pub fn and_not(positive: QueryNode, negative: QueryNode) -> Self {
        QueryNode::AndNot(AndNotQuery::new(positive, negative))
    }

    /// Get the boost. `Null` reports the default of 1.0.
    pub fn boost(&self) -> f32 {
        match self {
            QueryNode::Term(q) => q.boost,
            QueryNode::Phrase(q) => q.boost,
            QueryNode::Prefix(q) => q.boost,
            QueryNode::Wildcard(q) => q.boost,
            QueryNode::FuzzyTerm(q) => q.boost,
            QueryNode::Variations(q) => q.boost,
            QueryNode::TermRange(q) => q.boost,
            QueryNode::NumericRange(q) => q.boost,
            QueryNode::Every(q) => q.boost,
            QueryNode::And(q) | QueryNode::Or(q) => q.boost,
            QueryNode::Not(q) => q.boost,
            QueryNode::AndNot(q) => q.boost,
            QueryNode::Null => 1.0,
        }
    }

    /// Replace the boost. Has no effect on `Null`.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.set_boost(boost);
        self
    }

    /// Set the boost in place. Has no effect on `Null`.
    pub fn set_boost(&mut self, boost: f32) {
        match self {
            QueryNode::Term(q) => q.boost = boost,
            QueryNode::Phrase(q) => q.boost = boost,
            QueryNode::Prefix(q) => q.boost = boost,
            QueryNode::Wildcard(q) => q.boost = boost,
            QueryNode::FuzzyTerm(q) => q.boost = boost,
            QueryNode::Variations(q) => q.boost = boost,
            QueryNode::TermRange(q) => q.boost = boost,
            QueryNode::NumericRange(q) => q.boost = boost,
            QueryNode::Every(q) => q.boost = boost,
            QueryNode::And(q) | QueryNode::Or(q) => q.boost = boost,
            QueryNode::Not(q) => q.boost = boost,
            QueryNode::AndNot(q) => q.boost = boost,
            QueryNode::Null => {}
        }
    }

    /// Get the field this query searches.
    ///
    /// For leaves this is the leaf's field (`None` for an unfielded `Every`);
    /// for compounds it is the field shared by all children, if there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            QueryNode::Term(q) => Some(&q.field),
            QueryNode::Phrase(q) => Some(&q.field),
            QueryNode::Prefix(q) => Some(&q.field),
            QueryNode::Wildcard(q) => Some(&q.field),
            QueryNode::FuzzyTerm(q) => Some(&q.field),
            QueryNode::Variations(q) => Some(&q.field),
            QueryNode::TermRange(q) => Some(&q.field),
            QueryNode::NumericRange(q) => Some(&q.field),
            QueryNode::Every(q) => q.field.as_deref(),
            QueryNode::And(q) | QueryNode::Or(q) => common_field(q.children.iter()),
            QueryNode::Not(q) => q.child.field(),
            QueryNode::AndNot(q) => common_field([&*q.positive, &*q.negative].into_iter()),
            QueryNode::Null => None,
        }
    }

    /// The text of a single-text leaf.
    pub fn text(&self) -> Option<&str> {
        match self {
            QueryNode::Term(q) => Some(&q.text),
            QueryNode::Prefix(q) => Some(&q.text),
            QueryNode::Wildcard(q) => Some(&q.text),
            QueryNode::FuzzyTerm(q) => Some(&q.text),
            QueryNode::Variations(q) => Some(&q.text),
            _ => None,
        }
    }

    /// Check if this node has no children.
    pub fn is_leaf(&self) -> bool {
        !matches!(
            self,
            QueryNode::And(_) | QueryNode::Or(_) | QueryNode::Not(_) | QueryNode::AndNot(_)
        )
    }

    /// Check if this is a pattern leaf resolved by `simplify`.
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            QueryNode::Prefix(_)
                | QueryNode::Wildcard(_)
                | QueryNode::FuzzyTerm(_)
                | QueryNode::Variations(_)
        )
    }

    /// Check if this is the `Null` query.
    pub fn is_null(&self) -> bool {
        matches!(self, QueryNode::Null)
    }

    /// Get the direct children of a compound, in order.
    pub fn children(&self) -> Vec<&QueryNode> {
        match self {
            QueryNode::And(q) | QueryNode::Or(q) => q.children.iter().collect(),
            QueryNode::Not(q) => vec![&*q.child],
            QueryNode::AndNot(q) => vec![&*q.positive, &*q.negative],
            _ => Vec::new(),
        }
    }
}

fn common_field<'a>(mut nodes: impl Iterator<Item = &'a QueryNode>) -> Option<&'a str> {
    let first = nodes.next()?.field()?;
    for node in nodes {
        if node.field() != Some(first) {
            return None;
        }
    }
    Some(first)
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[QueryNode], op: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {op} ")?;
        }
        write!(f, "{child}")?;
    }
    f.write_str(")")
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryNode::Term(q) => write!(f, "{q}"),
            QueryNode::Phrase(q) => write!(f, "{q}"),
            QueryNode::Prefix(q) => write!(f, "{q}"),
            QueryNode::Wildcard(q) => write!(f, "{q}"),
            QueryNode::FuzzyTerm(q) => write!(f, "{q}"),
            QueryNode::Variations(q) => write!(f, "{q}"),
            QueryNode::TermRange(q) => {
                write!(f, "{q}")?;
                write_boost(f, q.boost)
            }
            QueryNode::NumericRange(q) => {
                write!(f, "{q}")?;
                write_boost(f, q.boost)
            }
            QueryNode::Every(q) => write!(f, "{q}"),
            QueryNode::And(q) => {
                write_joined(f, &q.children, "AND")?;
                write_boost(f, q.boost)
            }
            QueryNode::Or(q) => {
                write_joined(f, &q.children, "OR")?;
                write_boost(f, q.boost)
            }
            QueryNode::Not(q) => {
                write!(f, "NOT {}", q.child)?;
                write_boost(f, q.boost)
            }
            QueryNode::AndNot(q) => {
                write!(f, "({} ANDNOT {})", q.positive, q.negative)?;
                write_boost(f, q.boost)
            }
            QueryNode::Null => f.write_str("<null>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = QueryNode::and(vec![QueryNode::term("f", "a"), QueryNode::term("f", "b")]);
        let b = QueryNode::and(vec![QueryNode::term("f", "a"), QueryNode::term("f", "b")]);
        let reordered = QueryNode::and(vec![QueryNode::term("f", "b"), QueryNode::term("f", "a")]);

        assert_eq!(a, b);
        assert_ne!(a, reordered);
        assert_ne!(a, a.clone().with_boost(2.0));
    }

    #[test]
    fn test_empty_compound_rejected() {
        assert!(QueryNode::try_and(Vec::new()).is_err());
        assert!(QueryNode::try_or(Vec::new()).is_err());
    }

    #[test]
    #[should_panic]
    fn test_empty_and_panics() {
        let _ = QueryNode::and(Vec::new());
    }

    #[test]
    fn test_field() {
        let same = QueryNode::or(vec![QueryNode::term("f", "a"), QueryNode::prefix("f", "b")]);
        assert_eq!(same.field(), Some("f"));

        let mixed = QueryNode::or(vec![QueryNode::term("f", "a"), QueryNode::term("g", "b")]);
        assert_eq!(mixed.field(), None);

        assert_eq!(QueryNode::every().field(), None);
        assert_eq!(QueryNode::not(QueryNode::term("g", "x")).field(), Some("g"));
    }

    #[test]
    fn test_boost() {
        let node = QueryNode::term("f", "a").with_boost(2.5);
        assert_eq!(node.boost(), 2.5);
        assert_eq!(QueryNode::Null.with_boost(3.0).boost(), 1.0);
    }

    #[test]
    fn test_display() {
        let node = QueryNode::and(vec![
            QueryNode::term("f", "a"),
            QueryNode::or(vec![QueryNode::prefix("f", "b"), QueryNode::term("g", "c")]),
            QueryNode::not(QueryNode::term("f", "d")),
        ]);
        assert_eq!(node.to_string(), "(f:a AND (f:b* OR g:c) AND NOT f:d)");
    }

    #[test]
    fn test_serde() {
        let node = QueryNode::and(vec![
            QueryNode::term("f", "a").with_boost(2.0),
            QueryNode::numeric_range("n", Some(1.0), None),
        ]);
        let json = serde_json::to_string(&node).unwrap();
        let back: QueryNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
