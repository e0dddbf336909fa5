//! Traversal primitives over query trees.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::boolean::{AndNotQuery, NotQuery};
use crate::query::node::QueryNode;
use crate::query::range::Bound;

impl QueryNode {
    /// Rebuild a compound with each child replaced by `visitor(child)`.
    ///
    /// The visitor decides whether to recurse further, typically by calling
    /// `apply` again on nodes it does not handle. Leaves are returned as an
    /// unchanged copy.
    pub fn apply<F>(&self, mut visitor: F) -> QueryNode
    where
        F: FnMut(&QueryNode) -> QueryNode,
    {
        match self {
            QueryNode::And(q) => {
                QueryNode::And(q.with_children(q.children.iter().map(&mut visitor).collect()))
            }
            QueryNode::Or(q) => {
                QueryNode::Or(q.with_children(q.children.iter().map(&mut visitor).collect()))
            }
            QueryNode::Not(q) => QueryNode::Not(NotQuery {
                child: Box::new(visitor(&q.child)),
                boost: q.boost,
            }),
            QueryNode::AndNot(q) => QueryNode::AndNot(AndNotQuery {
                positive: Box::new(visitor(&q.positive)),
                negative: Box::new(visitor(&q.negative)),
                boost: q.boost,
            }),
            leaf => leaf.clone(),
        }
    }

    /// Copy the tree, rewriting every leaf text equal to `old` into `new`.
    ///
    /// Phrase words and term-range bounds are rewritten too. Field, boost,
    /// variant and compound structure are preserved.
    pub fn replace(&self, old: &str, new: &str) -> QueryNode {
        self.replace_impl(None, old, new)
    }

    /// Like [`QueryNode::replace`], restricted to leaves in `field`.
    pub fn replace_in_field(&self, field: &str, old: &str, new: &str) -> QueryNode {
        self.replace_impl(Some(field), old, new)
    }

    fn replace_impl(&self, field: Option<&str>, old: &str, new: &str) -> QueryNode {
        // Compounds rebuild from their children without copying them first.
        if matches!(
            self,
            QueryNode::And(_) | QueryNode::Or(_) | QueryNode::Not(_) | QueryNode::AndNot(_)
        ) {
            return self.apply(|child| child.replace_impl(field, old, new));
        }

        let in_scope = |leaf_field: &str| field.is_none_or(|f| f == leaf_field);
        let swap = |text: &mut String| {
            if *text == old {
                *text = new.to_string();
            }
        };

        let mut node = self.clone();
        match &mut node {
            QueryNode::Term(q) if in_scope(q.field.as_str()) => swap(&mut q.text),
            QueryNode::Prefix(q) if in_scope(q.field.as_str()) => swap(&mut q.text),
            QueryNode::Wildcard(q) if in_scope(q.field.as_str()) => swap(&mut q.text),
            QueryNode::FuzzyTerm(q) if in_scope(q.field.as_str()) => swap(&mut q.text),
            QueryNode::Variations(q) if in_scope(q.field.as_str()) => swap(&mut q.text),
            QueryNode::Phrase(q) if in_scope(q.field.as_str()) => {
                q.words.iter_mut().for_each(swap)
            }
            QueryNode::TermRange(q) if in_scope(q.field.as_str()) => {
                for bound in [&mut q.lower, &mut q.upper] {
                    if let Bound::Included(text) | Bound::Excluded(text) = bound {
                        swap(text);
                    }
                }
            }
            _ => {}
        }
        node
    }

    /// Collect the `(field, text)` of every `Term` leaf in the tree.
    ///
    /// With `phrases`, each `Phrase` also contributes one pair per word.
    pub fn all_terms(&self, phrases: bool) -> BTreeSet<(String, String)> {
        let mut terms = BTreeSet::new();
        self.collect_terms(phrases, &mut terms);
        terms
    }

    fn collect_terms(&self, phrases: bool, terms: &mut BTreeSet<(String, String)>) {
        match self {
            QueryNode::Term(q) => {
                terms.insert((q.field.clone(), q.text.clone()));
            }
            QueryNode::Phrase(q) if phrases => {
                for word in &q.words {
                    terms.insert((q.field.clone(), word.clone()));
                }
            }
            _ => {
                for child in self.children() {
                    child.collect_terms(phrases, terms);
                }
            }
        }
    }

    /// Like [`QueryNode::all_terms`], keeping only terms present in the index.
    ///
    /// With `reverse`, keeps only the terms that are absent instead. Reader
    /// failures propagate.
    pub fn existing_terms(
        &self,
        reader: &dyn IndexReader,
        phrases: bool,
        reverse: bool,
    ) -> Result<BTreeSet<(String, String)>> {
        let mut existing = BTreeSet::new();
        for (field, text) in self.all_terms(phrases) {
            if reader.contains_term(&field, &text)? != reverse {
                existing.insert((field, text));
            }
        }
        Ok(existing)
    }
}
