//! Canonicalization of query trees.
//!
//! `normalize` rewrites a tree to an equivalent, smaller one: nested
//! homogeneous compounds are flattened, duplicate siblings removed, ranges on
//! the same field merged, siblings covered by an `Every` dropped and
//! single-child compounds collapsed. Children are never reordered.

use tracing::{debug, trace};

use crate::query::boolean::{AndNotQuery, BooleanQuery, NotQuery};
use crate::query::node::QueryNode;
use crate::query::range::RangeQuery;
use crate::query::term::EveryQuery;

/// Which boolean compound a child list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

impl Connective {
    fn of(node: &QueryNode) -> Option<Self> {
        match node {
            QueryNode::And(_) => Some(Connective::And),
            QueryNode::Or(_) => Some(Connective::Or),
            _ => None,
        }
    }

    fn build(self, query: BooleanQuery) -> QueryNode {
        match self {
            Connective::And => QueryNode::And(query),
            Connective::Or => QueryNode::Or(query),
        }
    }
}

impl QueryNode {
    /// Rewrite the tree to its canonical minimal form.
    ///
    /// Passes are repeated until the tree stops changing. The input is left
    /// untouched.
    pub fn normalize(&self) -> QueryNode {
        let mut current = self.clone();
        let mut iterations = 0usize;
        loop {
            let next = current.normalize_pass();
            iterations += 1;
            if next == current {
                break;
            }
            current = next;
        }
        debug!(iterations, "normalized query tree");
        current
    }

    fn normalize_pass(&self) -> QueryNode {
        match self {
            QueryNode::And(q) => normalize_compound(q, Connective::And),
            QueryNode::Or(q) => normalize_compound(q, Connective::Or),
            QueryNode::Not(q) => QueryNode::Not(NotQuery {
                child: Box::new(q.child.normalize_pass()),
                boost: q.boost,
            }),
            QueryNode::AndNot(q) => {
                let positive = q.positive.normalize_pass();
                let negative = q.negative.normalize_pass();
                match (positive, negative) {
                    (QueryNode::Null, _) => QueryNode::Null,
                    (positive, QueryNode::Null) => collapse(positive, q.boost),
                    (positive, negative) => QueryNode::AndNot(AndNotQuery {
                        positive: Box::new(positive),
                        negative: Box::new(negative),
                        boost: q.boost,
                    }),
                }
            }
            QueryNode::TermRange(q) if q.is_unbounded() => every_for(q),
            QueryNode::NumericRange(q) if q.is_unbounded() => every_for(q),
            leaf => leaf.clone(),
        }
    }
}

/// Replace a node by its only child, multiplying the boosts.
fn collapse(child: QueryNode, boost: f32) -> QueryNode {
    let combined = child.boost() * boost;
    child.with_boost(combined)
}

fn every_for<T>(range: &RangeQuery<T>) -> QueryNode {
    QueryNode::Every(EveryQuery::in_field(range.field.clone()).with_boost(range.boost))
}

fn normalize_compound(query: &BooleanQuery, connective: Connective) -> QueryNode {
    // Flatten same-kind children carrying the default boost.
    let mut children = Vec::with_capacity(query.children.len());
    for child in query.children.iter().map(QueryNode::normalize_pass) {
        let splice = child.boost() == 1.0 && Connective::of(&child) == Some(connective);
        match child {
            QueryNode::And(inner) | QueryNode::Or(inner) if splice => {
                children.extend(inner.children);
            }
            other => children.push(other),
        }
    }

    match connective {
        Connective::And if children.iter().any(QueryNode::is_null) => return QueryNode::Null,
        Connective::Or => children.retain(|child| !child.is_null()),
        _ => {}
    }
    if children.is_empty() {
        return QueryNode::Null;
    }

    if let Some(every) = children
        .iter()
        .find(|child| matches!(child, QueryNode::Every(e) if e.field.is_none()))
        .cloned()
    {
        if connective == Connective::Or {
            return collapse(every, query.boost);
        }
        children.retain(is_negation);
        if children.is_empty() {
            return collapse(every, query.boost);
        }
        children.insert(0, every);
        dedupe(&mut children);
        return connective.build(query.with_children(children));
    }

    dedupe(&mut children);
    merge_ranges(&mut children, connective);
    absorb_every(&mut children);

    if children.len() == 1 {
        let only = children.remove(0);
        return collapse(only, query.boost);
    }
    connective.build(query.with_children(children))
}

/// Remove structurally equal siblings, keeping the first occurrence.
fn dedupe(children: &mut Vec<QueryNode>) {
    let mut unique: Vec<QueryNode> = Vec::with_capacity(children.len());
    for child in children.drain(..) {
        if !unique.contains(&child) {
            unique.push(child);
        }
    }
    *children = unique;
}

/// Merge ranges on the same field: intersect under `And`, unite under `Or`.
///
/// A merged range keeps the boost of the earlier sibling; a union open on both
/// sides becomes `Every(field)`.
fn merge_ranges(children: &mut Vec<QueryNode>, connective: Connective) {
    let mut i = 0;
    while i < children.len() {
        let mut j = i + 1;
        while j < children.len() {
            match merge_pair(&children[i], &children[j], connective) {
                Some(merged) => {
                    trace!(merged = %merged, "merged range siblings");
                    children[i] = merged;
                    children.remove(j);
                }
                None => j += 1,
            }
        }
        i += 1;
    }
}

fn merge_pair(first: &QueryNode, second: &QueryNode, connective: Connective) -> Option<QueryNode> {
    match (first, second) {
        (QueryNode::TermRange(a), QueryNode::TermRange(b)) => {
            combine(a, b, connective).map(|range| range_node(range, QueryNode::TermRange))
        }
        (QueryNode::NumericRange(a), QueryNode::NumericRange(b)) => {
            combine(a, b, connective).map(|range| range_node(range, QueryNode::NumericRange))
        }
        _ => None,
    }
}

fn combine<T: PartialOrd + Clone>(
    a: &RangeQuery<T>,
    b: &RangeQuery<T>,
    connective: Connective,
) -> Option<RangeQuery<T>> {
    match connective {
        Connective::And => a.intersect(b),
        Connective::Or => a.union(b),
    }
}

fn range_node<T>(range: RangeQuery<T>, wrap: fn(RangeQuery<T>) -> QueryNode) -> QueryNode {
    if range.is_unbounded() {
        every_for(&range)
    } else {
        wrap(range)
    }
}

fn is_negation(node: &QueryNode) -> bool {
    matches!(node, QueryNode::Not(_) | QueryNode::AndNot(_))
}

/// Drop positive siblings searching a field already covered by an `Every` sibling.
fn absorb_every(children: &mut Vec<QueryNode>) {
    let covered: Vec<String> = children
        .iter()
        .filter_map(|child| match child {
            QueryNode::Every(e) => e.field.clone(),
            _ => None,
        })
        .collect();
    if covered.is_empty() {
        return;
    }

    let mut seen: Vec<String> = Vec::new();
    children.retain(|child| match child {
        QueryNode::Every(e) => match &e.field {
            Some(field) if seen.contains(field) => false,
            Some(field) => {
                seen.push(field.clone());
                true
            }
            None => true,
        },
        // Negations are exclusions, never covered by `Every`.
        negation if is_negation(negation) => true,
        other => !other
            .field()
            .is_some_and(|field| covered.iter().any(|c| c == field)),
    });
}
