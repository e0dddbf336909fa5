//! Range queries over term text or numeric values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bound type for range queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Bound<T> {
    /// Inclusive bound.
    Included(T),
    /// Exclusive bound.
    Excluded(T),
    /// Unbounded (no limit).
    Unbounded,
}

impl<T> Bound<T> {
    /// Create a bound from an optional value and an inclusivity flag.
    pub fn from_option(value: Option<T>, inclusive: bool) -> Self {
        match value {
            Some(value) if inclusive => Bound::Included(value),
            Some(value) => Bound::Excluded(value),
            None => Bound::Unbounded,
        }
    }

    /// Get the bound value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Bound::Included(value) | Bound::Excluded(value) => Some(value),
            Bound::Unbounded => None,
        }
    }

    /// Check if the bound is inclusive. Unbounded counts as inclusive.
    pub fn is_inclusive(&self) -> bool {
        !matches!(self, Bound::Excluded(_))
    }

    /// Check if there is no limit on this side.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Bound::Unbounded)
    }

    /// Map the bound value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Bound<U> {
        match self {
            Bound::Included(value) => Bound::Included(f(value)),
            Bound::Excluded(value) => Bound::Excluded(f(value)),
            Bound::Unbounded => Bound::Unbounded,
        }
    }
}

impl<T: PartialOrd> Bound<T> {
    /// Check if a value satisfies this bound as a lower bound.
    pub fn contains_lower(&self, value: &T) -> bool {
        match self {
            Bound::Included(bound) => value >= bound,
            Bound::Excluded(bound) => value > bound,
            Bound::Unbounded => true,
        }
    }

    /// Check if a value satisfies this bound as an upper bound.
    pub fn contains_upper(&self, value: &T) -> bool {
        match self {
            Bound::Included(bound) => value <= bound,
            Bound::Excluded(bound) => value < bound,
            Bound::Unbounded => true,
        }
    }
}

impl<T: PartialOrd + Clone> Bound<T> {
    /// Of two lower bounds, the one admitting fewer values.
    fn tighter_lower(&self, other: &Self) -> Self {
        match (self.value(), other.value()) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some(a), Some(b)) if a > b => self.clone(),
            (Some(a), Some(b)) if b > a => other.clone(),
            _ if self.is_inclusive() => other.clone(),
            _ => self.clone(),
        }
    }

    /// Of two upper bounds, the one admitting fewer values.
    fn tighter_upper(&self, other: &Self) -> Self {
        match (self.value(), other.value()) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some(a), Some(b)) if a < b => self.clone(),
            (Some(a), Some(b)) if b < a => other.clone(),
            _ if self.is_inclusive() => other.clone(),
            _ => self.clone(),
        }
    }

    /// Of two lower bounds, the one admitting more values.
    fn looser_lower(&self, other: &Self) -> Self {
        match (self.value(), other.value()) {
            (None, _) | (_, None) => Bound::Unbounded,
            (Some(a), Some(b)) if a < b => self.clone(),
            (Some(a), Some(b)) if b < a => other.clone(),
            _ if self.is_inclusive() => self.clone(),
            _ => other.clone(),
        }
    }

    /// Of two upper bounds, the one admitting more values.
    fn looser_upper(&self, other: &Self) -> Self {
        match (self.value(), other.value()) {
            (None, _) | (_, None) => Bound::Unbounded,
            (Some(a), Some(b)) if a > b => self.clone(),
            (Some(a), Some(b)) if b > a => other.clone(),
            _ if self.is_inclusive() => self.clone(),
            _ => other.clone(),
        }
    }
}

/// True when a lower and an upper bound admit at least one common value.
fn non_empty<T: PartialOrd>(lower: &Bound<T>, upper: &Bound<T>) -> bool {
    match (lower.value(), upper.value()) {
        (Some(l), Some(u)) => l < u || (l == u && lower.is_inclusive() && upper.is_inclusive()),
        _ => true,
    }
}

/// True when values lie strictly between an upper bound and a later lower bound.
fn gap_between<T: PartialOrd>(upper: &Bound<T>, lower: &Bound<T>) -> bool {
    match (upper.value(), lower.value()) {
        (Some(u), Some(l)) => u < l || (u == l && !upper.is_inclusive() && !lower.is_inclusive()),
        _ => false,
    }
}

/// A query that matches documents with field values within a range.
///
/// `T` is `String` for term ranges (lexicographic order) and `f64` for numeric
/// ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeQuery<T> {
    /// The field to search in.
    pub field: String,
    /// Lower bound of the range.
    pub lower: Bound<T>,
    /// Upper bound of the range.
    pub upper: Bound<T>,
    /// The boost factor for this query.
    pub boost: f32,
}

impl<T> RangeQuery<T> {
    /// Create a range query with custom bound types.
    pub fn new<S: Into<String>>(field: S, lower: Bound<T>, upper: Bound<T>) -> Self {
        RangeQuery {
            field: field.into(),
            lower,
            upper,
            boost: 1.0,
        }
    }

    /// Create a range with both (optional) bounds inclusive.
    pub fn inclusive<S: Into<String>>(field: S, start: Option<T>, end: Option<T>) -> Self {
        Self::new(
            field,
            Bound::from_option(start, true),
            Bound::from_option(end, true),
        )
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Check if the range is open on both sides.
    pub fn is_unbounded(&self) -> bool {
        self.lower.is_unbounded() && self.upper.is_unbounded()
    }
}

impl<T: PartialOrd + Clone> RangeQuery<T> {
    /// Check if a value falls within the range.
    pub fn contains(&self, value: &T) -> bool {
        self.lower.contains_lower(value) && self.upper.contains_upper(value)
    }

    /// Check if the range admits any value at all.
    pub fn is_empty(&self) -> bool {
        !non_empty(&self.lower, &self.upper)
    }

    /// Intersect two ranges on the same field.
    ///
    /// Returns `None` when the fields differ or the intersection is empty.
    /// The result keeps this range's boost.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        if self.field != other.field {
            return None;
        }
        let lower = self.lower.tighter_lower(&other.lower);
        let upper = self.upper.tighter_upper(&other.upper);
        if !non_empty(&lower, &upper) {
            return None;
        }
        Some(RangeQuery {
            field: self.field.clone(),
            lower,
            upper,
            boost: self.boost,
        })
    }

    /// Unite two ranges on the same field.
    ///
    /// Returns `None` when the fields differ or a gap separates the ranges.
    /// The result keeps this range's boost.
    pub fn union(&self, other: &Self) -> Option<Self> {
        if self.field != other.field
            || gap_between(&self.upper, &other.lower)
            || gap_between(&other.upper, &self.lower)
        {
            return None;
        }
        Some(RangeQuery {
            field: self.field.clone(),
            lower: self.lower.looser_lower(&other.lower),
            upper: self.upper.looser_upper(&other.upper),
            boost: self.boost,
        })
    }
}

impl<T: fmt::Display> fmt::Display for RangeQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.lower.is_inclusive() { '[' } else { '{' };
        let close = if self.upper.is_inclusive() { ']' } else { '}' };
        write!(f, "{}:{open}", self.field)?;
        if let Some(start) = self.lower.value() {
            write!(f, "{start}")?;
        }
        f.write_str(" TO ")?;
        if let Some(end) = self.upper.value() {
            write!(f, "{end}")?;
        }
        write!(f, "{close}")
    }
}
