//! Policies for partitioning a branching variable's domain.

use crate::solver::{domain::Domain, value::Value};

/// A strategy for partitioning a non-singleton domain into the two branches
/// of a split.
///
/// Any pair of non-empty, disjoint subsets whose union is the original domain
/// is a valid partition; the search explores the first half before the
/// second.
pub trait SplitPolicy<V: Value> {
    fn split(&self, domain: &Domain<V>) -> (Domain<V>, Domain<V>);
}

/// Splits the domain down the middle: the first ⌊n/2⌋ values against the
/// rest.
pub struct HalvesSplit;

impl<V: Value> SplitPolicy<V> for HalvesSplit {
    fn split(&self, domain: &Domain<V>) -> (Domain<V>, Domain<V>) {
        domain.split_halves()
    }
}

/// Splits a single value off the domain, degrading the search to value
/// enumeration: try that value, and on failure discard it.
pub struct IsolateFirstSplit;

impl<V: Value> SplitPolicy<V> for IsolateFirstSplit {
    fn split(&self, domain: &Domain<V>) -> (Domain<V>, Domain<V>) {
        let first = domain
            .iter()
            .next()
            .expect("split policies only see non-empty domains")
            .clone();
        let isolated = [first.clone()].into_iter().collect();
        let rest = domain.retain(|value| *value != first);
        (isolated, rest)
    }
}
