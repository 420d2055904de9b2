use im::HashSet;
use serde::Serialize;

use crate::solver::{csp::VariableId, value::Value};

/// A map from each variable's ID to its current domain of possible values.
///
/// Because this is a persistent (immutable) data structure, it can be cloned
/// cheaply. The engines never mutate a caller's mapping: pruning produces a
/// new mapping, so the original domains stay available for restarts and
/// sibling search branches.
pub type Domains<V> = im::HashMap<VariableId, Domain<V>>;

/// A finite set of candidate values for one variable.
///
/// Domains are only ever shrunk: [`Domain::retain`] and [`Domain::split_halves`]
/// return new domains whose values are drawn from the original, and no
/// operation adds values after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Domain<V: Value> {
    values: HashSet<V>,
}

impl<V: Value> Domain<V> {
    pub fn new(values: HashSet<V>) -> Self {
        Self { values }
    }

    /// Returns the number of possible values in the domain.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the domain contains no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if the domain contains exactly one value.
    pub fn is_singleton(&self) -> bool {
        self.values.len() == 1
    }

    /// If the domain is a singleton, returns the single value. Otherwise, `None`.
    pub fn singleton_value(&self) -> Option<V> {
        if self.is_singleton() {
            self.values.iter().next().cloned()
        } else {
            None
        }
    }

    pub fn contains(&self, value: &V) -> bool {
        self.values.contains(value)
    }

    /// Returns an iterator over the values in the domain.
    ///
    /// The iteration order is arbitrary but stable for a given domain
    /// instance and its clones.
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.values.iter()
    }

    /// Creates a new domain containing only the values that satisfy the predicate.
    pub fn retain(&self, keep: impl Fn(&V) -> bool) -> Domain<V> {
        Self {
            values: self.values.iter().filter(|value| keep(value)).cloned().collect(),
        }
    }

    /// Partitions the domain into two non-empty halves: the first ⌊n/2⌋ values
    /// in iteration order, and the remainder.
    ///
    /// # Panics
    ///
    /// Panics if the domain has fewer than two values, since no non-empty
    /// partition exists.
    pub fn split_halves(&self) -> (Domain<V>, Domain<V>) {
        assert!(
            self.len() >= 2,
            "cannot split a domain with {} value(s)",
            self.len()
        );
        let half = self.len() / 2;
        let first = self.values.iter().take(half).cloned().collect();
        let second = self.values.iter().skip(half).cloned().collect();
        (Self { values: first }, Self { values: second })
    }
}

impl<V: Value> FromIterator<V> for Domain<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn domain(values: impl IntoIterator<Item = i32>) -> Domain<i32> {
        values.into_iter().collect()
    }

    #[test]
    fn singleton_value_only_for_single_element_domains() {
        assert_eq!(domain([7]).singleton_value(), Some(7));
        assert_eq!(domain([1, 2]).singleton_value(), None);
        assert_eq!(domain([]).singleton_value(), None);
    }

    #[test]
    fn retain_shrinks_and_never_invents_values() {
        let original = domain([1, 2, 3, 4]);
        let kept = original.retain(|value| value % 2 == 0);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|value| original.contains(value)));
    }

    #[test]
    fn split_halves_is_a_partition() {
        for size in 2..=7 {
            let original = domain(0..size);
            let (first, second) = original.split_halves();
            assert!(!first.is_empty());
            assert!(!second.is_empty());
            assert_eq!(first.len() + second.len(), original.len());
            for value in original.iter() {
                assert!(first.contains(value) != second.contains(value));
            }
        }
    }

    #[test]
    #[should_panic(expected = "cannot split")]
    fn split_halves_rejects_singletons() {
        let _ = domain([1]).split_halves();
    }
}
