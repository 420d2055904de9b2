//! Heuristics for choosing which variable the splitting search branches on
//! next.

use crate::solver::{csp::VariableId, domain::Domains, value::Value};

/// A strategy for choosing the next variable to branch on.
///
/// Implementors pick among the variables whose domain still has more than one
/// value. A good choice can dramatically shrink the search tree.
pub trait VariableSelectionHeuristic<V: Value> {
    /// Selects a variable with a non-singleton domain, or `None` when every
    /// domain is decided.
    fn select_variable(&self, domains: &Domains<V>) -> Option<VariableId>;
}

/// Selects the undecided variable with the smallest ID.
///
/// This provides a basic, deterministic branching order.
pub struct SelectFirstHeuristic;

impl<V: Value> VariableSelectionHeuristic<V> for SelectFirstHeuristic {
    fn select_variable(&self, domains: &Domains<V>) -> Option<VariableId> {
        domains
            .iter()
            .filter(|(_, domain)| domain.len() > 1)
            .map(|(var, _)| *var)
            .min()
    }
}

/// Selects the undecided variable with the fewest remaining values.
///
/// A "fail-first" strategy: tackling the most constrained variable early
/// tends to prune the search space faster. Ties go to the smaller variable
/// ID so the choice stays deterministic.
pub struct MinimumRemainingValuesHeuristic;

impl<V: Value> VariableSelectionHeuristic<V> for MinimumRemainingValuesHeuristic {
    fn select_variable(&self, domains: &Domains<V>) -> Option<VariableId> {
        domains
            .iter()
            .filter(|(_, domain)| domain.len() > 1)
            .min_by_key(|(var, domain)| (domain.len(), **var))
            .map(|(var, _)| *var)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::solver::domain::{Domain, Domains};

    fn domains() -> Domains<i32> {
        let mut domains = Domains::new();
        let _ = domains.insert(0, [1].into_iter().collect::<Domain<i32>>());
        let _ = domains.insert(1, [1, 2, 3].into_iter().collect::<Domain<i32>>());
        let _ = domains.insert(2, [1, 2].into_iter().collect::<Domain<i32>>());
        domains
    }

    #[test]
    fn select_first_skips_decided_variables() {
        let heuristic = SelectFirstHeuristic;
        assert_eq!(heuristic.select_variable(&domains()), Some(1));
    }

    #[test]
    fn mrv_prefers_the_tightest_domain() {
        let heuristic = MinimumRemainingValuesHeuristic;
        assert_eq!(heuristic.select_variable(&domains()), Some(2));
    }

    #[test]
    fn fully_decided_domains_yield_nothing() {
        let mut domains = Domains::new();
        let _ = domains.insert(0, [1].into_iter().collect::<Domain<i32>>());
        assert_eq!(
            VariableSelectionHeuristic::<i32>::select_variable(&SelectFirstHeuristic, &domains),
            None
        );
    }
}
