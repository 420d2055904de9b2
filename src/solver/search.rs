use tracing::{debug, trace};

use crate::solver::{
    csp::{Assignment, Csp},
    domain::Domains,
    heuristics::{
        split::{HalvesSplit, SplitPolicy},
        variable::{SelectFirstHeuristic, VariableSelectionHeuristic},
    },
    observer::SolverObserver,
    propagation::Propagator,
    stats::{PropagationStats, SearchStats},
    value::Value,
    work_list::{SelectionOrder, WorkList},
};

/// Depth-first search over partitioned domains, with arc consistency enforced
/// at every node.
///
/// Each node of the search tree is a domains mapping. A node is expanded by
/// propagating to a fixpoint; if that decides every variable the node is a
/// solution, and if it wipes out a domain the branch is abandoned and the
/// sibling branch explored instead. Otherwise one non-singleton domain is
/// partitioned in two and both halves are pushed, first half on top, so the
/// search is depth-first and returns the first solution found.
///
/// The tree is walked with an explicit stack rather than recursion, so deep
/// splits cannot overflow the call stack, and a node budget can cut the walk
/// short at any node boundary.
pub struct SplittingSolver<'a, V: Value> {
    csp: &'a Csp<V>,
    propagator: Propagator<'a, V>,
    variable_heuristic: Box<dyn VariableSelectionHeuristic<V>>,
    split_policy: Box<dyn SplitPolicy<V>>,
    node_budget: Option<u64>,
    stats: SearchStats,
}

impl<'a, V: Value> SplittingSolver<'a, V> {
    pub fn new(csp: &'a Csp<V>) -> Self {
        Self {
            csp,
            propagator: Propagator::new(csp),
            variable_heuristic: Box::new(SelectFirstHeuristic),
            split_policy: Box::new(HalvesSplit),
            node_budget: None,
            stats: SearchStats::default(),
        }
    }

    pub fn with_variable_heuristic(
        mut self,
        heuristic: Box<dyn VariableSelectionHeuristic<V>>,
    ) -> Self {
        self.variable_heuristic = heuristic;
        self
    }

    pub fn with_split_policy(mut self, policy: Box<dyn SplitPolicy<V>>) -> Self {
        self.split_policy = policy;
        self
    }

    /// Replaces the arc-selection order used by the embedded propagator.
    pub fn with_order(mut self, order: SelectionOrder) -> Self {
        self.propagator = self.propagator.with_order(order);
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn SolverObserver<V>>) -> Self {
        self.propagator = self.propagator.with_observer(observer);
        self
    }

    /// Caps the number of search-tree nodes visited. A capped run reports no
    /// solution and records the truncation in its stats.
    pub fn with_node_budget(mut self, budget: u64) -> Self {
        self.node_budget = Some(budget);
        self
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Counters from the propagation runs performed at the search nodes.
    pub fn propagation_stats(&self) -> &PropagationStats {
        self.propagator.stats()
    }

    /// Searches from the problem's initial domains.
    pub fn solve(&mut self) -> (Option<Assignment<V>>, SearchStats) {
        let domains = self.csp.domains().clone();
        self.solve_from(domains)
    }

    /// Searches from a caller-supplied domains mapping.
    pub fn solve_from(&mut self, domains: Domains<V>) -> (Option<Assignment<V>>, SearchStats) {
        let csp = self.csp;
        let mut stack = vec![(domains, WorkList::all_arcs(csp))];

        while let Some((domains, todo)) = stack.pop() {
            if let Some(budget) = self.node_budget {
                if self.stats.nodes_visited >= budget {
                    self.stats.budget_exhausted = true;
                    debug!(budget, "node budget exhausted");
                    break;
                }
            }
            self.stats.nodes_visited += 1;

            let propagated = self.propagator.make_arc_consistent(&domains, Some(todo));
            if !propagated.consistent {
                self.stats.failed_branches += 1;
                continue;
            }
            if let Some(assignment) = assignment_from(&propagated.domains) {
                debug!(nodes = self.stats.nodes_visited, "solution found");
                return (Some(assignment), self.stats.clone());
            }

            let Some(var) = self.variable_heuristic.select_variable(&propagated.domains) else {
                continue;
            };
            let domain = propagated.domains.get(&var).unwrap();
            let (first, second) = self.split_policy.split(domain);
            self.stats.splits += 1;
            self.propagator
                .observer_mut()
                .variable_split(var, first.len(), second.len());
            trace!(var, first = first.len(), second = second.len(), "splitting domain");

            // Only the arcs that can react to the narrowed variable need
            // revisiting in the children.
            let seed = WorkList::arcs_for_split(csp, var);
            stack.push((propagated.domains.update(var, second), seed.clone()));
            stack.push((propagated.domains.update(var, first), seed));
        }

        debug!(nodes = self.stats.nodes_visited, "search exhausted");
        (None, self.stats.clone())
    }
}

/// If every domain is a singleton, the unique assignment they describe.
fn assignment_from<V: Value>(domains: &Domains<V>) -> Option<Assignment<V>> {
    let mut assignment = Assignment::with_capacity(domains.len());
    for (var, domain) in domains.iter() {
        let value = domain.singleton_value()?;
        let _ = assignment.insert(*var, value);
    }
    Some(assignment)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::solver::{
        csp::CspBuilder,
        heuristics::{split::IsolateFirstSplit, variable::MinimumRemainingValuesHeuristic},
        testutil::{chain_csp, enumerate_solutions, equality_cycle_csp, SmallInstance},
    };

    #[test]
    fn finds_a_known_solution_of_the_chain() {
        // A < B, B != 2, B < C over {1, 2, 3, 4} has exactly two solutions,
        // differing only in A.
        let csp = chain_csp();
        let (solution, stats) = SplittingSolver::new(&csp).solve();
        let solution = solution.expect("satisfiable");

        assert!(csp.is_solution(&solution));
        assert_eq!(solution[&1], 3);
        assert_eq!(solution[&2], 4);
        assert!([1, 2].contains(&solution[&0]));
        assert!(stats.nodes_visited >= 1);
    }

    #[test]
    fn proves_the_equality_cycle_unsatisfiable() {
        // Propagation alone cannot refute A = B, B = C, A != C over {1, 2};
        // the search must exhaust both halves of some split.
        let csp = equality_cycle_csp();
        let (solution, stats) = SplittingSolver::new(&csp).solve();
        assert_eq!(solution, None);
        assert!(stats.failed_branches >= 2);
    }

    #[test]
    fn reports_wipeouts_without_searching() {
        let mut builder = CspBuilder::new();
        let a = builder.variable("A", [1, 2]);
        let b = builder.variable("B", [1, 2]);
        let _ = builder.binary("A < B", a, b, |x, y| x < y);
        let _ = builder.binary("B < A", a, b, |x, y| x > y);
        let csp = builder.build();

        let (solution, stats) = SplittingSolver::new(&csp).solve();
        assert_eq!(solution, None);
        assert_eq!(stats.splits, 0);
    }

    #[test]
    fn alternative_heuristics_and_policies_agree() {
        let csp = chain_csp();
        let (solution, _) = SplittingSolver::new(&csp)
            .with_variable_heuristic(Box::new(MinimumRemainingValuesHeuristic))
            .with_split_policy(Box::new(IsolateFirstSplit))
            .with_order(SelectionOrder::Lifo)
            .solve();
        assert!(csp.is_solution(&solution.expect("satisfiable")));
    }

    #[test]
    fn a_node_budget_cuts_the_search_short() {
        let csp = equality_cycle_csp();
        let mut solver = SplittingSolver::new(&csp).with_node_budget(1);
        let (solution, stats) = solver.solve();
        assert_eq!(solution, None);
        assert!(stats.budget_exhausted);
        assert_eq!(stats.nodes_visited, 1);
    }

    proptest! {
        #[test]
        fn agrees_with_brute_force_enumeration(instance in SmallInstance::strategy()) {
            let csp = instance.build_csp();
            let all_solutions = enumerate_solutions(&csp);
            let (solution, _) = SplittingSolver::new(&csp).solve();
            match solution {
                Some(found) => {
                    prop_assert!(csp.is_solution(&found));
                    prop_assert!(!all_solutions.is_empty());
                }
                None => prop_assert!(all_solutions.is_empty()),
            }
        }
    }
}
