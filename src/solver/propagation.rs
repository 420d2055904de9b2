use std::time::Instant;

use tracing::{debug, trace};

use crate::solver::{
    csp::{Constraint, Csp, VariableId},
    domain::{Domain, Domains},
    observer::{NullObserver, SolverObserver},
    stats::PropagationStats,
    value::Value,
    work_list::{SelectionOrder, WorkList},
};

/// The outcome of a propagation run.
///
/// A wipeout is an expected, common result during search, so it is reported
/// here as `consistent: false` rather than as an error. On wipeout, `domains`
/// still holds everything pruned so far, including the emptied domain.
#[derive(Debug, Clone)]
pub struct Propagation<V: Value> {
    pub domains: Domains<V>,
    pub consistent: bool,
}

/// The arc-consistency engine.
///
/// Repeatedly revises arcs from a work-list until no domain can shrink
/// further (generalized arc consistency): a value survives revision of the
/// arc `(x, c)` when some combination of values from the other scope
/// variables' current domains satisfies `c` together with it.
pub struct Propagator<'a, V: Value> {
    csp: &'a Csp<V>,
    order: SelectionOrder,
    arc_budget: Option<u64>,
    observer: Box<dyn SolverObserver<V>>,
    stats: PropagationStats,
}

impl<'a, V: Value> Propagator<'a, V> {
    pub fn new(csp: &'a Csp<V>) -> Self {
        Self {
            csp,
            order: SelectionOrder::default(),
            arc_budget: None,
            observer: Box::new(NullObserver),
            stats: PropagationStats::default(),
        }
    }

    /// Replaces the arc-selection order (FIFO by default).
    pub fn with_order(mut self, order: SelectionOrder) -> Self {
        self.order = order;
        self
    }

    /// Caps the number of arcs revised per [`Propagator::make_arc_consistent`]
    /// call. A capped run stops early and reports whatever has been soundly
    /// pruned so far.
    pub fn with_arc_budget(mut self, budget: u64) -> Self {
        self.arc_budget = Some(budget);
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn SolverObserver<V>>) -> Self {
        self.observer = observer;
        self
    }

    pub fn observer_mut(&mut self) -> &mut dyn SolverObserver<V> {
        self.observer.as_mut()
    }

    /// Counters accumulated across all runs of this propagator.
    pub fn stats(&self) -> &PropagationStats {
        &self.stats
    }

    /// Prunes `domains` to an arc-consistent fixpoint.
    ///
    /// The caller's mapping is copied internally and never mutated. When
    /// `todo` is `None`, the work-list is seeded with every arc of the
    /// problem; callers that know which domains changed can pass a narrower
    /// seed (see [`WorkList::arcs_for_split`]).
    pub fn make_arc_consistent(
        &mut self,
        domains: &Domains<V>,
        todo: Option<WorkList>,
    ) -> Propagation<V> {
        let mut observer = std::mem::replace(&mut self.observer, Box::new(NullObserver));
        let outcome = self.run(domains, todo, observer.as_mut());
        self.observer = observer;
        outcome
    }

    fn run(
        &mut self,
        domains: &Domains<V>,
        todo: Option<WorkList>,
        observer: &mut dyn SolverObserver<V>,
    ) -> Propagation<V> {
        let csp = self.csp;
        let mut domains = domains.clone();
        let mut todo = todo.unwrap_or_else(|| WorkList::all_arcs(csp));
        let mut arcs_this_run = 0u64;

        while let Some((var, cid)) = todo.pop(self.order) {
            if let Some(budget) = self.arc_budget {
                if arcs_this_run >= budget {
                    self.stats.budget_exhausted = true;
                    debug!(budget, pending = todo.len(), "arc budget exhausted");
                    break;
                }
            }
            arcs_this_run += 1;
            self.stats.arcs_processed += 1;
            observer.arc_selected(var, cid);

            let constraint = csp.constraint(cid);
            let current_len = domains
                .get(&var)
                .unwrap_or_else(|| panic!("variable {var} missing from domains"))
                .len();

            let start = Instant::now();
            let revised = revise(constraint, var, &domains);
            let elapsed = start.elapsed().as_micros() as u64;
            let per_constraint = self.stats.constraint_stats.entry(cid).or_default();
            per_constraint.revisions += 1;
            per_constraint.time_spent_micros += elapsed;

            if revised.len() == current_len {
                continue;
            }
            per_constraint.prunings += 1;
            self.stats.prunings += 1;
            trace!(
                var,
                constraint = cid,
                removed = current_len - revised.len(),
                remaining = revised.len(),
                "domain pruned"
            );
            observer.domain_pruned(var, current_len - revised.len(), revised.len());

            if revised.is_empty() {
                self.stats.wipeouts += 1;
                observer.domain_wiped(var, cid);
                debug!(var, constraint = cid, "domain wiped out");
                let _ = domains.insert(var, revised);
                return Propagation {
                    domains,
                    consistent: false,
                };
            }
            let _ = domains.insert(var, revised);

            // The domain of `var` shrank: revise the other variables of every
            // other constraint touching `var`. The work-list skips arcs that
            // are already pending.
            for &other_cid in csp.touching(var) {
                if other_cid == cid {
                    continue;
                }
                for &other_var in csp.constraint(other_cid).scope() {
                    if other_var != var {
                        let _ = todo.push(other_var, other_cid);
                    }
                }
            }
        }

        debug!(arcs = arcs_this_run, "propagation finished");
        Propagation {
            domains,
            consistent: true,
        }
    }
}

/// Computes the subset of `var`'s domain supported under `constraint`: the
/// values for which some assignment of the other scope variables, drawn from
/// their current domains, satisfies the predicate.
fn revise<V: Value>(constraint: &Constraint<V>, var: VariableId, domains: &Domains<V>) -> Domain<V> {
    let scope = constraint.scope();
    let var_pos = scope
        .iter()
        .position(|&scoped| scoped == var)
        .expect("arc variable not in constraint scope");

    // Indexable snapshots of the other scope positions' domains.
    let others: Vec<(usize, Vec<&V>)> = scope
        .iter()
        .enumerate()
        .filter(|&(pos, _)| pos != var_pos)
        .map(|(pos, scoped)| {
            let domain = domains
                .get(scoped)
                .unwrap_or_else(|| panic!("variable {scoped} missing from domains"));
            (pos, domain.iter().collect())
        })
        .collect();

    let current = domains
        .get(&var)
        .unwrap_or_else(|| panic!("variable {var} missing from domains"));
    current.retain(|candidate| has_support(constraint, var_pos, candidate, &others))
}

/// Whether some combination of values for the other scope positions satisfies
/// the constraint together with `candidate`. Walks the cross-product with an
/// explicit odometer rather than recursion, short-circuiting on the first
/// support; worst case is exponential in arity minus one.
fn has_support<V: Value>(
    constraint: &Constraint<V>,
    var_pos: usize,
    candidate: &V,
    others: &[(usize, Vec<&V>)],
) -> bool {
    let mut values: Vec<&V> = vec![candidate; constraint.scope().len()];
    if others.is_empty() {
        return constraint.evaluate(&values);
    }
    if others.iter().any(|(_, domain)| domain.is_empty()) {
        return false;
    }

    let mut odometer = vec![0usize; others.len()];
    loop {
        for (slot, (pos, domain)) in others.iter().enumerate() {
            values[*pos] = domain[odometer[slot]];
        }
        if constraint.evaluate(&values) {
            return true;
        }
        let mut slot = 0;
        loop {
            odometer[slot] += 1;
            if odometer[slot] < others[slot].1.len() {
                break;
            }
            odometer[slot] = 0;
            slot += 1;
            if slot == others.len() {
                return false;
            }
        }
    }
}
