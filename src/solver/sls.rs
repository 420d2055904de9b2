use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_core::RngCore;
use tracing::{debug, trace};

use crate::solver::{
    csp::{Assignment, ConstraintId, Csp, VariableId},
    observer::{NullObserver, SolverObserver},
    queue::UpdatableQueue,
    stats::SlsStats,
    value::Value,
};

/// The phases of a local-search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlsState {
    /// No assignment has been drawn yet.
    Uninitialized,
    /// A total assignment exists and some constraints are violated.
    Searching,
    /// The conflict set is empty; the assignment is a solution.
    Solved,
    /// The step budget ran out with conflicts remaining.
    Exhausted,
}

/// The stochastic local-search engine.
///
/// Maintains one total assignment, repaired one variable at a time, and a
/// conflict set kept exactly in sync with it: after every reassignment only
/// the constraints touching the changed variable are re-evaluated, and the
/// per-variable conflict counts in the priority queue are adjusted by the
/// same sweep. The queue's minimum (most negative count) is therefore always
/// the most conflicted variable.
pub struct SlsSolver<'a, V: Value> {
    csp: &'a Csp<V>,
    rng: Box<dyn RngCore>,
    assignment: Assignment<V>,
    conflicts: BTreeSet<ConstraintId>,
    queue: UpdatableQueue<VariableId>,
    /// Variables whose domain admits more than one value, ascending.
    multi_valued: Vec<VariableId>,
    state: SlsState,
    stats: SlsStats,
    observer: Box<dyn SolverObserver<V>>,
}

impl<'a, V: Value> SlsSolver<'a, V> {
    pub fn new(csp: &'a Csp<V>) -> Self {
        Self::with_rng(csp, Box::new(rand::thread_rng()))
    }

    /// A solver whose random choices are reproducible for a given seed.
    pub fn seeded(csp: &'a Csp<V>, seed: u64) -> Self {
        Self::with_rng(csp, Box::new(ChaCha8Rng::seed_from_u64(seed)))
    }

    pub fn with_rng(csp: &'a Csp<V>, rng: Box<dyn RngCore>) -> Self {
        let multi_valued = csp
            .variables()
            .filter(|&var| csp.domain(var).len() > 1)
            .collect();
        Self {
            csp,
            rng,
            assignment: Assignment::new(),
            conflicts: BTreeSet::new(),
            queue: UpdatableQueue::new(),
            multi_valued,
            state: SlsState::Uninitialized,
            stats: SlsStats::default(),
            observer: Box::new(NullObserver),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn SolverObserver<V>>) -> Self {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> SlsState {
        self.state
    }

    pub fn stats(&self) -> &SlsStats {
        &self.stats
    }

    /// The current total assignment. Empty until the first restart.
    pub fn assignment(&self) -> &Assignment<V> {
        &self.assignment
    }

    /// The constraints violated by the current assignment.
    pub fn conflicts(&self) -> &BTreeSet<ConstraintId> {
        &self.conflicts
    }

    /// Draws a fresh uniform-random assignment, recomputes the conflict set
    /// from scratch, and rebuilds the conflict-count queue. May be invoked
    /// repeatedly; no state survives from the previous run.
    ///
    /// # Panics
    ///
    /// Panics if any variable has an empty domain, since no total assignment
    /// can be drawn.
    pub fn restart(&mut self) {
        let csp = self.csp;
        self.assignment.clear();
        for var in csp.variables() {
            let domain = csp.domain(var);
            assert!(
                !domain.is_empty(),
                "cannot draw an assignment: variable {var} has an empty domain"
            );
            let index = self.rng.gen_range(0..domain.len());
            let value = domain.iter().nth(index).expect("index is in range").clone();
            let _ = self.assignment.insert(var, value);
        }

        self.conflicts = csp
            .constraints()
            .iter()
            .filter(|constraint| !constraint.holds(&self.assignment))
            .map(|constraint| constraint.id())
            .collect();

        self.queue = UpdatableQueue::new();
        let mut counts: BTreeMap<VariableId, i64> = BTreeMap::new();
        for &cid in &self.conflicts {
            for &var in csp.constraint(cid).scope() {
                *counts.entry(var).or_insert(0) += 1;
            }
        }
        for (var, count) in counts {
            self.queue.add(var, -count, self.rng.as_mut());
        }

        self.stats.restarts += 1;
        self.observer.restarted();
        self.observer.conflicts_changed(self.conflicts.len());
        self.state = if self.conflicts.is_empty() {
            SlsState::Solved
        } else {
            SlsState::Searching
        };
        debug!(conflicts = self.conflicts.len(), "restarted");
    }

    /// Runs up to `max_steps` repair steps and returns the number of steps it
    /// took to reach a solution, or `None` if the budget ran out.
    ///
    /// Each step makes a single random draw and compares it against two
    /// cumulative thresholds: below `prob_best` the most conflicted variable
    /// is repaired; between `prob_best` and `prob_best + prob_any_conflict` a
    /// uniform random variable from a uniform random conflicting constraint
    /// is repaired; above both, a uniform random variable with a
    /// non-singleton domain is repaired.
    ///
    /// A fresh assignment is drawn first if the solver is uninitialized or a
    /// previous run exhausted its budget; a solver that is already solved
    /// returns `Some(0)`.
    ///
    /// # Panics
    ///
    /// Panics if the probabilities are negative or sum to more than one.
    pub fn search(&mut self, max_steps: u64, prob_best: f64, prob_any_conflict: f64) -> Option<u64> {
        assert!(
            prob_best >= 0.0 && prob_any_conflict >= 0.0 && prob_best + prob_any_conflict <= 1.0,
            "prob_best ({prob_best}) and prob_any_conflict ({prob_any_conflict}) must be \
             non-negative and sum to at most 1"
        );
        if matches!(self.state, SlsState::Uninitialized | SlsState::Exhausted) {
            self.restart();
        }
        if self.state == SlsState::Solved {
            return Some(0);
        }

        for step in 1..=max_steps {
            self.step(prob_best, prob_any_conflict);
            if self.state == SlsState::Solved {
                debug!(steps = step, "solved");
                return Some(step);
            }
        }
        self.state = SlsState::Exhausted;
        debug!(max_steps, conflicts = self.conflicts.len(), "step budget exhausted");
        None
    }

    /// Performs one repair step. Does nothing unless the solver is searching.
    pub fn step(&mut self, prob_best: f64, prob_any_conflict: f64) {
        if self.state != SlsState::Searching {
            return;
        }
        self.stats.steps += 1;

        let draw: f64 = self.rng.gen();
        let var = if draw < prob_best {
            *self
                .queue
                .top()
                .expect("conflict queue empty while conflicts remain")
        } else if draw < prob_best + prob_any_conflict {
            self.random_conflict_variable()
        } else {
            match self.random_multi_valued_variable() {
                Some(var) => var,
                None => {
                    // Every domain is a singleton; nothing can be repaired.
                    self.stats.noop_steps += 1;
                    return;
                }
            }
        };
        self.reassign(var);
    }

    /// A uniform random variable from the scope of a uniform random
    /// conflicting constraint.
    fn random_conflict_variable(&mut self) -> VariableId {
        let index = self.rng.gen_range(0..self.conflicts.len());
        let cid = *self
            .conflicts
            .iter()
            .nth(index)
            .expect("index is in range");
        let scope = self.csp.constraint(cid).scope();
        scope[self.rng.gen_range(0..scope.len())]
    }

    fn random_multi_valued_variable(&mut self) -> Option<VariableId> {
        if self.multi_valued.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..self.multi_valued.len());
        Some(self.multi_valued[index])
    }

    /// Gives `var` a uniform random *different* value and resynchronizes the
    /// conflict set and the queue, touching only the constraints whose scope
    /// contains `var`. A variable with a singleton domain cannot change, so
    /// the step degrades to a no-op.
    fn reassign(&mut self, var: VariableId) {
        let csp = self.csp;
        let domain = csp.domain(var);
        if domain.len() <= 1 {
            self.stats.noop_steps += 1;
            trace!(var, "no-op step: domain admits no other value");
            return;
        }

        let current = self
            .assignment
            .get(&var)
            .expect("assignment covers every variable")
            .clone();
        let alternatives: Vec<&V> = domain.iter().filter(|value| **value != current).collect();
        let value = alternatives[self.rng.gen_range(0..alternatives.len())].clone();
        let _ = self.assignment.insert(var, value.clone());
        self.stats.reassignments += 1;
        self.observer.variable_reassigned(var, &value);
        trace!(var, value = ?value, "reassigned");

        let mut deltas: BTreeMap<VariableId, i64> = BTreeMap::new();
        for &cid in csp.touching(var) {
            let constraint = csp.constraint(cid);
            let holds = constraint.holds(&self.assignment);
            let was_conflict = self.conflicts.contains(&cid);
            if !holds && !was_conflict {
                let _ = self.conflicts.insert(cid);
                for &scoped in constraint.scope() {
                    *deltas.entry(scoped).or_insert(0) += 1;
                }
            } else if holds && was_conflict {
                let _ = self.conflicts.remove(&cid);
                for &scoped in constraint.scope() {
                    *deltas.entry(scoped).or_insert(0) -= 1;
                }
            }
        }
        self.queue.update_each_priority(&deltas, self.rng.as_mut());
        self.observer.conflicts_changed(self.conflicts.len());
        if self.conflicts.is_empty() {
            self.state = SlsState::Solved;
        }
    }
}
