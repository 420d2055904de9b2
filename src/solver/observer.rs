use tracing::{debug, trace};

use crate::solver::{
    csp::{ConstraintId, VariableId},
    value::Value,
};

/// Callbacks invoked by the engines at well-defined points of their loops.
///
/// External tooling (loggers, statistics collectors, visualizers) observes
/// progress through this interface; the engines never depend on a display
/// framework or process-global verbosity state. Every method has an empty
/// default body, so an implementation only overrides the events it cares
/// about.
pub trait SolverObserver<V: Value> {
    /// An arc was popped from the work-list for revision.
    fn arc_selected(&mut self, _var: VariableId, _constraint: ConstraintId) {}

    /// Revision removed `removed` values from the variable's domain.
    fn domain_pruned(&mut self, _var: VariableId, _removed: usize, _remaining: usize) {}

    /// Revision emptied the variable's domain; propagation stops.
    fn domain_wiped(&mut self, _var: VariableId, _constraint: ConstraintId) {}

    /// The splitting search partitioned a variable's domain into two branches.
    fn variable_split(&mut self, _var: VariableId, _left: usize, _right: usize) {}

    /// The SLS engine gave a variable a new value.
    fn variable_reassigned(&mut self, _var: VariableId, _value: &V) {}

    /// The SLS conflict set changed size.
    fn conflicts_changed(&mut self, _conflicts: usize) {}

    /// The SLS engine drew a fresh random assignment.
    fn restarted(&mut self) {}
}

/// The default observer: ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl<V: Value> SolverObserver<V> for NullObserver {}

/// Forwards every event to [`tracing`] at debug/trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl<V: Value> SolverObserver<V> for TracingObserver {
    fn arc_selected(&mut self, var: VariableId, constraint: ConstraintId) {
        trace!(var, constraint, "arc selected");
    }

    fn domain_pruned(&mut self, var: VariableId, removed: usize, remaining: usize) {
        debug!(var, removed, remaining, "domain pruned");
    }

    fn domain_wiped(&mut self, var: VariableId, constraint: ConstraintId) {
        debug!(var, constraint, "domain wiped out");
    }

    fn variable_split(&mut self, var: VariableId, left: usize, right: usize) {
        debug!(var, left, right, "domain split");
    }

    fn variable_reassigned(&mut self, var: VariableId, value: &V) {
        debug!(var, value = ?value, "variable reassigned");
    }

    fn conflicts_changed(&mut self, conflicts: usize) {
        trace!(conflicts, "conflict set changed");
    }

    fn restarted(&mut self) {
        debug!("restarted with a fresh assignment");
    }
}
