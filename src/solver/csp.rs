use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::solver::{
    domain::{Domain, Domains},
    value::Value,
};

pub type VariableId = u32;
pub type ConstraintId = usize;

/// A total or partial mapping from variables to concrete values.
pub type Assignment<V> = HashMap<VariableId, V>;

/// A predicate over the values of a constraint's scope.
///
/// `evaluate` receives one value per scope position, in scope order. It is
/// implemented for any closure of the right shape, and the
/// [`CspBuilder`] has shorthands for the common unary/binary/ternary arities.
pub trait ScopedPredicate<V: Value>: Send + Sync {
    fn evaluate(&self, values: &[&V]) -> bool;
}

impl<V: Value, F> ScopedPredicate<V> for F
where
    F: Fn(&[&V]) -> bool + Send + Sync,
{
    fn evaluate(&self, values: &[&V]) -> bool {
        self(values)
    }
}

/// A single constraint: an ordered scope of variables and a predicate over
/// their values.
///
/// Constraints are immutable once the CSP is built, and are identified by the
/// integer handle assigned at construction time. The engines key all arc and
/// conflict bookkeeping on that handle, never on structural equality.
#[derive(Clone)]
pub struct Constraint<V: Value> {
    id: ConstraintId,
    label: String,
    scope: Vec<VariableId>,
    predicate: Arc<dyn ScopedPredicate<V>>,
}

impl<V: Value> Constraint<V> {
    pub fn id(&self) -> ConstraintId {
        self.id
    }

    /// A human-readable description, used for diagnostics and statistics.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn scope(&self) -> &[VariableId] {
        &self.scope
    }

    /// Evaluates the predicate on `values`, which must be in scope order.
    pub fn evaluate(&self, values: &[&V]) -> bool {
        debug_assert_eq!(values.len(), self.scope.len());
        self.predicate.evaluate(values)
    }

    /// Evaluates the constraint against the values assigned to its scope.
    ///
    /// # Panics
    ///
    /// Panics if any scope variable is missing from `assignment`. The caller
    /// is responsible for only evaluating constraints whose scope is covered.
    pub fn holds(&self, assignment: &Assignment<V>) -> bool {
        let values: Vec<&V> = self
            .scope
            .iter()
            .map(|var| {
                assignment.get(var).unwrap_or_else(|| {
                    panic!(
                        "constraint {} ({}) evaluated on an assignment missing variable {}",
                        self.id, self.label, var
                    )
                })
            })
            .collect();
        self.predicate.evaluate(&values)
    }
}

impl<V: Value> fmt::Debug for Constraint<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("scope", &self.scope)
            .finish()
    }
}

/// An immutable constraint-satisfaction problem: variables with initial
/// domains, constraints, and a variable-to-constraints index built once at
/// construction.
///
/// The engines never mutate a `Csp`. They operate on [`Domains`] mappings
/// derived from [`Csp::domains`], so the initial domains stay available for
/// restarts and backtracking.
#[derive(Debug, Clone)]
pub struct Csp<V: Value> {
    names: Vec<String>,
    domains: Domains<V>,
    constraints: Vec<Constraint<V>>,
    touching: Vec<Vec<ConstraintId>>,
}

impl<V: Value> Csp<V> {
    pub fn num_variables(&self) -> usize {
        self.names.len()
    }

    pub fn variables(&self) -> std::ops::Range<VariableId> {
        0..self.names.len() as VariableId
    }

    /// # Panics
    ///
    /// Panics if `var` was not registered with the builder.
    pub fn variable_name(&self, var: VariableId) -> &str {
        &self.names[var as usize]
    }

    /// The initial domains the problem was built with.
    pub fn domains(&self) -> &Domains<V> {
        &self.domains
    }

    /// # Panics
    ///
    /// Panics if `var` was not registered with the builder.
    pub fn domain(&self, var: VariableId) -> &Domain<V> {
        self.domains
            .get(&var)
            .unwrap_or_else(|| panic!("unknown variable {var}"))
    }

    pub fn constraints(&self) -> &[Constraint<V>] {
        &self.constraints
    }

    /// # Panics
    ///
    /// Panics if `id` is not a handle assigned by the builder.
    pub fn constraint(&self, id: ConstraintId) -> &Constraint<V> {
        &self.constraints[id]
    }

    /// The constraints whose scope contains `var`.
    pub fn touching(&self, var: VariableId) -> &[ConstraintId] {
        &self.touching[var as usize]
    }

    /// Checks whether `assignment` satisfies every constraint.
    ///
    /// # Panics
    ///
    /// Panics if `assignment` does not cover the scope of every constraint.
    pub fn is_solution(&self, assignment: &Assignment<V>) -> bool {
        self.constraints.iter().all(|c| c.holds(assignment))
    }
}

struct PendingConstraint<V: Value> {
    label: String,
    scope: Vec<VariableId>,
    predicate: Arc<dyn ScopedPredicate<V>>,
}

/// Builds a [`Csp`], assigning dense variable and constraint handles in
/// registration order.
pub struct CspBuilder<V: Value> {
    names: Vec<String>,
    domains: Domains<V>,
    constraints: Vec<PendingConstraint<V>>,
}

impl<V: Value> CspBuilder<V> {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            domains: Domains::new(),
            constraints: Vec::new(),
        }
    }

    /// Registers a variable with its initial domain and returns its handle.
    pub fn variable(
        &mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> VariableId {
        let id = self.names.len() as VariableId;
        self.names.push(name.into());
        let _ = self.domains.insert(id, values.into_iter().collect());
        id
    }

    /// Registers a constraint over `scope` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if `scope` is empty; a constraint must name at least one
    /// variable for propagation to ever examine it.
    pub fn constraint<P>(
        &mut self,
        label: impl Into<String>,
        scope: Vec<VariableId>,
        predicate: P,
    ) -> ConstraintId
    where
        P: ScopedPredicate<V> + 'static,
    {
        assert!(!scope.is_empty(), "constraint scope must name at least one variable");
        let id = self.constraints.len();
        self.constraints.push(PendingConstraint {
            label: label.into(),
            scope,
            predicate: Arc::new(predicate),
        });
        id
    }

    pub fn unary<F>(&mut self, label: impl Into<String>, var: VariableId, predicate: F) -> ConstraintId
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        self.constraint(label, vec![var], move |values: &[&V]| predicate(values[0]))
    }

    pub fn binary<F>(
        &mut self,
        label: impl Into<String>,
        a: VariableId,
        b: VariableId,
        predicate: F,
    ) -> ConstraintId
    where
        F: Fn(&V, &V) -> bool + Send + Sync + 'static,
    {
        self.constraint(label, vec![a, b], move |values: &[&V]| {
            predicate(values[0], values[1])
        })
    }

    pub fn ternary<F>(
        &mut self,
        label: impl Into<String>,
        a: VariableId,
        b: VariableId,
        c: VariableId,
        predicate: F,
    ) -> ConstraintId
    where
        F: Fn(&V, &V, &V) -> bool + Send + Sync + 'static,
    {
        self.constraint(label, vec![a, b, c], move |values: &[&V]| {
            predicate(values[0], values[1], values[2])
        })
    }

    /// Finalizes the problem, building the variable-to-constraints index.
    ///
    /// # Panics
    ///
    /// Panics if any constraint scope names an unregistered variable.
    pub fn build(self) -> Csp<V> {
        let num_variables = self.names.len();
        let mut touching: Vec<Vec<ConstraintId>> = vec![Vec::new(); num_variables];
        let constraints: Vec<Constraint<V>> = self
            .constraints
            .into_iter()
            .enumerate()
            .map(|(id, pending)| {
                for &var in &pending.scope {
                    assert!(
                        (var as usize) < num_variables,
                        "constraint {:?} names unknown variable {}",
                        pending.label,
                        var
                    );
                    let entry = &mut touching[var as usize];
                    // A scope listing the same variable twice indexes it once.
                    if entry.last() != Some(&id) {
                        entry.push(id);
                    }
                }
                Constraint {
                    id,
                    label: pending.label,
                    scope: pending.scope,
                    predicate: pending.predicate,
                }
            })
            .collect();
        Csp {
            names: self.names,
            domains: self.domains,
            constraints,
            touching,
        }
    }
}

impl<V: Value> Default for CspBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn two_variable_csp() -> Csp<i32> {
        let mut builder = CspBuilder::new();
        let a = builder.variable("A", [1, 2]);
        let b = builder.variable("B", [1, 2]);
        let _ = builder.binary("A < B", a, b, |x, y| x < y);
        builder.build()
    }

    #[test]
    fn builder_assigns_dense_handles_in_registration_order() {
        let mut builder = CspBuilder::new();
        let a = builder.variable("A", [1]);
        let b = builder.variable("B", [1]);
        assert_eq!((a, b), (0, 1));
        let first = builder.unary("A is odd", a, |x| x % 2 == 1);
        let second = builder.binary("A = B", a, b, |x, y| x == y);
        assert_eq!((first, second), (0, 1));

        let csp = builder.build();
        assert_eq!(csp.variable_name(a), "A");
        assert_eq!(csp.constraint(second).label(), "A = B");
    }

    #[test]
    fn touching_index_covers_exactly_the_scope() {
        let mut builder = CspBuilder::new();
        let a = builder.variable("A", [1, 2]);
        let b = builder.variable("B", [1, 2]);
        let c = builder.variable("C", [1, 2]);
        let ab = builder.binary("A = B", a, b, |x, y| x == y);
        let bc = builder.binary("B = C", b, c, |x, y| x == y);
        let csp = builder.build();

        assert_eq!(csp.touching(a), &[ab]);
        assert_eq!(csp.touching(b), &[ab, bc]);
        assert_eq!(csp.touching(c), &[bc]);
    }

    #[test]
    fn holds_evaluates_in_scope_order() {
        let csp = two_variable_csp();
        let constraint = csp.constraint(0);

        let mut assignment = Assignment::new();
        let _ = assignment.insert(0, 1);
        let _ = assignment.insert(1, 2);
        assert!(constraint.holds(&assignment));

        let _ = assignment.insert(0, 2);
        let _ = assignment.insert(1, 1);
        assert!(!constraint.holds(&assignment));
    }

    #[test]
    #[should_panic(expected = "missing variable")]
    fn holds_rejects_assignments_missing_scope_variables() {
        let csp = two_variable_csp();
        let mut assignment = Assignment::new();
        let _ = assignment.insert(0, 1);
        let _ = csp.constraint(0).holds(&assignment);
    }

    #[test]
    #[should_panic(expected = "unknown variable")]
    fn build_rejects_unregistered_scope_variables() {
        let mut builder: CspBuilder<i32> = CspBuilder::new();
        let a = builder.variable("A", [1]);
        let _ = builder.binary("A = ghost", a, 7, |x, y| x == y);
        let _ = builder.build();
    }

    #[test]
    fn is_solution_checks_every_constraint() {
        let mut builder = CspBuilder::new();
        let a = builder.variable("A", [1, 2]);
        let b = builder.variable("B", [1, 2]);
        let _ = builder.binary("A < B", a, b, |x, y| x < y);
        let _ = builder.unary("B = 2", b, |y| *y == 2);
        let csp = builder.build();

        let solution: Assignment<i32> = [(a, 1), (b, 2)].into_iter().collect();
        assert!(csp.is_solution(&solution));
        let non_solution: Assignment<i32> = [(a, 2), (b, 2)].into_iter().collect();
        assert!(!csp.is_solution(&non_solution));
    }
}
