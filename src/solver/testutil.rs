//! Shared fixtures and brute-force oracles for the engine tests.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use crate::solver::{
    csp::{Assignment, Constraint, Csp, CspBuilder, VariableId},
    domain::Domains,
};

/// A < B, B != 2, B < C over {1, 2, 3, 4}: a tree-shaped instance with two
/// solutions, used across the engine tests.
pub(crate) fn chain_csp() -> Csp<i32> {
    let mut builder = CspBuilder::new();
    let a = builder.variable("A", 1..=4);
    let b = builder.variable("B", 1..=4);
    let c = builder.variable("C", 1..=4);
    let _ = builder.binary("A < B", a, b, |x, y| x < y);
    let _ = builder.unary("B != 2", b, |y| *y != 2);
    let _ = builder.binary("B < C", b, c, |x, y| x < y);
    builder.build()
}

/// A = B, B = C, A != C over {1, 2}: unsatisfiable, yet every individual arc
/// has support, so only search can refute it.
pub(crate) fn equality_cycle_csp() -> Csp<i32> {
    let mut builder = CspBuilder::new();
    let a = builder.variable("A", [1, 2]);
    let b = builder.variable("B", [1, 2]);
    let c = builder.variable("C", [1, 2]);
    let _ = builder.binary("A = B", a, b, |x, y| x == y);
    let _ = builder.binary("B = C", b, c, |x, y| x == y);
    let _ = builder.binary("A != C", a, c, |x, y| x != y);
    builder.build()
}

/// Every total assignment satisfying all constraints, enumerated by walking
/// the full cross-product of the initial domains.
pub(crate) fn enumerate_solutions(csp: &Csp<i32>) -> Vec<Assignment<i32>> {
    let variables: Vec<VariableId> = csp.variables().collect();
    let value_lists: Vec<Vec<i32>> = variables
        .iter()
        .map(|&var| {
            let mut values: Vec<i32> = csp.domain(var).iter().cloned().collect();
            values.sort_unstable();
            values
        })
        .collect();
    if variables.is_empty() || value_lists.iter().any(|values| values.is_empty()) {
        return Vec::new();
    }

    let mut solutions = Vec::new();
    let mut odometer = vec![0usize; variables.len()];
    loop {
        let assignment: Assignment<i32> = variables
            .iter()
            .enumerate()
            .map(|(slot, &var)| (var, value_lists[slot][odometer[slot]]))
            .collect();
        if csp.is_solution(&assignment) {
            solutions.push(assignment);
        }

        let mut slot = 0;
        loop {
            odometer[slot] += 1;
            if odometer[slot] < value_lists[slot].len() {
                break;
            }
            odometer[slot] = 0;
            slot += 1;
            if slot == variables.len() {
                return solutions;
            }
        }
    }
}

/// For each variable, the sorted values that occur in at least one solution.
/// On tree-shaped instances this coincides with the arc-consistent fixpoint,
/// which makes it a transcription-proof oracle for the propagation tests.
pub(crate) fn solution_supported_domains(csp: &Csp<i32>) -> HashMap<VariableId, Vec<i32>> {
    let solutions = enumerate_solutions(csp);
    csp.variables()
        .map(|var| {
            let mut values: Vec<i32> = solutions
                .iter()
                .map(|solution| solution[&var])
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            values.sort_unstable();
            (var, values)
        })
        .collect()
}

/// Checks the arc-consistency property directly: every value of every domain
/// has, for every constraint touching its variable, a supporting combination
/// drawn from the other variables' domains.
pub(crate) fn is_arc_consistent(csp: &Csp<i32>, domains: &Domains<i32>) -> bool {
    csp.constraints().iter().all(|constraint| {
        constraint.scope().iter().enumerate().all(|(position, &var)| {
            domains
                .get(&var)
                .unwrap()
                .iter()
                .all(|&value| supported(constraint, position, value, domains))
        })
    })
}

fn supported(
    constraint: &Constraint<i32>,
    var_position: usize,
    value: i32,
    domains: &Domains<i32>,
) -> bool {
    let scope = constraint.scope();
    let other_positions: Vec<usize> = (0..scope.len()).filter(|&p| p != var_position).collect();
    let other_values: Vec<Vec<i32>> = other_positions
        .iter()
        .map(|&p| domains.get(&scope[p]).unwrap().iter().cloned().collect())
        .collect();

    let mut values = vec![value; scope.len()];
    if other_positions.is_empty() {
        let refs: Vec<&i32> = values.iter().collect();
        return constraint.evaluate(&refs);
    }
    if other_values.iter().any(|candidates| candidates.is_empty()) {
        return false;
    }

    let mut odometer = vec![0usize; other_positions.len()];
    loop {
        for (slot, &position) in other_positions.iter().enumerate() {
            values[position] = other_values[slot][odometer[slot]];
        }
        let refs: Vec<&i32> = values.iter().collect();
        if constraint.evaluate(&refs) {
            return true;
        }
        let mut slot = 0;
        loop {
            odometer[slot] += 1;
            if odometer[slot] < other_values[slot].len() {
                break;
            }
            odometer[slot] = 0;
            slot += 1;
            if slot == other_positions.len() {
                return false;
            }
        }
    }
}

/// A randomly generated binary CSP small enough to brute-force, used as the
/// proptest input for the propagation and search properties.
#[derive(Debug, Clone)]
pub(crate) struct SmallInstance {
    pub domains: Vec<Vec<i32>>,
    /// `(a, b, allowed)`: the pairs of values permitted for variables `a`
    /// and `b`.
    pub constraints: Vec<(usize, usize, Vec<(i32, i32)>)>,
}

impl SmallInstance {
    pub(crate) fn strategy() -> impl Strategy<Value = SmallInstance> {
        (2usize..=4)
            .prop_flat_map(|num_variables| {
                let domains = prop::collection::vec(
                    prop::collection::btree_set(0i32..4, 1..=4),
                    num_variables,
                );
                let constraints = prop::collection::vec(
                    (
                        0..num_variables,
                        0..num_variables - 1,
                        prop::collection::btree_set((0i32..4, 0i32..4), 0..=12),
                    ),
                    0..=5,
                );
                (domains, constraints)
            })
            .prop_map(|(domains, raw_constraints)| {
                let num_variables = domains.len();
                let constraints = raw_constraints
                    .into_iter()
                    .map(|(a, b_offset, allowed)| {
                        // Skew the second endpoint so a constraint never
                        // scopes the same variable twice.
                        let b = (a + 1 + b_offset) % num_variables;
                        (a, b, allowed.into_iter().collect())
                    })
                    .collect();
                SmallInstance {
                    domains: domains
                        .into_iter()
                        .map(|values| values.into_iter().collect())
                        .collect(),
                    constraints,
                }
            })
    }

    pub(crate) fn build_csp(&self) -> Csp<i32> {
        let mut builder = CspBuilder::new();
        let variables: Vec<VariableId> = self
            .domains
            .iter()
            .enumerate()
            .map(|(index, values)| builder.variable(format!("V{index}"), values.iter().copied()))
            .collect();
        for (index, (a, b, allowed)) in self.constraints.iter().enumerate() {
            let table: HashSet<(i32, i32)> = allowed.iter().copied().collect();
            let _ = builder.binary(
                format!("T{index}"),
                variables[*a],
                variables[*b],
                move |x, y| table.contains(&(*x, *y)),
            );
        }
        builder.build()
    }
}
