use std::collections::BTreeMap;

use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

use crate::solver::{csp::ConstraintId, csp::Csp, value::Value};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PerConstraintStats {
    /// How often an arc of this constraint was revised.
    pub revisions: u64,
    /// How many of those revisions shrank a domain.
    pub prunings: u64,
    pub time_spent_micros: u64,
}

/// Counters accumulated by the arc-consistency engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropagationStats {
    pub arcs_processed: u64,
    pub prunings: u64,
    pub wipeouts: u64,
    /// Whether a run stopped early because its arc budget ran out.
    pub budget_exhausted: bool,
    pub constraint_stats: BTreeMap<ConstraintId, PerConstraintStats>,
}

/// Counters accumulated by the domain-splitting search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub nodes_visited: u64,
    pub splits: u64,
    /// Branches abandoned after propagation wiped out a domain.
    pub failed_branches: u64,
    pub budget_exhausted: bool,
}

/// Counters accumulated by the SLS engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlsStats {
    pub steps: u64,
    pub reassignments: u64,
    /// Steps that picked a variable whose domain admits no other value.
    pub noop_steps: u64,
    pub restarts: u64,
}

/// Renders per-constraint propagation counters as a table, slowest last.
pub fn render_constraint_stats<V: Value>(stats: &PropagationStats, csp: &Csp<V>) -> String {
    let mut table = Table::new();
    let _ = table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Constraint"),
        Cell::new("Revisions"),
        Cell::new("Prunings"),
        Cell::new("Time / Revision (µs)"),
    ]));

    let mut sorted: Vec<(&ConstraintId, &PerConstraintStats)> =
        stats.constraint_stats.iter().collect();
    sorted.sort_by_key(|(_, per)| per.time_spent_micros);

    for (constraint_id, per) in sorted {
        let avg_time = if per.revisions > 0 {
            per.time_spent_micros as f64 / per.revisions as f64
        } else {
            0.0
        };
        let _ = table.add_row(Row::new(vec![
            Cell::new(&constraint_id.to_string()),
            Cell::new(csp.constraint(*constraint_id).label()),
            Cell::new(&per.revisions.to_string()),
            Cell::new(&per.prunings.to_string()),
            Cell::new(&format!("{avg_time:.2}")),
        ]));
    }

    table.to_string()
}
