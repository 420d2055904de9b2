//! N-queens: one variable per column, valued by row. Solved either by
//! propagation + domain splitting or by stochastic local search.

use std::collections::BTreeMap;

use cinch::solver;
use cinch::solver::csp::{Csp, CspBuilder};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Solve the N-queens problem")]
struct Args {
    /// Board size.
    #[arg(default_value_t = 8)]
    n: usize,

    /// Use stochastic local search instead of domain splitting.
    #[arg(long)]
    sls: bool,

    /// Step budget for --sls.
    #[arg(long, default_value_t = 100_000)]
    max_steps: u64,

    /// Seed for --sls; omit for a random run.
    #[arg(long)]
    seed: Option<u64>,
}

fn build_queens(n: usize) -> Csp<i32> {
    let mut builder = CspBuilder::new();
    let columns: Vec<_> = (0..n)
        .map(|column| builder.variable(format!("Q{column}"), 0..n as i32))
        .collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let offset = (j - i) as i32;
            builder.binary(
                format!("Q{i} vs Q{j}"),
                columns[i],
                columns[j],
                move |&ri, &rj| ri != rj && (ri - rj).abs() != offset,
            );
        }
    }
    builder.build()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    let csp = build_queens(args.n);

    let solution = if args.sls {
        match args.seed {
            Some(seed) => solver::sls_solve_seeded(&csp, args.max_steps, 0.3, 0.4, seed),
            None => solver::sls_solve(&csp, args.max_steps, 0.3, 0.4),
        }
    } else {
        solver::solve(&csp)
    };

    match solution {
        Some(assignment) => {
            let rows: BTreeMap<String, i32> = assignment
                .iter()
                .map(|(&var, &row)| (csp.variable_name(var).to_string(), row))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).expect("assignment serializes")
            );
        }
        None => println!("no solution"),
    }
}
