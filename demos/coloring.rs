//! Map colouring of mainland Australia, repaired by stochastic local search.

use std::collections::BTreeMap;

use cinch::solver::csp::CspBuilder;
use cinch::solver::sls::SlsSolver;
use clap::Parser;
use tracing_subscriber::EnvFilter;

const COLOURS: [&str; 3] = ["red", "green", "blue"];

const REGIONS: [&str; 7] = ["WA", "NT", "SA", "Q", "NSW", "V", "T"];

const BORDERS: [(&str, &str); 9] = [
    ("WA", "NT"),
    ("WA", "SA"),
    ("NT", "SA"),
    ("NT", "Q"),
    ("SA", "Q"),
    ("SA", "NSW"),
    ("SA", "V"),
    ("Q", "NSW"),
    ("NSW", "V"),
];

#[derive(Parser)]
#[command(about = "Colour the map of Australia with three colours")]
struct Args {
    #[arg(long, default_value_t = 10_000)]
    max_steps: u64,

    /// Probability of repairing the most conflicted variable.
    #[arg(long, default_value_t = 0.3)]
    prob_best: f64,

    /// Probability of repairing a random variable of a random conflict.
    #[arg(long, default_value_t = 0.4)]
    prob_any_conflict: f64,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut builder = CspBuilder::new();
    let variables: BTreeMap<&str, _> = REGIONS
        .iter()
        .map(|&region| (region, builder.variable(region, COLOURS.map(String::from))))
        .collect();
    for (left, right) in BORDERS {
        builder.binary(
            format!("{left} != {right}"),
            variables[left],
            variables[right],
            |x: &String, y: &String| x != y,
        );
    }
    let csp = builder.build();

    let mut solver = SlsSolver::seeded(&csp, args.seed);
    match solver.search(args.max_steps, args.prob_best, args.prob_any_conflict) {
        Some(steps) => {
            let colouring: BTreeMap<String, String> = solver
                .assignment()
                .iter()
                .map(|(&var, colour)| (csp.variable_name(var).to_string(), colour.clone()))
                .collect();
            eprintln!("solved in {steps} steps");
            println!(
                "{}",
                serde_json::to_string_pretty(&colouring).expect("colouring serializes")
            );
        }
        None => println!("no colouring found within {} steps", args.max_steps),
    }
}
