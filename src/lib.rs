//! Cinch is a finite-domain constraint solver.
//!
//! A problem is a set of variables with finite domains and a list of
//! constraints, each a predicate over an ordered scope of variables. Two
//! engines share that one model:
//!
//! - **Systematic**: the [`Propagator`](solver::propagation::Propagator)
//!   prunes domains to an arc-consistent fixpoint, and the
//!   [`SplittingSolver`](solver::search::SplittingSolver) wraps it in a
//!   depth-first search that splits a domain whenever propagation alone
//!   cannot decide the problem. Finding no solution this way is a proof that
//!   none exists.
//! - **Stochastic**: the [`SlsSolver`](solver::sls::SlsSolver) keeps a total
//!   assignment and repairs conflicting constraints one variable at a time,
//!   guided by a priority queue of conflict counts. It scales to instances
//!   systematic search cannot touch, but exhausting its step budget proves
//!   nothing.
//!
//! Both engines report progress through the
//! [`SolverObserver`](solver::observer::SolverObserver) callback interface
//! and accumulate counters in [`stats`](solver::stats) structs.
//!
//! # Example
//!
//! ```
//! use cinch::solver;
//! use cinch::solver::csp::CspBuilder;
//!
//! let mut builder = CspBuilder::new();
//! let a = builder.variable("A", 1..=4);
//! let b = builder.variable("B", 1..=4);
//! let c = builder.variable("C", 1..=4);
//! builder.binary("A < B", a, b, |x, y| x < y);
//! builder.unary("B != 2", b, |y| *y != 2);
//! builder.binary("B < C", b, c, |x, y| x < y);
//! let csp = builder.build();
//!
//! let (domains, consistent) = solver::arc_consistency(&csp);
//! assert!(consistent);
//! assert_eq!(domains.get(&b).unwrap().singleton_value(), Some(3));
//!
//! let solution = solver::solve(&csp).expect("satisfiable");
//! assert!(csp.is_solution(&solution));
//! ```
pub mod error;
pub mod solver;
