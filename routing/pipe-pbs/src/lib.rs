//! Priority-based multi-pipe routing.
//!
//! This crate routes many pipes through one [`pipe_grid::GridEnvironment`]
//! so that no two of them violate clearance, while keeping the summed
//! length, bend and support cost low. It searches over *priorities*: when a
//! pipe has priority over another, its path is a frozen obstacle for the
//! other's single-pipe planner call.
//!
//! # Overview
//!
//! - **Conflicts** ([`conflict::find_conflicts`]): clearance violations
//!   between routed pipes, found through a cell index
//! - **Priorities** ([`priority::PriorityGraph`]): the acyclic
//!   "must avoid" relation
//! - **PBS** ([`pbs::Pbs`]): depth-first search over priority graphs, with
//!   the PBS-MP variant that may drop pipes under penalty
//! - **OneDive** ([`one_dive::OneDive`]): one greedy dive of the same tree
//! - **FixOrder** ([`fix_order::FixOrder`]): a single total order
//! - **Randomized restarts** ([`restart::RandomizedRestart`]): best of many
//!   shuffled orders, run in parallel
//! - **Hill climbing** ([`hill_climb::HillClimbing`]): local search over the
//!   order of an existing solution
//!
//! Every strategy implements [`Strategy`]; [`solve`] picks one from the
//! configuration.
//!
//! # Quick Start
//!
//! ```
//! use pipe_pbs::{SolveStatus, solve};
//! use pipe_types::{Algorithm, PipeId, PipeSpec, RouterConfig};
//! use pipe_grid::{Cell, GridBounds, GridEnvironment};
//!
//! let env = GridEnvironment::new(GridBounds::from_size(5, 5, 5).unwrap());
//! let pipes = vec![
//!     PipeSpec::new(PipeId::new(0), Cell::new(0, 2, 0), Cell::new(4, 2, 0)),
//!     PipeSpec::new(PipeId::new(1), Cell::new(2, 0, 0), Cell::new(2, 4, 0)),
//! ];
//!
//! let solution = solve(&env, &pipes, &RouterConfig::new(Algorithm::Pbs)).unwrap();
//! assert_eq!(solution.status(), SolveStatus::Complete);
//! assert!(solution.dropped().is_empty());
//!
//! // one pipe stays straight, the other hops over it
//! let straight = solution.routed().filter(|p| p.path().moves() == 4).count();
//! assert_eq!(straight, 1);
//! ```
//!
//! # Budgets
//!
//! Every run is bounded by the time and node limits of
//! [`pipe_types::SearchConfig`]. Budgets are checked between node
//! evaluations and between planner calls. When a budget expires after a
//! solution was found, that solution is returned with
//! [`SolveStatus::TimeoutPartial`]; before that, the run fails with
//! [`pipe_types::RoutingError::Exhausted`] and `budget_expired` set.
//!
//! # Determinism
//!
//! The planner breaks every tie by a fixed rule and all randomness comes
//! from `ChaCha8Rng` seeded by the configured seed, so a run repeated with
//! the same inputs returns the same paths. Parallel work (root planning,
//! restart batches) is merged in a fixed order.
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization for conflicts, priority graphs and
//!   solutions

#![doc(html_root_url = "https://docs.rs/pipe-pbs/0.7.0")]
// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod budget;
pub mod conflict;
pub mod context;
pub mod fix_order;
pub mod hill_climb;
pub mod node;
pub mod one_dive;
pub mod pbs;
pub mod priority;
pub mod restart;
pub mod solution;
pub mod strategy;

// Re-exports
pub use budget::SearchBudget;
pub use conflict::{Conflict, find_conflicts};
pub use context::RoutingContext;
pub use fix_order::FixOrder;
pub use hill_climb::{HillClimbReport, HillClimbing};
pub use node::SearchNode;
pub use one_dive::OneDive;
pub use pbs::Pbs;
pub use priority::PriorityGraph;
pub use restart::RandomizedRestart;
pub use solution::{PipeOutcome, Quality, Solution, SolutionCost, SolveStatus};
pub use strategy::{Strategy, solve, strategy_for};
