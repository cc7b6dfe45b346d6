//! Core types for multi-pipe routing: pipes, paths, costs, clearance and
//! configuration.
//!
//! This crate provides the data model shared by the single-pipe planner
//! (`pipe-pathfind`) and the priority-based multi-pipe search (`pipe-pbs`).
//!
//! # Overview
//!
//! - **Pipes**: identity and endpoints of each pipe ([`PipeId`], [`PipeSpec`],
//!   [`DiameterClass`])
//! - **Paths**: axis-aligned cell sequences ([`CellPath`], [`PipePath`])
//! - **Costs**: length, bends and unsupported cells ([`CostWeights`], [`PathCost`])
//! - **Clearance**: minimum separation by diameter class ([`ClearanceTable`])
//! - **Configuration**: planner, search and strategy settings ([`RouterConfig`])
//! - **Errors**: [`RoutingError`]
//!
//! # Example
//!
//! ```
//! use pipe_types::{
//!     Algorithm, ClearanceTable, CostWeights, DiameterClass, PipeId, PipeSpec, RouterConfig,
//! };
//! use pipe_grid::Cell;
//!
//! let pipes = vec![
//!     PipeSpec::new(PipeId::new(0), Cell::new(0, 0, 0), Cell::new(9, 0, 0)),
//!     PipeSpec::new(PipeId::new(1), Cell::new(0, 5, 0), Cell::new(9, 5, 0))
//!         .with_class(DiameterClass::new(2)),
//! ];
//!
//! let config = RouterConfig::new(Algorithm::Pbs)
//!     .with_weights(CostWeights::default().with_bend(4.0))
//!     .with_clearance(ClearanceTable::new().with_radius(DiameterClass::new(2), 1));
//!
//! assert!(config.validate().is_empty());
//! assert_eq!(pipes[1].class(), DiameterClass::new(2));
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization for all types

#![doc(html_root_url = "https://docs.rs/pipe-types/0.7.0")]
// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod clearance;
pub mod config;
pub mod cost;
pub mod error;
pub mod path;
pub mod pipe;

// Re-exports
pub use clearance::ClearanceTable;
pub use config::{
    Algorithm, ConflictPolicy, DropConfig, HillClimbConfig, InnerStrategy, PlannerConfig,
    RestartConfig, RouterConfig, SearchConfig,
};
pub use cost::{COST_SCALE, CostWeights, FixedWeights, PathCost};
pub use error::RoutingError;
pub use path::{CellPath, PipePath};
pub use pipe::{DiameterClass, PipeId, PipeSpec};
pub use pipe_grid::Direction;
