//! Single-pipe planning on 6-connected 3D grids.
//!
//! This crate finds the minimum-cost axis-aligned path for one pipe given
//! the static [`pipe_grid::GridEnvironment`] and a frozen [`ObstacleSet`]
//! built from the higher-priority pipes already placed.
//!
//! # Overview
//!
//! - **A\*** ([`astar::PipePlanner`]): best-first search over
//!   `(cell, incoming direction)` states pricing length, bends and
//!   unsupported cells
//! - **Obstacles** ([`obstacles::ObstacleSet`]): clearance-expanded cells of
//!   higher-priority pipes
//! - **Neighbors** ([`neighbors::NeighborGenerator`]): free face neighbors
//! - **Heuristics** ([`heuristics::compute_heuristic`]): admissible
//!   Manhattan estimate
//!
//! # Determinism
//!
//! Costs are compared as exact integers and every tie is broken by a fixed
//! rule (fewer bends, then smaller cell, then direction order), so the same
//! inputs always produce the same path. Multi-pipe searches rely on this.
//!
//! # Example: Routing Past Another Pipe
//!
//! ```
//! use pipe_pathfind::{ObstacleSet, PipePlanner};
//! use pipe_types::{PipeId, PipeSpec, PlannerConfig};
//! use pipe_grid::{Cell, GridBounds, GridEnvironment};
//!
//! let env = GridEnvironment::new(GridBounds::from_size(10, 10, 3).unwrap());
//! let planner = PipePlanner::new(&env, PlannerConfig::default());
//!
//! let first = PipeSpec::new(PipeId::new(0), Cell::new(5, 0, 0), Cell::new(5, 9, 0));
//! let second = PipeSpec::new(PipeId::new(1), Cell::new(0, 5, 0), Cell::new(9, 5, 0));
//!
//! let routed = planner.plan(&first, &ObstacleSet::new()).unwrap();
//! let obstacles = ObstacleSet::new().with_path(routed.path(), 0);
//!
//! // The second pipe must hop over the first one
//! let crossing = planner.plan(&second, &obstacles).unwrap();
//! assert!(crossing.path().iter().all(|c| !routed.path().contains(*c)));
//! assert!(crossing.path().moves() > 9);
//! ```

#![doc(html_root_url = "https://docs.rs/pipe-pathfind/0.7.0")]
// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod astar;
pub mod heuristics;
pub mod neighbors;
pub mod obstacles;

// Re-exports
pub use astar::PipePlanner;
pub use heuristics::compute_heuristic;
pub use neighbors::{NeighborGenerator, Neighbors};
pub use obstacles::ObstacleSet;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod integration_tests {
    use super::*;
    use pipe_grid::{Cell, GridBounds, GridEnvironment};
    use pipe_types::{ClearanceTable, DiameterClass, PipeId, PipeSpec, PlannerConfig};

    /// A large pipe forces a wider berth than a small one.
    #[test]
    fn test_clearance_expanded_obstacles() {
        let env = GridEnvironment::new(GridBounds::from_size(9, 9, 1).unwrap());
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let table = ClearanceTable::new().with_radius(DiameterClass::new(1), 1);

        let high = PipeSpec::new(PipeId::new(0), Cell::new(0, 4, 0), Cell::new(6, 4, 0));
        let low = PipeSpec::new(PipeId::new(1), Cell::new(8, 0, 0), Cell::new(8, 8, 0))
            .with_class(DiameterClass::new(1));

        let high_path = planner.plan(&high, &ObstacleSet::new()).unwrap();
        let separation = table.separation(high.class(), low.class()).unwrap();
        let obstacles = ObstacleSet::new().with_path(high_path.path(), separation);

        let low_path = planner.plan(&low, &obstacles).unwrap();
        for a in high_path.path() {
            for b in low_path.path() {
                assert!(!ClearanceTable::violates(*a, *b, separation));
            }
        }
        // x = 7 is within one cell of the high pipe's end, x = 8 is not
        assert_eq!(low_path.path().moves(), 8);
    }
}
