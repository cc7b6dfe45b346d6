//! A* planning for a single pipe.
//!
//! The search runs over `(cell, incoming direction)` states so that bends
//! can be priced exactly. Costs are integer milli-units; equal `f` values
//! are broken by fewer bends so far, then by the lexicographically smallest
//! cell, which makes the returned path a pure function of the inputs.
//!
//! # Example
//!
//! ```
//! use pipe_pathfind::{ObstacleSet, PipePlanner};
//! use pipe_types::{PipeId, PipeSpec, PlannerConfig};
//! use pipe_grid::{Cell, GridBounds, GridEnvironment};
//!
//! let env = GridEnvironment::new(GridBounds::from_size(8, 8, 4).unwrap());
//! let planner = PipePlanner::new(&env, PlannerConfig::default());
//!
//! let pipe = PipeSpec::new(PipeId::new(0), Cell::new(0, 0, 0), Cell::new(5, 3, 0));
//! let routed = planner.plan(&pipe, &ObstacleSet::new()).unwrap();
//!
//! assert_eq!(routed.path().moves(), 8);
//! assert_eq!(routed.cost().bends(), 1);
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};
use pipe_grid::{Cell, Direction, GridEnvironment};
use pipe_types::{
    CellPath, FixedWeights, PathCost, PipePath, PipeSpec, PlannerConfig, RoutingError,
};
use tracing::trace;

use crate::heuristics::compute_heuristic;
use crate::neighbors::NeighborGenerator;
use crate::obstacles::ObstacleSet;

/// Search state: a cell plus the direction it was entered from.
type State = (Cell, Option<Direction>);

/// Entry in the open list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: u64,
    g: u64,
    bends: u32,
    cell: Cell,
    incoming: Option<Direction>,
}

impl OpenNode {
    const fn state(&self) -> State {
        (self.cell, self.incoming)
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on every key: BinaryHeap is a max-heap
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.bends.cmp(&self.bends))
            .then_with(|| other.cell.cmp(&self.cell))
            .then_with(|| other.incoming.cmp(&self.incoming))
    }
}

/// Best known cost of a state and how it was reached.
#[derive(Debug, Clone, Copy)]
struct Visit {
    g: u64,
    bends: u32,
    parent: Option<State>,
}

/// Deterministic minimum-cost planner for one pipe.
///
/// The planner reads a shared [`GridEnvironment`] and a per-call
/// [`ObstacleSet`]; it performs no priority reasoning itself.
#[derive(Debug, Clone)]
pub struct PipePlanner<'a> {
    env: &'a GridEnvironment,
    config: PlannerConfig,
    weights: FixedWeights,
}

impl<'a> PipePlanner<'a> {
    /// Creates a planner over an environment.
    #[must_use]
    pub fn new(env: &'a GridEnvironment, config: PlannerConfig) -> Self {
        let weights = config.weights().to_fixed();
        Self {
            env,
            config,
            weights,
        }
    }

    /// Returns the environment.
    #[must_use]
    pub const fn env(&self) -> &'a GridEnvironment {
        self.env
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Returns the fixed-point cost weights.
    #[must_use]
    pub const fn fixed_weights(&self) -> &FixedWeights {
        &self.weights
    }

    /// Finds the minimum-cost path for `pipe` avoiding `obstacles`.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::Grid`] if the start or goal is out of bounds or
    ///   permanently blocked (malformed input)
    /// - [`RoutingError::NoPathFound`] if an endpoint is inside the obstacle
    ///   set or the frontier is exhausted
    /// - [`RoutingError::ExpansionLimit`] if the configured expansion cap is hit
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_pathfind::{ObstacleSet, PipePlanner};
    /// use pipe_types::{PipeId, PipeSpec, PlannerConfig, RoutingError};
    /// use pipe_grid::{Cell, GridBounds, GridEnvironment};
    ///
    /// let env = GridEnvironment::new(GridBounds::from_size(3, 1, 1).unwrap());
    /// let planner = PipePlanner::new(&env, PlannerConfig::default());
    /// let pipe = PipeSpec::new(PipeId::new(0), Cell::new(0, 0, 0), Cell::new(2, 0, 0));
    ///
    /// // a one-cell-wide corridor with its middle taken
    /// let obstacles = ObstacleSet::from_cells([Cell::new(1, 0, 0)]);
    /// let result = planner.plan(&pipe, &obstacles);
    /// assert!(matches!(result, Err(RoutingError::NoPathFound { .. })));
    /// ```
    pub fn plan(&self, pipe: &PipeSpec, obstacles: &ObstacleSet) -> Result<PipePath, RoutingError> {
        let (start, goal) = (pipe.start(), pipe.goal());
        self.env.check_endpoint(start)?;
        self.env.check_endpoint(goal)?;

        let no_path = || RoutingError::NoPathFound {
            pipe: pipe.id(),
            start,
            goal,
        };

        if obstacles.contains(start) || obstacles.contains(goal) {
            return Err(no_path());
        }

        if start == goal {
            return Ok(PipePath::new(
                pipe.id(),
                CellPath::single(start),
                PathCost::default(),
            ));
        }

        let generator = NeighborGenerator::new(self.env, obstacles);
        let mut open = BinaryHeap::new();
        let mut visits: HashMap<State, Visit> = HashMap::new();
        let mut closed: HashSet<State> = HashSet::new();
        let mut expansions = 0usize;

        let root = (start, None);
        visits.insert(
            root,
            Visit {
                g: 0,
                bends: 0,
                parent: None,
            },
        );
        open.push(OpenNode {
            f: compute_heuristic(start, goal, &self.weights),
            g: 0,
            bends: 0,
            cell: start,
            incoming: None,
        });

        while let Some(node) = open.pop() {
            let state = node.state();
            if !closed.insert(state) {
                continue;
            }

            if node.cell == goal {
                let cells = reconstruct(&visits, state);
                let path = CellPath::new(cells);
                let cost = PathCost::measure(&path, self.env);
                trace!(
                    pipe = %pipe.id(),
                    expansions,
                    moves = path.moves(),
                    bends = cost.bends(),
                    "planned pipe"
                );
                return Ok(PipePath::new(pipe.id(), path, cost));
            }

            expansions += 1;
            if let Some(limit) = self.config.max_expansions() {
                if expansions > limit {
                    trace!(pipe = %pipe.id(), limit, "expansion limit reached");
                    return Err(RoutingError::ExpansionLimit {
                        pipe: pipe.id(),
                        limit,
                    });
                }
            }

            for (next, direction) in generator.neighbors(node.cell) {
                let next_state = (next, Some(direction));
                if closed.contains(&next_state) {
                    continue;
                }

                let bends_here = node.incoming.is_some_and(|d| d != direction);
                let unsupported = next != goal && !self.env.is_supported(next);
                let g = node
                    .g
                    .saturating_add(self.weights.step(bends_here, unsupported));
                let bends = node.bends + u32::from(bends_here);

                let improves = visits
                    .get(&next_state)
                    .is_none_or(|v| (g, bends) < (v.g, v.bends));
                if !improves {
                    continue;
                }

                visits.insert(
                    next_state,
                    Visit {
                        g,
                        bends,
                        parent: Some(state),
                    },
                );
                open.push(OpenNode {
                    f: g.saturating_add(compute_heuristic(next, goal, &self.weights)),
                    g,
                    bends,
                    cell: next,
                    incoming: Some(direction),
                });
            }
        }

        trace!(pipe = %pipe.id(), expansions, "frontier exhausted");
        Err(no_path())
    }
}

/// Walks parent links back to the start.
fn reconstruct(visits: &HashMap<State, Visit>, goal: State) -> Vec<Cell> {
    let mut cells = vec![goal.0];
    let mut current = visits.get(&goal).and_then(|v| v.parent);
    while let Some(state) = current {
        cells.push(state.0);
        current = visits.get(&state).and_then(|v| v.parent);
    }
    cells.reverse();
    cells
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pipe_grid::{GridBounds, SupportRule};
    use pipe_types::{CostWeights, PipeId};

    fn open_env(x: u32, y: u32, z: u32) -> GridEnvironment {
        GridEnvironment::new(GridBounds::from_size(x, y, z).unwrap())
    }

    fn pipe(start: (i32, i32, i32), goal: (i32, i32, i32)) -> PipeSpec {
        PipeSpec::new(PipeId::new(0), start.into(), goal.into())
    }

    #[test]
    fn test_straight_line() {
        let env = open_env(10, 3, 3);
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let routed = planner
            .plan(&pipe((0, 1, 0), (9, 1, 0)), &ObstacleSet::new())
            .unwrap();
        assert_eq!(routed.path().moves(), 9);
        assert_eq!(routed.cost(), &PathCost::new(9, 0, 0));
        assert!(routed.path().is_connected());
    }

    #[test]
    fn test_same_start_and_goal() {
        let env = open_env(5, 5, 5);
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let routed = planner
            .plan(&pipe((2, 2, 4), (2, 2, 4)), &ObstacleSet::new())
            .unwrap();
        assert_eq!(routed.path().len(), 1);
        assert_eq!(routed.path().moves(), 0);
        assert_eq!(routed.path().bends(), 0);
        assert_relative_eq!(routed.weighted_cost(&CostWeights::default()), 0.0);
    }

    #[test]
    fn test_enclosed_start_has_no_path() {
        let center = Cell::new(2, 2, 2);
        let env = open_env(5, 5, 5).with_blocked(center.face_neighbors());
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let err = planner
            .plan(&pipe((2, 2, 2), (0, 0, 0)), &ObstacleSet::new())
            .unwrap_err();
        assert!(matches!(err, RoutingError::NoPathFound { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_blocked_endpoint_is_input_error() {
        let env = open_env(5, 5, 5).with_blocked([Cell::new(4, 4, 4)]);
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let err = planner
            .plan(&pipe((0, 0, 0), (4, 4, 4)), &ObstacleSet::new())
            .unwrap_err();
        assert!(matches!(err, RoutingError::Grid(_)));
        let err = planner
            .plan(&pipe((0, 0, 0), (9, 0, 0)), &ObstacleSet::new())
            .unwrap_err();
        assert!(matches!(err, RoutingError::Grid(_)));
    }

    #[test]
    fn test_prefers_fewer_bends() {
        // Any monotone staircase has the same length; the planner should take
        // the single-bend L.
        let env = open_env(6, 6, 1);
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let routed = planner
            .plan(&pipe((0, 0, 0), (5, 5, 0)), &ObstacleSet::new())
            .unwrap();
        assert_eq!(routed.path().moves(), 10);
        assert_eq!(routed.cost().bends(), 1);
    }

    #[test]
    fn test_tie_break_is_lexicographic() {
        // Two single-bend L-shapes of equal cost; the one through the smaller
        // corner cell (0, 4, 0) wins over (4, 0, 0).
        let env = open_env(5, 5, 1);
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let routed = planner
            .plan(&pipe((0, 0, 0), (4, 4, 0)), &ObstacleSet::new())
            .unwrap();
        assert!(routed.path().contains(Cell::new(0, 4, 0)));
        assert!(!routed.path().contains(Cell::new(4, 0, 0)));
    }

    #[test]
    fn test_detours_around_obstacles() {
        let env = open_env(5, 3, 1);
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let obstacles = ObstacleSet::from_cells([Cell::new(2, 0, 0), Cell::new(2, 1, 0)]);
        let routed = planner.plan(&pipe((0, 0, 0), (4, 0, 0)), &obstacles).unwrap();
        assert!(routed.path().contains(Cell::new(2, 2, 0)));
        assert_eq!(routed.path().moves(), 8);
        assert_eq!(routed.cost().bends(), 2);
    }

    #[test]
    fn test_support_penalty_pulls_path_to_floor() {
        // Climbing over the block is as short as walking around it, but the
        // climb passes through hanging cells.
        let env = open_env(5, 3, 3).with_blocked([Cell::new(2, 0, 0)]);
        let weights = CostWeights::default().with_bend(0.0).with_support(10.0);
        let planner = PipePlanner::new(&env, PlannerConfig::new().with_weights(weights));
        let routed = planner
            .plan(&pipe((0, 0, 0), (4, 0, 0)), &ObstacleSet::new())
            .unwrap();
        assert_eq!(routed.cost().unsupported(), 0);
        assert!(routed.path().iter().all(|c| c.z == 0));
    }

    #[test]
    fn test_endpoints_count_as_supported() {
        let env = open_env(3, 1, 3).with_support_rule(SupportRule::explicit_only());
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let routed = planner
            .plan(&pipe((0, 0, 2), (2, 0, 2)), &ObstacleSet::new())
            .unwrap();
        // only the middle cell hangs
        assert_eq!(routed.cost(), &PathCost::new(2, 0, 1));
        assert_eq!(routed.cost().fixed(planner.fixed_weights()), 2_500);
    }

    #[test]
    fn test_expansion_limit() {
        let env = open_env(20, 20, 20);
        let planner = PipePlanner::new(&env, PlannerConfig::new().with_max_expansions(Some(5)));
        let err = planner
            .plan(&pipe((0, 0, 0), (19, 19, 19)), &ObstacleSet::new())
            .unwrap_err();
        assert_eq!(
            err,
            RoutingError::ExpansionLimit {
                pipe: PipeId::new(0),
                limit: 5
            }
        );
    }

    #[test]
    fn test_endpoint_inside_obstacles() {
        let env = open_env(5, 5, 5);
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let obstacles = ObstacleSet::from_cells([Cell::new(4, 0, 0)]);
        let err = planner
            .plan(&pipe((0, 0, 0), (4, 0, 0)), &obstacles)
            .unwrap_err();
        assert!(err.is_infeasible());
    }

    #[test]
    fn test_deterministic() {
        let env = open_env(8, 8, 8).with_blocked_box(Cell::new(3, 0, 0), Cell::new(4, 6, 5));
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let obstacles = ObstacleSet::from_cells([Cell::new(2, 7, 0), Cell::new(5, 7, 6)]);
        let spec = pipe((0, 0, 0), (7, 2, 1));
        let first = planner.plan(&spec, &obstacles).unwrap();
        for _ in 0..5 {
            assert_eq!(planner.plan(&spec, &obstacles).unwrap(), first);
        }
    }
}
