//! Property-based tests for priority graphs, the planner and the strategies.
//!
//! Run with: cargo test -p pipe-pbs -- proptest

use std::time::Duration;

use pipe_grid::{Cell, GridBounds, GridEnvironment};
use pipe_pathfind::{ObstacleSet, PipePlanner};
use pipe_pbs::{FixOrder, HillClimbing, Pbs, PriorityGraph, RoutingContext, SearchBudget};
use pipe_pbs::{Strategy as RoutingStrategy, find_conflicts};
use pipe_types::{
    Algorithm, ConflictPolicy, PipeId, PipeSpec, PlannerConfig, RouterConfig, RoutingError,
    SearchConfig,
};
use proptest::prelude::*;

// =============================================================================
// Strategies for generating instances
// =============================================================================

/// A cell inside a `size`-sided cube at the origin.
fn arb_cell(size: i32) -> impl Strategy<Value = Cell> {
    (0..size, 0..size, 0..size).prop_map(|(x, y, z)| Cell::new(x, y, z))
}

/// Up to `max` pipes with random endpoints in a 6x6x3 box.
fn arb_pipes(max: usize) -> impl Strategy<Value = Vec<PipeSpec>> {
    let endpoint = (0..6i32, 0..6i32, 0..3i32).prop_map(|(x, y, z)| Cell::new(x, y, z));
    prop::collection::vec((endpoint.clone(), endpoint), 1..=max).prop_map(|ends| {
        ends.into_iter()
            .zip(0u32..)
            .map(|((start, goal), id)| PipeSpec::new(PipeId::new(id), start, goal))
            .collect()
    })
}

fn routing_env() -> GridEnvironment {
    GridEnvironment::new(GridBounds::from_size(6, 6, 3).unwrap())
}

fn bounded(algorithm: Algorithm) -> RouterConfig {
    RouterConfig::new(algorithm).with_search(
        SearchConfig::new()
            .with_time_limit(Some(Duration::from_secs(5)))
            .with_node_limit(Some(200)),
    )
}

// =============================================================================
// Priority graph
// =============================================================================

proptest! {
    /// No sequence of insertions can produce a cycle.
    #[test]
    fn priority_graph_stays_acyclic(
        n in 2u32..8,
        edges in prop::collection::vec((0u32..8, 0u32..8), 0..40),
    ) {
        let ids: Vec<PipeId> = (0..n).map(PipeId::new).collect();
        let mut graph = PriorityGraph::new(ids.iter().copied());

        for (h, l) in edges {
            let (higher, lower) = (PipeId::new(h % n), PipeId::new(l % n));
            let would_cycle = graph.would_cycle(higher, lower);
            let result = graph.try_add(higher, lower);
            prop_assert_eq!(result.is_err(), would_cycle);
            prop_assert!(graph.is_acyclic());
        }

        let order = graph.topological_order();
        prop_assert_eq!(order.len(), ids.len());
        let position = |p: PipeId| order.iter().position(|q| *q == p);
        for (higher, lower) in graph.edges() {
            prop_assert!(position(higher) < position(lower));
        }
        let layered: usize = graph.layers().iter().map(Vec::len).sum();
        prop_assert_eq!(layered, ids.len());
    }
}

// =============================================================================
// Single-pipe planner
// =============================================================================

proptest! {
    /// Same inputs, same path.
    #[test]
    fn planner_is_deterministic(
        start in arb_cell(5),
        goal in arb_cell(5),
        blocked in prop::collection::vec(arb_cell(5), 0..30),
    ) {
        let env = GridEnvironment::new(GridBounds::from_size(5, 5, 5).unwrap())
            .with_blocked(blocked.into_iter().filter(|c| *c != start && *c != goal));
        let planner = PipePlanner::new(&env, PlannerConfig::default());
        let pipe = PipeSpec::new(PipeId::new(0), start, goal);

        let first = planner.plan(&pipe, &ObstacleSet::new());
        let second = planner.plan(&pipe, &ObstacleSet::new());
        prop_assert_eq!(&first, &second);

        if let Ok(routed) = first {
            prop_assert!(routed.path().is_connected());
            prop_assert_eq!(routed.path().start(), Some(start));
            prop_assert_eq!(routed.path().end(), Some(goal));
            prop_assert!(routed.path().iter().all(|c| !env.is_blocked(*c)));
        }
    }
}

// =============================================================================
// Multi-pipe strategies
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Accepted PBS solutions are conflict-free and drop nothing.
    #[test]
    fn pbs_solutions_are_conflict_free(pipes in arb_pipes(4)) {
        let env = routing_env();
        let config = bounded(Algorithm::Pbs);
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        if let Ok(solution) = Pbs::new().solve(&ctx) {
            prop_assert!(solution.dropped().is_empty());
            prop_assert_eq!(solution.routed().count(), pipes.len());
            let routed = pipes.iter().filter_map(|spec| {
                solution.path(spec.id()).map(|p| (spec, p.path()))
            });
            prop_assert!(find_conflicts(routed, config.clearance()).is_empty());
            prop_assert!(solution.priorities().is_acyclic());
        }
    }

    /// Weighted random branching never closes a cycle or overruns the node limit.
    #[test]
    fn pbs_respects_priorities_and_node_limit(
        pipes in arb_pipes(5),
        seed in any::<u64>(),
        weighted in any::<bool>(),
        limit in 1usize..40,
    ) {
        let env = routing_env();
        let policy = if weighted {
            ConflictPolicy::CostWeighted
        } else {
            ConflictPolicy::LowestPair
        };
        let config = RouterConfig::new(Algorithm::Pbs).with_seed(seed).with_search(
            SearchConfig::new()
                .with_conflict_policy(policy)
                .with_exhaustive(true)
                .with_node_limit(Some(limit)),
        );
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        match Pbs::new().solve(&ctx) {
            Ok(solution) => {
                prop_assert!(solution.nodes_explored() <= limit);
                prop_assert!(solution.priorities().is_acyclic());
                let routed = pipes.iter().filter_map(|spec| {
                    solution.path(spec.id()).map(|p| (spec, p.path()))
                });
                prop_assert!(find_conflicts(routed, config.clearance()).is_empty());
            }
            Err(error) => {
                prop_assert!(error.is_exhausted());
                if let RoutingError::Exhausted { nodes_explored, .. } = error {
                    prop_assert!(nodes_explored <= limit);
                }
            }
        }
    }

    /// FixOrder is reproducible.
    #[test]
    fn fix_order_is_deterministic(pipes in arb_pipes(4)) {
        let env = routing_env();
        let config = bounded(Algorithm::FixOrder);
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        let a = FixOrder::new().solve(&ctx);
        let b = FixOrder::new().solve(&ctx);
        match (a, b) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a.outcomes(), b.outcomes()),
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "runs disagree"),
        }
    }

    /// Accepted hill-climbing moves only ever lower the cost.
    #[test]
    fn hill_climbing_is_monotone(pipes in arb_pipes(4), seed in any::<u64>()) {
        let env = routing_env();
        let config = bounded(Algorithm::HillClimbing).with_seed(seed);
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        if let Ok(start) = FixOrder::new().solve(&ctx) {
            let mut budget = SearchBudget::unlimited();
            let report = HillClimbing.improve(&ctx, &start, &mut budget).unwrap();
            prop_assert_eq!(report.history()[0], start.quality());
            prop_assert!(report.history().windows(2).all(|w| w[1] < w[0]));
            prop_assert!(report.solution().quality() <= start.quality());
        }
    }
}
