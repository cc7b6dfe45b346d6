//! Randomized restarts over shuffled priority orders.
//!
//! Restart `i` shuffles the pipes with a `ChaCha8Rng` seeded by
//! `seed ^ i` and runs the inner strategy on that order. Restarts are
//! independent, so they run in parallel batches of one restart per rayon
//! thread; the deadline is checked between batches.

use pipe_types::{Algorithm, InnerStrategy, PipeId, RoutingError};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::budget::SearchBudget;
use crate::context::RoutingContext;
use crate::fix_order::route_in_order;
use crate::node::SearchNode;
use crate::one_dive::OneDive;
use crate::solution::{Solution, SolveStatus};
use crate::strategy::Strategy;

/// Best of several shuffled FixOrder or OneDive runs.
///
/// # Example
///
/// ```
/// use pipe_pbs::{RandomizedRestart, RoutingContext, Strategy};
/// use pipe_types::{Algorithm, PipeId, PipeSpec, RestartConfig, RouterConfig};
/// use pipe_grid::{Cell, GridBounds, GridEnvironment};
///
/// let env = GridEnvironment::new(GridBounds::from_size(6, 6, 2).unwrap());
/// let pipes = vec![
///     PipeSpec::new(PipeId::new(0), Cell::new(0, 3, 0), Cell::new(5, 3, 0)),
///     PipeSpec::new(PipeId::new(1), Cell::new(3, 0, 0), Cell::new(3, 5, 0)),
/// ];
/// let config = RouterConfig::new(Algorithm::RandomizedRestart)
///     .with_restart(RestartConfig::new().with_restarts(4))
///     .with_seed(11);
/// let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();
///
/// let a = RandomizedRestart.solve(&ctx).unwrap();
/// let b = RandomizedRestart.solve(&ctx).unwrap();
/// assert_eq!(a.outcomes(), b.outcomes());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RandomizedRestart;

impl RandomizedRestart {
    /// The pipe order tried by restart `index`.
    #[must_use]
    pub fn shuffled_order(ctx: &RoutingContext<'_>, index: usize) -> Vec<PipeId> {
        let mut order: Vec<PipeId> = ctx.pipe_ids().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(ctx.config().seed() ^ index as u64);
        order.shuffle(&mut rng);
        order
    }
}

fn run_inner(
    ctx: &RoutingContext<'_>,
    inner: InnerStrategy,
    order: Vec<PipeId>,
    budget: &mut SearchBudget,
) -> Result<SearchNode, RoutingError> {
    match inner {
        InnerStrategy::FixOrder => route_in_order(ctx, &order, budget),
        InnerStrategy::OneDive => OneDive::with_ranks(order).run(ctx, budget),
    }
}

impl Strategy for RandomizedRestart {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RandomizedRestart
    }

    fn solve_within(
        &self,
        ctx: &RoutingContext<'_>,
        budget: &mut SearchBudget,
    ) -> Result<Solution, RoutingError> {
        if let Some(trivial) = ctx.trivial_solution(self.algorithm(), budget) {
            return Ok(trivial);
        }
        let settings = ctx.config().restart();
        let (restarts, inner) = (settings.restarts(), settings.inner());
        let batch = rayon::current_num_threads().max(1);

        let mut best: Option<(usize, SearchNode)> = None;
        let mut stopped = false;
        let mut start = 0;

        while start < restarts {
            if budget.expired() {
                stopped = true;
                break;
            }
            let end = restarts.min(start + batch);
            let shared = &*budget;
            let results: Vec<_> = (start..end)
                .into_par_iter()
                .map(|index| {
                    let mut fork = shared.fork();
                    let order = Self::shuffled_order(ctx, index);
                    let result = run_inner(ctx, inner, order, &mut fork);
                    (index, fork.nodes(), result)
                })
                .collect();

            for (index, nodes, result) in results {
                budget.charge_nodes(nodes);
                match result {
                    Ok(node) => {
                        let better = best
                            .as_ref()
                            .is_none_or(|(_, b)| node.quality() < b.quality());
                        debug!(
                            restart = index,
                            cost = node.quality().cost(),
                            better,
                            "restart succeeded"
                        );
                        if better {
                            best = Some((index, node));
                        }
                    }
                    Err(e) if e.is_recoverable() || e.is_exhausted() => {
                        debug!(restart = index, error = %e, "restart failed");
                    }
                    Err(e) => return Err(e),
                }
            }
            start = end;
        }

        let Some((index, node)) = best else {
            return Err(RoutingError::Exhausted {
                nodes_explored: budget.nodes(),
                budget_expired: stopped,
            });
        };
        debug!(restart = index, "best restart");
        let status = if stopped {
            SolveStatus::TimeoutPartial
        } else {
            SolveStatus::Complete
        };
        let (priorities, assignment) = node.into_parts();
        Ok(ctx.solution(self.algorithm(), &assignment, priorities, budget, status))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pipe_grid::{Cell, GridBounds, GridEnvironment};
    use pipe_types::{PipeSpec, RestartConfig, RouterConfig, SearchConfig};

    /// Two rows crossed by one column; every order is routable.
    fn instance() -> (GridEnvironment, Vec<PipeSpec>) {
        let env = GridEnvironment::new(GridBounds::from_size(6, 6, 3).unwrap());
        let pipes = vec![
            PipeSpec::new(PipeId::new(0), Cell::new(0, 1, 0), Cell::new(5, 1, 0)),
            PipeSpec::new(PipeId::new(1), Cell::new(3, 0, 0), Cell::new(3, 5, 0)),
            PipeSpec::new(PipeId::new(2), Cell::new(0, 4, 0), Cell::new(5, 4, 0)),
        ];
        (env, pipes)
    }

    #[test]
    fn test_shuffles_are_permutations() {
        let (env, pipes) = instance();
        let config = RouterConfig::new(Algorithm::RandomizedRestart);
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        for index in 0..8 {
            let order = RandomizedRestart::shuffled_order(&ctx, index);
            assert!(ctx.is_permutation(&order));
            assert_eq!(order, RandomizedRestart::shuffled_order(&ctx, index));
        }
    }

    #[test]
    fn test_best_is_no_worse_than_first_restart() {
        let (env, pipes) = instance();
        let config = RouterConfig::new(Algorithm::RandomizedRestart)
            .with_restart(RestartConfig::new().with_restarts(6));
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        let solution = RandomizedRestart.solve(&ctx).unwrap();
        let mut budget = SearchBudget::unlimited();
        let first =
            route_in_order(&ctx, &RandomizedRestart::shuffled_order(&ctx, 0), &mut budget)
                .unwrap();
        assert!(solution.quality() <= first.quality());
        assert_eq!(solution.nodes_explored(), 6);
        assert_eq!(solution.status(), SolveStatus::Complete);
    }

    #[test]
    fn test_one_dive_inner() {
        let (env, pipes) = instance();
        let config = RouterConfig::new(Algorithm::RandomizedRestart).with_restart(
            RestartConfig::new()
                .with_restarts(3)
                .with_inner(InnerStrategy::OneDive),
        );
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        let solution = RandomizedRestart.solve(&ctx).unwrap();
        assert!(solution.dropped().is_empty());
        assert_eq!(solution.routed().count(), 3);
    }

    #[test]
    fn test_expired_budget_before_first_batch() {
        let (env, pipes) = instance();
        let config = RouterConfig::new(Algorithm::RandomizedRestart)
            .with_search(SearchConfig::new().with_node_limit(Some(1)));
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        let mut budget = SearchBudget::new(ctx.config().search());
        budget.charge_node();
        let error = RandomizedRestart.solve_within(&ctx, &mut budget).unwrap_err();
        assert_eq!(
            error,
            RoutingError::Exhausted {
                nodes_explored: 1,
                budget_expired: true
            }
        );
    }
}
