//! Uniform entry point over every routing strategy.

use pipe_grid::GridEnvironment;
use pipe_types::{Algorithm, PipeSpec, RouterConfig, RoutingError};
use tracing::info;

use crate::budget::SearchBudget;
use crate::context::RoutingContext;
use crate::fix_order::FixOrder;
use crate::hill_climb::HillClimbing;
use crate::one_dive::OneDive;
use crate::pbs::Pbs;
use crate::restart::RandomizedRestart;
use crate::solution::Solution;

/// A multi-pipe routing strategy.
pub trait Strategy {
    /// The algorithm this strategy implements.
    fn algorithm(&self) -> Algorithm;

    /// Solves the instance, charging work to an existing budget.
    ///
    /// # Errors
    ///
    /// [`RoutingError::Exhausted`] when no acceptable solution was found,
    /// plus any strategy-specific failure.
    fn solve_within(
        &self,
        ctx: &RoutingContext<'_>,
        budget: &mut SearchBudget,
    ) -> Result<Solution, RoutingError>;

    /// Solves the instance under the configured search budget.
    ///
    /// # Errors
    ///
    /// See [`Strategy::solve_within`].
    fn solve(&self, ctx: &RoutingContext<'_>) -> Result<Solution, RoutingError> {
        let mut budget = SearchBudget::new(ctx.config().search());
        self.solve_within(ctx, &mut budget)
    }
}

/// Returns the strategy for an algorithm with its default settings.
#[must_use]
pub fn strategy_for(algorithm: Algorithm) -> Box<dyn Strategy> {
    match algorithm {
        Algorithm::Pbs => Box::new(Pbs::new()),
        Algorithm::PbsMp => Box::new(Pbs::with_drops()),
        Algorithm::FixOrder => Box::new(FixOrder::new()),
        Algorithm::OneDive => Box::new(OneDive::new()),
        Algorithm::RandomizedRestart => Box::new(RandomizedRestart),
        Algorithm::HillClimbing => Box::new(HillClimbing),
    }
}

/// Routes `pipes` through `env` with the algorithm selected in `config`.
///
/// # Errors
///
/// - [`RoutingError::InvalidConfig`] or [`RoutingError::InvalidInstance`]
///   for malformed input
/// - [`RoutingError::Grid`] if a start or goal is out of bounds or blocked
/// - [`RoutingError::Exhausted`] if no acceptable solution was found
/// - [`RoutingError::NoPathFound`] when FixOrder hits an infeasible pipe
///
/// # Example
///
/// ```
/// use pipe_pbs::{SolveStatus, solve};
/// use pipe_types::{Algorithm, PipeId, PipeSpec, RouterConfig};
/// use pipe_grid::{Cell, GridBounds, GridEnvironment};
///
/// let env = GridEnvironment::new(GridBounds::from_size(6, 6, 3).unwrap());
/// let pipes = vec![
///     PipeSpec::new(PipeId::new(0), Cell::new(0, 3, 0), Cell::new(5, 3, 0)),
///     PipeSpec::new(PipeId::new(1), Cell::new(3, 0, 0), Cell::new(3, 5, 0)),
/// ];
///
/// for algorithm in Algorithm::ALL {
///     let solution = solve(&env, &pipes, &RouterConfig::new(algorithm)).unwrap();
///     assert_eq!(solution.algorithm(), algorithm);
///     assert_eq!(solution.status(), SolveStatus::Complete);
///     assert_eq!(solution.routed().count(), 2);
/// }
/// ```
pub fn solve(
    env: &GridEnvironment,
    pipes: &[PipeSpec],
    config: &RouterConfig,
) -> Result<Solution, RoutingError> {
    let ctx = RoutingContext::new(env, pipes, config)?;
    let algorithm = config.algorithm();
    info!(
        %algorithm,
        pipes = pipes.len(),
        seed = config.seed(),
        "routing started"
    );

    let result = strategy_for(algorithm).solve(&ctx);
    match &result {
        Ok(solution) => info!(
            %algorithm,
            nodes = solution.nodes_explored(),
            status = ?solution.status(),
            cost = solution.cost().total(),
            dropped = solution.cost().dropped(),
            elapsed = ?solution.elapsed(),
            "routing finished"
        ),
        Err(error) => info!(%algorithm, %error, "routing failed"),
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_for_matches_algorithm() {
        for algorithm in Algorithm::ALL {
            assert_eq!(strategy_for(algorithm).algorithm(), algorithm);
        }
    }
}
