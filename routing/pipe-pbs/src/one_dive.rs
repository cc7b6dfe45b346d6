//! OneDive: a single greedy walk down the priority tree.

use std::collections::BTreeMap;

use pipe_types::{Algorithm, PipeId, RoutingError};

use crate::budget::SearchBudget;
use crate::context::RoutingContext;
use crate::node::SearchNode;
use crate::pbs::Engine;
use crate::solution::{Solution, SolveStatus};
use crate::strategy::Strategy;

/// Resolves each conflict with one fixed choice and never backtracks.
///
/// Of the two conflicting pipes, the one ranked first gets priority. The
/// default ranking is by pipe identifier.
///
/// # Example
///
/// ```
/// use pipe_pbs::{OneDive, RoutingContext, Strategy};
/// use pipe_types::{PipeId, PipeSpec, RouterConfig};
/// use pipe_grid::{Cell, GridBounds, GridEnvironment};
///
/// let env = GridEnvironment::new(GridBounds::from_size(5, 5, 2).unwrap());
/// let pipes = vec![
///     PipeSpec::new(PipeId::new(0), Cell::new(0, 2, 0), Cell::new(4, 2, 0)),
///     PipeSpec::new(PipeId::new(1), Cell::new(2, 0, 0), Cell::new(2, 4, 0)),
/// ];
/// let config = RouterConfig::default();
/// let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();
///
/// let solution = OneDive::new().solve(&ctx).unwrap();
/// // pipe 0 ranks first and keeps its straight path
/// assert_eq!(solution.path(PipeId::new(0)).unwrap().path().moves(), 4);
/// assert_eq!(solution.nodes_explored(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OneDive {
    ranks: Option<Vec<PipeId>>,
}

impl OneDive {
    /// Ranks pipes by identifier.
    #[must_use]
    pub const fn new() -> Self {
        Self { ranks: None }
    }

    /// Ranks pipes by their position in `order`.
    #[must_use]
    pub fn with_ranks(order: Vec<PipeId>) -> Self {
        Self { ranks: Some(order) }
    }

    pub(crate) fn run(
        &self,
        ctx: &RoutingContext<'_>,
        budget: &mut SearchBudget,
    ) -> Result<SearchNode, RoutingError> {
        let ranks: BTreeMap<PipeId, usize> = self
            .ranks
            .iter()
            .flatten()
            .enumerate()
            .map(|(rank, pipe)| (*pipe, rank))
            .collect();
        Engine::new(ctx, budget, false).dive(&ranks)
    }
}

impl Strategy for OneDive {
    fn algorithm(&self) -> Algorithm {
        Algorithm::OneDive
    }

    fn solve_within(
        &self,
        ctx: &RoutingContext<'_>,
        budget: &mut SearchBudget,
    ) -> Result<Solution, RoutingError> {
        if let Some(trivial) = ctx.trivial_solution(self.algorithm(), budget) {
            return Ok(trivial);
        }
        let (priorities, assignment) = self.run(ctx, budget)?.into_parts();
        Ok(ctx.solution(
            self.algorithm(),
            &assignment,
            priorities,
            budget,
            SolveStatus::Complete,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pipe_grid::{Cell, GridBounds, GridEnvironment};
    use pipe_types::{PipeSpec, RouterConfig};

    #[test]
    fn test_ranks_decide_priority() {
        let env = GridEnvironment::new(GridBounds::from_size(5, 5, 2).unwrap());
        let pipes = vec![
            PipeSpec::new(PipeId::new(0), Cell::new(0, 2, 0), Cell::new(4, 2, 0)),
            PipeSpec::new(PipeId::new(1), Cell::new(2, 0, 0), Cell::new(2, 4, 0)),
        ];
        let config = RouterConfig::new(Algorithm::OneDive);
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        let solution = OneDive::with_ranks(vec![PipeId::new(1), PipeId::new(0)])
            .solve(&ctx)
            .unwrap();
        assert!(
            solution
                .priorities()
                .contains_edge(PipeId::new(1), PipeId::new(0))
        );
        assert_eq!(solution.path(PipeId::new(1)).unwrap().path().moves(), 4);
        assert!(solution.path(PipeId::new(0)).unwrap().path().moves() > 4);
    }

    #[test]
    fn test_dead_end_is_exhausted() {
        // flat grid: the lower pipe cannot get past the higher one
        let env = GridEnvironment::new(GridBounds::from_size(5, 5, 1).unwrap());
        let pipes = vec![
            PipeSpec::new(PipeId::new(0), Cell::new(0, 2, 0), Cell::new(4, 2, 0)),
            PipeSpec::new(PipeId::new(1), Cell::new(2, 0, 0), Cell::new(2, 4, 0)),
        ];
        let config = RouterConfig::new(Algorithm::OneDive);
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        assert_eq!(
            OneDive::new().solve(&ctx).unwrap_err(),
            RoutingError::Exhausted {
                nodes_explored: 2,
                budget_expired: false
            }
        );
    }
}
