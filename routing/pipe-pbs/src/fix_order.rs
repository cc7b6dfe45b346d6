//! FixOrder: plan every pipe once, in one total order.

use std::cmp::Reverse;

use pipe_types::{Algorithm, PipeId, RoutingError};
use tracing::debug;

use crate::budget::SearchBudget;
use crate::context::{Assigned, Assignment, RoutingContext};
use crate::node::SearchNode;
use crate::priority::PriorityGraph;
use crate::solution::{Solution, SolveStatus};
use crate::strategy::Strategy;

/// Plans pipes one after another, each avoiding all earlier ones.
///
/// There is no branching: the first infeasible pipe fails the run.
///
/// # Example
///
/// ```
/// use pipe_pbs::{FixOrder, RoutingContext, Strategy};
/// use pipe_types::{PipeId, PipeSpec, RouterConfig, RoutingError};
/// use pipe_grid::{Cell, GridBounds, GridEnvironment};
///
/// let env = GridEnvironment::new(GridBounds::from_size(5, 5, 1).unwrap());
/// let pipes = vec![
///     PipeSpec::new(PipeId::new(0), Cell::new(0, 2, 0), Cell::new(4, 2, 0)),
///     PipeSpec::new(PipeId::new(1), Cell::new(2, 0, 0), Cell::new(2, 1, 0)),
/// ];
/// let config = RouterConfig::default();
/// let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();
///
/// let order = vec![PipeId::new(0), PipeId::new(1)];
/// let solution = FixOrder::with_order(order).solve(&ctx).unwrap();
/// assert_eq!(solution.cost().totals().length(), 5);
///
/// // an order must list every pipe once
/// let partial = FixOrder::with_order(vec![PipeId::new(1)]);
/// assert!(matches!(partial.solve(&ctx), Err(RoutingError::InvalidInstance(_))));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixOrder {
    order: Option<Vec<PipeId>>,
}

impl FixOrder {
    /// Uses [`FixOrder::default_order`].
    #[must_use]
    pub const fn new() -> Self {
        Self { order: None }
    }

    /// Uses the given total order, highest priority first.
    #[must_use]
    pub fn with_order(order: Vec<PipeId>) -> Self {
        Self { order: Some(order) }
    }

    /// Longest and bulkiest pipes first.
    ///
    /// Pipes are sorted by descending Manhattan distance times
    /// `1 + clearance radius`, ties by identifier.
    #[must_use]
    pub fn default_order(ctx: &RoutingContext<'_>) -> Vec<PipeId> {
        let mut order: Vec<PipeId> = ctx.pipe_ids().collect();
        order.sort_by_key(|id| {
            let estimate = ctx.pipe(*id).map_or(0, |spec| {
                u64::from(spec.manhattan_length()) * (1 + u64::from(ctx.radius(spec)))
            });
            (Reverse(estimate), *id)
        });
        order
    }

    /// Returns the order this strategy will use.
    #[must_use]
    pub fn order(&self, ctx: &RoutingContext<'_>) -> Vec<PipeId> {
        self.order
            .clone()
            .unwrap_or_else(|| Self::default_order(ctx))
    }
}

impl Strategy for FixOrder {
    fn algorithm(&self) -> Algorithm {
        Algorithm::FixOrder
    }

    fn solve_within(
        &self,
        ctx: &RoutingContext<'_>,
        budget: &mut SearchBudget,
    ) -> Result<Solution, RoutingError> {
        if let Some(trivial) = ctx.trivial_solution(self.algorithm(), budget) {
            return Ok(trivial);
        }
        let order = self.order(ctx);
        let (priorities, assignment) = route_in_order(ctx, &order, budget)?.into_parts();
        Ok(ctx.solution(
            self.algorithm(),
            &assignment,
            priorities,
            budget,
            SolveStatus::Complete,
        ))
    }
}

/// Plans `order` front to back; the result is conflict-free by construction.
pub(crate) fn route_in_order(
    ctx: &RoutingContext<'_>,
    order: &[PipeId],
    budget: &mut SearchBudget,
) -> Result<SearchNode, RoutingError> {
    if !ctx.is_permutation(order) {
        return Err(RoutingError::invalid_instance(
            "a fixed order must list every pipe exactly once",
        ));
    }
    if budget.expired() {
        return Err(RoutingError::Exhausted {
            nodes_explored: budget.nodes(),
            budget_expired: true,
        });
    }
    budget.charge_node();

    let mut assignment = Assignment::new();
    for (position, &pipe) in order.iter().enumerate() {
        if budget.timed_out() {
            return Err(RoutingError::Exhausted {
                nodes_explored: budget.nodes(),
                budget_expired: true,
            });
        }
        let path = ctx
            .plan_against(pipe, order[..position].iter().copied(), &assignment)
            .inspect_err(|e| debug!(%pipe, position, error = %e, "fixed order failed"))?;
        assignment.insert(pipe, Assigned::routed(path));
    }

    Ok(SearchNode::evaluate(
        ctx,
        PriorityGraph::from_total_order(order),
        assignment,
        order.len(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pipe_grid::{Cell, GridBounds, GridEnvironment};
    use pipe_types::{ClearanceTable, DiameterClass, PipeSpec, RouterConfig};

    #[test]
    fn test_default_order_prefers_long_and_wide() {
        let env = GridEnvironment::new(GridBounds::from_size(10, 10, 1).unwrap());
        let pipes = vec![
            PipeSpec::new(PipeId::new(0), Cell::new(0, 0, 0), Cell::new(3, 0, 0)),
            PipeSpec::new(PipeId::new(1), Cell::new(0, 2, 0), Cell::new(9, 2, 0)),
            PipeSpec::new(PipeId::new(2), Cell::new(0, 5, 0), Cell::new(4, 5, 0))
                .with_class(DiameterClass::new(1)),
            PipeSpec::new(PipeId::new(3), Cell::new(0, 8, 0), Cell::new(3, 8, 0)),
        ];
        let config = RouterConfig::default()
            .with_clearance(ClearanceTable::new().with_radius(DiameterClass::new(1), 1));
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        // estimates: 3, 9, 4 * 2 = 8, 3
        let order = FixOrder::default_order(&ctx);
        assert_eq!(
            order,
            vec![PipeId::new(1), PipeId::new(2), PipeId::new(0), PipeId::new(3)]
        );
    }

    #[test]
    fn test_infeasible_pipe_fails_run() {
        let env = GridEnvironment::new(GridBounds::from_size(5, 5, 1).unwrap());
        let pipes = vec![
            PipeSpec::new(PipeId::new(0), Cell::new(0, 2, 0), Cell::new(4, 2, 0)),
            PipeSpec::new(PipeId::new(1), Cell::new(2, 0, 0), Cell::new(2, 4, 0)),
        ];
        let config = RouterConfig::new(Algorithm::FixOrder);
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        let error = FixOrder::new().solve(&ctx).unwrap_err();
        assert!(matches!(error, RoutingError::NoPathFound { .. }));
    }

    #[test]
    fn test_duplicate_in_order_rejected() {
        let env = GridEnvironment::new(GridBounds::from_size(5, 5, 1).unwrap());
        let pipes = vec![
            PipeSpec::new(PipeId::new(0), Cell::new(0, 0, 0), Cell::new(4, 0, 0)),
            PipeSpec::new(PipeId::new(1), Cell::new(0, 4, 0), Cell::new(4, 4, 0)),
        ];
        let config = RouterConfig::new(Algorithm::FixOrder);
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        let order = vec![PipeId::new(0), PipeId::new(0)];
        let result = FixOrder::with_order(order).solve(&ctx);
        assert!(matches!(result, Err(RoutingError::InvalidInstance(_))));
    }

    #[test]
    fn test_counts_one_node() {
        let env = GridEnvironment::new(GridBounds::from_size(5, 5, 1).unwrap());
        let pipes = vec![
            PipeSpec::new(PipeId::new(0), Cell::new(0, 0, 0), Cell::new(4, 0, 0)),
            PipeSpec::new(PipeId::new(1), Cell::new(0, 4, 0), Cell::new(4, 4, 0)),
        ];
        let config = RouterConfig::new(Algorithm::FixOrder);
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        let solution = FixOrder::new().solve(&ctx).unwrap();
        assert_eq!(solution.nodes_explored(), 1);
        assert_eq!(solution.priorities().edge_count(), 1);
        assert_eq!(solution.cost().totals().length(), 8);
    }
}
