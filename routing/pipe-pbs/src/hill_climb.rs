//! Hill climbing over the priority order of an existing solution.
//!
//! The order is a total order: the topological order of the starting
//! solution's priority graph. Each iteration proposes a swap of two pipes
//! or a move of one pipe to another position, replans what the move can
//! affect, and keeps the result only if it is conflict-free and strictly
//! cheaper. Pipes ahead of the first changed position keep their paths;
//! later pipes are replanned when their set of higher pipes changed or one
//! of those pipes got a new path.

use pipe_types::{Algorithm, PipeId, RoutingError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::budget::SearchBudget;
use crate::context::{Assigned, Assignment, RoutingContext};
use crate::fix_order::FixOrder;
use crate::priority::PriorityGraph;
use crate::restart::RandomizedRestart;
use crate::solution::{PipeOutcome, Quality, Solution, SolveStatus};
use crate::strategy::Strategy;

/// A local change of the priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Swap(usize, usize),
    Shift { from: usize, to: usize },
}

impl Move {
    fn random(rng: &mut ChaCha8Rng, len: usize) -> Self {
        let i = rng.gen_range(0..len);
        let mut j = rng.gen_range(0..len - 1);
        if j >= i {
            j += 1;
        }
        if rng.gen_bool(0.5) {
            Self::Swap(i, j)
        } else {
            Self::Shift { from: i, to: j }
        }
    }

    /// Applies the move and returns the range of positions it touched.
    fn apply(self, order: &mut Vec<PipeId>) -> (usize, usize) {
        match self {
            Self::Swap(i, j) => {
                order.swap(i, j);
                (i.min(j), i.max(j))
            }
            Self::Shift { from, to } => {
                let pipe = order.remove(from);
                order.insert(to, pipe);
                (from.min(to), from.max(to))
            }
        }
    }
}

/// Outcome of a hill-climbing run.
#[derive(Debug, Clone)]
pub struct HillClimbReport {
    solution: Solution,
    history: Vec<Quality>,
    iterations: usize,
}

impl HillClimbReport {
    /// The best solution found.
    #[must_use]
    pub const fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Consumes the report, returning the solution.
    #[must_use]
    pub fn into_solution(self) -> Solution {
        self.solution
    }

    /// Quality of the start and of every accepted move, in order.
    #[must_use]
    pub fn history(&self) -> &[Quality] {
        &self.history
    }

    /// Number of accepted moves.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.history.len().saturating_sub(1)
    }

    /// Number of proposed moves.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }
}

/// Local search over the priority order.
///
/// As a [`Strategy`] it starts from FixOrder, falling back to randomized
/// restarts when FixOrder fails.
///
/// # Example
///
/// ```
/// use pipe_pbs::{FixOrder, HillClimbing, RoutingContext, SearchBudget, Strategy};
/// use pipe_types::{Algorithm, PipeId, PipeSpec, RouterConfig};
/// use pipe_grid::{Cell, GridBounds, GridEnvironment};
///
/// let env = GridEnvironment::new(GridBounds::from_size(6, 6, 3).unwrap());
/// let pipes = vec![
///     PipeSpec::new(PipeId::new(0), Cell::new(0, 1, 0), Cell::new(5, 1, 0)),
///     PipeSpec::new(PipeId::new(1), Cell::new(3, 0, 0), Cell::new(3, 5, 0)),
/// ];
/// let config = RouterConfig::new(Algorithm::HillClimbing).with_seed(3);
/// let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();
///
/// let start = FixOrder::new().solve(&ctx).unwrap();
/// let mut budget = SearchBudget::new(config.search());
/// let report = HillClimbing.improve(&ctx, &start, &mut budget).unwrap();
///
/// assert!(report.solution().quality() <= start.quality());
/// assert!(report.history().windows(2).all(|w| w[1] < w[0]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HillClimbing;

impl HillClimbing {
    /// Improves `initial` until the stale or iteration limit or the budget
    /// stops the search.
    ///
    /// # Errors
    ///
    /// [`RoutingError::InvalidInstance`] if `initial` has dropped pipes or
    /// does not cover every pipe of the context.
    pub fn improve(
        &self,
        ctx: &RoutingContext<'_>,
        initial: &Solution,
        budget: &mut SearchBudget,
    ) -> Result<HillClimbReport, RoutingError> {
        let mut order = initial.priorities().topological_order();
        if !ctx.is_permutation(&order) {
            return Err(RoutingError::invalid_instance(
                "the starting solution does not order every pipe",
            ));
        }
        let mut current = Assignment::new();
        for (pipe, outcome) in initial.outcomes() {
            match outcome {
                PipeOutcome::Routed(path) => {
                    current.insert(*pipe, Assigned::routed(path.clone()));
                }
                PipeOutcome::Dropped => {
                    return Err(RoutingError::invalid_instance(format!(
                        "cannot reorder a solution that dropped {pipe}"
                    )));
                }
            }
        }

        let settings = ctx.config().hill_climb();
        let mut rng = ChaCha8Rng::seed_from_u64(ctx.config().seed());
        let mut quality = ctx.quality(&current);
        let mut history = vec![quality];
        let mut stale = 0;
        let mut iterations = 0;
        let mut stopped = false;

        while order.len() > 1
            && stale < settings.max_stale_iterations()
            && settings.max_iterations().is_none_or(|max| iterations < max)
        {
            if budget.expired() {
                stopped = true;
                break;
            }
            iterations += 1;
            budget.charge_node();

            let mut candidate = order.clone();
            let mv = Move::random(&mut rng, order.len());
            let (lo, hi) = mv.apply(&mut candidate);

            let next = match replan(ctx, &candidate, lo, hi, &current, budget)? {
                Some(next) => next,
                None if budget.timed_out() => {
                    stopped = true;
                    break;
                }
                None => {
                    stale += 1;
                    continue;
                }
            };

            let next_quality = ctx.quality(&next);
            if next_quality < quality && ctx.conflicts(&next).is_empty() {
                debug!(
                    ?mv,
                    from = quality.cost(),
                    to = next_quality.cost(),
                    iterations,
                    "accepted move"
                );
                order = candidate;
                current = next;
                quality = next_quality;
                history.push(quality);
                stale = 0;
            } else {
                stale += 1;
            }
        }

        let status = if stopped {
            SolveStatus::TimeoutPartial
        } else {
            SolveStatus::Complete
        };
        let solution = ctx.solution(
            Algorithm::HillClimbing,
            &current,
            PriorityGraph::from_total_order(&order),
            budget,
            status,
        );
        Ok(HillClimbReport {
            solution,
            history,
            iterations,
        })
    }
}

/// Replans `order` from position `lo` on. `None` rejects the move.
fn replan(
    ctx: &RoutingContext<'_>,
    order: &[PipeId],
    lo: usize,
    hi: usize,
    current: &Assignment,
    budget: &SearchBudget,
) -> Result<Option<Assignment>, RoutingError> {
    let mut next = current.clone();
    let mut changed = false;
    for (position, &pipe) in order.iter().enumerate().skip(lo) {
        if position > hi && !changed {
            continue;
        }
        if budget.timed_out() {
            return Ok(None);
        }
        match ctx.plan_against(pipe, order[..position].iter().copied(), &next) {
            Ok(path) => {
                let moved = current
                    .get(&pipe)
                    .and_then(Assigned::path)
                    .is_none_or(|old| old.path() != path.path());
                changed |= moved;
                next.insert(pipe, Assigned::routed(path));
            }
            Err(e) if e.is_infeasible() => return Ok(None),
            Err(e) => return Err(e),
        }
    }
    Ok(Some(next))
}

impl Strategy for HillClimbing {
    fn algorithm(&self) -> Algorithm {
        Algorithm::HillClimbing
    }

    fn solve_within(
        &self,
        ctx: &RoutingContext<'_>,
        budget: &mut SearchBudget,
    ) -> Result<Solution, RoutingError> {
        if let Some(trivial) = ctx.trivial_solution(self.algorithm(), budget) {
            return Ok(trivial);
        }
        let initial = match FixOrder::new().solve_within(ctx, budget) {
            Ok(solution) => solution,
            Err(e) if e.is_recoverable() || e.is_exhausted() => {
                debug!(error = %e, "fixed order failed, restarting randomly");
                RandomizedRestart.solve_within(ctx, budget)?
            }
            Err(e) => return Err(e),
        };
        Ok(self.improve(ctx, &initial, budget)?.into_solution())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pipe_grid::{Cell, GridBounds, GridEnvironment};
    use pipe_types::{HillClimbConfig, PipeSpec, RouterConfig};

    #[test]
    fn test_moves_touch_expected_range() {
        let ids: Vec<PipeId> = (0..5).map(PipeId::new).collect();

        let mut order = ids.clone();
        assert_eq!(Move::Swap(3, 1).apply(&mut order), (1, 3));
        assert_eq!(order[1], ids[3]);
        assert_eq!(order[3], ids[1]);

        let mut order = ids.clone();
        assert_eq!(Move::Shift { from: 4, to: 0 }.apply(&mut order), (0, 4));
        assert_eq!(order[0], ids[4]);
        assert_eq!(order[1], ids[0]);
    }

    #[test]
    fn test_random_moves_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            let (a, b) = match Move::random(&mut rng, 3) {
                Move::Swap(i, j) => (i, j),
                Move::Shift { from, to } => (from, to),
            };
            assert!(a < 3 && b < 3 && a != b);
        }
    }

    #[test]
    fn test_single_pipe_has_nothing_to_do() {
        let env = GridEnvironment::new(GridBounds::from_size(4, 4, 1).unwrap());
        let pipes = vec![PipeSpec::new(
            PipeId::new(0),
            Cell::new(0, 0, 0),
            Cell::new(3, 3, 0),
        )];
        let config = RouterConfig::new(Algorithm::HillClimbing);
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        let start = FixOrder::new().solve(&ctx).unwrap();
        let mut budget = SearchBudget::unlimited();
        let report = HillClimbing.improve(&ctx, &start, &mut budget).unwrap();
        assert_eq!(report.iterations(), 0);
        assert_eq!(report.accepted(), 0);
        assert_eq!(report.solution().outcomes(), start.outcomes());
    }

    #[test]
    fn test_stale_limit_stops() {
        let env = GridEnvironment::new(GridBounds::from_size(6, 6, 3).unwrap());
        let pipes = vec![
            PipeSpec::new(PipeId::new(0), Cell::new(0, 1, 0), Cell::new(5, 1, 0)),
            PipeSpec::new(PipeId::new(1), Cell::new(3, 0, 0), Cell::new(3, 5, 0)),
            PipeSpec::new(PipeId::new(2), Cell::new(0, 4, 0), Cell::new(5, 4, 0)),
        ];
        let config = RouterConfig::new(Algorithm::HillClimbing).with_hill_climb(
            HillClimbConfig::new()
                .with_max_stale_iterations(5)
                .with_max_iterations(None),
        );
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        let start = FixOrder::new().solve(&ctx).unwrap();
        let mut budget = SearchBudget::unlimited();
        let report = HillClimbing.improve(&ctx, &start, &mut budget).unwrap();
        assert!(report.iterations() >= 5);
        assert!(report.solution().quality() <= start.quality());
        assert_eq!(report.history()[0], start.quality());
    }

    #[test]
    fn test_rejects_dropped_start() {
        let env = GridEnvironment::new(GridBounds::from_size(3, 1, 1).unwrap())
            .with_blocked([Cell::new(1, 0, 0)]);
        let pipes = vec![
            PipeSpec::new(PipeId::new(0), Cell::new(0, 0, 0), Cell::new(2, 0, 0)),
            PipeSpec::new(PipeId::new(1), Cell::new(0, 0, 0), Cell::new(0, 0, 0)),
        ];
        let config = RouterConfig::new(Algorithm::PbsMp);
        let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();

        let start = crate::pbs::Pbs::with_drops().solve(&ctx).unwrap();
        assert_eq!(start.dropped(), vec![PipeId::new(0)]);
        let mut budget = SearchBudget::unlimited();
        let result = HillClimbing.improve(&ctx, &start, &mut budget);
        assert!(matches!(result, Err(RoutingError::InvalidInstance(_))));
    }
}
