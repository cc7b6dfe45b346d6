//! Shared, read-only state of one routing run.
//!
//! A [`RoutingContext`] bundles the environment, the pipes, the planner and
//! the configuration. Every strategy reads it; none mutates it, so it can be
//! shared across rayon workers without locking.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use pipe_grid::GridEnvironment;
use pipe_pathfind::{ObstacleSet, PipePlanner};
use pipe_types::{
    Algorithm, CellPath, ClearanceTable, PipeId, PipePath, PipeSpec, RouterConfig, RoutingError,
};
use rayon::prelude::*;

use crate::budget::SearchBudget;
use crate::conflict::{Conflict, find_conflicts};
use crate::priority::PriorityGraph;
use crate::solution::{PipeOutcome, Quality, Solution, SolutionCost, SolveStatus};

/// Per-pipe state inside a search node.
///
/// Paths are reference counted so sibling nodes share the paths they did
/// not replan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Assigned {
    Routed(Arc<PipePath>),
    Dropped,
}

impl Assigned {
    pub(crate) fn routed(path: PipePath) -> Self {
        Self::Routed(Arc::new(path))
    }

    pub(crate) fn path(&self) -> Option<&PipePath> {
        match self {
            Self::Routed(path) => Some(path),
            Self::Dropped => None,
        }
    }
}

pub(crate) type Assignment = BTreeMap<PipeId, Assigned>;

/// Validated problem instance plus everything needed to plan it.
///
/// # Example
///
/// ```
/// use pipe_pbs::RoutingContext;
/// use pipe_types::{PipeId, PipeSpec, RouterConfig, RoutingError};
/// use pipe_grid::{Cell, GridBounds, GridEnvironment};
///
/// let env = GridEnvironment::new(GridBounds::from_size(4, 4, 1).unwrap());
/// let config = RouterConfig::default();
///
/// let pipes = vec![PipeSpec::new(PipeId::new(0), Cell::new(0, 0, 0), Cell::new(3, 3, 0))];
/// let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();
/// assert_eq!(ctx.len(), 1);
///
/// // two pipes may not share an identifier
/// let twice = vec![pipes[0].clone(), pipes[0].clone()];
/// assert!(matches!(
///     RoutingContext::new(&env, &twice, &config),
///     Err(RoutingError::InvalidInstance(_))
/// ));
/// ```
#[derive(Debug)]
pub struct RoutingContext<'a> {
    env: &'a GridEnvironment,
    config: &'a RouterConfig,
    planner: PipePlanner<'a>,
    pipes: BTreeMap<PipeId, &'a PipeSpec>,
    drop_penalty: u64,
}

impl<'a> RoutingContext<'a> {
    /// Validates the configuration and the instance.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::InvalidConfig`] if the configuration does not validate
    /// - [`RoutingError::InvalidInstance`] for duplicate pipe identifiers or
    ///   a diameter class missing from the clearance table
    /// - [`RoutingError::Grid`] if a start or goal is out of bounds or blocked
    pub fn new(
        env: &'a GridEnvironment,
        pipes: &'a [PipeSpec],
        config: &'a RouterConfig,
    ) -> Result<Self, RoutingError> {
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(RoutingError::invalid_config(issues.join("; ")));
        }

        let mut by_id = BTreeMap::new();
        for pipe in pipes {
            if by_id.insert(pipe.id(), pipe).is_some() {
                return Err(RoutingError::invalid_instance(format!(
                    "duplicate pipe id {}",
                    pipe.id()
                )));
            }
            env.check_endpoint(pipe.start())?;
            env.check_endpoint(pipe.goal())?;
            if config.clearance().radius(pipe.class()).is_none() {
                return Err(RoutingError::invalid_instance(format!(
                    "pipe {} has {} which has no clearance radius",
                    pipe.id(),
                    pipe.class()
                )));
            }
        }

        Ok(Self {
            env,
            config,
            planner: PipePlanner::new(env, config.planner().clone()),
            pipes: by_id,
            drop_penalty: config.drop_config().fixed_penalty(),
        })
    }

    /// Returns the environment.
    #[must_use]
    pub const fn env(&self) -> &'a GridEnvironment {
        self.env
    }

    /// Returns the run configuration.
    #[must_use]
    pub const fn config(&self) -> &'a RouterConfig {
        self.config
    }

    /// Returns the single-pipe planner.
    #[must_use]
    pub const fn planner(&self) -> &PipePlanner<'a> {
        &self.planner
    }

    /// Returns the clearance table.
    #[must_use]
    pub const fn clearance(&self) -> &'a ClearanceTable {
        self.config.clearance()
    }

    /// Returns a pipe by identifier.
    #[must_use]
    pub fn pipe(&self, id: PipeId) -> Option<&'a PipeSpec> {
        self.pipes.get(&id).copied()
    }

    /// Iterates over pipe identifiers in ascending order.
    pub fn pipe_ids(&self) -> impl Iterator<Item = PipeId> + '_ {
        self.pipes.keys().copied()
    }

    /// Returns the number of pipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    /// Returns `true` if there are no pipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    /// Returns `true` if `order` lists every pipe exactly once.
    #[must_use]
    pub fn is_permutation(&self, order: &[PipeId]) -> bool {
        let listed: BTreeSet<PipeId> = order.iter().copied().collect();
        order.len() == self.pipes.len()
            && listed.len() == order.len()
            && listed.iter().all(|id| self.pipes.contains_key(id))
    }

    fn spec(&self, id: PipeId) -> Result<&'a PipeSpec, RoutingError> {
        self.pipe(id)
            .ok_or_else(|| RoutingError::invalid_instance(format!("unknown pipe {id}")))
    }

    /// Clearance radius of a pipe; unknown classes were rejected in `new`.
    pub(crate) fn radius(&self, pipe: &PipeSpec) -> u32 {
        self.clearance().radius(pipe.class()).unwrap_or(0)
    }

    fn separation(&self, a: &PipeSpec, b: &PipeSpec) -> u32 {
        self.clearance()
            .separation(a.class(), b.class())
            .unwrap_or(0)
    }

    /// Obstacles `pipe` must avoid: the routed paths of `higher`, each
    /// expanded by the separation between the two pipes.
    pub(crate) fn obstacles_for<I>(
        &self,
        pipe: PipeId,
        higher: I,
        assignment: &Assignment,
    ) -> Result<ObstacleSet, RoutingError>
    where
        I: IntoIterator<Item = PipeId>,
    {
        let spec = self.spec(pipe)?;
        let mut obstacles = ObstacleSet::new();
        for other in higher {
            let Some(path) = assignment.get(&other).and_then(Assigned::path) else {
                continue;
            };
            let separation = self.separation(spec, self.spec(other)?);
            obstacles.add_path(path.path(), separation);
        }
        Ok(obstacles)
    }

    /// Plans `pipe` around the routed paths of `higher`.
    pub(crate) fn plan_against<I>(
        &self,
        pipe: PipeId,
        higher: I,
        assignment: &Assignment,
    ) -> Result<PipePath, RoutingError>
    where
        I: IntoIterator<Item = PipeId>,
    {
        let obstacles = self.obstacles_for(pipe, higher, assignment)?;
        self.planner.plan(self.spec(pipe)?, &obstacles)
    }

    /// Returns `true` if `path` breaks clearance with any routed pipe in
    /// `higher`.
    pub(crate) fn violates_higher<'h, I>(
        &self,
        pipe: PipeId,
        path: &CellPath,
        higher: I,
        assignment: &Assignment,
    ) -> Result<bool, RoutingError>
    where
        I: IntoIterator<Item = &'h PipeId>,
    {
        let spec = self.spec(pipe)?;
        for other in higher {
            let Some(theirs) = assignment.get(other).and_then(Assigned::path) else {
                continue;
            };
            let separation = self.separation(spec, self.spec(*other)?);
            let clash = path.iter().any(|a| {
                theirs
                    .path()
                    .iter()
                    .any(|b| ClearanceTable::violates(*a, *b, separation))
            });
            if clash {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Plans each pipe with no obstacles from other pipes, in parallel.
    ///
    /// Results come back in the order of `pipes`. A pipe whose turn comes
    /// after the deadline is skipped and reported as `None`.
    pub(crate) fn plan_independent(
        &self,
        pipes: &[PipeId],
        budget: &SearchBudget,
    ) -> Vec<(PipeId, Option<Result<PipePath, RoutingError>>)> {
        let empty = ObstacleSet::new();
        pipes
            .par_iter()
            .map(|&id| {
                if budget.timed_out() {
                    return (id, None);
                }
                let result = self
                    .spec(id)
                    .and_then(|spec| self.planner.plan(spec, &empty));
                (id, Some(result))
            })
            .collect()
    }

    /// Conflicts among the routed pipes of an assignment.
    pub(crate) fn conflicts(&self, assignment: &Assignment) -> Vec<Conflict> {
        let routed = assignment.iter().filter_map(|(id, assigned)| {
            let spec = self.pipe(*id)?;
            Some((spec, assigned.path()?.path()))
        });
        find_conflicts(routed, self.clearance())
    }

    /// Cost of one routed path in milli-units.
    pub(crate) fn path_cost(&self, path: &PipePath) -> u64 {
        path.cost().fixed(self.planner.fixed_weights())
    }

    /// Ranking key of an assignment.
    pub(crate) fn quality(&self, assignment: &Assignment) -> Quality {
        let mut dropped = 0usize;
        let mut cost = 0u64;
        for assigned in assignment.values() {
            match assigned {
                Assigned::Routed(path) => cost = cost.saturating_add(self.path_cost(path)),
                Assigned::Dropped => {
                    dropped += 1;
                    cost = cost.saturating_add(self.drop_penalty);
                }
            }
        }
        Quality::new(dropped, cost)
    }

    /// Builds the public result of a finished run.
    pub(crate) fn solution(
        &self,
        algorithm: Algorithm,
        assignment: &Assignment,
        priorities: PriorityGraph,
        budget: &SearchBudget,
        status: SolveStatus,
    ) -> Solution {
        let outcomes: BTreeMap<PipeId, PipeOutcome> = assignment
            .iter()
            .map(|(id, assigned)| {
                let outcome = match assigned {
                    Assigned::Routed(path) => PipeOutcome::Routed(PipePath::clone(path)),
                    Assigned::Dropped => PipeOutcome::Dropped,
                };
                (*id, outcome)
            })
            .collect();
        let cost = SolutionCost::from_outcomes(
            &outcomes,
            self.config.weights(),
            self.config.drop_config().drop_penalty(),
        );
        Solution::new(
            algorithm,
            outcomes,
            cost,
            self.quality(assignment),
            budget.nodes(),
            status,
            budget.elapsed(),
            priorities,
        )
    }

    /// Result for an instance without pipes: cost 0, no nodes explored.
    pub(crate) fn trivial_solution(
        &self,
        algorithm: Algorithm,
        budget: &SearchBudget,
    ) -> Option<Solution> {
        self.is_empty().then(|| {
            self.solution(
                algorithm,
                &Assignment::new(),
                PriorityGraph::default(),
                budget,
                SolveStatus::Complete,
            )
        })
    }
}
