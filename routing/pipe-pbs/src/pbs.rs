//! Priority-based search (PBS) and its permissive PBS-MP variant.
//!
//! The search walks a tree of priority graphs. The root orders nothing: every
//! pipe is planned alone. Each conflict between two pipes branches into two
//! children, one per priority between them. A child copies its parent, adds
//! the constraint, and replans only the new lower pipe and those of its
//! descendants whose paths now clash with a higher-priority pipe.
//!
//! The tree is explored depth first from an explicit stack of owned nodes.
//! Backtracking is dropping a node.
//!
//! # PBS-MP
//!
//! With drops enabled, a pipe that stays infeasible after `retry_limit`
//! failed replans is left unrouted under penalty instead of killing the
//! node. When both branches of a conflict dead-end, no further branching
//! can help, so the failing pipes are dropped there. A pipe infeasible at
//! the root has nothing above it to reorder and is dropped right away.
//!
//! # Budgets
//!
//! The deadline is checked before every planner call and the node limit
//! before every branch, so a run never evaluates more nodes than allowed.
//!
//! # Example
//!
//! ```
//! use pipe_pbs::{Pbs, RoutingContext, SolveStatus, Strategy};
//! use pipe_types::{PipeId, PipeSpec, RouterConfig};
//! use pipe_grid::{Cell, GridBounds, GridEnvironment};
//!
//! let env = GridEnvironment::new(GridBounds::from_size(5, 5, 1).unwrap());
//! let pipes = vec![
//!     PipeSpec::new(PipeId::new(0), Cell::new(0, 2, 0), Cell::new(4, 2, 0)),
//!     PipeSpec::new(PipeId::new(1), Cell::new(2, 0, 0), Cell::new(2, 4, 0)),
//! ];
//! let config = RouterConfig::default();
//! let ctx = RoutingContext::new(&env, &pipes, &config).unwrap();
//!
//! let root = Pbs::new().root(&ctx).unwrap();
//! assert_eq!(root.conflicts().len(), 1);
//!
//! // a flat grid cannot host two crossing pipes
//! assert!(Pbs::new().solve(&ctx).unwrap_err().is_exhausted());
//! ```

use std::collections::BTreeMap;

use pipe_types::{Algorithm, COST_SCALE, ConflictPolicy, PipeId, RoutingError};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::budget::SearchBudget;
use crate::context::{Assigned, Assignment, RoutingContext};
use crate::node::SearchNode;
use crate::priority::PriorityGraph;
use crate::solution::{Solution, SolveStatus};
use crate::strategy::Strategy;

/// Priority-based search over pipe orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pbs {
    allow_drops: bool,
}

impl Pbs {
    /// Plain PBS: every pipe must be routed.
    #[must_use]
    pub const fn new() -> Self {
        Self { allow_drops: false }
    }

    /// PBS-MP: pipes may be dropped under penalty.
    #[must_use]
    pub const fn with_drops() -> Self {
        Self { allow_drops: true }
    }

    /// Returns `true` for PBS-MP.
    #[must_use]
    pub const fn allows_drops(&self) -> bool {
        self.allow_drops
    }

    /// Evaluates the root node: every pipe planned on its own.
    ///
    /// # Errors
    ///
    /// [`RoutingError::Exhausted`] if the root is already a dead end.
    pub fn root(&self, ctx: &RoutingContext<'_>) -> Result<SearchNode, RoutingError> {
        let mut budget = SearchBudget::unlimited();
        Engine::new(ctx, &mut budget, self.allow_drops).start()
    }

    /// Branches a node on its chosen conflict.
    ///
    /// Returns the viable children, best first. Branches that would close a
    /// cycle or hit a dead end are left out.
    ///
    /// # Errors
    ///
    /// Only run-level failures; infeasible pipes never surface here.
    pub fn expand(
        &self,
        ctx: &RoutingContext<'_>,
        node: &SearchNode,
    ) -> Result<Vec<SearchNode>, RoutingError> {
        let mut budget = SearchBudget::unlimited();
        let expansion = Engine::new(ctx, &mut budget, self.allow_drops).children(node)?;
        Ok(expansion.children)
    }
}

impl Strategy for Pbs {
    fn algorithm(&self) -> Algorithm {
        if self.allow_drops {
            Algorithm::PbsMp
        } else {
            Algorithm::Pbs
        }
    }

    fn solve_within(
        &self,
        ctx: &RoutingContext<'_>,
        budget: &mut SearchBudget,
    ) -> Result<Solution, RoutingError> {
        if let Some(trivial) = ctx.trivial_solution(self.algorithm(), budget) {
            return Ok(trivial);
        }
        let (best, status) = Engine::new(ctx, budget, self.allow_drops).search()?;
        let (priorities, assignment) = best.into_parts();
        Ok(ctx.solution(self.algorithm(), &assignment, priorities, budget, status))
    }
}

/// Result of evaluating one node of the tree.
#[derive(Debug)]
pub(crate) enum Evaluation {
    /// A viable node.
    Node(SearchNode),
    /// The constraint would close a cycle; nothing was planned or charged.
    Pruned,
    /// The pipe could not be planned and was not dropped.
    DeadEnd(PipeId),
    /// The deadline passed between two planner calls.
    Stopped,
}

/// Children of one node, best first.
#[derive(Debug, Default)]
pub(crate) struct Expansion {
    pub(crate) children: Vec<SearchNode>,
    /// The budget ran out before every branch was evaluated.
    pub(crate) stopped: bool,
}

impl Expansion {
    fn new(mut children: Vec<SearchNode>, stopped: bool) -> Self {
        children.sort_by_key(SearchNode::quality);
        Self { children, stopped }
    }
}

/// Mutable state of one tree search.
pub(crate) struct Engine<'c, 'a, 'b> {
    ctx: &'c RoutingContext<'a>,
    budget: &'b mut SearchBudget,
    allow_drops: bool,
    rng: ChaCha8Rng,
    failures: BTreeMap<PipeId, u32>,
}

impl<'c, 'a, 'b> Engine<'c, 'a, 'b> {
    pub(crate) fn new(
        ctx: &'c RoutingContext<'a>,
        budget: &'b mut SearchBudget,
        allow_drops: bool,
    ) -> Self {
        Self {
            ctx,
            budget,
            allow_drops,
            rng: ChaCha8Rng::seed_from_u64(ctx.config().seed()),
            failures: BTreeMap::new(),
        }
    }

    pub(crate) fn exhausted(&self, budget_expired: bool) -> RoutingError {
        RoutingError::Exhausted {
            nodes_explored: self.budget.nodes(),
            budget_expired,
        }
    }

    fn can_drop(&self, assignment: &Assignment) -> bool {
        if !self.allow_drops {
            return false;
        }
        let dropped = assignment
            .values()
            .filter(|a| matches!(a, Assigned::Dropped))
            .count();
        self.ctx
            .config()
            .drop_config()
            .max_dropped()
            .is_none_or(|max| dropped < max)
    }

    /// Counts a failed replan of `pipe` and drops it once it has failed
    /// more than `retry_limit` times, or right away when `force` is set.
    /// Returns `false` for a dead end.
    fn retry_or_drop(&mut self, pipe: PipeId, assignment: &mut Assignment, force: bool) -> bool {
        if !self.allow_drops {
            return false;
        }
        let failures = {
            let count = self.failures.entry(pipe).or_insert(0);
            *count += 1;
            *count
        };
        let retry_limit = self.ctx.config().drop_config().retry_limit();
        if (force || failures > retry_limit) && self.can_drop(assignment) {
            debug!(%pipe, failures, force, "dropping pipe");
            assignment.insert(pipe, Assigned::Dropped);
            return true;
        }
        false
    }

    /// Plans every pipe with nothing above it.
    pub(crate) fn root(&mut self) -> Result<Evaluation, RoutingError> {
        if self.budget.timed_out() {
            return Ok(Evaluation::Stopped);
        }
        self.budget.charge_node();
        let ids: Vec<PipeId> = self.ctx.pipe_ids().collect();
        let mut assignment = Assignment::new();
        for (pipe, result) in self.ctx.plan_independent(&ids, self.budget) {
            match result {
                None => {
                    debug!(%pipe, "deadline passed while planning the root");
                    return Ok(Evaluation::Stopped);
                }
                Some(Ok(path)) => {
                    assignment.insert(pipe, Assigned::routed(path));
                }
                Some(Err(e)) if e.is_infeasible() => {
                    if !self.can_drop(&assignment) {
                        debug!(%pipe, "root is a dead end");
                        return Ok(Evaluation::DeadEnd(pipe));
                    }
                    debug!(%pipe, "dropping pipe infeasible on its own");
                    assignment.insert(pipe, Assigned::Dropped);
                }
                Some(Err(e)) => return Err(e),
            }
        }
        let root = SearchNode::evaluate(self.ctx, PriorityGraph::new(ids), assignment, 0);
        debug!(
            conflicts = root.conflicts().len(),
            cost = root.quality().cost(),
            "evaluated root"
        );
        Ok(Evaluation::Node(root))
    }

    /// Evaluates the root, turning anything but a node into `Exhausted`.
    pub(crate) fn start(&mut self) -> Result<SearchNode, RoutingError> {
        match self.root()? {
            Evaluation::Node(root) => Ok(root),
            Evaluation::Stopped => Err(self.exhausted(true)),
            Evaluation::Pruned | Evaluation::DeadEnd(_) => Err(self.exhausted(false)),
        }
    }

    /// Creates the child of `parent` with the extra constraint
    /// `higher -> lower`.
    ///
    /// With `force_drop`, an infeasible pipe is dropped at once instead of
    /// spending a retry.
    pub(crate) fn branch(
        &mut self,
        parent: &SearchNode,
        higher: PipeId,
        lower: PipeId,
        force_drop: bool,
    ) -> Result<Evaluation, RoutingError> {
        let mut priorities = parent.priorities().clone();
        match priorities.try_add(higher, lower) {
            Ok(()) => {}
            Err(RoutingError::CycleRejected { .. }) => {
                debug!(%higher, %lower, "branch closes a cycle");
                return Ok(Evaluation::Pruned);
            }
            Err(e) => return Err(e),
        }
        self.budget.charge_node();

        let ctx = self.ctx;
        let mut assignment = parent.assignment().clone();
        let below = priorities.descendants(lower);
        let affected = priorities
            .topological_order()
            .into_iter()
            .filter(|p| *p == lower || below.contains(p));

        for pipe in affected {
            let above = priorities.ancestors(pipe);
            let stale = if pipe == lower {
                true
            } else {
                match assignment.get(&pipe) {
                    Some(Assigned::Routed(path)) => {
                        ctx.violates_higher(pipe, path.path(), &above, &assignment)?
                    }
                    Some(Assigned::Dropped) | None => false,
                }
            };
            if !stale {
                continue;
            }
            if self.budget.timed_out() {
                debug!(%pipe, %higher, %lower, "deadline passed mid-branch");
                return Ok(Evaluation::Stopped);
            }

            match ctx.plan_against(pipe, above.iter().copied(), &assignment) {
                Ok(path) => {
                    assignment.insert(pipe, Assigned::routed(path));
                }
                Err(e) if e.is_infeasible() => {
                    if !self.retry_or_drop(pipe, &mut assignment, force_drop) {
                        debug!(%pipe, %higher, %lower, "dead end");
                        return Ok(Evaluation::DeadEnd(pipe));
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Evaluation::Node(SearchNode::evaluate(
            ctx,
            priorities,
            assignment,
            parent.depth() + 1,
        )))
    }

    /// Picks the conflict to branch on and the order of the two branches.
    fn choose(&mut self, node: &SearchNode) -> Option<(PipeId, PipeId)> {
        let conflicts = node.conflicts();
        let lowest = conflicts.first()?.pair();
        match self.ctx.config().search().conflict_policy() {
            ConflictPolicy::LowestPair => Some(lowest),
            ConflictPolicy::CostWeighted => {
                let ctx = self.ctx;
                let cost = |pipe| node.path(pipe).map_or(0, |p| ctx.path_cost(p));
                #[allow(clippy::cast_precision_loss)]
                let weights = conflicts.iter().map(|c| {
                    let (a, b) = c.pair();
                    cost(a).saturating_add(cost(b)) as f64 / COST_SCALE + 1.0
                });
                let Ok(index) = WeightedIndex::new(weights) else {
                    return Some(lowest);
                };
                let (a, b) = conflicts[index.sample(&mut self.rng)].pair();
                Some(if self.rng.gen_bool(0.5) { (b, a) } else { (a, b) })
            }
        }
    }

    /// Evaluates both children of `node`.
    ///
    /// Under PBS-MP, when neither order routes every pipe, the dead
    /// branches are evaluated again with their infeasible pipes dropped:
    /// no further branching on this conflict can place them.
    pub(crate) fn children(&mut self, node: &SearchNode) -> Result<Expansion, RoutingError> {
        let Some((a, b)) = self.choose(node) else {
            return Ok(Expansion::default());
        };
        debug!(
            %a,
            %b,
            depth = node.depth(),
            conflicts = node.conflicts().len(),
            "branching"
        );
        let mut children = Vec::with_capacity(2);
        let mut dead = Vec::new();
        for (higher, lower) in [(a, b), (b, a)] {
            if self.budget.expired() {
                return Ok(Expansion::new(children, true));
            }
            match self.branch(node, higher, lower, false)? {
                Evaluation::Node(child) => children.push(child),
                Evaluation::DeadEnd(pipe) => dead.push((higher, lower, pipe)),
                Evaluation::Pruned => {}
                Evaluation::Stopped => return Ok(Expansion::new(children, true)),
            }
        }

        if children.is_empty() && self.allow_drops {
            for (higher, lower, pipe) in dead {
                debug!(%pipe, %higher, %lower, "both orders dead, retrying with drops");
                if self.budget.expired() {
                    return Ok(Expansion::new(children, true));
                }
                match self.branch(node, higher, lower, true)? {
                    Evaluation::Node(child) => children.push(child),
                    Evaluation::Stopped => return Ok(Expansion::new(children, true)),
                    Evaluation::DeadEnd(_) | Evaluation::Pruned => {}
                }
            }
        }
        Ok(Expansion::new(children, false))
    }

    /// Depth-first search for the best conflict-free node.
    pub(crate) fn search(mut self) -> Result<(SearchNode, SolveStatus), RoutingError> {
        let exhaustive = self.ctx.config().search().exhaustive();
        let root = self.start()?;

        let mut stack = vec![root];
        let mut incumbent: Option<SearchNode> = None;
        let mut stopped = false;

        while let Some(node) = stack.pop() {
            if incumbent
                .as_ref()
                .is_some_and(|best| node.quality() >= best.quality())
            {
                continue;
            }

            if node.is_conflict_free() {
                let finished = !exhaustive && node.dropped_count() == 0;
                debug!(
                    depth = node.depth(),
                    cost = node.quality().cost(),
                    dropped = node.dropped_count(),
                    nodes = self.budget.nodes(),
                    "new incumbent"
                );
                incumbent = Some(node);
                if finished {
                    break;
                }
                continue;
            }

            if self.budget.expired() {
                stopped = true;
                break;
            }

            let expansion = self.children(&node)?;
            if expansion.stopped {
                // children evaluated before the cut still count
                let best = expansion
                    .children
                    .into_iter()
                    .find(SearchNode::is_conflict_free);
                if let Some(best) = best {
                    if incumbent
                        .as_ref()
                        .is_none_or(|current| best.quality() < current.quality())
                    {
                        incumbent = Some(best);
                    }
                }
                stopped = true;
                break;
            }
            let mut children = expansion.children;
            children.reverse();
            stack.extend(children);
        }

        match incumbent {
            Some(best) => {
                let status = if stopped {
                    SolveStatus::TimeoutPartial
                } else {
                    SolveStatus::Complete
                };
                Ok((best, status))
            }
            None => Err(self.exhausted(stopped)),
        }
    }

    /// Follows one branch per conflict without backtracking.
    ///
    /// The pipe ranked first in `ranks` gets priority; unranked pipes come
    /// last, by identifier.
    pub(crate) fn dive(mut self, ranks: &BTreeMap<PipeId, usize>) -> Result<SearchNode, RoutingError> {
        let mut node = self.start()?;
        let rank = |pipe: PipeId| (ranks.get(&pipe).copied().unwrap_or(usize::MAX), pipe);

        loop {
            let Some(conflict) = node.conflicts().first() else {
                return Ok(node);
            };
            if self.budget.expired() {
                return Err(self.exhausted(true));
            }

            let (a, b) = conflict.pair();
            let (mut higher, mut lower) = if rank(b) < rank(a) { (b, a) } else { (a, b) };
            if node.priorities().would_cycle(higher, lower) {
                std::mem::swap(&mut higher, &mut lower);
            }

            match self.branch(&node, higher, lower, false)? {
                Evaluation::Node(child) => node = child,
                Evaluation::Stopped => return Err(self.exhausted(true)),
                Evaluation::Pruned | Evaluation::DeadEnd(_) => {
                    debug!(%higher, %lower, depth = node.depth(), "dive hit a dead end");
                    return Err(self.exhausted(false));
                }
            }
        }
    }
}
