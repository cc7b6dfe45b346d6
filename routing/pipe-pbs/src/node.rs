//! Search-tree nodes.

use pipe_types::{PipeId, PipePath};

use crate::conflict::Conflict;
use crate::context::{Assigned, Assignment, RoutingContext};
use crate::priority::PriorityGraph;
use crate::solution::Quality;

/// One node of the priority search tree.
///
/// A node owns its priority graph and its assignment; paths it did not
/// replan are shared with its parent.
#[derive(Debug, Clone)]
pub struct SearchNode {
    priorities: PriorityGraph,
    assignment: Assignment,
    conflicts: Vec<Conflict>,
    quality: Quality,
    depth: usize,
}

impl SearchNode {
    /// Detects conflicts and ranks a freshly planned assignment.
    pub(crate) fn evaluate(
        ctx: &RoutingContext<'_>,
        priorities: PriorityGraph,
        assignment: Assignment,
        depth: usize,
    ) -> Self {
        let conflicts = ctx.conflicts(&assignment);
        let quality = ctx.quality(&assignment);
        Self {
            priorities,
            assignment,
            conflicts,
            quality,
            depth,
        }
    }

    pub(crate) const fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub(crate) fn into_parts(self) -> (PriorityGraph, Assignment) {
        (self.priorities, self.assignment)
    }

    /// Priority constraints of this node.
    #[must_use]
    pub const fn priorities(&self) -> &PriorityGraph {
        &self.priorities
    }

    /// Conflicts among the routed pipes, sorted by pair.
    #[must_use]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Returns `true` if no routed pipes conflict.
    #[must_use]
    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Ranking key of the node's assignment.
    #[must_use]
    pub const fn quality(&self) -> Quality {
        self.quality
    }

    /// Number of constraints added since the root.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Path of a routed pipe.
    #[must_use]
    pub fn path(&self, pipe: PipeId) -> Option<&PipePath> {
        self.assignment.get(&pipe).and_then(Assigned::path)
    }

    /// Pipes dropped in this node.
    #[must_use]
    pub fn dropped(&self) -> Vec<PipeId> {
        self.assignment
            .iter()
            .filter(|(_, a)| matches!(a, Assigned::Dropped))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of dropped pipes.
    #[must_use]
    pub const fn dropped_count(&self) -> usize {
        self.quality.dropped()
    }
}
