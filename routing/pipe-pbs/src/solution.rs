//! Result of a routing run.

use std::collections::BTreeMap;
use std::time::Duration;

use pipe_types::{Algorithm, CostWeights, PathCost, PipeId, PipePath};

use crate::priority::PriorityGraph;

/// Final state of one pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PipeOutcome {
    /// The pipe was routed along this path.
    Routed(PipePath),
    /// The pipe was left unrouted under penalty.
    Dropped,
}

impl PipeOutcome {
    /// Returns the path of a routed pipe.
    #[must_use]
    pub const fn path(&self) -> Option<&PipePath> {
        match self {
            Self::Routed(path) => Some(path),
            Self::Dropped => None,
        }
    }

    /// Returns `true` if the pipe was dropped.
    #[must_use]
    pub const fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped)
    }
}

/// Whether the search finished or was stopped by its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveStatus {
    /// The strategy ran to completion.
    Complete,
    /// The budget expired; the result is the best found so far.
    TimeoutPartial,
}

/// Exact ranking key of an assignment: fewer dropped pipes first, then the
/// lower cost in milli-units (drop penalties included).
///
/// # Example
///
/// ```
/// use pipe_pbs::Quality;
///
/// // any drop is worse than any complete assignment
/// assert!(Quality::new(0, 1_000_000) < Quality::new(1, 0));
/// assert!(Quality::new(0, 10) < Quality::new(0, 11));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quality {
    dropped: usize,
    cost: u64,
}

impl Quality {
    /// Creates a quality key.
    #[must_use]
    pub const fn new(dropped: usize, cost: u64) -> Self {
        Self { dropped, cost }
    }

    /// Returns the number of dropped pipes.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Returns the cost in milli-units.
    #[must_use]
    pub const fn cost(&self) -> u64 {
        self.cost
    }
}

/// Cost breakdown of a solution.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use pipe_pbs::{PipeOutcome, SolutionCost};
/// use pipe_types::{CellPath, CostWeights, PathCost, PipeId, PipePath};
/// use pipe_grid::Cell;
///
/// let path = PipePath::new(
///     PipeId::new(0),
///     CellPath::new(vec![Cell::new(0, 0, 0), Cell::new(1, 0, 0)]),
///     PathCost::new(1, 0, 0),
/// );
/// let outcomes = BTreeMap::from([
///     (PipeId::new(0), PipeOutcome::Routed(path)),
///     (PipeId::new(1), PipeOutcome::Dropped),
/// ]);
///
/// let cost = SolutionCost::from_outcomes(&outcomes, &CostWeights::default(), 100.0);
/// assert_eq!(cost.total(), 101.0);
/// assert_eq!(cost.dropped(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolutionCost {
    totals: PathCost,
    dropped: usize,
    length: f64,
    bends: f64,
    support: f64,
    drop_penalty: f64,
}

impl SolutionCost {
    /// Sums the weighted components over all routed pipes and charges
    /// `drop_penalty` per dropped pipe.
    #[must_use]
    pub fn from_outcomes(
        outcomes: &BTreeMap<PipeId, PipeOutcome>,
        weights: &CostWeights,
        drop_penalty: f64,
    ) -> Self {
        let totals: PathCost = outcomes
            .values()
            .filter_map(PipeOutcome::path)
            .map(|p| *p.cost())
            .sum();
        let dropped = outcomes.values().filter(|o| o.is_dropped()).count();
        Self {
            totals,
            dropped,
            length: f64::from(totals.length()) * weights.unit_length(),
            bends: f64::from(totals.bends()) * weights.bend(),
            support: f64::from(totals.unsupported()) * weights.support(),
            #[allow(clippy::cast_precision_loss)]
            drop_penalty: dropped as f64 * drop_penalty,
        }
    }

    /// Summed raw counts over routed pipes.
    #[must_use]
    pub const fn totals(&self) -> &PathCost {
        &self.totals
    }

    /// Number of dropped pipes.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Weighted length component.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// Weighted bend component.
    #[must_use]
    pub const fn bends(&self) -> f64 {
        self.bends
    }

    /// Weighted support component.
    #[must_use]
    pub const fn support(&self) -> f64 {
        self.support
    }

    /// Total penalty charged for dropped pipes.
    #[must_use]
    pub const fn drop_penalty(&self) -> f64 {
        self.drop_penalty
    }

    /// Total cost.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.length + self.bends + self.support + self.drop_penalty
    }
}

/// A completed routing run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    algorithm: Algorithm,
    outcomes: BTreeMap<PipeId, PipeOutcome>,
    cost: SolutionCost,
    quality: Quality,
    nodes_explored: usize,
    status: SolveStatus,
    elapsed: Duration,
    priorities: PriorityGraph,
}

impl Solution {
    #[allow(clippy::too_many_arguments)]
    pub(crate) const fn new(
        algorithm: Algorithm,
        outcomes: BTreeMap<PipeId, PipeOutcome>,
        cost: SolutionCost,
        quality: Quality,
        nodes_explored: usize,
        status: SolveStatus,
        elapsed: Duration,
        priorities: PriorityGraph,
    ) -> Self {
        Self {
            algorithm,
            outcomes,
            cost,
            quality,
            nodes_explored,
            status,
            elapsed,
            priorities,
        }
    }

    /// Returns the algorithm that produced the solution.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the outcome of every pipe.
    #[must_use]
    pub const fn outcomes(&self) -> &BTreeMap<PipeId, PipeOutcome> {
        &self.outcomes
    }

    /// Returns the path of a routed pipe.
    #[must_use]
    pub fn path(&self, pipe: PipeId) -> Option<&PipePath> {
        self.outcomes.get(&pipe).and_then(PipeOutcome::path)
    }

    /// Iterates over the routed paths in pipe order.
    pub fn routed(&self) -> impl Iterator<Item = &PipePath> {
        self.outcomes.values().filter_map(PipeOutcome::path)
    }

    /// Returns the dropped pipes in identifier order.
    #[must_use]
    pub fn dropped(&self) -> Vec<PipeId> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.is_dropped())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns the cost breakdown.
    #[must_use]
    pub const fn cost(&self) -> &SolutionCost {
        &self.cost
    }

    /// Returns the exact ranking key.
    #[must_use]
    pub const fn quality(&self) -> Quality {
        self.quality
    }

    /// Returns the number of search nodes evaluated.
    #[must_use]
    pub const fn nodes_explored(&self) -> usize {
        self.nodes_explored
    }

    /// Returns whether the run finished or was cut short.
    #[must_use]
    pub const fn status(&self) -> SolveStatus {
        self.status
    }

    /// Returns `true` if the budget stopped the run.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.status == SolveStatus::TimeoutPartial
    }

    /// Returns the wall-clock time of the run.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns the priority graph the paths were planned under.
    #[must_use]
    pub const fn priorities(&self) -> &PriorityGraph {
        &self.priorities
    }

    /// Relative cost difference to `baseline`, in percent.
    ///
    /// Positive values mean this solution is more expensive. A zero-cost
    /// baseline gives `0.0` for another zero-cost solution and infinity
    /// otherwise.
    #[must_use]
    pub fn cost_gap(&self, baseline: &Self) -> f64 {
        let (ours, theirs) = (self.cost.total(), baseline.cost.total());
        if theirs > 0.0 {
            (ours / theirs - 1.0) * 100.0
        } else if ours > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pipe_grid::Cell;
    use pipe_types::CellPath;

    fn routed(id: u32, moves: i32, bends: u32) -> (PipeId, PipeOutcome) {
        let pipe = PipeId::new(id);
        let cells = (0..=moves).map(|x| Cell::new(x, 0, 0)).collect();
        #[allow(clippy::cast_sign_loss)]
        let cost = PathCost::new(moves as u32, bends, 1);
        (
            pipe,
            PipeOutcome::Routed(PipePath::new(pipe, CellPath::new(cells), cost)),
        )
    }

    fn solution(outcomes: BTreeMap<PipeId, PipeOutcome>, penalty: f64) -> Solution {
        let cost = SolutionCost::from_outcomes(&outcomes, &CostWeights::default(), penalty);
        Solution::new(
            Algorithm::Pbs,
            outcomes,
            cost,
            Quality::default(),
            0,
            SolveStatus::Complete,
            Duration::ZERO,
            PriorityGraph::default(),
        )
    }

    #[test]
    fn test_cost_components() {
        let outcomes = BTreeMap::from([routed(0, 4, 1), routed(1, 2, 0)]);
        let cost = SolutionCost::from_outcomes(&outcomes, &CostWeights::default(), 50.0);
        assert_eq!(*cost.totals(), PathCost::new(6, 1, 2));
        assert_relative_eq!(cost.length(), 6.0);
        assert_relative_eq!(cost.bends(), 2.0);
        assert_relative_eq!(cost.support(), 1.0);
        assert_relative_eq!(cost.drop_penalty(), 0.0);
        assert_relative_eq!(cost.total(), 9.0);
    }

    #[test]
    fn test_dropped_listing() {
        let mut outcomes = BTreeMap::from([routed(0, 1, 0)]);
        outcomes.insert(PipeId::new(3), PipeOutcome::Dropped);
        outcomes.insert(PipeId::new(2), PipeOutcome::Dropped);
        let s = solution(outcomes, 10.0);
        assert_eq!(s.dropped(), vec![PipeId::new(2), PipeId::new(3)]);
        assert!(s.path(PipeId::new(0)).is_some());
        assert!(s.path(PipeId::new(2)).is_none());
        assert_eq!(s.routed().count(), 1);
        assert_relative_eq!(s.cost().drop_penalty(), 20.0);
    }

    #[test]
    fn test_cost_gap() {
        let cheap = solution(BTreeMap::from([routed(0, 4, 0)]), 0.0);
        let dear = solution(BTreeMap::from([routed(0, 5, 0)]), 0.0);
        let empty = solution(BTreeMap::new(), 0.0);

        // 4 moves + 0.5 support vs 5 moves + 0.5 support
        assert_relative_eq!(dear.cost_gap(&cheap), (5.5 / 4.5 - 1.0) * 100.0);
        assert!(cheap.cost_gap(&dear) < 0.0);
        assert_relative_eq!(empty.cost_gap(&empty), 0.0);
        assert!(cheap.cost_gap(&empty).is_infinite());
    }
}
