//! Priority graph: the acyclic "must avoid" relation between pipes.
//!
//! An edge `higher -> lower` means `higher`'s path is an obstacle when
//! `lower` is planned. The graph is kept acyclic by construction: any edge
//! that would close a cycle is rejected before it is inserted.
//!
//! # Example
//!
//! ```
//! use pipe_pbs::PriorityGraph;
//! use pipe_types::{PipeId, RoutingError};
//!
//! let ids: Vec<_> = (0..3).map(PipeId::new).collect();
//! let mut graph = PriorityGraph::new(ids.iter().copied());
//!
//! graph.try_add(ids[2], ids[0]).unwrap();
//! graph.try_add(ids[0], ids[1]).unwrap();
//!
//! // 1 -> 2 would close the cycle 2 -> 0 -> 1 -> 2
//! assert!(matches!(graph.try_add(ids[1], ids[2]), Err(RoutingError::CycleRejected { .. })));
//! assert_eq!(graph.topological_order(), vec![ids[2], ids[0], ids[1]]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use pathfinding::prelude::bfs_reach;
use pipe_types::{PipeId, RoutingError};

/// Directed acyclic priority relation over a fixed set of pipes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorityGraph {
    pipes: BTreeSet<PipeId>,
    successors: BTreeMap<PipeId, BTreeSet<PipeId>>,
    predecessors: BTreeMap<PipeId, BTreeSet<PipeId>>,
}

impl PriorityGraph {
    /// Creates an unconstrained graph over the given pipes.
    #[must_use]
    pub fn new<I: IntoIterator<Item = PipeId>>(pipes: I) -> Self {
        Self {
            pipes: pipes.into_iter().collect(),
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
        }
    }

    /// Creates the chain of a total order: each pipe has priority over the next.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_pbs::PriorityGraph;
    /// use pipe_types::PipeId;
    ///
    /// let order = [PipeId::new(4), PipeId::new(1), PipeId::new(7)];
    /// let graph = PriorityGraph::from_total_order(&order);
    /// assert_eq!(graph.topological_order(), order.to_vec());
    /// assert!(graph.ancestors(PipeId::new(7)).contains(&PipeId::new(4)));
    /// ```
    #[must_use]
    pub fn from_total_order(order: &[PipeId]) -> Self {
        let mut graph = Self::new(order.iter().copied());
        for pair in order.windows(2) {
            graph.insert_edge(pair[0], pair[1]);
        }
        graph
    }

    fn insert_edge(&mut self, higher: PipeId, lower: PipeId) {
        self.pipes.insert(higher);
        self.pipes.insert(lower);
        self.successors.entry(higher).or_default().insert(lower);
        self.predecessors.entry(lower).or_default().insert(higher);
    }

    /// Returns `true` if adding `higher -> lower` would close a cycle.
    #[must_use]
    pub fn would_cycle(&self, higher: PipeId, lower: PipeId) -> bool {
        higher == lower || self.reaches(lower, higher)
    }

    /// Returns `true` if there is a directed path `from -> ... -> to`.
    #[must_use]
    pub fn reaches(&self, from: PipeId, to: PipeId) -> bool {
        bfs_reach(from, |p| self.direct_lower(*p).collect::<Vec<_>>()).any(|p| p == to)
    }

    /// Adds the constraint `higher -> lower`.
    ///
    /// Adding an edge that is already present is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::CycleRejected`] if the edge would make the
    /// graph cyclic; the graph is left unchanged.
    pub fn try_add(&mut self, higher: PipeId, lower: PipeId) -> Result<(), RoutingError> {
        if self.would_cycle(higher, lower) {
            return Err(RoutingError::CycleRejected { higher, lower });
        }
        self.insert_edge(higher, lower);
        Ok(())
    }

    /// Returns `true` if the edge `higher -> lower` is present.
    #[must_use]
    pub fn contains_edge(&self, higher: PipeId, lower: PipeId) -> bool {
        self.successors
            .get(&higher)
            .is_some_and(|s| s.contains(&lower))
    }

    /// Pipes directly below `pipe`.
    pub fn direct_lower(&self, pipe: PipeId) -> impl Iterator<Item = PipeId> + '_ {
        self.successors.get(&pipe).into_iter().flatten().copied()
    }

    /// Pipes directly above `pipe`.
    pub fn direct_higher(&self, pipe: PipeId) -> impl Iterator<Item = PipeId> + '_ {
        self.predecessors.get(&pipe).into_iter().flatten().copied()
    }

    /// Every pipe with priority over `pipe` (transitively).
    #[must_use]
    pub fn ancestors(&self, pipe: PipeId) -> BTreeSet<PipeId> {
        bfs_reach(pipe, |p| self.direct_higher(*p).collect::<Vec<_>>())
            .filter(|p| *p != pipe)
            .collect()
    }

    /// Every pipe that `pipe` has priority over (transitively).
    #[must_use]
    pub fn descendants(&self, pipe: PipeId) -> BTreeSet<PipeId> {
        bfs_reach(pipe, |p| self.direct_lower(*p).collect::<Vec<_>>())
            .filter(|p| *p != pipe)
            .collect()
    }

    /// Returns all pipes in a deterministic topological order.
    ///
    /// Among pipes whose predecessors are all placed, the smallest
    /// identifier comes first.
    #[must_use]
    pub fn topological_order(&self) -> Vec<PipeId> {
        let mut indegree = self.indegrees();
        let mut ready: BTreeSet<PipeId> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(p, _)| *p)
            .collect();

        let mut order = Vec::with_capacity(self.pipes.len());
        while let Some(pipe) = ready.pop_first() {
            order.push(pipe);
            for lower in self.direct_lower(pipe) {
                if let Some(d) = indegree.get_mut(&lower) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(lower);
                    }
                }
            }
        }
        order
    }

    fn indegrees(&self) -> BTreeMap<PipeId, usize> {
        self.pipes
            .iter()
            .map(|p| (*p, self.direct_higher(*p).count()))
            .collect()
    }

    /// Groups pipes into layers: each layer only depends on earlier layers.
    ///
    /// Pipes in one layer are mutually unordered and can be planned
    /// concurrently.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_pbs::PriorityGraph;
    /// use pipe_types::PipeId;
    ///
    /// let ids: Vec<_> = (0..4).map(PipeId::new).collect();
    /// let mut graph = PriorityGraph::new(ids.iter().copied());
    /// graph.try_add(ids[3], ids[0]).unwrap();
    ///
    /// assert_eq!(graph.layers(), vec![vec![ids[1], ids[2], ids[3]], vec![ids[0]]]);
    /// ```
    #[must_use]
    pub fn layers(&self) -> Vec<Vec<PipeId>> {
        let mut indegree = self.indegrees();
        let mut layers = Vec::new();
        let mut current: Vec<PipeId> = indegree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(p, _)| *p)
            .collect();

        while !current.is_empty() {
            let mut next = BTreeSet::new();
            for &pipe in &current {
                for lower in self.direct_lower(pipe) {
                    if let Some(d) = indegree.get_mut(&lower) {
                        *d -= 1;
                        if *d == 0 {
                            next.insert(lower);
                        }
                    }
                }
            }
            layers.push(current);
            current = next.into_iter().collect();
        }
        layers
    }

    /// Returns `true` if the graph has no cycle.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.topological_order().len() == self.pipes.len()
    }

    /// Returns every edge `(higher, lower)` in sorted order.
    pub fn edges(&self) -> impl Iterator<Item = (PipeId, PipeId)> + '_ {
        self.successors
            .iter()
            .flat_map(|(h, lows)| lows.iter().map(move |l| (*h, *l)))
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.successors.values().map(BTreeSet::len).sum()
    }

    /// Returns the pipes of the graph.
    #[must_use]
    pub const fn pipes(&self) -> &BTreeSet<PipeId> {
        &self.pipes
    }

    /// Returns the number of pipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    /// Returns `true` if the graph has no pipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ids(n: u32) -> Vec<PipeId> {
        (0..n).map(PipeId::new).collect()
    }

    #[test]
    fn test_self_edge_rejected() {
        let p = ids(1);
        let mut graph = PriorityGraph::new(p.iter().copied());
        assert_eq!(
            graph.try_add(p[0], p[0]),
            Err(RoutingError::CycleRejected {
                higher: p[0],
                lower: p[0]
            })
        );
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_rejected_edge_leaves_graph_unchanged() {
        let p = ids(3);
        let mut graph = PriorityGraph::new(p.iter().copied());
        graph.try_add(p[0], p[1]).unwrap();
        graph.try_add(p[1], p[2]).unwrap();
        let before = graph.clone();
        assert!(graph.try_add(p[2], p[0]).is_err());
        assert_eq!(graph, before);
        assert!(graph.is_acyclic());
    }

    #[test]
    fn test_duplicate_edge_is_noop() {
        let p = ids(2);
        let mut graph = PriorityGraph::new(p.iter().copied());
        graph.try_add(p[0], p[1]).unwrap();
        graph.try_add(p[0], p[1]).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_edge(p[0], p[1]));
        assert!(!graph.contains_edge(p[1], p[0]));
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let p = ids(5);
        let mut graph = PriorityGraph::new(p.iter().copied());
        graph.try_add(p[0], p[1]).unwrap();
        graph.try_add(p[1], p[2]).unwrap();
        graph.try_add(p[3], p[2]).unwrap();

        assert_eq!(
            graph.ancestors(p[2]),
            [p[0], p[1], p[3]].into_iter().collect()
        );
        assert_eq!(graph.descendants(p[0]), [p[1], p[2]].into_iter().collect());
        assert!(graph.ancestors(p[4]).is_empty());
        assert!(graph.reaches(p[0], p[2]));
        assert!(!graph.reaches(p[2], p[0]));
    }

    #[test]
    fn test_topological_order_prefers_small_ids() {
        let p = ids(3);
        let mut graph = PriorityGraph::new(p.iter().copied());
        graph.try_add(p[0], p[1]).unwrap();
        assert_eq!(graph.topological_order(), vec![p[0], p[1], p[2]]);
        assert_eq!(graph.layers(), vec![vec![p[0], p[2]], vec![p[1]]]);
    }

    #[test]
    fn test_edges_sorted() {
        let p = ids(3);
        let mut graph = PriorityGraph::new(p.iter().copied());
        graph.try_add(p[2], p[0]).unwrap();
        graph.try_add(p[0], p[1]).unwrap();
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges, vec![(p[0], p[1]), (p[2], p[0])]);
        assert_eq!(graph.len(), 3);
        assert!(!graph.is_empty());
    }
}
