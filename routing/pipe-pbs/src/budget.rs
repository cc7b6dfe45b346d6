//! Wall-clock and node budgets shared by every strategy.
//!
//! Budgets are checked cooperatively between node evaluations and between
//! planner calls, never inside a planner call.

use std::time::{Duration, Instant};

use pipe_types::SearchConfig;

/// Time and node budget of one run.
///
/// # Example
///
/// ```
/// use pipe_pbs::SearchBudget;
/// use pipe_types::SearchConfig;
///
/// let mut budget = SearchBudget::new(&SearchConfig::new().with_node_limit(Some(2)));
/// assert!(!budget.expired());
/// budget.charge_node();
/// budget.charge_node();
/// assert!(budget.expired());
/// assert_eq!(budget.nodes(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SearchBudget {
    started: Instant,
    deadline: Option<Instant>,
    node_limit: Option<usize>,
    nodes: usize,
}

impl SearchBudget {
    /// Starts a budget from a search configuration.
    #[must_use]
    pub fn new(config: &SearchConfig) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: config.time_limit().and_then(|t| started.checked_add(t)),
            node_limit: config.node_limit(),
            nodes: 0,
        }
    }

    /// Creates a budget that never expires.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            started: Instant::now(),
            deadline: None,
            node_limit: None,
            nodes: 0,
        }
    }

    /// Starts a fresh node count under the same deadline and node limit.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            started: Instant::now(),
            deadline: self.deadline,
            node_limit: self.node_limit,
            nodes: 0,
        }
    }

    /// Records one evaluated search node.
    pub fn charge_node(&mut self) {
        self.nodes += 1;
    }

    /// Adds nodes evaluated elsewhere (e.g. by forked budgets).
    pub fn charge_nodes(&mut self, n: usize) {
        self.nodes = self.nodes.saturating_add(n);
    }

    /// Returns the number of evaluated nodes.
    #[must_use]
    pub const fn nodes(&self) -> usize {
        self.nodes
    }

    /// Returns the time since the budget started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Returns `true` once the deadline has passed.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Returns `true` once the deadline has passed or the node limit is reached.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.node_limit.is_some_and(|limit| self.nodes >= limit) || self.timed_out()
    }
}
