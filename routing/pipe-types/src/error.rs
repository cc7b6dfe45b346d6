//! Error types for routing operations.
//!
//! This module defines the [`RoutingError`] enum, shared by the single-pipe
//! planner and every multi-pipe strategy.
//!
//! Some variants only steer the search and never reach the caller of a
//! tree search: see [`RoutingError::is_recoverable`].

use pipe_grid::{Cell, GridError};

use crate::pipe::PipeId;

/// Errors that can occur during routing operations.
///
/// # Example
///
/// ```
/// use pipe_types::{PipeId, RoutingError};
/// use pipe_grid::Cell;
///
/// let error = RoutingError::NoPathFound {
///     pipe: PipeId::new(2),
///     start: Cell::new(0, 0, 0),
///     goal: Cell::new(4, 4, 4),
/// };
///
/// assert!(error.to_string().contains("no path found"));
/// assert!(error.is_recoverable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RoutingError {
    /// The planner exhausted its frontier without reaching the goal.
    #[error("no path found for pipe {pipe} from {start} to {goal}")]
    NoPathFound {
        /// The pipe being planned.
        pipe: PipeId,
        /// The start cell.
        start: Cell,
        /// The goal cell.
        goal: Cell,
    },

    /// The planner hit its expansion cap before reaching the goal.
    ///
    /// Callers treat this exactly like [`RoutingError::NoPathFound`].
    #[error("planner expansion limit {limit} reached for pipe {pipe}")]
    ExpansionLimit {
        /// The pipe being planned.
        pipe: PipeId,
        /// The configured cap.
        limit: usize,
    },

    /// A priority constraint would close a cycle in the priority graph.
    #[error("priority {higher} > {lower} would create a cycle")]
    CycleRejected {
        /// The pipe that would gain priority.
        higher: PipeId,
        /// The pipe that would have to avoid it.
        lower: PipeId,
    },

    /// No acceptable solution was found.
    ///
    /// `budget_expired` distinguishes a time/node budget that ran out before
    /// any feasible result from a search space proven to contain none.
    #[error("search exhausted after {nodes_explored} nodes (budget expired: {budget_expired})")]
    Exhausted {
        /// Number of search nodes evaluated.
        nodes_explored: usize,
        /// Whether the run stopped on its budget.
        budget_expired: bool,
    },

    /// The problem instance is malformed.
    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    /// An invalid configuration parameter was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A grid query failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl RoutingError {
    /// Creates an invalid instance error with the given message.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_types::RoutingError;
    ///
    /// let error = RoutingError::invalid_instance("duplicate pipe id P3");
    /// assert!(error.to_string().contains("P3"));
    /// ```
    #[must_use]
    pub fn invalid_instance(message: impl Into<String>) -> Self {
        Self::InvalidInstance(message.into())
    }

    /// Creates an invalid configuration error with the given message.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Returns `true` for errors that only steer a search.
    ///
    /// Planner failures and rejected cycles are handled inside the tree
    /// search; everything else is a run-level failure.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoPathFound { .. } | Self::ExpansionLimit { .. } | Self::CycleRejected { .. }
        )
    }

    /// Returns `true` if the planner could not produce a path.
    #[must_use]
    pub const fn is_infeasible(&self) -> bool {
        matches!(self, Self::NoPathFound { .. } | Self::ExpansionLimit { .. })
    }

    /// Returns `true` if this is an exhausted-search error.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_types::RoutingError;
    ///
    /// let error = RoutingError::Exhausted { nodes_explored: 12, budget_expired: false };
    /// assert!(error.is_exhausted());
    /// assert!(!error.is_recoverable());
    /// ```
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
