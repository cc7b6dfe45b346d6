//! Configuration types for the planner and the multi-pipe strategies.
//!
//! Every strategy reads one [`RouterConfig`]. Its parts can be built and
//! validated independently:
//!
//! - [`PlannerConfig`]: cost weights and the per-call expansion cap
//! - [`SearchConfig`]: time/node budget and branching policy of the tree search
//! - [`DropConfig`]: penalty and retry rule for dropped pipes (PBS-MP)
//! - [`RestartConfig`]: number of randomized restarts and the inner strategy
//! - [`HillClimbConfig`]: stopping rule of the local search
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use pipe_types::{Algorithm, RouterConfig, SearchConfig};
//!
//! let config = RouterConfig::new(Algorithm::PbsMp)
//!     .with_search(SearchConfig::new().with_time_limit(Some(Duration::from_secs(5))))
//!     .with_seed(42);
//!
//! assert!(config.validate().is_empty());
//! assert_eq!(config.algorithm(), Algorithm::PbsMp);
//! ```

use std::fmt;
use std::time::Duration;

use crate::clearance::ClearanceTable;
use crate::cost::CostWeights;

/// Settings of a single-pipe planner call.
///
/// # Example
///
/// ```
/// use pipe_types::{CostWeights, PlannerConfig};
///
/// let config = PlannerConfig::new()
///     .with_weights(CostWeights::length_only())
///     .with_max_expansions(Some(10_000));
/// assert_eq!(config.max_expansions(), Some(10_000));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerConfig {
    weights: CostWeights,
    max_expansions: Option<usize>,
}

impl PlannerConfig {
    /// Creates a planner configuration with default weights and no cap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            weights: CostWeights::new(),
            max_expansions: None,
        }
    }

    /// Sets the cost weights.
    #[must_use]
    pub const fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Caps the number of node expansions per call (`None` = unbounded).
    #[must_use]
    pub const fn with_max_expansions(mut self, max: Option<usize>) -> Self {
        self.max_expansions = max;
        self
    }

    /// Returns the cost weights.
    #[must_use]
    pub const fn weights(&self) -> &CostWeights {
        &self.weights
    }

    /// Returns the expansion cap.
    #[must_use]
    pub const fn max_expansions(&self) -> Option<usize> {
        self.max_expansions
    }

    /// Validates the configuration.
    ///
    /// Returns a list of validation errors, or empty if valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.weights.validate();
        if self.max_expansions == Some(0) {
            issues.push("max_expansions must be positive".to_string());
        }
        issues
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// How the tree search picks the conflict to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConflictPolicy {
    /// The conflict with the lowest pipe-id pair (fully deterministic).
    #[default]
    LowestPair,
    /// A seeded random conflict, weighted by the summed cost of both pipes.
    /// The order in which the two children are explored is shuffled too.
    CostWeighted,
}

/// Budget and branching settings of the priority tree search.
///
/// # Example
///
/// ```
/// use pipe_types::{ConflictPolicy, SearchConfig};
///
/// let config = SearchConfig::new()
///     .with_node_limit(Some(500))
///     .with_conflict_policy(ConflictPolicy::CostWeighted)
///     .with_exhaustive(true);
/// assert!(config.exhaustive());
/// assert!(config.validate().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    time_limit: Option<Duration>,
    node_limit: Option<usize>,
    conflict_policy: ConflictPolicy,
    exhaustive: bool,
}

impl SearchConfig {
    /// Default wall-clock budget of one run.
    pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(60);

    /// Creates a search configuration with a 60 s budget and no node limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            time_limit: Some(Self::DEFAULT_TIME_LIMIT),
            node_limit: None,
            conflict_policy: ConflictPolicy::LowestPair,
            exhaustive: false,
        }
    }

    /// Sets the wall-clock budget (`None` = unbounded).
    #[must_use]
    pub const fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    /// Sets the maximum number of search nodes evaluated (`None` = unbounded).
    #[must_use]
    pub const fn with_node_limit(mut self, limit: Option<usize>) -> Self {
        self.node_limit = limit;
        self
    }

    /// Sets the conflict selection policy.
    #[must_use]
    pub const fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Keeps searching for cheaper solutions after the first one is found.
    #[must_use]
    pub const fn with_exhaustive(mut self, exhaustive: bool) -> Self {
        self.exhaustive = exhaustive;
        self
    }

    /// Returns the wall-clock budget.
    #[must_use]
    pub const fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Returns the node limit.
    #[must_use]
    pub const fn node_limit(&self) -> Option<usize> {
        self.node_limit
    }

    /// Returns the conflict selection policy.
    #[must_use]
    pub const fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }

    /// Returns whether the search continues after the first solution.
    #[must_use]
    pub const fn exhaustive(&self) -> bool {
        self.exhaustive
    }

    /// Validates the configuration.
    ///
    /// Returns a list of validation errors, or empty if valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.time_limit == Some(Duration::ZERO) {
            issues.push("time_limit must be positive".to_string());
        }
        if self.node_limit == Some(0) {
            issues.push("node_limit must be positive".to_string());
        }
        issues
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Dropped-pipe settings of PBS-MP.
///
/// A pipe that stays infeasible for more than `retry_limit` evaluations is
/// dropped: it gets no path and costs `drop_penalty` instead.
///
/// # Example
///
/// ```
/// use pipe_types::DropConfig;
///
/// let config = DropConfig::new().with_drop_penalty(250.0).with_max_dropped(Some(1));
/// assert!((config.drop_penalty() - 250.0).abs() < 1e-10);
/// assert_eq!(config.retry_limit(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropConfig {
    drop_penalty: f64,
    max_dropped: Option<usize>,
    retry_limit: u32,
}

impl DropConfig {
    /// Creates the default drop settings (penalty 1000, unlimited drops, 3 retries).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            drop_penalty: 1000.0,
            max_dropped: None,
            retry_limit: 3,
        }
    }

    /// Sets the cost charged per dropped pipe.
    #[must_use]
    pub const fn with_drop_penalty(mut self, penalty: f64) -> Self {
        self.drop_penalty = penalty;
        self
    }

    /// Caps the number of dropped pipes per node (`None` = unlimited).
    #[must_use]
    pub const fn with_max_dropped(mut self, max: Option<usize>) -> Self {
        self.max_dropped = max;
        self
    }

    /// Sets how many infeasible evaluations a pipe survives before it is dropped.
    #[must_use]
    pub const fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit;
        self
    }

    /// Returns the cost charged per dropped pipe.
    #[must_use]
    pub const fn drop_penalty(&self) -> f64 {
        self.drop_penalty
    }

    /// Returns the drop penalty in the planner's milli-units.
    #[must_use]
    pub fn fixed_penalty(&self) -> u64 {
        crate::cost::to_milli(self.drop_penalty)
    }

    /// Returns the drop cap.
    #[must_use]
    pub const fn max_dropped(&self) -> Option<usize> {
        self.max_dropped
    }

    /// Returns the retry limit.
    #[must_use]
    pub const fn retry_limit(&self) -> u32 {
        self.retry_limit
    }

    /// Validates the configuration.
    ///
    /// Returns a list of validation errors, or empty if valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.drop_penalty.is_finite() || self.drop_penalty < 0.0 {
            issues.push(format!(
                "drop_penalty must be finite and >= 0, got {}",
                self.drop_penalty
            ));
        }
        issues
    }
}

impl Default for DropConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Strategy run inside each randomized restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InnerStrategy {
    /// Plan once in the shuffled total order.
    #[default]
    FixOrder,
    /// One greedy tree dive ranked by the shuffled order.
    OneDive,
}

/// Randomized restart settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestartConfig {
    restarts: usize,
    inner: InnerStrategy,
}

impl RestartConfig {
    /// Creates the default restart settings (16 FixOrder restarts).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            restarts: 16,
            inner: InnerStrategy::FixOrder,
        }
    }

    /// Sets the number of restarts.
    #[must_use]
    pub const fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Sets the inner strategy.
    #[must_use]
    pub const fn with_inner(mut self, inner: InnerStrategy) -> Self {
        self.inner = inner;
        self
    }

    /// Returns the number of restarts.
    #[must_use]
    pub const fn restarts(&self) -> usize {
        self.restarts
    }

    /// Returns the inner strategy.
    #[must_use]
    pub const fn inner(&self) -> InnerStrategy {
        self.inner
    }

    /// Validates the configuration.
    ///
    /// Returns a list of validation errors, or empty if valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        if self.restarts == 0 {
            vec!["restarts must be positive".to_string()]
        } else {
            Vec::new()
        }
    }
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Stopping rule of hill climbing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HillClimbConfig {
    max_stale_iterations: usize,
    max_iterations: Option<usize>,
}

impl HillClimbConfig {
    /// Creates the default settings (stop after 50 non-improving moves or 1000 moves).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_stale_iterations: 50,
            max_iterations: Some(1000),
        }
    }

    /// Sets the number of consecutive non-improving moves that ends the climb.
    #[must_use]
    pub const fn with_max_stale_iterations(mut self, n: usize) -> Self {
        self.max_stale_iterations = n;
        self
    }

    /// Sets the total move cap (`None` = only the stale rule and time budget apply).
    #[must_use]
    pub const fn with_max_iterations(mut self, n: Option<usize>) -> Self {
        self.max_iterations = n;
        self
    }

    /// Returns the stale-iteration limit.
    #[must_use]
    pub const fn max_stale_iterations(&self) -> usize {
        self.max_stale_iterations
    }

    /// Returns the total move cap.
    #[must_use]
    pub const fn max_iterations(&self) -> Option<usize> {
        self.max_iterations
    }

    /// Validates the configuration.
    ///
    /// Returns a list of validation errors, or empty if valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        if self.max_stale_iterations == 0 {
            vec!["max_stale_iterations must be positive".to_string()]
        } else {
            Vec::new()
        }
    }
}

impl Default for HillClimbConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Multi-pipe routing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Priority-based search; every pipe must be routed.
    #[default]
    Pbs,
    /// Priority-based search that may drop pipes under penalty.
    PbsMp,
    /// One fixed total order, no backtracking.
    FixOrder,
    /// A single greedy dive of the priority tree.
    OneDive,
    /// Best of several shuffled FixOrder/OneDive runs.
    RandomizedRestart,
    /// Local search over the priority order of an initial solution.
    HillClimbing,
}

impl Algorithm {
    /// All algorithms.
    pub const ALL: [Self; 6] = [
        Self::Pbs,
        Self::PbsMp,
        Self::FixOrder,
        Self::OneDive,
        Self::RandomizedRestart,
        Self::HillClimbing,
    ];

    /// Returns the short algorithm name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pbs => "PBS",
            Self::PbsMp => "PBS-MP",
            Self::FixOrder => "FixOrder",
            Self::OneDive => "OneDive",
            Self::RandomizedRestart => "RandomizedRestart",
            Self::HillClimbing => "HillClimbing",
        }
    }

    /// Returns `true` if the algorithm may drop pipes.
    #[must_use]
    pub const fn allows_drops(self) -> bool {
        matches!(self, Self::PbsMp)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complete configuration of one routing run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouterConfig {
    algorithm: Algorithm,
    planner: PlannerConfig,
    clearance: ClearanceTable,
    search: SearchConfig,
    drop: DropConfig,
    restart: RestartConfig,
    hill_climb: HillClimbConfig,
    seed: u64,
}

impl RouterConfig {
    /// Creates a configuration for the given algorithm with default settings.
    #[must_use]
    pub const fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            planner: PlannerConfig::new(),
            clearance: ClearanceTable::new(),
            search: SearchConfig::new(),
            drop: DropConfig::new(),
            restart: RestartConfig::new(),
            hill_climb: HillClimbConfig::new(),
            seed: 0,
        }
    }

    /// Sets the algorithm.
    #[must_use]
    pub const fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the planner configuration.
    #[must_use]
    pub const fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    /// Sets the cost weights of the planner.
    #[must_use]
    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.planner = self.planner.with_weights(weights);
        self
    }

    /// Sets the clearance table.
    #[must_use]
    pub fn with_clearance(mut self, clearance: ClearanceTable) -> Self {
        self.clearance = clearance;
        self
    }

    /// Sets the search configuration.
    #[must_use]
    pub const fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Sets the PBS-MP drop configuration.
    #[must_use]
    pub const fn with_drop(mut self, drop: DropConfig) -> Self {
        self.drop = drop;
        self
    }

    /// Sets the randomized restart configuration.
    #[must_use]
    pub const fn with_restart(mut self, restart: RestartConfig) -> Self {
        self.restart = restart;
        self
    }

    /// Sets the hill climbing configuration.
    #[must_use]
    pub const fn with_hill_climb(mut self, hill_climb: HillClimbConfig) -> Self {
        self.hill_climb = hill_climb;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the planner configuration.
    #[must_use]
    pub const fn planner(&self) -> &PlannerConfig {
        &self.planner
    }

    /// Returns the cost weights.
    #[must_use]
    pub const fn weights(&self) -> &CostWeights {
        self.planner.weights()
    }

    /// Returns the clearance table.
    #[must_use]
    pub const fn clearance(&self) -> &ClearanceTable {
        &self.clearance
    }

    /// Returns the search configuration.
    #[must_use]
    pub const fn search(&self) -> &SearchConfig {
        &self.search
    }

    /// Returns the drop configuration.
    #[must_use]
    pub const fn drop_config(&self) -> &DropConfig {
        &self.drop
    }

    /// Returns the restart configuration.
    #[must_use]
    pub const fn restart(&self) -> &RestartConfig {
        &self.restart
    }

    /// Returns the hill climbing configuration.
    #[must_use]
    pub const fn hill_climb(&self) -> &HillClimbConfig {
        &self.hill_climb
    }

    /// Returns the random seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Validates every part of the configuration.
    ///
    /// Returns a list of validation errors, or empty if valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.planner.validate();
        issues.extend(self.search.validate());
        issues.extend(self.drop.validate());
        issues.extend(self.restart.validate());
        issues.extend(self.hill_climb.validate());
        issues
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new(Algorithm::default())
    }
}
