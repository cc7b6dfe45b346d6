//! Cost model for routed pipes.
//!
//! The cost of a path is
//! `unit_length * moves + bend * bends + support * unsupported_cells`.
//! [`CostWeights`] holds the three weights, [`PathCost`] the three counts.
//! Searches compare costs in exact fixed-point milli-units through
//! [`FixedWeights`], so equal-cost ties are detected reliably.
//!
//! # Example
//!
//! ```
//! use pipe_types::{CostWeights, PathCost};
//!
//! let weights = CostWeights::default()
//!     .with_bend(3.0)
//!     .with_support(0.0);
//!
//! let cost = PathCost::new(10, 2, 4);
//! assert!((cost.weighted(&weights) - 16.0).abs() < 1e-10);
//! assert_eq!(cost.fixed(&weights.to_fixed()), 16_000);
//! ```

use std::ops::Add;

use pipe_grid::GridEnvironment;

use crate::path::CellPath;

/// Fixed-point scale: one cost unit is 1000 milli-units.
pub const COST_SCALE: f64 = 1000.0;

/// Weights of the three cost components.
///
/// # Example
///
/// ```
/// use pipe_types::CostWeights;
///
/// let weights = CostWeights::default();
/// assert!((weights.unit_length() - 1.0).abs() < 1e-10);
/// assert!((weights.bend() - 2.0).abs() < 1e-10);
/// assert!((weights.support() - 0.5).abs() < 1e-10);
/// assert!(weights.validate().is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostWeights {
    /// Cost per unit move.
    unit_length: f64,
    /// Cost per direction change.
    bend: f64,
    /// Cost per unsupported cell.
    support: f64,
}

impl CostWeights {
    /// Creates the default weights (length 1.0, bend 2.0, support 0.5).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            unit_length: 1.0,
            bend: 2.0,
            support: 0.5,
        }
    }

    /// Creates weights that only consider path length.
    #[must_use]
    pub const fn length_only() -> Self {
        Self {
            unit_length: 1.0,
            bend: 0.0,
            support: 0.0,
        }
    }

    /// Sets the per-move weight.
    #[must_use]
    pub const fn with_unit_length(mut self, weight: f64) -> Self {
        self.unit_length = weight;
        self
    }

    /// Sets the per-bend weight.
    #[must_use]
    pub const fn with_bend(mut self, weight: f64) -> Self {
        self.bend = weight;
        self
    }

    /// Sets the per-unsupported-cell weight.
    #[must_use]
    pub const fn with_support(mut self, weight: f64) -> Self {
        self.support = weight;
        self
    }

    /// Returns the per-move weight.
    #[must_use]
    pub const fn unit_length(&self) -> f64 {
        self.unit_length
    }

    /// Returns the per-bend weight.
    #[must_use]
    pub const fn bend(&self) -> f64 {
        self.bend
    }

    /// Returns the per-unsupported-cell weight.
    #[must_use]
    pub const fn support(&self) -> f64 {
        self.support
    }

    /// Converts the weights to fixed-point milli-units.
    ///
    /// Negative or non-finite weights convert to zero; call
    /// [`validate`](Self::validate) first to reject them.
    #[must_use]
    pub fn to_fixed(&self) -> FixedWeights {
        FixedWeights {
            unit_length: to_milli(self.unit_length),
            bend: to_milli(self.bend),
            support: to_milli(self.support),
        }
    }

    /// Validates the weights.
    ///
    /// Returns a list of validation errors, or empty if valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (name, value) in [
            ("unit_length", self.unit_length),
            ("bend", self.bend),
            ("support", self.support),
        ] {
            if !value.is_finite() || value < 0.0 {
                issues.push(format!("{name} weight must be finite and >= 0, got {value}"));
            }
        }
        issues
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is checked finite and non-negative, then rounded"
)]
pub(crate) fn to_milli(weight: f64) -> u64 {
    if weight.is_finite() && weight > 0.0 {
        (weight * COST_SCALE).round() as u64
    } else {
        0
    }
}

/// Cost weights in integer milli-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FixedWeights {
    unit_length: u64,
    bend: u64,
    support: u64,
}

impl FixedWeights {
    /// Returns the per-move weight.
    #[must_use]
    pub const fn unit_length(&self) -> u64 {
        self.unit_length
    }

    /// Returns the per-bend weight.
    #[must_use]
    pub const fn bend(&self) -> u64 {
        self.bend
    }

    /// Returns the per-unsupported-cell weight.
    #[must_use]
    pub const fn support(&self) -> u64 {
        self.support
    }

    /// Cost of one move that may bend and may enter an unsupported cell.
    #[must_use]
    pub const fn step(&self, bends: bool, unsupported: bool) -> u64 {
        let mut cost = self.unit_length;
        if bends {
            cost = cost.saturating_add(self.bend);
        }
        if unsupported {
            cost = cost.saturating_add(self.support);
        }
        cost
    }
}

/// Measured cost components of a path.
///
/// # Example
///
/// ```
/// use pipe_types::PathCost;
///
/// let total = PathCost::new(4, 1, 0) + PathCost::new(2, 0, 2);
/// assert_eq!(total, PathCost::new(6, 1, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathCost {
    /// Number of unit moves.
    length: u32,
    /// Number of direction changes.
    bends: u32,
    /// Number of interior cells without structural support.
    unsupported: u32,
}

impl PathCost {
    /// Creates a cost from its three counts.
    #[must_use]
    pub const fn new(length: u32, bends: u32, unsupported: u32) -> Self {
        Self {
            length,
            bends,
            unsupported,
        }
    }

    /// Measures a path against an environment.
    ///
    /// Start and goal cells connect to equipment and always count as
    /// supported, so only interior cells can be unsupported.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_types::{CellPath, PathCost};
    /// use pipe_grid::{Cell, GridBounds, GridEnvironment};
    ///
    /// let env = GridEnvironment::new(GridBounds::from_size(5, 5, 5).unwrap());
    /// // up, across at z=1 (unsupported), and back down
    /// let path = CellPath::new(vec![
    ///     Cell::new(0, 0, 0),
    ///     Cell::new(0, 0, 1),
    ///     Cell::new(1, 0, 1),
    ///     Cell::new(1, 0, 0),
    /// ]);
    /// assert_eq!(PathCost::measure(&path, &env), PathCost::new(3, 2, 2));
    /// ```
    #[must_use]
    pub fn measure(path: &CellPath, env: &GridEnvironment) -> Self {
        let cells = path.cells();
        let interior = if cells.len() > 2 {
            &cells[1..cells.len() - 1]
        } else {
            &[]
        };
        let unsupported = interior.iter().filter(|c| !env.is_supported(**c)).count();
        Self {
            length: saturating_u32(path.moves()),
            bends: saturating_u32(path.bends()),
            unsupported: saturating_u32(unsupported),
        }
    }

    /// Returns the number of unit moves.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Returns the number of bends.
    #[must_use]
    pub const fn bends(&self) -> u32 {
        self.bends
    }

    /// Returns the number of unsupported cells.
    #[must_use]
    pub const fn unsupported(&self) -> u32 {
        self.unsupported
    }

    /// Computes the weighted total.
    #[must_use]
    pub fn weighted(&self, weights: &CostWeights) -> f64 {
        f64::from(self.length) * weights.unit_length()
            + f64::from(self.bends) * weights.bend()
            + f64::from(self.unsupported) * weights.support()
    }

    /// Computes the weighted total in milli-units.
    #[must_use]
    pub fn fixed(&self, weights: &FixedWeights) -> u64 {
        u64::from(self.length)
            .saturating_mul(weights.unit_length())
            .saturating_add(u64::from(self.bends).saturating_mul(weights.bend()))
            .saturating_add(u64::from(self.unsupported).saturating_mul(weights.support()))
    }
}

impl Add for PathCost {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            length: self.length.saturating_add(other.length),
            bends: self.bends.saturating_add(other.bends),
            unsupported: self.unsupported.saturating_add(other.unsupported),
        }
    }
}

impl std::iter::Sum for PathCost {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pipe_grid::{Cell, GridBounds};

    #[test]
    fn test_weighted_cost() {
        let cost = PathCost::new(8, 3, 2);
        assert_relative_eq!(cost.weighted(&CostWeights::default()), 15.0);
        assert_relative_eq!(cost.weighted(&CostWeights::length_only()), 8.0);
    }

    #[test]
    fn test_fixed_matches_weighted() {
        let weights = CostWeights::default().with_support(0.25);
        let cost = PathCost::new(11, 4, 7);
        let fixed = cost.fixed(&weights.to_fixed());
        assert_eq!(fixed, 20_750);
        assert_relative_eq!(cost.weighted(&weights), 20.75);
    }

    #[test]
    fn test_step_cost() {
        let fixed = CostWeights::default().to_fixed();
        assert_eq!(fixed.step(false, false), 1000);
        assert_eq!(fixed.step(true, false), 3000);
        assert_eq!(fixed.step(true, true), 3500);
    }

    #[test]
    fn test_validate_rejects_negative() {
        let weights = CostWeights::default().with_bend(-1.0).with_support(f64::NAN);
        let issues = weights.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("bend"));
        assert_eq!(weights.to_fixed().bend(), 0);
    }

    #[test]
    fn test_measure_single_cell_is_free() {
        let env = GridEnvironment::new(GridBounds::from_size(3, 3, 3).unwrap());
        let path = CellPath::single(Cell::new(1, 1, 2));
        assert_eq!(PathCost::measure(&path, &env), PathCost::default());
    }

    #[test]
    fn test_measure_counts_hanging_cells() {
        let env = GridEnvironment::new(GridBounds::from_size(5, 5, 5).unwrap());
        let path = CellPath::new((0..5).map(|x| Cell::new(x, 2, 3)).collect());
        let cost = PathCost::measure(&path, &env);
        assert_eq!(cost, PathCost::new(4, 0, 3));
    }

    #[test]
    fn test_sum() {
        let total: PathCost = [PathCost::new(1, 1, 1), PathCost::new(2, 0, 3)]
            .into_iter()
            .sum();
        assert_eq!(total, PathCost::new(3, 1, 4));
    }
}
