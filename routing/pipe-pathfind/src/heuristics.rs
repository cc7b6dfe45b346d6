//! Heuristic for the single-pipe planner.
//!
//! Only the length component of the cost is estimated. Bends and support
//! penalties are never negative, so leaving them out keeps the estimate a
//! lower bound on the remaining cost.
//!
//! # Example
//!
//! ```
//! use pipe_pathfind::heuristics::compute_heuristic;
//! use pipe_types::CostWeights;
//! use pipe_grid::Cell;
//!
//! let weights = CostWeights::default().to_fixed();
//! let h = compute_heuristic(Cell::new(0, 0, 0), Cell::new(3, 4, 0), &weights);
//! assert_eq!(h, 7_000);  // 7 moves at 1000 milli-units each
//! ```

use pipe_grid::Cell;
use pipe_types::FixedWeights;

/// Computes the admissible cost estimate from `from` to `to` in milli-units.
///
/// Manhattan distance times the per-move weight.
#[must_use]
pub fn compute_heuristic(from: Cell, to: Cell, weights: &FixedWeights) -> u64 {
    u64::from(from.manhattan_distance(to)).saturating_mul(weights.unit_length())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipe_types::CostWeights;

    #[test]
    fn test_zero_at_goal() {
        let weights = CostWeights::default().to_fixed();
        assert_eq!(compute_heuristic(Cell::new(4, 4, 4), Cell::new(4, 4, 4), &weights), 0);
    }

    #[test]
    fn test_ignores_bend_and_support_weights() {
        let a = CostWeights::length_only().to_fixed();
        let b = CostWeights::length_only()
            .with_bend(100.0)
            .with_support(100.0)
            .to_fixed();
        let (from, to) = (Cell::new(-2, 0, 5), Cell::new(2, 3, 0));
        assert_eq!(compute_heuristic(from, to, &a), compute_heuristic(from, to, &b));
        assert_eq!(compute_heuristic(from, to, &a), 12_000);
    }

    #[test]
    fn test_scales_with_unit_length() {
        let weights = CostWeights::default().with_unit_length(2.5).to_fixed();
        assert_eq!(compute_heuristic(Cell::origin(), Cell::new(0, 0, 2), &weights), 5_000);
    }
}
