//! Error types for grid construction and queries.

use crate::Cell;

/// Errors that can occur while building or querying a grid environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GridError {
    /// A grid dimension was zero or too large to index.
    #[error("invalid grid dimensions: {x}x{y}x{z}")]
    InvalidDimensions {
        /// Size along X.
        x: u32,
        /// Size along Y.
        y: u32,
        /// Size along Z.
        z: u32,
    },

    /// A cell lies outside the grid bounds.
    #[error("cell {0} is out of bounds")]
    OutOfBounds(Cell),

    /// A cell is permanently blocked by equipment.
    #[error("cell {0} is permanently blocked")]
    Blocked(Cell),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let error = GridError::OutOfBounds(Cell::new(9, 0, 0));
        assert!(error.to_string().contains("(9, 0, 0)"));
        assert!(error.to_string().contains("out of bounds"));

        let error = GridError::InvalidDimensions { x: 0, y: 5, z: 5 };
        assert!(error.to_string().contains("0x5x5"));

        let error = GridError::Blocked(Cell::origin());
        assert!(error.to_string().contains("blocked"));
    }
}
