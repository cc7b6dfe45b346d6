//! Clearance rules between pipes of different diameter classes.
//!
//! Each diameter class has a clearance radius in cells. Two pipes of
//! classes `a` and `b` must keep a separation of `radius(a) + radius(b)`:
//! two of their cells conflict when their Chebyshev distance is at most that
//! separation. A separation of zero therefore only forbids sharing a cell.

use std::collections::BTreeMap;

use pipe_grid::Cell;

use crate::pipe::DiameterClass;

/// Clearance radius per diameter class.
///
/// Classes without an explicit entry use the fallback radius. A table
/// built with [`ClearanceTable::strict`] has no fallback and reports
/// unknown classes as `None`.
///
/// # Example
///
/// ```
/// use pipe_types::{ClearanceTable, DiameterClass};
///
/// let small = DiameterClass::new(0);
/// let large = DiameterClass::new(3);
/// let table = ClearanceTable::new().with_radius(large, 2);
///
/// assert_eq!(table.radius(small), Some(0));
/// assert_eq!(table.separation(small, large), Some(2));
/// assert_eq!(table.separation(large, large), Some(4));
///
/// let strict = ClearanceTable::strict().with_radius(small, 1);
/// assert_eq!(strict.radius(large), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClearanceTable {
    radii: BTreeMap<DiameterClass, u32>,
    fallback: Option<u32>,
}

impl ClearanceTable {
    /// Creates a table where every class has radius zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            radii: BTreeMap::new(),
            fallback: Some(0),
        }
    }

    /// Creates a table that only knows explicitly listed classes.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            radii: BTreeMap::new(),
            fallback: None,
        }
    }

    /// Sets the radius of one class.
    #[must_use]
    pub fn with_radius(mut self, class: DiameterClass, radius: u32) -> Self {
        self.radii.insert(class, radius);
        self
    }

    /// Sets the radius used for classes without an explicit entry.
    #[must_use]
    pub const fn with_fallback(mut self, radius: Option<u32>) -> Self {
        self.fallback = radius;
        self
    }

    /// Returns the clearance radius of a class.
    #[must_use]
    pub fn radius(&self, class: DiameterClass) -> Option<u32> {
        self.radii.get(&class).copied().or(self.fallback)
    }

    /// Returns the minimum separation between two classes.
    #[must_use]
    pub fn separation(&self, a: DiameterClass, b: DiameterClass) -> Option<u32> {
        Some(self.radius(a)?.saturating_add(self.radius(b)?))
    }

    /// Returns the largest radius in the table.
    #[must_use]
    pub fn max_radius(&self) -> u32 {
        self.radii
            .values()
            .copied()
            .chain(self.fallback)
            .max()
            .unwrap_or(0)
    }

    /// Returns `true` if two cells are too close for the given separation.
    ///
    /// # Example
    ///
    /// ```
    /// use pipe_types::ClearanceTable;
    /// use pipe_grid::Cell;
    ///
    /// let a = Cell::new(0, 0, 0);
    /// assert!(ClearanceTable::violates(a, a, 0));
    /// assert!(!ClearanceTable::violates(a, Cell::new(1, 0, 0), 0));
    /// assert!(ClearanceTable::violates(a, Cell::new(1, 1, 1), 1));
    /// ```
    #[must_use]
    pub fn violates(a: Cell, b: Cell, separation: u32) -> bool {
        a.chebyshev_distance(b) <= separation
    }
}

impl Default for ClearanceTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_radius() {
        let table = ClearanceTable::new().with_fallback(Some(1));
        assert_eq!(table.radius(DiameterClass::new(9)), Some(1));
        assert_eq!(table.max_radius(), 1);
    }

    #[test]
    fn test_strict_unknown_class() {
        let table = ClearanceTable::strict().with_radius(DiameterClass::new(1), 2);
        assert_eq!(table.separation(DiameterClass::new(1), DiameterClass::new(2)), None);
        assert_eq!(table.max_radius(), 2);
    }

    #[test]
    fn test_separation_is_symmetric() {
        let table = ClearanceTable::new()
            .with_radius(DiameterClass::new(1), 1)
            .with_radius(DiameterClass::new(2), 3);
        let (a, b) = (DiameterClass::new(1), DiameterClass::new(2));
        assert_eq!(table.separation(a, b), table.separation(b, a));
        assert_eq!(table.separation(a, b), Some(4));
    }
}
