//! Pipe identity and routing requests.

use std::fmt;

use pipe_grid::Cell;

/// Stable, unique identifier of a pipe.
///
/// Identifiers are totally ordered; the ordering drives every deterministic
/// tie-break in the search (lowest conflicting pair first, default ranks).
///
/// # Example
///
/// ```
/// use pipe_types::PipeId;
///
/// let id = PipeId::new(3);
/// assert_eq!(id.get(), 3);
/// assert_eq!(id.to_string(), "P3");
/// assert!(PipeId::new(1) < id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipeId(u32);

impl PipeId {
    /// Creates a pipe identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl From<u32> for PipeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Nominal size class of a pipe.
///
/// The class selects the clearance radius from a
/// [`ClearanceTable`](crate::ClearanceTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiameterClass(u8);

impl DiameterClass {
    /// Creates a diameter class.
    #[must_use]
    pub const fn new(class: u8) -> Self {
        Self(class)
    }

    /// Returns the raw class value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DiameterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.0)
    }
}

/// A single pipe to route: identifier, endpoints and diameter class.
///
/// Created once from the problem instance and never mutated.
///
/// # Example
///
/// ```
/// use pipe_types::{DiameterClass, PipeId, PipeSpec};
/// use pipe_grid::Cell;
///
/// let pipe = PipeSpec::new(PipeId::new(0), Cell::new(0, 0, 0), Cell::new(4, 2, 1))
///     .with_class(DiameterClass::new(2));
///
/// assert_eq!(pipe.class(), DiameterClass::new(2));
/// assert_eq!(pipe.manhattan_length(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipeSpec {
    id: PipeId,
    start: Cell,
    goal: Cell,
    class: DiameterClass,
}

impl PipeSpec {
    /// Creates a pipe of the default diameter class.
    #[must_use]
    pub fn new(id: PipeId, start: Cell, goal: Cell) -> Self {
        Self {
            id,
            start,
            goal,
            class: DiameterClass::default(),
        }
    }

    /// Sets the diameter class.
    #[must_use]
    pub const fn with_class(mut self, class: DiameterClass) -> Self {
        self.class = class;
        self
    }

    /// Returns the pipe identifier.
    #[must_use]
    pub const fn id(&self) -> PipeId {
        self.id
    }

    /// Returns the start cell.
    #[must_use]
    pub const fn start(&self) -> Cell {
        self.start
    }

    /// Returns the goal cell.
    #[must_use]
    pub const fn goal(&self) -> Cell {
        self.goal
    }

    /// Returns the diameter class.
    #[must_use]
    pub const fn class(&self) -> DiameterClass {
        self.class
    }

    /// Lower bound on the number of moves the pipe needs.
    #[must_use]
    pub const fn manhattan_length(&self) -> u32 {
        self.start.manhattan_distance(self.goal)
    }
}
