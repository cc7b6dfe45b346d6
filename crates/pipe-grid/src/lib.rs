//! Discrete 3D grid environment for pipe routing.
//!
//! This crate provides the static world model every pipe planner runs
//! against:
//!
//! - [`Cell`] - Integer grid coordinates with Manhattan/Chebyshev metrics
//! - [`Direction`] - The six axis-aligned unit moves a pipe can make
//! - [`GridBounds`] - Axis-aligned inclusive bounds in grid space
//! - [`GridEnvironment`] - Blocked cells (equipment) and support information
//! - [`SupportRule`] - Which structural conditions count as pipe support
//!
//! # Layer 0 Crate
//!
//! This crate has no algorithmic dependencies. The environment is built once
//! with consuming `with_*` builders and is then shared read-only, so it can be
//! handed to any number of planners running in parallel.
//!
//! # Coordinate Systems
//!
//! The grid uses a **right-handed coordinate system**:
//! - X: width (left/right)
//! - Y: depth (front/back)
//! - Z: height (up/down); `bounds.min.z` is the floor
//!
//! # Example
//!
//! ```
//! use pipe_grid::{Cell, GridBounds, GridEnvironment};
//!
//! let bounds = GridBounds::from_size(20, 20, 10).unwrap();
//! let env = GridEnvironment::new(bounds)
//!     // a pump skid
//!     .with_blocked_box(Cell::new(5, 5, 0), Cell::new(8, 7, 3))
//!     // a pipe rack at height 6
//!     .with_support_cells((0..20).map(|x| Cell::new(x, 10, 6)));
//!
//! assert!(env.is_blocked(Cell::new(6, 6, 2)));
//! assert!(env.is_supported(Cell::new(12, 10, 6)));
//! assert!(env.check_endpoint(Cell::new(0, 0, 0)).is_ok());
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization for all types

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cell;
mod error;
mod grid;

pub use cell::{Cell, Direction};
pub use error::GridError;
pub use grid::{GridBounds, GridBoundsIter, GridEnvironment, SupportRule};
