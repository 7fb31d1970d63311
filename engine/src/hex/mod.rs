//! Hex Grid Module
//!
//! Axial coordinate math for the assembly grid.

pub mod coordinate;

pub use coordinate::{HEX_DIRECTIONS, HexCoordinate};
