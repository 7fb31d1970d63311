//! Cell Module
//!
//! Cells, their shapes and their polarity state.

pub mod cell;
pub mod polarity;
pub mod shape;

pub use cell::{ActivePoint, BlockKind, Cell, CellError, CellId, Pose};
pub use polarity::{PointKind, Polarity, PolarityState};
pub use shape::{CellShape, MAX_SIDES};
