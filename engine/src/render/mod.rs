//! Render Module
//!
//! Render-facing snapshot types. Drawing happens in the host application;
//! the engine only produces flat instance records.

pub mod cell_instances;

pub use cell_instances::{CellInstance, CellInstanceFlags, instance_bytes};
