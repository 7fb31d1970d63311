//! Magnet Module
//!
//! The polarity force engine.

pub mod engine;

pub use engine::{ForcePassStats, MagnetConfig, MagnetForceEngine, PointInteraction};
