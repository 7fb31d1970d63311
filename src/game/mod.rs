//! Game Module
//!
//! Chainbots systems built on top of the engine: cells and their polarity,
//! the assembly, articulated chainbots, the polarity force engine,
//! configuration and the fixed-step simulation driver.

pub mod assembly;
pub mod cell;
pub mod chainbot;
pub mod config;
pub mod magnet;
pub mod simulation;

pub use assembly::{
    AnchorOutcome, AssemblyError, AssemblyManager, Layout, LayoutEntry, LayoutIssue, LayoutReport,
    LinkError, LinkKey, LinkOutcome, LinkRecord, MotorState,
};
pub use cell::{
    ActivePoint, BlockKind, Cell, CellError, CellId, CellShape, PointKind, Polarity, PolarityState,
    Pose,
};
pub use chainbot::{ChainStructure, Chainbot, ChainbotError, ChainbotMotor, Leg, LegSide};
pub use config::{ConfigError, SimulationConfig};
pub use magnet::{ForcePassStats, MagnetConfig, MagnetForceEngine, PointInteraction};
pub use simulation::Simulation;
