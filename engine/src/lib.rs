//! Chainbots Engine Library
//!
//! Hex and triangle cells assembled into rigid structures on a 2D physics
//! backend, pushed and pulled by a polarity force field.
//!
//! # Modules
//!
//! - [`hex`] - Axial hex coordinates and the pointy-top pixel basis
//! - [`physics`] - Backend contract, reference rigid-body world, fixed stepper
//! - [`render`] - Flat per-cell instance records
//! - [`game`] - Cells, assembly, chainbots, polarity force engine, config, simulation
//!
//! # Example
//!
//! ```ignore
//! use chainbots_engine::game::{Layout, Simulation, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     layout: Some(Layout::staircase()),
//!     ..Default::default()
//! };
//! let mut sim = Simulation::from_config(&config)?;
//! sim.start();
//! let steps = sim.update(1.0 / 30.0);
//! ```

pub mod hex;
pub mod physics;
pub mod render;

// Game-specific modules (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

pub use hex::{HEX_DIRECTIONS, HexCoordinate};
pub use physics::{PhysicsBackend, PhysicsWorld, Pose2};
