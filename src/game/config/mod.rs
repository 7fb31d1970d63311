//! Config Module
//!
//! Session configuration loaded from JSON.

pub mod simulation_config;

pub use simulation_config::{
    BodyConfig, ConfigError, GroundConfig, LinkConfig, SimulationConfig,
};
