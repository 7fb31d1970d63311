//! Simulation Configuration
//!
//! Every tunable of a session in one serde struct. All fields default, so a
//! JSON file only needs the values it changes:
//!
//! ```json
//! { "cell_size": 0.4, "magnet": { "max_range": 2.5 }, "layout": [{ "q": 0, "r": 0 }] }
//! ```

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::assembly::Layout;
use crate::game::cell::CellShape;
use crate::game::magnet::MagnetConfig;
use crate::physics::{FixedStepper, JointKind, WorldConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Static ground box used as the anchor reference.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub enabled: bool,
    pub position: Vec2,
    pub half_extents: Vec2,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position: Vec2::new(0.0, 8.0),
            half_extents: Vec2::new(50.0, 0.5),
        }
    }
}

/// Mass properties of every cell body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            linear_damping: 0.5,
            angular_damping: 0.5,
        }
    }
}

/// Link creation rules.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Allowed face separation as a fraction of the smaller cell size
    pub tolerance_ratio: f32,
    /// Joint used by `create_link_between_blocks`
    pub default_kind: JointKind,
    /// Hinge motor speed for `MotorState::Forward` (rad/s)
    pub hinge_motor_speed: f32,
    pub hinge_motor_max_torque: f32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            tolerance_ratio: 0.25,
            default_kind: JointKind::Rigid,
            hinge_motor_speed: 2.0,
            hinge_motor_max_torque: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Cell circumradius; also the hex grid size
    pub cell_size: f32,
    pub cell_shape: CellShape,
    pub fixed_time_step: f32,
    pub max_steps_per_frame: u32,
    pub gravity: Vec2,
    pub solver_iterations: u32,
    pub ground: GroundConfig,
    pub body: BodyConfig,
    pub magnet: MagnetConfig,
    pub link: LinkConfig,
    /// Layout built by `Simulation::reset`; `None` starts empty
    pub layout: Option<Layout>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cell_size: 0.5,
            cell_shape: CellShape::Hexagon,
            fixed_time_step: FixedStepper::DEFAULT_STEP,
            max_steps_per_frame: 8,
            gravity: Vec2::new(0.0, 9.8),
            solver_iterations: 8,
            ground: GroundConfig::default(),
            body: BodyConfig::default(),
            magnet: MagnetConfig::default(),
            link: LinkConfig::default(),
            layout: None,
        }
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be zero or positive, got {value}"
        )))
    }
}

impl SimulationConfig {
    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cell_size", self.cell_size)?;
        positive("fixed_time_step", self.fixed_time_step)?;
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "max_steps_per_frame must be at least 1".into(),
            ));
        }
        if self.solver_iterations == 0 {
            return Err(ConfigError::Invalid(
                "solver_iterations must be at least 1".into(),
            ));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".into()));
        }
        if self.ground.enabled {
            positive("ground.half_extents.x", self.ground.half_extents.x)?;
            positive("ground.half_extents.y", self.ground.half_extents.y)?;
        }
        positive("body.mass", self.body.mass)?;
        non_negative("body.linear_damping", self.body.linear_damping)?;
        non_negative("body.angular_damping", self.body.angular_damping)?;
        non_negative("magnet.base_force", self.magnet.base_force)?;
        positive("magnet.max_range", self.magnet.max_range)?;
        positive("magnet.min_distance", self.magnet.min_distance)?;
        positive("magnet.edge_penalty", self.magnet.edge_penalty)?;
        non_negative("link.tolerance_ratio", self.link.tolerance_ratio)?;
        non_negative("link.hinge_motor_speed", self.link.hinge_motor_speed)?;
        non_negative("link.hinge_motor_max_torque", self.link.hinge_motor_max_torque)?;

        // Triangles on the hex grid never share a face, so a layout link
        // between them can only fail the face tolerance check.
        if self.cell_shape == CellShape::Triangle {
            if let Some(index) = self
                .layout
                .iter()
                .flat_map(|layout| layout.iter())
                .position(|entry| !entry.neighbors.is_empty())
            {
                return Err(ConfigError::Invalid(format!(
                    "layout entry {index} lists neighbors, but triangle cells cannot be linked on the hex grid"
                )));
            }
        }
        Ok(())
    }

    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            gravity: self.gravity,
            solver_iterations: self.solver_iterations,
        }
    }

    pub fn stepper(&self) -> FixedStepper {
        FixedStepper::new(self.fixed_time_step, self.max_steps_per_frame)
    }
}
