//! Simulation
//!
//! Owns a physics backend together with the assembly and the force engine,
//! and drives them at a fixed timestep. Every step applies one polarity
//! force pass and then advances the backend by one fixed `dt`.
//!
//! Structural edits (adding, removing, linking cells) go through
//! [`Simulation::edit`], which borrows the whole simulation mutably, so they
//! can only ever happen between steps.

use tracing::{info, trace};

use crate::physics::{FixedStepper, PhysicsBackend, PhysicsWorld, SimulationState};

use super::assembly::{AssemblyManager, Layout, LayoutReport, LinkError, MotorState};
use super::cell::CellId;
use super::config::{ConfigError, SimulationConfig};
use super::magnet::{ForcePassStats, MagnetForceEngine};

pub struct Simulation<P: PhysicsBackend> {
    physics: P,
    assembly: AssemblyManager,
    magnets: MagnetForceEngine,
    stepper: FixedStepper,
    state: SimulationState,
    layout: Layout,
    steps: u64,
    last_pass: ForcePassStats,
    last_report: LayoutReport,
}

impl Simulation<PhysicsWorld> {
    /// Validates `config`, builds the in-crate world it describes (ground
    /// included) and populates it from the configured layout.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut world = PhysicsWorld::with_config(config.world_config());
        if config.ground.enabled {
            world.create_ground(config.ground.position, config.ground.half_extents);
        }
        let layout = config.layout.clone().unwrap_or_default();
        let mut sim = Simulation::new(world, config, layout);
        sim.reset();
        Ok(sim)
    }
}

impl<P: PhysicsBackend> Simulation<P> {
    /// Wraps an existing backend. Nothing is built until [`reset`](Self::reset).
    pub fn new(physics: P, config: &SimulationConfig, layout: Layout) -> Self {
        Self {
            physics,
            assembly: AssemblyManager::from_config(config),
            magnets: MagnetForceEngine::new(config.magnet),
            stepper: config.stepper(),
            state: SimulationState::Stopped,
            layout,
            steps: 0,
            last_pass: ForcePassStats::default(),
            last_report: LayoutReport::default(),
        }
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn assembly(&self) -> &AssemblyManager {
        &self.assembly
    }

    pub fn magnets(&self) -> &MagnetForceEngine {
        &self.magnets
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Replaces the layout used by the next [`reset`](Self::reset).
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    /// Total fixed steps since the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn last_pass(&self) -> ForcePassStats {
        self.last_pass
    }

    /// Report of the most recent [`reset`](Self::reset).
    pub fn layout_report(&self) -> &LayoutReport {
        &self.last_report
    }

    pub fn stepper(&self) -> &FixedStepper {
        &self.stepper
    }

    /// Mutable access for structural edits between steps.
    pub fn edit(&mut self) -> (&mut AssemblyManager, &mut P) {
        (&mut self.assembly, &mut self.physics)
    }

    fn set_state(&mut self, state: SimulationState) {
        if self.state != state {
            info!(from = ?self.state, to = ?state, "simulation state changed");
            self.state = state;
        }
    }

    pub fn start(&mut self) {
        self.set_state(SimulationState::Running);
    }

    pub fn pause(&mut self) {
        if self.state == SimulationState::Running {
            self.set_state(SimulationState::Paused);
        }
    }

    /// Stops playback and drops any accumulated frame time.
    pub fn stop(&mut self) {
        self.set_state(SimulationState::Stopped);
        self.stepper.reset();
    }

    /// Stops, clears and rebuilds the assembly from the layout.
    pub fn reset(&mut self) -> LayoutReport {
        self.stop();
        self.steps = 0;
        self.last_pass = ForcePassStats::default();
        self.last_report = self.assembly.initialize(&mut self.physics, &self.layout);
        self.last_report.clone()
    }

    /// Runs one force pass and one physics step, whatever the state.
    pub fn step_once(&mut self) -> ForcePassStats {
        self.assembly.prune_stale_joints(&self.physics);
        let stats = self.magnets.apply(self.assembly.cells(), &mut self.physics);
        self.physics.step(self.stepper.step());
        self.steps += 1;
        self.last_pass = stats;
        stats
    }

    /// Feeds a frame delta to the stepper and runs the resulting steps.
    /// Returns the number of steps run; always zero unless running.
    pub fn update(&mut self, frame_dt: f32) -> usize {
        if self.state != SimulationState::Running {
            return 0;
        }
        let steps = self.stepper.advance(frame_dt);
        for _ in 0..steps {
            self.step_once();
        }
        trace!(steps, total = self.steps, "frame advanced");
        steps as usize
    }

    /// Drives a hinge link between two cells.
    pub fn set_motor(&mut self, a: CellId, b: CellId, state: MotorState) -> Result<(), LinkError> {
        self.assembly.set_hinge_motor(&mut self.physics, a, b, state)
    }
}
