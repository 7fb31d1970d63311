//! Physics module for the Chainbots engine
//!
//! The assembly and the polarity force engine only talk to rigid bodies
//! through the [`PhysicsBackend`] trait. [`PhysicsWorld`] is the in-crate
//! implementation, built from scratch without an external physics library.
//!
//! # Unit System
//!
//! **1 unit = 1 meter**, screen-style axes (+y down).
//!
//! # Submodules
//!
//! - [`types`] - 2D math types (Vec2 from glam, Pose2)
//! - [`backend`] - The engine contract: bodies, forces, joints, stepping
//! - [`world`] - Reference rigid-body world with weld/hinge joints
//! - [`stepper`] - Fixed-timestep accumulator and playback state

pub mod backend;
pub mod stepper;
pub mod types;
pub mod world;

pub use backend::{
    BodyDesc, BodyHandle, BodyKind, HingeMotor, JointDesc, JointHandle, JointKind, PhysicsBackend,
};
pub use stepper::{FixedStepper, SimulationState};
pub use types::{Pose2, Vec2};
pub use world::{PhysicsWorld, RigidBody, WorldConfig};
