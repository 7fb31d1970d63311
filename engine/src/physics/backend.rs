//! Physics Backend Contract
//!
//! Everything the assembly and the force engine need from a rigid-body
//! engine: bodies with convex polygon fixtures, force application at a world
//! point, pose access, fixed-step advance, and rigid/hinge joints anchored in
//! body-local space.
//!
//! [`PhysicsWorld`](super::world::PhysicsWorld) is the in-crate
//! implementation; hosts with a full engine implement this trait instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::types::Pose2;

/// Opaque handle to a body owned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

/// Opaque handle to a joint owned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointHandle(pub u32);

/// Static bodies never move; dynamic bodies integrate forces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Static,
    #[default]
    Dynamic,
}

/// Everything needed to create a body.
#[derive(Clone, Debug)]
pub struct BodyDesc {
    pub pose: Pose2,
    pub kind: BodyKind,
    /// Convex polygon in body-local space, counter-clockwise
    pub polygon: Vec<Vec2>,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl BodyDesc {
    /// Dynamic body with a unit mass and the given fixture.
    pub fn dynamic(pose: Pose2, polygon: Vec<Vec2>) -> Self {
        Self {
            pose,
            kind: BodyKind::Dynamic,
            polygon,
            mass: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    /// Immovable body (ground, walls).
    pub fn fixed(pose: Pose2, polygon: Vec<Vec2>) -> Self {
        Self {
            pose,
            kind: BodyKind::Static,
            polygon,
            mass: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }
}

/// Motor driving the relative angular velocity of a hinge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HingeMotor {
    /// Target relative angular velocity (rad/s), body B relative to body A
    pub speed: f32,
    /// Torque limit the motor may exert
    pub max_torque: f32,
}

/// Joint flavour, the one link abstraction used by the assembly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum JointKind {
    /// Weld: fixes relative position and orientation.
    #[default]
    Rigid,
    /// Revolute: pins the anchors, leaves relative rotation free.
    Hinge { motor: Option<HingeMotor> },
}

impl JointKind {
    pub fn is_hinge(&self) -> bool {
        matches!(self, JointKind::Hinge { .. })
    }
}

/// Everything needed to create a joint between two bodies.
#[derive(Clone, Copy, Debug)]
pub struct JointDesc {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Anchor in body A's local frame
    pub local_anchor_a: Vec2,
    /// Anchor in body B's local frame
    pub local_anchor_b: Vec2,
    pub kind: JointKind,
    /// Whether the two joined bodies may still collide with each other
    pub collide_connected: bool,
}

/// Rigid-body engine operations consumed by the core.
pub trait PhysicsBackend {
    /// Creates a body and returns its handle.
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle;

    /// Destroys a body and every joint attached to it.
    fn remove_body(&mut self, body: BodyHandle) -> bool;

    /// Immovable reference body used for ground anchors, if the world has one.
    fn ground_body(&self) -> Option<BodyHandle>;

    fn body_pose(&self, body: BodyHandle) -> Option<Pose2>;

    /// Teleports a body; velocities are left untouched.
    fn set_body_pose(&mut self, body: BodyHandle, pose: Pose2) -> bool;

    /// Accumulates `force` at `world_point` for the next step, inducing torque
    /// proportional to `(world_point - center) x force`.
    fn apply_force(&mut self, body: BodyHandle, force: Vec2, world_point: Vec2);

    /// Creates a joint; `None` if either body is unknown.
    fn create_joint(&mut self, desc: &JointDesc) -> Option<JointHandle>;

    fn remove_joint(&mut self, joint: JointHandle) -> bool;

    /// Whether `joint` is still alive. Removing a body drops its joints.
    fn has_joint(&self, joint: JointHandle) -> bool;

    /// Replaces the motor on a hinge joint. Returns `false` for rigid or
    /// unknown joints.
    fn set_hinge_motor(&mut self, joint: JointHandle, motor: Option<HingeMotor>) -> bool;

    /// Advances the simulation by a fixed `dt`.
    fn step(&mut self, dt: f32);

    /// Converts a world point into `body`'s local frame.
    fn local_point(&self, body: BodyHandle, world: Vec2) -> Option<Vec2> {
        self.body_pose(body).map(|pose| pose.inverse_transform_point(world))
    }

    /// Converts a point in `body`'s local frame to world space.
    fn world_point(&self, body: BodyHandle, local: Vec2) -> Option<Vec2> {
        self.body_pose(body).map(|pose| pose.transform_point(local))
    }
}
