//! Reference Physics World
//!
//! A small 2D rigid-body world implementing [`PhysicsBackend`]:
//! - Force and torque accumulation at world points
//! - Gravity and linear/angular damping
//! - Semi-implicit integration with a fixed `dt`
//! - Position-based weld and hinge joints, hinge motors
//!
//! There is no collision detection. Bodies only interact through joints and
//! whatever forces the caller applies. Screen convention: +y points down, so
//! the default gravity is `(0, 9.8)`.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::backend::{
    BodyDesc, BodyHandle, BodyKind, HingeMotor, JointDesc, JointHandle, JointKind, PhysicsBackend,
};
use super::types::Pose2;

/// Below this separation a point constraint counts as satisfied.
const POSITION_SLOP: f32 = 1e-6;

/// World tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Gravity acceleration (m/s²)
    pub gravity: Vec2,
    /// Joint relaxation passes per step
    pub solver_iterations: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 9.8),
            solver_iterations: 8,
        }
    }
}

/// A body owned by the world.
#[derive(Clone, Debug)]
pub struct RigidBody {
    pub pose: Pose2,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub kind: BodyKind,
    pub linear_damping: f32,
    pub angular_damping: f32,
    inv_mass: f32,
    inv_inertia: f32,
    force: Vec2,
    torque: f32,
    polygon: Vec<Vec2>,
}

impl RigidBody {
    fn from_desc(desc: &BodyDesc) -> Self {
        let (inv_mass, inv_inertia) = match desc.kind {
            BodyKind::Static => (0.0, 0.0),
            BodyKind::Dynamic => {
                let mass = desc.mass.max(f32::EPSILON);
                let inertia = polygon_inertia(&desc.polygon, mass).max(f32::EPSILON);
                (1.0 / mass, 1.0 / inertia)
            }
        };

        Self {
            pose: desc.pose,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            kind: desc.kind,
            linear_damping: desc.linear_damping,
            angular_damping: desc.angular_damping,
            inv_mass,
            inv_inertia,
            force: Vec2::ZERO,
            torque: 0.0,
            polygon: desc.polygon.clone(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn mass(&self) -> f32 {
        if self.inv_mass > 0.0 { 1.0 / self.inv_mass } else { 0.0 }
    }

    pub fn inertia(&self) -> f32 {
        if self.inv_inertia > 0.0 { 1.0 / self.inv_inertia } else { 0.0 }
    }

    /// Force accumulated since the last step.
    pub fn accumulated_force(&self) -> Vec2 {
        self.force
    }

    /// Torque accumulated since the last step.
    pub fn accumulated_torque(&self) -> f32 {
        self.torque
    }

    pub fn polygon(&self) -> &[Vec2] {
        &self.polygon
    }
}

/// A joint owned by the world.
#[derive(Clone, Copy, Debug)]
pub struct Joint {
    pub desc: JointDesc,
    /// Relative rotation (B minus A) captured at creation; welds hold it.
    pub reference_angle: f32,
}

/// Moment of inertia about the local origin for a polygon of uniform density.
fn polygon_inertia(polygon: &[Vec2], mass: f32) -> f32 {
    let n = polygon.len();
    if n < 3 {
        return 0.5 * mass;
    }

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..n {
        let p0 = polygon[i];
        let p1 = polygon[(i + 1) % n];
        let cross = p0.perp_dot(p1).abs();
        numerator += cross * (p0.dot(p0) + p0.dot(p1) + p1.dot(p1));
        denominator += cross;
    }

    if denominator <= f32::EPSILON {
        return 0.5 * mass;
    }
    mass * numerator / (6.0 * denominator)
}

/// In-crate rigid-body world.
pub struct PhysicsWorld {
    pub config: WorldConfig,
    bodies: BTreeMap<BodyHandle, RigidBody>,
    joints: BTreeMap<JointHandle, Joint>,
    ground: Option<BodyHandle>,
    next_body: u32,
    next_joint: u32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            config,
            bodies: BTreeMap::new(),
            joints: BTreeMap::new(),
            ground: None,
            next_body: 0,
            next_joint: 0,
        }
    }

    /// Creates the static ground box and makes it the anchor reference.
    ///
    /// Replaces any previous ground body.
    pub fn create_ground(&mut self, position: Vec2, half_extents: Vec2) -> BodyHandle {
        if let Some(old) = self.ground.take() {
            self.remove_body(old);
        }
        let polygon = vec![
            Vec2::new(-half_extents.x, -half_extents.y),
            Vec2::new(half_extents.x, -half_extents.y),
            Vec2::new(half_extents.x, half_extents.y),
            Vec2::new(-half_extents.x, half_extents.y),
        ];
        let handle = self.create_body(&BodyDesc::fixed(Pose2::new(position, 0.0), polygon));
        self.ground = Some(handle);
        handle
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(&handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&handle)
    }

    pub fn joint(&self, handle: JointHandle) -> Option<&Joint> {
        self.joints.get(&handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn joints(&self) -> impl Iterator<Item = (&JointHandle, &Joint)> {
        self.joints.iter()
    }

    /// Removes every body and joint, including the ground.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.joints.clear();
        self.ground = None;
    }

    fn apply_motors(&mut self, dt: f32) {
        for joint in self.joints.values() {
            let JointKind::Hinge { motor: Some(motor) } = joint.desc.kind else {
                continue;
            };
            let (Some(a), Some(b)) = (
                self.bodies.get(&joint.desc.body_a),
                self.bodies.get(&joint.desc.body_b),
            ) else {
                continue;
            };

            let w = a.inv_inertia + b.inv_inertia;
            if w <= 0.0 {
                continue;
            }
            let relative = b.angular_velocity - a.angular_velocity;
            let limit = motor.max_torque * dt;
            let impulse = ((motor.speed - relative) / w).clamp(-limit, limit);
            let (dwa, dwb) = (-a.inv_inertia * impulse, b.inv_inertia * impulse);

            if let Some(a) = self.bodies.get_mut(&joint.desc.body_a) {
                a.angular_velocity += dwa;
            }
            if let Some(b) = self.bodies.get_mut(&joint.desc.body_b) {
                b.angular_velocity += dwb;
            }
        }
    }
}

/// Mass data copied out of a body for one constraint solve.
#[derive(Clone, Copy)]
struct SolverBody {
    pose: Pose2,
    inv_mass: f32,
    inv_inertia: f32,
}

impl SolverBody {
    fn of(body: &RigidBody) -> Self {
        Self {
            pose: body.pose,
            inv_mass: body.inv_mass,
            inv_inertia: body.inv_inertia,
        }
    }
}

/// One relaxation pass over a joint: pin the anchors, and for welds the
/// relative angle.
fn solve_joint(bodies: &mut BTreeMap<BodyHandle, RigidBody>, joint: &Joint) {
    let (Some(a), Some(b)) = (
        bodies.get(&joint.desc.body_a).map(SolverBody::of),
        bodies.get(&joint.desc.body_b).map(SolverBody::of),
    ) else {
        return;
    };
    let (mut a, mut b) = (a, b);

    let ra = a.pose.transform_vector(joint.desc.local_anchor_a);
    let rb = b.pose.transform_vector(joint.desc.local_anchor_b);
    let c = (b.pose.position + rb) - (a.pose.position + ra);
    let separation = c.length();

    if separation > POSITION_SLOP {
        let n = c / separation;
        let wa = a.inv_mass + a.inv_inertia * ra.perp_dot(n).powi(2);
        let wb = b.inv_mass + b.inv_inertia * rb.perp_dot(n).powi(2);
        let w = wa + wb;
        if w > 0.0 {
            let p = c / w;
            a.pose.position += p * a.inv_mass;
            a.pose.rotation += a.inv_inertia * ra.perp_dot(p);
            b.pose.position -= p * b.inv_mass;
            b.pose.rotation -= b.inv_inertia * rb.perp_dot(p);
        }
    }

    if joint.desc.kind == JointKind::Rigid {
        let w = a.inv_inertia + b.inv_inertia;
        if w > 0.0 {
            let angle_error = (b.pose.rotation - a.pose.rotation) - joint.reference_angle;
            let d = angle_error / w;
            a.pose.rotation += a.inv_inertia * d;
            b.pose.rotation -= b.inv_inertia * d;
        }
    }

    if let Some(body) = bodies.get_mut(&joint.desc.body_a) {
        body.pose = a.pose;
    }
    if let Some(body) = bodies.get_mut(&joint.desc.body_b) {
        body.pose = b.pose;
    }
}

impl PhysicsBackend for PhysicsWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_body);
        self.next_body = self.next_body.wrapping_add(1);
        self.bodies.insert(handle, RigidBody::from_desc(desc));
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        if self.bodies.remove(&body).is_none() {
            return false;
        }
        self.joints
            .retain(|_, j| j.desc.body_a != body && j.desc.body_b != body);
        if self.ground == Some(body) {
            self.ground = None;
        }
        true
    }

    fn ground_body(&self) -> Option<BodyHandle> {
        self.ground
    }

    fn body_pose(&self, body: BodyHandle) -> Option<Pose2> {
        self.bodies.get(&body).map(|b| b.pose)
    }

    fn set_body_pose(&mut self, body: BodyHandle, pose: Pose2) -> bool {
        match self.bodies.get_mut(&body) {
            Some(b) => {
                b.pose = pose;
                true
            }
            None => false,
        }
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec2, world_point: Vec2) {
        let Some(b) = self.bodies.get_mut(&body) else {
            return;
        };
        if !b.is_dynamic() {
            return;
        }
        b.force += force;
        b.torque += (world_point - b.pose.position).perp_dot(force);
    }

    fn create_joint(&mut self, desc: &JointDesc) -> Option<JointHandle> {
        if desc.body_a == desc.body_b {
            return None;
        }
        let a = self.bodies.get(&desc.body_a)?;
        let b = self.bodies.get(&desc.body_b)?;
        let reference_angle = b.pose.rotation - a.pose.rotation;

        let handle = JointHandle(self.next_joint);
        self.next_joint = self.next_joint.wrapping_add(1);
        self.joints.insert(
            handle,
            Joint {
                desc: *desc,
                reference_angle,
            },
        );
        Some(handle)
    }

    fn remove_joint(&mut self, joint: JointHandle) -> bool {
        self.joints.remove(&joint).is_some()
    }

    fn has_joint(&self, joint: JointHandle) -> bool {
        self.joints.contains_key(&joint)
    }

    fn set_hinge_motor(&mut self, joint: JointHandle, motor: Option<HingeMotor>) -> bool {
        match self.joints.get_mut(&joint) {
            Some(j) if j.desc.kind.is_hinge() => {
                j.desc.kind = JointKind::Hinge { motor };
                true
            }
            _ => false,
        }
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let gravity = self.config.gravity;

        for body in self.bodies.values_mut() {
            if !body.is_dynamic() {
                continue;
            }
            body.linear_velocity += (gravity + body.force * body.inv_mass) * dt;
            body.angular_velocity += body.torque * body.inv_inertia * dt;
            body.linear_velocity *= 1.0 / (1.0 + dt * body.linear_damping);
            body.angular_velocity *= 1.0 / (1.0 + dt * body.angular_damping);
        }

        self.apply_motors(dt);

        let previous: Vec<(BodyHandle, Pose2)> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.is_dynamic())
            .map(|(h, b)| (*h, b.pose))
            .collect();

        for body in self.bodies.values_mut() {
            if !body.is_dynamic() {
                continue;
            }
            body.pose.position += body.linear_velocity * dt;
            body.pose.rotation += body.angular_velocity * dt;
        }

        let joints: Vec<Joint> = self.joints.values().copied().collect();
        for _ in 0..self.config.solver_iterations {
            for joint in &joints {
                solve_joint(&mut self.bodies, joint);
            }
        }

        for (handle, before) in previous {
            if let Some(body) = self.bodies.get_mut(&handle) {
                body.linear_velocity = (body.pose.position - before.position) / dt;
                body.angular_velocity = (body.pose.rotation - before.rotation) / dt;
            }
        }

        for body in self.bodies.values_mut() {
            body.force = Vec2::ZERO;
            body.torque = 0.0;
        }
    }
}
