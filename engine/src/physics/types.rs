//! Physics type re-exports from glam
//!
//! Core 2D math types used throughout the physics seam, plus the planar
//! pose helper shared by cells and bodies.

pub use glam::Vec2;

use serde::{Deserialize, Serialize};

/// Position and orientation of a body in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2 {
    pub position: Vec2,
    /// Rotation in radians, positive turning +x toward +y
    pub rotation: f32,
}

impl Pose2 {
    pub const IDENTITY: Pose2 = Pose2 {
        position: Vec2::ZERO,
        rotation: 0.0,
    };

    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }

    /// Local point to world space.
    #[inline]
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        Vec2::from_angle(self.rotation).rotate(local) + self.position
    }

    /// Local direction to world space (no translation).
    #[inline]
    pub fn transform_vector(&self, local: Vec2) -> Vec2 {
        Vec2::from_angle(self.rotation).rotate(local)
    }

    /// World point to this pose's local frame.
    #[inline]
    pub fn inverse_transform_point(&self, world: Vec2) -> Vec2 {
        Vec2::from_angle(-self.rotation).rotate(world - self.position)
    }
}
