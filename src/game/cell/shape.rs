//! Cell Shapes
//!
//! Regular polygon outlines for cells. Hexagons are pointy-top to match the
//! axial pixel basis, so edge `i` faces hex direction `i` and neighbouring
//! hex cells share edge midpoints.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Largest supported side count.
pub const MAX_SIDES: usize = 6;

const TRIANGLE_ANGLES: [f32; 3] = [-90.0, 150.0, 30.0];
const HEXAGON_ANGLES: [f32; 6] = [-30.0, 30.0, 90.0, 150.0, 210.0, 270.0];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellShape {
    Triangle,
    #[default]
    Hexagon,
}

impl CellShape {
    pub fn sides(self) -> usize {
        match self {
            CellShape::Triangle => 3,
            CellShape::Hexagon => 6,
        }
    }

    /// Vertex angles in degrees, in vertex order.
    pub fn vertex_angles(self) -> &'static [f32] {
        match self {
            CellShape::Triangle => &TRIANGLE_ANGLES,
            CellShape::Hexagon => &HEXAGON_ANGLES,
        }
    }

    /// Vertex offsets for circumradius `size`.
    pub fn local_vertices(self, size: f32) -> Vec<Vec2> {
        self.vertex_angles()
            .iter()
            .map(|deg| Vec2::from_angle(deg.to_radians()) * size)
            .collect()
    }

    /// Edge midpoints; edge `i` joins vertex `i` and vertex `i + 1`.
    pub fn local_edge_midpoints(self, size: f32) -> Vec<Vec2> {
        let vertices = self.local_vertices(size);
        let n = vertices.len();
        (0..n)
            .map(|i| (vertices[i] + vertices[(i + 1) % n]) * 0.5)
            .collect()
    }
}
