//! Cell
//!
//! A cell is one building block of an assembly. Its pose either lives in the
//! physics backend (`Pose::Physical`) or is stored locally for visual-only
//! guide cells (`Pose::Visual`). Attachment point offsets are derived from the
//! shape and size once, at construction.

use glam::Vec2;
use thiserror::Error;

use crate::hex::HexCoordinate;
use crate::physics::{BodyHandle, PhysicsBackend, Pose2};

use super::polarity::{PointKind, Polarity, PolarityState};
use super::shape::CellShape;

/// Session-unique cell identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u32);

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a cell's pose lives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pose {
    /// Owned by the physics backend
    Physical(BodyHandle),
    /// Stored on the cell; no body, no forces, no joints
    Visual(Pose2),
}

/// Physical building material vs. visual build guide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Material,
    Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("polarity state has {found} sides but the cell has {expected}")]
    ShapeMismatch { expected: usize, found: usize },
}

/// An attachment point resolved to world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivePoint {
    pub position: Vec2,
    pub polarity: Polarity,
    pub kind: PointKind,
    /// Vertex or edge index on the cell
    pub index: usize,
}

#[derive(Clone, Debug)]
pub struct Cell {
    id: CellId,
    coordinate: Option<HexCoordinate>,
    pose: Pose,
    size: f32,
    shape: CellShape,
    state: PolarityState,
    ground_anchored: bool,
    local_vertices: Vec<Vec2>,
    local_edges: Vec<Vec2>,
}

impl Cell {
    fn with_pose(
        id: CellId,
        coordinate: Option<HexCoordinate>,
        pose: Pose,
        size: f32,
        shape: CellShape,
    ) -> Self {
        Self {
            id,
            coordinate,
            pose,
            size,
            shape,
            state: PolarityState::off(shape),
            ground_anchored: false,
            local_vertices: shape.local_vertices(size),
            local_edges: shape.local_edge_midpoints(size),
        }
    }

    /// Cell backed by an existing physics body.
    pub fn physical(
        id: CellId,
        coordinate: Option<HexCoordinate>,
        body: BodyHandle,
        size: f32,
        shape: CellShape,
    ) -> Self {
        Self::with_pose(id, coordinate, Pose::Physical(body), size, shape)
    }

    /// Visual-only cell at a fixed pose.
    pub fn visual(
        id: CellId,
        coordinate: Option<HexCoordinate>,
        pose: Pose2,
        size: f32,
        shape: CellShape,
    ) -> Self {
        Self::with_pose(id, coordinate, Pose::Visual(pose), size, shape)
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn coordinate(&self) -> Option<HexCoordinate> {
        self.coordinate
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn body(&self) -> Option<BodyHandle> {
        match self.pose {
            Pose::Physical(body) => Some(body),
            Pose::Visual(_) => None,
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self.pose {
            Pose::Physical(_) => BlockKind::Material,
            Pose::Visual(_) => BlockKind::Target,
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn shape(&self) -> CellShape {
        self.shape
    }

    pub fn state(&self) -> PolarityState {
        self.state
    }

    pub fn is_ground_anchored(&self) -> bool {
        self.ground_anchored
    }

    pub(crate) fn set_ground_anchored(&mut self, anchored: bool) {
        self.ground_anchored = anchored;
    }

    pub fn local_vertices(&self) -> &[Vec2] {
        &self.local_vertices
    }

    pub fn local_edges(&self) -> &[Vec2] {
        &self.local_edges
    }

    /// Replaces the whole polarity state.
    pub fn set_state(&mut self, state: PolarityState) -> Result<(), CellError> {
        let expected = self.shape.sides();
        if state.sides() != expected {
            return Err(CellError::ShapeMismatch {
                expected,
                found: state.sides(),
            });
        }
        self.state = state;
        Ok(())
    }

    /// Current world pose; `None` if the backing body no longer exists.
    pub fn world_pose<P: PhysicsBackend + ?Sized>(&self, physics: &P) -> Option<Pose2> {
        match self.pose {
            Pose::Physical(body) => physics.body_pose(body),
            Pose::Visual(pose) => Some(pose),
        }
    }

    /// Moves the cell. Visual cells update in place, physical cells
    /// teleport their body.
    pub fn set_pose<P: PhysicsBackend + ?Sized>(&mut self, physics: &mut P, pose: Pose2) -> bool {
        match &mut self.pose {
            Pose::Physical(body) => physics.set_body_pose(*body, pose),
            Pose::Visual(local) => {
                *local = pose;
                true
            }
        }
    }

    /// Every non-`Off` attachment point in world space for the given pose.
    pub fn active_points(&self, pose: Pose2) -> Vec<ActivePoint> {
        self.state
            .points()
            .filter(|(_, _, polarity)| polarity.is_active())
            .map(|(kind, index, polarity)| {
                let local = match kind {
                    PointKind::Vertex => self.local_vertices[index],
                    PointKind::Edge => self.local_edges[index],
                };
                ActivePoint {
                    position: pose.transform_point(local),
                    polarity,
                    kind,
                    index,
                }
            })
            .collect()
    }

    /// Whether `point` lies inside the cell outline at `pose`. Points on
    /// the boundary count as inside.
    pub fn contains_point(&self, pose: Pose2, point: Vec2) -> bool {
        let local = pose.inverse_transform_point(point);
        let n = self.local_vertices.len();
        let (mut positive, mut negative) = (false, false);
        for i in 0..n {
            let a = self.local_vertices[i];
            let b = self.local_vertices[(i + 1) % n];
            let side = (b - a).perp_dot(local - a);
            positive |= side > 0.0;
            negative |= side < 0.0;
            if positive && negative {
                return false;
            }
        }
        true
    }

    /// World positions of every face (edge midpoint).
    pub fn face_positions(&self, pose: Pose2) -> Vec<Vec2> {
        self.local_edges
            .iter()
            .map(|&local| pose.transform_point(local))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDesc, PhysicsWorld};

    use super::super::polarity::Polarity::{Negative as N, Off as O, Positive as P};

    fn visual_triangle() -> Cell {
        Cell::visual(
            CellId(1),
            None,
            Pose2::new(Vec2::new(2.0, 3.0), 0.0),
            1.0,
            CellShape::Triangle,
        )
    }

    #[test]
    fn test_new_cell_is_all_off() {
        let cell = visual_triangle();
        assert_eq!(cell.state().active_count(), 0);
        assert!(cell.active_points(Pose2::IDENTITY).is_empty());
        assert!(!cell.is_ground_anchored());
        assert_eq!(cell.kind(), BlockKind::Target);
    }

    #[test]
    fn test_active_points_match_active_count() {
        let mut cell = visual_triangle();
        let states = [
            PolarityState::triangle([P, O, O], [O, O, O]),
            PolarityState::triangle([P, N, P], [N, O, P]),
            PolarityState::uniform(CellShape::Triangle, N),
        ];
        for state in states {
            cell.set_state(state).unwrap();
            let pose = Pose2::new(Vec2::new(-1.0, 4.0), 1.3);
            assert_eq!(cell.active_points(pose).len(), state.active_count());
        }
    }

    #[test]
    fn test_active_points_are_rotated_and_translated() {
        let mut cell = visual_triangle();
        cell.set_state(PolarityState::triangle([P, O, O], [O, O, O]))
            .unwrap();
        // Vertex 0 sits at -90° => (0, -1); rotated a quarter turn => (1, 0)
        let pose = Pose2::new(Vec2::new(5.0, 5.0), std::f32::consts::FRAC_PI_2);
        let points = cell.active_points(pose);
        assert_eq!(points.len(), 1);
        assert!((points[0].position - Vec2::new(6.0, 5.0)).length() < 1e-5);
        assert_eq!(points[0].kind, PointKind::Vertex);
        assert_eq!(points[0].polarity, P);
    }

    #[test]
    fn test_set_state_rejects_wrong_shape() {
        let mut cell = visual_triangle();
        let err = cell
            .set_state(PolarityState::off(CellShape::Hexagon))
            .unwrap_err();
        assert_eq!(
            err,
            CellError::ShapeMismatch {
                expected: 3,
                found: 6
            }
        );
    }

    #[test]
    fn test_contains_point() {
        let cell = visual_triangle();
        let pose = cell.world_pose(&PhysicsWorld::new()).unwrap();
        assert!(cell.contains_point(pose, Vec2::new(2.0, 3.0)));
        assert!(cell.contains_point(pose, Vec2::new(2.0, 2.1)));
        assert!(!cell.contains_point(pose, Vec2::new(2.0, 3.6)));
        assert!(!cell.contains_point(pose, Vec2::new(2.5, 2.0)));

        // Half a turn puts the apex below the center
        let flipped = Pose2::new(pose.position, std::f32::consts::PI);
        assert!(cell.contains_point(flipped, Vec2::new(2.0, 3.9)));
        assert!(!cell.contains_point(flipped, Vec2::new(2.0, 2.1)));
    }

    #[test]
    fn test_visual_set_pose_is_local() {
        let mut world = PhysicsWorld::new();
        let mut cell = visual_triangle();
        let target = Pose2::new(Vec2::new(9.0, 9.0), 0.5);
        assert!(cell.set_pose(&mut world, target));
        assert_eq!(cell.world_pose(&world), Some(target));
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_physical_pose_delegates_to_body() {
        let mut world = PhysicsWorld::new();
        let polygon = CellShape::Hexagon.local_vertices(0.5);
        let body = world.create_body(&BodyDesc::dynamic(Pose2::IDENTITY, polygon));
        let mut cell = Cell::physical(CellId(7), None, body, 0.5, CellShape::Hexagon);

        let target = Pose2::new(Vec2::new(1.0, -2.0), 0.25);
        assert!(cell.set_pose(&mut world, target));
        assert_eq!(world.body_pose(body), Some(target));
        assert_eq!(cell.world_pose(&world), Some(target));
        assert_eq!(cell.kind(), BlockKind::Material);
    }
}
