//! Assembly Manager
//!
//! Owns every cell of a session and the joints between them. Cells are
//! looked up by id and by axial coordinate; links are keyed by the canonical
//! cell pair so each pair is joined at most once.
//!
//! The manager never steps the physics backend. Callers pass the backend in
//! for every structural operation, which keeps edits strictly between steps.
//!
//! # Example
//!
//! ```ignore
//! let mut world = PhysicsWorld::new();
//! world.create_ground(Vec2::new(0.0, 8.0), Vec2::new(50.0, 0.5));
//!
//! let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
//! let report = assembly.initialize(&mut world, &Layout::path(&[(0, 0), (1, 0)], true));
//! assert!(report.issues.is_empty());
//! assert_eq!(assembly.link_count(), 1);
//! ```

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;
use tracing::{debug, info, warn};

use crate::game::cell::{Cell, CellId, CellShape, PolarityState};
use crate::game::config::{BodyConfig, LinkConfig, SimulationConfig};
use crate::hex::{HEX_DIRECTIONS, HexCoordinate};
use crate::physics::{BodyDesc, JointDesc, JointHandle, JointKind, PhysicsBackend, Pose2};
use crate::render::{CellInstance, CellInstanceFlags};

use super::error::{AssemblyError, LayoutIssue, LinkError};
use super::ids::IdAllocator;
use super::layout::Layout;
use super::link::{AnchorOutcome, LinkKey, LinkOutcome, LinkRecord, MotorState};

/// Outcome of [`AssemblyManager::initialize`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutReport {
    /// Cells created, in layout order
    pub cells: Vec<CellId>,
    pub links_created: usize,
    pub anchors_created: usize,
    /// Entries that could not be applied in full
    pub issues: Vec<LayoutIssue>,
}

impl LayoutReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub struct AssemblyManager {
    cell_size: f32,
    cell_shape: CellShape,
    body: BodyConfig,
    link: LinkConfig,
    ids: IdAllocator,
    cells: BTreeMap<CellId, Cell>,
    by_coordinate: HashMap<HexCoordinate, CellId>,
    links: BTreeMap<LinkKey, LinkRecord>,
    anchors: BTreeMap<CellId, JointHandle>,
}

impl AssemblyManager {
    pub fn new(cell_size: f32, cell_shape: CellShape) -> Self {
        Self::with_settings(cell_size, cell_shape, BodyConfig::default(), LinkConfig::default())
    }

    pub fn with_settings(
        cell_size: f32,
        cell_shape: CellShape,
        body: BodyConfig,
        link: LinkConfig,
    ) -> Self {
        Self {
            cell_size,
            cell_shape,
            body,
            link,
            ids: IdAllocator::new(),
            cells: BTreeMap::new(),
            by_coordinate: HashMap::new(),
            links: BTreeMap::new(),
            anchors: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::with_settings(config.cell_size, config.cell_shape, config.body, config.link)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_shape(&self) -> CellShape {
        self.cell_shape
    }

    pub fn link_config(&self) -> &LinkConfig {
        &self.link
    }

    /// World position of a grid coordinate's cell center.
    pub fn world_position(&self, coordinate: HexCoordinate) -> Vec2 {
        coordinate.to_pixel(self.cell_size)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Removes every cell, link and anchor together with their bodies and
    /// joints, and restarts id allocation.
    pub fn clear<P: PhysicsBackend + ?Sized>(&mut self, physics: &mut P) {
        for record in self.links.values() {
            physics.remove_joint(record.joint);
        }
        for joint in self.anchors.values() {
            physics.remove_joint(*joint);
        }
        for cell in self.cells.values() {
            if let Some(body) = cell.body() {
                physics.remove_body(body);
            }
        }
        self.cells.clear();
        self.by_coordinate.clear();
        self.links.clear();
        self.anchors.clear();
        self.ids.reset();
    }

    /// Rebuilds the assembly from `layout`.
    ///
    /// Cells are created first, then anchors and links per entry, so the
    /// resulting joint set does not depend on entry order. Bad entries are
    /// reported and skipped; initialization never aborts.
    pub fn initialize<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        layout: &Layout,
    ) -> LayoutReport {
        self.clear(physics);

        let mut report = LayoutReport::default();
        // Entry index -> created cell
        let mut created: Vec<Option<CellId>> = Vec::with_capacity(layout.len());

        for (index, entry) in layout.iter().enumerate() {
            let coordinate = entry.coordinate();
            if self.by_coordinate.contains_key(&coordinate) {
                warn!(index, %coordinate, "duplicate layout coordinate");
                report
                    .issues
                    .push(LayoutIssue::DuplicateCoordinate { index, coordinate });
                created.push(None);
                continue;
            }
            let id = self.spawn_physical(physics, coordinate);
            report.cells.push(id);
            created.push(Some(id));
        }

        for (index, entry) in layout.iter().enumerate() {
            let Some(id) = created[index] else {
                continue;
            };

            if entry.anchored {
                match self.create_ground_anchor_joint(physics, id) {
                    Ok(AnchorOutcome::Created(_)) => report.anchors_created += 1,
                    Ok(AnchorOutcome::AlreadyAnchored(_)) => {}
                    Err(error) => {
                        warn!(index, %error, "ground anchor rejected");
                        report.issues.push(LayoutIssue::Anchor { index, error });
                    }
                }
            }

            for neighbor in entry.neighbor_coordinates() {
                let Some(&other) = self.by_coordinate.get(&neighbor) else {
                    warn!(index, %neighbor, "layout neighbor does not exist");
                    report
                        .issues
                        .push(LayoutIssue::UnknownNeighbor { index, neighbor });
                    continue;
                };
                match self.create_link_between_blocks(physics, id, other) {
                    Ok(LinkOutcome::Created(_)) => report.links_created += 1,
                    Ok(LinkOutcome::AlreadyLinked(_)) => {}
                    Err(error) => {
                        warn!(index, %neighbor, %error, "layout link rejected");
                        report.issues.push(LayoutIssue::Link {
                            index,
                            neighbor,
                            error,
                        });
                    }
                }
            }
        }

        info!(
            cells = report.cells.len(),
            links = report.links_created,
            anchors = report.anchors_created,
            issues = report.issues.len(),
            "assembly initialized"
        );
        report
    }

    // ========================================================================
    // Cells
    // ========================================================================

    fn body_desc(&self, pose: Pose2, shape: CellShape) -> BodyDesc {
        BodyDesc::dynamic(pose, shape.local_vertices(self.cell_size))
            .with_mass(self.body.mass)
            .with_damping(self.body.linear_damping, self.body.angular_damping)
    }

    fn spawn_physical<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        coordinate: HexCoordinate,
    ) -> CellId {
        let pose = Pose2::new(self.world_position(coordinate), 0.0);
        let body = physics.create_body(&self.body_desc(pose, self.cell_shape));
        let id = self.ids.allocate();
        let cell = Cell::physical(id, Some(coordinate), body, self.cell_size, self.cell_shape);
        self.cells.insert(id, cell);
        self.by_coordinate.insert(coordinate, id);
        id
    }

    fn check_free(&self, coordinate: HexCoordinate) -> Result<(), AssemblyError> {
        match self.by_coordinate.get(&coordinate) {
            Some(&occupant) => Err(AssemblyError::CoordinateOccupied {
                coordinate,
                occupant,
            }),
            None => Ok(()),
        }
    }

    /// Adds a physical cell at `(q, r)`, optionally welded to the ground.
    ///
    /// If the anchor cannot be created the cell is removed again and the
    /// error returned.
    pub fn add_block<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        q: i32,
        r: i32,
        anchored: bool,
    ) -> Result<CellId, AssemblyError> {
        let coordinate = HexCoordinate::new(q, r);
        self.check_free(coordinate)?;

        let id = self.spawn_physical(physics, coordinate);
        if anchored {
            if let Err(err) = self.create_ground_anchor_joint(physics, id) {
                self.remove_block_by_id(physics, id);
                return Err(err.into());
            }
        }
        debug!(%id, %coordinate, anchored, "block added");
        Ok(id)
    }

    /// Adds a visual-only guide cell at `(q, r)`.
    pub fn add_target_block(&mut self, q: i32, r: i32) -> Result<CellId, AssemblyError> {
        let coordinate = HexCoordinate::new(q, r);
        self.check_free(coordinate)?;
        let id = self.ids.allocate();
        let pose = Pose2::new(self.world_position(coordinate), 0.0);
        let cell = Cell::visual(id, Some(coordinate), pose, self.cell_size, self.cell_shape);
        self.cells.insert(id, cell);
        self.by_coordinate.insert(coordinate, id);
        debug!(%id, %coordinate, "target block added");
        Ok(id)
    }

    /// Adds a physical cell off the grid.
    pub fn add_free_cell<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        position: Vec2,
        rotation: f32,
        shape: CellShape,
    ) -> CellId {
        let body = physics.create_body(&self.body_desc(Pose2::new(position, rotation), shape));
        let id = self.ids.allocate();
        self.cells
            .insert(id, Cell::physical(id, None, body, self.cell_size, shape));
        debug!(%id, ?shape, "free cell added");
        id
    }

    /// Removes a cell with its links, ground anchor, coordinate entry and
    /// body. Unknown ids are a no-op.
    pub fn remove_block_by_id<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        id: CellId,
    ) -> Option<Cell> {
        let cell = self.cells.remove(&id)?;

        let attached: Vec<LinkKey> = self
            .links
            .keys()
            .copied()
            .filter(|key| key.contains(id))
            .collect();
        for key in &attached {
            if let Some(record) = self.links.remove(key) {
                physics.remove_joint(record.joint);
            }
        }
        if let Some(joint) = self.anchors.remove(&id) {
            physics.remove_joint(joint);
        }
        if let Some(coordinate) = cell.coordinate() {
            if self.by_coordinate.get(&coordinate) == Some(&id) {
                self.by_coordinate.remove(&coordinate);
            }
        }
        if let Some(body) = cell.body() {
            physics.remove_body(body);
        }

        debug!(%id, links = attached.len(), "block removed");
        Some(cell)
    }

    pub fn set_cell_state(&mut self, id: CellId, state: PolarityState) -> Result<(), AssemblyError> {
        let cell = self.cells.get_mut(&id).ok_or(AssemblyError::NotFound(id))?;
        cell.set_state(state)?;
        Ok(())
    }

    /// Teleports a cell. Joints are not re-anchored.
    pub fn set_cell_pose<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        id: CellId,
        pose: Pose2,
    ) -> Result<(), AssemblyError> {
        let cell = self.cells.get_mut(&id).ok_or(AssemblyError::NotFound(id))?;
        if cell.set_pose(physics, pose) {
            Ok(())
        } else {
            Err(LinkError::NoPhysicsBody(id).into())
        }
    }

    // ========================================================================
    // Links
    // ========================================================================

    /// Links two cells with the configured default joint kind.
    pub fn create_link_between_blocks<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        a: CellId,
        b: CellId,
    ) -> Result<LinkOutcome, LinkError> {
        self.create_link_with_kind(physics, a, b, self.link.default_kind)
    }

    /// Joins the closest faces of two cells.
    ///
    /// The faces must be within `tolerance_ratio * min(size_a, size_b)` of
    /// each other. The joint is anchored at their midpoint and the pair may
    /// not collide. Linking an already linked pair returns the existing
    /// joint.
    pub fn create_link_with_kind<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        a: CellId,
        b: CellId,
        kind: JointKind,
    ) -> Result<LinkOutcome, LinkError> {
        let cell_a = self.cells.get(&a).ok_or(LinkError::NotFound(a))?;
        let cell_b = self.cells.get(&b).ok_or(LinkError::NotFound(b))?;
        let body_a = cell_a.body().ok_or(LinkError::NoPhysicsBody(a))?;
        let body_b = cell_b.body().ok_or(LinkError::NoPhysicsBody(b))?;
        if a == b {
            return Err(LinkError::SelfLink(a));
        }

        let key = LinkKey::new(a, b);
        if let Some(existing) = self.links.get(&key) {
            return Ok(LinkOutcome::AlreadyLinked(existing.joint));
        }

        let pose_a = physics.body_pose(body_a).ok_or(LinkError::NoPhysicsBody(a))?;
        let pose_b = physics.body_pose(body_b).ok_or(LinkError::NoPhysicsBody(b))?;

        let Some((distance, face_a, face_b)) = closest_faces(cell_a, pose_a, cell_b, pose_b) else {
            return Err(LinkError::FacesTooFarApart {
                a,
                b,
                distance: f32::INFINITY,
                tolerance: 0.0,
            });
        };

        let tolerance = self.link.tolerance_ratio * cell_a.size().min(cell_b.size());
        if distance > tolerance {
            return Err(LinkError::FacesTooFarApart {
                a,
                b,
                distance,
                tolerance,
            });
        }

        let anchor = (face_a + face_b) * 0.5;
        let desc = JointDesc {
            body_a,
            body_b,
            local_anchor_a: pose_a.inverse_transform_point(anchor),
            local_anchor_b: pose_b.inverse_transform_point(anchor),
            kind,
            collide_connected: false,
        };
        let joint = physics
            .create_joint(&desc)
            .ok_or(LinkError::JointRejected(a))?;

        self.links.insert(
            key,
            LinkRecord {
                key,
                joint,
                kind,
                anchor,
            },
        );
        debug!(%a, %b, ?kind, distance, "link created");
        Ok(LinkOutcome::Created(joint))
    }

    /// Removes the link between two cells.
    pub fn unlink_blocks<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        a: CellId,
        b: CellId,
    ) -> Result<LinkRecord, LinkError> {
        let record = self
            .links
            .remove(&LinkKey::new(a, b))
            .ok_or(LinkError::NotLinked { a, b })?;
        physics.remove_joint(record.joint);
        debug!(%a, %b, "link removed");
        Ok(record)
    }

    /// Welds a cell at its current position to the backend's current ground
    /// body. An anchor whose joint the backend has since dropped (for
    /// example because the ground was replaced) is recreated.
    pub fn create_ground_anchor_joint<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        id: CellId,
    ) -> Result<AnchorOutcome, LinkError> {
        let cell = self.cells.get(&id).ok_or(LinkError::NotFound(id))?;
        let body = cell.body().ok_or(LinkError::NoPhysicsBody(id))?;
        if let Some(&joint) = self.anchors.get(&id) {
            if physics.has_joint(joint) {
                return Ok(AnchorOutcome::AlreadyAnchored(joint));
            }
            debug!(%id, "dropping stale ground anchor");
            self.anchors.remove(&id);
            if let Some(cell) = self.cells.get_mut(&id) {
                cell.set_ground_anchored(false);
            }
        }

        let ground = physics.ground_body().ok_or(LinkError::NoGroundBody)?;
        let pose = physics.body_pose(body).ok_or(LinkError::NoPhysicsBody(id))?;
        let local_ground = physics
            .local_point(ground, pose.position)
            .ok_or(LinkError::NoGroundBody)?;

        let desc = JointDesc {
            body_a: body,
            body_b: ground,
            local_anchor_a: Vec2::ZERO,
            local_anchor_b: local_ground,
            kind: JointKind::Rigid,
            collide_connected: false,
        };
        let joint = physics
            .create_joint(&desc)
            .ok_or(LinkError::JointRejected(id))?;

        self.anchors.insert(id, joint);
        if let Some(cell) = self.cells.get_mut(&id) {
            cell.set_ground_anchored(true);
        }
        debug!(%id, "ground anchor created");
        Ok(AnchorOutcome::Created(joint))
    }

    /// Removes a cell's ground anchor. Returns `false` if it had none.
    pub fn release_ground_anchor<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        id: CellId,
    ) -> Result<bool, LinkError> {
        let cell = self.cells.get_mut(&id).ok_or(LinkError::NotFound(id))?;
        let Some(joint) = self.anchors.remove(&id) else {
            return Ok(false);
        };
        cell.set_ground_anchored(false);
        physics.remove_joint(joint);
        debug!(%id, "ground anchor released");
        Ok(true)
    }

    /// Drives the motor of a hinge link.
    pub fn set_hinge_motor<P: PhysicsBackend + ?Sized>(
        &mut self,
        physics: &mut P,
        a: CellId,
        b: CellId,
        state: MotorState,
    ) -> Result<(), LinkError> {
        let record = self
            .links
            .get_mut(&LinkKey::new(a, b))
            .ok_or(LinkError::NotLinked { a, b })?;
        if !record.kind.is_hinge() {
            return Err(LinkError::NotAHinge { a, b });
        }

        let motor = state.to_motor(self.link.hinge_motor_speed, self.link.hinge_motor_max_torque);
        if !physics.set_hinge_motor(record.joint, motor) {
            return Err(LinkError::JointRejected(a));
        }
        record.kind = JointKind::Hinge { motor };
        debug!(%a, %b, ?state, "hinge motor set");
        Ok(())
    }

    /// Forgets links and anchors whose joints the backend no longer has.
    ///
    /// Replacing the ground body drops every anchor joint with it; this
    /// brings the manager's records and the cells' anchored flags back in
    /// line. Returns the number of records removed.
    pub fn prune_stale_joints<P: PhysicsBackend + ?Sized>(&mut self, physics: &P) -> usize {
        let before = self.links.len() + self.anchors.len();
        self.links.retain(|_, record| physics.has_joint(record.joint));

        let stale: Vec<CellId> = self
            .anchors
            .iter()
            .filter(|(_, joint)| !physics.has_joint(**joint))
            .map(|(id, _)| *id)
            .collect();
        for id in &stale {
            self.anchors.remove(id);
            if let Some(cell) = self.cells.get_mut(id) {
                cell.set_ground_anchored(false);
            }
        }

        let removed = before - self.links.len() - self.anchors.len();
        if removed > 0 {
            warn!(removed, "pruned joints the backend no longer holds");
        }
        removed
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get_block_by_id(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn get_block_by_coordinate(&self, coordinate: HexCoordinate) -> Option<&Cell> {
        self.by_coordinate
            .get(&coordinate)
            .and_then(|id| self.cells.get(id))
    }

    /// Every live cell, in creation order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.values()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn has_link(&self, a: CellId, b: CellId) -> bool {
        self.links.contains_key(&LinkKey::new(a, b))
    }

    pub fn link(&self, a: CellId, b: CellId) -> Option<&LinkRecord> {
        self.links.get(&LinkKey::new(a, b))
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkRecord> + '_ {
        self.links.values()
    }

    pub fn ground_anchor(&self, id: CellId) -> Option<JointHandle> {
        self.anchors.get(&id).copied()
    }

    /// Distance between the closest faces of two cells at their current
    /// poses, with the two face positions.
    pub fn face_gap<P: PhysicsBackend + ?Sized>(
        &self,
        physics: &P,
        a: CellId,
        b: CellId,
    ) -> Option<(f32, Vec2, Vec2)> {
        let cell_a = self.cells.get(&a)?;
        let cell_b = self.cells.get(&b)?;
        closest_faces(
            cell_a,
            cell_a.world_pose(physics)?,
            cell_b,
            cell_b.world_pose(physics)?,
        )
    }

    /// Cell whose outline contains `point`.
    ///
    /// The grid cell under the point is tried first. Cells that have moved
    /// off their slot are then searched newest first, so the most recently
    /// added of two overlapping cells wins.
    pub fn cell_at<P: PhysicsBackend + ?Sized>(&self, physics: &P, point: Vec2) -> Option<CellId> {
        let hit = |cell: &Cell| {
            cell.world_pose(physics)
                .is_some_and(|pose| cell.contains_point(pose, point))
        };

        let slot = HexCoordinate::from_pixel(point, self.cell_size);
        if let Some(cell) = self.get_block_by_coordinate(slot).filter(|cell| hit(cell)) {
            return Some(cell.id());
        }
        self.cells.values().rev().find(|cell| hit(cell)).map(Cell::id)
    }

    /// Occupied neighbor slots of a coordinate as `(direction, cell)`.
    pub fn occupied_neighbors(&self, coordinate: HexCoordinate) -> Vec<(usize, CellId)> {
        (0..HEX_DIRECTIONS.len())
            .filter_map(|direction| {
                self.by_coordinate
                    .get(&coordinate.neighbor(direction))
                    .map(|&id| (direction, id))
            })
            .collect()
    }

    /// One render record per cell whose pose can be resolved.
    pub fn cell_instances<P: PhysicsBackend + ?Sized>(&self, physics: &P) -> Vec<CellInstance> {
        self.cells
            .values()
            .filter_map(|cell| {
                let pose = cell.world_pose(physics)?;
                let mut flags = CellInstanceFlags::empty();
                if cell.body().is_none() {
                    flags |= CellInstanceFlags::TARGET;
                }
                if cell.is_ground_anchored() {
                    flags |= CellInstanceFlags::ANCHORED;
                }
                Some(CellInstance::new(
                    cell.id().0,
                    pose.position,
                    pose.rotation,
                    cell.size(),
                    cell.shape().sides() as u32,
                    flags,
                    CellInstance::pack_polarities(cell.state().vertices(), cell.state().edges()),
                ))
            })
            .collect()
    }
}

/// Closest face pair of two cells as `(distance, face_a, face_b)`.
fn closest_faces(cell_a: &Cell, pose_a: Pose2, cell_b: &Cell, pose_b: Pose2) -> Option<(f32, Vec2, Vec2)> {
    let faces_b = cell_b.face_positions(pose_b);
    let mut best: Option<(f32, Vec2, Vec2)> = None;
    for face_a in cell_a.face_positions(pose_a) {
        for &face_b in &faces_b {
            let distance = face_a.distance(face_b);
            if best.is_none_or(|(d, _, _)| distance < d) {
                best = Some((distance, face_a, face_b));
            }
        }
    }
    best
}
