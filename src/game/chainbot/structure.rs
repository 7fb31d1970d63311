//! Chain Structures
//!
//! Grid cells joined by hinge links into one articulated structure. Every
//! slot a structure uses is adjacent to the slot it hinges on, so each hinge
//! sits on a shared face and passes the link tolerance.

use glam::Vec2;
use tracing::{debug, warn};

use crate::game::assembly::{AssemblyError, AssemblyManager, LinkError, MotorState};
use crate::game::cell::CellId;
use crate::hex::HexCoordinate;
use crate::physics::{JointKind, PhysicsBackend};

use super::error::ChainbotError;

/// Hex direction indices used by the prefabs.
pub(crate) const EAST: usize = 0;
pub(crate) const SOUTH_EAST: usize = 1;
pub(crate) const SOUTH_WEST: usize = 2;

/// Cells of one articulated structure and the hinges between them.
///
/// The first cell is the body. Hinges are `(parent, child)` pairs; motor
/// speeds are child relative to parent.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainStructure {
    name: String,
    cells: Vec<CellId>,
    hinges: Vec<(CellId, CellId)>,
}

impl ChainStructure {
    /// Body with one leg of two segments hanging south-east of it.
    pub fn two_leg<P: PhysicsBackend + ?Sized>(
        assembly: &mut AssemblyManager,
        physics: &mut P,
        origin: HexCoordinate,
    ) -> Result<Self, AssemblyError> {
        let upper = origin.neighbor(SOUTH_EAST);
        let lower = upper.neighbor(SOUTH_EAST);
        Self::assemble(
            assembly,
            physics,
            "two-leg chainbot",
            &[origin, upper, lower],
            &[(0, 1), (1, 2)],
        )
    }

    /// Body with two parallel legs of two segments each, one hinged on its
    /// south-west face and one on its east face.
    pub fn parallel_leg<P: PhysicsBackend + ?Sized>(
        assembly: &mut AssemblyManager,
        physics: &mut P,
        origin: HexCoordinate,
    ) -> Result<Self, AssemblyError> {
        let left_upper = origin.neighbor(SOUTH_WEST);
        let left_lower = left_upper.neighbor(SOUTH_EAST);
        let right_upper = origin.neighbor(EAST);
        let right_lower = right_upper.neighbor(SOUTH_EAST);
        Self::assemble(
            assembly,
            physics,
            "parallel-leg chainbot",
            &[origin, left_upper, left_lower, right_upper, right_lower],
            &[(0, 1), (1, 2), (0, 3), (3, 4)],
        )
    }

    /// Places one physical cell per slot and hinges the listed slot pairs.
    /// Nothing is left behind on failure.
    pub(crate) fn assemble<P: PhysicsBackend + ?Sized>(
        assembly: &mut AssemblyManager,
        physics: &mut P,
        name: &str,
        slots: &[HexCoordinate],
        hinges: &[(usize, usize)],
    ) -> Result<Self, AssemblyError> {
        let mut cells = Vec::with_capacity(slots.len());
        let result = Self::place(assembly, physics, slots, hinges, &mut cells);
        match result {
            Ok(hinges) => {
                debug!(name, cells = cells.len(), hinges = hinges.len(), "structure assembled");
                Ok(Self {
                    name: name.to_owned(),
                    cells,
                    hinges,
                })
            }
            Err(err) => {
                warn!(name, error = %err, "structure rolled back");
                for id in cells {
                    assembly.remove_block_by_id(physics, id);
                }
                Err(err)
            }
        }
    }

    fn place<P: PhysicsBackend + ?Sized>(
        assembly: &mut AssemblyManager,
        physics: &mut P,
        slots: &[HexCoordinate],
        hinges: &[(usize, usize)],
        cells: &mut Vec<CellId>,
    ) -> Result<Vec<(CellId, CellId)>, AssemblyError> {
        for slot in slots {
            cells.push(assembly.add_block(physics, slot.q, slot.r, false)?);
        }
        let mut joined = Vec::with_capacity(hinges.len());
        for &(parent, child) in hinges {
            let (parent, child) = (cells[parent], cells[child]);
            assembly.create_link_with_kind(physics, parent, child, JointKind::Hinge { motor: None })?;
            joined.push((parent, child));
        }
        Ok(joined)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> CellId {
        self.cells[0]
    }

    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    pub fn hinges(&self) -> &[(CellId, CellId)] {
        &self.hinges
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains(&id)
    }

    /// Drives hinge `index` (in [`hinges`](Self::hinges) order).
    pub fn set_motor<P: PhysicsBackend + ?Sized>(
        &self,
        assembly: &mut AssemblyManager,
        physics: &mut P,
        index: usize,
        state: MotorState,
    ) -> Result<(), ChainbotError> {
        let &(parent, child) = self
            .hinges
            .get(index)
            .ok_or(ChainbotError::UnknownHinge(index))?;
        assembly.set_hinge_motor(physics, parent, child, state)?;
        Ok(())
    }

    /// Drives every hinge the same way.
    pub fn set_all_motors<P: PhysicsBackend + ?Sized>(
        &self,
        assembly: &mut AssemblyManager,
        physics: &mut P,
        state: MotorState,
    ) -> Result<(), LinkError> {
        for &(parent, child) in &self.hinges {
            assembly.set_hinge_motor(physics, parent, child, state)?;
        }
        Ok(())
    }

    /// Structure cell under `point`; the last placed cell wins on overlap.
    pub fn cell_at<P: PhysicsBackend + ?Sized>(
        &self,
        assembly: &AssemblyManager,
        physics: &P,
        point: Vec2,
    ) -> Option<CellId> {
        self.cells.iter().rev().copied().find(|&id| {
            assembly.get_block_by_id(id).is_some_and(|cell| {
                cell.world_pose(physics)
                    .is_some_and(|pose| cell.contains_point(pose, point))
            })
        })
    }

    /// Removes every cell of the structure, hinges included. Returns the
    /// number of cells that were still present.
    pub fn remove<P: PhysicsBackend + ?Sized>(
        self,
        assembly: &mut AssemblyManager,
        physics: &mut P,
    ) -> usize {
        self.cells
            .iter()
            .filter(|&&id| assembly.remove_block_by_id(physics, id).is_some())
            .count()
    }
}
