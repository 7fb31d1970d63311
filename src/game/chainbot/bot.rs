//! Chainbot
//!
//! A body cell with two single-cell legs. The three cells sit on mutually
//! adjacent hex slots and are joined by three motorized hinges: the left
//! hip (body to left leg), the right hip (body to right leg) and the knee
//! (left leg to right leg).
//!
//! With all three hinges engaged the triangle is rigid. Releasing the knee
//! frees the legs to swing on their hips; re-engaging it locks the pose the
//! legs have reached, as long as their inner faces still meet.
//!
//! Legs grip environment cells with a weld at the closest pair of faces and
//! let go again on detach.

use std::fmt;

use glam::Vec2;
use tracing::{debug, info};

use crate::game::assembly::{AssemblyManager, LinkError, LinkOutcome, MotorState};
use crate::game::cell::CellId;
use crate::hex::HexCoordinate;
use crate::physics::{JointKind, PhysicsBackend};

use super::error::ChainbotError;
use super::structure::{ChainStructure, SOUTH_EAST, SOUTH_WEST};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LegSide {
    Left,
    Right,
}

impl fmt::Display for LegSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegSide::Left => f.write_str("left"),
            LegSide::Right => f.write_str("right"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChainbotMotor {
    LeftHip,
    RightHip,
    Knee,
}

impl ChainbotMotor {
    pub const ALL: [ChainbotMotor; 3] = [
        ChainbotMotor::LeftHip,
        ChainbotMotor::RightHip,
        ChainbotMotor::Knee,
    ];

    fn index(self) -> usize {
        match self {
            ChainbotMotor::LeftHip => 0,
            ChainbotMotor::RightHip => 1,
            ChainbotMotor::Knee => 2,
        }
    }
}

/// One leg and the environment cell it currently grips.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leg {
    pub cell: CellId,
    pub attached_to: Option<CellId>,
}

impl Leg {
    fn new(cell: CellId) -> Self {
        Self {
            cell,
            attached_to: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached_to.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Chainbot {
    structure: ChainStructure,
    left: Leg,
    right: Leg,
    motors: [MotorState; 3],
    selected: Option<LegSide>,
}

impl Chainbot {
    /// Places the body at `origin` with the legs on its south-west and
    /// south-east slots, and hinges all three pairs.
    pub fn build<P: PhysicsBackend + ?Sized>(
        assembly: &mut AssemblyManager,
        physics: &mut P,
        origin: HexCoordinate,
    ) -> Result<Self, ChainbotError> {
        let structure = ChainStructure::assemble(
            assembly,
            physics,
            "chainbot",
            &[origin, origin.neighbor(SOUTH_WEST), origin.neighbor(SOUTH_EAST)],
            &[(0, 1), (0, 2), (1, 2)],
        )?;
        let cells = structure.cells();
        let (left, right) = (Leg::new(cells[1]), Leg::new(cells[2]));
        info!(body = %cells[0], left = %left.cell, right = %right.cell, %origin, "chainbot built");
        Ok(Self {
            structure,
            left,
            right,
            motors: [MotorState::Off; 3],
            selected: None,
        })
    }

    pub fn body(&self) -> CellId {
        self.structure.body()
    }

    pub fn structure(&self) -> &ChainStructure {
        &self.structure
    }

    /// Body, left leg and right leg.
    pub fn cells(&self) -> [CellId; 3] {
        [self.body(), self.left.cell, self.right.cell]
    }

    pub fn leg(&self, side: LegSide) -> &Leg {
        match side {
            LegSide::Left => &self.left,
            LegSide::Right => &self.right,
        }
    }

    fn leg_mut(&mut self, side: LegSide) -> &mut Leg {
        match side {
            LegSide::Left => &mut self.left,
            LegSide::Right => &mut self.right,
        }
    }

    pub fn selected_leg(&self) -> Option<LegSide> {
        self.selected
    }

    pub fn select_leg(&mut self, side: Option<LegSide>) {
        self.selected = side;
    }

    /// The two cells a motor's hinge joins.
    pub fn motor_pair(&self, motor: ChainbotMotor) -> (CellId, CellId) {
        match motor {
            ChainbotMotor::LeftHip => (self.body(), self.left.cell),
            ChainbotMotor::RightHip => (self.body(), self.right.cell),
            ChainbotMotor::Knee => (self.left.cell, self.right.cell),
        }
    }

    pub fn motor_state(&self, motor: ChainbotMotor) -> MotorState {
        self.motors[motor.index()]
    }

    pub fn set_motor<P: PhysicsBackend + ?Sized>(
        &mut self,
        assembly: &mut AssemblyManager,
        physics: &mut P,
        motor: ChainbotMotor,
        state: MotorState,
    ) -> Result<(), LinkError> {
        let (a, b) = self.motor_pair(motor);
        assembly.set_hinge_motor(physics, a, b, state)?;
        self.motors[motor.index()] = state;
        Ok(())
    }

    /// Turns off every motor whose hinge is engaged.
    pub fn stop_motors<P: PhysicsBackend + ?Sized>(
        &mut self,
        assembly: &mut AssemblyManager,
        physics: &mut P,
    ) -> Result<(), LinkError> {
        for motor in ChainbotMotor::ALL {
            let (a, b) = self.motor_pair(motor);
            if assembly.has_link(a, b) {
                self.set_motor(assembly, physics, motor, MotorState::Off)?;
            }
        }
        Ok(())
    }

    pub fn is_knee_engaged(&self, assembly: &AssemblyManager) -> bool {
        assembly.has_link(self.left.cell, self.right.cell)
    }

    /// Removes the knee hinge. Returns `false` if it was already released.
    pub fn release_knee<P: PhysicsBackend + ?Sized>(
        &mut self,
        assembly: &mut AssemblyManager,
        physics: &mut P,
    ) -> Result<bool, LinkError> {
        match assembly.unlink_blocks(physics, self.left.cell, self.right.cell) {
            Ok(_) => {
                self.motors[ChainbotMotor::Knee.index()] = MotorState::Off;
                debug!(body = %self.body(), "knee released");
                Ok(true)
            }
            Err(LinkError::NotLinked { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Hinges the legs together again at their closest faces.
    pub fn engage_knee<P: PhysicsBackend + ?Sized>(
        &mut self,
        assembly: &mut AssemblyManager,
        physics: &mut P,
    ) -> Result<LinkOutcome, LinkError> {
        let outcome = assembly.create_link_with_kind(
            physics,
            self.left.cell,
            self.right.cell,
            JointKind::Hinge { motor: None },
        )?;
        debug!(body = %self.body(), "knee engaged");
        Ok(outcome)
    }

    /// Welds a leg to an environment cell at their closest faces.
    pub fn attach_leg<P: PhysicsBackend + ?Sized>(
        &mut self,
        assembly: &mut AssemblyManager,
        physics: &mut P,
        side: LegSide,
        environment: CellId,
    ) -> Result<LinkOutcome, ChainbotError> {
        let leg = *self.leg(side);
        if let Some(environment) = leg.attached_to {
            return Err(ChainbotError::LegAlreadyAttached { side, environment });
        }
        if self.structure.contains(environment) {
            return Err(ChainbotError::OwnCell(environment));
        }

        let outcome = assembly.create_link_with_kind(physics, leg.cell, environment, JointKind::Rigid)?;
        self.leg_mut(side).attached_to = Some(environment);
        debug!(%side, leg = %leg.cell, %environment, "leg attached");
        Ok(outcome)
    }

    /// Physical cell outside the chainbot whose closest face is nearest to
    /// the leg, with that face distance.
    pub fn nearest_environment<P: PhysicsBackend + ?Sized>(
        &self,
        assembly: &AssemblyManager,
        physics: &P,
        side: LegSide,
    ) -> Option<(CellId, f32)> {
        let leg = self.leg(side).cell;
        assembly
            .cells()
            .filter(|cell| cell.body().is_some() && !self.structure.contains(cell.id()))
            .filter_map(|cell| {
                assembly
                    .face_gap(physics, leg, cell.id())
                    .map(|(distance, _, _)| (cell.id(), distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Attaches a leg to [`nearest_environment`](Self::nearest_environment).
    pub fn attach_leg_to_nearest<P: PhysicsBackend + ?Sized>(
        &mut self,
        assembly: &mut AssemblyManager,
        physics: &mut P,
        side: LegSide,
    ) -> Result<CellId, ChainbotError> {
        let (environment, _) = self
            .nearest_environment(assembly, &*physics, side)
            .ok_or(ChainbotError::NothingInReach(side))?;
        self.attach_leg(assembly, physics, side, environment)?;
        Ok(environment)
    }

    /// Lets go of the gripped cell. Returns `false` if the leg was free.
    pub fn detach_leg<P: PhysicsBackend + ?Sized>(
        &mut self,
        assembly: &mut AssemblyManager,
        physics: &mut P,
        side: LegSide,
    ) -> Result<bool, LinkError> {
        let leg = *self.leg(side);
        let Some(environment) = leg.attached_to else {
            return Ok(false);
        };
        // Removing the environment cell already took the weld with it
        if assembly.has_link(leg.cell, environment) {
            assembly.unlink_blocks(physics, leg.cell, environment)?;
        }
        self.leg_mut(side).attached_to = None;
        debug!(%side, leg = %leg.cell, %environment, "leg detached");
        Ok(true)
    }

    /// Leg under `point`, if any.
    pub fn leg_at<P: PhysicsBackend + ?Sized>(
        &self,
        assembly: &AssemblyManager,
        physics: &P,
        point: Vec2,
    ) -> Option<LegSide> {
        let hit = self.structure.cell_at(assembly, physics, point)?;
        if hit == self.left.cell {
            Some(LegSide::Left)
        } else if hit == self.right.cell {
            Some(LegSide::Right)
        } else {
            None
        }
    }

    /// Removes the chainbot's cells, joints and leg welds.
    pub fn remove<P: PhysicsBackend + ?Sized>(self, assembly: &mut AssemblyManager, physics: &mut P) -> usize {
        self.structure.remove(assembly, physics)
    }
}
