//! Links
//!
//! A link is one backend joint between two cells, stored under the
//! canonical (order-independent) pair key.

use glam::Vec2;

use crate::game::cell::CellId;
use crate::physics::{HingeMotor, JointHandle, JointKind};

/// Order-independent key for a pair of cells: `(min << 32) | max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey(u64);

impl LinkKey {
    pub fn new(a: CellId, b: CellId) -> Self {
        let (lo, hi) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
        LinkKey(((lo as u64) << 32) | hi as u64)
    }

    /// Smaller id of the pair.
    pub fn first(self) -> CellId {
        CellId((self.0 >> 32) as u32)
    }

    /// Larger id of the pair.
    pub fn second(self) -> CellId {
        CellId(self.0 as u32)
    }

    pub fn contains(self, id: CellId) -> bool {
        self.first() == id || self.second() == id
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A live joint between two cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkRecord {
    pub key: LinkKey,
    pub joint: JointHandle,
    pub kind: JointKind,
    /// World-space anchor at creation time
    pub anchor: Vec2,
}

/// Successful result of a link request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    Created(JointHandle),
    AlreadyLinked(JointHandle),
}

impl LinkOutcome {
    pub fn joint(self) -> JointHandle {
        match self {
            LinkOutcome::Created(joint) | LinkOutcome::AlreadyLinked(joint) => joint,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, LinkOutcome::Created(_))
    }
}

/// Successful result of a ground anchor request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorOutcome {
    Created(JointHandle),
    AlreadyAnchored(JointHandle),
}

impl AnchorOutcome {
    pub fn joint(self) -> JointHandle {
        match self {
            AnchorOutcome::Created(joint) | AnchorOutcome::AlreadyAnchored(joint) => joint,
        }
    }
}

/// Drive direction of a hinge link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotorState {
    Forward,
    Backward,
    #[default]
    Off,
}

impl MotorState {
    /// Backend motor for this state; `None` disables the motor.
    pub fn to_motor(self, speed: f32, max_torque: f32) -> Option<HingeMotor> {
        match self {
            MotorState::Forward => Some(HingeMotor { speed, max_torque }),
            MotorState::Backward => Some(HingeMotor {
                speed: -speed,
                max_torque,
            }),
            MotorState::Off => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_order_independent() {
        assert_eq!(LinkKey::new(CellId(3), CellId(9)), LinkKey::new(CellId(9), CellId(3)));
        assert_ne!(LinkKey::new(CellId(3), CellId(9)), LinkKey::new(CellId(3), CellId(8)));
    }

    #[test]
    fn test_key_unpacks() {
        let key = LinkKey::new(CellId(u32::MAX), CellId(7));
        assert_eq!(key.first(), CellId(7));
        assert_eq!(key.second(), CellId(u32::MAX));
        assert!(key.contains(CellId(7)));
        assert!(!key.contains(CellId(8)));
    }

    #[test]
    fn test_motor_state_mapping() {
        assert_eq!(MotorState::Off.to_motor(2.0, 10.0), None);
        let back = MotorState::Backward.to_motor(2.0, 10.0).unwrap();
        assert_eq!(back.speed, -2.0);
        assert_eq!(back.max_torque, 10.0);
    }
}
