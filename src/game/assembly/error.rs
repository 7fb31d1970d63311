//! Assembly errors.

use thiserror::Error;

use crate::game::cell::{CellError, CellId};
use crate::hex::HexCoordinate;

/// Why a link, anchor or motor request failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    #[error("cell {0} not found")]
    NotFound(CellId),

    #[error("cell {0} has no physics body")]
    NoPhysicsBody(CellId),

    #[error("cell {0} cannot be linked to itself")]
    SelfLink(CellId),

    #[error("closest faces of {a} and {b} are {distance:.3} apart (tolerance {tolerance:.3})")]
    FacesTooFarApart {
        a: CellId,
        b: CellId,
        distance: f32,
        tolerance: f32,
    },

    #[error("physics world has no ground body")]
    NoGroundBody,

    #[error("physics backend rejected the joint for cell {0}")]
    JointRejected(CellId),

    #[error("cells {a} and {b} are not linked")]
    NotLinked { a: CellId, b: CellId },

    #[error("link between {a} and {b} is not a hinge")]
    NotAHinge { a: CellId, b: CellId },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error("coordinate {coordinate} is already occupied by cell {occupant}")]
    CoordinateOccupied {
        coordinate: HexCoordinate,
        occupant: CellId,
    },

    #[error("cell {0} not found")]
    NotFound(CellId),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Cell(#[from] CellError),
}

/// A layout entry that could not be applied in full. Initialization keeps
/// going after reporting it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutIssue {
    #[error("entry {index}: coordinate {coordinate} is already used")]
    DuplicateCoordinate {
        index: usize,
        coordinate: HexCoordinate,
    },

    #[error("entry {index}: neighbor {neighbor} is not part of the layout")]
    UnknownNeighbor {
        index: usize,
        neighbor: HexCoordinate,
    },

    #[error("entry {index}: ground anchor failed")]
    Anchor {
        index: usize,
        #[source]
        error: LinkError,
    },

    #[error("entry {index}: link to {neighbor} failed")]
    Link {
        index: usize,
        neighbor: HexCoordinate,
        #[source]
        error: LinkError,
    },
}

impl LayoutIssue {
    /// Index of the offending layout entry.
    pub fn index(&self) -> usize {
        match self {
            LayoutIssue::DuplicateCoordinate { index, .. }
            | LayoutIssue::UnknownNeighbor { index, .. }
            | LayoutIssue::Anchor { index, .. }
            | LayoutIssue::Link { index, .. } => *index,
        }
    }
}
