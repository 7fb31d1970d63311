//! Chainbot errors.

use thiserror::Error;

use crate::game::assembly::{AssemblyError, LinkError};
use crate::game::cell::CellId;

use super::bot::LegSide;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainbotError {
    #[error("structure has no hinge {0}")]
    UnknownHinge(usize),

    #[error("{side} leg is already attached to cell {environment}")]
    LegAlreadyAttached { side: LegSide, environment: CellId },

    #[error("cell {0} belongs to the chainbot itself")]
    OwnCell(CellId),

    #[error("no physical cell for the {0} leg to attach to")]
    NothingInReach(LegSide),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Link(#[from] LinkError),
}
