//! Chainbot Module
//!
//! Articulated structures built from hinge-linked cells: the two-leg and
//! parallel-leg prefabs, and the three-motor chainbot whose legs grip and
//! release environment cells.

pub mod bot;
pub mod error;
pub mod structure;

pub use bot::{Chainbot, ChainbotMotor, Leg, LegSide};
pub use error::ChainbotError;
pub use structure::ChainStructure;
