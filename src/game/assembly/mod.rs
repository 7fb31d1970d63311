//! Assembly Module
//!
//! Cell registry, links, ground anchors and layouts.

pub mod error;
pub mod ids;
pub mod layout;
pub mod link;
pub mod manager;

pub use error::{AssemblyError, LayoutIssue, LinkError};
pub use ids::IdAllocator;
pub use layout::{Layout, LayoutEntry};
pub use link::{AnchorOutcome, LinkKey, LinkOutcome, LinkRecord, MotorState};
pub use manager::{AssemblyManager, LayoutReport};
