//! Session-scoped id allocation.

use crate::game::cell::CellId;

/// Hands out monotonically increasing cell ids.
///
/// Each [`AssemblyManager`](super::AssemblyManager) owns one; there is no
/// process-wide counter.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> CellId {
        let id = CellId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    /// Id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> CellId {
        CellId(self.next)
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}
