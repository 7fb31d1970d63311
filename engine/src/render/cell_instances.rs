//! Cell Instance Records
//!
//! Flat, GPU-friendly snapshot of every cell for instanced drawing. The
//! renderer itself lives outside this crate; it only needs these records.
//!
//! Layout (32 bytes, 4-byte aligned):
//! - position:      vec2<f32> (8 bytes) - World-space center
//! - rotation:      f32 (4 bytes) - Radians
//! - size:          f32 (4 bytes) - Circumradius
//! - id:            u32 (4 bytes) - Cell id
//! - sides:         u32 (4 bytes) - 3 or 6
//! - flags:         u32 (4 bytes) - [`CellInstanceFlags`]
//! - polarity_bits: u32 (4 bytes) - 2 bits per point, vertices then edges

use glam::Vec2;

use crate::game::cell::{MAX_SIDES, Polarity};

bitflags::bitflags! {
    /// Per-instance render flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CellInstanceFlags: u32 {
        /// Visual-only guide cell
        const TARGET = 1 << 0;
        /// Welded to the ground body
        const ANCHORED = 1 << 1;
    }
}

const POLARITY_BITS: u32 = 2;
const EDGE_SHIFT: u32 = MAX_SIDES as u32 * POLARITY_BITS;

fn encode(polarity: Polarity) -> u32 {
    match polarity {
        Polarity::Off => 0,
        Polarity::Positive => 1,
        Polarity::Negative => 2,
    }
}

fn decode(bits: u32) -> Polarity {
    match bits & 0b11 {
        1 => Polarity::Positive,
        2 => Polarity::Negative,
        _ => Polarity::Off,
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CellInstance {
    pub position: [f32; 2],
    pub rotation: f32,
    pub size: f32,
    pub id: u32,
    pub sides: u32,
    pub flags: u32,
    pub polarity_bits: u32,
}

static_assertions::assert_eq_size!(CellInstance, [u8; 32]);

impl CellInstance {
    pub fn new(
        id: u32,
        position: Vec2,
        rotation: f32,
        size: f32,
        sides: u32,
        flags: CellInstanceFlags,
        polarity_bits: u32,
    ) -> Self {
        Self {
            position: position.to_array(),
            rotation,
            size,
            id,
            sides,
            flags: flags.bits(),
            polarity_bits,
        }
    }

    pub fn flags(&self) -> CellInstanceFlags {
        CellInstanceFlags::from_bits_truncate(self.flags)
    }

    /// Packs vertex and edge polarities; entries past `MAX_SIDES` are ignored.
    pub fn pack_polarities(vertices: &[Polarity], edges: &[Polarity]) -> u32 {
        let pack = |points: &[Polarity], shift: u32| {
            points
                .iter()
                .take(MAX_SIDES)
                .enumerate()
                .fold(0u32, |bits, (i, &p)| {
                    bits | encode(p) << (shift + i as u32 * POLARITY_BITS)
                })
        };
        pack(vertices, 0) | pack(edges, EDGE_SHIFT)
    }

    pub fn vertex_polarity(&self, index: usize) -> Polarity {
        if index >= MAX_SIDES {
            return Polarity::Off;
        }
        decode(self.polarity_bits >> (index as u32 * POLARITY_BITS))
    }

    pub fn edge_polarity(&self, index: usize) -> Polarity {
        if index >= MAX_SIDES {
            return Polarity::Off;
        }
        decode(self.polarity_bits >> (EDGE_SHIFT + index as u32 * POLARITY_BITS))
    }
}

/// Reinterprets a slice of instances as raw bytes for upload.
pub fn instance_bytes(instances: &[CellInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
