//! Axial Hex Coordinates
//!
//! Pointy-top axial coordinates `(q, r)` with the implicit cube coordinate
//! `s = -q - r`. This is the only hex basis used in the crate: cell polygons,
//! layout placement and pixel picking all go through [`HexCoordinate::to_pixel`]
//! and [`HexCoordinate::from_pixel`].
//!
//! # Coordinate System
//!
//! - x = size * (sqrt(3) * q + sqrt(3)/2 * r)
//! - y = size * 3/2 * r
//!
//! With `size` as the hex circumradius, neighbouring centres are `sqrt(3) * size`
//! apart and adjacent hexes share an edge midpoint exactly.
//!
//! # Example
//!
//! ```ignore
//! use chainbots_engine::hex::HexCoordinate;
//!
//! let c = HexCoordinate::new(2, -1);
//! let p = c.to_pixel(0.5);
//! assert_eq!(HexCoordinate::from_pixel(p, 0.5), c);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

const SQRT3: f32 = 1.732_050_8;

/// Unit offsets for the six neighbour directions, ordered around the hex.
///
/// Direction `d` and `(d + 3) % 6` are opposites.
pub const HEX_DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),  // E
    (0, 1),  // SE
    (-1, 1), // SW
    (-1, 0), // W
    (0, -1), // NW
    (1, -1), // NE
];

/// A hexagon position in axial coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoordinate {
    /// Column
    pub q: i32,
    /// Row
    pub r: i32,
}

impl HexCoordinate {
    pub const ORIGIN: HexCoordinate = HexCoordinate { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube coordinate.
    #[inline]
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Returns the neighbour in `direction` (taken modulo 6).
    pub fn neighbor(&self, direction: usize) -> HexCoordinate {
        let (dq, dr) = HEX_DIRECTIONS[direction % 6];
        HexCoordinate::new(self.q + dq, self.r + dr)
    }

    /// All six neighbours in direction order (E, SE, SW, W, NW, NE).
    pub fn neighbors(&self) -> [HexCoordinate; 6] {
        std::array::from_fn(|d| self.neighbor(d))
    }

    /// Direction index pointing from `self` to `other` if they are adjacent.
    pub fn direction_to(&self, other: HexCoordinate) -> Option<usize> {
        let delta = (other.q - self.q, other.r - self.r);
        HEX_DIRECTIONS.iter().position(|&d| d == delta)
    }

    /// Hex distance (number of steps on the grid).
    pub fn distance(&self, other: HexCoordinate) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        (dq + dr + ds) / 2
    }

    /// Maps the centre of this hex to a 2D point.
    pub fn to_pixel(&self, size: f32) -> Vec2 {
        let q = self.q as f32;
        let r = self.r as f32;
        Vec2::new(size * (SQRT3 * q + SQRT3 / 2.0 * r), size * (1.5 * r))
    }

    /// Returns the hex containing `point`.
    pub fn from_pixel(point: Vec2, size: f32) -> HexCoordinate {
        let q = (SQRT3 / 3.0 * point.x - point.y / 3.0) / size;
        let r = (2.0 / 3.0 * point.y) / size;
        Self::round(q, r)
    }

    /// Cube rounding of fractional axial coordinates.
    ///
    /// The component with the largest rounding error is recomputed from the
    /// other two so the result keeps `q + r + s == 0`.
    pub fn round(q: f32, r: f32) -> HexCoordinate {
        let s = -q - r;

        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        HexCoordinate::new(rq as i32, rr as i32)
    }
}

impl From<(i32, i32)> for HexCoordinate {
    fn from((q, r): (i32, i32)) -> Self {
        HexCoordinate::new(q, r)
    }
}

impl From<[i32; 2]> for HexCoordinate {
    fn from([q, r]: [i32; 2]) -> Self {
        HexCoordinate::new(q, r)
    }
}

impl std::ops::Add for HexCoordinate {
    type Output = HexCoordinate;

    fn add(self, rhs: HexCoordinate) -> HexCoordinate {
        HexCoordinate::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl std::fmt::Display for HexCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}
