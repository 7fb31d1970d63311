//! Layouts
//!
//! Ordered cell placements used to build an assembly. Each entry names an
//! axial coordinate, whether the cell is welded to the ground, and the
//! coordinates it should be linked to.
//!
//! # JSON
//!
//! ```json
//! [
//!   { "q": 0, "r": 0, "anchored": true, "neighbors": [[1, 0]] },
//!   { "q": 1, "r": 0 }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::hex::HexCoordinate;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub q: i32,
    pub r: i32,
    #[serde(default)]
    pub anchored: bool,
    #[serde(default)]
    pub neighbors: Vec<[i32; 2]>,
}

impl LayoutEntry {
    pub fn new(q: i32, r: i32) -> Self {
        Self {
            q,
            r,
            ..Default::default()
        }
    }

    pub fn anchored(mut self) -> Self {
        self.anchored = true;
        self
    }

    pub fn with_neighbor(mut self, q: i32, r: i32) -> Self {
        self.neighbors.push([q, r]);
        self
    }

    pub fn coordinate(&self) -> HexCoordinate {
        HexCoordinate::new(self.q, self.r)
    }

    pub fn neighbor_coordinates(&self) -> impl Iterator<Item = HexCoordinate> + '_ {
        self.neighbors.iter().map(|&n| HexCoordinate::from(n))
    }
}

/// An ordered list of [`LayoutEntry`] values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    pub entries: Vec<LayoutEntry>,
}

/// Ground row of the demo scene: every other column, stepping up one row.
const STAIRCASE_GROUND: [(i32, i32); 11] = [
    (-16, 16),
    (-14, 15),
    (-12, 14),
    (-10, 13),
    (-8, 12),
    (-6, 11),
    (-4, 10),
    (-2, 9),
    (0, 8),
    (2, 7),
    (4, 6),
];

/// Free cells resting on, between and above the ground row.
const STAIRCASE_FEATURES: [(i32, i32); 33] = [
    // on top
    (-16, 15),
    // in between
    (-13, 14),
    // top and between
    (-10, 12),
    (-9, 12),
    (-6, 10),
    (-5, 10),
    (-4, 9),
    (-2, 8),
    (-2, 7),
    (0, 7),
    (0, 6),
    (2, 6),
    (2, 5),
    (1, 7),
    (1, 6),
    (3, 6),
    (4, 5),
    // floating
    (1, 5),
    (2, 4),
    (3, 3),
    (4, 3),
    (4, 2),
    (5, 2),
    (6, 1),
    // reaching up
    (6, 0),
    (6, -1),
    (7, 0),
    (7, -1),
    (5, -1),
    (6, -2),
    (4, -1),
    (3, 0),
    (3, -1),
];

impl Layout {
    pub fn new(entries: Vec<LayoutEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: LayoutEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayoutEntry> {
        self.entries.iter()
    }

    /// Demo scene: an anchored staircase ground row plus unlinked features.
    pub fn staircase() -> Self {
        let ground = STAIRCASE_GROUND
            .iter()
            .map(|&(q, r)| LayoutEntry::new(q, r).anchored());
        let features = STAIRCASE_FEATURES
            .iter()
            .map(|&(q, r)| LayoutEntry::new(q, r));
        Self::new(ground.chain(features).collect())
    }

    /// A chain where every coordinate links to the next one. With
    /// `anchor_first` the first cell is welded to the ground.
    pub fn path(coordinates: &[(i32, i32)], anchor_first: bool) -> Self {
        let entries = coordinates
            .iter()
            .enumerate()
            .map(|(i, &(q, r))| {
                let mut entry = LayoutEntry::new(q, r);
                if i == 0 && anchor_first {
                    entry = entry.anchored();
                }
                if let Some(&(nq, nr)) = coordinates.get(i + 1) {
                    entry = entry.with_neighbor(nq, nr);
                }
                entry
            })
            .collect();
        Self::new(entries)
    }
}

impl<'a> IntoIterator for &'a Layout {
    type Item = &'a LayoutEntry;
    type IntoIter = std::slice::Iter<'a, LayoutEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
