//! Polarity State
//!
//! Tri-state magnetic polarity for every named attachment point of a cell.
//! A [`PolarityState`] is a plain `Copy` value: cells swap it wholesale, so a
//! force pass never sees a half-updated mix of points.

use serde::{Deserialize, Serialize};

use super::shape::{CellShape, MAX_SIDES};

/// Polarity of one attachment point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
    #[default]
    Off,
}

impl Polarity {
    #[inline]
    pub fn is_active(self) -> bool {
        self != Polarity::Off
    }

    /// Sign rule between two points: -1 repels (same sign), +1 attracts
    /// (opposite sign), 0 when either point is off.
    #[inline]
    pub fn factor(self, other: Polarity) -> f32 {
        if !self.is_active() || !other.is_active() {
            0.0
        } else if self == other {
            -1.0
        } else {
            1.0
        }
    }

    pub fn flipped(self) -> Polarity {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
            Polarity::Off => Polarity::Off,
        }
    }
}

/// Which kind of attachment point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointKind {
    /// A polygon corner
    Vertex,
    /// The midpoint of a polygon side
    Edge,
}

/// Polarity of every vertex and edge midpoint of an N-sided cell.
///
/// Vertex `i` and edge `i` are valid for `i < sides()`; edge `i` joins vertex
/// `i` and vertex `i + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PolarityState {
    sides: u8,
    vertices: [Polarity; MAX_SIDES],
    edges: [Polarity; MAX_SIDES],
}

impl PolarityState {
    /// Every point off.
    pub fn off(shape: CellShape) -> Self {
        Self {
            sides: shape.sides() as u8,
            vertices: [Polarity::Off; MAX_SIDES],
            edges: [Polarity::Off; MAX_SIDES],
        }
    }

    pub fn triangle(vertices: [Polarity; 3], edges: [Polarity; 3]) -> Self {
        let mut state = Self::off(CellShape::Triangle);
        state.vertices[..3].copy_from_slice(&vertices);
        state.edges[..3].copy_from_slice(&edges);
        state
    }

    pub fn hexagon(vertices: [Polarity; 6], edges: [Polarity; 6]) -> Self {
        Self {
            sides: 6,
            vertices,
            edges,
        }
    }

    /// Every vertex and edge set to `polarity`.
    pub fn uniform(shape: CellShape, polarity: Polarity) -> Self {
        let mut state = Self::off(shape);
        let n = shape.sides();
        state.vertices[..n].fill(polarity);
        state.edges[..n].fill(polarity);
        state
    }

    /// Copy of this state with vertex `index` changed. Out-of-range indices
    /// leave the state untouched.
    pub fn with_vertex(mut self, index: usize, polarity: Polarity) -> Self {
        if index < self.sides() {
            self.vertices[index] = polarity;
        }
        self
    }

    /// Copy of this state with edge `index` changed. Out-of-range indices
    /// leave the state untouched.
    pub fn with_edge(mut self, index: usize, polarity: Polarity) -> Self {
        if index < self.sides() {
            self.edges[index] = polarity;
        }
        self
    }

    pub fn sides(&self) -> usize {
        (self.sides as usize).min(MAX_SIDES)
    }

    pub fn vertices(&self) -> &[Polarity] {
        &self.vertices[..self.sides()]
    }

    pub fn edges(&self) -> &[Polarity] {
        &self.edges[..self.sides()]
    }

    pub fn vertex(&self, index: usize) -> Polarity {
        self.vertices().get(index).copied().unwrap_or_default()
    }

    pub fn edge(&self, index: usize) -> Polarity {
        self.edges().get(index).copied().unwrap_or_default()
    }

    /// Number of points that are not `Off`.
    pub fn active_count(&self) -> usize {
        self.vertices()
            .iter()
            .chain(self.edges())
            .filter(|p| p.is_active())
            .count()
    }

    /// Every point as `(kind, index, polarity)`, vertices first.
    pub fn points(&self) -> impl Iterator<Item = (PointKind, usize, Polarity)> + '_ {
        let vertices = self
            .vertices()
            .iter()
            .enumerate()
            .map(|(i, &p)| (PointKind::Vertex, i, p));
        let edges = self
            .edges()
            .iter()
            .enumerate()
            .map(|(i, &p)| (PointKind::Edge, i, p));
        vertices.chain(edges)
    }

    /// Same state with every polarity flipped.
    pub fn inverted(&self) -> Self {
        let mut state = *self;
        for p in state.vertices.iter_mut().chain(state.edges.iter_mut()) {
            *p = p.flipped();
        }
        state
    }
}
