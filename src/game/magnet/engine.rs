//! Polarity Force Engine
//!
//! Pairwise inverse-square forces between the active attachment points of
//! physical cells. Every unordered pair of cells is visited once and every
//! pair of their active points contributes an equal and opposite force,
//! applied at the points themselves so the backend derives the torque.
//!
//! Brute force, O(C² · P²). No spatial partitioning.
//!
//! # Example
//!
//! ```ignore
//! let engine = MagnetForceEngine::new(MagnetConfig::default());
//! let stats = engine.apply(assembly.cells(), &mut world);
//! world.step(1.0 / 60.0);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::game::cell::{ActivePoint, Cell, CellId, PointKind};
use crate::physics::{BodyHandle, PhysicsBackend};

/// Force law tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnetConfig {
    /// Force numerator at unit distance
    pub base_force: f32,
    /// Point pairs farther apart than this (after the edge penalty) are skipped
    pub max_range: f32,
    /// Distances are clamped up to this before the inverse square
    pub min_distance: f32,
    /// Distance multiplier per edge-kind point in a pair
    pub edge_penalty: f32,
}

impl Default for MagnetConfig {
    fn default() -> Self {
        Self {
            base_force: 0.5,
            max_range: 3.0,
            min_distance: 0.2,
            edge_penalty: 2.0,
        }
    }
}

/// One resolved point-to-point force. `force` acts on `body_a` at
/// `point_a`; `-force` acts on `body_b` at `point_b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointInteraction {
    pub cell_a: CellId,
    pub cell_b: CellId,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub point_a: Vec2,
    pub point_b: Vec2,
    pub force: Vec2,
    /// Effective distance after edge penalty and clamping
    pub distance: f32,
}

/// Counters for one force pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForcePassStats {
    /// Physical cells with a live body
    pub cells: usize,
    pub cell_pairs: usize,
    pub point_pairs: usize,
    pub interactions: usize,
    pub out_of_range: usize,
    pub coincident: usize,
    /// Sum of force magnitudes applied to the A side
    pub total_magnitude: f32,
}

enum PointForce {
    Coincident,
    OutOfRange,
    Force { force: Vec2, distance: f32 },
}

struct Participant {
    id: CellId,
    body: BodyHandle,
    points: Vec<ActivePoint>,
}

#[derive(Clone, Debug, Default)]
pub struct MagnetForceEngine {
    config: MagnetConfig,
}

impl MagnetForceEngine {
    pub fn new(config: MagnetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MagnetConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MagnetConfig) {
        self.config = config;
    }

    /// Force on `a` from `b`; `None` when out of range or coincident.
    pub fn point_force(&self, a: &ActivePoint, b: &ActivePoint) -> Option<Vec2> {
        match self.evaluate(a, b) {
            PointForce::Force { force, .. } => Some(force),
            PointForce::Coincident | PointForce::OutOfRange => None,
        }
    }

    fn evaluate(&self, a: &ActivePoint, b: &ActivePoint) -> PointForce {
        let delta = b.position - a.position;
        let length = delta.length();
        if length <= 0.0 {
            return PointForce::Coincident;
        }

        let mut distance = length;
        for kind in [a.kind, b.kind] {
            if kind == PointKind::Edge {
                distance *= self.config.edge_penalty;
            }
        }
        if distance > self.config.max_range {
            return PointForce::OutOfRange;
        }
        let distance = distance.max(self.config.min_distance);

        let factor = a.polarity.factor(b.polarity);
        let magnitude = self.config.base_force * factor / (distance * distance);
        PointForce::Force {
            force: delta / length * magnitude,
            distance,
        }
    }

    /// Resolves every point-pair force without touching the backend.
    pub fn compute_interactions<'a, P, I>(&self, cells: I, physics: &P) -> Vec<PointInteraction>
    where
        P: PhysicsBackend + ?Sized,
        I: IntoIterator<Item = &'a Cell>,
    {
        self.compute(cells, physics).0
    }

    /// Computes the pass and applies `+F` / `-F` to each pair of bodies.
    pub fn apply<'a, P, I>(&self, cells: I, physics: &mut P) -> ForcePassStats
    where
        P: PhysicsBackend + ?Sized,
        I: IntoIterator<Item = &'a Cell>,
    {
        let (interactions, stats) = self.compute(cells, &*physics);
        for hit in &interactions {
            physics.apply_force(hit.body_a, hit.force, hit.point_a);
            physics.apply_force(hit.body_b, -hit.force, hit.point_b);
        }
        trace!(
            cells = stats.cells,
            interactions = stats.interactions,
            out_of_range = stats.out_of_range,
            total = stats.total_magnitude,
            "force pass"
        );
        stats
    }

    fn compute<'a, P, I>(&self, cells: I, physics: &P) -> (Vec<PointInteraction>, ForcePassStats)
    where
        P: PhysicsBackend + ?Sized,
        I: IntoIterator<Item = &'a Cell>,
    {
        let participants: Vec<Participant> = cells
            .into_iter()
            .filter_map(|cell| {
                let body = cell.body()?;
                let pose = physics.body_pose(body)?;
                Some(Participant {
                    id: cell.id(),
                    body,
                    points: cell.active_points(pose),
                })
            })
            .collect();

        let mut stats = ForcePassStats {
            cells: participants.len(),
            ..Default::default()
        };
        let mut interactions = Vec::new();

        for (i, first) in participants.iter().enumerate() {
            for second in &participants[i + 1..] {
                stats.cell_pairs += 1;
                for a in &first.points {
                    for b in &second.points {
                        stats.point_pairs += 1;
                        match self.evaluate(a, b) {
                            PointForce::Coincident => stats.coincident += 1,
                            PointForce::OutOfRange => stats.out_of_range += 1,
                            PointForce::Force { force, distance } => {
                                stats.interactions += 1;
                                stats.total_magnitude += force.length();
                                interactions.push(PointInteraction {
                                    cell_a: first.id,
                                    cell_b: second.id,
                                    body_a: first.body,
                                    body_b: second.body,
                                    point_a: a.position,
                                    point_b: b.position,
                                    force,
                                    distance,
                                });
                            }
                        }
                    }
                }
            }
        }

        (interactions, stats)
    }
}
