//! Hex Coordinate Tests - Pixel Round-Trips, Neighbors and Cell Fit
//!
//! Tests for the axial coordinate system and how hexagon cells placed on it
//! line up face to face.

use chainbots_engine::game::CellShape;
use chainbots_engine::hex::{HEX_DIRECTIONS, HexCoordinate};
use glam::Vec2;

const SIZES: [f32; 4] = [0.25, 0.5, 1.0, 3.7];

// ============================================================================
// Pixel Conversion
// ============================================================================

#[test]
fn test_origin_maps_to_zero_for_any_size() {
    for size in SIZES {
        assert_eq!(HexCoordinate::ORIGIN.to_pixel(size), Vec2::ZERO);
    }
}

#[test]
fn test_pixel_roundtrip_over_range() {
    for size in SIZES {
        for q in -20..=20 {
            for r in -20..=20 {
                let c = HexCoordinate::new(q, r);
                assert_eq!(
                    HexCoordinate::from_pixel(c.to_pixel(size), size),
                    c,
                    "roundtrip failed for {c} at size {size}"
                );
            }
        }
    }
}

#[test]
fn test_from_pixel_snaps_nearby_points() {
    let c = HexCoordinate::new(3, -2);
    let center = c.to_pixel(1.0);
    for offset in [Vec2::new(0.3, 0.0), Vec2::new(-0.2, 0.25), Vec2::new(0.0, -0.4)] {
        assert_eq!(HexCoordinate::from_pixel(center + offset, 1.0), c);
    }
}

// ============================================================================
// Neighbors
// ============================================================================

#[test]
fn test_neighbor_then_opposite_is_identity() {
    for q in -5..=5 {
        for r in -5..=5 {
            let c = HexCoordinate::new(q, r);
            for d in 0..HEX_DIRECTIONS.len() {
                assert_eq!(c.neighbor(d).neighbor((d + 3) % 6), c);
            }
        }
    }
}

#[test]
fn test_neighbors_are_distance_one() {
    let c = HexCoordinate::new(-4, 7);
    for n in c.neighbors() {
        assert_eq!(c.distance(n), 1);
    }
    assert_eq!(c.distance(c), 0);
}

#[test]
fn test_neighbor_centers_are_sqrt3_size_apart() {
    let size = 0.5;
    let c = HexCoordinate::new(1, 1);
    for n in c.neighbors() {
        let d = c.to_pixel(size).distance(n.to_pixel(size));
        assert!((d - 3.0_f32.sqrt() * size).abs() < 1e-5);
    }
}

// ============================================================================
// Cell Fit
// ============================================================================

#[test]
fn test_adjacent_hex_cells_share_a_face() {
    let size = 0.5;
    let edges = CellShape::Hexagon.local_edge_midpoints(size);
    let c = HexCoordinate::new(2, -1);
    for d in 0..6 {
        let n = c.neighbor(d);
        let face = c.to_pixel(size) + edges[d];
        let opposite = n.to_pixel(size) + edges[(d + 3) % 6];
        assert!(
            face.distance(opposite) < 1e-4,
            "direction {d}: faces {face} and {opposite} do not meet"
        );
    }
}
