//! Assembly Tests - Layouts, Links, Anchors and Removal
//!
//! Exercises the assembly manager against the in-crate physics world.

use chainbots_engine::game::{
    AnchorOutcome, AssemblyManager, BlockKind, CellShape, Layout, LayoutEntry, LayoutIssue,
    LinkError, LinkOutcome, MagnetForceEngine, Polarity, PolarityState,
};
use chainbots_engine::hex::HexCoordinate;
use chainbots_engine::physics::{PhysicsBackend, PhysicsWorld};
use glam::Vec2;

fn world() -> PhysicsWorld {
    let mut world = PhysicsWorld::new();
    world.create_ground(Vec2::new(0.0, 8.0), Vec2::new(50.0, 0.5));
    world
}

// ============================================================================
// Layout Initialization
// ============================================================================

#[test]
fn test_path_layout_creates_two_joints() {
    let mut world = world();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    // B lists both A and C
    let layout = Layout::new(vec![
        LayoutEntry::new(0, 0),
        LayoutEntry::new(1, 0).with_neighbor(0, 0).with_neighbor(2, 0),
        LayoutEntry::new(2, 0),
    ]);
    let report = assembly.initialize(&mut world, &layout);
    assert!(report.is_clean(), "issues: {:?}", report.issues);

    let [a, b, c] = [report.cells[0], report.cells[1], report.cells[2]];
    assert_eq!(assembly.link_count(), 2);
    assert!(assembly.has_link(a, b));
    assert!(assembly.has_link(b, c));
    assert!(!assembly.has_link(a, c));
    assert_eq!(world.joint_count(), 2);
}

#[test]
fn test_mutual_neighbors_link_once() {
    let mut world = world();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    let layout = Layout::new(vec![
        LayoutEntry::new(0, 0).with_neighbor(0, 1),
        LayoutEntry::new(0, 1).with_neighbor(0, 0),
    ]);
    let report = assembly.initialize(&mut world, &layout);
    assert!(report.is_clean());
    assert_eq!(report.links_created, 1);
    assert_eq!(world.joint_count(), 1);
}

#[test]
fn test_staircase_layout_builds_without_issues() {
    let mut world = world();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    let layout = Layout::staircase();
    let report = assembly.initialize(&mut world, &layout);
    assert!(report.is_clean());
    assert_eq!(report.cells.len(), layout.len());
    assert_eq!(assembly.anchor_count(), 11);
    assert_eq!(assembly.link_count(), 0);
}

#[test]
fn test_anchors_without_ground_are_reported() {
    let mut world = PhysicsWorld::new();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    let report = assembly.initialize(&mut world, &Layout::path(&[(0, 0), (1, 0)], true));
    assert_eq!(report.cells.len(), 2);
    assert_eq!(report.links_created, 1);
    assert_eq!(
        report.issues,
        vec![LayoutIssue::Anchor {
            index: 0,
            error: LinkError::NoGroundBody
        }]
    );
}

#[test]
fn test_non_adjacent_layout_link_is_rejected() {
    let mut world = world();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    let report = assembly.initialize(&mut world, &Layout::path(&[(0, 0), (3, 0)], false));
    assert_eq!(report.cells.len(), 2);
    assert_eq!(report.issues.len(), 1);
    assert!(matches!(
        report.issues[0],
        LayoutIssue::Link {
            index: 0,
            error: LinkError::FacesTooFarApart { .. },
            ..
        }
    ));
}

// ============================================================================
// Links and Anchors
// ============================================================================

#[test]
fn test_link_twice_yields_one_joint() {
    let mut world = world();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    let a = assembly.add_block(&mut world, 0, 0, false).unwrap();
    let b = assembly.add_block(&mut world, 1, -1, false).unwrap();

    let first = assembly.create_link_between_blocks(&mut world, a, b).unwrap();
    let second = assembly.create_link_between_blocks(&mut world, a, b).unwrap();
    assert!(matches!(first, LinkOutcome::Created(_)));
    assert!(matches!(second, LinkOutcome::AlreadyLinked(_)));
    assert_eq!(first.joint(), second.joint());
    assert_eq!(assembly.link_count(), 1);
    assert_eq!(world.joint_count(), 1);
}

#[test]
fn test_linked_pair_holds_together_under_gravity() {
    let mut world = world();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    let a = assembly.add_block(&mut world, 0, 0, true).unwrap();
    let b = assembly.add_block(&mut world, 1, 0, false).unwrap();
    assembly.create_link_between_blocks(&mut world, a, b).unwrap();

    let start = world
        .body_pose(assembly.get_block_by_id(b).unwrap().body().unwrap())
        .unwrap();
    for _ in 0..120 {
        world.step(1.0 / 60.0);
    }
    let end = world
        .body_pose(assembly.get_block_by_id(b).unwrap().body().unwrap())
        .unwrap();
    assert!(
        start.position.distance(end.position) < 0.05,
        "welded cell drifted from {} to {}",
        start.position,
        end.position
    );
}

#[test]
fn test_unlinked_cell_falls() {
    let mut world = world();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    let a = assembly.add_block(&mut world, 0, 0, false).unwrap();
    let body = assembly.get_block_by_id(a).unwrap().body().unwrap();
    let y0 = world.body_pose(body).unwrap().position.y;
    for _ in 0..30 {
        world.step(1.0 / 60.0);
    }
    assert!(world.body_pose(body).unwrap().position.y > y0);
}

#[test]
fn test_target_blocks_are_visual() {
    let mut world = world();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    let guide = assembly.add_target_block(0, 0).unwrap();
    let cell = assembly.get_block_by_id(guide).unwrap();
    assert_eq!(cell.kind(), BlockKind::Target);
    assert!(cell.body().is_none());
    assert_eq!(
        assembly.create_ground_anchor_joint(&mut world, guide),
        Err(LinkError::NoPhysicsBody(guide))
    );
    // Only the ground body exists
    assert_eq!(world.body_count(), 1);
}

#[test]
fn test_ground_anchor_outcomes() {
    let mut world = world();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    let a = assembly.add_block(&mut world, 0, 0, false).unwrap();
    let created = assembly.create_ground_anchor_joint(&mut world, a).unwrap();
    let again = assembly.create_ground_anchor_joint(&mut world, a).unwrap();
    assert!(matches!(created, AnchorOutcome::Created(_)));
    assert_eq!(again, AnchorOutcome::AlreadyAnchored(created.joint()));
    assert_eq!(assembly.ground_anchor(a), Some(created.joint()));
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn test_remove_linked_cell_then_force_pass() {
    let mut world = world();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    let report = assembly.initialize(&mut world, &Layout::path(&[(0, 0), (1, 0), (2, 0)], true));
    let state = PolarityState::uniform(CellShape::Hexagon, Polarity::Negative);
    for &id in &report.cells {
        assembly.set_cell_state(id, state).unwrap();
    }

    let middle = report.cells[1];
    assert!(assembly.remove_block_by_id(&mut world, middle).is_some());
    assert_eq!(assembly.link_count(), 0);
    assert!(assembly
        .get_block_by_coordinate(HexCoordinate::new(1, 0))
        .is_none());

    let engine = MagnetForceEngine::default();
    let stats = engine.apply(assembly.cells(), &mut world);
    assert_eq!(stats.cells, 2);
    assert!(stats.interactions > 0);
    world.step(1.0 / 60.0);
}

#[test]
fn test_coordinate_is_free_after_removal() {
    let mut world = world();
    let mut assembly = AssemblyManager::new(0.5, CellShape::Hexagon);
    let a = assembly.add_block(&mut world, 2, 2, false).unwrap();
    assembly.remove_block_by_id(&mut world, a);
    let b = assembly.add_block(&mut world, 2, 2, false).unwrap();
    assert_ne!(a, b);
    assert_eq!(
        assembly
            .get_block_by_coordinate(HexCoordinate::new(2, 2))
            .map(|c| c.id()),
        Some(b)
    );
}
