//! Simulation Tests - Fixed Stepping, Playback State and Config
//!
//! End-to-end runs of the simulation driver on the in-crate world.

use chainbots_engine::game::{
    AnchorOutcome, Layout, MotorState, Polarity, PolarityState, Simulation, SimulationConfig,
};
use chainbots_engine::physics::{FixedStepper, JointKind, PhysicsBackend, SimulationState};

// ============================================================================
// Fixed Stepper
// ============================================================================

#[test]
fn test_stepper_carries_remainder() {
    let mut stepper = FixedStepper::new(0.01, 8);
    assert_eq!(stepper.advance(0.025), 2);
    assert!((stepper.accumulator() - 0.005).abs() < 1e-6);
    assert_eq!(stepper.advance(0.0051), 1);
}

#[test]
fn test_stepper_drops_backlog_at_cap() {
    let mut stepper = FixedStepper::new(0.01, 4);
    assert_eq!(stepper.advance(1.0), 4);
    assert!(stepper.accumulator() < 0.01);
}

// ============================================================================
// Simulation Driver
// ============================================================================

#[test]
fn test_staircase_runs_and_anchored_cells_stay_put() {
    let config = SimulationConfig {
        layout: Some(Layout::staircase()),
        ..Default::default()
    };
    let mut sim = Simulation::from_config(&config).unwrap();
    assert!(sim.layout_report().is_clean());

    let anchored: Vec<_> = sim
        .assembly()
        .cells()
        .filter(|c| c.is_ground_anchored())
        .map(|c| (c.id(), c.world_pose(sim.physics()).unwrap().position))
        .collect();
    assert_eq!(anchored.len(), 11);

    sim.start();
    for _ in 0..60 {
        sim.update(1.0 / 60.0);
    }
    assert!(sim.steps() >= 59);

    for (id, start) in anchored {
        let cell = sim.assembly().get_block_by_id(id).unwrap();
        let now = cell.world_pose(sim.physics()).unwrap().position;
        assert!(start.distance(now) < 0.05, "anchored cell {id} moved");
    }
}

#[test]
fn test_free_cells_are_pulled_together() {
    let mut sim = Simulation::from_config(&SimulationConfig {
        gravity: glam::Vec2::ZERO,
        ..Default::default()
    })
    .unwrap();
    let (a, b) = {
        let (assembly, physics) = sim.edit();
        let a = assembly.add_block(physics, 0, 0, false).unwrap();
        let b = assembly.add_block(physics, 2, 0, false).unwrap();
        let shape = assembly.cell_shape();
        assembly
            .set_cell_state(a, PolarityState::uniform(shape, Polarity::Positive))
            .unwrap();
        assembly
            .set_cell_state(b, PolarityState::uniform(shape, Polarity::Negative))
            .unwrap();
        (a, b)
    };
    let gap = |sim: &Simulation<_>| {
        let pa = sim.assembly().get_block_by_id(a).unwrap().world_pose(sim.physics()).unwrap();
        let pb = sim.assembly().get_block_by_id(b).unwrap().world_pose(sim.physics()).unwrap();
        pa.position.distance(pb.position)
    };

    let before = gap(&sim);
    for _ in 0..30 {
        sim.step_once();
    }
    assert!(gap(&sim) < before);
}

#[test]
fn test_hinge_motor_through_simulation() {
    let config = SimulationConfig {
        layout: Some(Layout::path(&[(0, 0), (1, 0)], true)),
        link: chainbots_engine::game::config::LinkConfig {
            default_kind: JointKind::Hinge { motor: None },
            ..Default::default()
        },
        ..Default::default()
    };
    let mut sim = Simulation::from_config(&config).unwrap();
    let ids: Vec<_> = sim.assembly().cells().map(|c| c.id()).collect();
    sim.set_motor(ids[0], ids[1], MotorState::Forward).unwrap();

    let body = sim.assembly().get_block_by_id(ids[1]).unwrap().body().unwrap();
    let before = sim.physics().body_pose(body).unwrap().rotation;
    for _ in 0..60 {
        sim.step_once();
    }
    let after = sim.physics().body_pose(body).unwrap().rotation;
    assert!((after - before).abs() > 0.1);
}

#[test]
fn test_stop_and_reset() {
    let mut sim = Simulation::from_config(&SimulationConfig {
        layout: Some(Layout::path(&[(0, 0), (1, 0), (2, 0)], false)),
        ..Default::default()
    })
    .unwrap();
    sim.start();
    sim.update(0.1);
    sim.stop();
    assert_eq!(sim.state(), SimulationState::Stopped);
    assert_eq!(sim.update(0.1), 0);

    let report = sim.reset();
    assert_eq!(report.cells.len(), 3);
    assert_eq!(report.links_created, 2);
    assert_eq!(sim.steps(), 0);
}

#[test]
fn test_replacing_ground_drops_stale_anchors() {
    let mut sim = Simulation::from_config(&SimulationConfig {
        layout: Some(Layout::path(&[(0, 0), (1, 0)], true)),
        ..Default::default()
    })
    .unwrap();
    let first = sim.layout_report().cells[0];
    assert_eq!(sim.assembly().anchor_count(), 1);

    {
        let (_, physics) = sim.edit();
        physics.create_ground(glam::Vec2::new(0.0, 10.0), glam::Vec2::new(50.0, 0.5));
    }
    sim.step_once();
    assert_eq!(sim.assembly().anchor_count(), 0);
    assert_eq!(sim.assembly().link_count(), 1);
    assert!(!sim.assembly().get_block_by_id(first).unwrap().is_ground_anchored());

    let (assembly, physics) = sim.edit();
    let late = assembly.add_block(physics, 4, 4, true).unwrap();
    assert!(assembly.get_block_by_id(late).unwrap().is_ground_anchored());
    assert!(matches!(
        assembly.create_ground_anchor_joint(physics, first),
        Ok(AnchorOutcome::Created(_))
    ));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_json_drives_simulation() {
    let config = SimulationConfig::from_json_str(
        r#"{
            "cell_size": 0.4,
            "cell_shape": "Triangle",
            "ground": { "enabled": false },
            "layout": [{ "q": 0, "r": 0 }, { "q": 3, "r": 3 }]
        }"#,
    )
    .unwrap();
    let sim = Simulation::from_config(&config).unwrap();
    assert!(sim.physics().ground_body().is_none());
    assert_eq!(sim.assembly().cell_count(), 2);
    assert_eq!(sim.assembly().cell_size(), 0.4);
}
