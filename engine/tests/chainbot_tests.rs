//! Chainbot Tests - Prefabs, Motors and Leg Attachment
//!
//! Drives hinge motors through the simulation and checks that legs swing
//! on their hips while anchored bodies stay put.

use chainbots_engine::game::{
    AssemblyManager, ChainStructure, Chainbot, ChainbotMotor, LegSide, MotorState, Simulation,
    SimulationConfig,
};
use chainbots_engine::hex::HexCoordinate;
use chainbots_engine::physics::PhysicsWorld;
use glam::Vec2;

fn weightless() -> Simulation<PhysicsWorld> {
    Simulation::from_config(&SimulationConfig {
        gravity: Vec2::ZERO,
        ..Default::default()
    })
    .unwrap()
}

fn rotation(sim: &Simulation<PhysicsWorld>, id: chainbots_engine::game::CellId) -> f32 {
    sim.assembly()
        .get_block_by_id(id)
        .and_then(|cell| cell.world_pose(sim.physics()))
        .map(|pose| pose.rotation)
        .unwrap()
}

// ============================================================================
// Prefab Structures
// ============================================================================

#[test]
fn test_two_leg_hip_motor_swings_leg() {
    let mut sim = weightless();
    let structure = {
        let (assembly, physics) = sim.edit();
        let structure = ChainStructure::two_leg(assembly, physics, HexCoordinate::ORIGIN).unwrap();
        assembly.create_ground_anchor_joint(physics, structure.body()).unwrap();
        structure
            .set_motor(assembly, physics, 0, MotorState::Forward)
            .unwrap();
        structure
    };
    let upper = structure.cells()[1];

    for _ in 0..120 {
        sim.step_once();
    }

    assert!(rotation(&sim, upper) > 0.1, "upper leg did not swing");
    assert!(rotation(&sim, structure.body()).abs() < 0.01, "anchored body turned");
}

#[test]
fn test_two_leg_without_motor_stays_still() {
    let mut sim = weightless();
    let structure = {
        let (assembly, physics) = sim.edit();
        let structure = ChainStructure::two_leg(assembly, physics, HexCoordinate::ORIGIN).unwrap();
        assembly.create_ground_anchor_joint(physics, structure.body()).unwrap();
        structure
    };

    for _ in 0..60 {
        sim.step_once();
    }

    for &id in structure.cells() {
        assert!(rotation(&sim, id).abs() < 0.01);
    }
}

#[test]
fn test_parallel_leg_motors_drive_both_legs() {
    let mut sim = weightless();
    let structure = {
        let (assembly, physics) = sim.edit();
        let structure =
            ChainStructure::parallel_leg(assembly, physics, HexCoordinate::ORIGIN).unwrap();
        assembly.create_ground_anchor_joint(physics, structure.body()).unwrap();
        // Hinges 0 and 2 are the two hips
        for hip in [0, 2] {
            structure
                .set_motor(assembly, physics, hip, MotorState::Backward)
                .unwrap();
        }
        structure
    };

    for _ in 0..120 {
        sim.step_once();
    }

    // Upper segments of the left and right legs
    assert!(rotation(&sim, structure.cells()[1]) < -0.1);
    assert!(rotation(&sim, structure.cells()[3]) < -0.1);
}

// ============================================================================
// Chainbot
// ============================================================================

#[test]
fn test_released_knee_lets_hip_swing_leg() {
    let mut sim = weightless();
    let mut bot = {
        let (assembly, physics) = sim.edit();
        let mut bot = Chainbot::build(assembly, physics, HexCoordinate::ORIGIN).unwrap();
        assembly.create_ground_anchor_joint(physics, bot.body()).unwrap();
        assert!(bot.release_knee(assembly, physics).unwrap());
        bot.set_motor(assembly, physics, ChainbotMotor::LeftHip, MotorState::Forward)
            .unwrap();
        bot
    };

    for _ in 0..60 {
        sim.step_once();
    }

    let left = rotation(&sim, bot.leg(LegSide::Left).cell);
    let right = rotation(&sim, bot.leg(LegSide::Right).cell);
    assert!(left > 0.1, "left leg did not swing");
    assert!(right.abs() < left.abs());

    // The knee only re-engages while the inner faces still meet
    let (assembly, physics) = sim.edit();
    bot.stop_motors(assembly, physics).unwrap();
    let (left_cell, right_cell) = bot.motor_pair(ChainbotMotor::Knee);
    let (gap, _, _) = assembly.face_gap(&*physics, left_cell, right_cell).unwrap();
    let tolerance = assembly.link_config().tolerance_ratio * assembly.cell_size();
    assert_eq!(bot.engage_knee(assembly, physics).is_ok(), gap <= tolerance);
    assert_eq!(bot.is_knee_engaged(assembly), gap <= tolerance);
}

#[test]
fn test_leg_grips_anchored_block() {
    let mut sim = Simulation::from_config(&SimulationConfig::default()).unwrap();
    let (mut bot, rock) = {
        let (assembly, physics) = sim.edit();
        // Anchored block east of the right leg
        let rock = assembly.add_block(physics, 1, 1, true).unwrap();
        let bot = Chainbot::build(assembly, physics, HexCoordinate::ORIGIN).unwrap();
        (bot, rock)
    };
    {
        let (assembly, physics) = sim.edit();
        assert_eq!(
            bot.attach_leg_to_nearest(assembly, physics, LegSide::Right),
            Ok(rock)
        );
    }

    let foot = bot.leg(LegSide::Right).cell;
    let start = sim
        .assembly()
        .get_block_by_id(foot)
        .and_then(|cell| cell.world_pose(sim.physics()))
        .unwrap()
        .position;
    for _ in 0..60 {
        sim.step_once();
    }
    let held = sim
        .assembly()
        .get_block_by_id(foot)
        .and_then(|cell| cell.world_pose(sim.physics()))
        .unwrap()
        .position;
    assert!(start.distance(held) < 0.05, "gripping leg fell");

    {
        let (assembly, physics) = sim.edit();
        assert!(bot.detach_leg(assembly, physics, LegSide::Right).unwrap());
    }
    for _ in 0..60 {
        sim.step_once();
    }
    let fallen = sim
        .assembly()
        .get_block_by_id(foot)
        .and_then(|cell| cell.world_pose(sim.physics()))
        .unwrap()
        .position;
    assert!(fallen.y > held.y + 0.1, "released chainbot should fall");
}

#[test]
fn test_removing_chainbot_frees_slots() {
    let mut world = PhysicsWorld::new();
    let mut assembly = AssemblyManager::new(0.5, Default::default());
    let bot = Chainbot::build(&mut assembly, &mut world, HexCoordinate::new(3, 3)).unwrap();
    assert_eq!(bot.remove(&mut assembly, &mut world), 3);
    assert_eq!(assembly.cell_count(), 0);
    assert_eq!(world.joint_count(), 0);
    assert!(Chainbot::build(&mut assembly, &mut world, HexCoordinate::new(3, 3)).is_ok());
}
