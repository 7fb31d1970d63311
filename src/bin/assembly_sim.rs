//! Headless Assembly Simulation
//!
//! Run with: `cargo run --bin assembly_sim -- [config.json] [frames]`
//!
//! Builds the configured layout (the staircase demo when none is given),
//! magnetizes the free cells, adds a chainbot swinging one leg, runs the
//! fixed-step simulation for a number of 60 Hz frames and logs a summary.
//! Set `RUST_LOG=debug` to see every link and anchor as it is created.

use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use chainbots_engine::game::{
    Chainbot, ChainbotMotor, Layout, LegSide, MotorState, Polarity, PolarityState, Simulation,
    SimulationConfig,
};
use chainbots_engine::hex::HexCoordinate;

const DEFAULT_FRAMES: u32 = 600;
const FRAME_DT: f32 = 1.0 / 60.0;
/// Free slot above the staircase; the right leg lands next to a ground cell.
const CHAINBOT_ORIGIN: HexCoordinate = HexCoordinate::new(-8, 10);

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let mut config = match args.next() {
        Some(path) => match SimulationConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(%path, error = %err, "could not load config");
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };
    let frames = match args.next().map(|s| s.parse::<u32>()) {
        Some(Ok(frames)) => frames,
        Some(Err(err)) => {
            error!(error = %err, "frame count must be a whole number");
            return ExitCode::FAILURE;
        }
        None => DEFAULT_FRAMES,
    };
    if config.layout.is_none() {
        config.layout = Some(Layout::staircase());
    }

    let mut sim = match Simulation::from_config(&config) {
        Ok(sim) => sim,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    for issue in &sim.layout_report().issues {
        warn!(%issue, "layout entry skipped");
    }

    // Alternate polarity across the free cells so the field has work to do
    {
        let shape = config.cell_shape;
        let (assembly, _) = sim.edit();
        let free: Vec<_> = assembly
            .cells()
            .filter(|cell| !cell.is_ground_anchored())
            .map(|cell| cell.id())
            .collect();
        for (i, id) in free.into_iter().enumerate() {
            let polarity = if i % 2 == 0 {
                Polarity::Positive
            } else {
                Polarity::Negative
            };
            if let Err(err) = assembly.set_cell_state(id, PolarityState::uniform(shape, polarity)) {
                warn!(%id, error = %err, "could not magnetize cell");
            }
        }
    }

    // A chainbot that grips the staircase with its right leg and swings the
    // left one
    {
        let (assembly, physics) = sim.edit();
        match Chainbot::build(assembly, physics, CHAINBOT_ORIGIN) {
            Ok(mut bot) => {
                match bot.attach_leg_to_nearest(assembly, physics, LegSide::Right) {
                    Ok(rock) => info!(%rock, "chainbot gripped the staircase"),
                    Err(err) => warn!(error = %err, "chainbot could not grip"),
                }
                let swing = bot.release_knee(assembly, physics).and_then(|_| {
                    bot.set_motor(assembly, physics, ChainbotMotor::LeftHip, MotorState::Forward)
                });
                if let Err(err) = swing {
                    warn!(error = %err, "chainbot motor rejected");
                }
            }
            Err(err) => warn!(error = %err, "chainbot not placed"),
        }
    }

    info!(
        cells = sim.assembly().cell_count(),
        links = sim.assembly().link_count(),
        anchors = sim.assembly().anchor_count(),
        frames,
        "starting simulation"
    );

    sim.start();
    for _ in 0..frames {
        sim.update(FRAME_DT);
    }
    sim.stop();

    let pass = sim.last_pass();
    info!(
        steps = sim.steps(),
        interactions = pass.interactions,
        out_of_range = pass.out_of_range,
        total_force = pass.total_magnitude,
        "simulation finished"
    );

    for instance in sim.assembly().cell_instances(sim.physics()) {
        info!(
            id = instance.id,
            x = instance.position[0],
            y = instance.position[1],
            rotation = instance.rotation,
            "cell"
        );
    }

    ExitCode::SUCCESS
}
