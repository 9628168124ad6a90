//! # Blockworld Engine
//!
//! The core of a block-world game: a dense voxel grid over a fixed, bounded
//! world, deterministic terrain generation, per-chunk face-culled meshing and
//! view-radius chunk streaming with edit-triggered rebuilds.
//!
//! The crate has no window, GPU or input code. A frontend drives it through
//! [`EngineState`](engine_state::EngineState): it edits blocks, moves the
//! streaming reference point, ticks the game clock and consumes
//! [`RenderCommand`](engine_state::rendering::RenderCommand)s together with
//! the per-chunk geometry they point at.
//!
//! ## Key Modules
//!
//! * `config` - Engine tunables, loadable from JSON
//! * `core` - Shared-ownership primitives used across threads
//! * `engine_state` - The engine itself: voxels, meshing, streaming and tasks
//! * `error` - Error types for configuration, persistence and buffer adoption
//! * `persistence` - Saving and loading worlds through a key-value store
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     if let Err(err) = blockworld_engine::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```

use cgmath::Point3;
use log::info;
use std::time::Duration;
use web_time::Instant;

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;
pub mod persistence;

use config::EngineConfig;
use engine_state::{voxels::block::block_type::BlockType, EngineState};
use error::EngineResult;

/// Runs a headless session: generates the world described by the config file
/// named on the command line (or the default config), streams the chunks
/// around the spawn column, plants a sapling next to spawn and lets it grow.
pub fn run() -> EngineResult<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let start_time = Instant::now();
    let mut engine = EngineState::generate(config)?;

    let spawn_x = engine.config().world.size_x / 2;
    let spawn_z = engine.config().world.size_z / 2;
    let spawn_y = engine.surface_y(spawn_x, spawn_z);
    info!("Spawning at ({}, {}, {})", spawn_x, spawn_y, spawn_z);

    engine.update(Point3::new(spawn_x as f64 + 0.5, spawn_y as f64, spawn_z as f64 + 0.5));
    engine.flush_meshing();
    let initial = engine.drain_render_commands();
    info!(
        "Streamed {} chunks ({} commands) in {:?}",
        engine.streamer().active_count(),
        initial.len(),
        start_time.elapsed()
    );

    let sapling_x = spawn_x + 1;
    let sapling_y = engine.surface_y(sapling_x, spawn_z);
    if engine.get_block(sapling_x, sapling_y - 1, spawn_z) == BlockType::GRASS {
        engine.set_block(sapling_x, sapling_y, spawn_z, BlockType::SAPLING);
        info!("Planted a sapling at ({}, {}, {})", sapling_x, sapling_y, spawn_z);
    }

    let growth = engine.config().processes.sapling_growth();
    let step = Duration::from_secs(1);
    let mut elapsed = Duration::ZERO;
    while elapsed <= growth {
        engine.tick(step);
        elapsed += step;
    }
    engine.flush_meshing();

    let commands = engine.drain_render_commands();
    info!(
        "After {:?} of game time: {} render commands, {} loaded chunks, {} pending processes",
        engine.game_time(),
        commands.len(),
        engine.streamer().loaded_count(),
        engine.pending_processes()
    );

    Ok(())
}
