//! # Engine State Module
//!
//! The central coordinator of the engine: it owns the voxel grid, the chunk
//! streamer, the mesh worker pool and the background world processes, and is
//! the only place the grid is written after generation.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `rendering` - Meshing, materials and chunk streaming
//! * `task_management` - Worker threads for off-thread meshing
//! * `voxels` - Block types, the grid, chunks, generation and world processes
//!
//! ## Frame flow
//!
//! ```text
//! set_block ──► VoxelGrid::set ──► ChunkStreamer::rebuild_at ──► mesh (now or on a worker)
//! update    ──► ChunkStreamer::update ──────────────────────────► mesh (now or on a worker)
//! tick      ──► WorldProcesses::tick ──► rebuild of changed cells
//!           └─► apply finished worker meshes
//! ```
//!
//! Every step appends [`RenderCommand`]s to an outbox that the rendering
//! collaborator drains with [`EngineState::drain_render_commands`].

use std::sync::Arc;
use std::time::Duration;

use cgmath::Point3;
use log::{info, warn};

use rendering::{
    materials::MaterialTable,
    meshing::{AirOnly, ChunkMesher, SeeThroughFoliage, TransparencyPredicate},
    streaming::{ChunkStreamer, MeshRequest, RenderCommand},
    tasks::ChunkMeshGenerationTask,
};
use task_management::TaskManager;
use voxels::{
    block::block_type::BlockType, chunk::ChunkLayout, generation::TerrainGenerator, grid::VoxelGrid,
    world_processes::WorldProcesses,
};

use crate::{
    config::EngineConfig,
    core::MtResource,
    error::{EngineResult, PersistenceError},
    persistence::{self, SaveGame, SaveMetadata, SaveStore},
};

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```no_run
/// use blockworld_engine::{config::EngineConfig, engine_state::EngineState};
/// use cgmath::Point3;
/// use std::time::Duration;
///
/// let mut engine = EngineState::generate(EngineConfig::default())?;
/// let y = engine.surface_y(256, 256);
/// engine.update(Point3::new(256.5, y as f64, 256.5));
///
/// // Main loop
/// loop {
///     engine.tick(Duration::from_millis(16));
///     for command in engine.drain_render_commands() {
///         // hand to the renderer
///     }
/// #   break;
/// }
/// # Ok::<(), blockworld_engine::error::EngineError>(())
/// ```
pub struct EngineState {
    /// Configuration the engine was created with
    config: EngineConfig,
    /// The voxel world, shared read-only with mesh workers
    world: MtResource<VoxelGrid>,
    /// Tracks which chunks have geometry and which are visible
    streamer: ChunkStreamer,
    /// Worker pool for meshing; `None` meshes on the calling thread
    task_manager: Option<TaskManager>,
    /// Timer-driven world changes following edits
    processes: WorldProcesses,
    /// Game time elapsed since the world was created
    clock: Duration,
    /// Last reference point passed to `update`
    reference: Option<Point3<f64>>,
    /// Render commands not yet drained by the renderer
    render_commands: Vec<RenderCommand>,
}

impl EngineState {
    /// Creates a new world from the configured seed.
    ///
    /// # Errors
    /// Returns a config error if the configuration does not validate.
    pub fn generate(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;

        let mut grid = VoxelGrid::new(config.world);
        TerrainGenerator::new(config.seed, config.sea_level).generate(&mut grid);

        Ok(Self::with_grid(config, grid, Duration::ZERO))
    }

    /// Restores a world from a loaded save.
    ///
    /// # Returns
    /// The engine and the player blob of the save.
    ///
    /// # Errors
    /// Returns an error if the configuration does not validate, the save was
    /// written for other world dimensions, or the world buffer does not match
    /// the configured dimensions.
    pub fn from_save(config: EngineConfig, save: SaveGame) -> EngineResult<(Self, Vec<u8>)> {
        config.validate()?;

        let clock = match save.metadata {
            Some(metadata) => {
                if metadata.dimensions != config.world {
                    return Err(PersistenceError::DimensionMismatch {
                        expected: config.world,
                        saved: metadata.dimensions,
                    }
                    .into());
                }
                if metadata.seed != config.seed {
                    warn!(
                        "Save was generated with seed {}, config has seed {}",
                        metadata.seed, config.seed
                    );
                }
                Duration::from_millis(metadata.game_time_ms)
            }
            None => Duration::ZERO,
        };

        let grid = VoxelGrid::from_raw(config.world, save.world)?;
        info!("Restored world from save ({} cells)", grid.as_bytes().len());

        Ok((Self::with_grid(config, grid, clock), save.player))
    }

    /// Loads and restores a world from a save store.
    ///
    /// # Returns
    /// The engine and the player blob of the save.
    pub fn load(config: EngineConfig, store: &dyn SaveStore) -> EngineResult<(Self, Vec<u8>)> {
        let save = persistence::load_game(store, config.world)?;
        Self::from_save(config, save)
    }

    fn with_grid(config: EngineConfig, grid: VoxelGrid, clock: Duration) -> Self {
        let layout = ChunkLayout::new(config.chunk_size, config.world.min_y);
        let transparency: Box<dyn TransparencyPredicate> = if config.see_through_foliage {
            Box::new(SeeThroughFoliage)
        } else {
            Box::new(AirOnly)
        };
        let mesher = Arc::new(ChunkMesher::new(layout, transparency, MaterialTable::default()));
        let streamer = ChunkStreamer::new(mesher, config.world, config.max_inactive_chunks);
        let task_manager = (config.worker_threads > 0).then(|| TaskManager::new(config.worker_threads));
        let processes = WorldProcesses::new(config.processes, config.seed);

        EngineState {
            config,
            world: MtResource::new(grid),
            streamer,
            task_manager,
            processes,
            clock,
            reference: None,
            render_commands: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A shared handle to the voxel grid.
    pub fn world(&self) -> MtResource<VoxelGrid> {
        self.world.clone()
    }

    pub fn streamer(&self) -> &ChunkStreamer {
        &self.streamer
    }

    /// Game time elapsed since the world was created, across saves.
    pub fn game_time(&self) -> Duration {
        self.clock
    }

    pub fn reference(&self) -> Option<Point3<f64>> {
        self.reference
    }

    /// Number of pending world process entries.
    pub fn pending_processes(&self) -> usize {
        self.processes.pending()
    }

    /// Reads a block. Positions outside the world read as air.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.world.get().get(x, y, z)
    }

    /// The Y a body should stand on in the given column.
    pub fn surface_y(&self, x: i32, z: i32) -> i32 {
        self.world.get().surface_y(x, z)
    }

    /// Writes a block and rebuilds the affected chunks.
    ///
    /// # Returns
    /// `false` without any effect if the position lies outside the world.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockType) -> bool {
        let position = Point3::new(x, y, z);
        let exposed = {
            let mut grid = self.world.get_mut();
            if !grid.contains(x, y, z) {
                return false;
            }
            let previous = grid.get(x, y, z);
            grid.set(x, y, z, block);
            self.processes
                .on_block_changed(&grid, position, previous, self.clock);
            grid.drain_exposed_soil()
        };
        self.processes.schedule_exposed_soil(exposed, self.clock);

        let requests = self.streamer.rebuild_at_deferred(x, y, z);
        self.dispatch(requests);
        true
    }

    /// Moves the streaming reference point.
    pub fn update(&mut self, reference: Point3<f64>) {
        self.reference = Some(reference);
        let (commands, requests) = self
            .streamer
            .update_deferred(reference, self.config.view_distance);
        self.render_commands.extend(commands);
        self.dispatch(requests);
    }

    /// Advances the game clock by `delta`.
    ///
    /// Runs due world processes, rebuilds the chunks they changed, and applies
    /// any meshes finished by workers since the last tick.
    pub fn tick(&mut self, delta: Duration) {
        self.clock += delta;

        let (changed, exposed) = {
            let mut grid = self.world.get_mut();
            let changed = self.processes.tick(&mut grid, self.clock);
            (changed, grid.drain_exposed_soil())
        };
        self.processes.schedule_exposed_soil(exposed, self.clock);

        if !changed.is_empty() {
            let requests = self.streamer.rebuild_cells_deferred(&changed);
            self.dispatch(requests);
        }

        if let Some(task_manager) = self.task_manager.as_mut() {
            let commands = task_manager.process_completed_tasks(&mut self.streamer);
            self.render_commands.extend(commands);
            task_manager.process_queued_tasks();
        }
    }

    /// Blocks until every outstanding mesh task has been applied.
    ///
    /// Does nothing when meshing is synchronous.
    pub fn flush_meshing(&mut self) {
        if let Some(task_manager) = self.task_manager.as_mut() {
            let commands = task_manager.wait_until_idle(&mut self.streamer);
            self.render_commands.extend(commands);
        }
    }

    /// Takes every render command produced since the last drain.
    pub fn drain_render_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.render_commands)
    }

    /// Writes the world, the player blob and the world metadata to `store`.
    pub fn save(&self, store: &mut dyn SaveStore, player: &[u8]) -> EngineResult<()> {
        let metadata = SaveMetadata {
            seed: self.config.seed,
            dimensions: self.config.world,
            game_time_ms: self.clock.as_millis() as u64,
        };
        persistence::save_game(store, &self.world.get(), player, &metadata)?;
        Ok(())
    }

    /// Meshes the requested chunks on the worker pool, or right away when
    /// there is none.
    fn dispatch(&mut self, requests: Vec<MeshRequest>) {
        match self.task_manager.as_mut() {
            Some(task_manager) => {
                let mesher = self.streamer.mesher();
                for request in requests {
                    task_manager.publish_task(Box::new(ChunkMeshGenerationTask::new(
                        self.world.clone(),
                        mesher.clone(),
                        request,
                    )));
                }
            }
            None => {
                let grid = self.world.get();
                let mesher = self.streamer.mesher();
                for request in requests {
                    let mesh = mesher.mesh_chunk(&grid, request.key);
                    if let Some(command) = self.streamer.install_mesh(request.key, request.revision, mesh) {
                        self.render_commands.push(command);
                    }
                }
            }
        }
    }
}
