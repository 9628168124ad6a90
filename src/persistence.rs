//! # Save Games
//!
//! A save is three entries in a key-value [`SaveStore`]:
//!
//! * `world`: the raw grid buffer, one byte per cell in linear index order
//! * `player`: an opaque blob owned by the player collaborator
//! * `meta`: JSON [`SaveMetadata`] describing the world the buffer belongs to
//!
//! Loading validates the world buffer against the expected dimensions before
//! anything is handed to the grid.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::WorldDimensions;
use crate::engine_state::voxels::grid::VoxelGrid;
use crate::error::PersistenceError;

pub const WORLD_KEY: &str = "world";
pub const PLAYER_KEY: &str = "player";
pub const METADATA_KEY: &str = "meta";

/// A byte-blob key-value store.
pub trait SaveStore {
    /// Reads the entry under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Writes the entry under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), PersistenceError>;
}

/// An in-memory store, for tests and tools.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// A store keeping one file per key inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Opens (and creates if needed) the store directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(DirectoryStore { root })
    }

    fn path_of(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.bin"))
    }
}

impl SaveStore for DirectoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        match fs::read(self.path_of(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), PersistenceError> {
        fs::write(self.path_of(key), value)?;
        Ok(())
    }
}

/// Describes the world a saved buffer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub seed: u64,
    pub dimensions: WorldDimensions,
    /// Game clock at the time of saving, in milliseconds.
    pub game_time_ms: u64,
}

/// A loaded, validated save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveGame {
    /// Grid buffer of exactly `dimensions.volume()` bytes.
    pub world: Vec<u8>,
    /// Opaque player state. Empty if the save had none.
    pub player: Vec<u8>,
    /// Present for saves written with metadata.
    pub metadata: Option<SaveMetadata>,
}

/// Writes the grid, the player blob and the metadata to `store`.
pub fn save_game(
    store: &mut dyn SaveStore,
    grid: &VoxelGrid,
    player: &[u8],
    metadata: &SaveMetadata,
) -> Result<(), PersistenceError> {
    store.put(WORLD_KEY, grid.as_bytes().to_vec())?;
    store.put(PLAYER_KEY, player.to_vec())?;
    store.put(METADATA_KEY, serde_json::to_vec(metadata)?)?;

    info!(
        "Saved world ({} bytes) and player ({} bytes)",
        grid.as_bytes().len(),
        player.len()
    );
    Ok(())
}

/// Reads a save from `store` and validates it against `dimensions`.
///
/// # Errors
/// * [`PersistenceError::Missing`] if there is no world entry
/// * [`PersistenceError::LengthMismatch`] if the world entry is not exactly
///   one byte per cell of `dimensions`
/// * [`PersistenceError::Metadata`] if the metadata entry is not valid JSON
/// * [`PersistenceError::DimensionMismatch`] if the metadata describes a world
///   of other dimensions
pub fn load_game(store: &dyn SaveStore, dimensions: WorldDimensions) -> Result<SaveGame, PersistenceError> {
    let world = store.get(WORLD_KEY)?.ok_or(PersistenceError::Missing(WORLD_KEY))?;

    let expected = dimensions.volume();
    if world.len() != expected {
        return Err(PersistenceError::LengthMismatch {
            expected,
            actual: world.len(),
        });
    }

    let player = store.get(PLAYER_KEY)?.unwrap_or_default();
    let metadata: Option<SaveMetadata> = match store.get(METADATA_KEY)? {
        Some(bytes) => Some(serde_json::from_slice(&bytes)?),
        None => None,
    };

    // Same volume in another shape would adopt cleanly but scramble the world.
    if let Some(saved) = metadata.map(|m| m.dimensions) {
        if saved != dimensions {
            return Err(PersistenceError::DimensionMismatch {
                expected: dimensions,
                saved,
            });
        }
    }

    debug!(
        "Loaded save: world {} bytes, player {} bytes, metadata {:?}",
        world.len(),
        player.len(),
        metadata
    );

    Ok(SaveGame {
        world,
        player,
        metadata,
    })
}
