//! # Engine Configuration
//!
//! All tunables of the engine live in [`EngineConfig`]. The config is plain
//! data that can be loaded from a JSON file; every field has a default, so a
//! partial file only overrides what it names.
//!
//! ```json
//! {
//!     "world": { "size_x": 128, "size_y": 301, "size_z": 128, "min_y": -200 },
//!     "seed": 42,
//!     "view_distance": 3
//! }
//! ```

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fixed size and vertical offset of the world volume.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldDimensions {
    /// Width along X, in blocks.
    pub size_x: i32,
    /// Height along Y, in blocks.
    pub size_y: i32,
    /// Depth along Z, in blocks.
    pub size_z: i32,
    /// World Y of the lowest layer.
    pub min_y: i32,
}

impl WorldDimensions {
    /// Number of cells in the whole volume.
    pub fn volume(&self) -> usize {
        self.size_x.max(0) as usize * self.size_y.max(0) as usize * self.size_z.max(0) as usize
    }

    /// World Y of the highest layer (inclusive).
    pub fn max_y(&self) -> i32 {
        self.min_y + self.size_y - 1
    }
}

impl Default for WorldDimensions {
    fn default() -> Self {
        WorldDimensions {
            size_x: 512,
            size_y: 301,
            size_z: 512,
            min_y: -200,
        }
    }
}

/// Timings of the background world processes, in milliseconds of game time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessTimings {
    /// Delay before exposed dirt turns into grass.
    pub soil_regrowth_ms: u64,
    /// Delay before covered grass turns into dirt.
    pub grass_smothering_ms: u64,
    /// Delay before a sapling grows into a tree.
    pub sapling_growth_ms: u64,
    /// How many queued leaves are examined for decay per tick.
    pub leaf_decay_per_tick: usize,
}

impl ProcessTimings {
    pub fn soil_regrowth(&self) -> Duration {
        Duration::from_millis(self.soil_regrowth_ms)
    }

    pub fn grass_smothering(&self) -> Duration {
        Duration::from_millis(self.grass_smothering_ms)
    }

    pub fn sapling_growth(&self) -> Duration {
        Duration::from_millis(self.sapling_growth_ms)
    }
}

impl Default for ProcessTimings {
    fn default() -> Self {
        ProcessTimings {
            soil_regrowth_ms: 15_000,
            grass_smothering_ms: 10_000,
            sapling_growth_ms: 30_000,
            leaf_decay_per_tick: 4,
        }
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Size of the bounded world volume.
    pub world: WorldDimensions,
    /// Edge length of a chunk, in blocks.
    pub chunk_size: i32,
    /// World Y of the sea surface used by terrain shaping.
    pub sea_level: i32,
    /// Seed for terrain, ore and tree generation.
    pub seed: u64,
    /// Streaming radius, in chunks, on every axis.
    pub view_distance: i32,
    /// How many inactive chunk meshes are kept before the oldest is evicted.
    pub max_inactive_chunks: usize,
    /// Mesh worker threads. Zero meshes synchronously on the calling thread.
    pub worker_threads: usize,
    /// Mesh solids behind lava and leaves instead of treating those as opaque.
    pub see_through_foliage: bool,
    /// Background world process timings.
    pub processes: ProcessTimings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            world: WorldDimensions::default(),
            chunk_size: 16,
            sea_level: 0,
            seed: 0,
            view_distance: 4,
            max_inactive_chunks: 512,
            worker_threads: 0,
            see_through_foliage: false,
            processes: ProcessTimings::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a config from a JSON string and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Serializes the config as pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("world.size_x", self.world.size_x),
            ("world.size_y", self.world.size_y),
            ("world.size_z", self.world.size_z),
            ("chunk_size", self.chunk_size),
        ];
        for (field, value) in sizes {
            if value <= 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {}", value),
                });
            }
        }
        if self.view_distance < 0 {
            return Err(ConfigError::Invalid {
                field: "view_distance",
                reason: format!("must not be negative, got {}", self.view_distance),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "seed": 7, "view_distance": 2 }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.view_distance, 2);
        assert_eq!(config.chunk_size, 16);
        assert_eq!(config.world, WorldDimensions::default());
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let err = EngineConfig::from_json(r#"{ "chunk_size": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "chunk_size", .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn json_round_trip() {
        let config = EngineConfig {
            seed: 99,
            worker_threads: 2,
            ..EngineConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn default_dimensions_match_world_bounds() {
        let dims = WorldDimensions::default();
        assert_eq!(dims.max_y(), 100);
        assert_eq!(dims.volume(), 512 * 301 * 512);
    }
}
