//! # World Processes
//!
//! Slow, timer-driven changes to the world that follow player edits:
//!
//! * **Soil regrowth**: dirt left uncovered turns back into grass.
//! * **Grass smothering**: grass with a block placed on top turns into dirt.
//! * **Sapling growth**: a planted sapling grows into a full tree.
//! * **Leaf decay**: leaves cut off from every trunk fall away, a few per tick.
//!
//! Processes are driven by a game clock passed into [`WorldProcesses::tick`],
//! so they advance only while the simulation runs. Every cell a process
//! changes is returned to the caller, which routes it through the same mesh
//! rebuild path as a player edit.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use cgmath::Point3;
use log::debug;

use crate::config::ProcessTimings;

use super::{block::block_type::BlockType, generation::trees, grid::VoxelGrid};

/// Leaves survive if a trunk block lies within this Euclidean distance.
const LEAF_SUPPORT_RADIUS: i32 = 4;

/// Pending world processes.
pub struct WorldProcesses {
    timings: ProcessTimings,
    /// Exposed dirt and the time it was exposed.
    soil_regrowth: HashMap<Point3<i32>, Duration>,
    /// Covered grass and the time it was covered.
    smothered_grass: HashMap<Point3<i32>, Duration>,
    /// Planted saplings and the time they were planted.
    saplings: HashMap<Point3<i32>, Duration>,
    /// Leaves waiting to be checked for a supporting trunk.
    leaf_decay: VecDeque<Point3<i32>>,
    /// Mirror of `leaf_decay` to keep the queue free of duplicates.
    leaf_decay_set: HashSet<Point3<i32>>,
    /// Drives the height of trees grown from saplings.
    rng: fastrand::Rng,
}

impl WorldProcesses {
    /// Creates an idle process set.
    pub fn new(timings: ProcessTimings, seed: u64) -> Self {
        WorldProcesses {
            timings,
            soil_regrowth: HashMap::new(),
            smothered_grass: HashMap::new(),
            saplings: HashMap::new(),
            leaf_decay: VecDeque::new(),
            leaf_decay_set: HashSet::new(),
            rng: fastrand::Rng::with_seed(seed.wrapping_add(1)),
        }
    }

    /// Total number of scheduled entries across all processes.
    pub fn pending(&self) -> usize {
        self.soil_regrowth.len() + self.smothered_grass.len() + self.saplings.len() + self.leaf_decay.len()
    }

    /// Schedules dirt cells reported as exposed by the grid.
    pub fn schedule_exposed_soil(&mut self, positions: impl IntoIterator<Item = Point3<i32>>, now: Duration) {
        for position in positions {
            self.soil_regrowth.insert(position, now);
        }
    }

    /// Reacts to an edit of `position`, whose previous block was `previous`.
    ///
    /// Must be called after the grid has been written.
    pub fn on_block_changed(
        &mut self,
        grid: &VoxelGrid,
        position: Point3<i32>,
        previous: BlockType,
        now: Duration,
    ) {
        let current = grid.get_at(position);
        let below = Point3::new(position.x, position.y - 1, position.z);

        if !current.is_air() && grid.get_at(below) == BlockType::GRASS {
            self.smothered_grass.insert(below, now);
        }

        if current == BlockType::SAPLING {
            self.saplings.insert(position, now);
        }

        if current.is_air() && matches!(previous, BlockType::WOOD | BlockType::LEAVES) {
            self.queue_leaf_neighbours(grid, position);
        }
    }

    /// Advances every process to `now`.
    ///
    /// # Returns
    /// Every cell that was changed, in the order the changes were made.
    pub fn tick(&mut self, grid: &mut VoxelGrid, now: Duration) -> Vec<Point3<i32>> {
        let mut changed = Vec::new();

        for position in Self::take_due(&mut self.soil_regrowth, now, self.timings.soil_regrowth()) {
            let above = Point3::new(position.x, position.y + 1, position.z);
            if grid.get_at(position) == BlockType::DIRT && grid.get_at(above).is_air() {
                grid.set_at(position, BlockType::GRASS);
                changed.push(position);
            }
        }

        for position in Self::take_due(&mut self.smothered_grass, now, self.timings.grass_smothering()) {
            let above = Point3::new(position.x, position.y + 1, position.z);
            if grid.get_at(position) == BlockType::GRASS && !grid.get_at(above).is_air() {
                grid.set_at(position, BlockType::DIRT);
                changed.push(position);
            }
        }

        for position in Self::take_due(&mut self.saplings, now, self.timings.sapling_growth()) {
            if grid.get_at(position) == BlockType::SAPLING {
                changed.extend(trees::grow_tree(grid, &mut self.rng, position));
            }
        }

        for _ in 0..self.timings.leaf_decay_per_tick {
            let Some(position) = self.leaf_decay.pop_front() else {
                break;
            };
            self.leaf_decay_set.remove(&position);

            if grid.get_at(position) != BlockType::LEAVES || Self::has_trunk_nearby(grid, position) {
                continue;
            }
            grid.set_at(position, BlockType::AIR);
            changed.push(position);
            self.queue_leaf_neighbours(grid, position);
        }

        if !changed.is_empty() {
            debug!("World processes changed {} cells", changed.len());
        }
        changed
    }

    /// Removes and returns every entry scheduled at least `delay` before `now`,
    /// sorted by position so results do not depend on hash order.
    fn take_due(
        queue: &mut HashMap<Point3<i32>, Duration>,
        now: Duration,
        delay: Duration,
    ) -> Vec<Point3<i32>> {
        let mut due: Vec<Point3<i32>> = queue
            .iter()
            .filter(|(_, &scheduled)| now.saturating_sub(scheduled) >= delay)
            .map(|(&position, _)| position)
            .collect();
        due.sort_by_key(|p| (p.x, p.y, p.z));
        for position in &due {
            queue.remove(position);
        }
        due
    }

    /// Queues every leaf block among the 26 neighbours of `position`.
    fn queue_leaf_neighbours(&mut self, grid: &VoxelGrid, position: Point3<i32>) {
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    let neighbour = Point3::new(position.x + dx, position.y + dy, position.z + dz);
                    if grid.get_at(neighbour) == BlockType::LEAVES && self.leaf_decay_set.insert(neighbour) {
                        self.leaf_decay.push_back(neighbour);
                    }
                }
            }
        }
    }

    fn has_trunk_nearby(grid: &VoxelGrid, position: Point3<i32>) -> bool {
        let r = LEAF_SUPPORT_RADIUS;
        for dx in -r..=r {
            for dy in -r..=r {
                for dz in -r..=r {
                    if dx * dx + dy * dy + dz * dz > r * r {
                        continue;
                    }
                    if grid.get(position.x + dx, position.y + dy, position.z + dz) == BlockType::WOOD {
                        return true;
                    }
                }
            }
        }
        false
    }
}
