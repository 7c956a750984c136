use std::collections::HashMap;
use std::time::Duration;

use blockfield_common::{BlockPos, BlockType, WorldError};
use serde::{Deserialize, Serialize};

use crate::block::{Block, CheckOutcome};
use crate::chunk::ChunkIndex;
use crate::collision::CollisionList;
use crate::config::{TransitionPolicy, WorldConfig};
use crate::scene::{HeadlessScene, Scene};
use crate::scheduler::{Scheduler, Timer, TimerId, TimerKind};

/// An event record produced by every mutation to the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorldEvent {
    /// A block was placed in an empty slot.
    BlockAdded { position: BlockPos, block: BlockType },
    /// A block was removed. Carries its type for inspection.
    BlockRemoved { position: BlockPos, block: BlockType },
    /// A timer fired with its condition still holding and swapped the block.
    Transitioned {
        position: BlockPos,
        from: BlockType,
        to: BlockType,
        at: Duration,
    },
    /// A timer fired after its condition had changed; nothing was mutated.
    StaleTimer {
        position: BlockPos,
        kind: TimerKind,
        at: Duration,
    },
}

/// A broken consistency rule between the block map and its derived
/// structures. Always a programming error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("block stored under {key} reports position {position}")]
    KeyMismatch { key: BlockPos, position: BlockPos },
    #[error("collision list holds {collision} handles for {blocks} blocks")]
    CollisionCount { blocks: usize, collision: usize },
    #[error("visual of block at {0} is missing from the collision list")]
    MissingCollisionEntry(BlockPos),
    #[error("collision list bookkeeping is corrupt")]
    CollisionListCorrupt,
    #[error("chunk index files {placements} positions for {blocks} blocks")]
    ChunkPlacementCount { blocks: usize, placements: usize },
    #[error("block at {0} is not filed under its chunk")]
    MisfiledPosition(BlockPos),
    #[error("block at {0} has both a decay and a growth timer")]
    DoubleTimer(BlockPos),
    #[error("block at {0} holds a timer the scheduler no longer has")]
    LostTimer(BlockPos),
    #[error("timer {0:?} is pending for a block that does not own it")]
    OrphanTimer(TimerId),
}

/// The authoritative block world.
///
/// Owns every block, the chunk index and collision list derived from them,
/// and the scheduler that drives grass decay and dirt growth. All mutations
/// go through `add_block` / `remove_block` / `replace_block`; after each call
/// returns the derived structures agree with the block map.
#[derive(Debug)]
pub struct World<S = HeadlessScene> {
    config: WorldConfig,
    scene: S,
    blocks: HashMap<BlockPos, Block>,
    chunks: ChunkIndex,
    collision: CollisionList,
    scheduler: Scheduler,
    /// Append-only log of all mutations.
    event_log: Vec<WorldEvent>,
}

impl World<HeadlessScene> {
    /// Empty world with a headless scene and the default configuration.
    pub fn new() -> Self {
        Self::build(HeadlessScene::new(), WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Result<Self, WorldError> {
        Self::with_scene(HeadlessScene::new(), config)
    }
}

impl Default for World<HeadlessScene> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scene> World<S> {
    /// Empty world rendering into `scene`.
    pub fn with_scene(scene: S, config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        Ok(Self::build(scene, config))
    }

    fn build(scene: S, config: WorldConfig) -> Self {
        Self {
            chunks: ChunkIndex::new(config.chunk_size),
            config,
            scene,
            blocks: HashMap::new(),
            collision: CollisionList::new(),
            scheduler: Scheduler::new(),
            event_log: Vec::new(),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Simulated time since the world was created.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Read-only access to all blocks by position.
    pub fn blocks(&self) -> &HashMap<BlockPos, Block> {
        &self.blocks
    }

    pub fn block(&self, position: BlockPos) -> Option<&Block> {
        self.blocks.get(&position)
    }

    pub fn block_type_at(&self, position: BlockPos) -> Option<BlockType> {
        self.blocks.get(&position).map(Block::block_type)
    }

    pub fn is_occupied(&self, position: BlockPos) -> bool {
        self.blocks.contains_key(&position)
    }

    /// Visuals of all present blocks, in placement order.
    pub fn collision_objects(&self) -> &CollisionList {
        &self.collision
    }

    pub fn chunks(&self) -> &ChunkIndex {
        &self.chunks
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Place a block in an empty slot. Returns false, changing nothing, if
    /// the slot is already occupied.
    pub fn add_block(&mut self, block_type: BlockType, position: BlockPos) -> bool {
        let placed = self.place(block_type, position);
        debug_assert_eq!(self.check_invariants(), Ok(()));
        placed
    }

    fn place(&mut self, block_type: BlockType, position: BlockPos) -> bool {
        if self.blocks.contains_key(&position) {
            tracing::trace!(%position, block = %block_type, "slot occupied, add ignored");
            return false;
        }
        let visual = self.scene.create_visual(block_type, position);
        self.blocks
            .insert(position, Block::new(block_type, position, visual));
        self.chunks.insert(position);
        self.collision.push(visual);
        self.event_log.push(WorldEvent::BlockAdded {
            position,
            block: block_type,
        });
        tracing::debug!(%position, block = %block_type, "block added");

        if self.config.transitions == TransitionPolicy::NeighborDriven {
            self.check_block(position);
            self.check_below(position);
        }
        true
    }

    /// Place a block by its type name (`GRASS`, `DIRT`, `LOG`, `LEAVES`).
    ///
    /// Unknown names are rejected before the world is touched.
    pub fn add_block_named(&mut self, name: &str, position: BlockPos) -> Result<bool, WorldError> {
        let block_type = name.parse::<BlockType>()?;
        Ok(self.add_block(block_type, position))
    }

    /// Remove the block at `position`, cancelling its timers and releasing
    /// its visual. Returns the removed type, or `None` if the slot was empty.
    pub fn remove_block(&mut self, position: BlockPos) -> Option<BlockType> {
        let removed = self.take(position);
        debug_assert_eq!(self.check_invariants(), Ok(()));
        removed
    }

    fn take(&mut self, position: BlockPos) -> Option<BlockType> {
        let block = self.blocks.remove(&position)?;
        let block_type = block.block_type();
        self.chunks.remove(position);
        self.collision.remove(block.visual());
        block.dispose(&mut self.scheduler, &mut self.scene);
        self.event_log.push(WorldEvent::BlockRemoved {
            position,
            block: block_type,
        });
        tracing::debug!(%position, block = %block_type, "block removed");

        if self.config.transitions == TransitionPolicy::NeighborDriven {
            self.check_below(position);
        }
        Some(block_type)
    }

    /// Remove whatever is at `position`, then place `new_type` there.
    /// Returns the type that was replaced, if any.
    pub fn replace_block(&mut self, position: BlockPos, new_type: BlockType) -> Option<BlockType> {
        let previous = self.take(position);
        self.place(new_type, position);
        debug_assert_eq!(self.check_invariants(), Ok(()));
        previous
    }

    /// Whether the slot above `position` holds a block. The top row of the
    /// grid is never covered.
    fn is_covered(&self, position: BlockPos) -> bool {
        position.above().is_some_and(|above| self.is_occupied(above))
    }

    fn check_below(&mut self, position: BlockPos) {
        if let Some(below) = position.below() {
            self.check_block(below);
        }
    }

    /// Run the decay or growth check appropriate for the block at
    /// `position`. Other block types and empty slots are left alone.
    pub fn check_block(&mut self, position: BlockPos) -> CheckOutcome {
        match self.block_type_at(position) {
            Some(BlockType::Grass) => self.check_decay(position),
            Some(BlockType::Dirt) => self.check_growth(position),
            _ => CheckOutcome::NotApplicable,
        }
    }

    /// Schedule or cancel grass decay for the block at `position` depending on
    /// whether the slot above is occupied.
    pub fn check_decay(&mut self, position: BlockPos) -> CheckOutcome {
        let covered = self.is_covered(position);
        let delay = self.config.decay_delay();
        match self.blocks.get_mut(&position) {
            Some(block) => block.check_decay(covered, &mut self.scheduler, delay),
            None => CheckOutcome::NotApplicable,
        }
    }

    /// Schedule or cancel dirt growth for the block at `position` depending on
    /// whether the slot above is empty.
    pub fn check_growth(&mut self, position: BlockPos) -> CheckOutcome {
        let covered = self.is_covered(position);
        let delay = self.config.growth_delay();
        match self.blocks.get_mut(&position) {
            Some(block) => block.check_growth(covered, &mut self.scheduler, delay),
            None => CheckOutcome::NotApplicable,
        }
    }

    /// Advance simulated time by `dt`, firing every timer that comes due in
    /// deadline order. Returns the number of blocks that changed type.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let _span = tracing::info_span!("world_advance", dt_ms = dt.as_millis() as u64).entered();
        let until = self.scheduler.now().saturating_add(dt);
        let mut transitions = 0;
        while let Some(timer) = self.scheduler.next_due(until) {
            if self.fire(timer) {
                transitions += 1;
            }
        }
        self.scheduler.advance_to(until);
        debug_assert_eq!(self.check_invariants(), Ok(()));
        if transitions > 0 {
            tracing::debug!(transitions, now = ?until, "timers applied");
        }
        transitions
    }

    /// Re-check the condition a timer was scheduled for and apply the
    /// transition if it still holds.
    fn fire(&mut self, timer: Timer) -> bool {
        let covered = self.is_covered(timer.target);
        let Some(block) = self.blocks.get_mut(&timer.target) else {
            debug_assert!(false, "timer {:?} fired for an empty slot", timer.id);
            return false;
        };
        let owned = block.clear_fired(timer.kind, timer.id);
        debug_assert!(owned, "timer {:?} fired for a block that does not own it", timer.id);
        let from = block.block_type();

        let to = match (timer.kind, covered) {
            (TimerKind::Decay, true) => BlockType::Dirt,
            (TimerKind::Growth, false) => BlockType::Grass,
            _ => {
                tracing::trace!(position = %timer.target, kind = ?timer.kind, "stale timer");
                self.event_log.push(WorldEvent::StaleTimer {
                    position: timer.target,
                    kind: timer.kind,
                    at: timer.deadline,
                });
                return false;
            }
        };
        self.take(timer.target);
        self.place(to, timer.target);
        self.event_log.push(WorldEvent::Transitioned {
            position: timer.target,
            from,
            to,
            at: timer.deadline,
        });
        true
    }

    /// Fill a `width` x `depth` rectangle of grass at y = 0, centred on the
    /// origin: x covers `-width/2 .. width - width/2`, likewise z. The floor is
    /// always a single layer; `height` is not used. Returns how many blocks
    /// were placed.
    pub fn generate_floor(&mut self, width: i32, _height: i32, depth: i32) -> usize {
        let (x0, z0) = (-(width / 2), -(depth / 2));
        let mut placed = 0;
        for x in x0..x0 + width {
            for z in z0..z0 + depth {
                if self.place(BlockType::Grass, BlockPos::new(x, 0, z)) {
                    placed += 1;
                }
            }
        }
        debug_assert_eq!(self.check_invariants(), Ok(()));
        tracing::info!(width, depth, placed, "floor generated");
        placed
    }

    /// Ring the floor rectangle with leaves for y = 1..=wall_height.
    /// Returns how many blocks were placed.
    pub fn generate_leaf_wall(&mut self, width: i32, depth: i32, wall_height: i32) -> usize {
        let (x0, z0) = (-(width / 2), -(depth / 2));
        let (x1, z1) = (x0 + width - 1, z0 + depth - 1);
        let mut placed = 0;
        for y in 1..=wall_height {
            for x in x0..=x1 {
                for z in [z0, z1] {
                    placed += usize::from(self.place(BlockType::Leaves, BlockPos::new(x, y, z)));
                }
            }
            for z in z0..=z1 {
                for x in [x0, x1] {
                    placed += usize::from(self.place(BlockType::Leaves, BlockPos::new(x, y, z)));
                }
            }
        }
        debug_assert_eq!(self.check_invariants(), Ok(()));
        tracing::info!(width, depth, wall_height, placed, "leaf wall generated");
        placed
    }

    /// Floor plus enclosing leaf wall, sized by `WorldConfig::terrain`.
    pub fn generate_default_terrain(&mut self) -> usize {
        let t = self.config.terrain;
        self.generate_floor(t.width, 1, t.depth) + self.generate_leaf_wall(t.width, t.depth, t.wall_height)
    }

    /// Verify that the chunk index, collision list and pending timers all
    /// agree with the block map.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if !self.collision.is_consistent() {
            return Err(InvariantViolation::CollisionListCorrupt);
        }
        if self.collision.len() != self.blocks.len() {
            return Err(InvariantViolation::CollisionCount {
                blocks: self.blocks.len(),
                collision: self.collision.len(),
            });
        }
        let placements = self.chunks.total_placements();
        if placements != self.blocks.len() {
            return Err(InvariantViolation::ChunkPlacementCount {
                blocks: self.blocks.len(),
                placements,
            });
        }

        for (key, block) in &self.blocks {
            if block.position() != *key {
                return Err(InvariantViolation::KeyMismatch {
                    key: *key,
                    position: block.position(),
                });
            }
            if !self.collision.contains(block.visual()) {
                return Err(InvariantViolation::MissingCollisionEntry(*key));
            }
            if !self.chunks.contains(*key) {
                return Err(InvariantViolation::MisfiledPosition(*key));
            }
            if block.decay_timer().is_some() && block.growth_timer().is_some() {
                return Err(InvariantViolation::DoubleTimer(*key));
            }
            if let Some((_, id)) = block.pending_timer() {
                if !self.scheduler.is_pending(id) {
                    return Err(InvariantViolation::LostTimer(*key));
                }
            }
        }
        if !self.chunks.is_consistent() {
            // Placement counts match, so some position sits in the wrong bucket.
            let misfiled = self
                .chunks
                .iter()
                .flat_map(|(coord, bucket)| bucket.iter().map(move |p| (*coord, *p)))
                .find(|(coord, p)| self.chunks.chunk_of(*p) != *coord)
                .map(|(_, p)| p)
                .unwrap_or_default();
            return Err(InvariantViolation::MisfiledPosition(misfiled));
        }

        for timer in self.scheduler.pending() {
            let owned = self
                .blocks
                .get(&timer.target)
                .and_then(Block::pending_timer)
                == Some((timer.kind, timer.id));
            if !owned {
                return Err(InvariantViolation::OrphanTimer(timer.id));
            }
        }
        Ok(())
    }
}
