use std::collections::BTreeMap;

use blockfield_common::{BlockPos, BlockType, VisualHandle};
use blockfield_kernel::{ChunkCoord, Scene, TimerKind, World};
use serde::Serialize;

/// World inspector for developer tooling.
///
/// Provides read-only queries against the world state for debugging and the
/// CLI.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary<S: Scene>(world: &World<S>) -> WorldSummary {
        let mut blocks_by_type: BTreeMap<BlockType, usize> =
            BlockType::ALL.into_iter().map(|t| (t, 0)).collect();
        for block in world.blocks().values() {
            *blocks_by_type.entry(block.block_type()).or_insert(0) += 1;
        }
        WorldSummary {
            now_ms: world.now().as_millis() as u64,
            block_count: world.block_count(),
            blocks_by_type,
            chunk_count: world.chunks().occupied_chunk_count(),
            collision_objects: world.collision_objects().len(),
            pending_timers: world.scheduler().pending_count(),
            pending_events: world.events().len(),
        }
    }

    /// Details of the block at `position`, if any.
    pub fn inspect_block<S: Scene>(world: &World<S>, position: BlockPos) -> Option<BlockInfo> {
        let block = world.block(position)?;
        let pending_timer = block.pending_timer().and_then(|(kind, id)| {
            let timer = world.scheduler().get(id)?;
            Some(PendingTimer {
                kind,
                fires_at_ms: timer.deadline.as_millis() as u64,
            })
        });
        Some(BlockInfo {
            position,
            block: block.block_type(),
            visual: block.visual(),
            chunk: world.chunks().chunk_of(position),
            pending_timer,
        })
    }

    /// Blocks stacked in the (x, z) column, bottom to top.
    pub fn column<S: Scene>(world: &World<S>, x: i32, z: i32) -> Vec<(i32, BlockType)> {
        let mut column: Vec<_> = world
            .blocks()
            .iter()
            .filter(|(p, _)| p.x == x && p.z == z)
            .map(|(p, b)| (p.y, b.block_type()))
            .collect();
        column.sort_by_key(|(y, _)| *y);
        column
    }

    /// All occupied positions in canonical (x, y, z) order.
    pub fn list_positions<S: Scene>(world: &World<S>) -> Vec<BlockPos> {
        let mut positions: Vec<_> = world.blocks().keys().copied().collect();
        positions.sort();
        positions
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSummary {
    pub now_ms: u64,
    pub block_count: usize,
    pub blocks_by_type: BTreeMap<BlockType, usize>,
    pub chunk_count: usize,
    pub collision_objects: usize,
    pub pending_timers: usize,
    pub pending_events: usize,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: t={}ms blocks={} chunks={} collision={} timers={} pending_events={}",
            self.now_ms,
            self.block_count,
            self.chunk_count,
            self.collision_objects,
            self.pending_timers,
            self.pending_events
        )?;
        for (block, count) in &self.blocks_by_type {
            write!(f, " {}={count}", block.name().to_lowercase())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingTimer {
    pub kind: TimerKind,
    pub fires_at_ms: u64,
}

/// Detailed info about a single block.
#[derive(Debug, Clone, Serialize)]
pub struct BlockInfo {
    pub position: BlockPos,
    pub block: BlockType,
    pub visual: VisualHandle,
    pub chunk: ChunkCoord,
    pub pending_timer: Option<PendingTimer>,
}

impl std::fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Block {} at {} chunk=({}, {}) visual={}",
            self.block, self.position, self.chunk.x, self.chunk.z, self.visual.0
        )?;
        if let Some(timer) = self.pending_timer {
            write!(f, " {:?} at {}ms", timer.kind, timer.fires_at_ms)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_empty_world() {
        let world = World::new();
        let summary = WorldInspector::summary(&world);
        assert_eq!(summary.now_ms, 0);
        assert_eq!(summary.block_count, 0);
        assert_eq!(summary.blocks_by_type[&BlockType::Grass], 0);
    }

    #[test]
    fn summary_counts_types_and_timers() {
        let mut world = World::new();
        world.generate_floor(4, 1, 4);
        world.add_block(BlockType::Log, BlockPos::new(0, 1, 0));

        let summary = WorldInspector::summary(&world);
        assert_eq!(summary.block_count, 17);
        assert_eq!(summary.blocks_by_type[&BlockType::Grass], 16);
        assert_eq!(summary.blocks_by_type[&BlockType::Log], 1);
        assert_eq!(summary.collision_objects, 17);
        assert_eq!(summary.pending_timers, 1);
        assert_eq!(summary.pending_events, 17);
        // x, z in [-2, 1] with 16-wide chunks spans four chunks.
        assert_eq!(summary.chunk_count, 4);
    }

    #[test]
    fn inspect_block_reports_timer() {
        let mut world = World::new();
        world.add_block(BlockType::Dirt, BlockPos::ORIGIN);

        let info = WorldInspector::inspect_block(&world, BlockPos::ORIGIN).unwrap();
        assert_eq!(info.block, BlockType::Dirt);
        assert_eq!(
            info.pending_timer,
            Some(PendingTimer {
                kind: TimerKind::Growth,
                fires_at_ms: 3000
            })
        );
        assert!(info.to_string().contains("Growth at 3000ms"));
    }

    #[test]
    fn inspect_block_not_found() {
        let world = World::new();
        assert!(WorldInspector::inspect_block(&world, BlockPos::ORIGIN).is_none());
    }

    #[test]
    fn column_is_sorted_bottom_up() {
        let mut world = World::new();
        world.add_block(BlockType::Leaves, BlockPos::new(1, 3, 1));
        world.add_block(BlockType::Grass, BlockPos::new(1, 0, 1));
        world.add_block(BlockType::Log, BlockPos::new(1, 1, 1));
        world.add_block(BlockType::Log, BlockPos::new(2, 1, 1));

        assert_eq!(
            WorldInspector::column(&world, 1, 1),
            vec![
                (0, BlockType::Grass),
                (1, BlockType::Log),
                (3, BlockType::Leaves)
            ]
        );
    }

    #[test]
    fn list_positions_is_canonical() {
        let mut world = World::new();
        world.generate_floor(2, 1, 2);
        let positions = WorldInspector::list_positions(&world);
        assert_eq!(positions.first(), Some(&BlockPos::new(-1, 0, -1)));
        assert_eq!(positions.last(), Some(&BlockPos::new(0, 0, 0)));
    }

    #[test]
    fn summary_serializes() {
        let world = World::new();
        let json = serde_json::to_string(&WorldInspector::summary(&world)).unwrap();
        assert!(json.contains("\"GRASS\":0"));
        let text = WorldInspector::summary(&world).to_string();
        assert!(text.contains("t=0ms"));
        assert!(text.contains("leaves=0"));
    }
}
