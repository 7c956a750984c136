use std::collections::{HashMap, HashSet};

use blockfield_common::BlockPos;
use serde::{Deserialize, Serialize};

/// A 2D chunk coordinate (the Y axis is not partitioned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing `position`, using floor division so negative
    /// coordinates land in negative chunks.
    pub fn containing(position: BlockPos, chunk_size: i32) -> Self {
        Self {
            x: position.x.div_euclid(chunk_size),
            z: position.z.div_euclid(chunk_size),
        }
    }
}

/// Fixed-size horizontal partition of block positions.
///
/// Buckets are created on first insertion and kept when they empty out.
/// Positions are immutable once placed, so a position's bucket never needs
/// to move.
#[derive(Debug, Clone)]
pub struct ChunkIndex {
    chunk_size: i32,
    chunks: HashMap<ChunkCoord, HashSet<BlockPos>>,
}

impl ChunkIndex {
    /// Create an empty index with the given chunk edge length.
    pub fn new(chunk_size: i32) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        Self {
            chunk_size,
            chunks: HashMap::new(),
        }
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    pub fn chunk_of(&self, position: BlockPos) -> ChunkCoord {
        ChunkCoord::containing(position, self.chunk_size)
    }

    /// File `position` under its chunk. Returns false if it was already there.
    pub fn insert(&mut self, position: BlockPos) -> bool {
        let coord = self.chunk_of(position);
        self.chunks.entry(coord).or_default().insert(position)
    }

    /// Remove `position` from its chunk. Missing chunks or positions are
    /// ignored.
    pub fn remove(&mut self, position: BlockPos) -> bool {
        let coord = self.chunk_of(position);
        self.chunks
            .get_mut(&coord)
            .is_some_and(|bucket| bucket.remove(&position))
    }

    pub fn contains(&self, position: BlockPos) -> bool {
        self.chunks
            .get(&self.chunk_of(position))
            .is_some_and(|bucket| bucket.contains(&position))
    }

    /// Replace the whole index with the given positions.
    pub fn rebuild(&mut self, positions: impl IntoIterator<Item = BlockPos>) {
        self.chunks.clear();
        for position in positions {
            self.insert(position);
        }
    }

    /// Positions filed under one chunk.
    pub fn positions_in_chunk(&self, coord: ChunkCoord) -> HashSet<BlockPos> {
        self.chunks.get(&coord).cloned().unwrap_or_default()
    }

    /// Positions within a square radius (in chunks) of a centre chunk.
    pub fn positions_in_radius(&self, center: ChunkCoord, radius: i32) -> HashSet<BlockPos> {
        let mut result = HashSet::new();
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let coord = ChunkCoord::new(center.x + dx, center.z + dz);
                if let Some(bucket) = self.chunks.get(&coord) {
                    result.extend(bucket);
                }
            }
        }
        result
    }

    /// Number of chunk buckets ever created (including ones now empty).
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of chunks currently holding at least one position.
    pub fn occupied_chunk_count(&self) -> usize {
        self.chunks.values().filter(|b| !b.is_empty()).count()
    }

    /// Total number of filed positions across all chunks.
    pub fn total_placements(&self) -> usize {
        self.chunks.values().map(HashSet::len).sum()
    }

    /// Every position is filed under the chunk its coordinates map to.
    pub fn is_consistent(&self) -> bool {
        self.chunks.iter().all(|(coord, bucket)| {
            bucket
                .iter()
                .all(|p| ChunkCoord::containing(*p, self.chunk_size) == *coord)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &HashSet<BlockPos>)> {
        self.chunks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_coord_floors_negative_coordinates() {
        assert_eq!(
            ChunkCoord::containing(BlockPos::new(10, 0, 10), 16),
            ChunkCoord::new(0, 0)
        );
        assert_eq!(
            ChunkCoord::containing(BlockPos::new(20, 5, -5), 16),
            ChunkCoord::new(1, -1)
        );
        assert_eq!(
            ChunkCoord::containing(BlockPos::new(-16, 0, -17), 16),
            ChunkCoord::new(-1, -2)
        );
    }

    #[test]
    fn y_does_not_affect_chunk() {
        let index = ChunkIndex::new(8);
        assert_eq!(
            index.chunk_of(BlockPos::new(3, -100, 3)),
            index.chunk_of(BlockPos::new(3, 100, 3))
        );
    }

    #[test]
    fn insert_creates_bucket_lazily() {
        let mut index = ChunkIndex::new(16);
        assert_eq!(index.chunk_count(), 0);
        assert!(index.insert(BlockPos::ORIGIN));
        assert!(!index.insert(BlockPos::ORIGIN));
        assert_eq!(index.chunk_count(), 1);
        assert!(index.contains(BlockPos::ORIGIN));
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut index = ChunkIndex::new(16);
        assert!(!index.remove(BlockPos::new(99, 0, 99)));
        index.insert(BlockPos::ORIGIN);
        assert!(!index.remove(BlockPos::new(1, 0, 1)));
        assert!(index.remove(BlockPos::ORIGIN));
        assert!(!index.remove(BlockPos::ORIGIN));
        assert_eq!(index.total_placements(), 0);
        assert_eq!(index.chunk_count(), 1);
        assert_eq!(index.occupied_chunk_count(), 0);
    }

    #[test]
    fn positions_in_radius_spans_neighbours() {
        let mut index = ChunkIndex::new(16);
        let near = BlockPos::new(0, 0, 0);
        let next = BlockPos::new(20, 0, 0);
        let far = BlockPos::new(200, 0, 200);
        index.rebuild([near, next, far]);

        let found = index.positions_in_radius(ChunkCoord::new(0, 0), 1);
        assert!(found.contains(&near));
        assert!(found.contains(&next));
        assert!(!found.contains(&far));
        assert!(index
            .positions_in_radius(ChunkCoord::new(-10, -10), 0)
            .is_empty());
    }

    #[test]
    fn rebuild_is_consistent() {
        let mut index = ChunkIndex::new(4);
        index.rebuild((-10..10).map(|i| BlockPos::new(i, 0, -i)));
        assert_eq!(index.total_placements(), 20);
        assert!(index.is_consistent());
        // x in [-4, -1] and z in [0, 3] holds i = -1, -2, -3
        assert_eq!(index.positions_in_chunk(ChunkCoord::new(-1, 0)).len(), 3);
    }

    #[test]
    #[should_panic(expected = "chunk_size must be positive")]
    fn zero_chunk_size_panics() {
        let _ = ChunkIndex::new(0);
    }
}
