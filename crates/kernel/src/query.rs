//! Point and ray containment against the block grid.
//!
//! Blocks are unit cubes centred on integer positions. Rays walk the grid
//! cell by cell (Amanatides-Woo DDA), so cost scales with distance rather
//! than with the number of blocks.

use blockfield_common::{BlockPos, BlockType};
use glam::{IVec3, Vec3};

use crate::scene::Scene;
use crate::world::World;

/// First block struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub position: BlockPos,
    pub block: BlockType,
    /// Outward normal of the face the ray entered through. Zero when the ray
    /// starts inside the block.
    pub normal: IVec3,
    /// Distance along the normalized ray to the entry point.
    pub distance: f32,
    pub point: Vec3,
}

impl RayHit {
    /// The empty slot in front of the struck face, where a placed block
    /// would go. `None` when that face is on the edge of the grid.
    pub fn adjacent(&self) -> Option<BlockPos> {
        self.position.offset(self.normal)
    }
}

/// Reach beyond which a ray is bounded by the extent of the world instead.
pub const UNBOUNDED_REACH: f32 = 1024.0;

impl<S: Scene> World<S> {
    /// Whether `point` lies inside any block.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.is_occupied(BlockPos::containing(point))
    }

    /// Cast a ray and return the first block within `max_distance`.
    ///
    /// Reaches past `UNBOUNDED_REACH` (including infinity) stop at the
    /// farthest block. A NaN reach or a non-finite origin hits nothing.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let dir = direction.try_normalize()?;
        if max_distance.is_nan() || !origin.is_finite() {
            return None;
        }
        let max_distance = if max_distance > UNBOUNDED_REACH {
            max_distance.min(self.farthest_block_distance(origin)?)
        } else {
            max_distance
        };
        // Shift so cube `n` spans [n, n + 1) on each axis.
        let start = origin + Vec3::splat(0.5);
        let mut cell = start.floor().as_ivec3();

        let step = IVec3::new(axis_step(dir.x), axis_step(dir.y), axis_step(dir.z));
        let t_delta = Vec3::new(axis_delta(dir.x), axis_delta(dir.y), axis_delta(dir.z));
        let mut t_max = Vec3::new(
            first_crossing(start.x, cell.x, dir.x),
            first_crossing(start.y, cell.y, dir.y),
            first_crossing(start.z, cell.z, dir.z),
        );

        let mut normal = IVec3::ZERO;
        let mut distance = 0.0_f32;
        loop {
            let position = BlockPos::from(cell);
            if let Some(block) = self.block(position) {
                return Some(RayHit {
                    position,
                    block: block.block_type(),
                    normal,
                    distance,
                    point: origin + dir * distance,
                });
            }

            if t_max.x < t_max.y && t_max.x < t_max.z {
                distance = t_max.x;
                t_max.x += t_delta.x;
                cell.x = cell.x.checked_add(step.x)?;
                normal = IVec3::new(-step.x, 0, 0);
            } else if t_max.y < t_max.z {
                distance = t_max.y;
                t_max.y += t_delta.y;
                cell.y = cell.y.checked_add(step.y)?;
                normal = IVec3::new(0, -step.y, 0);
            } else {
                distance = t_max.z;
                t_max.z += t_delta.z;
                cell.z = cell.z.checked_add(step.z)?;
                normal = IVec3::new(0, 0, -step.z);
            }

            if distance > max_distance {
                return None;
            }
        }
    }

    /// Distance from `origin` past which no block can be struck, or `None`
    /// for an empty world.
    fn farthest_block_distance(&self, origin: Vec3) -> Option<f32> {
        self.blocks()
            .keys()
            .map(|p| p.center().distance(origin))
            .reduce(f32::max)
            // Half the cube diagonal.
            .map(|d| d + 0.87)
    }

    /// Whether moving from `origin` along `direction` would strike a block
    /// closer than `reach`.
    pub fn collides(&self, origin: Vec3, direction: Vec3, reach: f32) -> bool {
        self.raycast(origin, direction, reach)
            .is_some_and(|hit| hit.distance < reach)
    }
}

fn axis_step(d: f32) -> i32 {
    if d >= 0.0 {
        1
    } else {
        -1
    }
}

fn axis_delta(d: f32) -> f32 {
    if d == 0.0 {
        f32::INFINITY
    } else {
        d.abs().recip()
    }
}

fn first_crossing(start: f32, cell: i32, d: f32) -> f32 {
    if d > 0.0 {
        ((cell + 1) as f32 - start) / d
    } else if d < 0.0 {
        (cell as f32 - start) / d
    } else {
        f32::INFINITY
    }
}
