use std::collections::HashMap;
use std::fmt::Write;

use blockfield_common::BlockType;
use blockfield_kernel::{Scene, World};

/// Horizontal window to render, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderView {
    pub min_x: i32,
    pub max_x: i32,
    pub min_z: i32,
    pub max_z: i32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            min_x: -8,
            max_x: 7,
            min_z: -8,
            max_z: 7,
        }
    }
}

impl RenderView {
    /// Smallest view covering every block, or `None` for an empty world.
    pub fn fit<S: Scene>(world: &World<S>) -> Option<Self> {
        let mut keys = world.blocks().keys();
        let first = keys.next()?;
        let mut view = Self {
            min_x: first.x,
            max_x: first.x,
            min_z: first.z,
            max_z: first.z,
        };
        for p in keys {
            view.min_x = view.min_x.min(p.x);
            view.max_x = view.max_x.max(p.x);
            view.min_z = view.min_z.min(p.z);
            view.max_z = view.max_z.max(p.z);
        }
        Some(view)
    }
}

/// Renderer-agnostic interface. Renderers read the world and never mutate it.
pub trait Renderer {
    type Output;

    fn render<S: Scene>(&self, world: &World<S>, view: &RenderView) -> Self::Output;
}

/// Text renderer showing the topmost block of each column, one character per
/// (x, z) cell. Rows run along z, columns along x.
#[derive(Debug, Default)]
pub struct TopDownRenderer;

impl TopDownRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn glyph(block: Option<BlockType>) -> char {
        match block {
            Some(BlockType::Grass) => 'G',
            Some(BlockType::Dirt) => 'D',
            Some(BlockType::Log) => 'L',
            Some(BlockType::Leaves) => '*',
            None => '.',
        }
    }
}

impl Renderer for TopDownRenderer {
    type Output = String;

    fn render<S: Scene>(&self, world: &World<S>, view: &RenderView) -> String {
        let mut top: HashMap<(i32, i32), (i32, BlockType)> = HashMap::new();
        for (p, block) in world.blocks() {
            let entry = top.entry((p.x, p.z)).or_insert((p.y, block.block_type()));
            if p.y > entry.0 {
                *entry = (p.y, block.block_type());
            }
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== World (t={}ms, blocks={}) ===",
            world.now().as_millis(),
            world.block_count()
        );
        for z in view.min_z..=view.max_z {
            for x in view.min_x..=view.max_x {
                out.push(Self::glyph(top.get(&(x, z)).map(|(_, b)| *b)));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfield_common::BlockPos;

    #[test]
    fn empty_world_has_no_fit() {
        let world = World::new();
        assert_eq!(RenderView::fit(&world), None);
        let output = TopDownRenderer::new().render(&world, &RenderView::default());
        assert!(output.contains("blocks=0"));
        assert_eq!(output.lines().count(), 1 + 16);
    }

    #[test]
    fn topmost_block_wins() {
        let mut world = World::new();
        world.generate_floor(2, 1, 2);
        world.add_block(BlockType::Log, BlockPos::new(0, 1, 0));
        world.add_block(BlockType::Leaves, BlockPos::new(0, 2, 0));

        let view = RenderView::fit(&world).unwrap();
        assert_eq!(
            view,
            RenderView {
                min_x: -1,
                max_x: 0,
                min_z: -1,
                max_z: 0
            }
        );
        let output = TopDownRenderer::new().render(&world, &view);
        let rows: Vec<&str> = output.lines().skip(1).collect();
        assert_eq!(rows, vec!["GG", "G*"]);
    }

    #[test]
    fn decayed_cells_render_as_dirt() {
        let mut world = World::new();
        world.generate_floor(3, 1, 1);
        world.add_block(BlockType::Log, BlockPos::new(1, 1, 0));
        world.remove_block(BlockPos::new(-1, 0, 0));
        world.advance(std::time::Duration::from_secs(3));
        world.remove_block(BlockPos::new(1, 1, 0));

        let view = RenderView::fit(&world).unwrap();
        let output = TopDownRenderer::new().render(&world, &view);
        assert!(output.contains("t=3000ms"));
        assert_eq!(output.lines().nth(1), Some("GD"));
    }
}
