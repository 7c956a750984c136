use std::collections::HashSet;

use blockfield_common::{BlockPos, BlockType, VisualHandle};

/// Render/scene collaborator.
///
/// The world asks for a visual when a block is placed and hands it back when
/// the block goes away. It never looks inside a visual.
pub trait Scene {
    /// Create the renderable for a newly placed block.
    fn create_visual(&mut self, block: BlockType, position: BlockPos) -> VisualHandle;

    /// Release a renderable previously returned by `create_visual`.
    fn destroy_visual(&mut self, handle: VisualHandle);
}

/// Scene without any rendering: issues sequential handles and tracks which
/// are still live. Used by tools, the CLI and tests.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    next: u64,
    live: HashSet<VisualHandle>,
    destroyed: u64,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: VisualHandle) -> bool {
        self.live.contains(&handle)
    }

    /// Total number of visuals ever created.
    pub fn created_count(&self) -> u64 {
        self.next
    }

    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }
}

impl Scene for HeadlessScene {
    fn create_visual(&mut self, _block: BlockType, _position: BlockPos) -> VisualHandle {
        let handle = VisualHandle(self.next);
        self.next += 1;
        self.live.insert(handle);
        handle
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        if self.live.remove(&handle) {
            self.destroyed += 1;
        } else {
            tracing::warn!(?handle, "destroy of unknown visual");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_tracked() {
        let mut scene = HeadlessScene::new();
        let a = scene.create_visual(BlockType::Grass, BlockPos::ORIGIN);
        let b = scene.create_visual(BlockType::Grass, BlockPos::ORIGIN);
        assert_ne!(a, b);
        assert_eq!(scene.live_count(), 2);

        scene.destroy_visual(a);
        assert!(!scene.is_live(a));
        assert!(scene.is_live(b));
        assert_eq!(scene.destroyed_count(), 1);
        assert_eq!(scene.created_count(), 2);
    }

    #[test]
    fn double_destroy_is_counted_once() {
        let mut scene = HeadlessScene::new();
        let a = scene.create_visual(BlockType::Log, BlockPos::ORIGIN);
        scene.destroy_visual(a);
        scene.destroy_visual(a);
        assert_eq!(scene.destroyed_count(), 1);
        assert_eq!(scene.live_count(), 0);
    }
}
