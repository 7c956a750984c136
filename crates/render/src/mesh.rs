use std::collections::BTreeMap;

use blockfield_common::{BlockPos, BlockType, VisualHandle};
use blockfield_kernel::Scene;
use glam::Vec3;

/// Material settings for a block cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSpec {
    pub texture: &'static str,
    pub transparent: bool,
    /// Fragments with alpha below this are discarded.
    pub alpha_test: Option<f32>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MaterialSpec {
    pub fn for_block(block: BlockType) -> Self {
        let texture = match block {
            BlockType::Grass => "grass.png",
            BlockType::Dirt => "dirt.png",
            BlockType::Log => "log.jpg",
            BlockType::Leaves => "leaves.png",
        };
        let cutout = block == BlockType::Leaves;
        Self {
            texture,
            transparent: cutout,
            alpha_test: cutout.then_some(0.5),
            cast_shadow: true,
            receive_shadow: true,
        }
    }
}

/// A unit cube placed in the scene for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshInstance {
    pub block: BlockType,
    pub translation: Vec3,
    pub material: MaterialSpec,
}

/// Scene collaborator that keeps one mesh description per live visual.
#[derive(Debug, Default)]
pub struct MeshRegistry {
    next: u64,
    meshes: BTreeMap<VisualHandle, MeshInstance>,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: VisualHandle) -> Option<&MeshInstance> {
        self.meshes.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Live meshes ordered by handle.
    pub fn iter(&self) -> impl Iterator<Item = (VisualHandle, &MeshInstance)> {
        self.meshes.iter().map(|(h, m)| (*h, m))
    }

    /// Number of live meshes sampling each texture, in texture-name order.
    pub fn texture_usage(&self) -> BTreeMap<&'static str, usize> {
        let mut usage = BTreeMap::new();
        for mesh in self.meshes.values() {
            *usage.entry(mesh.material.texture).or_insert(0) += 1;
        }
        usage
    }
}

impl Scene for MeshRegistry {
    fn create_visual(&mut self, block: BlockType, position: BlockPos) -> VisualHandle {
        let handle = VisualHandle(self.next);
        self.next += 1;
        self.meshes.insert(
            handle,
            MeshInstance {
                block,
                translation: position.center(),
                material: MaterialSpec::for_block(block),
            },
        );
        handle
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        if self.meshes.remove(&handle).is_none() {
            tracing::warn!(?handle, "destroy of unknown mesh");
        }
    }
}
