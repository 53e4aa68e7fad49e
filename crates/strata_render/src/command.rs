//! Draw commands collected by the render manager

use crate::particles::ParticleOrder;

/// Handle to a model owned by an external asset system
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u32);

/// Buckets flushed to the renderer, in flush order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderBucket {
    /// Opaque, depth-tested work in any order
    Unsorted,
    /// Translucent work in sorted order
    Sorted,
}

impl RenderBucket {
    pub const FLUSH_ORDER: [RenderBucket; 2] = [RenderBucket::Unsorted, RenderBucket::Sorted];
}

/// What a command draws
#[derive(Clone, Debug, PartialEq)]
pub enum DrawKind {
    Model(ModelId),
    /// Per-instance model data (skinning, tint) without the mesh itself
    ModelData(ModelId),
    Particles { emitter: usize, order: ParticleOrder },
}

/// One piece of draw work submitted by an owner
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand<K> {
    pub owner: K,
    pub kind: DrawKind,
    /// Viewport the command was recorded in
    pub viewport: usize,
    pub lod: u8,
}

impl<K> DrawCommand<K> {
    pub fn new(owner: K, kind: DrawKind, viewport: usize) -> Self {
        Self {
            owner,
            kind,
            viewport,
            lod: 0,
        }
    }

    pub fn with_lod(mut self, lod: u8) -> Self {
        self.lod = lod;
        self
    }
}
