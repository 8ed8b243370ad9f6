//! Voxel primitives and the sparse chunk-indexed store

pub mod store;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::biome::FaceColors;

pub use store::VoxelStore;

/// Integer pair identifying one fixed-size square region of world space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkKey {
    pub x: i32,
    pub z: i32,
}

impl ChunkKey {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Key of the chunk containing world position (x, z)
    pub fn containing(x: f32, z: f32, chunk_size: u32) -> Self {
        let size = chunk_size as f32;
        Self {
            x: (x / size).floor() as i32,
            z: (z / size).floor() as i32,
        }
    }

    /// Key of the chunk whose center is nearest to the viewpoint
    pub fn nearest(pos: Vec3, chunk_size: u32) -> Self {
        let size = chunk_size as f32;
        Self {
            x: (pos.x / size).round() as i32,
            z: (pos.z / size).round() as i32,
        }
    }

    /// World-space origin corner of this chunk
    pub fn world_origin(&self, chunk_size: u32) -> (f32, f32) {
        (
            self.x as f32 * chunk_size as f32,
            self.z as f32 * chunk_size as f32,
        )
    }

    /// Chebyshev distance in chunks; chunk neighborhoods are square
    pub fn chebyshev(&self, other: ChunkKey) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dz = (self.z - other.z).unsigned_abs();
        dx.max(dz)
    }
}

/// Handle to a voxel in the store
///
/// Monotonically increasing, never reused for the lifetime of the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelId(pub u64);

/// One axis-aligned cube instance
///
/// `scale` equals the LOD level of the owning chunk for terrain blocks;
/// decorative entity blocks use their own smaller scales.
#[derive(Clone, Debug, PartialEq)]
pub struct Voxel {
    pub position: Vec3,
    pub scale: f32,
    pub faces: FaceColors,
}
