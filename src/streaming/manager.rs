//! Chunk manager: per-chunk LOD assignment and the streaming window driver
//!
//! Per chunk key the manager records the LOD level it was last generated at.
//! `ensure_chunk` is idempotent: it is called for every chunk in the window
//! on every viewpoint move, and only chunks whose required level changed are
//! retired and regenerated. The manager exclusively owns level assignment;
//! voxel memory belongs to the store.

use glam::Vec3;
use rand::Rng;
use std::collections::HashMap;

use super::lod::level_for_distance;
use crate::biome::{BiomeClassifier, Palette};
use crate::entity::TreePlacer;
use crate::field::{FieldSampler, ScalarField};
use crate::voxel::{ChunkKey, Voxel, VoxelStore};

/// Borrowed generation collaborators for one regeneration pass
///
/// The RNG is cosmetic only (color variance); everything else is
/// deterministic in the seed.
pub struct RegenContext<'a, R: Rng> {
    pub field: &'a ScalarField,
    pub classifier: &'a BiomeClassifier,
    pub palette: &'a Palette,
    pub placer: &'a TreePlacer,
    pub rng: &'a mut R,
    /// Viewpoint world position, for distance-based color falloff.
    pub viewpoint: Vec3,
}

/// Work performed by one streaming pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingReport {
    /// Whether the viewpoint entered a new chunk (false = early exit).
    pub moved: bool,
    /// Chunks (re)populated this pass.
    pub regenerated: usize,
    /// Chunks retired because they left the streaming window.
    pub retired: usize,
}

/// Tracks chunk LOD state and drives the streaming window
pub struct ChunkManager {
    chunk_size: u32,
    window_radius: u32,
    levels: HashMap<ChunkKey, u32>,
    last_viewpoint: Option<ChunkKey>,
}

impl ChunkManager {
    pub fn new(chunk_size: u32, window_radius: u32) -> Self {
        Self {
            chunk_size,
            window_radius,
            levels: HashMap::new(),
            last_viewpoint: None,
        }
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn window_radius(&self) -> u32 {
        self.window_radius
    }

    /// Recorded LOD level of a chunk, if loaded
    pub fn level_of(&self, key: ChunkKey) -> Option<u32> {
        self.levels.get(&key).copied()
    }

    /// Number of chunks currently loaded
    pub fn loaded_count(&self) -> usize {
        self.levels.len()
    }

    /// Bring one chunk to the LOD level required by the viewpoint chunk
    ///
    /// No-op when the chunk is already recorded at that level. Otherwise the
    /// chunk's previous voxels are retired and the chunk is repopulated.
    /// Returns whether any work was done.
    pub fn ensure_chunk<R: Rng>(
        &mut self,
        key: ChunkKey,
        viewpoint_chunk: ChunkKey,
        store: &mut VoxelStore,
        ctx: &mut RegenContext<'_, R>,
    ) -> bool {
        let dist = key.chebyshev(viewpoint_chunk);
        let level = level_for_distance(dist, self.chunk_size);

        if self.levels.get(&key) == Some(&level) {
            return false;
        }

        store.delete_chunk(key);
        self.levels.insert(key, level);
        self.populate(key, level, store, ctx);
        true
    }

    /// Retire a chunk: drop its voxels and clear its level record
    ///
    /// Safe to call on an unloaded key. Returns the voxels removed.
    pub fn delete_chunk(&mut self, key: ChunkKey, store: &mut VoxelStore) -> usize {
        self.levels.remove(&key);
        store.delete_chunk(key)
    }

    /// Generate terrain and entities for every cell of a chunk at `level`
    fn populate<R: Rng>(
        &self,
        key: ChunkKey,
        level: u32,
        store: &mut VoxelStore,
        ctx: &mut RegenContext<'_, R>,
    ) {
        let ox = key.x as i64 * self.chunk_size as i64;
        let oz = key.z as i64 * self.chunk_size as i64;
        let cells = self.chunk_size / level;

        let mut sampler = FieldSampler::new(ctx.field);
        for i in 0..cells {
            for j in 0..cells {
                let x = ox + (i * level) as i64;
                let z = oz + (j * level) as i64;
                let elevation = sampler.elevation(x, z);
                let steepness = sampler.steepness(x, z);
                let tag = ctx.classifier.classify(elevation, steepness);

                let dist = (x as f32 - ctx.viewpoint.x)
                    .abs()
                    .max((z as f32 - ctx.viewpoint.z).abs());
                let faces = ctx
                    .palette
                    .face_colors(ctx.palette.faces_for(tag), dist, ctx.rng);

                store.insert(Voxel {
                    position: Vec3::new(x as f32, elevation as f32, z as f32),
                    scale: level as f32,
                    faces,
                });

                ctx.placer.place(
                    x as f32,
                    elevation as f32,
                    z as f32,
                    level,
                    tag,
                    dist,
                    store,
                    ctx.palette,
                    ctx.rng,
                );
            }
        }
    }

    /// Streaming driver: run one tick for the given viewpoint position
    ///
    /// Early-exits when the viewpoint is still in the chunk recorded by the
    /// previous pass. Otherwise ensures every chunk in the square window
    /// around the new viewpoint chunk and retires chunks that scrolled out.
    pub fn update<R: Rng>(
        &mut self,
        viewpoint: Vec3,
        store: &mut VoxelStore,
        ctx: &mut RegenContext<'_, R>,
    ) -> StreamingReport {
        let cam = ChunkKey::nearest(viewpoint, self.chunk_size);
        if self.last_viewpoint == Some(cam) {
            return StreamingReport::default();
        }

        let r = self.window_radius as i32;
        let mut regenerated = 0;
        for cx in (cam.x - r)..=(cam.x + r) {
            for cz in (cam.z - r)..=(cam.z + r) {
                if self.ensure_chunk(ChunkKey::new(cx, cz), cam, store, ctx) {
                    regenerated += 1;
                }
            }
        }

        // Chunks that left the window are retired so a drifting viewpoint
        // does not accumulate memory. Every voxel a chunk generates lives in
        // its own bucket, so sweeping the level records is exhaustive.
        let stale: Vec<ChunkKey> = self
            .levels
            .keys()
            .filter(|k| k.chebyshev(cam) > self.window_radius)
            .copied()
            .collect();
        let retired = stale.len();
        for key in stale {
            self.delete_chunk(key, store);
        }

        self.last_viewpoint = Some(cam);
        log::debug!(
            "streaming pass at chunk ({}, {}): {} regenerated, {} retired, {} voxels",
            cam.x,
            cam.z,
            regenerated,
            retired,
            store.len()
        );

        StreamingReport {
            moved: true,
            regenerated,
            retired,
        }
    }
}
