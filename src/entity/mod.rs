//! Deterministic placement of decorative props
//!
//! Trees spawn on a quantized world grid with hash-based jitter, only in
//! entity-bearing biomes and only at LOD levels at or below a fidelity
//! cutoff. Far chunks never spawn props at all; that is the pop-free LOD
//! policy, there is no later culling step.

pub mod marker;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::biome::{BiomeTag, Palette};
use crate::core::Error;
use crate::voxel::{Voxel, VoxelStore};

pub use marker::{Marker, MarkerSet};

/// Tree placement constants
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// World-space spacing of the candidate grid. Needs to stay fairly
    /// coarse so placement still looks consistent at the coarser levels.
    pub spacing: f32,
    /// LOD levels above this never spawn props.
    pub fidelity_cutoff: u32,
    /// Stacked trunk voxels per tree.
    pub trunk_segments: u32,
    /// Vertical distance between trunk voxels.
    pub segment_height: f32,
    /// Edge length of the canopy voxel.
    pub canopy_scale: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            spacing: 8.0,
            fidelity_cutoff: 8,
            trunk_segments: 3,
            segment_height: 4.0,
            canopy_scale: 5.0,
        }
    }
}

impl TreeParams {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.spacing > 0.0) {
            return Err(Error::Config(format!(
                "tree spacing must be positive, got {}",
                self.spacing
            )));
        }
        if self.trunk_segments == 0 {
            return Err(Error::Config("trunk_segments must be >= 1".into()));
        }
        if !(self.canopy_scale > 0.0) {
            return Err(Error::Config(format!(
                "canopy_scale must be positive, got {}",
                self.canopy_scale
            )));
        }
        Ok(())
    }
}

/// Places trees during chunk population
pub struct TreePlacer {
    params: TreeParams,
    seed: u32,
}

impl TreePlacer {
    pub fn new(params: TreeParams, seed: u32) -> Self {
        Self { params, seed }
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// Integer hash producing a value in [0, 1]
    fn hash_2d(ix: i32, iz: i32, seed: u32) -> f32 {
        let mut h = (ix as u32)
            .wrapping_mul(374761393)
            .wrapping_add((iz as u32).wrapping_mul(668265263))
            .wrapping_add(seed.wrapping_mul(1274126177));
        h = (h ^ (h >> 13)).wrapping_mul(1103515245);
        h ^= h >> 16;
        (h & 0x7FFFFFFF) as f32 / 0x7FFFFFFF_u32 as f32
    }

    /// Deterministic jitter offset for the tree anchored at grid cell (ox, oz)
    fn jitter(&self, ox: f32, oz: f32) -> (f32, f32) {
        let (ix, iz) = (ox as i32, oz as i32);
        let jx = (Self::hash_2d(ix, iz, self.seed) - 0.5) * self.params.spacing;
        let jz = (Self::hash_2d(ix, iz, self.seed ^ 0x9E37_79B9) - 0.5) * self.params.spacing;
        (jx, jz)
    }

    /// Maybe place one tree for the terrain cell at (x, y, z)
    ///
    /// A candidate is accepted when the cell's evaluation point lies within
    /// `level` of its quantized grid origin, which couples prop density to
    /// LOD coarseness. The actual trunk position is jittered inside the grid
    /// cell by a position-keyed hash, so placement is stable across
    /// regeneration passes. The jittered position is clamped to the bounds
    /// of the chunk owning the cell: a chunk only ever inserts voxels into
    /// its own store bucket, so retiring or regenerating it removes exactly
    /// what it created. Returns whether a tree was placed.
    #[allow(clippy::too_many_arguments)]
    pub fn place<R: Rng>(
        &self,
        x: f32,
        y: f32,
        z: f32,
        level: u32,
        tag: BiomeTag,
        dist: f32,
        store: &mut VoxelStore,
        palette: &Palette,
        rng: &mut R,
    ) -> bool {
        if !tag.bears_entities() || level > self.params.fidelity_cutoff {
            return false;
        }

        let spacing = self.params.spacing;
        let ox = (x / spacing).floor() * spacing;
        let oz = (z / spacing).floor() * spacing;
        let d = ((ox - x) * (ox - x) + (oz - z) * (oz - z)).sqrt();
        // The x == 0 grid column is skipped; it would anchor a tree on the
        // world seam where neighbouring chunks disagree about ownership.
        if d >= level as f32 || ox == 0.0 {
            return false;
        }

        let (jx, jz) = self.jitter(ox, oz);
        // Grid cells on a chunk's first column can jitter backwards across
        // the seam into the neighbor's bucket; keep the trunk in the chunk
        // that generated it.
        let size = store.chunk_size() as f32;
        let (cx, cz) = ((x / size).floor() * size, (z / size).floor() * size);
        let tx = (ox + jx).clamp(cx, cx + size - 1.0);
        let tz = (oz + jz).clamp(cz, cz + size - 1.0);
        let base = y + level as f32 / 2.0;

        for i in 0..self.params.trunk_segments {
            store.insert(Voxel {
                position: Vec3::new(tx, base + i as f32 * self.params.segment_height, tz),
                scale: 1.0,
                faces: *palette.wood(),
            });
        }

        let canopy_y = base
            + self.params.trunk_segments as f32 * self.params.segment_height
            + self.params.canopy_scale * self.params.segment_height / 2.0;
        let faces = palette.face_colors(palette.pine(), dist, rng);
        store.insert(Voxel {
            position: Vec3::new(tx, canopy_y, tz),
            scale: self.params.canopy_scale,
            faces,
        });

        true
    }
}
