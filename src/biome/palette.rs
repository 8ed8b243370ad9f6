//! Per-face block colors: fake directional shading, variance, fog
//!
//! Each biome maps to six face colors derived from a base RGB by asymmetric
//! `(-gap, +gap)` channel offsets per axis pair, which fakes directional
//! lighting without a lighting pass. Final colors get a bounded random
//! variance that decays with viewpoint distance (far chunks regenerate often
//! and would flicker otherwise) and a linear fog blend toward the sky color.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::BiomeTag;
use crate::core::Error;

/// One RGB triple, channels in [0, 1]
pub type Rgb = [f32; 3];

/// Six face colors: front, back, top, bottom, right, left
pub type FaceColors = [Rgb; 6];

/// Derive six face colors from a base color and a shading gap
pub fn shaded_faces(base: Rgb, gap: f32) -> FaceColors {
    [
        [base[0] - gap, base[1] + gap, base[2]],
        [base[0] + gap, base[1] - gap, base[2]],
        [base[0], base[1] + gap, base[2] - gap],
        [base[0], base[1] - gap, base[2] + gap],
        [base[0] + gap, base[1], base[2] - gap],
        [base[0] - gap, base[1], base[2] + gap],
    ]
}

/// Parameters for variance and fog
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteParams {
    /// Fog target color, also the clear color of the renderer.
    pub sky_color: Rgb,
    /// Maximum multiplicative color variance at distance zero.
    pub base_variance: f32,
    /// Distance at which variance has decayed to half.
    pub variance_falloff: f32,
    /// Distance scale of the fog blend `1 - 1/(dist/fog + 1)`.
    pub fog_distance: f32,
}

impl Default for PaletteParams {
    fn default() -> Self {
        Self {
            sky_color: [0.4, 0.75, 0.98],
            base_variance: 0.4,
            variance_falloff: 1500.0,
            fog_distance: 25000.0,
        }
    }
}

impl PaletteParams {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.variance_falloff > 0.0) {
            return Err(Error::Config(format!(
                "variance_falloff must be positive, got {}",
                self.variance_falloff
            )));
        }
        if !(self.fog_distance > 0.0) {
            return Err(Error::Config(format!(
                "fog_distance must be positive, got {}",
                self.fog_distance
            )));
        }
        Ok(())
    }
}

/// Face-color palette for all biome tags plus entity materials
pub struct Palette {
    params: PaletteParams,
    plains: FaceColors,
    forest: FaceColors,
    mountain: FaceColors,
    snow: FaceColors,
    path: FaceColors,
    wood: FaceColors,
    pine: FaceColors,
}

impl Palette {
    pub fn new(params: PaletteParams) -> Self {
        Self {
            params,
            plains: shaded_faces([0.3, 0.6, 0.44], 0.1),
            forest: shaded_faces([0.26, 0.52, 0.34], 0.1),
            mountain: shaded_faces([0.376, 0.376, 0.376], 0.04),
            snow: shaded_faces([0.8, 0.8, 0.8], 0.07),
            path: shaded_faces([0.55, 0.45, 0.3], 0.05),
            wood: shaded_faces([0.35, 0.22, 0.12], 0.04),
            pine: shaded_faces([0.165, 0.361, 0.227], 0.04),
        }
    }

    pub fn params(&self) -> &PaletteParams {
        &self.params
    }

    /// Base face colors for a terrain biome
    pub fn faces_for(&self, tag: BiomeTag) -> &FaceColors {
        match tag {
            BiomeTag::Plains => &self.plains,
            BiomeTag::Forest => &self.forest,
            BiomeTag::Mountain => &self.mountain,
            BiomeTag::Snow => &self.snow,
            BiomeTag::Path => &self.path,
        }
    }

    /// Tree trunk faces (used as-is, no variance)
    pub fn wood(&self) -> &FaceColors {
        &self.wood
    }

    /// Tree canopy faces
    pub fn pine(&self) -> &FaceColors {
        &self.pine
    }

    /// Fog blend weight of the block color at `dist`; the rest is sky.
    pub fn clearness(&self, dist: f32) -> f32 {
        1.0 / (dist / self.params.fog_distance + 1.0)
    }

    /// Final per-face colors for a block at `dist` from the viewpoint
    ///
    /// Applies distance-decayed multiplicative variance, clamps channels to
    /// [0, 1], then blends toward the sky color by the fog weight. The RNG
    /// is cosmetic only; placement never depends on it.
    pub fn face_colors<R: Rng>(&self, faces: &FaceColors, dist: f32, rng: &mut R) -> FaceColors {
        let variance = self.params.base_variance / (dist / self.params.variance_falloff + 1.0);
        let clear = self.clearness(dist);
        let sky = self.params.sky_color;

        let mut out = [[0.0f32; 3]; 6];
        for (face, base) in faces.iter().enumerate() {
            for c in 0..3 {
                let modifier = 1.0 + (rng.random::<f32>() - 0.5) * variance;
                let v = (base[c] * modifier).clamp(0.0, 1.0);
                out[face][c] = sky[c] * (1.0 - clear) + v * clear;
            }
        }
        out
    }
}
