//! Biome classification from elevation and steepness
//!
//! Classification is a fixed priority list of threshold rules where later
//! rules override earlier ones. Mixing elevation and steepness in the
//! mountain/snow rules is what produces the jagged biome borders; pure
//! elevation bands turn steep river valleys into mountains.

pub mod palette;

use serde::{Deserialize, Serialize};

pub use palette::{FaceColors, Palette, PaletteParams, Rgb, shaded_faces};

/// Biome classification label driving color and entity placement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiomeTag {
    Plains,
    Forest,
    Mountain,
    Snow,
    Path,
}

impl BiomeTag {
    /// Whether decorative entities (trees) may spawn in this biome
    pub fn bears_entities(self) -> bool {
        matches!(self, BiomeTag::Forest)
    }
}

/// Threshold constants for the classification rules
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeParams {
    /// Steepness above which a cell is always mountain.
    pub mountain_steepness: f64,
    /// Mountain when `elevation + steepness * steepness_weight` exceeds this.
    pub mountain_combined: f64,
    /// Weight applied to steepness in the combined mountain/snow rules.
    pub steepness_weight: f64,
    /// Snow when `elevation - steepness * steepness_weight` exceeds this...
    pub snow_elevation: f64,
    /// ...and steepness stays below this.
    pub snow_max_steepness: f64,
    /// Elevation band `[lo, hi)` of gentle lowland classified as forest.
    pub forest_band: (f64, f64),
    /// Forest only below this steepness.
    pub forest_max_steepness: f64,
    /// Optional elevation band `[lo, hi)` forced to path regardless of steepness.
    pub path_band: Option<(f64, f64)>,
}

impl Default for BiomeParams {
    fn default() -> Self {
        Self {
            mountain_steepness: 1.0,
            mountain_combined: 1000.0,
            steepness_weight: 200.0,
            snow_elevation: 1500.0,
            snow_max_steepness: 0.75,
            forest_band: (150.0, 900.0),
            forest_max_steepness: 0.5,
            path_band: None,
        }
    }
}

impl BiomeParams {
    pub fn validate(&self) -> Result<(), crate::core::Error> {
        let (lo, hi) = self.forest_band;
        if lo >= hi {
            return Err(crate::core::Error::Config(format!(
                "forest_band must be an increasing range, got ({lo}, {hi})"
            )));
        }
        if let Some((lo, hi)) = self.path_band {
            if lo >= hi {
                return Err(crate::core::Error::Config(format!(
                    "path_band must be an increasing range, got ({lo}, {hi})"
                )));
            }
        }
        Ok(())
    }
}

/// Threshold-based biome classifier
pub struct BiomeClassifier {
    params: BiomeParams,
}

impl BiomeClassifier {
    pub fn new(params: BiomeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BiomeParams {
        &self.params
    }

    /// Classify a cell by elevation and steepness
    ///
    /// Rules are evaluated in priority order; the last matching rule wins.
    pub fn classify(&self, elevation: f64, steepness: f64) -> BiomeTag {
        let p = &self.params;
        let mut tag = BiomeTag::Plains;

        let (forest_lo, forest_hi) = p.forest_band;
        if elevation >= forest_lo && elevation < forest_hi && steepness < p.forest_max_steepness {
            tag = BiomeTag::Forest;
        }

        if steepness > p.mountain_steepness
            || elevation + steepness * p.steepness_weight > p.mountain_combined
        {
            tag = BiomeTag::Mountain;
        }

        if elevation - steepness * p.steepness_weight > p.snow_elevation
            && steepness < p.snow_max_steepness
        {
            tag = BiomeTag::Snow;
        }

        if let Some((lo, hi)) = p.path_band {
            if elevation >= lo && elevation < hi {
                tag = BiomeTag::Path;
            }
        }

        tag
    }
}
