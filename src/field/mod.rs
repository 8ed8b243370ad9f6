//! Layered-noise elevation and steepness field
//!
//! Elevation sums octaves of 2D Perlin noise at doubling amplitude. Each
//! octave's raw sample is clamped non-negative and reshaped with `v + v^2`,
//! which biases the terrain toward flat lowlands with occasional sharp
//! peaks. Steepness is the magnitude of the discrete elevation gradient.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::Error;

/// Parameters controlling field evaluation
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    /// Random seed for the noise primitive.
    pub seed: u32,
    /// Number of noise octaves summed per elevation sample.
    pub octaves: u32,
    /// Amplitude of the first octave; octave `i` uses `base * 2^i`.
    pub base_amplitude: f64,
    /// Wavelength multiplier: octave `i` samples at frequency `1 / (amp_i * k)`.
    pub frequency_factor: f64,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            octaves: 6,
            base_amplitude: 64.0,
            frequency_factor: 8.0,
        }
    }
}

impl FieldParams {
    /// Reject degenerate parameters before first use.
    pub fn validate(&self) -> Result<(), Error> {
        if self.octaves == 0 {
            return Err(Error::Config("field octaves must be >= 1".into()));
        }
        if !(self.base_amplitude > 0.0) {
            return Err(Error::Config(format!(
                "field base_amplitude must be positive, got {}",
                self.base_amplitude
            )));
        }
        if !(self.frequency_factor > 0.0) {
            return Err(Error::Config(format!(
                "field frequency_factor must be positive, got {}",
                self.frequency_factor
            )));
        }
        Ok(())
    }
}

/// Procedural elevation/steepness field backed by Perlin noise
pub struct ScalarField {
    params: FieldParams,
    noise: Perlin,
}

impl ScalarField {
    /// Create a new field with the given parameters
    pub fn new(params: FieldParams) -> Self {
        let noise = Perlin::new(params.seed);
        Self { params, noise }
    }

    /// Get field parameters
    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    /// Terrain elevation at world position (x, z)
    ///
    /// Deterministic and finite for any finite input with a fixed seed.
    /// Never negative; there is no sub-sea-level terrain in this scheme.
    pub fn elevation(&self, x: f64, z: f64) -> f64 {
        let mut height = 0.0;
        for i in 0..self.params.octaves {
            let amp = self.params.base_amplitude * f64::powi(2.0, i as i32);
            let freq = 1.0 / (amp * self.params.frequency_factor);
            // Offset each octave by its amplitude so octaves decorrelate.
            let raw = self.noise.get([x * freq + amp, z * freq + amp]);
            let v = raw.max(0.0);
            height += (v + v * v) * amp;
        }
        height.max(0.0)
    }

    /// Magnitude of the discrete elevation gradient at (x, z)
    ///
    /// Costs two extra elevation evaluations; chunk passes should go through
    /// [`FieldSampler`] so boundary samples are shared between cells.
    pub fn steepness(&self, x: f64, z: f64) -> f64 {
        let e = self.elevation(x, z);
        let ex = self.elevation(x + 1.0, z);
        let ez = self.elevation(x, z + 1.0);
        ((e - ex) * (e - ex) + (e - ez) * (e - ez)).sqrt()
    }
}

/// Elevation cache for one chunk generation pass
///
/// Cell coordinates inside a chunk are integer-valued, so the cache keys on
/// the integer position. Steepness at a cell reuses the neighbouring
/// elevations instead of re-deriving them at the chunk boundary.
pub struct FieldSampler<'a> {
    field: &'a ScalarField,
    cache: HashMap<(i64, i64), f64>,
}

impl<'a> FieldSampler<'a> {
    pub fn new(field: &'a ScalarField) -> Self {
        Self {
            field,
            cache: HashMap::new(),
        }
    }

    /// Cached elevation at integer world position (x, z)
    pub fn elevation(&mut self, x: i64, z: i64) -> f64 {
        *self
            .cache
            .entry((x, z))
            .or_insert_with(|| self.field.elevation(x as f64, z as f64))
    }

    /// Steepness at integer world position (x, z), sharing cached elevations
    pub fn steepness(&mut self, x: i64, z: i64) -> f64 {
        let e = self.elevation(x, z);
        let ex = self.elevation(x + 1, z);
        let ez = self.elevation(x, z + 1);
        ((e - ex) * (e - ex) + (e - ez) * (e - ez)).sqrt()
    }

    /// Number of distinct positions evaluated so far
    pub fn sampled(&self) -> usize {
        self.cache.len()
    }
}
