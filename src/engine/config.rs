//! Engine configuration
//!
//! One serializable struct gathers every tunable, with defaults matching
//! the classic world. Validation happens once at engine construction;
//! everything downstream can assume the parameters are sane.

use serde::{Deserialize, Serialize};

use crate::biome::{BiomeParams, PaletteParams};
use crate::core::Error;
use crate::entity::TreeParams;
use crate::field::FieldParams;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chunk edge length in world units. Must be a power of two; it is also
    /// the coarsest LOD level a chunk can be generated at.
    pub chunk_size: u32,
    /// Streaming window half-width in chunks.
    pub window_radius: u32,
    /// Meshing drops cells whose elevation falls below this.
    pub depth_cull: f64,
    /// Planar distance at which a marker counts as found.
    pub marker_radius: f32,
    /// Concurrent jobs in the mesh worker.
    pub workers: usize,
    pub field: FieldParams,
    pub biome: BiomeParams,
    pub palette: PaletteParams,
    pub trees: TreeParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64,
            window_radius: 8,
            depth_cull: -100.0,
            marker_radius: 50.0,
            workers: 4,
            field: FieldParams::default(),
            biome: BiomeParams::default(),
            palette: PaletteParams::default(),
            trees: TreeParams::default(),
        }
    }
}

impl EngineConfig {
    /// Check the whole configuration, delegating to each parameter group
    pub fn validate(&self) -> Result<(), Error> {
        if self.chunk_size == 0 || !self.chunk_size.is_power_of_two() {
            return Err(Error::Config(format!(
                "chunk_size must be a power of two, got {}",
                self.chunk_size
            )));
        }
        if self.window_radius == 0 {
            return Err(Error::Config("window_radius must be >= 1".into()));
        }
        if self.workers == 0 {
            return Err(Error::Config("workers must be >= 1".into()));
        }
        if !(self.marker_radius > 0.0) {
            return Err(Error::Config(format!(
                "marker_radius must be positive, got {}",
                self.marker_radius
            )));
        }
        self.field.validate()?;
        self.biome.validate()?;
        self.palette.validate()?;
        self.trees.validate()?;
        Ok(())
    }

    /// Parse and validate a configuration from JSON
    ///
    /// Missing fields fall back to defaults, so `{}` is a valid config.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(format!("bad config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 64);
        assert_eq!(config.window_radius, 8);
    }

    #[test]
    fn test_rejects_non_power_of_two_chunk_size() {
        for chunk_size in [0u32, 3, 48, 100] {
            let config = EngineConfig {
                chunk_size,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "chunk_size {chunk_size}");
        }
    }

    #[test]
    fn test_rejects_degenerate_window_and_workers() {
        assert!(
            EngineConfig {
                window_radius: 0,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
        assert!(
            EngineConfig {
                workers: 0,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_validate_delegates_to_parameter_groups() {
        let mut config = EngineConfig::default();
        config.field.octaves = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_defaults_and_overrides() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config.chunk_size, 64);

        let config =
            EngineConfig::from_json(r#"{"chunk_size": 32, "field": {"seed": 7}}"#).unwrap();
        assert_eq!(config.chunk_size, 32);
        assert_eq!(config.field.seed, 7);
        // Unspecified nested fields keep their defaults too.
        assert_eq!(config.field.octaves, 6);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(EngineConfig::from_json("not json").is_err());
        assert!(EngineConfig::from_json(r#"{"chunk_size": 7}"#).is_err());
    }
}
