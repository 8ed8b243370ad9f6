//! Top-level engine: owns the world state and drives it per frame
//!
//! [`TerrainEngine`] wires the field, classifier, palette, tree placer,
//! voxel store and chunk manager together behind one `tick` call. The
//! host calls `tick` with the current viewpoint each frame and reads the
//! refreshed instance buffers; the offloaded meshing path is driven
//! explicitly through a [`MeshWorker`].

pub mod config;

use std::collections::HashMap;

use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::biome::{BiomeClassifier, Palette};
use crate::core::Error;
use crate::entity::{Marker, MarkerSet, TreePlacer};
use crate::field::ScalarField;
use crate::mesh::{ChunkMesh, InstanceBuffers, MeshContext};
use crate::streaming::{ChunkManager, RegenContext};
use crate::voxel::{ChunkKey, VoxelStore};
use crate::worker::{MeshRequest, MeshResult, MeshWorker};

pub use config::EngineConfig;

/// What one `tick` did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Whether the viewpoint entered a new chunk this tick.
    pub moved: bool,
    pub regenerated: usize,
    pub retired: usize,
    /// Instance count after the tick.
    pub instances: usize,
    /// Markers newly found this tick.
    pub markers_found: usize,
}

/// The block-terrain engine
pub struct TerrainEngine {
    config: EngineConfig,
    field: ScalarField,
    classifier: BiomeClassifier,
    palette: Palette,
    placer: TreePlacer,
    rng: SmallRng,
    store: VoxelStore,
    chunks: ChunkManager,
    buffers: InstanceBuffers,
    markers: MarkerSet,
    chunk_meshes: HashMap<ChunkKey, ChunkMesh>,
    mesh_requests: HashMap<String, ChunkKey>,
    next_request: u64,
}

impl TerrainEngine {
    /// Build an engine from a validated configuration
    pub fn new(config: EngineConfig) -> Result<Self, Error> {
        config.validate()?;
        log::info!(
            "engine: seed {}, chunk size {}, window radius {}",
            config.field.seed,
            config.chunk_size,
            config.window_radius
        );

        Ok(Self {
            field: ScalarField::new(config.field.clone()),
            classifier: BiomeClassifier::new(config.biome.clone()),
            palette: Palette::new(config.palette.clone()),
            placer: TreePlacer::new(config.trees.clone(), config.field.seed),
            rng: SmallRng::seed_from_u64(config.field.seed as u64),
            store: VoxelStore::new(config.chunk_size),
            chunks: ChunkManager::new(config.chunk_size, config.window_radius),
            buffers: InstanceBuffers::empty(),
            markers: MarkerSet::new(config.marker_radius),
            chunk_meshes: HashMap::new(),
            mesh_requests: HashMap::new(),
            next_request: 0,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &VoxelStore {
        &self.store
    }

    /// Instance buffers as of the last tick
    pub fn buffers(&self) -> &InstanceBuffers {
        &self.buffers
    }

    /// Advance the world to the given viewpoint
    ///
    /// Runs one streaming pass, re-flattens the instance buffers when the
    /// voxel set changed, and updates marker proximity. Cheap when the
    /// viewpoint stayed inside its chunk.
    pub fn tick(&mut self, viewpoint: Vec3) -> TickReport {
        let mut ctx = RegenContext {
            field: &self.field,
            classifier: &self.classifier,
            palette: &self.palette,
            placer: &self.placer,
            rng: &mut self.rng,
            viewpoint,
        };
        let report = self.chunks.update(viewpoint, &mut self.store, &mut ctx);

        if report.moved {
            self.buffers = InstanceBuffers::flatten(&self.store);
            // Cached chunk meshes follow the streaming window.
            self.chunk_meshes
                .retain(|key, _| self.chunks.level_of(*key).is_some());
        }

        let markers_found = self.markers.update(viewpoint);

        TickReport {
            moved: report.moved,
            regenerated: report.regenerated,
            retired: report.retired,
            instances: self.buffers.count,
            markers_found,
        }
    }

    /// Add a session marker at world (x, z)
    pub fn add_marker(&mut self, x: f32, z: f32) {
        self.markers.add(x, z);
    }

    pub fn markers(&self) -> &[Marker] {
        self.markers.markers()
    }

    /// Meshing inputs matching this engine's configuration
    pub fn mesh_context(&self) -> MeshContext {
        MeshContext::new(
            self.config.chunk_size,
            self.config.depth_cull,
            self.config.field.clone(),
            self.config.biome.clone(),
            self.config.palette.clone(),
        )
    }

    /// Spawn a mesh worker sharing this engine's world parameters
    pub fn spawn_mesh_worker(&self) -> Result<MeshWorker, Error> {
        MeshWorker::new(self.mesh_context(), self.config.workers)
    }

    /// Queue an offloaded mesh build for a loaded chunk
    ///
    /// Returns the correlation id, or `None` when the chunk is not loaded.
    pub fn request_chunk_mesh(
        &mut self,
        worker: &mut MeshWorker,
        key: ChunkKey,
    ) -> Result<Option<String>, Error> {
        let Some(level) = self.chunks.level_of(key) else {
            return Ok(None);
        };

        let id = format!("c{}", self.next_request);
        self.next_request += 1;
        self.mesh_requests.insert(id.clone(), key);
        worker.request(MeshRequest {
            id: id.clone(),
            x: key.x,
            z: key.z,
            level,
        })?;
        Ok(Some(id))
    }

    /// Apply finished mesh results, dropping ones that went stale
    ///
    /// A result is stale when its chunk has since been retired or
    /// regenerated at a different level. Returns how many results were
    /// applied to the mesh cache.
    pub fn drain_mesh_results(&mut self, worker: &mut MeshWorker) -> usize {
        let mut applied = 0;
        for result in worker.poll_results() {
            let Some(key) = self.mesh_requests.remove(result.id()) else {
                continue;
            };
            match result {
                MeshResult::Geometry { level, mesh, .. } => {
                    if self.chunks.level_of(key) == Some(level) {
                        self.chunk_meshes.insert(key, mesh);
                        applied += 1;
                    } else {
                        log::debug!("stale mesh for chunk ({}, {})", key.x, key.z);
                    }
                }
                MeshResult::Empty { level, .. } => {
                    if self.chunks.level_of(key) == Some(level) {
                        self.chunk_meshes.remove(&key);
                        applied += 1;
                    }
                }
                MeshResult::Failed { id, reason } => {
                    log::warn!("mesh request {id} for chunk ({}, {}) failed: {reason}", key.x, key.z);
                }
            }
        }
        applied
    }

    /// Cached offloaded mesh for a chunk, if one has been built
    pub fn chunk_mesh(&self, key: ChunkKey) -> Option<&ChunkMesh> {
        self.chunk_meshes.get(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn small_config() -> EngineConfig {
        EngineConfig {
            chunk_size: 16,
            window_radius: 2,
            workers: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig {
            chunk_size: 48,
            ..Default::default()
        };
        assert!(TerrainEngine::new(config).is_err());
    }

    #[test]
    fn test_first_tick_populates_window_and_buffers() {
        let mut engine = TerrainEngine::new(small_config()).unwrap();
        let report = engine.tick(Vec3::ZERO);

        assert!(report.moved);
        assert_eq!(report.regenerated, 25); // (2*2+1)^2
        assert!(report.instances > 0);
        assert_eq!(engine.buffers().count, engine.store().len());
        assert_eq!(engine.buffers().positions.len(), engine.store().len() * 3);
    }

    #[test]
    fn test_stationary_tick_is_cheap() {
        let mut engine = TerrainEngine::new(small_config()).unwrap();
        engine.tick(Vec3::ZERO);
        let count = engine.buffers().count;

        let report = engine.tick(Vec3::new(3.0, 10.0, -2.0));
        assert!(!report.moved);
        assert_eq!(report.regenerated, 0);
        assert_eq!(engine.buffers().count, count);
    }

    #[test]
    fn test_memory_bounded_while_traveling() {
        let mut engine = TerrainEngine::new(small_config()).unwrap();
        let mut max_instances = 0;
        for step in 0..20 {
            let report = engine.tick(Vec3::new(step as f32 * 16.0, 0.0, 0.0));
            max_instances = max_instances.max(report.instances);
        }

        // Window plus entities; far below 20 windows' worth.
        let final_count = engine.store().len();
        assert!(final_count > 0);
        assert!((max_instances as f64) < final_count as f64 * 2.0);
        assert!(engine.store().check_consistency());
    }

    #[test]
    fn test_markers_found_during_tick() {
        let mut engine = TerrainEngine::new(small_config()).unwrap();
        engine.add_marker(10.0, 10.0);
        engine.add_marker(5000.0, 5000.0);

        let report = engine.tick(Vec3::ZERO);
        assert_eq!(report.markers_found, 1);
        assert!(engine.markers()[0].found);
        assert!(!engine.markers()[1].found);
    }

    #[test]
    fn test_offloaded_mesh_round_trip() {
        let mut engine = TerrainEngine::new(small_config()).unwrap();
        engine.tick(Vec3::ZERO);
        let mut worker = engine.spawn_mesh_worker().unwrap();

        let key = ChunkKey::new(0, 0);
        let id = engine.request_chunk_mesh(&mut worker, key).unwrap();
        assert!(id.is_some());

        let mut applied = 0;
        for _ in 0..500 {
            applied += engine.drain_mesh_results(&mut worker);
            if applied > 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(applied, 1);

        let mesh = engine.chunk_mesh(key).expect("mesh should be cached");
        assert!(!mesh.positions.is_empty());
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn test_request_for_unloaded_chunk_returns_none() {
        let mut engine = TerrainEngine::new(small_config()).unwrap();
        engine.tick(Vec3::ZERO);
        let mut worker = engine.spawn_mesh_worker().unwrap();

        let far = ChunkKey::new(1000, 1000);
        assert_eq!(engine.request_chunk_mesh(&mut worker, far).unwrap(), None);
    }

    #[test]
    fn test_stale_mesh_result_is_dropped() {
        let mut engine = TerrainEngine::new(small_config()).unwrap();
        engine.tick(Vec3::ZERO);
        let mut worker = engine.spawn_mesh_worker().unwrap();

        let key = ChunkKey::new(0, 0);
        engine.request_chunk_mesh(&mut worker, key).unwrap();

        // Jump far away before the result lands: the chunk is retired.
        engine.tick(Vec3::new(1.0e5, 0.0, 1.0e5));
        assert_eq!(engine.chunks.level_of(key), None);

        let mut applied = 0;
        for _ in 0..100 {
            applied += engine.drain_mesh_results(&mut worker);
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(applied, 0);
        assert!(engine.chunk_mesh(key).is_none());
    }
}
