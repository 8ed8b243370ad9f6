//! Headless flyover demo
//!
//! Streams terrain along a straight flight path and logs what each tick
//! did. Useful for eyeballing streaming cost and voxel counts without a
//! renderer attached.

use glam::Vec3;

use cubeland::engine::{EngineConfig, TerrainEngine};
use cubeland::voxel::ChunkKey;

fn main() -> Result<(), cubeland::core::Error> {
    cubeland::core::logging::init();

    let config = EngineConfig {
        chunk_size: 64,
        window_radius: 6,
        ..Default::default()
    };
    let mut engine = TerrainEngine::new(config)?;
    engine.add_marker(500.0, 500.0);
    engine.add_marker(2000.0, 0.0);

    let mut worker = engine.spawn_mesh_worker()?;

    // Fly east at one chunk per step, meshing the chunk underfoot.
    for step in 0..40 {
        let viewpoint = Vec3::new(step as f32 * 64.0, 200.0, step as f32 * 8.0);
        let report = engine.tick(viewpoint);

        if report.moved {
            let key = ChunkKey::nearest(viewpoint, engine.config().chunk_size);
            engine.request_chunk_mesh(&mut worker, key)?;
        }
        let meshed = engine.drain_mesh_results(&mut worker);

        log::info!(
            "step {:2}: {} regenerated, {} retired, {} instances, {} meshes applied, {} markers found",
            step,
            report.regenerated,
            report.retired,
            report.instances,
            meshed,
            report.markers_found,
        );
    }

    // Let stragglers land before reporting totals.
    std::thread::sleep(std::time::Duration::from_millis(200));
    engine.drain_mesh_results(&mut worker);

    log::info!(
        "done: {} voxels in {} chunks, {} markers found",
        engine.store().len(),
        engine.store().chunk_count(),
        engine.markers().iter().filter(|m| m.found).count(),
    );
    Ok(())
}
