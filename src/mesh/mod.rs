//! Render-ready geometry: instance buffers and per-chunk triangle meshes
//!
//! Two architectures share this module. The synchronous path flattens the
//! whole voxel store into parallel instance-attribute buffers (one shared
//! cube is instanced by the renderer, geometry is never duplicated per
//! voxel). The offloaded path expands one chunk into a flat, non-instanced
//! triangle mesh so the heavy vertex work can run outside the render loop.

use serde::{Deserialize, Serialize};

use crate::biome::{BiomeClassifier, BiomeParams, Palette, PaletteParams};
use crate::field::{FieldParams, ScalarField};
use crate::voxel::VoxelStore;

/// Flat instance-attribute buffers for the whole voxel collection
///
/// Sized exactly to the instance count: positions are 3 floats per
/// instance, scales 1, and each of the six face-color buffers 3.
#[derive(Clone, Debug, Default)]
pub struct InstanceBuffers {
    pub count: usize,
    pub positions: Vec<f32>,
    pub scales: Vec<f32>,
    pub face_colors: [Vec<f32>; 6],
}

impl InstanceBuffers {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Walk the store and write all four parallel buffers
    pub fn flatten(store: &VoxelStore) -> Self {
        let count = store.len();
        let mut positions = Vec::with_capacity(count * 3);
        let mut scales = Vec::with_capacity(count);
        let mut face_colors: [Vec<f32>; 6] =
            std::array::from_fn(|_| Vec::with_capacity(count * 3));

        for (_, voxel) in store.iter() {
            positions.extend_from_slice(&voxel.position.to_array());
            scales.push(voxel.scale);
            for (face, buffer) in face_colors.iter_mut().enumerate() {
                buffer.extend_from_slice(&voxel.faces[face]);
            }
        }

        Self {
            count,
            positions,
            scales,
            face_colors,
        }
    }
}

/// Flat triangle mesh for one chunk (positions/indices/normals/colors)
///
/// Colors are RGBA per vertex. Indices reference vertices local to this
/// mesh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMesh {
    pub positions: Vec<f32>,
    pub indices: Vec<u32>,
    pub normals: Vec<f32>,
    pub colors: Vec<f32>,
}

impl ChunkMesh {
    /// Number of vertices in the mesh
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Read-only inputs for chunk meshing, safely shared across workers
pub struct MeshContext {
    pub chunk_size: u32,
    /// Cells whose elevation falls below this are culled from the mesh.
    pub depth_cull: f64,
    pub field: ScalarField,
    pub classifier: BiomeClassifier,
    pub palette: Palette,
}

impl MeshContext {
    pub fn new(
        chunk_size: u32,
        depth_cull: f64,
        field: FieldParams,
        biome: BiomeParams,
        palette: PaletteParams,
    ) -> Self {
        Self {
            chunk_size,
            depth_cull,
            field: ScalarField::new(field),
            classifier: BiomeClassifier::new(biome),
            palette: Palette::new(palette),
        }
    }
}

// One box is 6 faces x 4 vertices; two triangles per face.
const BOX_VERTEX_COUNT: u32 = 24;

const BOX_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
];

/// Corner positions of an axis-aligned box of edge `size` centered at origin
fn box_corners(size: f32) -> [[f32; 3]; 24] {
    let hs = size / 2.0;
    [
        // Front face (-Z)
        [-hs, -hs, -hs],
        [hs, -hs, -hs],
        [hs, hs, -hs],
        [-hs, hs, -hs],
        // Back face (+Z)
        [-hs, -hs, hs],
        [-hs, hs, hs],
        [hs, hs, hs],
        [hs, -hs, hs],
        // Top face (+Y)
        [-hs, hs, -hs],
        [hs, hs, -hs],
        [hs, hs, hs],
        [-hs, hs, hs],
        // Bottom face (-Y)
        [-hs, -hs, -hs],
        [-hs, -hs, hs],
        [hs, -hs, hs],
        [hs, -hs, -hs],
        // Right face (+X)
        [hs, -hs, -hs],
        [hs, -hs, hs],
        [hs, hs, hs],
        [hs, hs, -hs],
        // Left face (-X)
        [-hs, -hs, -hs],
        [-hs, hs, -hs],
        [-hs, hs, hs],
        [-hs, -hs, hs],
    ]
}

/// Area-averaged surface color of the footprint of one block
///
/// Sub-samples the block footprint at a coarse step and averages the biome
/// top-face color. Coarse blocks straddling a biome border get a blended
/// color instead of whichever biome their center happens to hit.
fn average_block_color(x: f64, z: f64, size: f64, ctx: &MeshContext) -> [f32; 3] {
    let step = (size / 4.0).floor().max(1.0);
    let mut sum = [0.0f32; 3];
    let mut count = 0u32;

    let mut i = x - size / 2.0 + step / 2.0;
    while i < x + size / 2.0 {
        let mut j = z - size / 2.0 + step / 2.0;
        while j < z + size / 2.0 {
            let elevation = ctx.field.elevation(i, j);
            let steepness = ctx.field.steepness(i, j);
            let tag = ctx.classifier.classify(elevation, steepness);
            let top = ctx.palette.faces_for(tag)[2];
            sum[0] += top[0];
            sum[1] += top[1];
            sum[2] += top[2];
            count += 1;
            j += step;
        }
        i += step;
    }

    if count == 0 {
        let elevation = ctx.field.elevation(x, z);
        let steepness = ctx.field.steepness(x, z);
        return ctx.palette.faces_for(ctx.classifier.classify(elevation, steepness))[2];
    }
    let inv = 1.0 / count as f32;
    [sum[0] * inv, sum[1] * inv, sum[2] * inv]
}

/// Expand one chunk at the given LOD level into a triangle mesh
///
/// Pure function of its inputs plus the shared read-only noise seed; safe
/// to evaluate on any worker. Returns `None` when every cell was culled.
pub fn build_chunk_mesh(x: i32, z: i32, level: u32, ctx: &MeshContext) -> Option<ChunkMesh> {
    let level = level.clamp(1, ctx.chunk_size);
    let cells = ctx.chunk_size / level;
    let size = level as f64;

    let mut mesh = ChunkMesh::default();
    let mut next_index = 0u32;

    for i in 0..cells {
        for j in 0..cells {
            // Cells are centered in the chunk, unlike the instanced path.
            let bx = (x as f64) * ctx.chunk_size as f64
                + (i as f64 - cells as f64 / 2.0 + 0.5) * size;
            let bz = (z as f64) * ctx.chunk_size as f64
                + (j as f64 - cells as f64 / 2.0 + 0.5) * size;
            let by = ctx.field.elevation(bx, bz);

            if by < ctx.depth_cull {
                continue;
            }

            let color = average_block_color(bx, bz, size, ctx);
            let corners = box_corners(level as f32);

            for (v, corner) in corners.iter().enumerate() {
                mesh.positions.push(corner[0] + bx as f32);
                mesh.positions.push(corner[1] + by as f32);
                mesh.positions.push(corner[2] + bz as f32);
                let normal = BOX_NORMALS[v / 4];
                mesh.normals.extend_from_slice(&normal);
                mesh.colors.extend_from_slice(&[color[0], color[1], color[2], 1.0]);
            }
            for face in 0..6u32 {
                let base = next_index + face * 4;
                mesh.indices
                    .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
            next_index += BOX_VERTEX_COUNT;
        }
    }

    if mesh.positions.is_empty() { None } else { Some(mesh) }
}
