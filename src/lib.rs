//! Cubeland - an infinite LOD block-terrain engine
//!
//! Procedurally generates a block world around a moving viewpoint: layered
//! noise drives an elevation/steepness field, chunks are (re)generated at a
//! distance-based level of detail, and the resulting voxel set is flattened
//! into instance buffers (or meshed per chunk by an offloaded worker) for an
//! external renderer.

pub mod biome;
pub mod core;
pub mod engine;
pub mod entity;
pub mod field;
pub mod mesh;
pub mod streaming;
pub mod voxel;
pub mod worker;
