//! Distance-based LOD and the chunk streaming state machine

pub mod lod;
pub mod manager;

pub use lod::level_for_distance;
pub use manager::{ChunkManager, RegenContext, StreamingReport};
