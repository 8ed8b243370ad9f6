//! Sparse voxel store with a chunk-keyed secondary index
//!
//! Arena-style: the store owns every voxel by integer id, and a secondary
//! map from chunk key to id set supports bulk delete-by-chunk without
//! reshuffling a dense array. The two maps are maintained transactionally:
//! the union of all per-chunk id sets is exactly the key set of the primary
//! map.

use std::collections::{HashMap, HashSet};

use super::{ChunkKey, Voxel, VoxelId};

/// Owns all generated voxels, keyed by id, indexed by chunk
pub struct VoxelStore {
    chunk_size: u32,
    voxels: HashMap<VoxelId, Voxel>,
    chunks: HashMap<ChunkKey, HashSet<VoxelId>>,
    next_id: u64,
}

impl VoxelStore {
    /// Create an empty store for the given chunk edge length
    pub fn new(chunk_size: u32) -> Self {
        Self {
            chunk_size,
            voxels: HashMap::new(),
            chunks: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Insert a voxel, indexing it under the chunk containing its (x, z)
    pub fn insert(&mut self, voxel: Voxel) -> VoxelId {
        let id = VoxelId(self.next_id);
        self.next_id += 1;

        let key = ChunkKey::containing(voxel.position.x, voxel.position.z, self.chunk_size);
        self.chunks.entry(key).or_default().insert(id);
        self.voxels.insert(id, voxel);
        id
    }

    /// Remove every voxel indexed under `key`, freeing its index bucket
    ///
    /// Returns the number of voxels removed. No-op on an unloaded key.
    pub fn delete_chunk(&mut self, key: ChunkKey) -> usize {
        match self.chunks.remove(&key) {
            Some(ids) => {
                for id in &ids {
                    self.voxels.remove(id);
                }
                ids.len()
            }
            None => 0,
        }
    }

    pub fn get(&self, id: VoxelId) -> Option<&Voxel> {
        self.voxels.get(&id)
    }

    /// Total voxel count
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Number of voxels indexed under a chunk key
    pub fn chunk_len(&self, key: ChunkKey) -> usize {
        self.chunks.get(&key).map_or(0, HashSet::len)
    }

    /// Number of chunks holding at least one voxel
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterate over all voxels
    pub fn iter(&self) -> impl Iterator<Item = (VoxelId, &Voxel)> {
        self.voxels.iter().map(|(id, v)| (*id, v))
    }

    /// Iterate over the ids indexed under one chunk
    pub fn chunk_ids(&self, key: ChunkKey) -> impl Iterator<Item = VoxelId> + '_ {
        self.chunks.get(&key).into_iter().flatten().copied()
    }

    /// Verify the primary map and the chunk index agree
    ///
    /// The sum of bucket sizes must equal the primary map length, and every
    /// indexed id must resolve to a voxel whose position falls in that key.
    pub fn check_consistency(&self) -> bool {
        let indexed: usize = self.chunks.values().map(HashSet::len).sum();
        if indexed != self.voxels.len() {
            return false;
        }
        for (key, ids) in &self.chunks {
            for id in ids {
                match self.voxels.get(id) {
                    Some(v) => {
                        let home =
                            ChunkKey::containing(v.position.x, v.position.z, self.chunk_size);
                        if home != *key {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::shaded_faces;
    use glam::Vec3;

    fn voxel(x: f32, y: f32, z: f32, scale: f32) -> Voxel {
        Voxel {
            position: Vec3::new(x, y, z),
            scale,
            faces: shaded_faces([0.3, 0.6, 0.44], 0.1),
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = VoxelStore::new(64);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.chunk_count(), 0);
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = VoxelStore::new(64);
        let id = store.insert(voxel(10.0, 5.0, 10.0, 1.0));

        assert_eq!(store.len(), 1);
        let v = store.get(id).unwrap();
        assert_eq!(v.position, Vec3::new(10.0, 5.0, 10.0));
        assert_eq!(store.chunk_len(ChunkKey::new(0, 0)), 1);
    }

    #[test]
    fn test_ids_monotonic_and_never_reused() {
        let mut store = VoxelStore::new(64);
        let a = store.insert(voxel(1.0, 0.0, 1.0, 1.0));
        let b = store.insert(voxel(2.0, 0.0, 2.0, 1.0));
        assert!(b > a);

        store.delete_chunk(ChunkKey::new(0, 0));
        let c = store.insert(voxel(3.0, 0.0, 3.0, 1.0));
        assert!(c > b, "ids must not be reused after deletion");
    }

    #[test]
    fn test_insert_indexes_by_position() {
        let mut store = VoxelStore::new(64);
        store.insert(voxel(10.0, 0.0, 10.0, 1.0));
        store.insert(voxel(70.0, 0.0, 10.0, 1.0));
        store.insert(voxel(-10.0, 0.0, 10.0, 1.0));

        assert_eq!(store.chunk_len(ChunkKey::new(0, 0)), 1);
        assert_eq!(store.chunk_len(ChunkKey::new(1, 0)), 1);
        assert_eq!(store.chunk_len(ChunkKey::new(-1, 0)), 1);
        assert!(store.check_consistency());
    }

    #[test]
    fn test_delete_chunk_removes_all_ids() {
        let mut store = VoxelStore::new(64);
        let in_chunk: Vec<_> = (0..10)
            .map(|i| store.insert(voxel(i as f32, 0.0, 0.0, 1.0)))
            .collect();
        let outside = store.insert(voxel(100.0, 0.0, 0.0, 1.0));

        let removed = store.delete_chunk(ChunkKey::new(0, 0));
        assert_eq!(removed, 10);
        assert_eq!(store.len(), 1);
        assert_eq!(store.chunk_len(ChunkKey::new(0, 0)), 0);

        for id in in_chunk {
            assert!(store.get(id).is_none(), "no id from the chunk may survive");
        }
        assert!(store.get(outside).is_some());
        assert!(store.check_consistency());
    }

    #[test]
    fn test_delete_unloaded_chunk_is_noop() {
        let mut store = VoxelStore::new(64);
        assert_eq!(store.delete_chunk(ChunkKey::new(42, -17)), 0);

        store.insert(voxel(0.0, 0.0, 0.0, 1.0));
        assert_eq!(store.delete_chunk(ChunkKey::new(5, 5)), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_no_orphans_after_interleaved_ops() {
        let mut store = VoxelStore::new(64);
        for i in 0..50 {
            store.insert(voxel((i * 13 % 300) as f32, 0.0, (i * 7 % 300) as f32, 1.0));
        }
        store.delete_chunk(ChunkKey::new(0, 0));
        store.insert(voxel(5.0, 0.0, 5.0, 1.0));
        store.delete_chunk(ChunkKey::new(2, 1));
        assert!(store.check_consistency());

        let total: usize = (-1..6)
            .flat_map(|x| (-1..6).map(move |z| ChunkKey::new(x, z)))
            .map(|k| store.chunk_len(k))
            .sum();
        assert_eq!(total, store.len());
    }

    #[test]
    fn test_chunk_ids_iteration() {
        let mut store = VoxelStore::new(64);
        let a = store.insert(voxel(1.0, 0.0, 1.0, 1.0));
        let b = store.insert(voxel(2.0, 0.0, 2.0, 1.0));
        store.insert(voxel(100.0, 0.0, 100.0, 1.0));

        let mut ids: Vec<_> = store.chunk_ids(ChunkKey::new(0, 0)).collect();
        ids.sort();
        assert_eq!(ids, vec![a, b]);
    }
}
