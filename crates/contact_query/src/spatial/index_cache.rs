//! Mesh index cache
//!
//! Building a [`TriangleOctree`] walks every triangle of a mesh, so it
//! should happen once per distinct mesh. The cache maps mesh identity to
//! its built index and remembers how long each build took. It is an
//! explicit service object, not process-global state: hosts own one (or
//! several, in tests) and wrap it in their own synchronization policy if
//! they query from multiple threads.
//!
//! The cache never observes mesh data changing after the first build; an
//! index built over since-modified buffers is stale. That is a documented
//! property of the design, not something the cache tries to detect.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::octree::{OctreeConfig, TriangleOctree};
use crate::collision::mesh::{CollisionMesh, MeshError, MeshId};
use crate::foundation::time::Stopwatch;

/// Configuration for cache retention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached indices; the least recently used entry
    /// is evicted to make room. `None` keeps every index for the life
    /// of the cache.
    pub capacity: Option<usize>,
}

/// Cache of built spatial indices, keyed by mesh identity.
#[derive(Debug, Default)]
pub struct MeshIndexCache {
    indices: HashMap<MeshId, Arc<TriangleOctree>>,
    build_times: HashMap<MeshId, Duration>,
    last_used: HashMap<MeshId, u64>,
    tick: u64,
    builds: u64,
    octree_config: OctreeConfig,
    config: CacheConfig,
}

impl MeshIndexCache {
    /// Create a cache with default octree tuning and unbounded retention.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache with explicit octree and retention configuration.
    pub fn with_config(octree_config: OctreeConfig, config: CacheConfig) -> Self {
        Self {
            octree_config,
            config,
            ..Self::default()
        }
    }

    /// Fetch the index for a mesh, building (and timing) it on first use.
    ///
    /// Fails only when the mesh data cannot back an index; the caller's
    /// documented fallback is a coarser proxy volume.
    pub fn get_or_build(
        &mut self,
        mesh: &Arc<CollisionMesh>,
    ) -> Result<Arc<TriangleOctree>, MeshError> {
        self.tick += 1;
        let id = mesh.id();

        if let Some(index) = self.indices.get(&id) {
            log::trace!("index cache hit for mesh '{}'", mesh.name());
            self.last_used.insert(id, self.tick);
            return Ok(Arc::clone(index));
        }

        let stopwatch = Stopwatch::start_new();
        let index = match TriangleOctree::build(Arc::clone(mesh), &self.octree_config) {
            Ok(index) => Arc::new(index),
            Err(error) => {
                log::warn!("cannot index mesh '{}': {error}", mesh.name());
                return Err(error);
            }
        };
        let elapsed = stopwatch.elapsed();
        self.builds += 1;
        log::debug!(
            "indexed mesh '{}' ({} triangles) in {:.2}ms",
            mesh.name(),
            mesh.triangle_count(),
            stopwatch.elapsed_millis(),
        );

        if let Some(capacity) = self.config.capacity {
            while self.indices.len() >= capacity.max(1) {
                self.evict_least_recently_used();
            }
        }

        self.indices.insert(id, Arc::clone(&index));
        self.build_times.insert(id, elapsed);
        self.last_used.insert(id, self.tick);
        Ok(index)
    }

    fn evict_least_recently_used(&mut self) {
        let Some((&stale, _)) = self.last_used.iter().min_by_key(|(_, &tick)| tick) else {
            return;
        };
        self.indices.remove(&stale);
        self.build_times.remove(&stale);
        self.last_used.remove(&stale);
        log::trace!("evicted spatial index for mesh id {stale:?}");
    }

    /// Wall-clock time the index for `id` took to build, if cached.
    pub fn build_time(&self, id: MeshId) -> Option<Duration> {
        self.build_times.get(&id).copied()
    }

    /// Whether an index for `id` is currently cached
    pub fn contains(&self, id: MeshId) -> bool {
        self.indices.contains_key(&id)
    }

    /// Number of cached indices
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when no indices are cached
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Total number of index builds performed over the cache's lifetime
    pub fn build_count(&self) -> u64 {
        self.builds
    }

    /// Drop every cached index.
    pub fn clear(&mut self) {
        self.indices.clear();
        self.build_times.clear();
        self.last_used.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::logging;
    use crate::foundation::math::Vec3;

    fn tetrahedron(name: &str) -> Arc<CollisionMesh> {
        Arc::new(
            CollisionMesh::new(
                name,
                vec![
                    Vec3::new(0.0, 0.0, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(0.0, 1.0, 0.0),
                    Vec3::new(0.0, 0.0, 1.0),
                ],
                vec![0, 1, 2, 0, 1, 3, 0, 2, 3, 1, 2, 3],
            )
            .expect("valid tetrahedron"),
        )
    }

    #[test]
    fn test_single_build_per_mesh() {
        logging::try_init();
        let mut cache = MeshIndexCache::new();
        let mesh = tetrahedron("terrain");

        let first = cache.get_or_build(&mesh).expect("queryable mesh");
        let second = cache.get_or_build(&mesh).expect("queryable mesh");

        assert_eq!(cache.build_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.build_time(mesh.id()).is_some());
    }

    #[test]
    fn test_distinct_meshes_build_separately() {
        let mut cache = MeshIndexCache::new();
        let first = tetrahedron("ramp");
        let second = tetrahedron("ledge");

        cache.get_or_build(&first).expect("queryable mesh");
        cache.get_or_build(&second).expect("queryable mesh");

        assert_eq!(cache.build_count(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_non_queryable_mesh_is_not_cached() {
        let mut cache = MeshIndexCache::new();
        let mesh = Arc::new(
            CollisionMesh::new("sealed", Vec::new(), Vec::new())
                .expect("empty mesh")
                .with_queryable(false),
        );

        assert!(matches!(
            cache.get_or_build(&mesh),
            Err(MeshError::NotQueryable { .. })
        ));
        assert!(cache.is_empty());
        assert_eq!(cache.build_count(), 0);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let mut cache = MeshIndexCache::with_config(
            OctreeConfig::default(),
            CacheConfig { capacity: Some(2) },
        );
        let first = tetrahedron("a");
        let second = tetrahedron("b");
        let third = tetrahedron("c");

        cache.get_or_build(&first).expect("queryable mesh");
        cache.get_or_build(&second).expect("queryable mesh");
        // Touch the first so the second becomes least recently used.
        cache.get_or_build(&first).expect("queryable mesh");
        cache.get_or_build(&third).expect("queryable mesh");

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(first.id()));
        assert!(!cache.contains(second.id()));
        assert!(cache.contains(third.id()));
        assert_eq!(cache.build_count(), 3);
    }

    #[test]
    fn test_rebuild_after_eviction() {
        let mut cache = MeshIndexCache::with_config(
            OctreeConfig::default(),
            CacheConfig { capacity: Some(1) },
        );
        let first = tetrahedron("a");
        let second = tetrahedron("b");

        cache.get_or_build(&first).expect("queryable mesh");
        cache.get_or_build(&second).expect("queryable mesh");
        cache.get_or_build(&first).expect("queryable mesh");

        assert_eq!(cache.build_count(), 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_resets_entries_but_not_counter() {
        let mut cache = MeshIndexCache::new();
        let mesh = tetrahedron("terrain");
        cache.get_or_build(&mesh).expect("queryable mesh");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.build_count(), 1);

        cache.get_or_build(&mesh).expect("queryable mesh");
        assert_eq!(cache.build_count(), 2);
    }
}
