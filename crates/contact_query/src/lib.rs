//! # Contact Query
//!
//! Spatial indexing and nearest-point-on-surface queries for static
//! triangle meshes, plus the closest-point routines for primitive shapes
//! that share the same numerical core.
//!
//! ## Features
//!
//! - **Triangle Octree**: recursive eight-way index over a mesh's
//!   triangles, built once per distinct mesh and queried many times
//! - **Exact Triangle Math**: Voronoi-region closest-point classification
//!   in the innermost loop, allocation-free
//! - **Index Caching**: per-mesh build-once semantics with optional
//!   capacity-bounded retention
//! - **Shape Dispatch**: closed-form sphere/box/capsule queries and
//!   segment-vs-mesh pairs that consult the index
//!
//! ## Quick Start
//!
//! ```rust
//! use contact_query::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), MeshError> {
//! // A 2x2 floor quad in the XZ plane.
//! let floor = Arc::new(CollisionMesh::new(
//!     "floor",
//!     vec![
//!         Vec3::new(0.0, 0.0, 0.0),
//!         Vec3::new(2.0, 0.0, 0.0),
//!         Vec3::new(2.0, 0.0, 2.0),
//!         Vec3::new(0.0, 0.0, 2.0),
//!     ],
//!     vec![0, 1, 2, 0, 2, 3],
//! )?);
//!
//! let mut cache = MeshIndexCache::new();
//! let shape = CollisionShape::mesh(floor, Transform::identity());
//! let contact = closest_point_on_shape(Vec3::new(0.5, 1.0, 0.5), &shape, &mut cache)?;
//! assert_eq!(contact, Some(Vec3::new(0.5, 0.0, 0.5)));
//! # Ok(())
//! # }
//! ```
//!
//! Queries against a mesh's index run in the mesh's local space; the
//! shape dispatch converts through the shape's [`Transform`] on both
//! sides. Callers working with the index directly do that conversion
//! themselves.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod collision;
pub mod config;
pub mod foundation;
pub mod spatial;

pub use config::{ConfigError, QueryConfig};

/// Common imports for crate users
pub mod prelude {
    pub use crate::collision::{
        closest_point_on_shape, closest_points_between, closest_points_segment_shape,
        closest_points_swept, Aabb, CollisionMesh, CollisionShape, MeshError, MeshId, Triangle,
        TriangleRef,
    };
    pub use crate::config::QueryConfig;
    pub use crate::foundation::math::{Quat, Transform, Vec3};
    pub use crate::spatial::{CacheConfig, MeshIndexCache, OctreeConfig, TriangleOctree};
}
