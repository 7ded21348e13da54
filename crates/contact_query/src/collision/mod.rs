//! Collision geometry and closest-point queries
//!
//! # Module Organization
//!
//! - [`primitives`] - Triangle, AABB, and segment math
//! - [`mesh`] - Static collision mesh data model
//! - [`shape`] - Shape descriptors for the dispatch layer
//! - [`closest_point`] - Closest-point and closest-pair dispatch by shape kind
//!
//! # Key Types
//!
//! - [`CollisionMesh`] - Immutable triangle mesh with a stable identity
//! - [`CollisionShape`] - Sphere, box, capsule, or placed mesh
//! - [`Triangle`], [`Aabb`] - Primitive geometric types

pub mod closest_point;
pub mod mesh;
pub mod primitives;
pub mod shape;

// Re-export commonly used types
pub use closest_point::{
    closest_point_on_shape, closest_points_between, closest_points_segment_shape,
    closest_points_swept,
};
pub use mesh::{CollisionMesh, MeshError, MeshId, TriangleRef};
pub use primitives::{Aabb, Triangle};
pub use shape::CollisionShape;
