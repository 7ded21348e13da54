//! Static collision mesh data model
//!
//! A collision mesh is an immutable vertex buffer plus a flat triangle
//! index buffer, validated once at construction. Meshes carry a stable
//! identity so the spatial index cache can key on them, and a queryable
//! flag for environments where the raw mesh data cannot be read back.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use super::primitives::{Aabb, Triangle};
use crate::foundation::math::Vec3;

/// Errors from collision mesh construction and index building.
#[derive(Debug, Clone, Error)]
pub enum MeshError {
    /// The mesh's raw data cannot be read, so no spatial index can be
    /// built over it. Callers are expected to fall back to a coarser
    /// proxy volume.
    #[error("mesh '{name}' has no queryable collision data")]
    NotQueryable {
        /// Display name of the rejected mesh
        name: String,
    },

    /// The index buffer does not describe whole triangles.
    #[error("index buffer length {index_count} is not a multiple of 3")]
    InvalidTopology {
        /// Number of entries in the offending index buffer
        index_count: usize,
    },

    /// An index buffer entry points past the end of the vertex buffer.
    #[error("vertex index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        /// The offending index value
        index: u32,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },
}

/// Stable identity of a collision mesh, usable as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

impl MeshId {
    fn next() -> Self {
        Self(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Lightweight handle to one triangle of a mesh: the starting offset of
/// its three entries in the flat index buffer.
pub type TriangleRef = u32;

/// An immutable triangle mesh used for contact queries.
///
/// Vertices are stored in the mesh's local space; world placement is the
/// caller's concern. The mesh must outlive any spatial index built over
/// it, which sharing via `Arc` guarantees.
#[derive(Debug, Clone)]
pub struct CollisionMesh {
    id: MeshId,
    name: String,
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    queryable: bool,
}

impl CollisionMesh {
    /// Create a mesh from local-space vertices and a flat triangle index
    /// buffer, validating topology and index bounds up front.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        indices: Vec<u32>,
    ) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::InvalidTopology {
                index_count: indices.len(),
            });
        }
        for &index in &indices {
            if index as usize >= vertices.len() {
                return Err(MeshError::IndexOutOfBounds {
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }
        Ok(Self {
            id: MeshId::next(),
            name: name.into(),
            vertices,
            indices,
            queryable: true,
        })
    }

    /// Mark the mesh's raw data as unavailable for indexing.
    ///
    /// Models an asset whose buffers are neither readable nor cacheable;
    /// index builds against it fail with [`MeshError::NotQueryable`].
    #[must_use]
    pub fn with_queryable(mut self, queryable: bool) -> Self {
        self.queryable = queryable;
        self
    }

    /// Stable identity of this mesh
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Display name (diagnostic only)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the mesh data can back a spatial index
    pub fn is_queryable(&self) -> bool {
        self.queryable
    }

    /// Local-space vertex positions
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Flat triangle index buffer (stride 3)
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Materialize the triangle starting at `tri` in the index buffer.
    pub fn triangle(&self, tri: TriangleRef) -> Triangle {
        let base = tri as usize;
        Triangle::new(
            self.vertices[self.indices[base] as usize],
            self.vertices[self.indices[base + 1] as usize],
            self.vertices[self.indices[base + 2] as usize],
        )
    }

    /// Bounding box of the triangle starting at `tri`.
    pub fn triangle_bounds(&self, tri: TriangleRef) -> Aabb {
        self.triangle(tri).aabb()
    }

    /// Bounding box of the whole mesh, computed from the vertex buffer.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }
}
