//! Collision shape descriptors
//!
//! Shapes the closest-point dispatch understands. Primitive shapes carry
//! their world placement directly; mesh shapes pair shared mesh data with
//! a world transform, since mesh queries run in the mesh's local space.

use std::sync::Arc;

use super::mesh::CollisionMesh;
use crate::foundation::math::{Quat, Transform, Vec3};

/// A shape that contact queries can be run against.
#[derive(Debug, Clone)]
pub enum CollisionShape {
    /// A sphere in world space
    Sphere {
        /// Center position
        center: Vec3,
        /// Sphere radius
        radius: f32,
    },

    /// An oriented box in world space
    Box {
        /// Center position
        center: Vec3,
        /// Half extent along each local axis
        half_extents: Vec3,
        /// World orientation
        rotation: Quat,
    },

    /// A capsule between two arbitrary endpoints
    Capsule {
        /// One end of the core segment
        start: Vec3,
        /// Other end of the core segment
        end: Vec3,
        /// Capsule radius
        radius: f32,
    },

    /// An upright capsule described the way character controllers are:
    /// foot position, total height, and radius, with a vertical axis.
    CharacterCapsule {
        /// Position of the capsule's lowest point
        base: Vec3,
        /// Total height from base to top
        height: f32,
        /// Capsule radius
        radius: f32,
    },

    /// A static triangle mesh placed in the world
    Mesh {
        /// Shared mesh data (local space)
        mesh: Arc<CollisionMesh>,
        /// Local-to-world placement of the mesh
        transform: Transform,
    },
}

impl CollisionShape {
    /// Creates a spherical shape
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere { center, radius }
    }

    /// Creates an oriented box shape
    pub fn oriented_box(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self::Box {
            center,
            half_extents,
            rotation,
        }
    }

    /// Creates a capsule between two endpoints
    pub fn capsule(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self::Capsule { start, end, radius }
    }

    /// Creates an upright character capsule from its foot position
    pub fn character_capsule(base: Vec3, height: f32, radius: f32) -> Self {
        Self::CharacterCapsule {
            base,
            height,
            radius,
        }
    }

    /// Creates a mesh shape from shared mesh data and its world placement
    pub fn mesh(mesh: Arc<CollisionMesh>, transform: Transform) -> Self {
        Self::Mesh { mesh, transform }
    }

    /// Core segment and radius of either capsule variant.
    ///
    /// A character capsule shorter than twice its radius degenerates to a
    /// sphere: both segment endpoints collapse to the center.
    pub(crate) fn capsule_axis(&self) -> Option<(Vec3, Vec3, f32)> {
        match *self {
            Self::Capsule { start, end, radius } => Some((start, end, radius)),
            Self::CharacterCapsule {
                base,
                height,
                radius,
            } => {
                let center = base + Vec3::y() * (height * 0.5);
                let half_segment = (height * 0.5 - radius).max(0.0);
                Some((
                    center - Vec3::y() * half_segment,
                    center + Vec3::y() * half_segment,
                    radius,
                ))
            }
            _ => None,
        }
    }

    /// A representative interior point, used to seed pair queries.
    pub(crate) fn reference_point(&self) -> Vec3 {
        match self {
            Self::Sphere { center, .. } | Self::Box { center, .. } => *center,
            Self::Capsule { start, end, .. } => (start + end) * 0.5,
            Self::CharacterCapsule { base, height, .. } => base + Vec3::y() * (height * 0.5),
            Self::Mesh { mesh, transform } => transform.transform_point(mesh.aabb().center()),
        }
    }
}
