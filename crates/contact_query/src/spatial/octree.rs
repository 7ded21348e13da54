//! Triangle octree spatial index
//!
//! Divides a mesh's local space into a hierarchy of cubes for fast
//! closest-point queries. Leaves hold lightweight triangle references
//! into the mesh's index buffer; a leaf that fills past its capacity
//! splits into 8 octants and redistributes. A triangle whose bounding
//! box straddles a cell boundary is referenced from every cell it
//! touches, so queries near seams never miss it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::collision::mesh::{CollisionMesh, MeshError, TriangleRef};
use crate::collision::primitives::Aabb;
use crate::foundation::math::Vec3;

/// Configuration for octree construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OctreeConfig {
    /// Maximum triangle references per leaf before it splits
    pub max_triangles_per_node: usize,

    /// Minimum node size; a leaf this small holds any number of
    /// triangles rather than splitting further
    pub min_node_size: f32,

    /// Tolerance for box containment and overlap tests, so geometry
    /// sitting exactly on a cell boundary still registers
    pub epsilon: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_triangles_per_node: 20,
            min_node_size: 0.05,
            epsilon: 1e-5,
        }
    }
}

/// Body of an octree node.
///
/// A node is either a leaf holding triangle references or a branch
/// holding exactly 8 children, never both; the variant makes the
/// invariant structural and keeps small never-split meshes from paying
/// for an 8-pointer child array.
#[derive(Debug, Clone)]
enum NodeBody {
    Leaf(Vec<TriangleRef>),
    Branch(Box<[OctreeNode; 8]>),
}

/// A cubic node of the triangle octree.
#[derive(Debug, Clone)]
pub struct OctreeNode {
    center: Vec3,
    size: f32,
    body: NodeBody,
}

impl OctreeNode {
    fn new_leaf(center: Vec3, size: f32) -> Self {
        Self {
            center,
            size,
            body: NodeBody::Leaf(Vec::new()),
        }
    }

    /// Center of the node's cube
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Edge length of the node's cube (same extent on all axes)
    pub fn size(&self) -> f32 {
        self.size
    }

    /// The node's cube as an AABB.
    pub fn bounds(&self) -> Aabb {
        let half = Vec3::new(self.size, self.size, self.size) * 0.5;
        Aabb::new(self.center - half, self.center + half)
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        matches!(self.body, NodeBody::Leaf(_))
    }

    /// Total triangle references held in this subtree. A triangle
    /// straddling cell boundaries is counted once per leaf that holds it.
    pub fn triangle_ref_count(&self) -> usize {
        match &self.body {
            NodeBody::Leaf(refs) => refs.len(),
            NodeBody::Branch(children) => {
                children.iter().map(Self::triangle_ref_count).sum()
            }
        }
    }

    /// Cube containment test with tolerance.
    pub fn contains(&self, point: Vec3, epsilon: f32) -> bool {
        self.bounds().contains_point(point, epsilon)
    }

    /// True if the sphere of `radius` around `point` touches the cube.
    pub fn intersects_sphere(&self, point: Vec3, radius: f32) -> bool {
        self.bounds().intersects_sphere(point, radius)
    }

    /// Insert a triangle reference into every part of this subtree its
    /// bounding box overlaps.
    ///
    /// A full leaf above the minimum size splits first and redistributes
    /// what it held; at or below the minimum size it simply keeps
    /// growing, which bounds the recursion depth.
    fn insert(
        &mut self,
        tri: TriangleRef,
        tri_bounds: &Aabb,
        mesh: &CollisionMesh,
        config: &OctreeConfig,
    ) {
        if !self.bounds().overlaps(tri_bounds, config.epsilon) {
            return;
        }

        let should_split = match &self.body {
            NodeBody::Leaf(refs) => {
                refs.len() >= config.max_triangles_per_node && self.size > config.min_node_size
            }
            NodeBody::Branch(_) => false,
        };
        if should_split {
            self.split(mesh, config);
        }

        match &mut self.body {
            NodeBody::Leaf(refs) => refs.push(tri),
            NodeBody::Branch(children) => {
                for child in children.iter_mut() {
                    child.insert(tri, tri_bounds, mesh, config);
                }
            }
        }
    }

    /// Split a leaf into 8 half-size octants and redistribute its
    /// triangles into every child each one overlaps. Afterwards the node
    /// holds no triangles of its own.
    fn split(&mut self, mesh: &CollisionMesh, config: &OctreeConfig) {
        let refs = match std::mem::replace(&mut self.body, NodeBody::Leaf(Vec::new())) {
            NodeBody::Leaf(refs) => refs,
            branch @ NodeBody::Branch(_) => {
                self.body = branch;
                return;
            }
        };

        let child_size = self.size * 0.5;
        let offset = self.size * 0.25;
        let children = std::array::from_fn(|octant| {
            let child_center = self.center
                + Vec3::new(
                    if octant & 1 == 0 { -offset } else { offset },
                    if octant & 2 == 0 { -offset } else { offset },
                    if octant & 4 == 0 { -offset } else { offset },
                );
            Self::new_leaf(child_center, child_size)
        });
        self.body = NodeBody::Branch(Box::new(children));

        for tri in refs {
            let tri_bounds = mesh.triangle_bounds(tri);
            self.insert(tri, &tri_bounds, mesh, config);
        }
    }

    /// Closest point on the mesh surface within this subtree, or `None`
    /// when the query point lies outside the node's cube or the subtree
    /// holds no triangles.
    pub fn closest_point(
        &self,
        point: Vec3,
        mesh: &CollisionMesh,
        epsilon: f32,
    ) -> Option<Vec3> {
        self.closest_triangle_point(point, mesh, epsilon)
            .map(|(_, surface_point)| surface_point)
    }

    /// Like [`Self::closest_point`] but reporting which triangle the
    /// closest point lies on. Diagnostic variant used by tooling.
    pub fn closest_triangle(
        &self,
        point: Vec3,
        mesh: &CollisionMesh,
        epsilon: f32,
    ) -> Option<TriangleRef> {
        self.closest_triangle_point(point, mesh, epsilon)
            .map(|(tri, _)| tri)
    }

    fn closest_triangle_point(
        &self,
        point: Vec3,
        mesh: &CollisionMesh,
        epsilon: f32,
    ) -> Option<(TriangleRef, Vec3)> {
        if !self.contains(point, epsilon) {
            return None;
        }
        match &self.body {
            NodeBody::Leaf(refs) => best_over_refs(refs.iter().copied(), point, mesh),
            NodeBody::Branch(children) => {
                // Recurse into all 8; each child's own containment test
                // does the pruning. First best found wins ties.
                let mut best: Option<(TriangleRef, Vec3)> = None;
                let mut best_distance_sq = f32::MAX;
                for child in children.iter() {
                    if let Some((tri, candidate)) =
                        child.closest_triangle_point(point, mesh, epsilon)
                    {
                        let distance_sq = (candidate - point).magnitude_squared();
                        if distance_sq < best_distance_sq {
                            best_distance_sq = distance_sq;
                            best = Some((tri, candidate));
                        }
                    }
                }
                best
            }
        }
    }

    /// Closest point considering every leaf the query sphere touches.
    ///
    /// Gathers the deduplicated union of triangle references across all
    /// intersected leaves before evaluating, so a query point sitting
    /// near a cell edge can see past its own cell's boundary.
    pub fn closest_point_within(
        &self,
        point: Vec3,
        radius: f32,
        mesh: &CollisionMesh,
    ) -> Option<Vec3> {
        let mut refs = Vec::new();
        self.gather_sphere(point, radius, &mut refs);
        refs.sort_unstable();
        refs.dedup();
        best_over_refs(refs.into_iter(), point, mesh).map(|(_, surface_point)| surface_point)
    }

    /// Collect the triangle references of every leaf the sphere touches.
    fn gather_sphere(&self, point: Vec3, radius: f32, out: &mut Vec<TriangleRef>) {
        if !self.intersects_sphere(point, radius) {
            return;
        }
        match &self.body {
            NodeBody::Leaf(refs) => out.extend_from_slice(refs),
            NodeBody::Branch(children) => {
                for child in children.iter() {
                    child.gather_sphere(point, radius, out);
                }
            }
        }
    }

    /// Smallest node in this subtree containing `point`, or `None` when
    /// the point lies outside the node's cube. Diagnostic variant.
    pub fn closest_node(&self, point: Vec3, epsilon: f32) -> Option<&OctreeNode> {
        if !self.contains(point, epsilon) {
            return None;
        }
        if let NodeBody::Branch(children) = &self.body {
            for child in children.iter() {
                if let Some(node) = child.closest_node(point, epsilon) {
                    return Some(node);
                }
            }
        }
        Some(self)
    }
}

/// Scan triangle references linearly, keeping the closest surface point.
/// Ties resolve to the first reference encountered.
fn best_over_refs(
    refs: impl Iterator<Item = TriangleRef>,
    point: Vec3,
    mesh: &CollisionMesh,
) -> Option<(TriangleRef, Vec3)> {
    let mut best = None;
    let mut best_distance_sq = f32::MAX;
    for tri in refs {
        let candidate = mesh.triangle(tri).closest_point(point);
        let distance_sq = (candidate - point).magnitude_squared();
        if distance_sq < best_distance_sq {
            best_distance_sq = distance_sq;
            best = Some((tri, candidate));
        }
    }
    best
}

/// Spatial index over one mesh: a cubic root node sized to the mesh's
/// largest bounding-box dimension, built once and immutable thereafter.
#[derive(Debug, Clone)]
pub struct TriangleOctree {
    root: OctreeNode,
    mesh: Arc<CollisionMesh>,
    epsilon: f32,
}

impl TriangleOctree {
    /// Build the index by inserting every triangle of the mesh.
    ///
    /// The root cube takes the largest dimension of the mesh's bounding
    /// box; non-uniform meshes waste some volume, but subdivision stays
    /// uniform. Fails only when the mesh data is not queryable.
    pub fn build(mesh: Arc<CollisionMesh>, config: &OctreeConfig) -> Result<Self, MeshError> {
        if !mesh.is_queryable() {
            return Err(MeshError::NotQueryable {
                name: mesh.name().to_string(),
            });
        }

        let bounds = mesh.aabb();
        let size = bounds.largest_dimension().max(config.min_node_size);
        let mut root = OctreeNode::new_leaf(bounds.center(), size);

        let mut tri = 0u32;
        while (tri as usize) < mesh.indices().len() {
            let tri_bounds = mesh.triangle_bounds(tri);
            root.insert(tri, &tri_bounds, &mesh, config);
            tri += 3;
        }

        log::debug!(
            "built octree for mesh '{}': {} triangles, {} refs, root size {}",
            mesh.name(),
            mesh.triangle_count(),
            root.triangle_ref_count(),
            size,
        );

        Ok(Self {
            root,
            mesh,
            epsilon: config.epsilon,
        })
    }

    /// The mesh this index was built over
    pub fn mesh(&self) -> &Arc<CollisionMesh> {
        &self.mesh
    }

    /// Root node of the index, for tooling and diagnostics
    pub fn root(&self) -> &OctreeNode {
        &self.root
    }

    /// Closest point on the mesh surface to `point`.
    ///
    /// The query point is clamped component-wise into the root cube
    /// first, so off-mesh queries return the nearest on-mesh point
    /// instead of nothing. `None` only for a mesh with no triangles.
    pub fn closest_point(&self, point: Vec3) -> Option<Vec3> {
        let clamped = self.root.bounds().clamp_point(point);
        self.root.closest_point(clamped, &self.mesh, self.epsilon)
    }

    /// Closest point on the mesh surface, searching every leaf within
    /// `radius` of the (clamped) query point.
    pub fn closest_point_within(&self, point: Vec3, radius: f32) -> Option<Vec3> {
        let clamped = self.root.bounds().clamp_point(point);
        self.root.closest_point_within(clamped, radius, &self.mesh)
    }

    /// Deduplicated triangle references of every leaf within `radius` of
    /// `point`, in ascending order.
    pub fn triangles_within(&self, point: Vec3, radius: f32) -> Vec<TriangleRef> {
        let mut refs = Vec::new();
        self.root.gather_sphere(point, radius, &mut refs);
        refs.sort_unstable();
        refs.dedup();
        refs
    }

    /// Nearest triangle to `point`, unclamped. Diagnostic variant.
    pub fn closest_triangle(&self, point: Vec3) -> Option<TriangleRef> {
        self.root.closest_triangle(point, &self.mesh, self.epsilon)
    }

    /// Smallest node containing `point`, unclamped. Diagnostic variant.
    pub fn closest_node(&self, point: Vec3) -> Option<&OctreeNode> {
        self.root.closest_node(point, self.epsilon)
    }
}
