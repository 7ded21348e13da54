//! Closest-point dispatch over collision shapes
//!
//! Nearest-point and nearest-pair queries keyed by shape kind. Sphere,
//! box, and capsule cases are closed-form; mesh cases route through the
//! [`MeshIndexCache`] and run in the mesh's local space, with this layer
//! doing the world/local conversion on both sides of the query.
//!
//! Segment-vs-mesh has no closed form. The baseline routine samples the
//! segment at a fixed step of half the query radius and keeps the best
//! pair found, so its accuracy is bounded by the step size relative to
//! local mesh curvature. [`closest_points_swept`] first attempts an
//! exact pass over every triangle in the swept volume and only falls
//! back to sampling when that volume comes up empty.

use super::mesh::MeshError;
use super::primitives::{
    closest_point_on_segment, closest_points_segment_segment, closest_points_segment_triangle,
    Aabb,
};
use super::shape::CollisionShape;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::spatial::{MeshIndexCache, TriangleOctree};

/// Floor on the segment sampling step, so a tiny query radius cannot
/// degenerate into millions of samples.
const MIN_SAMPLE_STEP: f32 = 1e-3;

/// Rounds of alternating projection for shape pairs with no closed form.
const PAIR_REFINEMENT_ROUNDS: usize = 4;

/// Nearest point on a shape's surface to an arbitrary point.
///
/// A query point inside a primitive projects outward to the nearest
/// surface point. Only mesh shapes can fail (unusable mesh data), and
/// only a mesh with zero triangles yields `Ok(None)`.
pub fn closest_point_on_shape(
    point: Vec3,
    shape: &CollisionShape,
    cache: &mut MeshIndexCache,
) -> Result<Option<Vec3>, MeshError> {
    match shape {
        CollisionShape::Sphere { center, radius } => {
            Ok(Some(offset_to_surface(*center, *radius, point, Vec3::zeros())))
        }
        CollisionShape::Box {
            center,
            half_extents,
            rotation,
        } => Ok(Some(box_surface_point(point, *center, *half_extents, rotation))),
        CollisionShape::Capsule { .. } | CollisionShape::CharacterCapsule { .. } => {
            let (start, end, radius) = shape.capsule_axis().expect("capsule variant");
            let (on_axis, _) = closest_point_on_segment(start, end, point);
            Ok(Some(offset_to_surface(on_axis, radius, point, end - start)))
        }
        CollisionShape::Mesh { mesh, transform } => {
            let index = cache.get_or_build(mesh)?;
            let local = transform.inverse_transform_point(point);
            Ok(index
                .closest_point(local)
                .map(|closest| transform.transform_point(closest)))
        }
    }
}

/// Nearest pair of points between a line segment and a shape, returned
/// as `(point on segment, point on shape)`.
///
/// `radius` bounds the search for mesh shapes: the segment is sampled at
/// half that radius and each sample queries the index sphere-bounded.
/// It is interpreted in mesh-local units and ignored for primitives.
pub fn closest_points_segment_shape(
    segment_start: Vec3,
    segment_end: Vec3,
    shape: &CollisionShape,
    radius: f32,
    cache: &mut MeshIndexCache,
) -> Result<Option<(Vec3, Vec3)>, MeshError> {
    if let Some((axis_start, axis_end, axis_radius)) = round_axis(shape) {
        let (on_segment, on_axis) =
            closest_points_segment_segment(segment_start, segment_end, axis_start, axis_end);
        let on_shape =
            offset_to_surface(on_axis, axis_radius, on_segment, axis_end - axis_start);
        return Ok(Some((on_segment, on_shape)));
    }

    match shape {
        CollisionShape::Box {
            center,
            half_extents,
            rotation,
        } => Ok(Some(closest_points_segment_box(
            segment_start,
            segment_end,
            *center,
            *half_extents,
            rotation,
        ))),
        CollisionShape::Mesh { mesh, transform } => {
            let index = cache.get_or_build(mesh)?;
            Ok(closest_points_segment_mesh_sampled(
                segment_start,
                segment_end,
                radius,
                &index,
                transform,
            ))
        }
        // Round shapes were handled above.
        _ => unreachable!("round shapes handled by the axis path"),
    }
}

/// Segment-vs-shape nearest pair along a known movement segment.
///
/// For mesh shapes this first sweeps exactly: every triangle inside the
/// sphere enclosing the swept volume is tested with the exact
/// segment-triangle routine. Only when the sweep volume contains no
/// triangles does it fall back to the sampled path. Non-mesh shapes
/// route to [`closest_points_segment_shape`].
pub fn closest_points_swept(
    segment_start: Vec3,
    segment_end: Vec3,
    shape: &CollisionShape,
    radius: f32,
    cache: &mut MeshIndexCache,
) -> Result<Option<(Vec3, Vec3)>, MeshError> {
    let CollisionShape::Mesh { mesh, transform } = shape else {
        return closest_points_segment_shape(segment_start, segment_end, shape, radius, cache);
    };

    let index = cache.get_or_build(mesh)?;
    let local_start = transform.inverse_transform_point(segment_start);
    let local_end = transform.inverse_transform_point(segment_end);
    let midpoint = (local_start + local_end) * 0.5;
    let sweep_radius = (local_end - local_start).magnitude() * 0.5 + radius;

    let candidates = index.triangles_within(midpoint, sweep_radius);
    if candidates.is_empty() {
        return Ok(closest_points_segment_mesh_sampled(
            segment_start,
            segment_end,
            radius,
            &index,
            transform,
        ));
    }

    let mut best: Option<(Vec3, Vec3)> = None;
    let mut best_distance_sq = f32::MAX;
    for tri in candidates {
        let triangle = index.mesh().triangle(tri);
        let (on_segment, on_triangle) =
            closest_points_segment_triangle(local_start, local_end, &triangle);
        let distance_sq = (on_triangle - on_segment).magnitude_squared();
        if distance_sq < best_distance_sq {
            best_distance_sq = distance_sq;
            best = Some((on_segment, on_triangle));
        }
    }

    Ok(best.map(|(on_segment, on_mesh)| {
        (
            transform.transform_point(on_segment),
            transform.transform_point(on_mesh),
        )
    }))
}

/// Nearest pair of points between two shapes, returned in argument order.
///
/// Sphere and capsule pairs reduce exactly to segment-segment distance;
/// a round shape against a box reduces to the segment-box routine. The
/// remaining combinations (box-box and anything against a mesh) have no
/// closed form and are refined by alternating projection, which is exact
/// for convex pairs and a local approximation against concave meshes.
pub fn closest_points_between(
    shape_a: &CollisionShape,
    shape_b: &CollisionShape,
    cache: &mut MeshIndexCache,
) -> Result<Option<(Vec3, Vec3)>, MeshError> {
    let round_a = round_axis(shape_a);
    let round_b = round_axis(shape_b);

    if let (Some((a0, a1, ra)), Some((b0, b1, rb))) = (round_a, round_b) {
        let (on_a_axis, on_b_axis) = closest_points_segment_segment(a0, a1, b0, b1);
        let on_a = offset_to_surface(on_a_axis, ra, on_b_axis, a1 - a0);
        let on_b = offset_to_surface(on_b_axis, rb, on_a_axis, b1 - b0);
        return Ok(Some((on_a, on_b)));
    }

    if let (Some(axis), CollisionShape::Box { center, half_extents, rotation }) =
        (round_a, shape_b)
    {
        let (on_a, on_b) = pair_round_box(axis, *center, *half_extents, rotation);
        return Ok(Some((on_a, on_b)));
    }
    if let (CollisionShape::Box { center, half_extents, rotation }, Some(axis)) =
        (shape_a, round_b)
    {
        let (on_b, on_a) = pair_round_box(axis, *center, *half_extents, rotation);
        return Ok(Some((on_a, on_b)));
    }

    if let (Some((a0, a1, ra)), CollisionShape::Mesh { .. }) = (round_a, shape_b) {
        let Some((on_axis, on_mesh)) = closest_points_swept(a0, a1, shape_b, ra, cache)? else {
            return Ok(None);
        };
        let on_a = offset_to_surface(on_axis, ra, on_mesh, a1 - a0);
        return Ok(Some((on_a, on_mesh)));
    }
    if let (CollisionShape::Mesh { .. }, Some((b0, b1, rb))) = (shape_a, round_b) {
        let Some((on_axis, on_mesh)) = closest_points_swept(b0, b1, shape_a, rb, cache)? else {
            return Ok(None);
        };
        let on_b = offset_to_surface(on_axis, rb, on_mesh, b1 - b0);
        return Ok(Some((on_mesh, on_b)));
    }

    // Box-box and mesh-involved pairs: alternating projection between
    // the two solids, seeded from shape A's interior.
    let mut on_a = shape_a.reference_point();
    let Some(mut on_b) = solid_closest_point(on_a, shape_b, cache)? else {
        return Ok(None);
    };
    for _ in 0..PAIR_REFINEMENT_ROUNDS {
        let Some(next_a) = solid_closest_point(on_b, shape_a, cache)? else {
            return Ok(None);
        };
        on_a = next_a;
        let Some(next_b) = solid_closest_point(on_a, shape_b, cache)? else {
            return Ok(None);
        };
        on_b = next_b;
    }
    Ok(Some((on_a, on_b)))
}

/// Capsules and spheres share one description: a core segment plus a
/// radius (a sphere's segment has zero length).
fn round_axis(shape: &CollisionShape) -> Option<(Vec3, Vec3, f32)> {
    match *shape {
        CollisionShape::Sphere { center, radius } => Some((center, center, radius)),
        _ => shape.capsule_axis(),
    }
}

/// Nearest pair between a round shape's core and a box, both on surface.
fn pair_round_box(
    (axis_start, axis_end, radius): (Vec3, Vec3, f32),
    center: Vec3,
    half_extents: Vec3,
    rotation: &Quat,
) -> (Vec3, Vec3) {
    let (on_axis, on_box) =
        closest_points_segment_box(axis_start, axis_end, center, half_extents, rotation);
    let on_round = offset_to_surface(on_axis, radius, on_box, axis_end - axis_start);
    (on_round, on_box)
}

/// Closest point treating the shape as a solid: interior query points
/// stay where they are. Drives the alternating-projection pair path.
fn solid_closest_point(
    point: Vec3,
    shape: &CollisionShape,
    cache: &mut MeshIndexCache,
) -> Result<Option<Vec3>, MeshError> {
    match shape {
        CollisionShape::Sphere { center, radius } => {
            let offset = point - center;
            if offset.magnitude_squared() <= radius * radius {
                Ok(Some(point))
            } else {
                Ok(Some(center + offset.normalize() * *radius))
            }
        }
        CollisionShape::Box {
            center,
            half_extents,
            rotation,
        } => {
            let local = rotation.inverse() * (point - center);
            let clamped = Aabb::new(-half_extents, *half_extents).clamp_point(local);
            Ok(Some(center + rotation * clamped))
        }
        CollisionShape::Capsule { .. } | CollisionShape::CharacterCapsule { .. } => {
            let (start, end, radius) = shape.capsule_axis().expect("capsule variant");
            let (on_axis, _) = closest_point_on_segment(start, end, point);
            let offset = point - on_axis;
            if offset.magnitude_squared() <= radius * radius {
                Ok(Some(point))
            } else {
                Ok(Some(on_axis + offset.normalize() * radius))
            }
        }
        // A mesh is a surface, not a volume.
        CollisionShape::Mesh { .. } => closest_point_on_shape(point, shape, cache),
    }
}

/// Project from a core point out to the surface of a round shape, toward
/// `toward`. When the target coincides with the core point the direction
/// is arbitrary; any perpendicular of the core axis serves.
fn offset_to_surface(on_axis: Vec3, radius: f32, toward: Vec3, axis: Vec3) -> Vec3 {
    let offset = toward - on_axis;
    let distance_sq = offset.magnitude_squared();
    if distance_sq > 1e-12 {
        on_axis + offset * (radius / distance_sq.sqrt())
    } else {
        on_axis + perpendicular_to(axis) * radius
    }
}

/// Some unit vector perpendicular to `direction` (any will do); `+Y`
/// when the direction itself is degenerate.
fn perpendicular_to(direction: Vec3) -> Vec3 {
    let x = direction.x.abs();
    let y = direction.y.abs();
    let z = direction.z.abs();
    let basis = if x <= y && x <= z {
        Vec3::x()
    } else if y <= z {
        Vec3::y()
    } else {
        Vec3::z()
    };
    let perpendicular = direction.cross(&basis);
    if perpendicular.magnitude_squared() > f32::EPSILON {
        perpendicular.normalize()
    } else {
        Vec3::y()
    }
}

/// Nearest point on an oriented box's surface; interior points are
/// pushed out through the nearest face.
fn box_surface_point(point: Vec3, center: Vec3, half_extents: Vec3, rotation: &Quat) -> Vec3 {
    let local = rotation.inverse() * (point - center);
    let clamped = Aabb::new(-half_extents, half_extents).clamp_point(local);
    if (clamped - local).magnitude_squared() > 0.0 {
        return center + rotation * clamped;
    }

    // Inside: exit through the face with the smallest gap.
    let gaps = [
        half_extents.x - local.x.abs(),
        half_extents.y - local.y.abs(),
        half_extents.z - local.z.abs(),
    ];
    let mut axis = 0;
    if gaps[1] < gaps[axis] {
        axis = 1;
    }
    if gaps[2] < gaps[axis] {
        axis = 2;
    }
    let mut pushed = local;
    pushed[axis] = if local[axis] >= 0.0 {
        half_extents[axis]
    } else {
        -half_extents[axis]
    };
    center + rotation * pushed
}

/// Nearest pair between a segment and an oriented box, by clamping into
/// the box and re-projecting onto the segment until the pair settles.
fn closest_points_segment_box(
    segment_start: Vec3,
    segment_end: Vec3,
    center: Vec3,
    half_extents: Vec3,
    rotation: &Quat,
) -> (Vec3, Vec3) {
    let inverse = rotation.inverse();
    let local_start = inverse * (segment_start - center);
    let local_end = inverse * (segment_end - center);
    let bounds = Aabb::new(-half_extents, half_extents);

    let mut on_segment = (local_start + local_end) * 0.5;
    let mut on_box = bounds.clamp_point(on_segment);
    for _ in 0..PAIR_REFINEMENT_ROUNDS {
        on_segment = closest_point_on_segment(local_start, local_end, on_box).0;
        on_box = bounds.clamp_point(on_segment);
    }

    (center + rotation * on_segment, center + rotation * on_box)
}

/// Sampled segment-vs-mesh nearest pair, in world space.
///
/// Walks the segment at half the query radius, asking the index for the
/// closest surface point within `radius` of each sample.
fn closest_points_segment_mesh_sampled(
    segment_start: Vec3,
    segment_end: Vec3,
    radius: f32,
    index: &TriangleOctree,
    transform: &Transform,
) -> Option<(Vec3, Vec3)> {
    let local_start = transform.inverse_transform_point(segment_start);
    let local_end = transform.inverse_transform_point(segment_end);

    let step = (radius * 0.5).max(MIN_SAMPLE_STEP);
    let delta = local_end - local_start;
    let length = delta.magnitude();
    let direction = if length > f32::EPSILON {
        delta / length
    } else {
        Vec3::zeros()
    };

    let mut best: Option<(Vec3, Vec3, f32)> = None;
    let mut t = 0.0;
    loop {
        let sample = local_start + direction * t;
        if let Some(hit) = index.closest_point_within(sample, radius) {
            let distance_sq = (hit - sample).magnitude_squared();
            if best.is_none_or(|(_, _, best_sq)| distance_sq < best_sq) {
                best = Some((sample, hit, distance_sq));
            }
        }
        if t >= length {
            break;
        }
        t = (t + step).min(length);
    }

    best.map(|(on_segment, on_mesh, _)| {
        (
            transform.transform_point(on_segment),
            transform.transform_point(on_mesh),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::mesh::CollisionMesh;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    const EPSILON: f32 = 1e-4;

    /// 2x2 quad in the XZ plane at Y=0, two triangles.
    fn quad_shape(transform: Transform) -> CollisionShape {
        let mesh = CollisionMesh::new(
            "quad",
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 2.0),
                Vec3::new(0.0, 0.0, 2.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
        .expect("valid quad mesh");
        CollisionShape::mesh(Arc::new(mesh), transform)
    }

    #[test]
    fn test_sphere_closest_point() {
        let mut cache = MeshIndexCache::new();
        let sphere = CollisionShape::sphere(Vec3::zeros(), 2.0);
        let closest = closest_point_on_shape(Vec3::new(4.0, 0.0, 0.0), &sphere, &mut cache)
            .expect("primitive query")
            .expect("spheres always answer");
        assert_relative_eq!(closest, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);

        // Interior points project out to the surface.
        let from_inside = closest_point_on_shape(Vec3::new(0.5, 0.0, 0.0), &sphere, &mut cache)
            .expect("primitive query")
            .expect("spheres always answer");
        assert_relative_eq!(from_inside, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_box_closest_point() {
        let mut cache = MeshIndexCache::new();
        let shape = CollisionShape::oriented_box(
            Vec3::zeros(),
            Vec3::new(1.0, 2.0, 3.0),
            Quat::identity(),
        );
        let closest = closest_point_on_shape(Vec3::new(5.0, 0.5, 0.0), &shape, &mut cache)
            .expect("primitive query")
            .expect("boxes always answer");
        assert_relative_eq!(closest, Vec3::new(1.0, 0.5, 0.0), epsilon = EPSILON);

        // Inside: exits through the nearest face (X here).
        let from_inside = closest_point_on_shape(Vec3::new(0.5, 0.0, 0.0), &shape, &mut cache)
            .expect("primitive query")
            .expect("boxes always answer");
        assert_relative_eq!(from_inside, Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_rotated_box_closest_point() {
        let mut cache = MeshIndexCache::new();
        // Quarter turn about Y: the local X face now faces world -Z.
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        let shape =
            CollisionShape::oriented_box(Vec3::zeros(), Vec3::new(1.0, 1.0, 2.0), rotation);
        let closest = closest_point_on_shape(Vec3::new(0.0, 0.0, -5.0), &shape, &mut cache)
            .expect("primitive query")
            .expect("boxes always answer");
        assert_relative_eq!(closest, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_capsule_closest_point() {
        let mut cache = MeshIndexCache::new();
        let capsule =
            CollisionShape::capsule(Vec3::zeros(), Vec3::new(0.0, 4.0, 0.0), 1.0);
        let closest = closest_point_on_shape(Vec3::new(3.0, 2.0, 0.0), &capsule, &mut cache)
            .expect("primitive query")
            .expect("capsules always answer");
        assert_relative_eq!(closest, Vec3::new(1.0, 2.0, 0.0), epsilon = EPSILON);

        // Beyond an end: the cap sphere answers.
        let above = closest_point_on_shape(Vec3::new(0.0, 7.0, 0.0), &capsule, &mut cache)
            .expect("primitive query")
            .expect("capsules always answer");
        assert_relative_eq!(above, Vec3::new(0.0, 5.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_mesh_closest_point_respects_transform() {
        let mut cache = MeshIndexCache::new();
        let shape = quad_shape(Transform::from_position(Vec3::new(10.0, 5.0, 0.0)));
        let closest = closest_point_on_shape(Vec3::new(10.5, 7.0, 0.5), &shape, &mut cache)
            .expect("queryable mesh")
            .expect("quad has triangles");
        assert_relative_eq!(closest, Vec3::new(10.5, 5.0, 0.5), epsilon = EPSILON);
    }

    #[test]
    fn test_segment_vs_sphere() {
        let mut cache = MeshIndexCache::new();
        let sphere = CollisionShape::sphere(Vec3::new(0.0, 3.0, 0.0), 1.0);
        let (on_segment, on_shape) = closest_points_segment_shape(
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            &sphere,
            0.0,
            &mut cache,
        )
        .expect("primitive query")
        .expect("spheres always answer");
        assert_relative_eq!(on_segment, Vec3::new(0.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(on_shape, Vec3::new(0.0, 2.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_segment_vs_box() {
        let mut cache = MeshIndexCache::new();
        let shape = CollisionShape::oriented_box(
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
            Quat::identity(),
        );
        let (on_segment, on_shape) = closest_points_segment_shape(
            Vec3::new(-2.0, 3.0, 0.0),
            Vec3::new(2.0, 3.0, 0.0),
            &shape,
            0.0,
            &mut cache,
        )
        .expect("primitive query")
        .expect("boxes always answer");
        assert_relative_eq!(on_segment, Vec3::new(0.0, 3.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(on_shape, Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_segment_vs_mesh_sampled() {
        let mut cache = MeshIndexCache::new();
        let shape = quad_shape(Transform::identity());
        let (on_segment, on_mesh) = closest_points_segment_shape(
            Vec3::new(0.5, 1.0, 0.5),
            Vec3::new(1.5, 0.5, 1.5),
            &shape,
            1.0,
            &mut cache,
        )
        .expect("queryable mesh")
        .expect("segment passes over the quad");
        assert_relative_eq!(on_segment, Vec3::new(1.5, 0.5, 1.5), epsilon = EPSILON);
        assert_relative_eq!(on_mesh, Vec3::new(1.5, 0.0, 1.5), epsilon = EPSILON);
    }

    #[test]
    fn test_swept_no_worse_than_sampled() {
        let mut cache = MeshIndexCache::new();
        let shape = quad_shape(Transform::identity());
        let start = Vec3::new(0.3, 0.9, 0.4);
        let end = Vec3::new(1.7, 0.4, 1.6);

        let (sampled_segment, sampled_mesh) =
            closest_points_segment_shape(start, end, &shape, 1.0, &mut cache)
                .expect("queryable mesh")
                .expect("segment passes over the quad");
        let (swept_segment, swept_mesh) =
            closest_points_swept(start, end, &shape, 1.0, &mut cache)
                .expect("queryable mesh")
                .expect("sweep volume covers the quad");

        let sampled_distance = (sampled_mesh - sampled_segment).magnitude();
        let swept_distance = (swept_mesh - swept_segment).magnitude();
        assert!(swept_distance <= sampled_distance + EPSILON);
        // The exact sweep finds the true minimum: the low end of the segment.
        assert_relative_eq!(swept_distance, 0.4, epsilon = EPSILON);
    }

    #[test]
    fn test_swept_falls_back_when_volume_is_empty() {
        let mut cache = MeshIndexCache::new();
        let shape = quad_shape(Transform::identity());
        // Far from the mesh with a tiny radius: the swept gather misses,
        // and the sampled fallback (clamped queries) still answers.
        let result = closest_points_swept(
            Vec3::new(50.0, 50.0, 50.0),
            Vec3::new(51.0, 50.0, 50.0),
            &shape,
            0.1,
            &mut cache,
        )
        .expect("queryable mesh");
        assert!(result.is_some());
    }

    #[test]
    fn test_pair_sphere_sphere() {
        let mut cache = MeshIndexCache::new();
        let first = CollisionShape::sphere(Vec3::zeros(), 1.0);
        let second = CollisionShape::sphere(Vec3::new(4.0, 0.0, 0.0), 1.0);
        let (on_a, on_b) = closest_points_between(&first, &second, &mut cache)
            .expect("primitive query")
            .expect("spheres always answer");
        assert_relative_eq!(on_a, Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(on_b, Vec3::new(3.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_pair_capsule_capsule_parallel() {
        let mut cache = MeshIndexCache::new();
        let first =
            CollisionShape::capsule(Vec3::zeros(), Vec3::new(0.0, 2.0, 0.0), 0.5);
        let second = CollisionShape::capsule(
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(3.0, 2.0, 0.0),
            0.5,
        );
        let (on_a, on_b) = closest_points_between(&first, &second, &mut cache)
            .expect("primitive query")
            .expect("capsules always answer");
        assert_relative_eq!(on_a.x, 0.5, epsilon = EPSILON);
        assert_relative_eq!(on_b.x, 2.5, epsilon = EPSILON);
        assert_relative_eq!((on_b - on_a).magnitude(), 2.0, epsilon = EPSILON);
    }

    #[test]
    fn test_pair_sphere_box() {
        let mut cache = MeshIndexCache::new();
        let sphere = CollisionShape::sphere(Vec3::new(3.0, 0.0, 0.0), 1.0);
        let shape = CollisionShape::oriented_box(
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
            Quat::identity(),
        );
        let (on_sphere, on_box) = closest_points_between(&sphere, &shape, &mut cache)
            .expect("primitive query")
            .expect("primitives always answer");
        assert_relative_eq!(on_sphere, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(on_box, Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);

        // Argument order is preserved when the box comes first.
        let (first, second) = closest_points_between(&shape, &sphere, &mut cache)
            .expect("primitive query")
            .expect("primitives always answer");
        assert_relative_eq!(first, on_box, epsilon = EPSILON);
        assert_relative_eq!(second, on_sphere, epsilon = EPSILON);
    }

    #[test]
    fn test_pair_box_box_converges() {
        let mut cache = MeshIndexCache::new();
        let first = CollisionShape::oriented_box(
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
            Quat::identity(),
        );
        let second = CollisionShape::oriented_box(
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Quat::identity(),
        );
        let (on_a, on_b) = closest_points_between(&first, &second, &mut cache)
            .expect("primitive query")
            .expect("boxes always answer");
        assert_relative_eq!(on_a, Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(on_b, Vec3::new(3.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_pair_sphere_mesh() {
        let mut cache = MeshIndexCache::new();
        let sphere = CollisionShape::sphere(Vec3::new(0.5, 2.0, 0.5), 0.5);
        let shape = quad_shape(Transform::identity());
        let (on_sphere, on_mesh) = closest_points_between(&sphere, &shape, &mut cache)
            .expect("queryable mesh")
            .expect("quad has triangles");
        assert_relative_eq!(on_mesh, Vec3::new(0.5, 0.0, 0.5), epsilon = EPSILON);
        assert_relative_eq!(on_sphere, Vec3::new(0.5, 1.5, 0.5), epsilon = EPSILON);
    }

    #[test]
    fn test_pair_with_empty_mesh_is_none() {
        let mut cache = MeshIndexCache::new();
        let empty = CollisionShape::mesh(
            Arc::new(CollisionMesh::new("empty", Vec::new(), Vec::new()).expect("empty mesh")),
            Transform::identity(),
        );
        let sphere = CollisionShape::sphere(Vec3::zeros(), 1.0);
        let result = closest_points_between(&sphere, &empty, &mut cache).expect("queryable mesh");
        assert!(result.is_none());
    }
}
