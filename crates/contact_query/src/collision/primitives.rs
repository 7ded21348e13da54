//! Primitive collision geometry and closest-point algorithms
//!
//! Provides the axis-aligned bounding box, triangle, and line-segment
//! math that the spatial index and shape dispatch are built on. The
//! triangle routine runs in the innermost loop of every mesh query and
//! never allocates.

use crate::foundation::math::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing all of `points`; a degenerate box at the
    /// origin when `points` is empty.
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::new(Vec3::zeros(), Vec3::zeros());
        };
        let mut min = *first;
        let mut max = *first;
        for point in &points[1..] {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            min.z = min.z.min(point.z);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
            max.z = max.z.max(point.z);
        }
        Self { min, max }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent of the longest axis.
    pub fn largest_dimension(&self) -> f32 {
        let size = self.max - self.min;
        size.x.max(size.y).max(size.z)
    }

    /// Containment test with a tolerance band so points sitting exactly on
    /// a face still count as inside.
    pub fn contains_point(&self, point: Vec3, epsilon: f32) -> bool {
        point.x >= self.min.x - epsilon
            && point.x <= self.max.x + epsilon
            && point.y >= self.min.y - epsilon
            && point.y <= self.max.y + epsilon
            && point.z >= self.min.z - epsilon
            && point.z <= self.max.z + epsilon
    }

    /// Overlap test with a tolerance band: touching boxes overlap.
    ///
    /// Mesh seams lie exactly on cell boundaries, so treating contact as
    /// overlap keeps boundary triangles from falling between cells.
    pub fn overlaps(&self, other: &Aabb, epsilon: f32) -> bool {
        self.min.x <= other.max.x + epsilon
            && self.max.x >= other.min.x - epsilon
            && self.min.y <= other.max.y + epsilon
            && self.max.y >= other.min.y - epsilon
            && self.min.z <= other.max.z + epsilon
            && self.max.z >= other.min.z - epsilon
    }

    /// Clamp a point component-wise into the box.
    pub fn clamp_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// True if the sphere around `center` touches the box.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = self.clamp_point(center);
        (closest - center).magnitude_squared() <= radius * radius
    }
}

/// A triangle in 3D space.
///
/// Vertex order carries no meaning for closest-point queries.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// First vertex
    pub a: Vec3,
    /// Second vertex
    pub b: Vec3,
    /// Third vertex
    pub c: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Bounding box of the three vertices.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&[self.a, self.b, self.c])
    }

    /// Closest point on the (filled) triangle to `point`.
    ///
    /// Voronoi-region classification from "Real-Time Collision Detection"
    /// (Ericson, section 5.1.5): sign tests on dot products decide whether
    /// the closest point lies at a vertex, projects onto an edge, or falls
    /// inside the face. Explicit case analysis instead of an iterative
    /// barycentric solve, which keeps it fast and numerically stable.
    /// Degenerate triangles are not special-cased.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let ab = self.b - self.a;
        let ac = self.c - self.a;

        // Vertex region A
        let ap = point - self.a;
        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.a;
        }

        // Vertex region B
        let bp = point - self.b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return self.b;
        }

        // Edge AB
        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let t = d1 / (d1 - d3);
            return self.a + ab * t;
        }

        // Vertex region C
        let cp = point - self.c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return self.c;
        }

        // Edge AC
        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let t = d2 / (d2 - d6);
            return self.a + ac * t;
        }

        // Edge BC
        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.b + (self.c - self.b) * t;
        }

        // Interior: perpendicular foot via barycentric weights
        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        self.a + ab * v + ac * w
    }
}

/// Closest point on segment `ab` to `point`, with the segment parameter.
pub fn closest_point_on_segment(a: Vec3, b: Vec3, point: Vec3) -> (Vec3, f32) {
    let ab = b - a;
    let length_sq = ab.magnitude_squared();
    if length_sq <= f32::EPSILON {
        return (a, 0.0);
    }
    let t = ((point - a).dot(&ab) / length_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Closest pair of points between segments `p1q1` and `p2q2`.
///
/// Ericson section 5.1.9, with both parameters clamped into their
/// segments. Degenerate (zero-length) segments collapse to point cases.
pub fn closest_points_segment_segment(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    const DEGENERATE: f32 = 1e-12;

    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.magnitude_squared();
    let e = d2.magnitude_squared();
    let f = d2.dot(&r);

    if a <= DEGENERATE && e <= DEGENERATE {
        return (p1, p2);
    }

    let s;
    let mut t;
    if a <= DEGENERATE {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(&r);
        if e <= DEGENERATE {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;

            // Parallel segments pick an arbitrary s; the t clamp below
            // still produces the true closest pair.
            let mut s_candidate = if denom > DEGENERATE {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };

            t = (b * s_candidate + f) / e;
            if t < 0.0 {
                t = 0.0;
                s_candidate = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s_candidate = ((b - c) / a).clamp(0.0, 1.0);
            }
            s = s_candidate;
        }
    }

    (p1 + d1 * s, p2 + d2 * t)
}

/// Closest pair of points between segment `ab` and a triangle.
///
/// If the segment crosses the triangle's plane inside the face, the pair
/// collapses to the crossing point. Otherwise the minimum is found among
/// the segment endpoints projected onto the face and the segment tested
/// against each triangle edge.
pub fn closest_points_segment_triangle(a: Vec3, b: Vec3, triangle: &Triangle) -> (Vec3, Vec3) {
    const TOUCH_SQ: f32 = 1e-10;

    let normal = (triangle.b - triangle.a).cross(&(triangle.c - triangle.a));
    let side_a = normal.dot(&(a - triangle.a));
    let side_b = normal.dot(&(b - triangle.a));
    if side_a * side_b < 0.0 {
        let t = side_a / (side_a - side_b);
        let crossing = a + (b - a) * t;
        let on_triangle = triangle.closest_point(crossing);
        if (on_triangle - crossing).magnitude_squared() <= TOUCH_SQ {
            return (crossing, on_triangle);
        }
    }

    let mut best_on_segment = a;
    let mut best_on_triangle = triangle.closest_point(a);
    let mut best_distance_sq = (best_on_triangle - a).magnitude_squared();

    let from_b = triangle.closest_point(b);
    let distance_sq = (from_b - b).magnitude_squared();
    if distance_sq < best_distance_sq {
        best_on_segment = b;
        best_on_triangle = from_b;
        best_distance_sq = distance_sq;
    }

    let edges = [
        (triangle.a, triangle.b),
        (triangle.b, triangle.c),
        (triangle.c, triangle.a),
    ];
    for (edge_start, edge_end) in edges {
        let (on_segment, on_edge) =
            closest_points_segment_segment(a, b, edge_start, edge_end);
        let distance_sq = (on_edge - on_segment).magnitude_squared();
        if distance_sq < best_distance_sq {
            best_on_segment = on_segment;
            best_on_triangle = on_edge;
            best_distance_sq = distance_sq;
        }
    }

    (best_on_segment, best_on_triangle)
}
