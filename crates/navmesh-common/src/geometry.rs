//! 2D geometry operations on the XZ plane
//!
//! Navigation polygons are walkable surfaces seen from above, so almost every
//! query projects onto the XZ plane (Y-up coordinate system) and treats Y as
//! height only.

use glam::Vec3;

/// Calculate twice the signed area of a triangle on the XZ plane.
///
/// The sign indicates the winding order:
/// - Positive: clockwise (x to the right, z up)
/// - Negative: counter-clockwise
/// - Zero: degenerate (collinear points)
///
/// This is the orientation test used by the funnel algorithm.
#[inline]
pub fn tri_area_2d(a: &Vec3, b: &Vec3, c: &Vec3) -> f32 {
    let abx = b.x - a.x;
    let abz = b.z - a.z;
    let acx = c.x - a.x;
    let acz = c.z - a.z;
    acx * abz - abx * acz
}

/// 2D perpendicular product (cross product magnitude on XZ plane).
#[inline]
pub fn perp_2d(x1: f32, z1: f32, x2: f32, z2: f32) -> f32 {
    x1 * z2 - z1 * x2
}

/// Calculate squared distance between two points on the XZ plane.
#[inline]
pub fn dist_sqr_2d(a: &Vec3, b: &Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    dx * dx + dz * dz
}

/// Calculate distance between two points on the XZ plane.
#[inline]
pub fn dist_2d(a: &Vec3, b: &Vec3) -> f32 {
    dist_sqr_2d(a, b).sqrt()
}

/// Checks if two positions coincide on the XZ plane
#[inline]
pub fn v_equal_2d(a: &Vec3, b: &Vec3) -> bool {
    dist_sqr_2d(a, b) < 1e-6 * 1e-6
}

/// Calculate the squared distance from a point to a line segment on the XZ plane.
pub fn dist_point_segment_sqr_2d(p: &Vec3, a: &Vec3, b: &Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    let px = p.x - a.x;
    let pz = p.z - a.z;

    let d = dx * dx + dz * dz;
    if d < f32::EPSILON {
        // Segment is a point
        return px * px + pz * pz;
    }

    let t = ((px * dx + pz * dz) / d).clamp(0.0, 1.0);
    let qx = a.x + t * dx - p.x;
    let qz = a.z + t * dz - p.z;
    qx * qx + qz * qz
}

/// Signed area of a polygon on the XZ plane.
///
/// Positive when the vertices wind counter-clockwise with x to the right and
/// z up, i.e. the opposite sign convention of [`tri_area_2d`].
pub fn poly_area_2d(verts: &[Vec3]) -> f32 {
    let n = verts.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let a = &verts[i];
        let b = &verts[(i + 1) % n];
        area += perp_2d(a.x, a.z, b.x, b.z);
    }
    area * 0.5
}

/// Checks that a counter-clockwise polygon is convex on the XZ plane.
///
/// Collinear vertices within `eps` are tolerated.
pub fn is_convex_2d(verts: &[Vec3], eps: f32) -> bool {
    let n = verts.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        let a = &verts[i];
        let b = &verts[(i + 1) % n];
        let c = &verts[(i + 2) % n];
        // A reflex corner turns clockwise, which is a positive area here
        if tri_area_2d(a, b, c) > eps {
            return false;
        }
    }
    true
}

/// Tests whether a point lies inside a polygon on the XZ plane.
///
/// Points on the boundary count as inside. Works for any simple polygon
/// regardless of winding.
pub fn point_in_polygon_2d(p: &Vec3, verts: &[Vec3]) -> bool {
    const EDGE_EPS_SQR: f32 = 1e-10;

    let n = verts.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = &verts[i];
        let vj = &verts[j];

        if dist_point_segment_sqr_2d(p, vj, vi) <= EDGE_EPS_SQR {
            return true;
        }

        if (vi.z > p.z) != (vj.z > p.z)
            && p.x < (vj.x - vi.x) * (p.z - vi.z) / (vj.z - vi.z) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Intersects the segment `a -> b` with the edge `p -> q` on the XZ plane.
///
/// Returns the parameter along `p -> q` (clamped to `[0, 1]`) where the
/// supporting lines cross, or `None` when they are parallel.
pub fn intersect_segment_edge_2d(a: &Vec3, b: &Vec3, p: &Vec3, q: &Vec3) -> Option<f32> {
    let d1x = b.x - a.x;
    let d1z = b.z - a.z;
    let d2x = q.x - p.x;
    let d2z = q.z - p.z;

    let denom = perp_2d(d2x, d2z, d1x, d1z);
    if denom.abs() < 1e-8 {
        return None;
    }

    let t = perp_2d(a.x - p.x, a.z - p.z, d1x, d1z) / denom;
    Some(t.clamp(0.0, 1.0))
}

/// Height on the plane through a triangle at the given XZ position.
///
/// Returns `None` for triangles that are degenerate on the XZ plane.
pub fn height_on_triangle(p: &Vec3, a: &Vec3, b: &Vec3, c: &Vec3) -> Option<f32> {
    let v0x = c.x - a.x;
    let v0z = c.z - a.z;
    let v1x = b.x - a.x;
    let v1z = b.z - a.z;
    let v2x = p.x - a.x;
    let v2z = p.z - a.z;

    let denom = v0x * v1z - v0z * v1x;
    if denom.abs() < 1e-12 {
        return None;
    }

    let u = (v2x * v1z - v2z * v1x) / denom;
    let v = (v0x * v2z - v0z * v2x) / denom;
    Some(a.y + (c.y - a.y) * u + (b.y - a.y) * v)
}
