//! Area shapes around an agent
//!
//! Builders for free-standing polygons used in area-of-effect tests: a
//! rectangle or a sector in front of an agent, or a regular polygon around a
//! point. Angles are in degrees, positive turning from +Z towards +X when seen
//! from above. The resulting polygons have id `0` and belong to no graph.

use glam::Quat;
use navmesh_common::Vec3;

use crate::polygon::Polygon;

/// Facing direction flattened onto the XZ plane, +Z when degenerate
fn flat_direction(direction: &Vec3) -> Vec3 {
    let flat = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
    if flat == Vec3::ZERO {
        Vec3::Z
    } else {
        flat
    }
}

/// Moves `origin` by `distance` along `direction` turned by `degrees`
fn translate(origin: Vec3, direction: Vec3, degrees: f32, distance: f32) -> Vec3 {
    origin + Quat::from_rotation_y(degrees.to_radians()) * direction * distance
}

/// Rectangle `width` wide and `length` long, starting `distance` ahead of
/// `position` and extending along `direction`
pub fn rectangle(position: Vec3, direction: Vec3, distance: f32, width: f32, length: f32) -> Polygon {
    let dir = flat_direction(&direction);
    let source = translate(position, dir, 0.0, distance);

    let corner_1 = translate(source, dir, -90.0, width / 2.0);
    let corner_2 = translate(source, dir, 90.0, width / 2.0);
    let corner_3 = translate(corner_2, dir, 0.0, length);
    let corner_4 = translate(corner_1, dir, 0.0, length);

    Polygon::new(0, vec![corner_1, corner_4, corner_3, corner_2])
}

/// Circular sector of `radius` and opening `degrees`, with its apex
/// `distance` ahead of `position`
///
/// The arc is approximated with a vertex every ten degrees.
pub fn sector(position: Vec3, direction: Vec3, distance: f32, radius: f32, degrees: f32) -> Polygon {
    let dir = flat_direction(&direction);
    let source = translate(position, dir, 0.0, distance);

    let mut vertices = vec![source, translate(source, dir, -degrees / 2.0, radius)];
    let size = ((degrees / 10.0) as i32) / 2 - 1;
    for i in -size..=size {
        vertices.push(translate(source, dir, i as f32 * 10.0, radius));
    }
    vertices.push(translate(source, dir, degrees / 2.0, radius));

    Polygon::new(0, vertices)
}

/// Regular polygon with `vertex_count` corners on a circle of `radius`.
///
/// Fewer than three corners are raised to three.
pub fn regular_polygon(center: Vec3, radius: f32, vertex_count: usize) -> Polygon {
    let count = vertex_count.max(3);
    let step = 360.0 / count as f32;

    let vertices = (0..count)
        .map(|i| {
            let angle = (i as f32 * step).to_radians();
            center + Vec3::new(angle.cos(), 0.0, angle.sin()) * radius
        })
        .collect();

    Polygon::new(0, vertices)
}
