//! Test mesh creation helpers
//!
//! Small hand-built meshes shared by the unit, scenario and concurrency tests.

use crate::mesh_data::{PolygonData, PolygonSource};
use crate::{NavMesh, NavMeshConfig};
use navmesh_common::{Result, Vec3};

/// Axis-aligned quad on the XZ plane at height `y`
pub fn quad(id: u32, x0: f32, z0: f32, x1: f32, z1: f32, y: f32) -> PolygonSource {
    PolygonSource::new(id, vec![[x0, y, z0], [x1, y, z0], [x1, y, z1], [x0, y, z1]])
}

/// Two unit squares sharing the edge `x = 1`
///
/// Polygon ids are 1 (`[0,1]x[0,1]`) and 2 (`[1,2]x[0,1]`).
pub fn two_squares() -> PolygonData {
    PolygonData::new(
        1,
        vec![
            quad(1, 0.0, 0.0, 1.0, 1.0, 0.0),
            quad(2, 1.0, 0.0, 2.0, 1.0, 0.0),
        ],
    )
}

/// Grid of `cols x rows` square cells of edge `size`
///
/// Cell `(x, z)` has id and index `z * cols + x`.
pub fn grid_mesh(cols: u32, rows: u32, size: f32) -> PolygonData {
    let mut polygons = Vec::new();
    for z in 0..rows {
        for x in 0..cols {
            let (x0, z0) = (x as f32 * size, z as f32 * size);
            polygons.push(quad(z * cols + x, x0, z0, x0 + size, z0 + size, 0.0));
        }
    }

    let mut data = PolygonData::new(7, polygons);
    data.width = cols as f32 * size;
    data.height = rows as f32 * size;
    data
}

/// L-shaped corridor: `[0,1]x[0,1]`, `[1,2]x[0,1]`, `[1,2]x[1,2]`
pub fn l_shape() -> PolygonData {
    PolygonData::new(
        2,
        vec![
            quad(0, 0.0, 0.0, 1.0, 1.0, 0.0),
            quad(1, 1.0, 0.0, 2.0, 1.0, 0.0),
            quad(2, 1.0, 1.0, 2.0, 2.0, 0.0),
        ],
    )
}

/// Two islands of two squares each, far apart
///
/// Island A holds ids 0 and 1 around `x in [0,2]`, island B holds ids 2 and 3
/// around `x in [10,12]`.
pub fn disconnected_mesh() -> PolygonData {
    PolygonData::new(
        3,
        vec![
            quad(0, 0.0, 0.0, 1.0, 1.0, 0.0),
            quad(1, 1.0, 0.0, 2.0, 1.0, 0.0),
            quad(2, 10.0, 0.0, 11.0, 1.0, 0.0),
            quad(3, 11.0, 0.0, 12.0, 1.0, 0.0),
        ],
    )
}

/// Two unconnected floors covering `[0,4]x[0,4]` at heights 0 and 10
pub fn stacked_mesh() -> PolygonData {
    let mut data = PolygonData::new(
        4,
        vec![
            quad(0, 0.0, 0.0, 4.0, 4.0, 0.0),
            quad(1, 0.0, 0.0, 4.0, 4.0, 10.0),
        ],
    );
    data.three_dimensional = true;
    data
}

/// Flat floor, ramp and upper floor along X, two units wide in Z
///
/// The ramp spans `x in [2,6]` and climbs from height 0 to 4.
pub fn ramp_mesh() -> PolygonData {
    let mut data = PolygonData::new(
        5,
        vec![
            quad(0, 0.0, 0.0, 2.0, 2.0, 0.0),
            PolygonSource::new(
                1,
                vec![
                    [2.0, 0.0, 0.0],
                    [6.0, 4.0, 0.0],
                    [6.0, 4.0, 2.0],
                    [2.0, 0.0, 2.0],
                ],
            ),
            quad(2, 6.0, 0.0, 8.0, 2.0, 4.0),
        ],
    );
    data.three_dimensional = true;
    data
}

pub fn build(data: &PolygonData) -> Result<NavMesh> {
    NavMesh::from_data(data, NavMeshConfig::default())
}

/// Deterministic pseudo-random point inside `[0,w]x[0,h]`
pub fn sample_point(rng: &mut fastrand::Rng, w: f32, h: f32) -> Vec3 {
    Vec3::new(rng.f32() * w, 0.0, rng.f32() * h)
}
