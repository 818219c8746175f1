//! Convex navigation polygon
//!
//! A polygon is a walkable convex region seen from above. Its vertices keep
//! their heights, but containment is decided on the XZ plane only; stacked
//! layers are told apart by the spatial index using the representative height.

use navmesh_common::{
    height_on_triangle, is_convex_2d, point_in_polygon_2d, poly_area_2d, Error, Result, Vec3,
};

use crate::graph::Connection;
use crate::spatial_index::Aabb;

/// Polygon in the navigation mesh
#[derive(Debug, Clone)]
pub struct Polygon {
    /// Identifier from the mesh source data
    id: u32,
    /// Dense index in the owning graph
    index: usize,
    /// Boundary vertices, counter-clockwise on the XZ plane
    vertices: Vec<Vec3>,
    /// Vertex centroid, used as the representative point
    center: Vec3,
    /// Bounds on the XZ plane
    bounds: Aabb,
    /// Multiplier applied to the cost of entering this polygon
    cost_factor: f32,
    /// Outgoing connections to neighbouring polygons
    pub(crate) connections: Vec<Connection>,
}

impl Polygon {
    /// Creates a free-standing polygon that is not part of any graph.
    ///
    /// No validation is performed; this is meant for area tests such as the
    /// ones built by [`crate::shapes`].
    pub fn new(id: u32, mut vertices: Vec<Vec3>) -> Self {
        if poly_area_2d(&vertices) < 0.0 {
            vertices.reverse();
        }
        Self::assemble(id, 0, vertices, 1.0)
    }

    /// Builds a graph polygon from source vertices, rejecting malformed input.
    pub(crate) fn from_source(
        id: u32,
        index: usize,
        mut vertices: Vec<Vec3>,
        cost_factor: f32,
        epsilon: f32,
    ) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::InvalidMesh(format!(
                "polygon {} has {} vertices, at least 3 are required",
                id,
                vertices.len()
            )));
        }

        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidMesh(format!(
                "polygon {} has a non-finite vertex",
                id
            )));
        }

        let area = poly_area_2d(&vertices);
        if area.abs() <= epsilon * epsilon {
            return Err(Error::InvalidMesh(format!(
                "polygon {} is degenerate (area {})",
                id, area
            )));
        }
        if area < 0.0 {
            vertices.reverse();
        }

        let bounds = Aabb::from_points(&vertices);
        let extent = (bounds.max[0] - bounds.min[0]).max(bounds.max[1] - bounds.min[1]);
        if !is_convex_2d(&vertices, epsilon * extent) {
            return Err(Error::InvalidMesh(format!("polygon {} is not convex", id)));
        }

        Ok(Self::assemble(id, index, vertices, cost_factor))
    }

    fn assemble(id: u32, index: usize, vertices: Vec<Vec3>, cost_factor: f32) -> Self {
        let center = if vertices.is_empty() {
            Vec3::ZERO
        } else {
            vertices.iter().copied().sum::<Vec3>() / vertices.len() as f32
        };
        let bounds = Aabb::from_points(&vertices);

        Self {
            id,
            index,
            vertices,
            center,
            bounds,
            cost_factor,
            connections: Vec::new(),
        }
    }

    /// Identifier from the mesh source data
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Dense index of the polygon in its graph
    pub fn index(&self) -> usize {
        self.index
    }

    /// Boundary vertices, counter-clockwise on the XZ plane
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Representative point (vertex centroid)
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Representative height
    pub fn height(&self) -> f32 {
        self.center.y
    }

    /// Bounds on the XZ plane
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn cost_factor(&self) -> f32 {
        self.cost_factor
    }

    /// Connections leaving this polygon
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Area on the XZ plane
    pub fn area(&self) -> f32 {
        poly_area_2d(&self.vertices).abs()
    }

    pub fn is_convex(&self) -> bool {
        is_convex_2d(&self.vertices, 1e-6)
    }

    /// Checks whether the XZ projection of `point` lies inside the polygon.
    ///
    /// Points on the boundary are inside. Height is ignored.
    pub fn is_inner_point(&self, point: &Vec3) -> bool {
        self.bounds.contains_point(point.x, point.z) && point_in_polygon_2d(point, &self.vertices)
    }

    /// Same as [`Polygon::is_inner_point`] for a bare XZ position
    pub fn contains_2d(&self, x: f32, z: f32) -> bool {
        self.is_inner_point(&Vec3::new(x, 0.0, z))
    }

    /// Height of the polygon surface at the given XZ position.
    ///
    /// The surface is the triangle fan around the first vertex. Positions
    /// outside the polygon get the representative height.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        if self.vertices.len() < 3 {
            return self.center.y;
        }

        let p = Vec3::new(x, 0.0, z);
        let a = &self.vertices[0];
        for i in 1..self.vertices.len() - 1 {
            let b = &self.vertices[i];
            let c = &self.vertices[i + 1];
            if point_in_polygon_2d(&p, &[*a, *b, *c]) {
                if let Some(h) = height_on_triangle(&p, a, b, c) {
                    return h;
                }
            }
        }
        self.center.y
    }
}
