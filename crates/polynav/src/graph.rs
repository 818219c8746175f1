//! Polygon adjacency graph
//!
//! The graph is built once from [`PolygonData`]. Vertices that lie within the
//! weld epsilon of each other are merged, and every edge shared by two
//! polygons turns into a pair of connections, one in each direction.

use std::collections::HashMap;

use navmesh_common::{Error, Result, Vec3};

use crate::config::{CostModel, NavMeshConfig};
use crate::funnel::Portal;
use crate::mesh_data::PolygonData;
use crate::path_finder::IndexedGraph;
use crate::polygon::Polygon;

/// Directed link between two adjacent polygons
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Index of the polygon the connection leaves
    pub from: usize,
    /// Index of the polygon the connection enters
    pub to: usize,
    /// Traversal cost, never negative
    pub cost: f32,
    /// Shared edge endpoint on the left of a traveller crossing `from -> to`
    pub left: Vec3,
    /// Shared edge endpoint on the right of a traveller crossing `from -> to`
    pub right: Vec3,
}

impl Connection {
    /// Shared edge as a funnel portal
    pub fn portal(&self) -> Portal {
        Portal::new(self.left, self.right)
    }
}

/// Hashed grid of epsilon-sized cells used to merge nearby vertices
struct VertexWelder {
    epsilon: f32,
    cells: HashMap<(i64, i64, i64), Vec<usize>>,
    points: Vec<Vec3>,
}

impl VertexWelder {
    fn new(epsilon: f32) -> Self {
        Self {
            epsilon,
            cells: HashMap::new(),
            points: Vec::new(),
        }
    }

    fn cell(&self, v: &Vec3) -> (i64, i64, i64) {
        (
            (v.x / self.epsilon).floor() as i64,
            (v.y / self.epsilon).floor() as i64,
            (v.z / self.epsilon).floor() as i64,
        )
    }

    /// Returns the id of the welded vertex for `v`, adding it when new
    fn weld(&mut self, v: Vec3) -> usize {
        let (cx, cy, cz) = self.cell(&v);
        let eps_sqr = self.epsilon * self.epsilon;

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(ids) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                        for &id in ids {
                            if self.points[id].distance_squared(v) <= eps_sqr {
                                return id;
                            }
                        }
                    }
                }
            }
        }

        let id = self.points.len();
        self.points.push(v);
        self.cells.entry((cx, cy, cz)).or_default().push(id);
        id
    }
}

/// Navigation graph over the polygons of one map
#[derive(Debug)]
pub struct PolygonGraph {
    map_id: u32,
    width: f32,
    height: f32,
    three_dimensional: bool,
    polygons: Vec<Polygon>,
    id_to_index: HashMap<u32, usize>,
    /// Distinct welded vertices
    all_points: Vec<Vec3>,
    /// Interior sample points bucketed by integer `(x, z)` cell
    random_points: HashMap<(i32, i32), Vec<Vec3>>,
    connection_count: usize,
    /// Lower bound of `cost / center distance` over all connections, capped at 1
    heuristic_scale: f32,
}

impl PolygonGraph {
    /// Builds the graph, rejecting malformed mesh data
    pub fn build(data: &PolygonData, config: &NavMeshConfig) -> Result<Self> {
        data.validate()?;
        config.validate()?;

        let mut polygons = Vec::with_capacity(data.polygons.len());
        let mut id_to_index = HashMap::with_capacity(data.polygons.len());
        for (index, source) in data.polygons.iter().enumerate() {
            let vertices = source
                .vertices
                .iter()
                .map(|v| Vec3::from_array(*v) * data.scale)
                .collect();
            let polygon = Polygon::from_source(
                source.id,
                index,
                vertices,
                source.cost_factor,
                config.edge_epsilon,
            )?;
            id_to_index.insert(source.id, index);
            polygons.push(polygon);
        }

        // Weld vertices and key every edge by its unordered welded vertex pair
        let mut welder = VertexWelder::new(config.edge_epsilon);
        let mut welded: Vec<Vec<usize>> = Vec::with_capacity(polygons.len());
        let mut edges: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
        for (p, polygon) in polygons.iter().enumerate() {
            let ids: Vec<usize> = polygon.vertices().iter().map(|v| welder.weld(*v)).collect();
            let n = ids.len();
            for i in 0..n {
                let (a, b) = (ids[i], ids[(i + 1) % n]);
                if a == b {
                    continue;
                }
                edges.entry((a.min(b), a.max(b))).or_default().push((p, i));
            }
            welded.push(ids);
        }

        let non_manifold = edges.values().filter(|shared| shared.len() > 2).count();
        if non_manifold > 0 {
            log::warn!(
                "Map {} has {} edges shared by more than two polygons, connecting every pair",
                data.map_id,
                non_manifold
            );
        }

        let mut connection_count = 0;
        for p in 0..polygons.len() {
            let ids = &welded[p];
            let n = ids.len();
            let mut connections: Vec<Connection> = Vec::new();

            for i in 0..n {
                let (a, b) = (ids[i], ids[(i + 1) % n]);
                let Some(shared) = edges.get(&(a.min(b), a.max(b))) else {
                    continue;
                };

                for &(q, _) in shared {
                    if q == p || connections.iter().any(|c| c.to == q) {
                        continue;
                    }

                    let from = &polygons[p];
                    let to = &polygons[q];
                    let base = match config.cost_model {
                        CostModel::CenterDistance => from.center().distance(to.center()),
                        CostModel::Uniform { cost } => cost,
                    };

                    // Counter-clockwise winding puts the next vertex on the left
                    connections.push(Connection {
                        from: p,
                        to: q,
                        cost: base * to.cost_factor(),
                        left: from.vertices()[(i + 1) % n],
                        right: from.vertices()[i],
                    });
                }
            }

            connection_count += connections.len();
            polygons[p].connections = connections;
        }

        let heuristic_scale = compute_heuristic_scale(&polygons);
        let random_points = build_random_points(&polygons, config.sample_step);

        log::info!(
            "Built polygon graph for map {}: {} polygons, {} connections, {} distinct vertices",
            data.map_id,
            polygons.len(),
            connection_count,
            welder.points.len()
        );

        Ok(Self {
            map_id: data.map_id,
            width: data.width,
            height: data.height,
            three_dimensional: data.three_dimensional,
            polygons,
            id_to_index,
            all_points: welder.points,
            random_points,
            connection_count,
            heuristic_scale,
        })
    }

    pub fn map_id(&self) -> u32 {
        self.map_id
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_three_dimensional(&self) -> bool {
        self.three_dimensional
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Polygon at a dense index.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range.
    pub fn polygon(&self, index: usize) -> &Polygon {
        &self.polygons[index]
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connection_count
    }

    /// Dense index of the polygon with the given source id
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.id_to_index.get(&id).copied()
    }

    pub fn polygon_by_id(&self, id: u32) -> Option<&Polygon> {
        self.index_of(id).map(|index| &self.polygons[index])
    }

    /// Distinct mesh vertices after welding
    pub fn all_points(&self) -> &[Vec3] {
        &self.all_points
    }

    pub(crate) fn random_points(&self) -> &HashMap<(i32, i32), Vec<Vec3>> {
        &self.random_points
    }

    pub fn heuristic_scale(&self) -> f32 {
        self.heuristic_scale
    }

    /// Checks that every connection has a reverse over the same edge
    pub fn check_symmetry(&self) -> Result<()> {
        for polygon in &self.polygons {
            for c in polygon.connections() {
                let back = self.polygons[c.to]
                    .connections()
                    .iter()
                    .find(|r| r.to == c.from)
                    .ok_or_else(|| {
                        Error::InvalidMesh(format!(
                            "connection {} -> {} has no reverse",
                            c.from, c.to
                        ))
                    })?;
                if back.left != c.right || back.right != c.left {
                    return Err(Error::InvalidMesh(format!(
                        "connection {} -> {} has a mismatched reverse edge",
                        c.from, c.to
                    )));
                }
            }
        }
        Ok(())
    }
}

impl IndexedGraph for PolygonGraph {
    fn node_count(&self) -> usize {
        self.polygons.len()
    }

    fn connections(&self, node: usize) -> &[Connection] {
        self.polygons[node].connections()
    }
}

fn compute_heuristic_scale(polygons: &[Polygon]) -> f32 {
    let mut scale: f32 = 1.0;
    for polygon in polygons {
        for c in polygon.connections() {
            let distance = polygon.center().distance(polygons[c.to].center());
            if distance > f32::EPSILON {
                scale = scale.min(c.cost / distance);
            }
        }
    }
    scale.max(0.0)
}

/// Samples the lattice of step `step` inside every polygon, plus its center
fn build_random_points(polygons: &[Polygon], step: f32) -> HashMap<(i32, i32), Vec<Vec3>> {
    let mut cells: HashMap<(i32, i32), Vec<Vec3>> = HashMap::new();
    let mut push = |p: Vec3| {
        cells
            .entry((p.x.floor() as i32, p.z.floor() as i32))
            .or_default()
            .push(p);
    };

    for polygon in polygons {
        push(polygon.center());

        let bounds = polygon.bounds();
        let mut x = (bounds.min[0] / step).ceil() * step;
        while x <= bounds.max[0] {
            let mut z = (bounds.min[1] / step).ceil() * step;
            while z <= bounds.max[1] {
                if polygon.contains_2d(x, z) {
                    push(Vec3::new(x, polygon.height_at(x, z), z));
                }
                z += step;
            }
            x += step;
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::PolygonSource;
    use crate::test_mesh_helpers::*;

    #[test]
    fn test_two_squares_share_one_edge() -> Result<()> {
        let graph = PolygonGraph::build(&two_squares(), &NavMeshConfig::default())?;

        assert_eq!(graph.polygon_count(), 2);
        assert_eq!(graph.connection_count(), 2);

        let ab = graph.polygon(0).connections()[0];
        assert_eq!(ab.to, 1);
        assert!((ab.cost - 1.0).abs() < 1e-6);
        // Travelling +X, the left endpoint is the one with the larger Z
        assert_eq!(ab.left, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(ab.right, Vec3::new(1.0, 0.0, 0.0));

        let ba = graph.polygon(1).connections()[0];
        assert_eq!(ba.left, ab.right);
        assert_eq!(ba.right, ab.left);
        Ok(())
    }

    #[test]
    fn test_connections_are_symmetric() -> Result<()> {
        let graph = PolygonGraph::build(&grid_mesh(6, 5, 1.0), &NavMeshConfig::default())?;

        graph.check_symmetry()?;
        for polygon in graph.polygons() {
            for c in polygon.connections() {
                assert!(c.cost >= 0.0);
                assert_eq!(c.from, polygon.index());
                let back = graph
                    .connections(c.to)
                    .iter()
                    .find(|r| r.to == c.from)
                    .map(|r| r.cost);
                assert_eq!(back, Some(c.cost));
            }
        }
        // Interior grid cells have four neighbours
        assert_eq!(graph.connections(7).len(), 4);
        assert_eq!(graph.connection_count(), 2 * (5 * 5 + 6 * 4));
        Ok(())
    }

    #[test]
    fn test_nearby_vertices_are_welded() -> Result<()> {
        let mut data = two_squares();
        data.polygons[1].vertices[0][0] += 0.0004;
        let graph = PolygonGraph::build(&data, &NavMeshConfig::default())?;

        assert_eq!(graph.connection_count(), 2);
        assert_eq!(graph.all_points().len(), 6);
        Ok(())
    }

    #[test]
    fn test_disconnected_regions_have_no_bridge() -> Result<()> {
        let graph = PolygonGraph::build(&disconnected_mesh(), &NavMeshConfig::default())?;

        assert_eq!(graph.connection_count(), 4);
        for polygon in graph.polygons() {
            for c in polygon.connections() {
                assert_eq!(c.from / 2, c.to / 2);
            }
        }
        Ok(())
    }

    #[test]
    fn test_non_manifold_edges_connect_every_pair() -> Result<()> {
        let mut data = two_squares();
        // A sloped fin hanging off the shared edge `x = 1`
        data.polygons.push(PolygonSource::new(
            3,
            vec![[1.0, 0.0, 0.0], [3.0, 2.0, 0.5], [1.0, 0.0, 1.0]],
        ));
        data.three_dimensional = true;

        let graph = PolygonGraph::build(&data, &NavMeshConfig::default())?;
        assert_eq!(graph.connections(0).len(), 2);
        assert_eq!(graph.connections(1).len(), 2);
        assert_eq!(graph.connections(2).len(), 2);
        assert_eq!(graph.connection_count(), 6);
        Ok(())
    }

    #[test]
    fn test_cost_models_and_factors() -> Result<()> {
        let mut data = two_squares();
        data.polygons[1].cost_factor = 3.0;

        let graph = PolygonGraph::build(&data, &NavMeshConfig::default())?;
        assert!((graph.connections(0)[0].cost - 3.0).abs() < 1e-6);
        assert!((graph.connections(1)[0].cost - 1.0).abs() < 1e-6);

        let config = NavMeshConfig {
            cost_model: CostModel::Uniform { cost: 0.5 },
            ..Default::default()
        };
        let graph = PolygonGraph::build(&data, &config)?;
        assert!((graph.connections(0)[0].cost - 1.5).abs() < 1e-6);
        assert!((graph.heuristic_scale() - 0.5).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_scale_and_id_lookup() -> Result<()> {
        let mut data = two_squares();
        data.scale = 2.0;
        let graph = PolygonGraph::build(&data, &NavMeshConfig::default())?;

        let b = graph.polygon_by_id(2).map(|p| p.center());
        assert_eq!(b, Some(Vec3::new(3.0, 0.0, 1.0)));
        assert_eq!(graph.index_of(1), Some(0));
        assert_eq!(graph.index_of(99), None);
        Ok(())
    }

    #[test]
    fn test_random_point_cache_covers_polygons() -> Result<()> {
        let graph = PolygonGraph::build(&grid_mesh(4, 4, 1.0), &NavMeshConfig::default())?;

        let cell = graph.random_points().get(&(1, 1)).cloned().unwrap_or_default();
        assert!(cell.contains(&Vec3::new(1.5, 0.0, 1.5)));
        assert!(cell.contains(&Vec3::new(1.0, 0.0, 1.0)));
        for points in graph.random_points().values() {
            for p in points {
                assert!(p.x >= 0.0 && p.x <= 4.0 && p.z >= 0.0 && p.z <= 4.0);
            }
        }
        Ok(())
    }

    #[test]
    fn test_malformed_polygon_fails_build() {
        let mut data = two_squares();
        data.polygons[1].vertices = vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]];
        assert!(matches!(
            PolygonGraph::build(&data, &NavMeshConfig::default()),
            Err(Error::InvalidMesh(_))
        ));
    }
}
