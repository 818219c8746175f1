//! Query facade over a built navigation mesh
//!
//! All mesh data is immutable once built and read without locking. The one
//! mutable piece, the A* scratch state, sits behind a mutex that is held only
//! while the search runs; corridor reduction happens outside it.

use std::path::Path;

use navmesh_common::{dist_2d, Result, Vec3};
use parking_lot::Mutex;

use crate::config::NavMeshConfig;
use crate::graph::PolygonGraph;
use crate::graph_path::GraphPath;
use crate::heuristic::PolygonHeuristic;
use crate::mesh_data::PolygonData;
use crate::path_finder::{IndexedAStarPathFinder, SearchMetrics};
use crate::point_path::PointPath;
use crate::polygon::Polygon;
use crate::spatial_index::SpatialIndex;
use crate::status::Status;

/// Navigation mesh for one map
#[derive(Debug)]
pub struct NavMesh {
    config: NavMeshConfig,
    graph: PolygonGraph,
    index: SpatialIndex,
    heuristic: PolygonHeuristic,
    path_finder: Mutex<IndexedAStarPathFinder>,
}

impl NavMesh {
    /// Builds a navigation mesh from source data
    pub fn from_data(data: &PolygonData, config: NavMeshConfig) -> Result<Self> {
        config.validate()?;

        let graph = PolygonGraph::build(data, &config)?;
        let height_tolerance = if graph.is_three_dimensional() {
            config.height_tolerance
        } else {
            None
        };
        let index = SpatialIndex::build(graph.polygons(), config.bvh_leaf_size, height_tolerance);
        let heuristic = PolygonHeuristic::for_graph(&graph);
        let path_finder =
            IndexedAStarPathFinder::new(graph.polygon_count(), config.max_search_nodes);

        Ok(Self {
            config,
            graph,
            index,
            heuristic,
            path_finder: Mutex::new(path_finder),
        })
    }

    /// Parses JSON mesh data and builds the mesh
    pub fn from_json_str(json: &str, config: NavMeshConfig) -> Result<Self> {
        Self::from_data(&PolygonData::from_json_str(json)?, config)
    }

    /// Loads JSON mesh data from a file and builds the mesh
    pub fn load_from_json<P: AsRef<Path>>(path: P, config: NavMeshConfig) -> Result<Self> {
        let path = path.as_ref();
        let data = PolygonData::load_from_json(path)?;
        log::info!("Loaded mesh data for map {} from {}", data.map_id, path.display());
        Self::from_data(&data, config)
    }

    pub fn config(&self) -> &NavMeshConfig {
        &self.config
    }

    pub fn graph(&self) -> &PolygonGraph {
        &self.graph
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn map_id(&self) -> u32 {
        self.graph.map_id()
    }

    pub fn width(&self) -> f32 {
        self.graph.width()
    }

    pub fn height(&self) -> f32 {
        self.graph.height()
    }

    pub fn is_three_dimensional(&self) -> bool {
        self.graph.is_three_dimensional()
    }

    /// Counters of the most recent search run by this mesh
    pub fn last_search_metrics(&self) -> SearchMetrics {
        self.path_finder.lock().metrics()
    }

    fn locate(&self, point: &Vec3) -> Option<usize> {
        self.index.locate(self.graph.polygons(), point)
    }

    /// Polygon containing `point`, if any
    pub fn get_polygon(&self, point: &Vec3) -> Option<&Polygon> {
        self.locate(point).map(|index| self.graph.polygon(index))
    }

    /// Checks whether `point` is on the walkable surface
    pub fn is_point_in_path(&self, point: &Vec3) -> bool {
        self.locate(point).is_some()
    }

    /// Lifts an XZ position onto the mesh surface.
    ///
    /// Where polygons are stacked, the first polygon in mesh order wins.
    pub fn get_point_in_path(&self, x: f32, z: f32) -> Option<Vec3> {
        let index = self.index.locate_2d(self.graph.polygons(), x, z)?;
        let polygon = self.graph.polygon(index);
        Some(Vec3::new(x, polygon.height_at(x, z), z))
    }

    /// Finds the polygon corridor between two points.
    ///
    /// `path` is cleared first. On success it holds the corridor together
    /// with the exact endpoints and start polygon.
    pub fn query_graph_path(&self, from: &Vec3, to: &Vec3, path: &mut GraphPath) -> Status {
        path.clear();
        path.start = *from;
        path.end = *to;

        let Some(start) = self.locate(from) else {
            log::info!(
                "Start point ({}, {}, {}) is not on map {}",
                from.x,
                from.y,
                from.z,
                self.map_id()
            );
            return Status::StartOffMesh;
        };
        path.start_polygon = Some(start);

        if !self.is_three_dimensional() && self.graph.polygon(start).is_inner_point(to) {
            return Status::SamePolygon;
        }

        let Some(end) = self.locate(to) else {
            log::warn!(
                "End point ({}, {}, {}) is not on map {}",
                to.x,
                to.y,
                to.z,
                self.map_id()
            );
            return Status::EndOffMesh;
        };

        if start == end {
            return Status::SamePolygon;
        }

        self.search(start, end, path)
    }

    /// Finds the polygon corridor between two points, see [`NavMesh::query_graph_path`]
    pub fn find_graph_path(&self, from: &Vec3, to: &Vec3, path: &mut GraphPath) -> bool {
        self.query_graph_path(from, to, path).is_success()
    }

    fn search(&self, start: usize, end: usize, path: &mut GraphPath) -> Status {
        let mut finder = self.path_finder.lock();
        if finder.search(&self.graph, start, end, &self.heuristic, path) {
            Status::Success
        } else if finder.metrics().limit_reached {
            Status::SearchLimitReached
        } else {
            log::debug!(
                "No corridor from polygon {} to polygon {} on map {}",
                self.graph.polygon(start).id(),
                self.graph.polygon(end).id(),
                self.map_id()
            );
            Status::Unreachable
        }
    }

    /// Finds waypoints between two points into a reusable buffer
    pub fn find_path_into(
        &self,
        from: &Vec3,
        to: &Vec3,
        want_height: bool,
        out: &mut PointPath,
    ) -> bool {
        let mut path = GraphPath::new();
        if !self.find_graph_path(from, to, &mut path) {
            out.clear();
            return false;
        }

        out.calculate_for_graph_path(&path, want_height);
        true
    }

    /// Finds string-pulled waypoints between two points
    pub fn find_path(&self, from: &Vec3, to: &Vec3) -> Option<Vec<Vec3>> {
        let mut out = PointPath::new();
        self.find_path_into(from, to, false, &mut out)
            .then(|| out.into_vec())
    }

    /// Finds waypoints that also follow the terrain height across every
    /// portal crossed
    pub fn find_3d_path(&self, from: &Vec3, to: &Vec3) -> Option<Vec<Vec3>> {
        let mut out = PointPath::new();
        self.find_path_into(from, to, true, &mut out)
            .then(|| out.into_vec())
    }

    /// Finds waypoints between two points whose polygons are already known
    /// by their source ids
    pub fn find_path_between_polygons(
        &self,
        from: &Vec3,
        to: &Vec3,
        from_polygon: u32,
        to_polygon: u32,
    ) -> Option<Vec<Vec3>> {
        let (Some(start), Some(end)) = (
            self.graph.index_of(from_polygon),
            self.graph.index_of(to_polygon),
        ) else {
            log::warn!(
                "Unknown polygon in path request {} -> {} on map {}",
                from_polygon,
                to_polygon,
                self.map_id()
            );
            return None;
        };

        let mut path = GraphPath::new();
        path.start = *from;
        path.end = *to;
        path.start_polygon = Some(start);

        if start != end && !self.search(start, end, &mut path).is_success() {
            return None;
        }

        let mut out = PointPath::new();
        out.calculate_for_graph_path(&path, false);
        Some(out.into_vec())
    }

    /// Cached sample points within `radius` of `center` and at least
    /// `min_distance` away from it, in cache order
    fn random_candidates(&self, center: &Vec3, radius: f32, min_distance: f32) -> Vec<Vec3> {
        let mut targets = Vec::new();
        if !(center.is_finite() && radius >= 0.0 && radius.is_finite()) {
            return targets;
        }

        let three_dimensional = self.is_three_dimensional();
        let precision = self.config.random_point_height_precision;
        let mut accept = |p: &Vec3| {
            if three_dimensional && (p.y - center.y).abs() > precision {
                return;
            }
            let distance = dist_2d(center, p);
            if distance <= radius && distance >= min_distance {
                targets.push(*p);
            }
        };

        let cache = self.graph.random_points();
        let cx = center.x.floor() as i64;
        let cz = center.z.floor() as i64;
        let offset = radius.ceil() as i64;
        let span = offset.saturating_mul(2).saturating_add(1) as u64;

        if span.saturating_mul(span) > cache.len() as u64 {
            // Cheaper to walk the whole cache than every cell of the square
            let mut cells: Vec<_> = cache
                .iter()
                .filter(|((x, z), _)| {
                    (*x as i64).abs_diff(cx) <= offset as u64
                        && (*z as i64).abs_diff(cz) <= offset as u64
                })
                .collect();
            cells.sort_unstable_by_key(|(key, _)| **key);
            for (_, points) in cells {
                points.iter().for_each(&mut accept);
            }
        } else {
            // Cell keys are i32, cells past that range hold nothing
            for x in cx.saturating_sub(offset)..=cx.saturating_add(offset) {
                let Ok(x) = i32::try_from(x) else { continue };
                for z in cz.saturating_sub(offset)..=cz.saturating_add(offset) {
                    let Ok(z) = i32::try_from(z) else { continue };
                    if let Some(points) = cache.get(&(x, z)) {
                        points.iter().for_each(&mut accept);
                    }
                }
            }
        }

        targets
    }

    /// All cached sample points in the ring around `center`, shuffled
    pub fn get_random_points_in_radius_with_rng(
        &self,
        center: &Vec3,
        radius: f32,
        min_distance: f32,
        rng: &mut fastrand::Rng,
    ) -> Vec<Vec3> {
        let mut targets = self.random_candidates(center, radius, min_distance);
        rng.shuffle(&mut targets);
        targets
    }

    pub fn get_random_points_in_radius(
        &self,
        center: &Vec3,
        radius: f32,
        min_distance: f32,
    ) -> Vec<Vec3> {
        self.get_random_points_in_radius_with_rng(
            center,
            radius,
            min_distance,
            &mut fastrand::Rng::new(),
        )
    }

    /// One random walkable point in the ring around `center`
    pub fn get_random_point_in_radius_with_rng(
        &self,
        center: &Vec3,
        radius: f32,
        min_distance: f32,
        rng: &mut fastrand::Rng,
    ) -> Option<Vec3> {
        let targets = self.random_candidates(center, radius, min_distance);
        if targets.is_empty() {
            log::debug!(
                "No random point within {} of ({}, {}, {}) on map {}",
                radius,
                center.x,
                center.y,
                center.z,
                self.map_id()
            );
            return None;
        }
        Some(targets[rng.usize(..targets.len())])
    }

    pub fn get_random_point_in_radius(
        &self,
        center: &Vec3,
        radius: f32,
        min_distance: f32,
    ) -> Option<Vec3> {
        self.get_random_point_in_radius_with_rng(
            center,
            radius,
            min_distance,
            &mut fastrand::Rng::new(),
        )
    }

    /// Up to `count` distinct random points within `radius` of `center`
    pub fn copy_random_points_in_radius_with_rng(
        &self,
        center: &Vec3,
        radius: f32,
        count: usize,
        rng: &mut fastrand::Rng,
    ) -> Vec<Vec3> {
        let mut targets = self.get_random_points_in_radius_with_rng(center, radius, 0.0, rng);
        targets.truncate(count);
        targets
    }

    pub fn copy_random_points_in_radius(
        &self,
        center: &Vec3,
        radius: f32,
        count: usize,
    ) -> Vec<Vec3> {
        self.copy_random_points_in_radius_with_rng(center, radius, count, &mut fastrand::Rng::new())
    }

    /// A random mesh vertex anywhere on the map
    pub fn get_random_point_in_map_with_rng(&self, rng: &mut fastrand::Rng) -> Vec3 {
        let points = self.graph.all_points();
        let i = rng.usize(..points.len().max(1));
        points.get(i).copied().unwrap_or_default()
    }

    pub fn get_random_point_in_map(&self) -> Vec3 {
        self.get_random_point_in_map_with_rng(&mut fastrand::Rng::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_mesh_helpers::*;
    use navmesh_common::Error;

    #[test]
    fn test_point_queries() -> Result<()> {
        let mesh = build(&two_squares())?;

        assert_eq!(mesh.get_polygon(&Vec3::new(0.5, 0.0, 0.5)).map(|p| p.id()), Some(1));
        assert_eq!(mesh.get_polygon(&Vec3::new(1.5, 0.0, 0.5)).map(|p| p.id()), Some(2));
        assert!(mesh.is_point_in_path(&Vec3::new(1.0, 0.0, 0.5)));
        assert!(!mesh.is_point_in_path(&Vec3::new(2.5, 0.0, 0.5)));
        assert_eq!(
            mesh.get_point_in_path(0.25, 0.75),
            Some(Vec3::new(0.25, 0.0, 0.75))
        );
        assert_eq!(mesh.get_point_in_path(-1.0, 0.5), None);
        Ok(())
    }

    #[test]
    fn test_point_in_path_follows_ramp() -> Result<()> {
        let mesh = build(&ramp_mesh())?;
        let p = mesh.get_point_in_path(4.0, 1.0);
        assert!(p.is_some_and(|p| (p.y - 2.0).abs() < 1e-5));
        Ok(())
    }

    #[test]
    fn test_query_status_values() -> Result<()> {
        let mesh = build(&disconnected_mesh())?;
        let mut path = GraphPath::new();

        let inside = Vec3::new(0.5, 0.0, 0.5);
        let off = Vec3::new(5.0, 0.0, 0.5);
        let island = Vec3::new(10.5, 0.0, 0.5);

        assert_eq!(mesh.query_graph_path(&off, &inside, &mut path), Status::StartOffMesh);
        assert_eq!(mesh.query_graph_path(&inside, &off, &mut path), Status::EndOffMesh);
        assert_eq!(mesh.query_graph_path(&inside, &island, &mut path), Status::Unreachable);
        assert_eq!(
            mesh.query_graph_path(&inside, &Vec3::new(0.9, 0.0, 0.1), &mut path),
            Status::SamePolygon
        );
        assert!(path.is_empty());
        assert_eq!(path.end_polygon(), Some(0));

        assert_eq!(
            mesh.query_graph_path(&inside, &Vec3::new(1.5, 0.0, 0.5), &mut path),
            Status::Success
        );
        assert_eq!(path.polygons(), vec![0, 1]);
        Ok(())
    }

    #[test]
    fn test_search_limit_status() -> Result<()> {
        let config = NavMeshConfig {
            max_search_nodes: 3,
            ..Default::default()
        };
        let mesh = NavMesh::from_data(&grid_mesh(10, 1, 1.0), config)?;
        let mut path = GraphPath::new();

        let status =
            mesh.query_graph_path(&Vec3::new(0.5, 0.0, 0.5), &Vec3::new(9.5, 0.0, 0.5), &mut path);
        assert_eq!(status, Status::SearchLimitReached);
        assert!(mesh.last_search_metrics().limit_reached);
        Ok(())
    }

    #[test]
    fn test_path_between_polygons() -> Result<()> {
        let mesh = build(&l_shape())?;
        let from = Vec3::new(0.5, 0.0, 0.5);
        let to = Vec3::new(1.5, 0.0, 1.9);

        let path = mesh.find_path_between_polygons(&from, &to, 0, 2);
        assert_eq!(path, Some(vec![from, Vec3::new(1.0, 0.0, 1.0), to]));
        assert_eq!(mesh.find_path_between_polygons(&from, &to, 0, 42), None);
        assert_eq!(
            mesh.find_path_between_polygons(&from, &from, 0, 0),
            Some(vec![from, from])
        );
        Ok(())
    }

    #[test]
    fn test_random_points_respect_ring() -> Result<()> {
        let mesh = build(&grid_mesh(10, 10, 1.0))?;
        let mut rng = fastrand::Rng::with_seed(7);
        let center = Vec3::new(5.0, 0.0, 5.0);

        let points = mesh.get_random_points_in_radius_with_rng(&center, 3.0, 1.0, &mut rng);
        assert!(!points.is_empty());
        for p in &points {
            let d = dist_2d(&center, p);
            assert!((1.0..=3.0).contains(&d));
            assert!(mesh.is_point_in_path(p));
        }

        let one = mesh.get_random_point_in_radius_with_rng(&center, 3.0, 1.0, &mut rng);
        assert!(one.is_some_and(|p| points.contains(&p)));

        let copied = mesh.copy_random_points_in_radius_with_rng(&center, 2.0, 5, &mut rng);
        assert_eq!(copied.len(), 5);

        assert!(mesh
            .get_random_point_in_radius_with_rng(&Vec3::new(50.0, 0.0, 50.0), 2.0, 0.0, &mut rng)
            .is_none());
        assert!(mesh.get_random_points_in_radius(&center, -1.0, 0.0).is_empty());
        Ok(())
    }

    #[test]
    fn test_random_points_are_reproducible_with_seed() -> Result<()> {
        let mesh = build(&grid_mesh(8, 8, 1.0))?;
        let center = Vec3::new(4.0, 0.0, 4.0);

        let a = mesh.get_random_points_in_radius_with_rng(
            &center,
            50.0,
            0.0,
            &mut fastrand::Rng::with_seed(3),
        );
        let b = mesh.get_random_points_in_radius_with_rng(
            &center,
            50.0,
            0.0,
            &mut fastrand::Rng::with_seed(3),
        );
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_random_points_filter_height_on_layered_mesh() -> Result<()> {
        let mesh = build(&stacked_mesh())?;
        let mut rng = fastrand::Rng::with_seed(11);

        let upper = mesh.get_random_points_in_radius_with_rng(
            &Vec3::new(2.0, 10.0, 2.0),
            2.0,
            0.0,
            &mut rng,
        );
        assert!(!upper.is_empty());
        assert!(upper.iter().all(|p| p.y == 10.0));
        Ok(())
    }

    #[test]
    fn test_random_points_far_from_the_map() -> Result<()> {
        let mesh = build(&grid_mesh(10, 10, 1.0))?;
        let mut rng = fastrand::Rng::with_seed(3);

        for center in [
            Vec3::new(1e19, 0.0, 1e19),
            Vec3::new(-1e19, 0.0, -1e19),
            Vec3::new(3e9, 0.0, 5.0),
        ] {
            assert_eq!(mesh.get_random_point_in_radius_with_rng(&center, 1.0, 0.0, &mut rng), None);
            assert!(mesh.get_random_points_in_radius(&center, 2.0, 0.0).is_empty());

            // A radius that spans the distance still reaches the map
            let all = mesh.get_random_points_in_radius_with_rng(&center, 1e30, 0.0, &mut rng);
            assert!(!all.is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_random_point_in_map_is_a_vertex() -> Result<()> {
        let mesh = build(&two_squares())?;
        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..10 {
            let p = mesh.get_random_point_in_map_with_rng(&mut rng);
            assert!(mesh.graph().all_points().contains(&p));
        }
        Ok(())
    }

    #[test]
    fn test_header_accessors() -> Result<()> {
        let mesh = build(&grid_mesh(3, 2, 2.0))?;
        assert_eq!(mesh.map_id(), 7);
        assert_eq!(mesh.width(), 6.0);
        assert_eq!(mesh.height(), 4.0);
        assert!(!mesh.is_three_dimensional());
        Ok(())
    }

    #[test]
    fn test_malformed_json_builds_nothing() {
        let result = NavMesh::from_json_str(r#"{ "polygons": [] }"#, NavMeshConfig::default());
        assert!(matches!(result, Err(Error::InvalidMesh(_))));

        let bad_config = NavMeshConfig {
            max_search_nodes: 0,
            ..Default::default()
        };
        assert!(matches!(
            NavMesh::from_data(&two_squares(), bad_config),
            Err(Error::InvalidConfig(_))
        ));
    }
}
