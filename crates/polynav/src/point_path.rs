//! Waypoint path built from a polygon corridor

use navmesh_common::Vec3;

use crate::funnel::{string_pull_into, string_pull_with_height_into};
use crate::graph_path::GraphPath;

/// Ordered waypoints, reusable across queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointPath {
    points: Vec<Vec3>,
}

impl PointPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_vec(self) -> Vec<Vec3> {
        self.points
    }

    /// Total length of the polyline in 3D
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Replaces the waypoints with the string-pulled form of `path`
    pub fn calculate_for_graph_path(&mut self, path: &GraphPath, want_height: bool) {
        let portals = path.portals();
        if want_height {
            string_pull_with_height_into(path.start, path.end, &portals, &mut self.points);
        } else {
            string_pull_into(path.start, path.end, &portals, &mut self.points);
        }
    }
}

/// Reduces a corridor to waypoints
pub fn reduce(path: &GraphPath, want_height: bool) -> PointPath {
    let mut points = PointPath::new();
    points.calculate_for_graph_path(path, want_height);
    points
}
