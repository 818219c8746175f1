//! Polygon corridor produced by a search

use navmesh_common::Vec3;

use crate::funnel::Portal;
use crate::graph::Connection;

/// Ordered connections from the start polygon to the end polygon, with the
/// exact query endpoints
///
/// The buffer is meant to be cleared and reused across queries.
#[derive(Debug, Clone, Default)]
pub struct GraphPath {
    pub connections: Vec<Connection>,
    pub start: Vec3,
    pub end: Vec3,
    pub start_polygon: Option<usize>,
}

impl GraphPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.connections.clear();
        self.start = Vec3::ZERO;
        self.end = Vec3::ZERO;
        self.start_polygon = None;
    }

    /// Number of connections in the corridor
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Connection> {
        self.connections.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Last polygon of the corridor, the start polygon when it is empty
    pub fn end_polygon(&self) -> Option<usize> {
        match self.connections.last() {
            Some(connection) => Some(connection.to),
            None => self.start_polygon,
        }
    }

    /// Polygon indices crossed, start polygon first
    pub fn polygons(&self) -> Vec<usize> {
        let mut polygons = Vec::with_capacity(self.connections.len() + 1);
        if let Some(first) = self.connections.first() {
            polygons.push(first.from);
        } else if let Some(start) = self.start_polygon {
            polygons.push(start);
        }
        polygons.extend(self.connections.iter().map(|c| c.to));
        polygons
    }

    /// Shared edges in travel order
    pub fn portals(&self) -> Vec<Portal> {
        self.connections.iter().map(Connection::portal).collect()
    }

    pub fn total_cost(&self) -> f32 {
        self.connections.iter().map(|c| c.cost).sum()
    }
}
