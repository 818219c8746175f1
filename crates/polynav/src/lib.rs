//! Pathfinding over convex polygon navigation meshes
//!
//! A navigation mesh splits walkable space into convex polygons. This crate
//! builds the adjacency graph of such a mesh, locates points on it, searches
//! polygon corridors with indexed A* and turns them into waypoints with the
//! funnel algorithm, optionally following the terrain height.
//!
//! # Example
//!
//! ```rust,ignore
//! use polynav::{NavMesh, NavMeshConfig, Vec3};
//!
//! let mesh = NavMesh::load_from_json("maps/1.json", NavMeshConfig::default())?;
//! let waypoints = mesh.find_path(&Vec3::new(1.0, 0.0, 1.0), &Vec3::new(20.0, 0.0, 5.0));
//! ```

mod config;
mod funnel;
mod graph;
mod graph_path;
mod heuristic;
mod mesh_data;
mod nav_mesh;
mod path_finder;
mod point_path;
mod polygon;
mod registry;
pub mod shapes;
mod spatial_index;
mod status;

#[cfg(test)]
mod test_mesh_helpers;

pub use config::{CostModel, NavMeshConfig};
pub use funnel::{string_pull, string_pull_with_height, Portal};
pub use graph::{Connection, PolygonGraph};
pub use graph_path::GraphPath;
pub use heuristic::{Heuristic, PolygonHeuristic, ZeroHeuristic};
pub use mesh_data::{PolygonData, PolygonSource};
pub use nav_mesh::NavMesh;
pub use path_finder::{IndexedAStarPathFinder, IndexedGraph, SearchMetrics};
pub use point_path::{reduce, PointPath};
pub use polygon::Polygon;
pub use registry::NavMeshRegistry;
pub use spatial_index::{Aabb, BVHItem, BVHNode, BVHTree, SpatialIndex};
pub use status::Status;

pub use navmesh_common::{Error, Result, Vec3};
