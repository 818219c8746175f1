//! Cost estimates guiding the path finder

use crate::graph::PolygonGraph;

/// Estimate of the remaining cost between two nodes of a graph
pub trait Heuristic<G: ?Sized> {
    fn estimate(&self, graph: &G, from: usize, to: usize) -> f32;
}

/// Straight-line distance between polygon centers, scaled so it never
/// overestimates the cost of any connection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonHeuristic {
    scale: f32,
}

impl PolygonHeuristic {
    pub fn new(scale: f32) -> Self {
        Self {
            scale: scale.clamp(0.0, 1.0),
        }
    }

    /// Heuristic using the scale computed while building `graph`
    pub fn for_graph(graph: &PolygonGraph) -> Self {
        Self::new(graph.heuristic_scale())
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

impl Default for PolygonHeuristic {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Heuristic<PolygonGraph> for PolygonHeuristic {
    fn estimate(&self, graph: &PolygonGraph, from: usize, to: usize) -> f32 {
        graph
            .polygon(from)
            .center()
            .distance(graph.polygon(to).center())
            * self.scale
    }
}

/// Always zero; the search degrades to Dijkstra
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ZeroHeuristic;

impl<G: ?Sized> Heuristic<G> for ZeroHeuristic {
    fn estimate(&self, _graph: &G, _from: usize, _to: usize) -> f32 {
        0.0
    }
}
