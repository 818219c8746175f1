//! Indexed A* search over graphs with dense node indices
//!
//! Node records live in a flat vector indexed by node and are stamped with the
//! id of the search that last touched them, so nothing has to be cleared
//! between searches.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::Connection;
use crate::graph_path::GraphPath;
use crate::heuristic::Heuristic;

/// Graph whose nodes are addressed by dense indices `0..node_count()`
pub trait IndexedGraph {
    fn node_count(&self) -> usize;

    /// Outgoing connections of `node`
    fn connections(&self, node: usize) -> &[Connection];
}

/// Search state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeCategory {
    Unvisited,
    Open,
    Closed,
}

/// Per-node bookkeeping for one search
#[derive(Debug, Clone)]
struct NodeRecord {
    category: NodeCategory,
    /// Cost from the start node (g)
    cost_so_far: f32,
    /// Cost so far plus the heuristic estimate (f)
    estimated_total: f32,
    /// Connection used to reach the node
    connection: Option<Connection>,
    /// Search that last wrote this record
    search_id: u32,
}

impl NodeRecord {
    fn new() -> Self {
        Self {
            category: NodeCategory::Unvisited,
            cost_so_far: 0.0,
            estimated_total: 0.0,
            connection: None,
            search_id: 0,
        }
    }
}

/// Node in the open list heap
#[derive(Debug, Clone, Copy)]
struct HeapNode {
    /// Index of the graph node
    index: usize,
    /// Total cost (f value)
    f: f32,
}

impl PartialEq for HeapNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapNode {}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for a min-heap, ties broken by the lower index
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Counters describing the last search
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchMetrics {
    /// Nodes taken off the open list and expanded
    pub visited_nodes: usize,
    /// Pushes onto the open list, including re-pushes after a cheaper path
    pub open_list_additions: usize,
    /// Largest open list size reached
    pub max_open_list_size: usize,
    /// The search stopped at the expansion cap
    pub limit_reached: bool,
}

/// Reusable A* path finder
///
/// One instance serves one search at a time; share it behind a lock or give
/// each thread its own.
#[derive(Debug)]
pub struct IndexedAStarPathFinder {
    records: Vec<NodeRecord>,
    open_list: BinaryHeap<HeapNode>,
    search_id: u32,
    max_search_nodes: usize,
    metrics: SearchMetrics,
}

impl IndexedAStarPathFinder {
    /// Creates a finder sized for `node_count` nodes that gives up after
    /// expanding `max_search_nodes` nodes
    pub fn new(node_count: usize, max_search_nodes: usize) -> Self {
        Self {
            records: vec![NodeRecord::new(); node_count],
            open_list: BinaryHeap::new(),
            search_id: 0,
            max_search_nodes: max_search_nodes.max(1),
            metrics: SearchMetrics::default(),
        }
    }

    /// Counters of the most recent search
    pub fn metrics(&self) -> SearchMetrics {
        self.metrics
    }

    pub fn max_search_nodes(&self) -> usize {
        self.max_search_nodes
    }

    /// Searches for the cheapest corridor from `start` to `end`.
    ///
    /// On success `out` holds the connections in travel order and `true` is
    /// returned. `start == end` succeeds with an empty corridor. An exhausted
    /// frontier or the expansion cap yields `false`; check
    /// [`SearchMetrics::limit_reached`] to tell them apart.
    pub fn search<G, H>(
        &mut self,
        graph: &G,
        start: usize,
        end: usize,
        heuristic: &H,
        out: &mut GraphPath,
    ) -> bool
    where
        G: IndexedGraph + ?Sized,
        H: Heuristic<G> + ?Sized,
    {
        out.connections.clear();
        self.metrics = SearchMetrics::default();

        let node_count = graph.node_count();
        if start >= node_count || end >= node_count {
            log::warn!(
                "Search endpoints {} -> {} out of range for {} nodes",
                start,
                end,
                node_count
            );
            return false;
        }

        if start == end {
            return true;
        }

        self.begin(node_count);

        let h = heuristic.estimate(graph, start, end);
        let record = self.record_mut(start);
        record.category = NodeCategory::Open;
        record.cost_so_far = 0.0;
        record.estimated_total = h;
        self.push(start, h);

        while let Some(HeapNode { index: current, f }) = self.open_list.pop() {
            let record = &self.records[current];
            // Lazy deletion: skip closed nodes and entries superseded by a cheaper push
            if record.category != NodeCategory::Open || f > record.estimated_total {
                continue;
            }

            if current == end {
                self.reconstruct(start, end, out);
                return true;
            }

            if self.metrics.visited_nodes >= self.max_search_nodes {
                self.metrics.limit_reached = true;
                log::warn!(
                    "Search from {} to {} stopped after expanding {} nodes",
                    start,
                    end,
                    self.metrics.visited_nodes
                );
                return false;
            }
            self.metrics.visited_nodes += 1;

            let cost_so_far = record.cost_so_far;
            self.records[current].category = NodeCategory::Closed;

            for connection in graph.connections(current) {
                let to = connection.to;
                let to_cost = cost_so_far + connection.cost;

                let record = self.record_mut(to);
                let estimate = match record.category {
                    NodeCategory::Unvisited => heuristic.estimate(graph, to, end),
                    NodeCategory::Open | NodeCategory::Closed => {
                        if record.cost_so_far <= to_cost {
                            continue;
                        }
                        record.estimated_total - record.cost_so_far
                    }
                };

                let record = self.record_mut(to);
                record.category = NodeCategory::Open;
                record.cost_so_far = to_cost;
                record.estimated_total = to_cost + estimate;
                record.connection = Some(*connection);
                self.push(to, to_cost + estimate);
            }
        }

        false
    }

    fn begin(&mut self, node_count: usize) {
        if self.records.len() < node_count {
            self.records.resize(node_count, NodeRecord::new());
        }

        self.search_id = self.search_id.wrapping_add(1);
        if self.search_id == 0 {
            // Stamps wrapped around; stale records could look current
            for record in &mut self.records {
                record.search_id = 0;
            }
            self.search_id = 1;
        }

        self.open_list.clear();
    }

    fn record_mut(&mut self, index: usize) -> &mut NodeRecord {
        let search_id = self.search_id;
        let record = &mut self.records[index];
        if record.search_id != search_id {
            *record = NodeRecord::new();
            record.search_id = search_id;
        }
        record
    }

    fn push(&mut self, index: usize, f: f32) {
        self.open_list.push(HeapNode { index, f });
        self.metrics.open_list_additions += 1;
        self.metrics.max_open_list_size = self.metrics.max_open_list_size.max(self.open_list.len());
    }

    fn reconstruct(&self, start: usize, end: usize, out: &mut GraphPath) {
        let mut current = end;
        while current != start {
            match self.records[current].connection {
                Some(connection) => {
                    out.connections.push(connection);
                    current = connection.from;
                }
                None => break,
            }
        }
        out.connections.reverse();
    }
}
