//! Bounding Volume Hierarchy (BVH) over polygon footprints
//!
//! Polygons are indexed by their bounds on the XZ plane. Point location walks
//! the tree down to the leaves whose bounds contain the query position and
//! then runs the exact containment test on the few remaining candidates.

use navmesh_common::Vec3;

use crate::polygon::Polygon;

/// Axis-aligned bounding box on the XZ plane
///
/// Component `0` is X and component `1` is Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum bounds
    pub min: [f32; 2],
    /// Maximum bounds
    pub max: [f32; 2],
}

impl Aabb {
    /// Creates a new Aabb from min and max corners
    pub fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    /// Creates an empty Aabb (invalid bounds)
    pub fn empty() -> Self {
        Self {
            min: [f32::MAX; 2],
            max: [f32::MIN; 2],
        }
    }

    /// Smallest box holding the XZ projection of every point
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand_point(p.x, p.z);
        }
        aabb
    }

    /// Checks if this Aabb is valid
    pub fn is_valid(&self) -> bool {
        self.min[0] <= self.max[0] && self.min[1] <= self.max[1]
    }

    /// Expands this Aabb to include another Aabb
    pub fn expand(&mut self, other: &Aabb) {
        self.min[0] = self.min[0].min(other.min[0]);
        self.min[1] = self.min[1].min(other.min[1]);
        self.max[0] = self.max[0].max(other.max[0]);
        self.max[1] = self.max[1].max(other.max[1]);
    }

    /// Expands this Aabb to include a point
    pub fn expand_point(&mut self, x: f32, z: f32) {
        self.min[0] = self.min[0].min(x);
        self.min[1] = self.min[1].min(z);
        self.max[0] = self.max[0].max(x);
        self.max[1] = self.max[1].max(z);
    }

    /// Checks if this Aabb overlaps with another Aabb
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min[0] <= other.max[0]
            && self.max[0] >= other.min[0]
            && self.min[1] <= other.max[1]
            && self.max[1] >= other.min[1]
    }

    /// Checks if a position lies inside or on the border of this Aabb
    pub fn contains_point(&self, x: f32, z: f32) -> bool {
        x >= self.min[0] && x <= self.max[0] && z >= self.min[1] && z <= self.max[1]
    }

    /// Gets the center of the Aabb
    pub fn center(&self) -> [f32; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }

    /// Half perimeter, the 2D counterpart of surface area for SAH costs
    pub fn half_perimeter(&self) -> f32 {
        if !self.is_valid() {
            return 0.0;
        }
        (self.max[0] - self.min[0]) + (self.max[1] - self.min[1])
    }
}

/// Item stored in the BVH tree
#[derive(Debug, Clone)]
pub struct BVHItem {
    /// Index of the polygon in the graph
    pub polygon: usize,
    /// Bounding box of the polygon
    pub bounds: Aabb,
}

/// Node in the BVH tree
#[derive(Debug, Clone)]
pub enum BVHNode {
    /// Leaf node containing items
    Leaf { bounds: Aabb, items: Vec<BVHItem> },
    /// Internal node with two children
    Internal {
        bounds: Aabb,
        left: Box<BVHNode>,
        right: Box<BVHNode>,
    },
}

impl BVHNode {
    /// Gets the bounds of this node
    pub fn bounds(&self) -> &Aabb {
        match self {
            BVHNode::Leaf { bounds, .. } => bounds,
            BVHNode::Internal { bounds, .. } => bounds,
        }
    }

    /// Collects all items that overlap with the given bounds
    pub fn query(&self, query_bounds: &Aabb, results: &mut Vec<usize>) {
        if !self.bounds().overlaps(query_bounds) {
            return;
        }

        match self {
            BVHNode::Leaf { items, .. } => {
                for item in items {
                    if item.bounds.overlaps(query_bounds) {
                        results.push(item.polygon);
                    }
                }
            }
            BVHNode::Internal { left, right, .. } => {
                left.query(query_bounds, results);
                right.query(query_bounds, results);
            }
        }
    }

    /// Collects all items whose bounds contain the given position
    pub fn query_point(&self, x: f32, z: f32, results: &mut Vec<usize>) {
        if !self.bounds().contains_point(x, z) {
            return;
        }

        match self {
            BVHNode::Leaf { items, .. } => {
                for item in items {
                    if item.bounds.contains_point(x, z) {
                        results.push(item.polygon);
                    }
                }
            }
            BVHNode::Internal { left, right, .. } => {
                left.query_point(x, z, results);
                right.query_point(x, z, results);
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            BVHNode::Leaf { .. } => 1,
            BVHNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Bounding Volume Hierarchy tree for spatial queries
#[derive(Debug)]
pub struct BVHTree {
    /// Root node of the tree
    root: Option<BVHNode>,
    /// Maximum items per leaf node
    max_leaf_size: usize,
}

impl Default for BVHTree {
    fn default() -> Self {
        Self::new(4)
    }
}

impl BVHTree {
    /// Creates a new empty BVH tree
    pub fn new(max_leaf_size: usize) -> Self {
        Self {
            root: None,
            max_leaf_size: max_leaf_size.max(1),
        }
    }

    /// Builds the BVH tree from a list of items
    pub fn build(&mut self, items: Vec<BVHItem>) {
        if items.is_empty() {
            self.root = None;
            return;
        }

        self.root = Some(self.build_node(items));
    }

    /// Recursively builds a BVH node
    fn build_node(&self, mut items: Vec<BVHItem>) -> BVHNode {
        let mut bounds = Aabb::empty();
        for item in &items {
            bounds.expand(&item.bounds);
        }

        if items.len() <= self.max_leaf_size {
            return BVHNode::Leaf { bounds, items };
        }

        // Sweep both axes over items sorted by center and keep the cheapest split
        let mut best_axis = 0;
        let mut best_index = items.len() / 2;
        let mut best_cost = f32::MAX;

        for axis in 0..2 {
            sort_by_center(&mut items, axis);

            let n = items.len();
            let mut right_areas = vec![0.0; n];
            let mut acc = Aabb::empty();
            for i in (1..n).rev() {
                acc.expand(&items[i].bounds);
                right_areas[i] = acc.half_perimeter();
            }

            let mut left = Aabb::empty();
            for i in 1..n {
                left.expand(&items[i - 1].bounds);
                let cost = self.calculate_sah_cost(
                    i,
                    left.half_perimeter(),
                    n - i,
                    right_areas[i],
                    &bounds,
                );
                if cost < best_cost {
                    best_cost = cost;
                    best_axis = axis;
                    best_index = i;
                }
            }
        }

        sort_by_center(&mut items, best_axis);
        let right_items = items.split_off(best_index);

        let left = Box::new(self.build_node(items));
        let right = Box::new(self.build_node(right_items));

        BVHNode::Internal {
            bounds,
            left,
            right,
        }
    }

    /// Calculates the Surface Area Heuristic (SAH) cost for a split
    fn calculate_sah_cost(
        &self,
        left_count: usize,
        left_area: f32,
        right_count: usize,
        right_area: f32,
        parent_bounds: &Aabb,
    ) -> f32 {
        let parent_area = parent_bounds.half_perimeter().max(f32::EPSILON);

        let traversal_cost = 1.0;
        let intersection_cost = 1.0;

        traversal_cost
            + intersection_cost
                * ((left_count as f32 * left_area / parent_area)
                    + (right_count as f32 * right_area / parent_area))
    }

    /// Queries all items that overlap with the given bounds
    pub fn query(&self, query_bounds: &Aabb) -> Vec<usize> {
        let mut results = Vec::new();

        if let Some(root) = &self.root {
            root.query(query_bounds, &mut results);
        }

        results
    }

    /// Queries all items whose bounds contain a position
    pub fn query_point(&self, x: f32, z: f32, results: &mut Vec<usize>) {
        if let Some(root) = &self.root {
            root.query_point(x, z, results);
        }
    }

    /// Number of levels in the tree, zero when empty
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, BVHNode::depth)
    }
}

fn sort_by_center(items: &mut [BVHItem], axis: usize) {
    items.sort_by(|a, b| {
        a.bounds.center()[axis]
            .total_cmp(&b.bounds.center()[axis])
            .then(a.polygon.cmp(&b.polygon))
    });
}

/// Point-location index for a polygon graph
///
/// The index only stores polygon indices; queries take the polygon slice the
/// index was built from.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: BVHTree,
    height_tolerance: Option<f32>,
}

impl SpatialIndex {
    /// Builds the index over the bounds of `polygons`.
    ///
    /// `height_tolerance` discards containing polygons whose representative
    /// height is farther than the tolerance from the query point.
    pub fn build(polygons: &[Polygon], max_leaf_size: usize, height_tolerance: Option<f32>) -> Self {
        let items = polygons
            .iter()
            .enumerate()
            .map(|(polygon, p)| BVHItem {
                polygon,
                bounds: *p.bounds(),
            })
            .collect();

        let mut tree = BVHTree::new(max_leaf_size);
        tree.build(items);

        log::debug!(
            "Built spatial index over {} polygons, depth {}",
            polygons.len(),
            tree.depth()
        );

        Self {
            tree,
            height_tolerance,
        }
    }

    pub fn height_tolerance(&self) -> Option<f32> {
        self.height_tolerance
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    /// Finds the polygon containing `point`.
    ///
    /// When several polygons contain the XZ position, the one whose height is
    /// closest to `point.y` wins; ties go to the lowest index.
    pub fn locate(&self, polygons: &[Polygon], point: &Vec3) -> Option<usize> {
        if !point.is_finite() {
            return None;
        }

        let mut candidates = Vec::new();
        self.tree.query_point(point.x, point.z, &mut candidates);

        let mut best: Option<(usize, f32)> = None;
        let mut containing = 0;
        for index in candidates {
            let polygon = &polygons[index];
            if !polygon.is_inner_point(point) {
                continue;
            }
            containing += 1;

            let dy = (polygon.height() - point.y).abs();
            if let Some(tolerance) = self.height_tolerance {
                if dy > tolerance {
                    continue;
                }
            }

            best = match best {
                Some((i, d)) if d < dy || (d == dy && i < index) => Some((i, d)),
                _ => Some((index, dy)),
            };
        }

        if containing > 1 {
            log::debug!(
                "{} polygons contain ({}, {}, {}), picked {:?} by height",
                containing,
                point.x,
                point.y,
                point.z,
                best.map(|(i, _)| polygons[i].id())
            );
        }

        best.map(|(index, _)| index)
    }

    /// Lowest-index polygon containing the XZ position, ignoring height
    pub fn locate_2d(&self, polygons: &[Polygon], x: f32, z: f32) -> Option<usize> {
        if !(x.is_finite() && z.is_finite()) {
            return None;
        }

        let mut candidates = Vec::new();
        self.tree.query_point(x, z, &mut candidates);
        candidates
            .into_iter()
            .filter(|&index| polygons[index].contains_2d(x, z))
            .min()
    }

    /// Indices of every polygon whose bounds overlap `bounds`
    pub fn query_bounds(&self, bounds: &Aabb) -> Vec<usize> {
        let mut results = self.tree.query(bounds);
        results.sort_unstable();
        results
    }
}
