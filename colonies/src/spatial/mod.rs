//! 2D k-d tree for neighbor-radius queries over bacteria positions.


use glam::DVec2;

/// A 2D k-d tree built once over a fixed point set.
///
/// Indices returned by queries refer to positions in the input slice.
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    points: Vec<DVec2>,
}

#[derive(Debug, Clone)]
struct KdNode {
    /// Index into the points array
    point_idx: usize,
    left: Option<usize>,
    right: Option<usize>,
    /// Split dimension (0 = x, 1 = y)
    split_dim: usize,
}

/// Result of a nearest-neighbor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub dist_sq: f64,
}

impl KdTree {
    /// Build a k-d tree using median splits. Returns `None` for empty input.
    pub fn build(points: &[DVec2]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let points_vec = points.to_vec();
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());

        Self::build_recursive(&points_vec, &mut indices, 0, &mut nodes);

        Some(Self {
            nodes,
            points: points_vec,
        })
    }

    fn build_recursive(
        points: &[DVec2],
        indices: &mut [usize],
        depth: usize,
        nodes: &mut Vec<KdNode>,
    ) -> Option<usize> {
        if indices.is_empty() {
            return None;
        }

        let split_dim = depth % 2;
        indices.sort_by(|&a, &b| points[a][split_dim].total_cmp(&points[b][split_dim]));

        let median = indices.len() / 2;
        let point_idx = indices[median];

        let node_idx = nodes.len();
        nodes.push(KdNode {
            point_idx,
            left: None,
            right: None,
            split_dim,
        });

        let (left_indices, right_part) = indices.split_at_mut(median);
        let right_indices = &mut right_part[1..];

        let left = Self::build_recursive(points, left_indices, depth + 1, nodes);
        let right = Self::build_recursive(points, right_indices, depth + 1, nodes);

        nodes[node_idx].left = left;
        nodes[node_idx].right = right;

        Some(node_idx)
    }

    /// Collect indices of all points with distance `<= radius` from `query`.
    ///
    /// `out` is cleared first so one buffer can be reused across queries.
    /// Order of the returned indices is unspecified.
    pub fn radius_indices_into(&self, query: DVec2, radius: f64, out: &mut Vec<usize>) {
        out.clear();
        if self.nodes.is_empty() {
            return;
        }
        self.radius_recursive(0, query, radius * radius, out);
    }

    fn radius_recursive(&self, node_idx: usize, query: DVec2, radius_sq: f64, out: &mut Vec<usize>) {
        let node = &self.nodes[node_idx];
        let point = self.points[node.point_idx];

        if query.distance_squared(point) <= radius_sq {
            out.push(node.point_idx);
        }

        let diff = query[node.split_dim] - point[node.split_dim];
        let diff_sq = diff * diff;

        if let Some(left_idx) = node.left
            && (diff <= 0.0 || diff_sq <= radius_sq)
        {
            self.radius_recursive(left_idx, query, radius_sq, out);
        }

        if let Some(right_idx) = node.right
            && (diff >= 0.0 || diff_sq <= radius_sq)
        {
            self.radius_recursive(right_idx, query, radius_sq, out);
        }
    }

    /// Closest point to `query`, skipping the point at index `exclude`.
    ///
    /// `None` when no other point exists.
    pub fn nearest(&self, query: DVec2, exclude: Option<usize>) -> Option<Neighbor> {
        let mut best: Option<Neighbor> = None;
        if !self.nodes.is_empty() {
            self.nearest_recursive(0, query, exclude, &mut best);
        }
        best
    }

    fn nearest_recursive(
        &self,
        node_idx: usize,
        query: DVec2,
        exclude: Option<usize>,
        best: &mut Option<Neighbor>,
    ) {
        let node = &self.nodes[node_idx];
        let point = self.points[node.point_idx];

        let dist_sq = query.distance_squared(point);
        if exclude != Some(node.point_idx) && best.is_none_or(|b| dist_sq < b.dist_sq) {
            *best = Some(Neighbor {
                index: node.point_idx,
                dist_sq,
            });
        }

        let diff = query[node.split_dim] - point[node.split_dim];
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(first_idx) = first {
            self.nearest_recursive(first_idx, query, exclude, best);
        }

        if let Some(second_idx) = second
            && best.is_none_or(|b| diff * diff < b.dist_sq)
        {
            self.nearest_recursive(second_idx, query, exclude, best);
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get_point(&self, idx: usize) -> DVec2 {
        self.points[idx]
    }
}
