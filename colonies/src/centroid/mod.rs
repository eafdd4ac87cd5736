//! Cluster centroids and distances between them.


use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clustering::ClusterAssignment;
use crate::spatial::KdTree;

/// Non-noise label → mean member position.
pub type Centroids = BTreeMap<i32, DVec2>;

/// Arithmetic mean position of each cluster.
///
/// Keys equal the non-noise labels of `assignment`; noise gets no centroid.
pub fn compute_centroids(positions: &[DVec2], assignment: &ClusterAssignment) -> Centroids {
    assert_eq!(
        positions.len(),
        assignment.len(),
        "assignment must label every position"
    );

    assignment
        .members()
        .iter()
        .map(|(&label, members)| {
            let sum: DVec2 = members.iter().map(|&i| positions[i]).sum();
            (label, sum / members.len() as f64)
        })
        .collect()
}

/// Euclidean distance between two labelled centroids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentroidDistance {
    pub from: i32,
    pub to: i32,
    pub distance: f64,
}

/// Distances for the requested label pairs, in request order.
///
/// Pairs naming a label without a centroid are skipped with a warning.
pub fn pair_distances(centroids: &Centroids, pairs: &[(i32, i32)]) -> Vec<CentroidDistance> {
    pairs
        .iter()
        .filter_map(|&(from, to)| match (centroids.get(&from), centroids.get(&to)) {
            (Some(a), Some(b)) => Some(CentroidDistance {
                from,
                to,
                distance: a.distance(*b),
            }),
            _ => {
                warn!(from, to, "Centroid pair references a missing cluster, skipped");
                None
            }
        })
        .collect()
}

/// Distance from each centroid to its closest other centroid.
///
/// A lone centroid has no entry.
pub fn nearest_neighbor_distances(centroids: &Centroids) -> BTreeMap<i32, f64> {
    let points: Vec<DVec2> = centroids.values().copied().collect();
    let Some(tree) = KdTree::build(&points) else {
        return BTreeMap::new();
    };

    centroids
        .keys()
        .zip(&points)
        .enumerate()
        .filter_map(|(i, (&label, &c))| {
            tree.nearest(c, Some(i))
                .map(|neighbor| (label, neighbor.dist_sq.sqrt()))
        })
        .collect()
}
