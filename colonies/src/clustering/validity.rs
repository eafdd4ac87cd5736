//! Density-based clustering validation (DBCV, Moulavi et al. 2014).
//!
//! Scores a labelling in [-1, 1]: close to 1 for dense, well separated
//! clusters, negative when clusters are denser across than within.

use glam::DVec2;

use super::ClusterAssignment;

/// Dimensionality of the clustered positions.
const DIM: i32 = 2;

/// Floor for pairwise distances so duplicate positions stay finite.
const MIN_DISTANCE: f64 = 1e-12;

struct ClusterGeometry<'a> {
    members: &'a [usize],
    /// All-points core distance, parallel to `members`.
    core: Vec<f64>,
    /// Positions in `members` of MST-internal points.
    internal: Vec<usize>,
    /// Density sparseness: largest internal MST edge.
    sparseness: f64,
}

/// DBCV index of `assignment` over `positions`.
///
/// Returns `None` with fewer than two clusters or when any cluster has a
/// single member. Noise points count towards the total used for weighting.
pub fn validity_index(positions: &[DVec2], assignment: &ClusterAssignment) -> Option<f64> {
    let members = assignment.members();
    if members.len() < 2 || members.values().any(|m| m.len() < 2) {
        return None;
    }

    let clusters: Vec<ClusterGeometry> = members
        .values()
        .map(|m| cluster_geometry(positions, m))
        .collect();

    let total = assignment.len() as f64;
    let mut index = 0.0;

    for (i, cluster) in clusters.iter().enumerate() {
        let separation = clusters
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, other)| separation(positions, cluster, other))
            .fold(f64::INFINITY, f64::min);

        let denom = separation.max(cluster.sparseness);
        let validity = if denom > 0.0 {
            (separation - cluster.sparseness) / denom
        } else {
            0.0
        };
        index += cluster.members.len() as f64 / total * validity;
    }

    Some(index)
}

fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b).max(MIN_DISTANCE)
}

fn cluster_geometry<'a>(positions: &[DVec2], members: &'a [usize]) -> ClusterGeometry<'a> {
    let n = members.len();

    let core: Vec<f64> = members
        .iter()
        .map(|&a| {
            let sum: f64 = members
                .iter()
                .filter(|&&b| b != a)
                .map(|&b| distance(positions[a], positions[b]).powi(-DIM))
                .sum();
            (sum / (n - 1) as f64).powf(-1.0 / DIM as f64)
        })
        .collect();

    let mreach = |i: usize, j: usize| -> f64 {
        distance(positions[members[i]], positions[members[j]])
            .max(core[i])
            .max(core[j])
    };

    // Prim's algorithm on the dense mutual-reachability graph.
    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut parent = vec![usize::MAX; n];
    let mut edges: Vec<(usize, usize, f64)> = Vec::with_capacity(n - 1);
    best[0] = 0.0;

    for _ in 0..n {
        let Some(u) = (0..n)
            .filter(|&v| !in_tree[v])
            .min_by(|&a, &b| best[a].total_cmp(&best[b]))
        else {
            break;
        };
        in_tree[u] = true;
        if parent[u] != usize::MAX {
            edges.push((parent[u], u, best[u]));
        }
        for v in 0..n {
            if !in_tree[v] {
                let w = mreach(u, v);
                if w < best[v] {
                    best[v] = w;
                    parent[v] = u;
                }
            }
        }
    }

    let mut degree = vec![0usize; n];
    for &(a, b, _) in &edges {
        degree[a] += 1;
        degree[b] += 1;
    }
    let mut internal: Vec<usize> = (0..n).filter(|&v| degree[v] > 1).collect();
    if internal.is_empty() {
        internal = (0..n).collect();
    }

    let is_internal = |v: usize| degree[v] > 1 || internal.len() == n;
    let internal_max = edges
        .iter()
        .filter(|(a, b, _)| is_internal(*a) && is_internal(*b))
        .map(|(_, _, w)| *w)
        .fold(f64::NEG_INFINITY, f64::max);
    let sparseness = if internal_max.is_finite() {
        internal_max
    } else {
        edges.iter().map(|(_, _, w)| *w).fold(0.0, f64::max)
    };

    ClusterGeometry {
        members,
        core,
        internal,
        sparseness,
    }
}

/// Density separation: smallest mutual reachability between internal points.
fn separation(positions: &[DVec2], a: &ClusterGeometry, b: &ClusterGeometry) -> f64 {
    let mut min = f64::INFINITY;
    for &i in &a.internal {
        let pa = positions[a.members[i]];
        for &j in &b.internal {
            let pb = positions[b.members[j]];
            let w = distance(pa, pb).max(a.core[i]).max(b.core[j]);
            min = min.min(w);
        }
    }
    min
}
