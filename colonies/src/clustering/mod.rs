//! Density-based spatial clustering (DBSCAN).
//!
//! A point is a core point when at least `min_samples` points, itself
//! included, lie within `eps`. Core points within `eps` of each other are
//! chained into one cluster, non-core points within `eps` of a core point join
//! the first cluster that reaches them, and everything else is noise.

pub mod validity;

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::spatial::KdTree;

pub use validity::validity_index;

/// Label of points that belong to no cluster.
pub const NOISE: i32 = -1;

const UNVISITED: i32 = -2;

/// DBSCAN parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Neighborhood radius, in the units of the clustered positions.
    pub eps: f64,
    /// Minimum neighborhood size, the point itself included.
    pub min_samples: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            eps: 5.0,
            min_samples: 2,
        }
    }
}

impl ClusterConfig {
    pub fn new(eps: f64, min_samples: usize) -> Self {
        Self { eps, min_samples }
    }

    pub fn validate(&self) {
        assert!(
            self.eps.is_finite() && self.eps > 0.0,
            "eps must be positive and finite, got {}",
            self.eps
        );
        assert!(
            self.min_samples >= 1,
            "min_samples must be at least 1, got {}",
            self.min_samples
        );
    }
}

/// One label per clustered position plus the label → members index.
///
/// Member lists hold indices into the clustered slice, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClusterAssignment {
    labels: Vec<i32>,
    members: BTreeMap<i32, Vec<usize>>,
}

impl ClusterAssignment {
    pub fn from_labels(labels: Vec<i32>) -> Self {
        let mut members: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (idx, &label) in labels.iter().enumerate() {
            if label != NOISE {
                members.entry(label).or_default().push(idx);
            }
        }
        Self { labels, members }
    }

    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    pub fn label(&self, idx: usize) -> i32 {
        self.labels[idx]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Non-noise label → member indices.
    pub fn members(&self) -> &BTreeMap<i32, Vec<usize>> {
        &self.members
    }

    pub fn cluster_count(&self) -> usize {
        self.members.len()
    }

    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == NOISE).count()
    }

    pub fn noise_indices(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == NOISE)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn cluster_sizes(&self) -> BTreeMap<i32, usize> {
        self.members
            .iter()
            .map(|(&label, members)| (label, members.len()))
            .collect()
    }

    /// Labels renumbered by first appearance; noise stays [`NOISE`].
    ///
    /// Two assignments describe the same partition iff their canonical labels
    /// are equal.
    pub fn canonical_labels(&self) -> Vec<i32> {
        let mut remap: BTreeMap<i32, i32> = BTreeMap::new();
        self.labels
            .iter()
            .map(|&label| {
                if label == NOISE {
                    return NOISE;
                }
                let next = remap.len() as i32;
                *remap.entry(label).or_insert(next)
            })
            .collect()
    }

    pub fn same_partition(&self, other: &Self) -> bool {
        self.canonical_labels() == other.canonical_labels()
    }
}

/// Cluster `positions` with DBSCAN.
///
/// Labels are numbered from 0 in order of discovery, which follows input
/// order. Empty input yields an empty assignment.
pub fn dbscan(positions: &[DVec2], config: &ClusterConfig) -> ClusterAssignment {
    config.validate();

    let Some(tree) = KdTree::build(positions) else {
        return ClusterAssignment::default();
    };

    let mut labels = vec![UNVISITED; positions.len()];
    let mut neighbors = Vec::new();
    let mut seeds = Vec::new();
    let mut next_label = 0;

    for idx in 0..positions.len() {
        if labels[idx] != UNVISITED {
            continue;
        }

        tree.radius_indices_into(positions[idx], config.eps, &mut neighbors);
        if neighbors.len() < config.min_samples {
            labels[idx] = NOISE;
            continue;
        }

        let label = next_label;
        next_label += 1;
        labels[idx] = label;

        seeds.clear();
        seeds.extend_from_slice(&neighbors);

        while let Some(q) = seeds.pop() {
            match labels[q] {
                // Visited non-core point reached from a core point: border.
                NOISE => labels[q] = label,
                UNVISITED => {
                    labels[q] = label;
                    tree.radius_indices_into(positions[q], config.eps, &mut neighbors);
                    if neighbors.len() >= config.min_samples {
                        seeds.extend_from_slice(&neighbors);
                    }
                }
                _ => {}
            }
        }
    }

    let assignment = ClusterAssignment::from_labels(labels);
    debug!(
        points = assignment.len(),
        clusters = assignment.cluster_count(),
        noise = assignment.noise_count(),
        eps = config.eps,
        min_samples = config.min_samples,
        "DBSCAN finished"
    );
    assignment
}
