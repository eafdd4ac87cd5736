//! Machine-readable record of one analysis run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use common::SerdeFormat;

use crate::centroid::{CentroidDistance, Centroids};
use crate::error::{Error, Result};
use crate::observation::Channel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub timepoint: usize,
    /// Observations in the analyzed frame, all channels.
    pub observations: usize,
    /// Translation applied after unit scaling, shared by every channel.
    pub offset: DVec2,
    pub channels: Vec<ChannelSummary>,
    pub voronoi: VoronoiSummary,
    pub voronoi_figure: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel: Channel,
    /// Bacteria positive in this channel.
    pub positive: usize,
    pub noise: usize,
    /// DBCV index; absent when fewer than two clusters of two members exist.
    pub validity: Option<f64>,
    /// One entry per cluster, in label order.
    pub clusters: Vec<ClusterSummary>,
    pub distances: Vec<CentroidDistance>,
    pub centroid_file: Option<PathBuf>,
    pub figure: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub label: i32,
    pub size: usize,
    pub centroid: DVec2,
    /// Distance to the closest other centroid of the same channel.
    pub nearest_centroid: Option<f64>,
}

impl ChannelSummary {
    pub fn cluster(&self, label: i32) -> Option<&ClusterSummary> {
        self.clusters.iter().find(|c| c.label == label)
    }

    pub fn centroids(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.clusters.iter().map(|c| c.centroid)
    }
}

/// Per-cluster entries from an assignment's sizes and centroids.
pub(super) fn cluster_summaries(
    sizes: &BTreeMap<i32, usize>,
    centroids: &Centroids,
    nearest: &BTreeMap<i32, f64>,
) -> Vec<ClusterSummary> {
    centroids
        .iter()
        .map(|(&label, &centroid)| ClusterSummary {
            label,
            size: sizes.get(&label).copied().unwrap_or_default(),
            centroid,
            nearest_centroid: nearest.get(&label).copied(),
        })
        .collect()
}

/// Outcome of validating positions against the centroid Voronoi cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VoronoiSummary {
    Validated {
        /// Distinct centroid positions.
        sites: usize,
        bounded_cells: usize,
        containment: Vec<ChannelContainment>,
    },
    /// Too few distinct, non-collinear centroids for any bounded cell.
    InsufficientCentroids { found: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelContainment {
    pub channel: Channel,
    pub inside: usize,
    pub total: usize,
    pub percentage: f64,
}

impl RunSummary {
    pub fn channel(&self, channel: Channel) -> Option<&ChannelSummary> {
        self.channels.iter().find(|c| c.channel == channel)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = common::serialize(self, SerdeFormat::Yaml)?;
        std::fs::write(path, text).map_err(|e| Error::io(path, e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(common::deserialize(&text, SerdeFormat::Yaml)?)
    }
}
