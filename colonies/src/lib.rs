//! Colonies - spatial analysis of fluorescent bacterial colonies.
//!
//! This library provides tools for analyzing time-lapse bacteria exports:
//! - Loading per-timepoint observation blocks from CSV
//! - Channel selection and coordinate normalization
//! - DBSCAN clustering with a DBCV validity score
//! - Centroids, centroid distances and Voronoi containment checks
//! - SVG figures and a YAML run summary
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use colonies::{Channel, ClusterConfig, FrameSet, compute_centroids, dbscan};
//!
//! let frames = FrameSet::load("data/conteos.csv".as_ref())?;
//! let frame = frames.frame(1500)?;
//! let positions: Vec<_> = frame
//!     .select_positive(Channel::Gfp)?
//!     .iter()
//!     .map(|o| o.position * 0.1)
//!     .collect();
//!
//! let assignment = dbscan(&positions, &ClusterConfig::default());
//! let centroids = compute_centroids(&positions, &assignment);
//! println!("Found {} clusters", centroids.len());
//! ```

mod bounds;
mod centroid;
mod centroid_file;
mod clustering;
mod config;
mod error;
mod frames;
pub(crate) mod geometry;
mod normalize;
mod observation;
pub mod pipeline;
pub mod plot;
pub(crate) mod spatial;
mod voronoi;

#[cfg(test)]
pub mod testing;

// ============================================================================
// Input data
// ============================================================================

pub use error::{Error, Result};
pub use frames::{Frame, FrameSet, HEADER_TOKEN};
pub use observation::{Channel, Observation};

// ============================================================================
// Normalization
// ============================================================================

pub use bounds::Bounds;
pub use normalize::{NormalizationPolicy, NormalizedPositions, normalize};

// ============================================================================
// Clustering
// ============================================================================

pub use clustering::{ClusterAssignment, ClusterConfig, NOISE, dbscan, validity_index};

// ============================================================================
// Centroids
// ============================================================================

pub use centroid::{
    CentroidDistance, Centroids, compute_centroids, nearest_neighbor_distances, pair_distances,
};
pub use centroid_file::{load_centroids, read_centroids, save_centroids, write_centroids};

// ============================================================================
// Voronoi validation
// ============================================================================

pub use voronoi::{
    ContainmentReport, MIN_SITES, VoronoiCell, VoronoiDiagram, VoronoiEdge, validate_containment,
};

// ============================================================================
// Configuration and runs
// ============================================================================

pub use config::{ChannelConfig, Config};
pub use pipeline::{
    ChannelContainment, ChannelSummary, ClusterSummary, Pipeline, RunSummary, SUMMARY_FILE,
    VORONOI_FIGURE_FILE, VoronoiSummary,
};
pub use plot::PlotConfig;
