//! One analysis run: load, cluster each channel, validate against the
//! centroid Voronoi diagram, render figures, and write the run summary.

#[cfg(test)]
mod tests;

mod summary;

use std::path::PathBuf;

use glam::DVec2;
use tracing::{info, warn};

pub use summary::{
    ChannelContainment, ChannelSummary, ClusterSummary, RunSummary, VoronoiSummary,
};

use crate::centroid::{compute_centroids, nearest_neighbor_distances, pair_distances};
use crate::centroid_file::save_centroids;
use crate::clustering::{dbscan, validity_index};
use crate::config::{ChannelConfig, Config};
use crate::error::{Error, Result};
use crate::frames::{Frame, FrameSet};
use crate::normalize::{NormalizedPositions, normalize};
use crate::plot::{ClusterFigure, PointLayer, render_cluster_figure, render_voronoi_figure};
use crate::voronoi::VoronoiDiagram;

pub const SUMMARY_FILE: &str = "summary.yaml";
pub const VORONOI_FIGURE_FILE: &str = "voronoi_all.svg";

/// Intermediate results of one channel.
struct ChannelAnalysis {
    positions: Vec<DVec2>,
    summary: ChannelSummary,
}

#[derive(Debug)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Panics if `config` fails validation.
    pub fn new(config: Config) -> Self {
        config.validate();
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the configured input and analyze the configured timepoint.
    pub fn run(&self) -> Result<RunSummary> {
        let frames = FrameSet::load(&self.config.input)?;
        let frame = frames.frame(self.config.timepoint)?;
        self.analyze(frame)
    }

    /// Analyze an already loaded frame, writing artifacts to the output
    /// directory.
    pub fn analyze(&self, frame: &Frame) -> Result<RunSummary> {
        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;

        info!(
            timepoint = frame.index,
            observations = frame.len(),
            channels = self.config.channels.len(),
            "Analyzing frame"
        );

        // One offset for the whole frame keeps channels in a common space.
        let raw: Vec<DVec2> = frame.observations.iter().map(|o| o.position).collect();
        let normalized = normalize(&raw, self.config.unit_scale, self.config.normalization);

        let analyses = self
            .config
            .channels
            .iter()
            .map(|channel_config| self.analyze_channel(frame, &normalized, channel_config))
            .collect::<Result<Vec<_>>>()?;

        let sites: Vec<DVec2> = analyses
            .iter()
            .flat_map(|a| a.summary.centroids())
            .collect();

        let (diagram, voronoi) = match VoronoiDiagram::build(&sites) {
            Ok(diagram) => {
                let voronoi = containment_summary(&diagram, &analyses);
                (Some(diagram), voronoi)
            }
            Err(Error::InsufficientCentroids { found }) => {
                warn!(found, "Too few centroids for Voronoi validation");
                (None, VoronoiSummary::InsufficientCentroids { found })
            }
            Err(e) => return Err(e),
        };

        let layers: Vec<PointLayer> = analyses
            .iter()
            .map(|a| PointLayer {
                channel: a.summary.channel,
                points: &a.positions,
            })
            .collect();
        let voronoi_figure = output_dir.join(VORONOI_FIGURE_FILE);
        render_voronoi_figure(
            &voronoi_figure,
            diagram.as_ref(),
            &sites,
            &layers,
            &self.config.plot,
        )?;

        let summary = RunSummary {
            input: self.config.input.clone(),
            timepoint: frame.index,
            observations: frame.len(),
            offset: normalized.offset,
            channels: analyses.into_iter().map(|a| a.summary).collect(),
            voronoi,
            voronoi_figure,
        };

        let summary_path = output_dir.join(SUMMARY_FILE);
        summary.save(&summary_path)?;
        info!(path = %summary_path.display(), "Run summary written");

        Ok(summary)
    }

    fn analyze_channel(
        &self,
        frame: &Frame,
        normalized: &NormalizedPositions,
        channel_config: &ChannelConfig,
    ) -> Result<ChannelAnalysis> {
        let channel = channel_config.channel;
        frame.select_positive(channel)?;
        let positions: Vec<DVec2> = frame
            .observations
            .iter()
            .zip(&normalized.positions)
            .filter(|(o, _)| o.is_positive_in(channel))
            .map(|(_, p)| *p)
            .collect();

        let assignment = dbscan(&positions, &self.config.clustering);
        let centroids = compute_centroids(&positions, &assignment);
        let distances = pair_distances(&centroids, &channel_config.pairs);
        let validity = validity_index(&positions, &assignment);

        let centroid_file = if self.config.save_centroids {
            let path = self.output_path(format!("{}_centroids.csv", channel.file_stem()));
            let points: Vec<DVec2> = centroids.values().copied().collect();
            save_centroids(&path, &points)?;
            Some(path)
        } else {
            None
        };

        let figure = self.output_path(format!("{}_clusters.svg", channel.file_stem()));
        render_cluster_figure(
            &figure,
            &ClusterFigure {
                channel,
                positions: &positions,
                assignment: &assignment,
                centroids: &centroids,
                distances: &distances,
            },
            &self.config.plot,
        )?;

        info!(
            %channel,
            positive = positions.len(),
            clusters = assignment.cluster_count(),
            noise = assignment.noise_count(),
            validity = ?validity,
            "Channel clustered"
        );

        let summary = ChannelSummary {
            channel,
            positive: positions.len(),
            noise: assignment.noise_count(),
            validity,
            clusters: summary::cluster_summaries(
                &assignment.cluster_sizes(),
                &centroids,
                &nearest_neighbor_distances(&centroids),
            ),
            distances,
            centroid_file,
            figure,
        };

        Ok(ChannelAnalysis { positions, summary })
    }

    fn output_path(&self, name: String) -> PathBuf {
        self.config.output_dir.join(name)
    }
}

fn containment_summary(diagram: &VoronoiDiagram, analyses: &[ChannelAnalysis]) -> VoronoiSummary {
    let containment = analyses
        .iter()
        .map(|a| {
            let report = diagram.check_containment(&a.positions);
            info!(
                channel = %a.summary.channel,
                inside = report.inside_count,
                total = report.total,
                percentage = format!("{:.2}", report.percentage()),
                "Voronoi containment"
            );
            ChannelContainment {
                channel: a.summary.channel,
                inside: report.inside_count,
                total: report.total,
                percentage: report.percentage(),
            }
        })
        .collect();

    VoronoiSummary::Validated {
        sites: diagram.sites().len(),
        bounded_cells: diagram.bounded_cell_count(),
        containment,
    }
}
