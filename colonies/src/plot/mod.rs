//! SVG figures: cluster scatter plots with centroid distances, and Voronoi
//! diagrams over centroids.
//!
//! Uses the plotters SVG backend so no system fonts are needed.


use std::path::Path;

use glam::DVec2;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bounds::Bounds;
use crate::centroid::{CentroidDistance, Centroids};
use crate::clustering::{ClusterAssignment, NOISE};
use crate::error::{Error, Result};
use crate::geometry::convex_hull;
use crate::observation::Channel;
use crate::voronoi::VoronoiDiagram;

/// Image size and axis orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    /// Draw y growing downwards, as in the source microscope images.
    pub flip_y: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            flip_y: true,
        }
    }
}

impl PlotConfig {
    pub fn validate(&self) {
        assert!(
            self.width >= 100 && self.height >= 100,
            "plot size must be at least 100x100, got {}x{}",
            self.width,
            self.height
        );
    }

    fn view(&self, p: DVec2) -> (f64, f64) {
        if self.flip_y { (p.x, -p.y) } else { (p.x, p.y) }
    }

    /// Data-space bounds of `points` with a margin.
    fn data_bounds<'a>(points: impl IntoIterator<Item = &'a DVec2>) -> Bounds {
        Bounds::from_points(points)
            .unwrap_or(Bounds::new(DVec2::ZERO, DVec2::ONE))
            .padded(0.08, 1.0)
    }

    /// `data` as seen on the chart axes.
    fn view_bounds(&self, data: &Bounds) -> Bounds {
        if self.flip_y {
            Bounds::new(
                DVec2::new(data.min.x, -data.max.y),
                DVec2::new(data.max.x, -data.min.y),
            )
        } else {
            *data
        }
    }
}

pub mod colors {
    use plotters::style::RGBColor;

    use crate::observation::Channel;

    pub const NOISE: RGBColor = RGBColor(160, 160, 160);
    pub const CENTROID: RGBColor = RGBColor(220, 20, 20);
    pub const DISTANCE: RGBColor = RGBColor(30, 60, 220);
    pub const SITE: RGBColor = RGBColor(30, 60, 220);
    pub const EDGE: RGBColor = RGBColor(20, 20, 20);

    /// Cluster colors, cycled by label.
    pub const CLUSTERS: [RGBColor; 10] = [
        RGBColor(68, 1, 84),
        RGBColor(59, 82, 139),
        RGBColor(33, 145, 140),
        RGBColor(94, 201, 98),
        RGBColor(253, 231, 37),
        RGBColor(72, 40, 120),
        RGBColor(49, 104, 142),
        RGBColor(38, 130, 142),
        RGBColor(53, 183, 121),
        RGBColor(181, 222, 43),
    ];

    pub fn cluster(label: i32) -> RGBColor {
        if label < 0 {
            NOISE
        } else {
            CLUSTERS[label as usize % CLUSTERS.len()]
        }
    }

    pub fn channel(channel: Channel) -> RGBColor {
        match channel {
            Channel::Gfp => RGBColor(0, 160, 0),
            Channel::Rfp => RGBColor(220, 0, 0),
            Channel::Yfp => RGBColor(255, 140, 0),
            Channel::Cfp => RGBColor(0, 150, 200),
        }
    }
}

/// Inputs of one channel's cluster figure.
#[derive(Debug, Clone, Copy)]
pub struct ClusterFigure<'a> {
    pub channel: Channel,
    pub positions: &'a [DVec2],
    pub assignment: &'a ClusterAssignment,
    pub centroids: &'a Centroids,
    pub distances: &'a [CentroidDistance],
}

/// One channel's points in the Voronoi figure.
#[derive(Debug, Clone, Copy)]
pub struct PointLayer<'a> {
    pub channel: Channel,
    pub points: &'a [DVec2],
}

fn plot_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}

/// Scatter of bacteria colored by cluster, centroid markers, and dashed
/// lines between centroid pairs annotated with their distance.
pub fn render_cluster_figure(path: &Path, figure: &ClusterFigure, config: &PlotConfig) -> Result<()> {
    let data_bounds =
        PlotConfig::data_bounds(figure.positions.iter().chain(figure.centroids.values()));
    let bounds = config.view_bounds(&data_bounds);

    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "DBSCAN clustering of {}-positive bacteria with centroids",
                figure.channel
            ),
            ("sans-serif", 20),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(bounds.min.x..bounds.max.x, bounds.min.y..bounds.max.y)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("X (µm)")
        .y_desc("Y (µm)")
        .draw()
        .map_err(plot_error)?;

    // Member hull outlines, drawn first so points sit on top.
    for (&label, members) in figure.assignment.members() {
        let member_points: Vec<DVec2> = members.iter().map(|&i| figure.positions[i]).collect();
        let hull = convex_hull(&member_points);
        if hull.len() < 3 {
            continue;
        }
        let mut outline: Vec<(f64, f64)> = hull.iter().map(|p| config.view(*p)).collect();
        outline.push(outline[0]);
        let color = colors::cluster(label);
        chart
            .draw_series(std::iter::once(PathElement::new(outline, color.mix(0.5))))
            .map_err(plot_error)?;
    }

    let labels = figure.assignment.labels();
    chart
        .draw_series(
            figure
                .positions
                .iter()
                .zip(labels)
                .filter(|(_, label)| **label != NOISE)
                .map(|(p, &label)| Circle::new(config.view(*p), 3, colors::cluster(label).filled())),
        )
        .map_err(plot_error)?
        .label("Bacteria")
        .legend(|(x, y)| Circle::new((x, y), 4, colors::CLUSTERS[2].filled()));

    if figure.assignment.noise_count() > 0 {
        chart
            .draw_series(
                figure
                    .positions
                    .iter()
                    .zip(labels)
                    .filter(|(_, label)| **label == NOISE)
                    .map(|(p, _)| Circle::new(config.view(*p), 3, colors::NOISE.filled())),
            )
            .map_err(plot_error)?
            .label("Noise")
            .legend(|(x, y)| Circle::new((x, y), 4, colors::NOISE.filled()));
    }

    for distance in figure.distances {
        let (Some(a), Some(b)) = (
            figure.centroids.get(&distance.from),
            figure.centroids.get(&distance.to),
        ) else {
            continue;
        };
        let (a, b) = (config.view(*a), config.view(*b));
        let dash = (bounds.size().max_element() / 120.0).max(f64::EPSILON);
        chart
            .draw_series(
                dashes(a, b, dash)
                    .into_iter()
                    .map(|segment| PathElement::new(segment, BLACK.stroke_width(2))),
            )
            .map_err(plot_error)?;
        let middle = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
        chart
            .draw_series(std::iter::once(Text::new(
                format!("{:.2} µm", distance.distance),
                middle,
                ("sans-serif", 13).into_font().color(&colors::DISTANCE),
            )))
            .map_err(plot_error)?;
    }

    chart
        .draw_series(
            figure
                .centroids
                .values()
                .map(|c| Cross::new(config.view(*c), 8, colors::CENTROID.stroke_width(3))),
        )
        .map_err(plot_error)?
        .label("Centroids")
        .legend(|(x, y)| Cross::new((x, y), 5, colors::CENTROID.stroke_width(2)));

    chart
        .draw_series(figure.centroids.iter().map(|(label, c)| {
            Text::new(
                format!("Centroid {label}"),
                config.view(*c),
                ("sans-serif", 12).into_font().color(&colors::CENTROID),
            )
        }))
        .map_err(plot_error)?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    debug!(path = %path.display(), channel = %figure.channel, "Cluster figure written");
    Ok(())
}

/// Voronoi edges over `sites` with every channel's points overlaid.
///
/// When `diagram` is `None` (too few centroids) only sites and points are
/// drawn and the caption says why.
pub fn render_voronoi_figure(
    path: &Path,
    diagram: Option<&VoronoiDiagram>,
    sites: &[DVec2],
    layers: &[PointLayer],
    config: &PlotConfig,
) -> Result<()> {
    let data_bounds = PlotConfig::data_bounds(
        sites
            .iter()
            .chain(layers.iter().flat_map(|layer| layer.points.iter())),
    );
    let bounds = config.view_bounds(&data_bounds);

    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let caption = match diagram {
        Some(_) => "Voronoi diagram of bacteria cluster centroids".to_string(),
        None => format!(
            "Cluster centroids (Voronoi undefined for {} centroids)",
            sites.len()
        ),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(bounds.min.x..bounds.max.x, bounds.min.y..bounds.max.y)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("X (µm)")
        .y_desc("Y (µm)")
        .draw()
        .map_err(plot_error)?;

    if let Some(diagram) = diagram {
        chart
            .draw_series(diagram.edges().iter().filter_map(|edge| {
                edge.clipped(&data_bounds).map(|(a, b)| {
                    PathElement::new(vec![config.view(a), config.view(b)], colors::EDGE.stroke_width(1))
                })
            }))
            .map_err(plot_error)?;
    }

    for layer in layers {
        let color = colors::channel(layer.channel);
        chart
            .draw_series(
                layer
                    .points
                    .iter()
                    .map(|p| Circle::new(config.view(*p), 3, color.mix(0.8).filled())),
            )
            .map_err(plot_error)?
            .label(format!("Bacteria {}", layer.channel))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .draw_series(
            sites
                .iter()
                .map(|s| Circle::new(config.view(*s), 5, colors::SITE.filled())),
        )
        .map_err(plot_error)?
        .label("Voronoi points")
        .legend(|(x, y)| Circle::new((x, y), 5, colors::SITE.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    debug!(path = %path.display(), sites = sites.len(), "Voronoi figure written");
    Ok(())
}

/// Split `a..b` into dash segments of length `dash` with equal gaps.
fn dashes(a: (f64, f64), b: (f64, f64), dash: f64) -> Vec<Vec<(f64, f64)>> {
    let start = DVec2::new(a.0, a.1);
    let end = DVec2::new(b.0, b.1);
    let length = start.distance(end);
    if length <= dash {
        return vec![vec![a, b]];
    }

    let dir = (end - start) / length;
    let mut segments = Vec::new();
    let mut t = 0.0;
    while t < length {
        let from = start + dir * t;
        let to = start + dir * (t + dash).min(length);
        segments.push(vec![(from.x, from.y), (to.x, to.y)]);
        t += dash * 2.0;
    }
    segments
}
