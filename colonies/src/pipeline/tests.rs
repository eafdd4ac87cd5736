//! Tests for the analysis pipeline.

use std::path::Path;

use glam::DVec2;

use super::*;
use crate::centroid_file::load_centroids;
use crate::clustering::ClusterConfig;
use crate::normalize::NormalizationPolicy;
use crate::observation::{Channel, Observation};
use crate::testing::init_tracing;
use common::FloatExt;
use common::test_utils::test_output_dir;

const GFP_CENTERS: [DVec2; 4] = [
    DVec2::new(10.0, 10.0),
    DVec2::new(110.0, 10.0),
    DVec2::new(10.0, 110.0),
    DVec2::new(110.0, 110.0),
];
const RFP_CENTER: DVec2 = DVec2::new(60.0, 60.0);

fn observation(id: usize, position: DVec2, channels: [f64; 4]) -> Observation {
    Observation {
        id: id.to_string(),
        position,
        theta: 0.0,
        volume: 1.0,
        channels,
    }
}

/// 3x3 patch of unit-spaced positions around `center`.
fn patch(center: DVec2) -> impl Iterator<Item = DVec2> {
    (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| center + DVec2::new(dx as f64, dy as f64)))
}

/// Four GFP colonies on the corners of a square, one RFP colony in its
/// middle, a stray GFP bacterium, and one bacterium without signal.
fn colony_frame() -> Frame {
    let mut positions: Vec<(DVec2, [f64; 4])> = Vec::new();
    for center in GFP_CENTERS {
        positions.extend(patch(center).map(|p| (p, [1.0, 0.0, 0.0, 0.0])));
    }
    positions.extend(patch(RFP_CENTER).map(|p| (p, [0.0, 2.0, 0.0, 0.0])));
    positions.push((DVec2::new(300.0, 300.0), [1.0, 0.0, 0.0, 0.0]));
    positions.push((DVec2::new(200.0, 5.0), [0.0, 0.0, 0.0, 0.0]));

    Frame {
        index: 4,
        observations: positions
            .into_iter()
            .enumerate()
            .map(|(i, (p, ch))| observation(i, p, ch))
            .collect(),
    }
}

fn test_config(output_dir: &Path, channels: Vec<ChannelConfig>) -> Config {
    Config {
        output_dir: output_dir.to_path_buf(),
        channels,
        clustering: ClusterConfig::new(2.0, 3),
        unit_scale: 1.0,
        ..Config::default()
    }
}

fn gfp_and_rfp() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig::new(Channel::Gfp, &[(0, 1), (0, 3), (7, 8)]),
        ChannelConfig::new(Channel::Rfp, &[]),
    ]
}

#[test]
fn test_analyze_two_channels() {
    init_tracing();
    let dir = test_output_dir("pipeline_two_channels");
    let pipeline = Pipeline::new(test_config(&dir, gfp_and_rfp()));

    let summary = pipeline.analyze(&colony_frame()).unwrap();

    assert_eq!(summary.timepoint, 4);
    assert_eq!(summary.observations, 47);
    // Smallest x is 9 (colony edge), smallest y is 5 (signal-free bacterium).
    assert_eq!(summary.offset, DVec2::new(-9.0, -5.0));

    let gfp = summary.channel(Channel::Gfp).unwrap();
    assert_eq!(gfp.positive, 37);
    assert_eq!(gfp.clusters.len(), 4);
    assert_eq!(gfp.noise, 1);
    assert!(gfp.clusters.iter().all(|c| c.size == 9));
    assert_eq!(gfp.cluster(0).unwrap().centroid, DVec2::new(1.0, 5.0));
    assert_eq!(gfp.cluster(3).unwrap().centroid, DVec2::new(101.0, 105.0));
    let validity = gfp.validity.unwrap();
    assert!((-1.0..=1.0).contains(&validity));

    // The pair naming missing clusters is skipped.
    assert_eq!(gfp.distances.len(), 2);
    assert!(gfp.distances[0].distance.approximately_eq(100.0));
    assert!(gfp.distances[1].distance.approximately_eq(100.0 * 2f64.sqrt()));
    assert!(gfp.cluster(0).unwrap().nearest_centroid.unwrap().approximately_eq(100.0));

    let rfp = summary.channel(Channel::Rfp).unwrap();
    assert_eq!(rfp.clusters.len(), 1);
    assert_eq!(rfp.noise, 0);
    assert_eq!(rfp.validity, None);
    assert_eq!(rfp.clusters[0].centroid, DVec2::new(51.0, 55.0));
    assert_eq!(rfp.clusters[0].nearest_centroid, None);

    let VoronoiSummary::Validated {
        sites,
        bounded_cells,
        containment,
    } = &summary.voronoi
    else {
        panic!("expected a validated diagram, got {:?}", summary.voronoi);
    };
    assert_eq!(*sites, 5);
    // Only the middle site is off the hull.
    assert_eq!(*bounded_cells, 1);
    assert_eq!(containment[0].channel, Channel::Gfp);
    assert_eq!(containment[0].inside, 0);
    assert_eq!(containment[0].total, 37);
    assert_eq!(containment[1].inside, 9);
    assert_eq!(containment[1].percentage, 100.0);
}

#[test]
fn test_artifacts_written() {
    let dir = test_output_dir("pipeline_artifacts");
    let pipeline = Pipeline::new(test_config(&dir, gfp_and_rfp()));
    let summary = pipeline.analyze(&colony_frame()).unwrap();

    for name in ["gfp_clusters.svg", "rfp_clusters.svg", VORONOI_FIGURE_FILE, SUMMARY_FILE] {
        assert!(dir.join(name).is_file(), "missing {name}");
    }

    let gfp = summary.channel(Channel::Gfp).unwrap();
    let centroid_file = gfp.centroid_file.as_ref().unwrap();
    assert_eq!(centroid_file, &dir.join("gfp_centroids.csv"));
    let saved = load_centroids(centroid_file).unwrap();
    let expected: Vec<DVec2> = gfp.centroids().collect();
    assert_eq!(saved, expected);
}

#[test]
fn test_written_summary_reloads_unchanged() {
    let dir = test_output_dir("pipeline_summary_reload");
    let pipeline = Pipeline::new(test_config(&dir, gfp_and_rfp()));
    let summary = pipeline.analyze(&colony_frame()).unwrap();

    let text = std::fs::read_to_string(dir.join(SUMMARY_FILE)).unwrap();
    assert!(text.contains("label: 3"), "{text}");

    let reloaded = RunSummary::load(&dir.join(SUMMARY_FILE)).unwrap();
    assert_eq!(reloaded, summary);
}

#[test]
fn test_centroid_files_optional() {
    let dir = test_output_dir("pipeline_no_centroid_files");
    let config = Config {
        save_centroids: false,
        ..test_config(&dir, gfp_and_rfp())
    };
    let summary = Pipeline::new(config).analyze(&colony_frame()).unwrap();

    assert!(summary.channels.iter().all(|c| c.centroid_file.is_none()));
    assert!(!dir.join("gfp_centroids.csv").exists());
}

#[test]
fn test_raw_coordinates_without_normalization() {
    let dir = test_output_dir("pipeline_no_normalization");
    let config = Config {
        normalization: NormalizationPolicy::None,
        unit_scale: 0.5,
        clustering: ClusterConfig::new(1.0, 3),
        ..test_config(&dir, gfp_and_rfp())
    };
    let summary = Pipeline::new(config).analyze(&colony_frame()).unwrap();

    assert_eq!(summary.offset, DVec2::ZERO);
    let gfp = summary.channel(Channel::Gfp).unwrap();
    assert_eq!(gfp.clusters.len(), 4);
    assert_eq!(gfp.cluster(1).unwrap().centroid, DVec2::new(55.0, 5.0));
}

#[test]
fn test_channels_share_frame_offset() {
    let dir = test_output_dir("pipeline_shared_offset");
    let config = Config {
        unit_scale: 0.5,
        ..test_config(&dir, gfp_and_rfp())
    };
    let frame = colony_frame();
    let summary = Pipeline::new(config).analyze(&frame).unwrap();

    // The signal-free bacterium sets the y offset even though no channel keeps it.
    assert_eq!(summary.offset, DVec2::new(-4.5, -2.5));
    let rfp = summary.channel(Channel::Rfp).unwrap();
    assert_eq!(rfp.clusters[0].centroid, RFP_CENTER * 0.5 + summary.offset);
}

#[test]
fn test_too_few_centroids_recorded() {
    let dir = test_output_dir("pipeline_insufficient");
    let channels = vec![ChannelConfig::new(Channel::Rfp, &[])];
    let summary = Pipeline::new(test_config(&dir, channels))
        .analyze(&colony_frame())
        .unwrap();

    assert_eq!(summary.voronoi, VoronoiSummary::InsufficientCentroids { found: 1 });
    assert!(dir.join(VORONOI_FIGURE_FILE).is_file());
    assert!(dir.join(SUMMARY_FILE).is_file());
}

#[test]
fn test_empty_channel_aborts() {
    let dir = test_output_dir("pipeline_empty_channel");
    let channels = vec![
        ChannelConfig::new(Channel::Gfp, &[]),
        ChannelConfig::new(Channel::Cfp, &[]),
    ];
    let err = Pipeline::new(test_config(&dir, channels))
        .analyze(&colony_frame())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::EmptyChannelSelection {
            channel: Channel::Cfp,
            timepoint: 4
        }
    ));
    assert!(!dir.join(SUMMARY_FILE).exists());
}

#[test]
#[should_panic(expected = "eps must be positive")]
fn test_invalid_config_rejected() {
    let config = Config {
        clustering: ClusterConfig::new(-1.0, 2),
        ..Config::default()
    };
    Pipeline::new(config);
}
