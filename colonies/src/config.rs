//! Run configuration, read from YAML or JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use common::SerdeFormat;

use crate::clustering::ClusterConfig;
use crate::error::{Error, Result};
use crate::normalize::NormalizationPolicy;
use crate::observation::Channel;
use crate::plot::PlotConfig;

/// One analyzed channel and the centroid pairs whose distances are reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub channel: Channel,
    #[serde(default)]
    pub pairs: Vec<(i32, i32)>,
}

impl ChannelConfig {
    pub fn new(channel: Channel, pairs: &[(i32, i32)]) -> Self {
        Self {
            channel,
            pairs: pairs.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-timepoint observation CSV.
    pub input: PathBuf,
    /// Directory receiving figures, centroid files, and the run summary.
    pub output_dir: PathBuf,
    /// Index of the analyzed frame.
    pub timepoint: usize,
    pub channels: Vec<ChannelConfig>,
    pub clustering: ClusterConfig,
    /// Factor converting raw coordinates to micrometers.
    pub unit_scale: f64,
    pub normalization: NormalizationPolicy,
    pub save_centroids: bool,
    pub plot: PlotConfig,
    /// Console and file log level when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/conteos.csv"),
            output_dir: PathBuf::from("results"),
            timepoint: 1500,
            channels: default_channels(),
            clustering: ClusterConfig::default(),
            unit_scale: 0.1,
            normalization: NormalizationPolicy::default(),
            save_centroids: true,
            plot: PlotConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

fn default_channels() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig::new(
            Channel::Gfp,
            &[
                (4, 2),
                (4, 3),
                (3, 2),
                (3, 6),
                (3, 5),
                (2, 1),
                (2, 5),
                (5, 6),
                (1, 5),
                (5, 0),
                (5, 1),
                (1, 0),
            ],
        ),
        ChannelConfig::new(
            Channel::Rfp,
            &[(3, 2), (3, 4), (3, 0), (2, 0), (0, 4), (0, 1), (1, 4)],
        ),
        ChannelConfig::new(
            Channel::Yfp,
            &[
                (4, 3),
                (4, 5),
                (4, 0),
                (3, 5),
                (3, 2),
                (5, 0),
                (5, 2),
                (2, 0),
                (0, 1),
            ],
        ),
    ]
}

impl Config {
    /// Read a config file; the format follows the extension.
    pub fn load(path: &Path) -> Result<Self> {
        let config_error = |reason: String| Error::Config {
            path: path.to_path_buf(),
            reason,
        };

        let format = SerdeFormat::from_path(path).map_err(|e| config_error(e.to_string()))?;
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        common::deserialize(&text, format).map_err(|e| config_error(e.to_string()))
    }

    /// Like [`Config::load`], but a missing file is `Ok(None)`.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_error = |reason: String| Error::Config {
            path: path.to_path_buf(),
            reason,
        };

        let format = SerdeFormat::from_path(path).map_err(|e| config_error(e.to_string()))?;
        let text = common::serialize(self, format).map_err(|e| config_error(e.to_string()))?;
        std::fs::write(path, text).map_err(|e| Error::io(path, e))
    }

    pub fn validate(&self) {
        assert!(!self.channels.is_empty(), "at least one channel must be configured");
        for (i, a) in self.channels.iter().enumerate() {
            assert!(
                self.channels[i + 1..].iter().all(|b| b.channel != a.channel),
                "channel {} is configured more than once",
                a.channel
            );
        }
        assert!(
            self.unit_scale.is_finite() && self.unit_scale > 0.0,
            "unit_scale must be positive and finite, got {}",
            self.unit_scale
        );
        self.clustering.validate();
        self.plot.validate();
    }
}
