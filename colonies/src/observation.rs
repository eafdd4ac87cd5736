//! Per-bacterium records and fluorescence channels.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Fluorescence channel, in source column order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Channel {
    Gfp,
    Rfp,
    Yfp,
    Cfp,
}

impl Channel {
    /// Index into [`Observation::channels`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Channel::Gfp => 0,
            Channel::Rfp => 1,
            Channel::Yfp => 2,
            Channel::Cfp => 3,
        }
    }

    /// Lowercase name, used for output file names.
    pub fn file_stem(self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

/// One bacterium at one timepoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub id: String,
    /// Position in raw source units.
    pub position: DVec2,
    /// Orientation angle.
    pub theta: f64,
    pub volume: f64,
    /// Intensities indexed by [`Channel::index`].
    pub channels: [f64; 4],
}

impl Observation {
    #[inline]
    pub fn intensity(&self, channel: Channel) -> f64 {
        self.channels[channel.index()]
    }

    #[inline]
    pub fn is_positive_in(&self, channel: Channel) -> bool {
        self.intensity(channel) > 0.0
    }
}
