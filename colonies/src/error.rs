use std::path::PathBuf;

use thiserror::Error;

use crate::observation::Channel;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that terminate an analysis run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed row at line {line}: field '{field}' has invalid value '{value}'")]
    MalformedRow {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("No {channel}-positive bacteria at timepoint {timepoint}")]
    EmptyChannelSelection { channel: Channel, timepoint: usize },

    #[error(
        "Voronoi construction needs at least 4 distinct, non-collinear centroids; got {found} distinct"
    )]
    InsufficientCentroids { found: usize },

    #[error("Timepoint {index} out of range; valid range is 0..{len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration '{path}': {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    #[error("Run summary format error: {0}")]
    Summary(#[from] common::SerdeFormatError),

    #[error("Plot rendering failed: {0}")]
    Plot(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
