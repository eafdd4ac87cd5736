//! Time-series loader for per-bacterium CSV exports.
//!
//! The export has no timepoint column. Each timepoint block starts with a
//! repeated `id,x,y,...` header row, so block boundaries are inferred from
//! header repetition.

#[cfg(test)]
mod tests;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use glam::DVec2;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::observation::{Channel, Observation};

/// First field of a header row.
pub const HEADER_TOKEN: &str = "id";

/// Column names in source order.
const FIELDS: [&str; 9] = [
    "id", "x", "y", "theta", "volume", "ch1", "ch2", "ch3", "ch4",
];

/// Observations sharing one timepoint, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub observations: Vec<Observation>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations with positive intensity in `channel`, in input order.
    pub fn positive_in(&self, channel: Channel) -> Vec<&Observation> {
        self.observations
            .iter()
            .filter(|obs| obs.is_positive_in(channel))
            .collect()
    }

    /// Like [`Frame::positive_in`] but an empty selection is an error.
    pub fn select_positive(&self, channel: Channel) -> Result<Vec<&Observation>> {
        let selected = self.positive_in(channel);
        if selected.is_empty() {
            return Err(Error::EmptyChannelSelection {
                channel,
                timepoint: self.index,
            });
        }
        debug!(
            channel = %channel,
            timepoint = self.index,
            selected = selected.len(),
            total = self.len(),
            "Channel selection"
        );
        Ok(selected)
    }
}

/// All timepoints of one export.
#[derive(Debug, Clone, Default)]
pub struct FrameSet {
    frames: Vec<Frame>,
}

impl FrameSet {
    /// Load and parse a CSV export.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let frames = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            frames = frames.len(),
            "Loaded time series"
        );
        Ok(frames)
    }

    /// Parse a CSV export from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut frames = Vec::new();
        let mut current = Vec::new();
        let mut records = reader.records();

        // Row 1 is the column header whatever it contains.
        if let Some(first) = records.next() {
            first?;
        }

        for record in records {
            let record = record?;
            if is_header(&record) {
                push_frame(&mut frames, std::mem::take(&mut current));
                continue;
            }
            current.push(parse_observation(&record)?);
        }

        if !current.is_empty() {
            push_frame(&mut frames, current);
        }

        Ok(Self { frames })
    }

    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at `index`, or [`Error::IndexOutOfRange`] with the valid range.
    pub fn frame(&self, index: usize) -> Result<&Frame> {
        self.frames.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.frames.len(),
        })
    }
}

fn push_frame(frames: &mut Vec<Frame>, observations: Vec<Observation>) {
    let index = frames.len();
    debug!(index, observations = observations.len(), "Frame parsed");
    frames.push(Frame {
        index,
        observations,
    });
}

fn is_header(record: &StringRecord) -> bool {
    record.get(0) == Some(HEADER_TOKEN)
}

fn parse_observation(record: &StringRecord) -> Result<Observation> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    Ok(Observation {
        id: field(record, line, 0)?.to_string(),
        position: DVec2::new(number(record, line, 1)?, number(record, line, 2)?),
        theta: number(record, line, 3)?,
        volume: number(record, line, 4)?,
        channels: [
            number(record, line, 5)?,
            number(record, line, 6)?,
            number(record, line, 7)?,
            number(record, line, 8)?,
        ],
    })
}

fn field(record: &StringRecord, line: u64, idx: usize) -> Result<&str> {
    record.get(idx).ok_or_else(|| Error::MalformedRow {
        line,
        field: FIELDS[idx],
        value: String::new(),
    })
}

fn number(record: &StringRecord, line: u64, idx: usize) -> Result<f64> {
    let raw = field(record, line, idx)?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::MalformedRow {
            line,
            field: FIELDS[idx],
            value: raw.to_string(),
        }),
    }
}
