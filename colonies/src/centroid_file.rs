//! Centroid lists persisted as `x,y` CSV with a header line.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use glam::DVec2;
use tracing::debug;

use crate::error::{Error, Result};

const HEADER: [&str; 2] = ["x", "y"];

/// Write points, one `x,y` row each, after a header line.
///
/// Values use Rust's shortest round-trip float formatting, so reading the
/// file back reproduces the points exactly.
pub fn write_centroids<W: Write>(writer: W, points: &[DVec2]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(HEADER)?;
    for p in points {
        writer.write_record([p.x.to_string(), p.y.to_string()])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Read points written by [`write_centroids`].
pub fn read_centroids<R: Read>(reader: R) -> Result<Vec<DVec2>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let coord = |idx: usize| -> Result<f64> {
            let raw = record.get(idx).unwrap_or_default();
            raw.parse::<f64>().map_err(|_| Error::MalformedRow {
                line,
                field: HEADER[idx],
                value: raw.to_string(),
            })
        };
        points.push(DVec2::new(coord(0)?, coord(1)?));
    }
    Ok(points)
}

pub fn save_centroids(path: &Path, points: &[DVec2]) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    write_centroids(file, points)?;
    debug!(path = %path.display(), count = points.len(), "Centroids saved");
    Ok(())
}

pub fn load_centroids(path: &Path) -> Result<Vec<DVec2>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    read_centroids(file)
}
