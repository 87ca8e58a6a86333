//! CSV input for sensor exports.
//!
//! The whole file is read before the dataset is returned. Structural failures
//! (unreadable file, broken CSV framing) abort the load; per-row problems are
//! skipped and counted in the [`LoadReport`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::dataset::{DatasetBuilder, LoadReport, RawRecord, SensorDataset};
use crate::error::{MalformedReason, Result};

/// Load a dataset from a CSV file.
pub fn read_csv(path: impl AsRef<Path>) -> Result<(SensorDataset, LoadReport)> {
    let path = path.as_ref();
    info!("Reading sensor data from {}", path.display());
    let file = File::open(path)?;
    from_reader(file)
}

/// Load a dataset from any CSV byte stream with a header row.
pub fn from_reader<R: Read>(reader: R) -> Result<(SensorDataset, LoadReport)> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.headers()?;

    let mut builder = DatasetBuilder::new();
    for (i, result) in rdr.deserialize::<RawRecord>().enumerate() {
        let row = i + 1;
        match result {
            Ok(raw) => builder.push(row, raw),
            Err(e) if is_row_error(&e) => builder.reject(
                row,
                MalformedReason::Undecodable {
                    message: e.to_string(),
                },
            ),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(builder.finish())
}

fn is_row_error(e: &csv::Error) -> bool {
    matches!(
        e.kind(),
        csv::ErrorKind::Deserialize { .. }
            | csv::ErrorKind::UnequalLengths { .. }
            | csv::ErrorKind::Utf8 { .. }
    )
}
