//! CSV serialization of decoded point clouds.
//!
//! One header row of column names followed by one row per point. Integers are
//! written as plain decimals, floats as their shortest round-trip decimal
//! form (`1.0`, `100.0`, `0.001`), so re-reading the table preserves every
//! value the sensor recorded.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::pcd::{PointCloud, Scalar};

/// Errors produced while writing a point cloud as a CSV table.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The destination could not be created or written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// A requested column does not exist in this file.
    #[error("No column named {0:?} in this file")]
    UnknownField(String),
}

/// Writes the point cloud into a CSV file, overwriting the destination.
///
/// `fields` restricts and orders the columns; `None` keeps every column in
/// header order.
pub fn write_csv_file<P: AsRef<Path>>(
    cloud: &PointCloud,
    fields: Option<&[String]>,
    p: P,
) -> Result<(), ExportError> {
    let file = File::create(p)?;
    write_csv(cloud, fields, BufWriter::new(file))
}

/// Writes the point cloud as CSV rows into the provided writer.
pub fn write_csv<W: Write>(
    cloud: &PointCloud,
    fields: Option<&[String]>,
    writer: W,
) -> Result<(), ExportError> {
    let columns = cloud.header().columns();
    let selected = match fields {
        Some(wanted) => {
            let mut indices = Vec::with_capacity(wanted.len());
            for name in wanted {
                let index = columns
                    .iter()
                    .position(|column| column == name)
                    .ok_or_else(|| ExportError::UnknownField(name.clone()))?;
                indices.push(index);
            }
            indices
        }
        None => (0..columns.len()).collect(),
    };

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(selected.iter().map(|&index| columns[index].as_str()))?;
    for row in cloud.rows() {
        let record: Vec<Scalar> = selected.iter().map(|&index| row[index]).collect();
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
