//! Per-file conversion pipeline and the batch driver.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use kdam::tqdm;
use log::{info, warn};

use crate::export::write_csv_file;
use crate::pcd::read_pcd_file;

/// Runtime configuration for one batch run.
pub struct Config {
    /// Files and/or directories to search for .pcd inputs.
    pub inputs: Vec<OsString>,
    /// Destination directory, created if missing.
    pub output_dir: PathBuf,
    /// Columns to keep, in order. `None` keeps every column.
    pub fields: Option<Vec<String>>,
}

/// Outcome of a batch run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub converted: usize,
    pub failed: usize,
}

/// Converts a single .pcd file into a CSV table at `output`.
///
/// The input is decoded completely before the destination is touched, and a
/// partially written destination is removed on failure, so either a complete
/// CSV exists afterwards or none does. Returns the number of points written.
pub fn convert_file(
    input: &Path,
    output: &Path,
    fields: Option<&[String]>,
) -> anyhow::Result<usize> {
    let cloud = read_pcd_file(input)
        .with_context(|| format!("failed to decode {}", input.display()))?;

    if let Err(e) = write_csv_file(&cloud, fields, output) {
        fs::remove_file(output).ok();
        return Err(e).with_context(|| format!("failed to write {}", output.display()));
    }
    Ok(cloud.len())
}

/// Converts every .pcd file found under `config.inputs` into
/// `config.output_dir`, one CSV per input, preserving base filenames.
///
/// A failing file is logged and skipped; the rest of the batch continues.
pub fn run(config: &Config) -> anyhow::Result<Summary> {
    let files = find_pcd_files(&config.inputs);
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let mut summary = Summary::default();
    for input in tqdm!(files.into_iter()) {
        let Some(name) = input.file_name() else {
            warn!("Skipping {}: no file name", input.display());
            summary.failed += 1;
            continue;
        };
        let output = config.output_dir.join(Path::new(name).with_extension("csv"));

        match convert_file(&input, &output, config.fields.as_deref()) {
            Ok(points) => {
                info!(
                    "Converted {} ({points} points) to {}",
                    input.display(),
                    output.display()
                );
                summary.converted += 1;
            }
            Err(e) => {
                warn!("Failed to convert {}: {e:#}", input.display());
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// Expands the configured inputs to the sorted list of .pcd files.
pub fn find_pcd_files(inputs: &[OsString]) -> Vec<PathBuf> {
    let mut files = vec![];
    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            files.extend(expand_directory(path));
        } else if is_pcd_file(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}

fn is_pcd_file(p: &Path) -> bool {
    p.extension().map(|e| "pcd".eq(e)).unwrap_or(false)
}

fn expand_directory(p: &Path) -> Vec<PathBuf> {
    let mut pcd_files = vec![];
    let entries = match p.read_dir() {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list {}: {e}", p.display());
            return pcd_files;
        }
    };
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let entry = entry.path();
        if !entry.is_file() {
            // We do not recursively search
            continue;
        }
        if is_pcd_file(&entry) {
            pcd_files.push(entry);
        }
    }

    pcd_files
}
