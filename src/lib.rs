//! Converts LiDAR point cloud captures stored in the PCD v0.7 file format
//! into per-point CSV tables for downstream crop phenotyping analysis.
//!
//! The crate is a small linear pipeline:
//! - [`pcd`] decodes a .pcd file (header grammar plus the ascii, binary and
//!   binary_compressed bodies) into a [`pcd::PointCloud`];
//! - [`export`] serializes a decoded cloud as a CSV table;
//! - [`convert`] ties the two together and drives whole directories of
//!   captures, one CSV per input file.

pub mod convert;
pub mod export;
pub mod pcd;
