//! Point Cloud Data (PCD)
//!
//! Decoder for the [.pcd format](https://pcl.readthedocs.io/projects/tutorials/en/master/pcd_file_format.html#pcd-file-format)
//! as written by the scanner toolchain.
//!
//! Only version 0.7 of the format is supported. All three DATA modes are
//! handled: `ascii`, `binary` and `binary_compressed`.
//!
//! # Examples
//!
//! ```no_run
//! use pcd2csv::pcd::{read_pcd_file, PcdError};
//!
//! fn main() -> Result<(), PcdError> {
//!     let cloud = read_pcd_file("frame_0001.pcd")?;
//!     println!("{} points", cloud.len());
//!     Ok(())
//! }
//! ```

mod data_types;
mod reader;

pub use data_types::*;
pub use reader::{read_pcd, read_pcd_file, read_pcd_header, PcdError};
