use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pcd2csv::convert::{run, Config};

/// Converts LiDAR point cloud captures (.pcd files) to per-point CSV tables
///
/// Every input file becomes one CSV file in the output directory with the
/// same base name, one column per point attribute and one row per point.
#[derive(Parser)]
struct Args {
    /// Output directory for the csv files
    #[clap(short, long)]
    output_dir: PathBuf,

    /// Columns to keep, e.g. "x,y,z,intensity". Keeps every column if unset
    #[clap(long, value_delimiter = ',')]
    fields: Option<Vec<String>>,

    /// Files or directories containing .pcd files
    inputs: Vec<OsString>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Args = Args::parse();

    let config = Config {
        inputs: args.inputs,
        output_dir: args.output_dir,
        fields: args.fields,
    };

    match run(&config) {
        Ok(summary) => {
            println!(
                "Successfully converted {} files ({} failed)",
                summary.converted, summary.failed
            );
            if summary.converted == 0 && summary.failed > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
