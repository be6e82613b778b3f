//! Command-line interface definitions and argument parsing

use clap::Parser;

use crate::model::SegmentationOptions;

/// Default dataset location (digital marketing customer behavior table)
pub const DEFAULT_SOURCE: &str =
    "https://storage.googleapis.com/dqlab-dataset/komdigi/tbl_customer.csv";

/// Customer segmentation and channel efficiency CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Dataset source: local CSV path or http(s) URL
    #[arg(short, long, default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Number of clusters for K-Means (2-6)
    #[arg(short = 'k', long, default_value = "4")]
    pub clusters: usize,

    /// RNG seed for reproducible clustering
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Maximum iterations for K-Means convergence
    #[arg(long, default_value = "300")]
    pub max_iters: u64,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Output path for the persona map plot
    #[arg(short, long, default_value = "persona_map.png")]
    pub output: String,

    /// Print the first rows of the raw dataset before analysis
    #[arg(long)]
    pub show_raw: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn segmentation_options(&self) -> SegmentationOptions {
        SegmentationOptions {
            seed: self.seed,
            max_iters: self.max_iters,
            tolerance: self.tolerance,
        }
    }
}
