use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vehicle-annot")]
#[command(about = "Vehicle annotation sidecar tools: batch merge, class statistics, legacy import", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose per-file output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ~/.config/vehicle-annot/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge duplicate/fragmented same-class detections in a folder's sidecars
    Merge {
        /// Folder to process (recursive)
        #[arg(required = true)]
        folder: PathBuf,

        /// Classes to merge, comma separated (default from config)
        #[arg(short, long, value_delimiter = ',')]
        classes: Option<Vec<String>>,

        /// IoU threshold (strict lower bound)
        #[arg(long)]
        iou: Option<f64>,

        /// Center-distance factor, fraction of the smaller diagonal
        #[arg(long)]
        center_factor: Option<f64>,

        /// Report what would change without rewriting any sidecar
        #[arg(long)]
        dry_run: bool,
    },

    /// Count boxes per class across a folder's sidecars
    Count {
        /// Folder to scan (recursive)
        #[arg(required = true)]
        folder: PathBuf,
    },

    /// Create sidecars from legacy filename-encoded box lists
    Import {
        /// Folder to scan (recursive)
        #[arg(required = true)]
        folder: PathBuf,

        /// Class tokens to recognize, comma separated (default: built-in list)
        #[arg(short, long, value_delimiter = ',')]
        classes: Option<Vec<String>>,

        /// Overwrite images that already have a sidecar
        #[arg(long)]
        force: bool,
    },
}
