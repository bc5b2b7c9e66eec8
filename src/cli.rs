use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pokerlens")]
#[command(about = "Identify community and hand cards in poker table captures", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Glyph template directory (overrides the config file)
    #[arg(short, long, global = true)]
    pub templates: Option<PathBuf>,

    /// JSON analysis config
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read pre-cropped region images; repeat the pair for a batch
    Analyze {
        /// Community-card region image
        #[arg(long, required = true)]
        community: Vec<PathBuf>,

        /// Hand region image, one per community image
        #[arg(long, required = true)]
        hand: Vec<PathBuf>,

        /// Root directory for per-run diagnostic images
        #[arg(short, long)]
        diagnostics: Option<PathBuf>,

        /// Write results as JSON (a file per pair, suffixed with its index for batches)
        #[arg(short, long)]
        json: Option<PathBuf>,
    },

    /// Crop full-table captures with the fixed layout, then read them
    Table {
        /// Table capture images
        #[arg(required = true)]
        screenshots: Vec<PathBuf>,

        /// Root directory for per-run diagnostic images
        #[arg(short, long)]
        diagnostics: Option<PathBuf>,
    },
}
