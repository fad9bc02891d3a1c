use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sorter::PoseKey;

#[derive(Parser, Debug)]
#[command(name = "dropbot", version, about = "Battery sorting cell")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "dropbot.toml")]
    pub config: PathBuf,

    /// Override the configured log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pick, weigh and sort batteries until interrupted
    Sort,
    /// Run detection on the live camera and log what is seen
    Inference {
        /// Stop after this many frames
        #[arg(long)]
        frames: Option<usize>,
    },
    /// Save detected batteries as labeled training samples
    Capture(CaptureArgs),
    /// Inspect and teach arm poses
    Pose {
        #[command(subcommand)]
        action: PoseAction,
    },
    /// Log live readings of the weight sensor
    Weight {
        /// Stop after this many readings
        #[arg(long)]
        count: Option<usize>,
    },
    /// Run the sort cycle against simulated hardware
    Simulate {
        #[arg(long, default_value_t = 10)]
        cycles: usize,
        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        /// Skip the settle and release waits
        #[arg(long)]
        no_delay: bool,
    },
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Class index written into the label files
    #[arg(long)]
    pub class_id: usize,
    /// Class name used in file names
    #[arg(long)]
    pub name: String,
    /// Number of samples to save
    #[arg(long, default_value_t = 10)]
    pub count: usize,
    /// Dataset root holding images/ and labels/
    #[arg(long, value_name = "DIR", default_value = "dataset")]
    pub out: PathBuf,
    /// Pause between two samples so the battery can be repositioned
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub interval_ms: u64,
}

#[derive(Subcommand, Debug)]
pub enum PoseAction {
    /// Print every stored pose
    List,
    /// Store the arm's current pose under KEY
    Set { key: PoseKey },
    /// Log the arm's live pose
    Track,
}
