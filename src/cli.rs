use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Custom enum for log levels that can be used with clap's ValueEnum
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convert our custom LogLevel enum to log crate's LevelFilter
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments structure using clap derive macros
#[derive(Parser)]
#[command(name = "lumaray")]
#[command(about = "Ray cast a scene of meshes, spheres and planes into a PNG")]
pub struct Args {
    /// Scene description; a demo scene is rendered when the file does not exist
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Set the logging level (defaults to "info")
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub debug_level: LogLevel,

    /// Image width in pixels, overriding the scene file
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels, overriding the scene file
    #[arg(long)]
    pub height: Option<u32>,

    /// Output PNG path
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Render rows on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Scan every pixel for every surface instead of its screen bounds
    #[arg(long)]
    pub no_cull: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Seed of the demo scene
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// OBJ models added to the scene
    pub files: Vec<PathBuf>,
}
