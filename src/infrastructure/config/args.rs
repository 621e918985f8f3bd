use super::app_config::LogLevel;
use crate::domain::entities::CorruptCachePolicy;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "netimage",
    version,
    about = "Fetch an image through the memory, disk and network cache tiers",
    long_about = None
)]
pub struct CliArgs {
    /// Image path, relative to the base URL or absolute.
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Cache the image under this name instead of its path.
    #[arg(long, value_name = "NAME")]
    pub cache_name: Option<String>,

    /// Write the decoded image to this file.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Run the fetch inline instead of on the background runtime.
    #[arg(long)]
    pub inline: bool,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL image paths are resolved against.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Bearer token attached to downloads.
    #[arg(long, env = "NETIMAGE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Image cache directory.
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Handling of undecodable disk cache files (refetch, fail).
    #[arg(long)]
    pub corrupt_cache_policy: Option<CorruptCachePolicy>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}
