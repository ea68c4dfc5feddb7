use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use url::Url;

use crate::scan::RiskLevel;

#[derive(Parser)]
#[command(name = "encode")]
#[command(about = "Scan food labels and get an instant health assessment")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Config file (defaults to the platform config dir, e.g. ~/.config/encode/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the history database
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep history in memory only, nothing is read from or written to disk
    #[arg(long, global = true, default_value_t = false)]
    pub ephemeral: bool,

    /// Show debug logging on stderr
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Simulate a camera scan and show the assessment
    Scan(OutputArgs),

    /// Analyze an image file from disk
    Upload(UploadArgs),

    /// Run several scans back to back
    Demo(DemoArgs),

    /// List recent scans, newest first
    History(HistoryArgs),

    /// Delete the scan history
    Clear,

    /// Run the analyze proxy server
    Serve(ServeArgs),
}

#[derive(Parser)]
pub struct OutputArgs {
    /// Output as JSON instead of a result card
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct UploadArgs {
    /// Image to analyze
    pub path: PathBuf,

    /// Output as JSON instead of a result card
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct DemoArgs {
    /// Number of scans to run
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub cycles: u32,

    /// Output as JSON instead of result cards
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct HistoryArgs {
    /// Only show entries with this risk level (low, medium, high)
    #[arg(long)]
    pub risk: Option<RiskLevel>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// file:// URL for a local image, None when there is no file at `path`.
pub fn image_reference(path: &Path) -> Option<String> {
    let path = std::fs::canonicalize(path).ok()?;
    if !path.is_file() {
        return None;
    }
    Url::from_file_path(&path).ok().map(String::from)
}

#[derive(Parser)]
pub struct ServeArgs {
    /// Address to listen on (overrides server.bind from the config file)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}
