use clap::Parser;
use std::path::PathBuf;

use ovp_native_service::{run, ServiceOptions};

/// Overlay video player native host.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Playlist file to load instead of the saved session.
    #[arg(long)]
    playlist: Option<PathBuf>,
    /// Shuffle the selection before playback starts.
    #[arg(long)]
    shuffle: bool,
    /// Play one shared queue on every display instead of per-display groups.
    #[arg(long)]
    shared: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(ServiceOptions { playlist: cli.playlist, shuffle: cli.shuffle, shared_queue: cli.shared })
        .await
}
