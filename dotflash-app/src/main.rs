use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
pub use app::App;

/// Runs one moving-dots trial in a fullscreen window.
#[derive(Debug, Clone, Parser)]
#[command(name = "dotflash", version, about)]
pub struct Args {
    /// Trial configuration (JSON). Defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Recorded trajectories to take the playback from.
    #[arg(long)]
    pub trajectories: Option<PathBuf>,

    /// Which trajectory to play back; random when omitted.
    #[arg(long, requires = "trajectories")]
    pub trajectory_index: Option<usize>,

    /// Where the trial output is written.
    #[arg(long, default_value = "trial_output.json")]
    pub output: PathBuf,

    /// Refresh rate assumed when the monitor does not report one.
    #[arg(long, default_value_t = 60.0)]
    pub refresh_hz: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let app = App::new(args)?;
    app.run()
}
