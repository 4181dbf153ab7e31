//! Kiln - real-time platform loop runner
//!
//! Runs the built-in test pattern under the platform loop.
//!
//! # Usage
//!
//! ```bash
//! kiln
//! kiln --width 960 --height 540
//! kiln --update-hz 60
//! ```
//!
//! Close the window to quit.

use anyhow::Result;
use clap::Parser;

use kiln_shell::demo::DemoGame;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(author, version, about = "Kiln - real-time platform loop runner")]
struct Args {
    /// Window width in pixels (overrides the config file)
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels (overrides the config file)
    #[arg(long)]
    height: Option<u32>,

    /// Fixed update rate in Hz (overrides the config file)
    #[arg(long)]
    update_hz: Option<u32>,

    /// Output sample rate in Hz (overrides the config file)
    #[arg(long)]
    sample_rate: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = kiln_core::config::load();
    if let Some(width) = args.width {
        config.video.width = width;
    }
    if let Some(height) = args.height {
        config.video.height = height;
    }
    if let Some(update_hz) = args.update_hz {
        config.video.update_hz = update_hz;
    }
    if let Some(sample_rate) = args.sample_rate {
        config.audio.samples_per_second = sample_rate;
    }

    if config.video.update_hz == 0 || config.video.update_hz > 240 {
        anyhow::bail!("Update rate must be between 1 and 240 Hz");
    }
    if config.audio.samples_per_second < 8_000 {
        anyhow::bail!("Sample rate must be at least 8000 Hz");
    }

    tracing::info!(
        "Starting Kiln: {}x{} at {} Hz",
        config.video.width,
        config.video.height,
        config.video.update_hz
    );

    kiln_shell::run(config, DemoGame::new())
}
