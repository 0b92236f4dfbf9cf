#![forbid(unsafe_code)]

//! Renders a fund card over a headless host and prints the last frame.
//!
//! ```bash
//! stardust-demo --width 320 --height 160 --frames 60 \
//!     --resize 480x160@30 --kind Project --title "Rust Compiler"
//! RUST_LOG=stardust=debug stardust-demo --realtime
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use stardust::{
    AnimationStatus, ConfigError, Dimension, FundCard, FundDescriptor, HeadlessHost,
    StardustConfig,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use web_time::Instant;

/// Stardust fund card demo
#[derive(Debug, Parser)]
#[command(name = "stardust-demo", version)]
#[command(about = "Render a stardust fund card to the terminal as text")]
struct Cli {
    /// Container width in logical pixels
    #[arg(long, default_value_t = 320.0)]
    width: f64,

    /// Container height in logical pixels
    #[arg(long, default_value_t = 160.0)]
    height: f64,

    /// Frames to run before printing
    #[arg(long, default_value_t = 30)]
    frames: u32,

    /// Resize the container before a frame: WxH@FRAME (repeatable)
    #[arg(long, value_name = "WxH@FRAME")]
    resize: Vec<ResizeStep>,

    /// Fund category, e.g. Project or Mentorship
    #[arg(long, default_value = "Project")]
    kind: String,

    #[arg(long, default_value = "Stardust")]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    /// TOML or JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pace frames against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Frame interval in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
}

/// A scheduled container resize.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeStep {
    size: Dimension,
    frame: u32,
}

impl FromStr for ResizeStep {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DemoError::InvalidResize(s.to_owned());
        let (size, frame) = s.split_once('@').ok_or_else(invalid)?;
        let (w, h) = size.split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: f64 = w.trim().parse().map_err(|_| invalid())?;
        let height: f64 = h.trim().parse().map_err(|_| invalid())?;
        let frame: u32 = frame.trim().parse().map_err(|_| invalid())?;
        Ok(Self {
            size: Dimension::new(width, height),
            frame,
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("invalid resize {0:?}, expected WxH@FRAME")]
    InvalidResize(String),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<Vec<String>, DemoError> {
    let config = match &cli.config {
        Some(path) => StardustConfig::load_file(path)?,
        None => StardustConfig::default(),
    };
    let style = config.to_card_style();
    let (cell_width, cell_height) = (style.cell_width, style.cell_height);

    let host = HeadlessHost::new();
    let container = host.layout.mount(Dimension::new(cli.width, cli.height));
    let fund = FundDescriptor::new(cli.kind.as_str(), cli.title, cli.description);
    let mut card = FundCard::new(fund)
        .params(config.to_animator_params())
        .style(style);

    let status = card.mount(container, &host.runtime);
    info!(?status, %container, palette = %config.palette(), "card mounted");

    let mut size = Dimension::new(cli.width, cli.height);
    let interval = Duration::from_millis(cli.frame_ms);
    let start = Instant::now();
    let mut last = start;
    for frame in 1..=cli.frames {
        for step in cli.resize.iter().filter(|s| s.frame == frame) {
            size = step.size;
            host.layout.resize(container, size);
        }
        let delta = if cli.realtime {
            let deadline = interval * frame;
            if let Some(wait) = deadline.checked_sub(start.elapsed()) {
                std::thread::sleep(wait);
            }
            let now = Instant::now();
            let delta = now - last;
            last = now;
            delta
        } else {
            interval
        };
        host.step(delta);
    }

    let (cols, rows) = size.to_cells(cell_width, cell_height);
    let lines = host.snapshot(&card, cols, rows).to_lines();
    if let (AnimationStatus::Running, Some(animation)) = (card.status(), card.animation()) {
        info!(
            frames = animation.frames_rendered(),
            particles = animation.particle_count(),
            regenerations = animation.regenerations(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "demo finished"
        );
    }
    card.unmount();
    Ok(lines)
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "stardust demo failed");
            ExitCode::FAILURE
        }
    }
}
