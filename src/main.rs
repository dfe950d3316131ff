//! # Nerd Clock — 5×5 binary New Year countdown
//!
//! A full-screen terminal clock that shows the seconds remaining until (or
//! elapsed since) New Year as 25 binary LEDs, optionally mirrored onto a
//! WLED strip over DDP. Settings live in a TOML file that is saved on change
//! and reloaded when edited by hand.
//!
//! ## Usage
//!   nerd-clock                          # Launch the clock
//!   nerd-clock --strip wled.local       # Also drive a 25-pixel WLED strip
//!   RUST_LOG=debug nerd-clock           # Verbose log file

mod app;
mod config;
mod engine;
mod frame;
mod palette;
mod season;
mod settings;
mod shape;
mod strip;
mod sync;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::ConfigStore;
use crate::engine::Engine;
use crate::strip::StripPort;

const FPS_MAX: u32 = 120;

#[derive(Parser, Debug)]
#[command(name = "nerd-clock", version, about = "5x5 binary New Year countdown clock")]
struct Cli {
    /// Settings file [default: ~/.config/nerd-clock/clock_config.toml]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// WLED controller to mirror the LEDs onto (DDP, port 4048 if omitted)
    #[arg(long, value_name = "HOST[:PORT]")]
    strip: Option<String>,

    /// Log file [default: ~/.config/nerd-clock/nerd-clock.log]
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Frame cap
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

/// The terminal belongs to the UI, so logs go to a file. If the file cannot
/// be opened they are dropped.
fn init_logging(path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    let file = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| OpenOptions::new().create(true).append(true).open(path));
    let _ = match file {
        Ok(file) => builder.with_writer(Mutex::new(file)).try_init(),
        Err(_) => builder.with_writer(io::sink).try_init(),
    };
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    init_logging(&cli.log_file.unwrap_or_else(config::default_log_path));
    info!(
        config = %config_path.display(),
        strip = cli.strip.as_deref().unwrap_or("none"),
        "nerd-clock starting"
    );

    let now = Instant::now();
    let engine = Engine::open(ConfigStore::new(config_path), now);
    let strip = match cli.strip {
        Some(target) => StripPort::ddp(target, now),
        None => StripPort::absent(),
    };
    let app = App::new(engine, strip, cli.fps.clamp(1, FPS_MAX), Local::now());

    let terminal = ratatui::try_init().context("Failed to initialise terminal")?;
    let result = app.run(terminal);
    ratatui::restore();

    match &result {
        Ok(()) => info!("nerd-clock exited"),
        Err(e) => error!("nerd-clock stopped: {e:#}"),
    }
    result
}
