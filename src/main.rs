//! Smart mirror application: head-tracked crop windows for mirror displays.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use smart_mirror::{
    app::{AppOptions, MirrorApp},
    config::{Config, EXAMPLE_CONFIG},
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Head pose server address (host:port), overrides the configuration
    #[arg(short, long)]
    server: Option<String>,

    /// Run without a head pose server
    #[arg(long)]
    offline: bool,

    /// Still image used as the source frame (defaults to a test pattern)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Write rendered frames as PNG files into this directory
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Dump every n-th frame
    #[arg(long, default_value = "30")]
    dump_every: u64,

    /// Stop after this many frames
    #[arg(short, long)]
    frames: Option<u64>,

    /// Use the simulated optical zoom
    #[arg(short, long)]
    zoom: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Smart Mirror");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => Config::default(),
    };
    if args.zoom {
        config.view.zoom = true;
    }
    config.validate().context("Invalid configuration")?;

    let options = AppOptions {
        server: args.server,
        offline: args.offline,
        image: args.image,
        dump_dir: args.dump_dir,
        dump_every: args.dump_every,
        frames: args.frames,
    };

    // Create and run application
    let mut app = MirrorApp::new(config, options)?;
    let stats = app.run()?;
    app.shutdown();

    info!("Done after {} frames ({} overruns)", stats.frames, stats.overruns);
    Ok(())
}
