//! lsbhide - Hide data in the low bits of images, audio and text
//!
//! A CLI tool for LSB steganography. Commands are implemented in the
//! `commands` module, one struct per subcommand.

mod commands;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use commands::{CapacityCommand, CommandExecutor, ConfigCommand, DecodeCommand, EncodeCommand};
use lsbhide::{ConfigError, Settings};

/// lsbhide - Hide data in the low bits of images, audio and text
///
/// Hides a payload in the least-significant bits of a PNG/BMP image, a WAV
/// file or a plain text file, and recovers it again.
#[derive(Parser)]
#[command(name = "lsbhide")]
#[command(version)]
#[command(about = "LSB steganography for images, audio and text")]
#[command(long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file to use instead of ~/.lsbhide/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a payload in a carrier
    Encode(EncodeCommand),

    /// Recover a hidden payload
    Decode(DecodeCommand),

    /// Show how much a carrier can hold
    Capacity(CapacityCommand),

    /// Show or initialize the settings file
    Config(ConfigCommand),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => match Settings::load() {
            Err(ConfigError::NoConfigDir) => Settings::default(),
            loaded => loaded.context("Failed to load settings")?,
        },
    };
    log::debug!("settings: {:?}", settings);

    match cli.command {
        Commands::Encode(cmd) => cmd.execute(&settings),
        Commands::Decode(cmd) => cmd.execute(&settings),
        Commands::Capacity(cmd) => cmd.execute(&settings),
        Commands::Config(mut cmd) => {
            cmd.path = cli.config;
            cmd.execute(&settings)
        }
    }
}
