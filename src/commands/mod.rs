//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.
//! Options shared by every carrier command live in [`CodecArgs`].

mod capacity;
mod config;
mod decode;
mod encode;

pub use capacity::CapacityCommand;
pub use config::ConfigCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;

use std::path::Path;

use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};

use lsbhide::{AudioScan, AudioUnit, CarrierKind, CodecConfig, FrameMarker, Settings, TextScan};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments and loaded settings.
    fn execute(&self, settings: &Settings) -> Result<()>;
}

/// Terminator search mode for audio carriers.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ScanArg {
    /// Byte-aligned at 1 bit per sample, any offset otherwise
    Auto,
    /// Only at multiples of 8 bits
    ByteAligned,
    /// At any bit offset
    AnyBit,
}

impl From<ScanArg> for AudioScan {
    fn from(scan: ScanArg) -> Self {
        match scan {
            ScanArg::Auto => AudioScan::Auto,
            ScanArg::ByteAligned => AudioScan::ByteAligned,
            ScanArg::AnyBit => AudioScan::AnyBit,
        }
    }
}

/// Carrier and framing options. Unset flags fall back to the settings file.
#[derive(Args, Debug, Clone)]
pub struct CodecArgs {
    /// Bits per carrier unit (1-8)
    #[arg(short = 'k', long)]
    pub depth: Option<u8>,

    /// Carrier type (image, audio or text); guessed from the extension if omitted
    #[arg(long)]
    pub kind: Option<CarrierKind>,

    /// End the payload with the "###END###" sentinel instead of the 16-bit terminator
    #[arg(long)]
    pub sentinel: bool,

    /// Use every PCM byte of a WAV file as a unit instead of every sample
    #[arg(long)]
    pub byte_units: bool,

    /// Terminator search mode for audio carriers
    #[arg(long, value_enum)]
    pub audio_scan: Option<ScanArg>,

    /// Treat every tab and space in a text carrier as a payload bit
    #[arg(long)]
    pub loose: bool,
}

impl CodecArgs {
    /// Merges the flags over `settings`, returning the depth and codec options.
    pub fn resolve(&self, settings: &Settings) -> (u8, CodecConfig) {
        let mut config = settings.codec.clone();
        if self.sentinel {
            config.marker = FrameMarker::sentinel();
        }
        if self.byte_units {
            config.audio_unit = AudioUnit::Byte;
        }
        if let Some(scan) = self.audio_scan {
            config.audio_scan = scan.into();
        }
        if self.loose {
            config.text_scan = TextScan::Loose;
        }

        (self.depth.unwrap_or(settings.depth), config)
    }

    /// The carrier kind for `path`, from `--kind` or the file extension.
    pub fn kind_for(&self, path: &Path) -> Result<CarrierKind> {
        self.kind
            .or_else(|| CarrierKind::from_path(path))
            .ok_or_else(|| {
                anyhow!(
                    "Cannot tell the carrier type of {}. Use --kind image|audio|text",
                    path.display()
                )
            })
    }
}
