//! Decode command - recover a hidden payload from a carrier.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lsbhide::{decode_with_config, Carrier, Settings};

use super::{CodecArgs, CommandExecutor};

/// Recover a payload hidden by `encode`.
///
/// Use the same --depth and options that were used to encode. A wrong depth
/// gives garbage, not an error.
///
/// Use -o/--output to write raw bytes to a file (required for binary data).
/// Without -o, output is printed as text (lossy UTF-8 conversion).
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Path to the encoded carrier
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// Write the raw payload to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub codec: CodecArgs,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        let (depth, config) = self.codec.resolve(settings);
        let kind = self.codec.kind_for(&self.carrier)?;

        let carrier = Carrier::load(&self.carrier, kind, &config)
            .with_context(|| format!("Failed to load carrier {}", self.carrier.display()))?;

        let decoded = decode_with_config(&carrier, depth, &config)?;
        if let Some(warning) = decoded.warning {
            eprintln!("Warning: {}", warning);
        }

        if let Some(output_path) = &self.output {
            fs::write(output_path, &decoded.payload)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!(
                "Decoded {} bytes to {}",
                decoded.payload.len(),
                output_path.display()
            );
        } else if decoded.payload.is_empty() {
            eprintln!("No hidden message found");
        } else {
            println!("{}", decoded.text());
        }
        Ok(())
    }
}
