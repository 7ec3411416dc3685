//! Capacity command - report how much a carrier can hold.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lsbhide::{max_payload_bytes, BitDepth, Carrier, CarrierKind, Settings};

use super::{CodecArgs, CommandExecutor};

/// Show how many payload bytes a carrier holds at each bit depth.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Path to the carrier file
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// Show every depth from 1 to 8 instead of only the selected one
    #[arg(short, long)]
    pub all: bool,

    #[command(flatten)]
    pub codec: CodecArgs,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        let (depth, config) = self.codec.resolve(settings);
        let kind = self.codec.kind_for(&self.carrier)?;

        let carrier = Carrier::load(&self.carrier, kind, &config)
            .with_context(|| format!("Failed to load carrier {}", self.carrier.display()))?;
        let shape = carrier.shape();

        println!("Carrier: {} ({})", self.carrier.display(), shape);

        if kind == CarrierKind::Text {
            let bits = shape.capacity(BitDepth::LEGACY);
            println!(
                "  {} bits, {} ASCII characters without growing the text",
                bits,
                max_payload_bytes(&shape, BitDepth::LEGACY, &config.marker)
            );
            return Ok(());
        }

        let depths: Vec<BitDepth> = if self.all {
            BitDepth::all().collect()
        } else {
            vec![BitDepth::new(depth)?]
        };

        for depth in depths {
            println!(
                "  k={}: {} bits, {} payload bytes",
                depth,
                shape.capacity(depth),
                max_payload_bytes(&shape, depth, &config.marker)
            );
        }
        Ok(())
    }
}
