//! Encode command - hide a message or file in a carrier.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use lsbhide::{encode_with_config, Carrier, Settings};

use super::{CodecArgs, CommandExecutor};

/// Hide a payload in the low bits of an image, audio file or text.
///
/// Writes a modified copy to --output; the carrier file is never touched.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Path to the carrier file (.png, .bmp, .wav, .txt)
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// Where to write the encoded carrier
    #[arg(short, long)]
    pub output: PathBuf,

    /// Text message to hide (mutually exclusive with --file)
    #[arg(short, long, conflicts_with = "file")]
    pub message: Option<String>,

    /// File whose bytes are hidden (mutually exclusive with --message)
    #[arg(short, long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub codec: CodecArgs,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        if same_file(&self.carrier, &self.output) {
            bail!(
                "Refusing to overwrite the carrier {}. Choose a different --output",
                self.carrier.display()
            );
        }

        let payload = self.read_payload()?;
        let (depth, config) = self.codec.resolve(settings);
        let kind = self.codec.kind_for(&self.carrier)?;

        let carrier = Carrier::load(&self.carrier, kind, &config)
            .with_context(|| format!("Failed to load carrier {}", self.carrier.display()))?;

        let encoded = encode_with_config(&carrier, &payload, depth, &config)?;
        for warning in &encoded.warnings {
            eprintln!("Warning: {}", warning);
        }

        encoded
            .carrier
            .save(&self.output)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        eprintln!(
            "Hid {} bytes ({} of {} bits) in {}",
            payload.len(),
            encoded.bits_embedded,
            encoded.capacity,
            self.output.display()
        );
        Ok(())
    }
}

impl EncodeCommand {
    /// Payload from --message, --file, or stdin.
    fn read_payload(&self) -> Result<Vec<u8>> {
        if let Some(message) = &self.message {
            return Ok(message.as_bytes().to_vec());
        }
        if let Some(path) = &self.file {
            return fs::read(path)
                .with_context(|| format!("Failed to read payload file {}", path.display()));
        }

        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read payload from stdin")?;
        Ok(buffer)
    }
}

/// Whether two paths name the same file, following symlinks when both exist.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
