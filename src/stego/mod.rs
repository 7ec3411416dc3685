//! Carrier adapters for hiding bits in various carriers.
//!
//! Supports:
//! - Image LSB steganography (PNG, BMP)
//! - Audio LSB steganography (WAV)
//! - Whitespace steganography (plain text)

use bitvec::prelude::*;

use crate::capacity::CarrierShape;
use crate::depth::BitDepth;
use crate::error::Result;
use crate::frame::{BitSequence, ScanGranularity};

pub mod audio;
pub mod image;
pub mod lsb;
pub mod text;

pub use audio::{AudioScan, AudioStego, AudioUnit};
pub use image::ImageStego;
pub use text::{TextScan, TextStego};

/// The embed/extract contract shared by every carrier type.
///
/// Adapters never mutate `self`: `embed` returns a new carrier.
pub trait CarrierAdapter: Sized {
    /// Shape of the carrier, the only input to capacity.
    fn shape(&self) -> CarrierShape;

    /// Maximum number of bits this carrier holds at `depth`.
    fn capacity(&self, depth: BitDepth) -> usize {
        self.shape().capacity(depth)
    }

    /// Writes `bits` into a copy of the carrier.
    fn embed(&self, bits: &BitSlice<u8, Msb0>, depth: BitDepth) -> Result<Self>;

    /// Collects embedded bits, stopping at the terminator when `stop` is set.
    fn extract(&self, depth: BitDepth, stop: Option<ScanGranularity>) -> BitSequence;
}
