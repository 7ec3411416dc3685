//! Capacity accounting: how many bits a carrier can hold at a given bit depth.

use std::fmt;

use crate::depth::BitDepth;
use crate::error::{Result, StegoError};
use crate::frame::FrameMarker;

/// Color channels used per pixel (R, G, B).
pub const IMAGE_CHANNELS: usize = 3;

/// Bits carried per text payload character.
pub const TEXT_BITS_PER_CHAR: usize = 7;

/// The shape of a carrier, which is all capacity depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierShape {
    /// Pixel grid, 3 channels per pixel.
    Image { width: u32, height: u32 },
    /// Flat stream of audio units (samples or PCM bytes).
    Audio { units: usize },
    /// Cover text, one whitespace bit per character.
    Text { chars: usize },
}

impl CarrierShape {
    /// Number of addressable units in the carrier.
    pub fn units(&self) -> usize {
        match *self {
            CarrierShape::Image { width, height } => {
                width as usize * height as usize * IMAGE_CHANNELS
            }
            CarrierShape::Audio { units } => units,
            CarrierShape::Text { chars } => chars,
        }
    }

    /// Maximum number of embeddable bits. See [`capacity`].
    pub fn capacity(&self, depth: BitDepth) -> usize {
        capacity(self, depth)
    }
}

impl fmt::Display for CarrierShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarrierShape::Image { width, height } => write!(f, "image {}x{}", width, height),
            CarrierShape::Audio { units } => write!(f, "audio, {} units", units),
            CarrierShape::Text { chars } => write!(f, "text, {} characters", chars),
        }
    }
}

/// Maximum number of bits `shape` can hold at `depth`.
///
/// Image: `width * height * 3 * k`. Audio: `units * k`. Text: one bit per
/// character, `depth` is ignored.
pub fn capacity(shape: &CarrierShape, depth: BitDepth) -> usize {
    match shape {
        CarrierShape::Image { .. } | CarrierShape::Audio { .. } => {
            shape.units() * usize::from(depth)
        }
        CarrierShape::Text { chars } => *chars,
    }
}

/// Largest payload, in bytes, that fits in `shape` at `depth` with `marker` framing.
///
/// For text carriers this is the number of payload characters that fit
/// without growing the cover text.
pub fn max_payload_bytes(shape: &CarrierShape, depth: BitDepth, marker: &FrameMarker) -> usize {
    let bits = capacity(shape, depth);
    match shape {
        CarrierShape::Text { .. } => bits / TEXT_BITS_PER_CHAR,
        _ => bits.saturating_sub(marker.bit_len()) / 8,
    }
}

/// Checks that `needed` bits fit in `capacity`.
pub(crate) fn ensure_fits(needed: usize, capacity: usize) -> Result<()> {
    if needed > capacity {
        return Err(StegoError::CapacityExceeded { needed, capacity });
    }
    Ok(())
}
