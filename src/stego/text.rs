//! Whitespace steganography for plain text.
//!
//! Each cover character is copied and followed by one whitespace character
//! carrying a payload bit: tab for 1, space for 0. Payload characters are
//! 7-bit ASCII, 7 bits each, MSB first. Bits left over once the cover is
//! exhausted are appended as trailing whitespace, so the text grows instead of
//! failing.
//!
//! A whitespace-only suffix always decodes as bits. Cover whitespace at the end
//! of the text is dropped when the payload reaches it, see
//! [`TextStego::whitespace_dropped_for`].

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use super::CarrierAdapter;
use crate::capacity::{CarrierShape, TEXT_BITS_PER_CHAR};
use crate::depth::BitDepth;
use crate::error::{Result, StegoError};
use crate::frame::{BitSequence, ScanGranularity};

/// Whitespace character encoding a 1 bit.
pub const BIT_ONE: char = '\t';

/// Whitespace character encoding a 0 bit.
pub const BIT_ZERO: char = ' ';

/// How bits are read back from an encoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextScan {
    /// Reads (cover character, bit character) pairs, so whitespace that
    /// belongs to the cover is skipped.
    #[default]
    Interleaved,
    /// Every tab and space is a bit, wherever it appears.
    Loose,
}

fn is_bit_char(c: char) -> bool {
    c == BIT_ONE || c == BIT_ZERO
}

fn bit_char(bit: bool) -> char {
    if bit {
        BIT_ONE
    } else {
        BIT_ZERO
    }
}

/// Converts a payload to 7 bits per byte.
///
/// Fails with [`StegoError::UnsupportedCharacter`] on any byte above 127.
pub fn payload_bits(payload: &[u8]) -> Result<BitSequence> {
    let mut bits = BitSequence::with_capacity(payload.len() * TEXT_BITS_PER_CHAR);
    for (position, &byte) in payload.iter().enumerate() {
        if !byte.is_ascii() {
            return Err(StegoError::UnsupportedCharacter { byte, position });
        }
        bits.extend_from_bitslice(&byte.view_bits::<Msb0>()[1..]);
    }
    Ok(bits)
}

/// Regroups bits into 7-bit characters, dropping an incomplete trailing group.
pub fn payload_from_bits(bits: &BitSlice<u8, Msb0>) -> Vec<u8> {
    bits.chunks_exact(TEXT_BITS_PER_CHAR)
        .map(|chunk| {
            chunk
                .iter()
                .by_vals()
                .fold(0u8, |byte, bit| (byte << 1) | bit as u8)
        })
        .collect()
}

/// Text steganography handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStego {
    text: String,
    chars: usize,
    scan: TextScan,
}

impl TextStego {
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let chars = text.chars().count();
        Self {
            text,
            chars,
            scan: TextScan::default(),
        }
    }

    /// Selects how [`extract`](CarrierAdapter::extract) reads bits back.
    pub fn with_scan(mut self, scan: TextScan) -> Self {
        self.scan = scan;
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of characters in the text.
    pub fn char_count(&self) -> usize {
        self.chars
    }

    /// Length of the tab and space run at the end of the text.
    pub fn trailing_whitespace(&self) -> usize {
        self.text.chars().rev().take_while(|&c| is_bit_char(c)).count()
    }

    /// Trailing cover characters that [`embed`](CarrierAdapter::embed) drops
    /// for a stream of `bit_count` bits.
    ///
    /// Once the bits reach the trailing whitespace run, that run would be read
    /// back as payload bits, so it is removed from the cover.
    pub fn whitespace_dropped_for(&self, bit_count: usize) -> usize {
        let trailing = self.trailing_whitespace();
        if trailing > 0 && bit_count >= self.chars - trailing {
            trailing
        } else {
            0
        }
    }

    fn interleaved_bits(&self) -> BitSequence {
        let chars: Vec<char> = self.text.chars().collect();
        // Start of the whitespace-only suffix: all trailing payload bits.
        let tail = chars
            .iter()
            .rposition(|&c| !is_bit_char(c))
            .map_or(0, |last| last + 1);

        let mut bits = BitSequence::new();
        let mut index = 0;
        while index < chars.len() {
            if index >= tail {
                bits.extend(chars[index..].iter().map(|&c| c == BIT_ONE));
                break;
            }

            // chars[index] is a cover character, its bit follows.
            match chars.get(index + 1) {
                Some(&c) if is_bit_char(c) => {
                    bits.push(c == BIT_ONE);
                    index += 2;
                }
                _ => break,
            }
        }
        bits
    }

    fn loose_bits(&self) -> BitSequence {
        self.text
            .chars()
            .filter(|&c| is_bit_char(c))
            .map(|c| c == BIT_ONE)
            .collect()
    }
}

impl CarrierAdapter for TextStego {
    fn shape(&self) -> CarrierShape {
        CarrierShape::Text { chars: self.chars }
    }

    /// Interleaves `bits` after the cover characters. `depth` is ignored.
    fn embed(&self, bits: &BitSlice<u8, Msb0>, _depth: BitDepth) -> Result<Self> {
        let dropped = self.whitespace_dropped_for(bits.len());
        if dropped > 0 {
            log::debug!("text: dropping {} trailing cover whitespace characters", dropped);
        }

        let mut output = String::with_capacity(self.text.len() + bits.len());
        let mut remaining = bits.iter().by_vals();

        for c in self.text.chars().take(self.chars - dropped) {
            output.push(c);
            if let Some(bit) = remaining.next() {
                output.push(bit_char(bit));
            }
        }
        let overflow: String = remaining.map(bit_char).collect();
        if !overflow.is_empty() {
            log::debug!("text: {} bits appended after the cover", overflow.len());
            output.push_str(&overflow);
        }

        Ok(Self::from_text(output).with_scan(self.scan))
    }

    /// Collects whitespace bits. Text carries no terminator, so `stop` is ignored.
    fn extract(&self, _depth: BitDepth, _stop: Option<ScanGranularity>) -> BitSequence {
        match self.scan {
            TextScan::Interleaved => self.interleaved_bits(),
            TextScan::Loose => self.loose_bits(),
        }
    }
}
