//! Message framing: payload bytes to a flat bit sequence and back.
//!
//! Format (default): payload bytes, MSB first, followed by the 16-bit
//! terminator `1111111111111110`. Decoding searches for the first terminator
//! occurrence, truncates there and regroups the prefix into bytes.
//!
//! The terminator can also appear inside arbitrary binary payloads (for
//! instance the bytes `0xFF 0xFE`), in which case decoding stops early. It
//! cannot appear inside 7-bit ASCII text, where no run of 15 ones exists.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordered bit sequence, first bit is the most significant bit of the first byte.
pub type BitSequence = BitVec<u8, Msb0>;

/// The 16-bit end-of-message pattern.
pub const TERMINATOR: u16 = 0b1111_1111_1111_1110;

/// Width of [`TERMINATOR`] in bits.
pub const TERMINATOR_BITS: usize = 16;

/// String marker used by the sentinel framing when none is configured.
pub const DEFAULT_SENTINEL: &str = "###END###";

/// Offsets at which a terminator is accepted during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanGranularity {
    /// Only offsets that are multiples of 8 (single-bit legacy carriers).
    ByteAligned,
    /// Every bit offset (carriers written with more than one bit per unit).
    #[default]
    AnyBit,
}

impl ScanGranularity {
    fn accepts(self, offset: usize) -> bool {
        match self {
            ScanGranularity::ByteAligned => offset % 8 == 0,
            ScanGranularity::AnyBit => true,
        }
    }
}

/// How the end of the payload is marked inside the bit stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameMarker {
    /// The 16-bit [`TERMINATOR`] pattern after the last payload bit.
    #[default]
    Terminator,
    /// A string appended to the payload before bit conversion. An empty
    /// string stands for [`DEFAULT_SENTINEL`].
    Sentinel(String),
}

impl FrameMarker {
    /// Sentinel framing with [`DEFAULT_SENTINEL`].
    pub fn sentinel() -> Self {
        FrameMarker::Sentinel(DEFAULT_SENTINEL.to_string())
    }

    /// Number of bits the marker adds to a framed payload.
    pub fn bit_len(&self) -> usize {
        match self {
            FrameMarker::Terminator => TERMINATOR_BITS,
            FrameMarker::Sentinel(text) => sentinel_bytes(text).len() * 8,
        }
    }

    /// The granularity adapters should stop extracting at, if any.
    ///
    /// Sentinels are matched on whole bytes after collection, so extraction
    /// runs to the end of the carrier.
    pub fn stop_at(&self, granularity: ScanGranularity) -> Option<ScanGranularity> {
        match self {
            FrameMarker::Terminator => Some(granularity),
            FrameMarker::Sentinel(_) => None,
        }
    }
}

/// Bytes written for a sentinel; an empty sentinel means [`DEFAULT_SENTINEL`].
fn sentinel_bytes(text: &str) -> &[u8] {
    if text.is_empty() {
        DEFAULT_SENTINEL.as_bytes()
    } else {
        text.as_bytes()
    }
}

/// Result of [`unframe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unframed {
    /// Recovered bytes; best effort when the terminator was missing.
    pub payload: Vec<u8>,
    /// Whether the end marker was located.
    pub terminator_found: bool,
}

/// Appends the 8 bits of `byte`, MSB first.
pub fn push_byte(bits: &mut BitSequence, byte: u8) {
    bits.extend_from_bitslice(byte.view_bits::<Msb0>());
}

/// Serializes `payload` and appends the 16-bit terminator.
pub fn frame(payload: &[u8]) -> BitSequence {
    let mut bits = BitSequence::with_capacity(payload.len() * 8 + TERMINATOR_BITS);
    for &byte in payload {
        push_byte(&mut bits, byte);
    }
    for shift in (0..TERMINATOR_BITS).rev() {
        bits.push((TERMINATOR >> shift) & 1 == 1);
    }
    bits
}

/// Serializes `payload` with the given end marker.
pub fn frame_with(payload: &[u8], marker: &FrameMarker) -> BitSequence {
    match marker {
        FrameMarker::Terminator => frame(payload),
        FrameMarker::Sentinel(text) => {
            let sentinel = sentinel_bytes(text);
            let mut bits = BitSequence::with_capacity((payload.len() + sentinel.len()) * 8);
            for &byte in payload.iter().chain(sentinel) {
                push_byte(&mut bits, byte);
            }
            bits
        }
    }
}

/// Length in bits of a framed payload of `payload_len` bytes.
pub fn framed_len(payload_len: usize, marker: &FrameMarker) -> usize {
    payload_len * 8 + marker.bit_len()
}

/// Regroups bits into big-endian bytes, dropping an incomplete trailing group.
pub fn bytes_from_bits(bits: &BitSlice<u8, Msb0>) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| {
            chunk
                .iter()
                .by_vals()
                .fold(0u8, |byte, bit| (byte << 1) | bit as u8)
        })
        .collect()
}

/// Recovers a payload framed by [`frame`].
///
/// The terminator is searched at the offsets allowed by `granularity`. When it
/// is not found, every whole byte is returned and `terminator_found` is false.
pub fn unframe(bits: &BitSlice<u8, Msb0>, granularity: ScanGranularity) -> Unframed {
    let mut scanner = TerminatorScanner::new(granularity);
    for bit in bits.iter().by_vals() {
        if scanner.push(bit) {
            break;
        }
    }

    match scanner.found_at() {
        Some(offset) => Unframed {
            payload: bytes_from_bits(&bits[..offset]),
            terminator_found: true,
        },
        None => Unframed {
            payload: bytes_from_bits(bits),
            terminator_found: false,
        },
    }
}

/// Recovers a payload framed by [`frame_with`].
pub fn unframe_with(
    bits: &BitSlice<u8, Msb0>,
    marker: &FrameMarker,
    granularity: ScanGranularity,
) -> Unframed {
    match marker {
        FrameMarker::Terminator => unframe(bits, granularity),
        FrameMarker::Sentinel(text) => {
            let mut payload = bytes_from_bits(bits);
            let needle = sentinel_bytes(text);
            match payload.windows(needle.len()).position(|window| window == needle) {
                Some(end) => {
                    payload.truncate(end);
                    Unframed {
                        payload,
                        terminator_found: true,
                    }
                }
                None => Unframed {
                    payload,
                    terminator_found: false,
                },
            }
        }
    }
}

/// Incremental terminator search, fed one bit at a time.
///
/// Adapters use it to stop reading a carrier as soon as the message ends.
#[derive(Debug, Clone)]
pub struct TerminatorScanner {
    granularity: ScanGranularity,
    window: u16,
    seen: usize,
    found_at: Option<usize>,
}

impl TerminatorScanner {
    pub fn new(granularity: ScanGranularity) -> Self {
        Self {
            granularity,
            window: 0,
            seen: 0,
            found_at: None,
        }
    }

    /// Feeds the next bit. Returns true once the terminator has been seen.
    pub fn push(&mut self, bit: bool) -> bool {
        if self.found_at.is_some() {
            return true;
        }

        self.window = (self.window << 1) | bit as u16;
        self.seen += 1;

        if self.seen >= TERMINATOR_BITS && self.window == TERMINATOR {
            let start = self.seen - TERMINATOR_BITS;
            if self.granularity.accepts(start) {
                self.found_at = Some(start);
                return true;
            }
        }

        false
    }

    /// Bit offset where the terminator starts, if seen.
    pub fn found_at(&self) -> Option<usize> {
        self.found_at
    }
}
