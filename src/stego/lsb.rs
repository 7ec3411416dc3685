//! Shared LSB kernel for carriers made of flat integer units.
//!
//! Image channels and audio samples (or PCM bytes) are all addressed the same
//! way: units in order, the low `k` bits of each unit carry the next `k` bits
//! of the stream, MSB first.

use bitvec::prelude::*;

use crate::depth::BitDepth;
use crate::frame::{BitSequence, ScanGranularity, TerminatorScanner};

/// An integer carrier unit whose low bits can be read and overwritten.
pub trait LsbUnit: Copy {
    /// The low `depth` bits of the unit.
    fn low_bits(self, depth: BitDepth) -> u8;

    /// The unit with its low `depth` bits replaced by `bits`.
    fn with_low_bits(self, depth: BitDepth, bits: u8) -> Self;
}

impl LsbUnit for u8 {
    fn low_bits(self, depth: BitDepth) -> u8 {
        self & depth.mask()
    }

    fn with_low_bits(self, depth: BitDepth, bits: u8) -> Self {
        (self & !depth.mask()) | (bits & depth.mask())
    }
}

impl LsbUnit for i32 {
    fn low_bits(self, depth: BitDepth) -> u8 {
        (self & depth.mask() as i32) as u8
    }

    fn with_low_bits(self, depth: BitDepth, bits: u8) -> Self {
        let mask = depth.mask() as i32;
        (self & !mask) | (bits as i32 & mask)
    }
}

/// Writes `bits` into `units`, `depth` bits per unit.
///
/// The last chunk is right-padded with zero bits when fewer than `depth` bits
/// remain. Units past the end of the stream are left untouched. Returns the
/// number of units modified. Callers check capacity beforehand.
pub fn embed<U: LsbUnit>(units: &mut [U], bits: &BitSlice<u8, Msb0>, depth: BitDepth) -> usize {
    let k = usize::from(depth);
    let mut touched = 0;

    for (unit, chunk) in units.iter_mut().zip(bits.chunks(k)) {
        let value = chunk
            .iter()
            .by_vals()
            .fold(0u8, |acc, bit| (acc << 1) | bit as u8);
        let value = value << (k - chunk.len());

        *unit = unit.with_low_bits(depth, value);
        touched += 1;
    }

    touched
}

/// Reads the low `depth` bits of each unit, in order.
///
/// With `stop` set, reading ends right after the terminator is seen at that
/// granularity; otherwise every unit is read.
pub fn extract<U: LsbUnit>(
    units: &[U],
    depth: BitDepth,
    stop: Option<ScanGranularity>,
) -> BitSequence {
    let k = usize::from(depth);
    let mut bits = BitSequence::new();
    let mut scanner = stop.map(TerminatorScanner::new);

    for unit in units {
        let value = unit.low_bits(depth);
        for shift in (0..k).rev() {
            let bit = (value >> shift) & 1 == 1;
            bits.push(bit);

            if let Some(scanner) = scanner.as_mut() {
                if scanner.push(bit) {
                    return bits;
                }
            }
        }
    }

    bits
}
