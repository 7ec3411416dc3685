//! Bit depth: how many low-order bits of each carrier unit are overwritten.

use std::fmt;

use crate::error::StegoError;

/// Number of low bits used per carrier unit, always in `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitDepth(u8);

impl BitDepth {
    /// Smallest depth, also the legacy single-bit audio mode.
    pub const LEGACY: BitDepth = BitDepth(1);

    /// Largest depth: the whole unit is replaced.
    pub const MAX: BitDepth = BitDepth(8);

    /// Validates `k` and wraps it.
    pub fn new(k: u8) -> Result<Self, StegoError> {
        if (1..=8).contains(&k) {
            Ok(Self(k))
        } else {
            Err(StegoError::InvalidBitDepth(k))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Mask selecting the low `k` bits, `2^k - 1`.
    pub fn mask(self) -> u8 {
        (((1u16) << self.0) - 1) as u8
    }

    /// Iterates over every valid depth, 1 through 8.
    pub fn all() -> impl Iterator<Item = BitDepth> {
        (1..=8).map(BitDepth)
    }
}

impl Default for BitDepth {
    fn default() -> Self {
        Self::LEGACY
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = StegoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BitDepth> for usize {
    fn from(depth: BitDepth) -> Self {
        depth.0 as usize
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
