//! Error types for the steganography codec.

use thiserror::Error;

/// Errors that abort an encode or decode call.
///
/// Every variant is fatal: the output carrier is never partially written.
/// A missing terminator on decode is not an error, see
/// [`DecodeWarning`](crate::codec::DecodeWarning).
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("Payload too large for carrier: need {needed} bits, capacity is {capacity} bits")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("Invalid bit depth {0}: must be between 1 and 8")]
    InvalidBitDepth(u8),

    #[error("Unsupported character 0x{byte:02x} at payload offset {position}: text carriers only hold 7-bit ASCII")]
    UnsupportedCharacter { byte: u8, position: usize },

    #[error("Carrier read failure: {0}")]
    CarrierReadFailure(String),

    #[error("Carrier write failure: {0}")]
    CarrierWriteFailure(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, StegoError>;
