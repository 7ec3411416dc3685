//! # lsbhide - Hide data in the low bits of images, audio and text
//!
//! lsbhide writes a payload into the least-significant bits of a carrier and
//! reads it back. Encoding never touches the source: it returns a modified copy.
//!
//! ## Carriers
//!
//! - **Images** (PNG, BMP): R, G and B channels of every pixel, row-major.
//!   Holds `width * height * 3 * k` bits.
//! - **Audio** (integer PCM WAV): every sample, or every PCM byte. Holds
//!   `units * k` bits.
//! - **Text**: one tab (1) or space (0) after each cover character, 7 bits
//!   per ASCII payload character. Text grows instead of overflowing.
//!
//! `k` is the bit depth, 1 to 8. Encoder and decoder must use the same `k`;
//! a mismatch yields garbage rather than an error.
//!
//! ## Framing
//!
//! Image and audio payloads are followed by the 16-bit terminator
//! `1111111111111110`. Decoding stops at the first occurrence. A payload that
//! contains the bytes `0xFF 0xFE` is cut short there, so binary payloads
//! should avoid that sequence. A `"###END###"` sentinel can be used instead,
//! see [`FrameMarker`].
//!
//! ## Example Usage
//!
//! ```rust
//! use image::{Rgb, RgbImage};
//! use lsbhide::{decode, encode, Carrier, ImageStego};
//!
//! let pixels = RgbImage::from_pixel(10, 10, Rgb([200, 100, 50]));
//! let carrier = Carrier::Image(ImageStego::from_rgb(pixels));
//!
//! let encoded = encode(&carrier, b"meet at noon", 2).unwrap();
//! let decoded = decode(&encoded.carrier, 2).unwrap();
//!
//! assert_eq!(decoded.payload, b"meet at noon");
//! assert!(decoded.is_complete());
//! ```
//!
//! ## Modules
//!
//! - [`frame`](mod@frame): terminator framing of payload bits
//! - [`capacity`](mod@capacity): capacity accounting per carrier shape
//! - [`stego`]: the image, audio and text adapters
//! - [`codec`]: encode and decode orchestration
//! - [`config`]: codec options and the settings file

pub mod capacity;
pub mod codec;
pub mod config;
pub mod depth;
pub mod error;
pub mod frame;
pub mod stego;

pub use capacity::{capacity, max_payload_bytes, CarrierShape};
pub use codec::{
    decode, decode_with_config, encode, encode_with_config, Carrier, CarrierKind, DecodeWarning,
    Decoded, EncodeWarning, Encoded,
};
pub use config::{CodecConfig, ConfigError, Settings};
pub use depth::BitDepth;
pub use error::{Result, StegoError};
pub use frame::{frame, frame_with, unframe, unframe_with, FrameMarker, ScanGranularity, TERMINATOR};
pub use stego::{
    AudioScan, AudioStego, AudioUnit, CarrierAdapter, ImageStego, TextScan, TextStego,
};
