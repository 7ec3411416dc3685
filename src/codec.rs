//! Encode and decode entry points.
//!
//! The orchestrator validates the bit depth, frames the payload, checks
//! capacity and hands the bits to the carrier's adapter. Decoding runs the
//! same steps in reverse. The source carrier is never modified: encoding
//! returns a new [`Carrier`].

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::capacity::{ensure_fits, CarrierShape};
use crate::config::CodecConfig;
use crate::depth::BitDepth;
use crate::error::{Result, StegoError};
use crate::frame::{frame_with, framed_len, unframe_with, FrameMarker, ScanGranularity};
use crate::stego::text::{payload_bits, payload_from_bits};
use crate::stego::{AudioStego, CarrierAdapter, ImageStego, TextStego};

/// The three supported carrier types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind {
    Image,
    Audio,
    Text,
}

impl CarrierKind {
    /// Guesses the kind from a file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" | "bmp" => Some(CarrierKind::Image),
            "wav" | "wave" => Some(CarrierKind::Audio),
            "txt" | "text" | "md" => Some(CarrierKind::Text),
            _ => None,
        }
    }
}

impl FromStr for CarrierKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(CarrierKind::Image),
            "audio" => Ok(CarrierKind::Audio),
            "text" => Ok(CarrierKind::Text),
            other => Err(format!(
                "unknown carrier kind '{}', expected image, audio or text",
                other
            )),
        }
    }
}

impl fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarrierKind::Image => write!(f, "image"),
            CarrierKind::Audio => write!(f, "audio"),
            CarrierKind::Text => write!(f, "text"),
        }
    }
}

/// A loaded carrier of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Carrier {
    Image(ImageStego),
    Audio(AudioStego),
    Text(TextStego),
}

impl Carrier {
    /// Loads a carrier file, applying the unit and scan options in `config`.
    pub fn load<P: AsRef<Path>>(path: P, kind: CarrierKind, config: &CodecConfig) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading {} carrier from {}", kind, path.display());

        let carrier = match kind {
            CarrierKind::Image => Carrier::Image(ImageStego::from_file(path)?),
            CarrierKind::Audio => {
                Carrier::Audio(AudioStego::from_file(path)?.with_unit(config.audio_unit))
            }
            CarrierKind::Text => {
                let text = fs::read_to_string(path).map_err(|e| {
                    StegoError::CarrierReadFailure(format!("{}: {}", path.display(), e))
                })?;
                Carrier::Text(TextStego::from_text(text).with_scan(config.text_scan))
            }
        };
        Ok(carrier)
    }

    /// Writes the carrier to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        match self {
            Carrier::Image(image) => image.save(path),
            Carrier::Audio(audio) => audio.save(path),
            Carrier::Text(text) => fs::write(path, text.as_str()).map_err(|e| {
                StegoError::CarrierWriteFailure(format!("{}: {}", path.display(), e))
            }),
        }
    }

    pub fn kind(&self) -> CarrierKind {
        match self {
            Carrier::Image(_) => CarrierKind::Image,
            Carrier::Audio(_) => CarrierKind::Audio,
            Carrier::Text(_) => CarrierKind::Text,
        }
    }

    pub fn shape(&self) -> CarrierShape {
        match self {
            Carrier::Image(image) => image.shape(),
            Carrier::Audio(audio) => audio.shape(),
            Carrier::Text(text) => text.shape(),
        }
    }

    /// Bits the carrier can hold at `depth`.
    pub fn capacity(&self, depth: BitDepth) -> usize {
        self.shape().capacity(depth)
    }
}

impl From<ImageStego> for Carrier {
    fn from(image: ImageStego) -> Self {
        Carrier::Image(image)
    }
}

impl From<AudioStego> for Carrier {
    fn from(audio: AudioStego) -> Self {
        Carrier::Audio(audio)
    }
}

impl From<TextStego> for Carrier {
    fn from(text: TextStego) -> Self {
        Carrier::Text(text)
    }
}

/// Non-fatal conditions noticed while encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeWarning {
    /// The payload needed more bits than the cover text has characters, so
    /// the extra bits were appended as trailing whitespace.
    TextCarrierGrown { payload_bits: usize, cover_chars: usize },
    /// The cover text ended in tabs or spaces that the payload reached; they
    /// were removed so they are not read back as payload bits.
    TrailingWhitespaceDropped { chars: usize },
}

impl fmt::Display for EncodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeWarning::TextCarrierGrown {
                payload_bits,
                cover_chars,
            } => write!(
                f,
                "payload needs {} bits but the cover text has {} characters; {} bits were appended as trailing whitespace",
                payload_bits,
                cover_chars,
                payload_bits - cover_chars
            ),
            EncodeWarning::TrailingWhitespaceDropped { chars } => write!(
                f,
                "removed {} trailing whitespace characters from the cover text",
                chars
            ),
        }
    }
}

/// Non-fatal conditions noticed while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeWarning {
    /// No end marker was found; the payload holds every extracted byte.
    TerminatorNotFound,
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::TerminatorNotFound => write!(
                f,
                "no end marker found; the output may be garbage or the carrier holds no message"
            ),
        }
    }
}

/// Result of a successful encode.
#[derive(Debug, Clone)]
pub struct Encoded {
    /// The modified copy of the carrier.
    pub carrier: Carrier,
    /// Bits written, including framing.
    pub bits_embedded: usize,
    /// Capacity at the requested depth, after any cover whitespace was dropped.
    pub capacity: usize,
    pub warnings: Vec<EncodeWarning>,
}

/// Result of a decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub payload: Vec<u8>,
    pub warning: Option<DecodeWarning>,
}

impl Decoded {
    /// Whether the payload was delimited by its end marker.
    pub fn is_complete(&self) -> bool {
        self.warning.is_none()
    }

    /// The payload as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Hides `payload` in a copy of `carrier` at `k` bits per unit, with default options.
pub fn encode(carrier: &Carrier, payload: &[u8], k: u8) -> Result<Encoded> {
    encode_with_config(carrier, payload, k, &CodecConfig::default())
}

/// Hides `payload` in a copy of `carrier` at `k` bits per unit.
///
/// Fails with [`StegoError::InvalidBitDepth`] unless `1 <= k <= 8`, and with
/// [`StegoError::CapacityExceeded`] when the framed payload does not fit an
/// image or audio carrier. Text carriers grow instead and report
/// [`EncodeWarning::TextCarrierGrown`].
pub fn encode_with_config(
    carrier: &Carrier,
    payload: &[u8],
    k: u8,
    config: &CodecConfig,
) -> Result<Encoded> {
    let depth = BitDepth::new(k)?;
    log::debug!(
        "encode: {} byte payload into {} at depth {}",
        payload.len(),
        carrier.shape(),
        depth
    );

    match carrier {
        Carrier::Image(image) => embed_framed(image, payload, depth, &config.marker),
        Carrier::Audio(audio) => {
            embed_framed(&*audio_in_unit(audio, config), payload, depth, &config.marker)
        }
        Carrier::Text(text) => embed_text(text, payload, depth),
    }
}

fn embed_framed<A>(adapter: &A, payload: &[u8], depth: BitDepth, marker: &FrameMarker) -> Result<Encoded>
where
    A: CarrierAdapter + Into<Carrier>,
{
    let capacity = adapter.capacity(depth);
    ensure_fits(framed_len(payload.len(), marker), capacity)?;

    let bits = frame_with(payload, marker);
    let carrier = adapter.embed(&bits, depth)?.into();
    log::info!("embedded {} of {} available bits", bits.len(), capacity);

    Ok(Encoded {
        carrier,
        bits_embedded: bits.len(),
        capacity,
        warnings: Vec::new(),
    })
}

/// The audio carrier addressed in the unit `config` selects.
fn audio_in_unit<'a>(audio: &'a AudioStego, config: &CodecConfig) -> Cow<'a, AudioStego> {
    if audio.unit() == config.audio_unit {
        Cow::Borrowed(audio)
    } else {
        log::debug!("audio: switching units to {:?}", config.audio_unit);
        Cow::Owned(audio.clone().with_unit(config.audio_unit))
    }
}

fn embed_text(text: &TextStego, payload: &[u8], depth: BitDepth) -> Result<Encoded> {
    let bits = payload_bits(payload)?;

    let mut warnings = Vec::new();
    let dropped = text.whitespace_dropped_for(bits.len());
    if dropped > 0 {
        log::warn!(
            "text: dropping {} trailing whitespace characters from the cover",
            dropped
        );
        warnings.push(EncodeWarning::TrailingWhitespaceDropped { chars: dropped });
    }

    let capacity = text.capacity(depth) - dropped;
    if bits.len() > capacity {
        log::warn!(
            "text: payload needs {} bits, cover has {} characters",
            bits.len(),
            capacity
        );
        warnings.push(EncodeWarning::TextCarrierGrown {
            payload_bits: bits.len(),
            cover_chars: capacity,
        });
    }

    let carrier = Carrier::Text(text.embed(&bits, depth)?);
    log::info!("embedded {} bits into {} characters", bits.len(), capacity);

    Ok(Encoded {
        carrier,
        bits_embedded: bits.len(),
        capacity,
        warnings,
    })
}

/// Recovers a payload hidden at `k` bits per unit, with default options.
pub fn decode(carrier: &Carrier, k: u8) -> Result<Decoded> {
    decode_with_config(carrier, k, &CodecConfig::default())
}

/// Recovers a payload hidden at `k` bits per unit.
///
/// A missing end marker is not an error: the whole extracted stream is
/// returned with [`DecodeWarning::TerminatorNotFound`]. Decoding with a
/// different `k` than was used to encode yields garbage, not an error.
pub fn decode_with_config(carrier: &Carrier, k: u8, config: &CodecConfig) -> Result<Decoded> {
    let depth = BitDepth::new(k)?;
    log::debug!("decode: {} at depth {}", carrier.shape(), depth);

    let decoded = match carrier {
        Carrier::Image(image) => {
            extract_framed(image, depth, ScanGranularity::AnyBit, &config.marker)
        }
        Carrier::Audio(audio) => extract_framed(
            &*audio_in_unit(audio, config),
            depth,
            config.audio_scan.granularity(depth),
            &config.marker,
        ),
        Carrier::Text(text) => Decoded {
            payload: payload_from_bits(&text.extract(depth, None)),
            warning: None,
        },
    };
    Ok(decoded)
}

fn extract_framed<A: CarrierAdapter>(
    adapter: &A,
    depth: BitDepth,
    granularity: ScanGranularity,
    marker: &FrameMarker,
) -> Decoded {
    let bits = adapter.extract(depth, marker.stop_at(granularity));
    let unframed = unframe_with(&bits, marker, granularity);

    let warning = if unframed.terminator_found {
        None
    } else {
        log::warn!("no end marker in {} extracted bits", bits.len());
        Some(DecodeWarning::TerminatorNotFound)
    };

    Decoded {
        payload: unframed.payload,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego::AudioUnit;
    use hound::{SampleFormat, WavSpec};
    use image::{Rgb, RgbImage};

    fn create_test_image(width: u32, height: u32) -> Carrier {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8])
        });
        Carrier::Image(ImageStego::from_rgb(img))
    }

    fn create_test_audio(count: usize, bits_per_sample: u16) -> AudioStego {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample,
            sample_format: SampleFormat::Int,
        };
        let amplitude = (1i32 << (bits_per_sample - 2)) - 1;
        let samples = (0..count)
            .map(|i| ((i as f64 * 0.3).sin() * amplitude as f64) as i32)
            .collect();
        AudioStego::from_samples(spec, samples).unwrap()
    }

    #[test]
    fn test_image_boundary_10x10() {
        let carrier = create_test_image(10, 10);

        // 300 bits: 35 * 8 + 16 = 296 fits, 36 * 8 + 16 = 304 does not.
        let encoded = encode(&carrier, &[b'z'; 35], 1).unwrap();
        assert_eq!(encoded.bits_embedded, 296);
        assert_eq!(encoded.capacity, 300);

        let result = encode(&carrier, &[b'z'; 36], 1);
        assert!(matches!(
            result,
            Err(StegoError::CapacityExceeded {
                needed: 304,
                capacity: 300
            })
        ));
    }

    #[test]
    fn test_one_bit_over_capacity_fails() {
        // 5x1 pixels at k=1 hold 15 bits; the bare terminator needs 16.
        let carrier = create_test_image(5, 1);
        assert!(matches!(
            encode(&carrier, b"", 1),
            Err(StegoError::CapacityExceeded {
                needed: 16,
                capacity: 15
            })
        ));
    }

    #[test]
    fn test_exact_capacity_fits() {
        // 8x1 pixels at k=1 hold 24 bits: one byte plus terminator.
        let carrier = create_test_image(8, 1);
        let encoded = encode(&carrier, b"Q", 1).unwrap();
        assert_eq!(encoded.bits_embedded, encoded.capacity);

        let decoded = decode(&encoded.carrier, 1).unwrap();
        assert_eq!(decoded.payload, b"Q");
        assert!(decoded.is_complete());
    }

    #[test]
    fn test_image_roundtrip_every_depth() {
        let carrier = create_test_image(30, 30);
        let message = b"The quick brown fox jumps over the lazy dog";

        for k in 1..=8 {
            let encoded = encode(&carrier, message, k).unwrap();
            let decoded = decode(&encoded.carrier, k).unwrap();
            assert_eq!(decoded.payload, message, "k = {}", k);
        }
    }

    #[test]
    fn test_source_carrier_unchanged() {
        let carrier = create_test_image(16, 16);
        let before = carrier.clone();
        let _ = encode(&carrier, b"secret", 3).unwrap();
        assert_eq!(carrier, before);
    }

    #[test]
    fn test_invalid_depth() {
        let carrier = create_test_image(10, 10);
        for k in [0, 9, 255] {
            assert!(matches!(
                encode(&carrier, b"x", k),
                Err(StegoError::InvalidBitDepth(d)) if d == k
            ));
            assert!(matches!(
                decode(&carrier, k),
                Err(StegoError::InvalidBitDepth(d)) if d == k
            ));
        }
    }

    #[test]
    fn test_invalid_depth_checked_for_text() {
        let carrier = Carrier::Text(TextStego::from_text("cover"));
        assert!(matches!(
            encode(&carrier, b"x", 0),
            Err(StegoError::InvalidBitDepth(0))
        ));
    }

    #[test]
    fn test_invalid_depth_checked_before_capacity() {
        let carrier = create_test_image(1, 1);
        assert!(matches!(
            encode(&carrier, &[0u8; 100], 9),
            Err(StegoError::InvalidBitDepth(9))
        ));
    }

    #[test]
    fn test_missing_terminator_is_best_effort() {
        // An all-zero image carries no terminator at any depth.
        let carrier = Carrier::Image(ImageStego::from_rgb(RgbImage::new(4, 4)));
        let decoded = decode(&carrier, 1).unwrap();

        assert_eq!(decoded.warning, Some(DecodeWarning::TerminatorNotFound));
        assert!(!decoded.is_complete());
        // 48 bits, 6 bytes, all zero.
        assert_eq!(decoded.payload, vec![0u8; 6]);
    }

    #[test]
    fn test_wrong_depth_does_not_fail() {
        let carrier = create_test_image(20, 20);
        let encoded = encode(&carrier, b"depth mismatch", 2).unwrap();

        let decoded = decode(&encoded.carrier, 3).unwrap();
        assert_ne!(decoded.payload, b"depth mismatch");
    }

    #[test]
    fn test_embedded_terminator_truncates() {
        let carrier = create_test_image(10, 10);
        let encoded = encode(&carrier, &[b'a', 0xFF, 0xFE, b'b'], 1).unwrap();

        let decoded = decode(&encoded.carrier, 1).unwrap();
        assert_eq!(decoded.payload, b"a");
        assert!(decoded.is_complete());
    }

    #[test]
    fn test_empty_payload() {
        let carrier = create_test_image(4, 4);
        let encoded = encode(&carrier, b"", 1).unwrap();
        assert_eq!(encoded.bits_embedded, 16);

        let decoded = decode(&encoded.carrier, 1).unwrap();
        assert!(decoded.payload.is_empty());
        assert!(decoded.is_complete());
    }

    #[test]
    fn test_audio_200_samples_legacy() {
        let carrier = Carrier::Audio(create_test_audio(200, 16));
        let message = b"0123456789";

        let encoded = encode(&carrier, message, 1).unwrap();
        assert_eq!(encoded.bits_embedded, 96);
        assert_eq!(encoded.capacity, 200);

        let decoded = decode(&encoded.carrier, 1).unwrap();
        assert_eq!(decoded.payload, message);
    }

    #[test]
    fn test_audio_byte_units() {
        let config = CodecConfig {
            audio_unit: AudioUnit::Byte,
            ..CodecConfig::default()
        };
        let carrier = Carrier::Audio(create_test_audio(100, 16).with_unit(AudioUnit::Byte));
        assert_eq!(carrier.capacity(BitDepth::LEGACY), 200);

        let encoded = encode_with_config(&carrier, b"bytes!", 2, &config).unwrap();
        let decoded = decode_with_config(&encoded.carrier, 2, &config).unwrap();
        assert_eq!(decoded.payload, b"bytes!");
    }

    #[test]
    fn test_config_selects_audio_unit() {
        let config = CodecConfig {
            audio_unit: AudioUnit::Byte,
            ..CodecConfig::default()
        };
        // Loaded with sample units; the config switches to bytes.
        let carrier = Carrier::Audio(create_test_audio(100, 16));

        let encoded = encode_with_config(&carrier, b"unit", 1, &config).unwrap();
        assert_eq!(encoded.capacity, 200);
        match &encoded.carrier {
            Carrier::Audio(audio) => assert_eq!(audio.unit(), AudioUnit::Byte),
            other => panic!("expected audio carrier, got {:?}", other.kind()),
        }

        let as_samples = Carrier::Audio(match encoded.carrier {
            Carrier::Audio(audio) => audio.with_unit(AudioUnit::Sample),
            _ => unreachable!(),
        });
        let decoded = decode_with_config(&as_samples, 1, &config).unwrap();
        assert_eq!(decoded.payload, b"unit");
    }

    #[test]
    fn test_audio_too_small() {
        let carrier = Carrier::Audio(create_test_audio(50, 16));
        assert!(matches!(
            encode(&carrier, b"0123456789", 1),
            Err(StegoError::CapacityExceeded {
                needed: 96,
                capacity: 50
            })
        ));
    }

    #[test]
    fn test_sentinel_marker() {
        let config = CodecConfig {
            marker: FrameMarker::sentinel(),
            ..CodecConfig::default()
        };
        let carrier = create_test_image(20, 20);

        let encoded = encode_with_config(&carrier, b"legacy framing", 1, &config).unwrap();
        assert_eq!(encoded.bits_embedded, (14 + 9) * 8);

        let decoded = decode_with_config(&encoded.carrier, 1, &config).unwrap();
        assert_eq!(decoded.payload, b"legacy framing");
        assert!(decoded.is_complete());
    }

    #[test]
    fn test_text_hello_world() {
        let carrier = Carrier::Text(TextStego::from_text("hello world"));
        let encoded = encode(&carrier, b"hi", 1).unwrap();

        assert_eq!(encoded.bits_embedded, 14);
        assert_eq!(
            encoded.warnings,
            vec![EncodeWarning::TextCarrierGrown {
                payload_bits: 14,
                cover_chars: 11
            }]
        );

        let decoded = decode(&encoded.carrier, 1).unwrap();
        assert_eq!(decoded.payload, b"hi");
        assert_eq!(decoded.text(), "hi");
    }

    #[test]
    fn test_text_cover_trailing_whitespace() {
        let carrier = Carrier::Text(TextStego::from_text("hello world "));
        let encoded = encode(&carrier, b"hi", 1).unwrap();

        assert_eq!(
            encoded.warnings,
            vec![
                EncodeWarning::TrailingWhitespaceDropped { chars: 1 },
                EncodeWarning::TextCarrierGrown {
                    payload_bits: 14,
                    cover_chars: 11
                },
            ]
        );
        assert_eq!(decode(&encoded.carrier, 1).unwrap().payload, b"hi");
    }

    #[test]
    fn test_text_fits_without_warning() {
        let carrier = Carrier::Text(TextStego::from_text("a much longer cover text"));
        let encoded = encode(&carrier, b"ok", 5).unwrap();
        assert!(encoded.warnings.is_empty());
        assert_eq!(decode(&encoded.carrier, 5).unwrap().payload, b"ok");
    }

    #[test]
    fn test_text_rejects_non_ascii() {
        let carrier = Carrier::Text(TextStego::from_text("cover text"));
        assert!(matches!(
            encode(&carrier, "ñ".as_bytes(), 1),
            Err(StegoError::UnsupportedCharacter { position: 0, .. })
        ));
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(CarrierKind::from_path("a/b.PNG"), Some(CarrierKind::Image));
        assert_eq!(CarrierKind::from_path("x.bmp"), Some(CarrierKind::Image));
        assert_eq!(CarrierKind::from_path("song.wav"), Some(CarrierKind::Audio));
        assert_eq!(CarrierKind::from_path("notes.txt"), Some(CarrierKind::Text));
        assert_eq!(CarrierKind::from_path("photo.jpg"), None);
        assert_eq!(CarrierKind::from_path("noext"), None);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Audio".parse::<CarrierKind>(), Ok(CarrierKind::Audio));
        assert!("video".parse::<CarrierKind>().is_err());
    }
}
