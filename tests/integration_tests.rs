//! Integration tests for lsbhide
//!
//! Carriers are written to temporary files, loaded back through
//! `Carrier::load`, encoded, saved, reloaded and decoded.
//!
//! Note: decode() does not fail on a wrong depth or an empty carrier.
//! It returns garbage with a warning instead.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use lsbhide::{
    decode, decode_with_config, encode, encode_with_config, max_payload_bytes, BitDepth, Carrier,
    CarrierKind, CodecConfig, DecodeWarning, FrameMarker, Settings, StegoError, TextScan,
};
use tempfile::TempDir;

fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 17) % 256) as u8,
            ((y * 23) % 256) as u8,
            (((x + y) * 31) % 256) as u8,
        ])
    });
    img.save(path).unwrap();
}

fn write_test_wav(path: &Path, count: usize, bits_per_sample: u16, channels: u16) {
    let spec = WavSpec {
        channels,
        sample_rate: 44100,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };
    let amplitude = ((1i64 << (bits_per_sample - 1)) - 1) as f64 * 0.8;

    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..count {
        let sample = ((i as f64 * 0.05).sin() * amplitude) as i32;
        if bits_per_sample == 8 {
            writer.write_sample(sample as i8).unwrap();
        } else {
            writer.write_sample(sample).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn load(path: &Path) -> Carrier {
    let kind = CarrierKind::from_path(path).unwrap();
    Carrier::load(path, kind, &CodecConfig::default()).unwrap()
}

/// Test PNG file roundtrip at every depth
#[test]
fn test_png_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("cover.png");
    write_test_png(&cover, 64, 48);
    let carrier = load(&cover);

    for k in 1..=8 {
        let message = format!("hidden at depth {}", k);
        let encoded = encode(&carrier, message.as_bytes(), k).unwrap();

        let out = dir.path().join(format!("out{}.png", k));
        encoded.carrier.save(&out).unwrap();

        let decoded = decode(&load(&out), k).unwrap();
        assert_eq!(decoded.text(), message);
        assert!(decoded.is_complete());
    }
}

/// Test that the cover file is left untouched
#[test]
fn test_cover_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("cover.png");
    write_test_png(&cover, 32, 32);
    let before = fs::read(&cover).unwrap();

    let encoded = encode(&load(&cover), b"leave the source alone", 2).unwrap();
    encoded.carrier.save(dir.path().join("out.png")).unwrap();

    assert_eq!(fs::read(&cover).unwrap(), before);
}

/// Test that alpha is dropped and only RGB carries data
#[test]
fn test_rgba_image_is_converted() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("alpha.png");
    RgbaImage::from_pixel(10, 10, Rgba([10, 20, 30, 128]))
        .save(&cover)
        .unwrap();

    let carrier = load(&cover);
    assert_eq!(carrier.capacity(BitDepth::LEGACY), 300);

    let encoded = encode(&carrier, b"rgb only", 1).unwrap();
    let out = dir.path().join("out.png");
    encoded.carrier.save(&out).unwrap();
    assert_eq!(decode(&load(&out), 1).unwrap().payload, b"rgb only");
}

/// Test BMP output
#[test]
fn test_bmp_roundtrip() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("cover.png");
    write_test_png(&cover, 20, 20);

    let encoded = encode(&load(&cover), b"bitmap", 3).unwrap();
    let out = dir.path().join("out.bmp");
    encoded.carrier.save(&out).unwrap();

    assert_eq!(decode(&load(&out), 3).unwrap().payload, b"bitmap");
}

/// Test that writing to a lossy format is refused
#[test]
fn test_lossy_output_refused() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("cover.png");
    write_test_png(&cover, 10, 10);

    let encoded = encode(&load(&cover), b"x", 1).unwrap();
    let result = encoded.carrier.save(dir.path().join("out.jpg"));
    assert!(matches!(result, Err(StegoError::CarrierWriteFailure(_))));
}

/// Test the 10x10 image capacity boundary
#[test]
fn test_image_capacity_boundary() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("small.png");
    write_test_png(&cover, 10, 10);
    let carrier = load(&cover);

    assert_eq!(
        max_payload_bytes(&carrier.shape(), BitDepth::LEGACY, &FrameMarker::Terminator),
        35
    );
    assert!(encode(&carrier, &[b'a'; 35], 1).is_ok());
    assert!(matches!(
        encode(&carrier, &[b'a'; 36], 1),
        Err(StegoError::CapacityExceeded { .. })
    ));
}

/// Test WAV roundtrip across sample widths and depths
#[test]
fn test_wav_file_roundtrip() {
    let dir = TempDir::new().unwrap();

    for bits_per_sample in [8u16, 16, 24, 32] {
        let cover = dir.path().join(format!("cover{}.wav", bits_per_sample));
        write_test_wav(&cover, 4000, bits_per_sample, 2);
        let carrier = load(&cover);

        for k in [1u8, 2, 4, 8] {
            let message = format!("{}-bit audio at k={}", bits_per_sample, k);
            let encoded = encode(&carrier, message.as_bytes(), k).unwrap();

            let out = dir.path().join(format!("out{}_{}.wav", bits_per_sample, k));
            encoded.carrier.save(&out).unwrap();

            let decoded = decode(&load(&out), k).unwrap();
            assert_eq!(decoded.text(), message);
        }
    }
}

/// Test that the WAV header survives encoding
#[test]
fn test_wav_header_preserved() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("cover.wav");
    write_test_wav(&cover, 1000, 16, 2);

    let encoded = encode(&load(&cover), b"header", 1).unwrap();
    let out = dir.path().join("out.wav");
    encoded.carrier.save(&out).unwrap();

    let before = hound::WavReader::open(&cover).unwrap();
    let after = hound::WavReader::open(&out).unwrap();
    assert_eq!(before.spec(), after.spec());
    assert_eq!(before.len(), after.len());
}

/// Test the legacy 200-sample example
#[test]
fn test_wav_200_samples() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("short.wav");
    write_test_wav(&cover, 200, 16, 1);
    let carrier = load(&cover);

    let encoded = encode(&carrier, b"0123456789", 1).unwrap();
    assert_eq!(encoded.bits_embedded, 96);

    let out = dir.path().join("out.wav");
    encoded.carrier.save(&out).unwrap();
    assert_eq!(decode(&load(&out), 1).unwrap().payload, b"0123456789");

    assert!(matches!(
        encode(&carrier, &[b'x'; 24], 1),
        Err(StegoError::CapacityExceeded { needed: 208, capacity: 200 })
    ));
}

/// Test byte-unit audio with the sentinel marker (legacy byte-stream layout)
#[test]
fn test_wav_byte_units_with_sentinel() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("cover.wav");
    write_test_wav(&cover, 2000, 16, 1);

    let mut settings = Settings::default();
    settings.codec.audio_unit = lsbhide::AudioUnit::Byte;
    settings.codec.marker = FrameMarker::sentinel();

    let carrier = Carrier::load(&cover, CarrierKind::Audio, &settings.codec).unwrap();
    assert_eq!(carrier.capacity(BitDepth::LEGACY), 4000);

    let encoded = encode_with_config(&carrier, b"byte stream", 1, &settings.codec).unwrap();
    let out = dir.path().join("out.wav");
    encoded.carrier.save(&out).unwrap();

    let reloaded = Carrier::load(&out, CarrierKind::Audio, &settings.codec).unwrap();
    let decoded = decode_with_config(&reloaded, 1, &settings.codec).unwrap();
    assert_eq!(decoded.payload, b"byte stream");
}

/// Test text file roundtrip
#[test]
fn test_text_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("cover.txt");
    fs::write(&cover, "It was a bright cold day in April, and the clocks were striking thirteen.")
        .unwrap();

    let encoded = encode(&load(&cover), b"run", 1).unwrap();
    assert!(encoded.warnings.is_empty());

    let out = dir.path().join("out.txt");
    encoded.carrier.save(&out).unwrap();

    let decoded = decode(&load(&out), 1).unwrap();
    assert_eq!(decoded.payload, b"run");
}

/// Test the hello world text example, which grows the cover
#[test]
fn test_text_hello_world_grows() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("hello.txt");
    fs::write(&cover, "hello world").unwrap();

    let encoded = encode(&load(&cover), b"hi", 1).unwrap();
    assert_eq!(encoded.warnings.len(), 1);

    let out = dir.path().join("out.txt");
    encoded.carrier.save(&out).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap().chars().count(), 25);
    assert_eq!(decode(&load(&out), 1).unwrap().payload, b"hi");
}

/// Test loose text scanning on a cover without whitespace
#[test]
fn test_text_loose_scan() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("cover.txt");
    fs::write(&cover, "abcdefghijklmnopqrstuvwxyz").unwrap();

    let config = CodecConfig {
        text_scan: TextScan::Loose,
        ..CodecConfig::default()
    };
    let carrier = Carrier::load(&cover, CarrierKind::Text, &config).unwrap();
    let encoded = encode_with_config(&carrier, b"az", 1, &config).unwrap();
    let decoded = decode_with_config(&encoded.carrier, 1, &config).unwrap();
    assert_eq!(decoded.payload, b"az");
}

/// Test that decoding a clean carrier returns garbage with a warning
#[test]
fn test_clean_carrier_decode_warns() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("black.png");
    RgbImage::new(8, 8).save(&cover).unwrap();

    let decoded = decode(&load(&cover), 1).unwrap();
    assert_eq!(decoded.warning, Some(DecodeWarning::TerminatorNotFound));
    assert_eq!(decoded.payload.len(), 24);
}

/// Test that an unreadable file reports a read failure
#[test]
fn test_unreadable_carrier() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("bogus.png");
    fs::write(&bogus, b"not an image").unwrap();

    let result = Carrier::load(&bogus, CarrierKind::Image, &CodecConfig::default());
    assert!(matches!(result, Err(StegoError::CarrierReadFailure(_))));

    let missing = dir.path().join("missing.wav");
    let result = Carrier::load(&missing, CarrierKind::Audio, &CodecConfig::default());
    assert!(matches!(result, Err(StegoError::CarrierReadFailure(_))));
}

/// Test that settings written to disk drive the codec the same way
#[test]
fn test_settings_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut settings = Settings::default();
    settings.depth = 4;
    settings.codec.marker = FrameMarker::sentinel();
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);

    let cover = dir.path().join("cover.png");
    write_test_png(&cover, 16, 16);
    let carrier = load(&cover);
    let encoded = encode_with_config(&carrier, b"cfg", loaded.depth, &loaded.codec).unwrap();
    let decoded = decode_with_config(&encoded.carrier, loaded.depth, &loaded.codec).unwrap();
    assert_eq!(decoded.payload, b"cfg");
}
