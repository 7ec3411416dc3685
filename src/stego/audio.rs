//! LSB steganography for audio files.
//!
//! Hides data in the low bits of uncompressed PCM WAV audio. The WAV header
//! (sample rate, channel count, sample width) is passed through unchanged.
//!
//! Two addressing modes are available, see [`AudioUnit`]. Channels are not
//! separated: interleaved samples form one flat stream.

use bitvec::prelude::*;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use super::{lsb, CarrierAdapter};
use crate::capacity::{ensure_fits, CarrierShape};
use crate::depth::BitDepth;
use crate::error::{Result, StegoError};
use crate::frame::{BitSequence, ScanGranularity};

/// Which integer units of the PCM stream carry payload bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioUnit {
    /// One unit per sample, in its stored integer form.
    #[default]
    Sample,
    /// One unit per little-endian PCM byte, every byte of every sample.
    Byte,
}

/// How the terminator is searched when extracting from audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioScan {
    /// Byte-aligned for single-bit (legacy) carriers, any bit offset otherwise.
    #[default]
    Auto,
    ByteAligned,
    AnyBit,
}

impl AudioScan {
    /// Resolves the granularity for a carrier written at `depth`.
    pub fn granularity(self, depth: BitDepth) -> ScanGranularity {
        match self {
            AudioScan::Auto if depth == BitDepth::LEGACY => ScanGranularity::ByteAligned,
            AudioScan::Auto => ScanGranularity::AnyBit,
            AudioScan::ByteAligned => ScanGranularity::ByteAligned,
            AudioScan::AnyBit => ScanGranularity::AnyBit,
        }
    }
}

/// Audio steganography handler.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStego {
    /// Audio specification (sample rate, channels, etc.)
    spec: WavSpec,
    /// Samples in stored form: offset-binary for 8-bit, two's complement otherwise.
    samples: Vec<i32>,
    unit: AudioUnit,
}

impl AudioStego {
    /// Loads a WAV file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = WavReader::open(path).map_err(|e| {
            StegoError::CarrierReadFailure(format!("{}: {}", path.display(), e))
        })?;

        Self::from_reader(reader)
    }

    /// Decodes WAV bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| StegoError::CarrierReadFailure(e.to_string()))?;

        Self::from_reader(reader)
    }

    fn from_reader<R: Read + Seek>(reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int {
            return Err(StegoError::CarrierReadFailure(format!(
                "only integer PCM WAV is supported, got {} bits {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }

        let samples: Vec<i32> = reader
            .into_samples::<i32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StegoError::CarrierReadFailure(e.to_string()))?;

        Self::from_samples(spec, samples)
    }

    /// Builds a carrier from decoded samples, as `hound` returns them.
    pub fn from_samples(spec: WavSpec, samples: Vec<i32>) -> Result<Self> {
        if !matches!(spec.bits_per_sample, 8 | 16 | 24 | 32) {
            return Err(StegoError::CarrierReadFailure(format!(
                "unsupported sample width: {} bits",
                spec.bits_per_sample
            )));
        }

        let samples = samples
            .into_iter()
            .map(|sample| to_stored(sample, spec.bits_per_sample))
            .collect();

        Ok(Self {
            spec,
            samples,
            unit: AudioUnit::default(),
        })
    }

    /// Selects how payload bits are addressed.
    pub fn with_unit(mut self, unit: AudioUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn unit(&self) -> AudioUnit {
        self.unit
    }

    /// Returns the audio specification.
    pub fn spec(&self) -> &WavSpec {
        &self.spec
    }

    /// Returns the number of samples, all channels included.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Returns the duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        let frames = self.samples.len() / self.spec.channels.max(1) as usize;
        frames as f64 / self.spec.sample_rate as f64
    }

    /// Samples as `hound` expects them for writing.
    pub fn samples(&self) -> Vec<i32> {
        self.samples
            .iter()
            .map(|&stored| from_stored(stored, self.spec.bits_per_sample))
            .collect()
    }

    fn bytes_per_sample(&self) -> usize {
        self.spec.bits_per_sample as usize / 8
    }

    fn unit_count(&self) -> usize {
        match self.unit {
            AudioUnit::Sample => self.samples.len(),
            AudioUnit::Byte => self.samples.len() * self.bytes_per_sample(),
        }
    }

    /// The PCM data section as raw little-endian bytes.
    fn pcm_bytes(&self) -> Vec<u8> {
        let width = self.bytes_per_sample();
        let mut bytes = Vec::with_capacity(self.samples.len() * width);
        for &stored in &self.samples {
            bytes.extend_from_slice(&stored.to_le_bytes()[..width]);
        }
        bytes
    }

    fn samples_from_pcm(&self, bytes: &[u8]) -> Vec<i32> {
        let width = self.bytes_per_sample();
        bytes
            .chunks_exact(width)
            .map(|chunk| {
                let mut raw = [0u8; 4];
                raw[..width].copy_from_slice(chunk);
                let value = i32::from_le_bytes(raw);
                if width == 1 {
                    value
                } else {
                    // Sign-extend from the sample width.
                    let shift = 32 - 8 * width as u32;
                    (value << shift) >> shift
                }
            })
            .collect()
    }

    /// Saves the audio to a WAV file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let writer = WavWriter::create(path, self.spec).map_err(|e| {
            StegoError::CarrierWriteFailure(format!("{}: {}", path.display(), e))
        })?;
        self.write_samples(writer)
    }

    /// Returns the audio as WAV bytes.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        {
            let writer = WavWriter::new(Cursor::new(&mut bytes), self.spec)
                .map_err(|e| StegoError::CarrierWriteFailure(e.to_string()))?;
            self.write_samples(writer)?;
        }
        Ok(bytes)
    }

    fn write_samples<W: std::io::Write + Seek>(&self, mut writer: WavWriter<W>) -> Result<()> {
        for sample in self.samples() {
            writer
                .write_sample(sample)
                .map_err(|e| StegoError::CarrierWriteFailure(e.to_string()))?;
        }

        writer
            .finalize()
            .map_err(|e| StegoError::CarrierWriteFailure(e.to_string()))
    }
}

/// 8-bit WAV stores unsigned bytes; `hound` hands them out re-centered.
fn to_stored(sample: i32, bits_per_sample: u16) -> i32 {
    if bits_per_sample == 8 {
        sample + 128
    } else {
        sample
    }
}

fn from_stored(stored: i32, bits_per_sample: u16) -> i32 {
    if bits_per_sample == 8 {
        stored - 128
    } else {
        stored
    }
}

impl CarrierAdapter for AudioStego {
    fn shape(&self) -> CarrierShape {
        CarrierShape::Audio {
            units: self.unit_count(),
        }
    }

    fn embed(&self, bits: &BitSlice<u8, Msb0>, depth: BitDepth) -> Result<Self> {
        ensure_fits(bits.len(), self.capacity(depth))?;

        let samples = match self.unit {
            AudioUnit::Sample => {
                let mut samples = self.samples.clone();
                lsb::embed(&mut samples, bits, depth);
                samples
            }
            AudioUnit::Byte => {
                let mut bytes = self.pcm_bytes();
                lsb::embed(&mut bytes, bits, depth);
                self.samples_from_pcm(&bytes)
            }
        };
        log::debug!(
            "audio: wrote {} bits at depth {} ({:?} units)",
            bits.len(),
            depth,
            self.unit
        );

        Ok(Self {
            spec: self.spec,
            samples,
            unit: self.unit,
        })
    }

    fn extract(&self, depth: BitDepth, stop: Option<ScanGranularity>) -> BitSequence {
        match self.unit {
            AudioUnit::Sample => lsb::extract(&self.samples, depth, stop),
            AudioUnit::Byte => lsb::extract(&self.pcm_bytes(), depth, stop),
        }
    }
}

/// Creates a simple test WAV audio.
#[cfg(test)]
fn create_test_audio(sample_count: usize, bits_per_sample: u16) -> AudioStego {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    let amplitude = ((1i64 << (bits_per_sample - 1)) - 1) as f64 * 0.5;

    // Generate a simple sine wave
    let samples: Vec<i32> = (0..sample_count)
        .map(|i| {
            let t = i as f64 / 44100.0;
            let freq = 440.0; // A4 note
            (f64::sin(2.0 * std::f64::consts::PI * freq * t) * amplitude) as i32
        })
        .collect();

    AudioStego::from_samples(spec, samples).unwrap()
}
