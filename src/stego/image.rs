//! LSB (Least Significant Bit) steganography for images.
//!
//! Hides data in the low bits of the R, G and B channels of every pixel,
//! row-major. Alpha is dropped on load. Output is written losslessly
//! (PNG or BMP only).

use bitvec::prelude::*;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

use super::{lsb, CarrierAdapter};
use crate::capacity::{ensure_fits, CarrierShape};
use crate::depth::BitDepth;
use crate::error::{Result, StegoError};
use crate::frame::{BitSequence, ScanGranularity};

/// Formats that keep every pixel value intact.
const LOSSLESS_FORMATS: [ImageFormat; 2] = [ImageFormat::Png, ImageFormat::Bmp];

/// Image steganography handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStego {
    image: RgbImage,
}

impl ImageStego {
    /// Loads an image from a file and converts it to 8-bit RGB.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| {
            StegoError::CarrierReadFailure(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self::from_image(image))
    }

    /// Decodes an image from encoded bytes (PNG, BMP).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| StegoError::CarrierReadFailure(e.to_string()))?;
        Ok(Self::from_image(image))
    }

    /// Wraps an already decoded image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgb8(),
        }
    }

    /// Wraps an RGB pixel buffer without conversion.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Saves the image. The format comes from the extension and must be lossless.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path).map_err(|e| {
            StegoError::CarrierWriteFailure(format!("{}: {}", path.display(), e))
        })?;

        if !LOSSLESS_FORMATS.contains(&format) {
            return Err(StegoError::CarrierWriteFailure(format!(
                "{}: {:?} is not a lossless format, use .png or .bmp",
                path.display(),
                format
            )));
        }

        self.image
            .save_with_format(path, format)
            .map_err(|e| StegoError::CarrierWriteFailure(format!("{}: {}", path.display(), e)))
    }

    /// Returns the image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| StegoError::CarrierWriteFailure(e.to_string()))?;
        Ok(bytes)
    }

    /// Returns a reference to the underlying pixels.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

impl CarrierAdapter for ImageStego {
    fn shape(&self) -> CarrierShape {
        CarrierShape::Image {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    fn embed(&self, bits: &BitSlice<u8, Msb0>, depth: BitDepth) -> Result<Self> {
        ensure_fits(bits.len(), self.capacity(depth))?;

        // The raw buffer is already row-major R, G, B.
        let mut output = self.image.clone();
        let touched = lsb::embed(&mut *output, bits, depth);
        log::debug!(
            "image: wrote {} bits into {} channels at depth {}",
            bits.len(),
            touched,
            depth
        );

        Ok(Self { image: output })
    }

    fn extract(&self, depth: BitDepth, stop: Option<ScanGranularity>) -> BitSequence {
        lsb::extract(self.image.as_raw(), depth, stop)
    }
}
