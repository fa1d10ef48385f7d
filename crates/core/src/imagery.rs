//! Image helpers shared by the ingestion pipeline and the API layer.
//!
//! Provides header-only dimension probing for already-encoded images and
//! PNG encoding for the raw pixel buffers carried inside bag image
//! messages. Full codec correctness is not a goal here; anything the
//! `image` crate cannot make sense of is reported as a validation error
//! and the caller decides whether to skip or fail.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, ImageReader, RgbImage};

use crate::error::CoreError;

/// Pixel encodings we know how to turn into a PNG.
///
/// These are the encodings that actually show up on camera topics in
/// practice; anything else is skipped during ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelEncoding {
    Rgb8,
    Bgr8,
    Mono8,
}

impl PixelEncoding {
    /// Parse an encoding string as used in `sensor_msgs/Image`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "rgb8" => Ok(Self::Rgb8),
            "bgr8" => Ok(Self::Bgr8),
            "mono8" => Ok(Self::Mono8),
            other => Err(CoreError::Validation(format!(
                "unsupported pixel encoding '{other}'"
            ))),
        }
    }

    /// Bytes per pixel for this encoding.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgb8 | Self::Bgr8 => 3,
            Self::Mono8 => 1,
        }
    }
}

/// Read the dimensions of an encoded image from its header.
///
/// Does not decode pixel data.
pub fn dimensions(bytes: &[u8]) -> Result<(u32, u32), CoreError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::Validation(format!("unrecognized image data: {e}")))?
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("failed to read image dimensions: {e}")))
}

/// Encode a raw pixel buffer as PNG.
///
/// `step` is the row stride in bytes; rows are compacted if the stride is
/// wider than `width * bytes_per_pixel` (padding at row ends is common in
/// bag image messages).
pub fn encode_png(
    width: u32,
    height: u32,
    step: usize,
    encoding: PixelEncoding,
    data: &[u8],
) -> Result<Vec<u8>, CoreError> {
    let row_bytes = width as usize * encoding.bytes_per_pixel();
    if step < row_bytes {
        return Err(CoreError::Validation(format!(
            "row stride {step} smaller than row width {row_bytes}"
        )));
    }
    if data.len() < step * height as usize {
        return Err(CoreError::Validation(format!(
            "pixel buffer too short: {} bytes for {}x{} at stride {step}",
            data.len(),
            width,
            height
        )));
    }

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * step;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }

    if encoding == PixelEncoding::Bgr8 {
        for px in pixels.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
    }

    let mut out = Cursor::new(Vec::new());
    match encoding {
        PixelEncoding::Mono8 => {
            let img = GrayImage::from_raw(width, height, pixels).ok_or_else(|| {
                CoreError::Internal("pixel buffer did not match image dimensions".into())
            })?;
            img.write_to(&mut out, ImageFormat::Png)
                .map_err(|e| CoreError::Internal(format!("PNG encoding failed: {e}")))?;
        }
        PixelEncoding::Rgb8 | PixelEncoding::Bgr8 => {
            let img = RgbImage::from_raw(width, height, pixels).ok_or_else(|| {
                CoreError::Internal("pixel buffer did not match image dimensions".into())
            })?;
            img.write_to(&mut out, ImageFormat::Png)
                .map_err(|e| CoreError::Internal(format!("PNG encoding failed: {e}")))?;
        }
    }

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_rgb8_round_trips_dimensions() {
        let data = vec![0u8; 4 * 2 * 3];
        let png = encode_png(4, 2, 12, PixelEncoding::Rgb8, &data).unwrap();
        assert_eq!(dimensions(&png).unwrap(), (4, 2));
    }

    #[test]
    fn encode_compacts_padded_rows() {
        // 2x2 mono image with 1 byte of padding per row.
        let data = vec![10, 20, 99, 30, 40, 99];
        let png = encode_png(2, 2, 3, PixelEncoding::Mono8, &data).unwrap();
        let img = image::load_from_memory(&png).unwrap().into_luma8();
        assert_eq!(img.get_pixel(0, 0).0[0], 10);
        assert_eq!(img.get_pixel(1, 1).0[0], 40);
    }

    #[test]
    fn bgr8_swaps_channels() {
        // Single blue-ish BGR pixel should come out blue in RGB.
        let data = vec![200u8, 0, 10];
        let png = encode_png(1, 1, 3, PixelEncoding::Bgr8, &data).unwrap();
        let img = image::load_from_memory(&png).unwrap().into_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [10, 0, 200]);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let err = encode_png(4, 4, 12, PixelEncoding::Rgb8, &[0u8; 8]);
        assert!(err.is_err());
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        assert!(PixelEncoding::parse("bayer_rggb8").is_err());
    }
}
