//! retouch-export: Pure image encoders (sans-IO)
//!
//! Encodes rendered rasters into output file formats in memory.
//! Supports JPEG, PNG, and GIF, selected by file extension.

pub mod format;

use std::borrow::Cow;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

pub use format::SaveFormat;

/// JPEG quality used for every JPEG export.
pub const JPEG_QUALITY: u8 = 90;

/// Errors that can occur while encoding an image.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The requested extension has no encoder.
    #[error(
        "unsupported file extension {0:?} (expected one of: {expected})",
        expected = SaveFormat::SUPPORTED_EXTENSIONS.join(", ")
    )]
    UnsupportedFormat(String),

    /// The encoder rejected the image.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Encode `image` as `format`, returning the file bytes.
///
/// Formats without an alpha channel (see [`SaveFormat::supports_alpha`])
/// get RGB data with alpha discarded, not blended.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder fails.
pub fn encode(image: &RgbaImage, format: SaveFormat) -> Result<Vec<u8>, ExportError> {
    let (w, h) = image.dimensions();
    let (data, color) = if format.supports_alpha() {
        (Cow::Borrowed(image.as_raw().as_slice()), ExtendedColorType::Rgba8)
    } else {
        let rgb: Vec<u8> = image.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
        (Cow::Owned(rgb), ExtendedColorType::Rgb8)
    };
    let mut bytes = Vec::new();

    match format {
        SaveFormat::Png => {
            let encoder = PngEncoder::new(&mut bytes);
            encoder.write_image(&data, w, h, color)?;
        }
        SaveFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
            encoder.write_image(&data, w, h, color)?;
        }
        SaveFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut bytes);
            encoder.encode(&data, w, h, color)?;
        }
    }

    Ok(bytes)
}
