//! Image decoding.
//!
//! Accepts raw image bytes (PNG, JPEG, GIF, BMP, WebP) and produces the
//! RGBA raster that becomes a session's immutable source.

use std::io::Cursor;

use image::{DynamicImage, ImageDecoder, ImageError, ImageReader};

use crate::types::{EditError, RgbaImage};

/// Decode raw image bytes into an RGBA raster.
///
/// The format is sniffed from the data, not from a file name. An EXIF
/// orientation tag, if present, is applied so the raster is upright.
///
/// # Errors
///
/// Returns [`EditError::EmptyInput`] if `bytes` is empty.
/// Returns [`EditError::Decode`] if the image format is unrecognized or
/// the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, EditError> {
    if bytes.is_empty() {
        return Err(EditError::EmptyInput);
    }

    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img.to_rgba8())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    /// Left half red, right half blue.
    fn split(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        })
    }

    fn encode_jpeg(img: &RgbaImage) -> Vec<u8> {
        let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 95);
        image::ImageEncoder::write_image(
            encoder,
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        buf
    }

    /// Insert an APP1 segment carrying a single Orientation tag right
    /// after the SOI marker.
    fn with_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
        let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
        app1.extend_from_slice(b"Exif\0\0");
        // Little-endian TIFF header, first IFD at offset 8.
        app1.extend_from_slice(b"II*\0");
        app1.extend_from_slice(&8u32.to_le_bytes());
        app1.extend_from_slice(&1u16.to_le_bytes());
        // Tag 0x0112 (Orientation), type SHORT, count 1.
        app1.extend_from_slice(&0x0112u16.to_le_bytes());
        app1.extend_from_slice(&3u16.to_le_bytes());
        app1.extend_from_slice(&1u32.to_le_bytes());
        app1.extend_from_slice(&orientation.to_le_bytes());
        app1.extend_from_slice(&[0, 0]);
        app1.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(app1.len(), 2 + 0x22);

        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&app1);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn jpeg_without_exif_keeps_layout() {
        let decoded = decode(&encode_jpeg(&split(32, 16))).unwrap();
        assert_eq!(decoded.dimensions(), (32, 16));
        let left = decoded.get_pixel(2, 8).0;
        assert!(left[0] > left[2], "left should stay red, got {left:?}");
    }

    #[test]
    fn exif_rotate_90_swaps_dimensions() {
        let bytes = with_orientation(&encode_jpeg(&split(32, 16)), 6);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (16, 32));
    }

    #[test]
    fn exif_rotate_180_moves_right_half_left() {
        let bytes = with_orientation(&encode_jpeg(&split(32, 16)), 3);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (32, 16));
        let left = decoded.get_pixel(2, 8).0;
        assert!(left[2] > left[0], "left should now be blue, got {left:?}");
    }

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode(&[]), Err(EditError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(EditError::Decode(_))));
    }

    #[test]
    fn png_round_trips_pixels() {
        let img = RgbaImage::from_fn(3, 2, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            let v = (x * 50 + y * 7) as u8;
            image::Rgba([v, 255 - v, 40, 128])
        });
        let decoded = decode(&encode_png(&img)).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn output_dimensions_match_input() {
        let img = RgbaImage::from_pixel(17, 31, image::Rgba([128, 64, 32, 255]));
        let decoded = decode(&encode_png(&img)).unwrap();
        assert_eq!(decoded.dimensions(), (17, 31));
    }
}
