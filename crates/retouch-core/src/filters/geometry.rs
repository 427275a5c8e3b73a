//! Orientation and resizing.
//!
//! Rotation and flips are lossless pixel permutations, so composing a
//! transform with its inverse reproduces the input exactly. Resizing
//! resamples with a configurable [`ResampleFilter`].

use std::fmt;

use image::imageops;
use serde::{Deserialize, Serialize};

use crate::types::RgbaImage;

/// Largest resize target accepted, in pixels (`width * height`).
///
/// 64 megapixels, i.e. a 256 MiB RGBA buffer.
pub const MAX_RESIZE_PIXELS: u64 = 64 * 1024 * 1024;

/// Resampling filter used by resize operations.
///
/// Ordered from fastest/lowest-quality to slowest/highest-quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResampleFilter {
    /// Nearest-neighbor: fastest, blocky artifacts.
    Nearest,
    /// Bilinear interpolation: fast, decent quality.
    #[default]
    Triangle,
    /// Bicubic (Catmull-Rom): moderate speed, good quality.
    CatmullRom,
    /// Gaussian: moderate speed, smooth output.
    Gaussian,
    /// Lanczos with 3 lobes: slowest, sharpest/best for photos.
    Lanczos3,
}

impl ResampleFilter {
    /// Convert to the `image` crate's `FilterType`.
    const fn to_image_filter(self) -> imageops::FilterType {
        match self {
            Self::Nearest => imageops::FilterType::Nearest,
            Self::Triangle => imageops::FilterType::Triangle,
            Self::CatmullRom => imageops::FilterType::CatmullRom,
            Self::Gaussian => imageops::FilterType::Gaussian,
            Self::Lanczos3 => imageops::FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => f.write_str("Nearest"),
            Self::Triangle => f.write_str("Triangle"),
            Self::CatmullRom => f.write_str("CatmullRom"),
            Self::Gaussian => f.write_str("Gaussian"),
            Self::Lanczos3 => f.write_str("Lanczos3"),
        }
    }
}

/// Rotate a quarter turn counter-clockwise.
#[must_use = "returns the rotated image"]
pub fn rotate90(image: &RgbaImage) -> RgbaImage {
    imageops::rotate270(image)
}

/// Mirror left to right.
#[must_use = "returns the flipped image"]
pub fn flip_horizontal(image: &RgbaImage) -> RgbaImage {
    imageops::flip_horizontal(image)
}

/// Mirror top to bottom.
#[must_use = "returns the flipped image"]
pub fn flip_vertical(image: &RgbaImage) -> RgbaImage {
    imageops::flip_vertical(image)
}

/// Resize to `width` x `height`.
///
/// With `keep_aspect_ratio` the image is scaled to fit inside the box,
/// preserving its proportions. Images that already fit are returned
/// unchanged rather than upscaled.
///
/// Without it the image is scaled to cover the box and then cropped to
/// exactly `width` x `height`: centred horizontally, anchored to the
/// bottom edge vertically.
///
/// Zero dimensions and targets above [`MAX_RESIZE_PIXELS`] are rejected
/// before an operation reaches the renderer; if one slips through the
/// image is returned unchanged.
#[must_use = "returns the resized image"]
pub fn resize(
    image: &RgbaImage,
    width: u32,
    height: u32,
    keep_aspect_ratio: bool,
    filter: ResampleFilter,
) -> RgbaImage {
    let (w, h) = image.dimensions();
    if width == 0 || height == 0 || w == 0 || h == 0 {
        return image.clone();
    }
    if u64::from(width) * u64::from(height) > MAX_RESIZE_PIXELS {
        return image.clone();
    }

    if keep_aspect_ratio {
        resize_to_fit(image, width, height, filter)
    } else {
        resize_to_fill(image, width, height, filter)
    }
}

fn resize_to_fit(image: &RgbaImage, width: u32, height: u32, filter: ResampleFilter) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w <= width && h <= height {
        return image.clone();
    }

    let ratio = (f64::from(width) / f64::from(w)).min(f64::from(height) / f64::from(h));
    let fit_w = scaled(w, ratio).min(width);
    let fit_h = scaled(h, ratio).min(height);
    imageops::resize(image, fit_w, fit_h, filter.to_image_filter())
}

fn resize_to_fill(image: &RgbaImage, width: u32, height: u32, filter: ResampleFilter) -> RgbaImage {
    let (w, h) = image.dimensions();
    if (w, h) == (width, height) {
        return image.clone();
    }

    // Crop the source to the target aspect ratio first, so the only
    // buffer allocated at target scale is the output itself.
    let ratio = (f64::from(width) / f64::from(w)).max(f64::from(height) / f64::from(h));
    let crop_w = scaled(width, 1.0 / ratio).min(w);
    let crop_h = scaled(height, 1.0 / ratio).min(h);
    let x = (w - crop_w) / 2;
    let y = h - crop_h;
    let cropped = imageops::crop_imm(image, x, y, crop_w, crop_h).to_image();
    imageops::resize(&cropped, width, height, filter.to_image_filter())
}

/// Scale a pixel length by `ratio`, rounding to the nearest pixel and
/// never collapsing to zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled(length: u32, ratio: f64) -> u32 {
    let value = (f64::from(length) * ratio).round();
    if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        (value as u32).max(1)
    }
}
