//! Gaussian blur.

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

use crate::types::{Rgba, RgbaImage};

/// Blur with a Gaussian of standard deviation `radius`.
///
/// `imageproc` only blurs single-channel images, so each of the four
/// channels is split out, blurred, and merged back. Alpha is blurred
/// with the colour channels so soft edges stay soft.
///
/// A radius of zero (or below) is the identity.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &RgbaImage, radius: f32) -> RgbaImage {
    if radius <= 0.0 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }

    let planes = [0, 1, 2, 3].map(|channel| gaussian_blur_f32(&plane(image, channel), radius));

    let mut out = RgbaImage::new(image.width(), image.height());
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        *pixel = Rgba(planes.each_ref().map(|p| p.get_pixel(x, y).0[0]));
    }
    out
}

/// One channel of `image` as a grayscale plane.
fn plane(image: &RgbaImage, channel: usize) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y).0[channel]])
    })
}
