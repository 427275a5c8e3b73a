//! Pixel filters applied by the renderer.
//!
//! Each function takes the current raster by reference and returns a new
//! one; none of them mutate their input. Neutral parameters (zero
//! adjustment, zero blur radius) return an exact copy so an identity
//! step never perturbs pixels.
//!
//! Colour filters operate on normalised RGB and never touch alpha.
//! Geometry filters delegate to [`image::imageops`]; blur delegates to
//! [`imageproc`].

pub mod blur;
pub mod color;
pub mod geometry;

pub use blur::gaussian_blur;
pub use color::{brightness, color_balance, contrast, grayscale, hue, saturation, sepia};
pub use geometry::{
    MAX_RESIZE_PIXELS, ResampleFilter, flip_horizontal, flip_vertical, resize, rotate90,
};
