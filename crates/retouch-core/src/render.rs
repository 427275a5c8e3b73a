//! Replay a filter chain over a source image.
//!
//! Rendering is pure: the source is never modified, the same
//! `(source, chain)` pair always produces the same pixels, and an empty
//! chain produces an exact copy of the source. There is no prefix
//! caching; every render replays the whole chain.

use serde::{Deserialize, Serialize};

use crate::chain::FilterChain;
use crate::filters::{self, ResampleFilter};
use crate::operation::Operation;
use crate::types::RgbaImage;

/// Applies operations to rasters.
///
/// Carries the settings that are not part of an operation's own
/// parameters, currently just the resampling filter used by resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Renderer {
    /// Filter used by [`Operation::Resize`].
    pub resample: ResampleFilter,
}

impl Renderer {
    /// Create a renderer with the given resampling filter.
    #[must_use]
    pub const fn new(resample: ResampleFilter) -> Self {
        Self { resample }
    }

    /// Apply every operation in `chain` to `source`, in order.
    #[must_use = "returns the rendered image"]
    pub fn render(&self, source: &RgbaImage, chain: &FilterChain) -> RgbaImage {
        chain.iter().fold(source.clone(), |image, op| {
            tracing::debug!(kind = %op.kind(), "Applying operation");
            self.apply(&image, op)
        })
    }

    /// Apply a single operation.
    #[must_use = "returns the transformed image"]
    pub fn apply(&self, image: &RgbaImage, op: &Operation) -> RgbaImage {
        match *op {
            Operation::Brightness { value } => filters::brightness(image, value),
            Operation::Contrast { value } => filters::contrast(image, value),
            Operation::Hue { value } => filters::hue(image, value),
            Operation::Saturation { value } => filters::saturation(image, value),
            Operation::ColorBalance { red, green, blue } => {
                filters::color_balance(image, red, green, blue)
            }
            Operation::Sepia { value } => filters::sepia(image, value),
            Operation::Blur { radius } => filters::gaussian_blur(image, radius),
            Operation::Grayscale => filters::grayscale(image),
            Operation::Rotate90 => filters::rotate90(image),
            Operation::FlipHorizontal => filters::flip_horizontal(image),
            Operation::FlipVertical => filters::flip_vertical(image),
            Operation::Resize {
                width,
                height,
                keep_aspect_ratio,
            } => filters::resize(image, width, height, keep_aspect_ratio, self.resample),
        }
    }
}

/// Render `chain` over `source` with the default [`Renderer`].
#[must_use = "returns the rendered image"]
pub fn render(source: &RgbaImage, chain: &FilterChain) -> RgbaImage {
    Renderer::default().render(source, chain)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[allow(clippy::cast_possible_truncation)]
    fn source() -> RgbaImage {
        RgbaImage::from_fn(6, 4, |x, y| {
            image::Rgba([(x * 40) as u8, (y * 60) as u8, ((x + y) * 20) as u8, 255])
        })
    }

    fn chain_of(ops: &[Operation]) -> FilterChain {
        let mut chain = FilterChain::new();
        for &op in ops {
            chain.replace_or_append(op);
        }
        chain
    }

    #[test]
    fn empty_chain_is_bit_identical() {
        let img = source();
        assert_eq!(render(&img, &FilterChain::new()), img);
    }

    #[test]
    fn render_does_not_mutate_source() {
        let img = source();
        let before = img.clone();
        let _ = render(&img, &chain_of(&[Operation::Grayscale, Operation::Rotate90]));
        assert_eq!(img, before);
    }

    #[test]
    fn render_is_deterministic() {
        let chain = chain_of(&[
            Operation::Hue { value: 45.0 },
            Operation::Blur { radius: 1.0 },
            Operation::Resize {
                width: 3,
                height: 3,
                keep_aspect_ratio: false,
            },
        ]);
        let img = source();
        assert_eq!(render(&img, &chain), render(&img, &chain));
    }

    #[test]
    fn operations_apply_in_sequence_order() {
        // Resize-then-rotate and rotate-then-resize give different shapes.
        let resize = Operation::Resize {
            width: 2,
            height: 4,
            keep_aspect_ratio: false,
        };
        let img = source();
        let a = render(&img, &chain_of(&[resize, Operation::Rotate90]));
        let b = render(&img, &chain_of(&[Operation::Rotate90, resize]));
        assert_eq!(a.dimensions(), (4, 2));
        assert_eq!(b.dimensions(), (2, 4));
    }

    #[test]
    fn neutral_continuous_steps_are_identity() {
        let chain = chain_of(&[
            Operation::Brightness { value: 0.0 },
            Operation::Contrast { value: 0.0 },
            Operation::Hue { value: 0.0 },
            Operation::Saturation { value: 0.0 },
            Operation::ColorBalance {
                red: 0.0,
                green: 0.0,
                blue: 0.0,
            },
            Operation::Sepia { value: 0.0 },
            Operation::Blur { radius: 0.0 },
        ]);
        let img = source();
        assert_eq!(render(&img, &chain), img);
    }

    #[test]
    fn renderer_uses_configured_resample_filter() {
        let img = source();
        let chain = chain_of(&[Operation::Resize {
            width: 12,
            height: 8,
            keep_aspect_ratio: false,
        }]);
        let nearest = Renderer::new(ResampleFilter::Nearest).render(&img, &chain);
        // Nearest-neighbor upscaling by 2 only copies existing pixels.
        assert_eq!(nearest.get_pixel(0, 0), img.get_pixel(0, 0));
        assert_eq!(nearest.dimensions(), (12, 8));
    }

    #[test]
    fn renderer_serde_round_trip() {
        let renderer = Renderer::new(ResampleFilter::Lanczos3);
        let json = serde_json::to_string(&renderer).unwrap();
        let deserialized: Renderer = serde_json::from_str(&json).unwrap();
        assert_eq!(renderer, deserialized);
    }
}
