//! Per-pixel colour adjustments.
//!
//! All adjustments map normalised `[0, 1]` RGB values and write them back
//! rounded and clamped. Alpha passes through untouched. Percent-style
//! parameters follow the slider conventions of the operation model:
//! `0` is neutral, `-100` removes the quantity, positive values boost it.

use crate::types::RgbaImage;

/// Rec. 601 luma weights.
const LUMA: [f32; 3] = [0.299, 0.587, 0.114];

/// Sepia tone matrix, one row per output channel.
const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Shift every channel by `percent` of full scale.
#[must_use = "returns the adjusted image"]
pub fn brightness(image: &RgbaImage, percent: f32) -> RgbaImage {
    if is_neutral(percent) {
        return image.clone();
    }
    let shift = percent / 100.0;
    map_rgb(image, |rgb| rgb.map(|c| c + shift))
}

/// Stretch channels away from (or toward) mid-gray.
///
/// Negative values scale the distance from 0.5 by `1 + p`, so `-100`
/// collapses the image to flat gray. Positive values scale by
/// `1 / (1 - p)`, and `100` degenerates into a hard threshold.
#[must_use = "returns the adjusted image"]
pub fn contrast(image: &RgbaImage, percent: f32) -> RgbaImage {
    if is_neutral(percent) {
        return image.clone();
    }
    let p = (percent / 100.0).clamp(-1.0, 1.0);
    if p >= 1.0 {
        return map_rgb(image, |rgb| rgb.map(|c| if c < 0.5 { 0.0 } else { 1.0 }));
    }
    let factor = if p <= 0.0 { 1.0 + p } else { 1.0 / (1.0 - p) };
    map_rgb(image, |rgb| rgb.map(|c| (c - 0.5).mul_add(factor, 0.5)))
}

/// Rotate the hue of every pixel by `degrees`.
#[must_use = "returns the adjusted image"]
pub fn hue(image: &RgbaImage, degrees: f32) -> RgbaImage {
    if is_neutral(degrees) {
        return image.clone();
    }
    let shift = degrees / 360.0;
    map_rgb(image, |rgb| {
        let [h, s, l] = rgb_to_hsl(rgb);
        hsl_to_rgb([(h + shift).rem_euclid(1.0), s, l])
    })
}

/// Scale HSL saturation by `1 + percent / 100`.
#[must_use = "returns the adjusted image"]
pub fn saturation(image: &RgbaImage, percent: f32) -> RgbaImage {
    if is_neutral(percent) {
        return image.clone();
    }
    let factor = 1.0 + percent / 100.0;
    map_rgb(image, |rgb| {
        let [h, s, l] = rgb_to_hsl(rgb);
        hsl_to_rgb([h, (s * factor).clamp(0.0, 1.0), l])
    })
}

/// Scale the red, green and blue channels independently.
#[must_use = "returns the adjusted image"]
pub fn color_balance(image: &RgbaImage, red: f32, green: f32, blue: f32) -> RgbaImage {
    if is_neutral(red) && is_neutral(green) && is_neutral(blue) {
        return image.clone();
    }
    let factors = [red, green, blue].map(|p| 1.0 + p / 100.0);
    map_rgb(image, |[r, g, b]| [r * factors[0], g * factors[1], b * factors[2]])
}

/// Blend `percent` of the way toward a sepia tone.
#[must_use = "returns the adjusted image"]
pub fn sepia(image: &RgbaImage, percent: f32) -> RgbaImage {
    if is_neutral(percent) {
        return image.clone();
    }
    let amount = (percent / 100.0).clamp(0.0, 1.0);
    map_rgb(image, |rgb| {
        std::array::from_fn(|c| {
            let toned = dot(SEPIA[c], rgb);
            (toned - rgb[c]).mul_add(amount, rgb[c])
        })
    })
}

/// Replace colour with Rec. 601 luma.
#[must_use = "returns the grayscale image"]
pub fn grayscale(image: &RgbaImage) -> RgbaImage {
    map_rgb(image, |rgb| [dot(LUMA, rgb); 3])
}

/// Adjustments this small cannot move any 8-bit channel.
fn is_neutral(value: f32) -> bool {
    value.abs() < f32::EPSILON
}

fn dot(weights: [f32; 3], rgb: [f32; 3]) -> f32 {
    weights[0].mul_add(rgb[0], weights[1].mul_add(rgb[1], weights[2] * rgb[2]))
}

fn map_rgb(image: &RgbaImage, f: impl Fn([f32; 3]) -> [f32; 3]) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let mapped = f([to_unit(r), to_unit(g), to_unit(b)]);
        pixel.0[0] = from_unit(mapped[0]);
        pixel.0[1] = from_unit(mapped[1]);
        pixel.0[2] = from_unit(mapped[2]);
    }
    out
}

fn to_unit(value: u8) -> f32 {
    f32::from(value) / 255.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn from_unit(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Convert normalised RGB to `[hue, saturation, lightness]`, all in `[0, 1]`.
#[allow(clippy::float_cmp)]
fn rgb_to_hsl([r, g, b]: [f32; 3]) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;
    let delta = max - min;
    if delta <= f32::EPSILON {
        return [0.0, 0.0, lightness];
    }

    let saturation = if lightness < 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    // `max` is one of the inputs, so exact comparison selects the sector.
    let sector = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    [sector / 6.0, saturation, lightness]
}

fn hsl_to_rgb([h, s, l]: [f32; 3]) -> [f32; 3] {
    if s <= f32::EPSILON {
        return [l; 3];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l.mul_add(-s, l + s) };
    let p = 2.0f32.mul_add(l, -q);
    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        ((q - p) * 6.0).mul_add(t, p)
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        ((q - p) * 6.0).mul_add(2.0 / 3.0 - t, p)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(r: u8, g: u8, b: u8) -> RgbaImage {
        RgbaImage::from_pixel(1, 1, image::Rgba([r, g, b, 200]))
    }

    fn rgb(image: &RgbaImage) -> [u8; 3] {
        let [r, g, b, _] = image.get_pixel(0, 0).0;
        [r, g, b]
    }

    #[allow(clippy::cast_possible_truncation)]
    fn gradient() -> RgbaImage {
        RgbaImage::from_fn(16, 16, |x, y| {
            image::Rgba([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8, 255])
        })
    }

    #[test]
    fn neutral_adjustments_are_exact_identity() {
        let img = gradient();
        assert_eq!(brightness(&img, 0.0), img);
        assert_eq!(contrast(&img, 0.0), img);
        assert_eq!(hue(&img, 0.0), img);
        assert_eq!(saturation(&img, 0.0), img);
        assert_eq!(color_balance(&img, 0.0, 0.0, 0.0), img);
        assert_eq!(sepia(&img, 0.0), img);
    }

    #[test]
    fn brightness_shifts_and_clamps() {
        assert_eq!(rgb(&brightness(&pixel(100, 0, 250), 20.0)), [151, 51, 255]);
        assert_eq!(rgb(&brightness(&pixel(100, 0, 250), -100.0)), [0, 0, 0]);
    }

    #[test]
    fn color_filters_preserve_alpha() {
        let img = pixel(10, 120, 240);
        for out in [
            brightness(&img, 50.0),
            contrast(&img, 50.0),
            hue(&img, 90.0),
            saturation(&img, 200.0),
            color_balance(&img, 10.0, 20.0, 30.0),
            sepia(&img, 100.0),
            grayscale(&img),
        ] {
            assert_eq!(out.get_pixel(0, 0).0[3], 200);
        }
    }

    #[test]
    fn contrast_minus_100_flattens_to_mid_gray() {
        let out = contrast(&gradient(), -100.0);
        for p in out.pixels() {
            for c in 0..3 {
                assert!((127..=128).contains(&p.0[c]), "got {:?}", p.0);
            }
        }
    }

    #[test]
    fn contrast_100_thresholds() {
        assert_eq!(rgb(&contrast(&pixel(100, 130, 255), 100.0)), [0, 255, 255]);
    }

    #[test]
    fn contrast_increase_spreads_values() {
        let out = contrast(&pixel(64, 128, 192), 50.0);
        let [r, _, b] = rgb(&out);
        assert!(r < 64 && b > 192, "got {:?}", rgb(&out));
    }

    #[test]
    fn hue_rotation_cycles_primaries() {
        // Red rotated by 120 degrees becomes green.
        assert_eq!(rgb(&hue(&pixel(255, 0, 0), 120.0)), [0, 255, 0]);
        assert_eq!(rgb(&hue(&pixel(255, 0, 0), -120.0)), [0, 0, 255]);
    }

    #[test]
    fn saturation_minus_100_removes_color() {
        let [r, g, b] = rgb(&saturation(&pixel(200, 40, 90), -100.0));
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn color_balance_scales_channels() {
        assert_eq!(
            rgb(&color_balance(&pixel(100, 100, 100), 50.0, -100.0, 0.0)),
            [150, 0, 100]
        );
    }

    #[test]
    fn full_sepia_on_white_matches_matrix() {
        // Row sums of the sepia matrix, clamped: 1.351, 1.203, 0.937.
        assert_eq!(rgb(&sepia(&pixel(255, 255, 255), 100.0)), [255, 255, 239]);
    }

    #[test]
    fn grayscale_weights_green_highest() {
        let r = rgb(&grayscale(&pixel(255, 0, 0)))[0];
        let g = rgb(&grayscale(&pixel(0, 255, 0)))[0];
        let b = rgb(&grayscale(&pixel(0, 0, 255)))[0];
        assert!(g > r && r > b, "expected green > red > blue, got R={r} G={g} B={b}");
    }

    #[test]
    fn hsl_round_trip_preserves_colors() {
        for color in [[255, 0, 0], [12, 200, 77], [128, 128, 128], [0, 0, 0]] {
            let unit = color.map(to_unit);
            let back = hsl_to_rgb(rgb_to_hsl(unit)).map(from_unit);
            assert_eq!(back, color);
        }
    }
}
