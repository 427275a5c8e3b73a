//! The operation model: one parameterized transform step.
//!
//! Every [`Operation`] belongs to exactly one [`Category`]:
//!
//! - **Continuous** adjustments (brightness, contrast, hue, saturation,
//!   colour balance, sepia, blur) may appear at most once per chain.
//!   A new value replaces the existing one in place.
//! - **Discrete** transforms (grayscale, rotate, flips, resize) are
//!   repeatable. Each invocation appends a new step.
//!
//! Parameter domains are checked by [`Operation::validate`] at the
//! session boundary, before any chain is mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filters::MAX_RESIZE_PIXELS;
use crate::types::EditError;

/// Whether an operation kind is limited to one slot or repeatable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// At most one instance per chain, updated in place.
    Continuous,
    /// Repeatable; every invocation appends.
    Discrete,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continuous => f.write_str("continuous"),
            Self::Discrete => f.write_str("discrete"),
        }
    }
}

/// The kind of an [`Operation`], without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Brightness,
    Contrast,
    Hue,
    Saturation,
    ColorBalance,
    Sepia,
    Blur,
    Grayscale,
    Rotate90,
    FlipHorizontal,
    FlipVertical,
    Resize,
}

impl OperationKind {
    /// Every kind, continuous kinds first.
    pub const ALL: [Self; 12] = [
        Self::Brightness,
        Self::Contrast,
        Self::Hue,
        Self::Saturation,
        Self::ColorBalance,
        Self::Sepia,
        Self::Blur,
        Self::Grayscale,
        Self::Rotate90,
        Self::FlipHorizontal,
        Self::FlipVertical,
        Self::Resize,
    ];

    /// Which mutation path this kind uses.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Brightness
            | Self::Contrast
            | Self::Hue
            | Self::Saturation
            | Self::ColorBalance
            | Self::Sepia
            | Self::Blur => Category::Continuous,
            Self::Grayscale
            | Self::Rotate90
            | Self::FlipHorizontal
            | Self::FlipVertical
            | Self::Resize => Category::Discrete,
        }
    }

    /// Returns `true` for kinds limited to a single slot.
    #[must_use]
    pub const fn is_continuous(self) -> bool {
        matches!(self.category(), Category::Continuous)
    }

    /// Accepted range for this kind's floating-point parameters.
    ///
    /// `None` for kinds without float parameters. Colour balance applies
    /// the same range to each of its three channels.
    #[must_use]
    pub const fn range(self) -> Option<ParameterRange> {
        match self {
            Self::Brightness | Self::Contrast => Some(ParameterRange::new(-100.0, 100.0)),
            Self::Hue => Some(ParameterRange::new(-180.0, 180.0)),
            Self::Saturation | Self::ColorBalance => Some(ParameterRange::new(-100.0, 500.0)),
            Self::Sepia | Self::Blur => Some(ParameterRange::new(0.0, 100.0)),
            Self::Grayscale
            | Self::Rotate90
            | Self::FlipHorizontal
            | Self::FlipVertical
            | Self::Resize => None,
        }
    }

    /// Stable snake-case name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::ColorBalance => "color_balance",
            Self::Sepia => "sepia",
            Self::Blur => "blur",
            Self::Grayscale => "grayscale",
            Self::Rotate90 => "rotate90",
            Self::FlipHorizontal => "flip_horizontal",
            Self::FlipVertical => "flip_vertical",
            Self::Resize => "resize",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Inclusive bounds for a floating-point operation parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    /// Smallest accepted value.
    pub min: f32,
    /// Largest accepted value.
    pub max: f32,
}

impl ParameterRange {
    const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `value` is finite and within the bounds.
    #[must_use]
    pub fn contains(self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// One transform step in a filter chain.
///
/// Serialized as an internally tagged object, e.g.
/// `{"kind":"brightness","value":20.0}` or
/// `{"kind":"resize","width":640,"height":480,"keep_aspect_ratio":true}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    /// Shift every colour channel by `value` percent of full scale.
    Brightness { value: f32 },
    /// Stretch (positive) or compress (negative) channels around mid-gray.
    Contrast { value: f32 },
    /// Rotate hue by `value` degrees.
    Hue { value: f32 },
    /// Scale saturation by `value` percent.
    Saturation { value: f32 },
    /// Scale each channel independently by a percentage.
    ColorBalance { red: f32, green: f32, blue: f32 },
    /// Blend `value` percent toward a sepia tone.
    Sepia { value: f32 },
    /// Gaussian blur with standard deviation `radius`.
    Blur { radius: f32 },
    /// Replace colour with luminance.
    Grayscale,
    /// Rotate a quarter turn counter-clockwise.
    Rotate90,
    /// Mirror left to right.
    FlipHorizontal,
    /// Mirror top to bottom.
    FlipVertical,
    /// Scale to `width` x `height`.
    ///
    /// With `keep_aspect_ratio` the image is fitted inside the box;
    /// otherwise it is scaled to cover the box and cropped.
    Resize {
        width: u32,
        height: u32,
        #[serde(default)]
        keep_aspect_ratio: bool,
    },
}

impl Operation {
    /// The kind of this operation.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Brightness { .. } => OperationKind::Brightness,
            Self::Contrast { .. } => OperationKind::Contrast,
            Self::Hue { .. } => OperationKind::Hue,
            Self::Saturation { .. } => OperationKind::Saturation,
            Self::ColorBalance { .. } => OperationKind::ColorBalance,
            Self::Sepia { .. } => OperationKind::Sepia,
            Self::Blur { .. } => OperationKind::Blur,
            Self::Grayscale => OperationKind::Grayscale,
            Self::Rotate90 => OperationKind::Rotate90,
            Self::FlipHorizontal => OperationKind::FlipHorizontal,
            Self::FlipVertical => OperationKind::FlipVertical,
            Self::Resize { .. } => OperationKind::Resize,
        }
    }

    /// Shorthand for `self.kind().category()`.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.kind().category()
    }

    /// Check every parameter against its kind's domain.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidParameter`] if a float parameter is
    /// non-finite or out of range, or if a resize dimension is zero.
    pub fn validate(&self) -> Result<(), EditError> {
        let kind = self.kind();
        match *self {
            Self::Brightness { value }
            | Self::Contrast { value }
            | Self::Hue { value }
            | Self::Saturation { value }
            | Self::Sepia { value } => check_range(kind, "value", value),
            Self::Blur { radius } => check_range(kind, "radius", radius),
            Self::ColorBalance { red, green, blue } => {
                check_range(kind, "red", red)?;
                check_range(kind, "green", green)?;
                check_range(kind, "blue", blue)
            }
            Self::Resize { width, height, .. } => {
                if width == 0 || height == 0 {
                    return Err(EditError::InvalidParameter {
                        kind,
                        reason: format!("dimensions must be positive, got {width}x{height}"),
                    });
                }
                if u64::from(width) * u64::from(height) > MAX_RESIZE_PIXELS {
                    return Err(EditError::InvalidParameter {
                        kind,
                        reason: format!(
                            "{width}x{height} exceeds the limit of {MAX_RESIZE_PIXELS} pixels"
                        ),
                    });
                }
                Ok(())
            }
            Self::Grayscale | Self::Rotate90 | Self::FlipHorizontal | Self::FlipVertical => Ok(()),
        }
    }
}

fn check_range(kind: OperationKind, name: &str, value: f32) -> Result<(), EditError> {
    let Some(range) = kind.range() else {
        return Ok(());
    };
    if range.contains(value) {
        Ok(())
    } else {
        Err(EditError::InvalidParameter {
            kind,
            reason: format!(
                "{name} must be within [{}, {}], got {value}",
                range.min, range.max
            ),
        })
    }
}
