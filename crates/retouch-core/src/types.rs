//! Shared types for the retouch editing core.

use serde::{Deserialize, Serialize};

use crate::filters::ResampleFilter;
use crate::operation::{Category, OperationKind};

/// Re-export the raster types so downstream crates can hold source and
/// derived rasters without depending on `image` directly.
pub use image::{Rgba, RgbaImage};

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of an RGBA raster.
    #[must_use]
    pub fn of(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// Settings an [`EditSession`](crate::EditSession) keeps across image loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum undo depth. `None` keeps every snapshot.
    pub history_limit: Option<usize>,

    /// Resampling filter used by resize operations.
    pub resample: ResampleFilter,
}

impl SessionConfig {
    /// Default undo depth: unbounded.
    pub const DEFAULT_HISTORY_LIMIT: Option<usize> = None;

    /// Default resampling filter (bilinear).
    pub const DEFAULT_RESAMPLE: ResampleFilter = ResampleFilter::Triangle;
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: Self::DEFAULT_HISTORY_LIMIT,
            resample: Self::DEFAULT_RESAMPLE,
        }
    }
}

/// Errors that can occur while loading an image or editing its chain.
///
/// Every variant is reported before any session state changes: a
/// failed load leaves the previous session in place, and a rejected
/// edit leaves the chain and both history stacks untouched.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// An operation parameter is outside its kind's domain.
    #[error("invalid {kind} parameter: {reason}")]
    InvalidParameter {
        /// Kind of the rejected operation.
        kind: OperationKind,
        /// Human-readable description of the violated constraint.
        reason: String,
    },

    /// An operation was routed through the wrong mutation entry point,
    /// e.g. a discrete transform passed as a continuous adjustment.
    #[error("{kind} is not a {expected} operation")]
    WrongCategory {
        /// Kind of the rejected operation.
        kind: OperationKind,
        /// Category the entry point accepts.
        expected: Category,
    },

    /// A continuous adjustment was appended while its slot is occupied.
    /// Continuous kinds must be updated in place instead.
    #[error("{0} already has a slot in the chain")]
    SlotOccupied(OperationKind),
}
