//! retouch-core: Non-destructive raster editing (sans-IO).
//!
//! An [`EditSession`] holds an immutable source image and a
//! [`FilterChain`] of [`Operation`]s. Every edit produces a new chain
//! snapshot, the derived image is re-rendered from the source, and
//! [`HistoryManager`] keeps the snapshots for undo and redo:
//!
//! source -> brightness -> contrast -> ... -> rotate -> resize -> derived
//!
//! Continuous adjustments (brightness, contrast, hue, saturation, colour
//! balance, sepia, blur) occupy one slot each and are replaced in place.
//! Discrete transforms (grayscale, rotate, flips, resize) append.
//!
//! This crate has **no I/O dependencies** -- it decodes from in-memory
//! byte slices and hands back rasters. Encoding lives in
//! `retouch-export`; filesystem access lives in the `retouch` binary.

pub mod chain;
pub mod decode;
pub mod diagnostics;
pub mod filters;
pub mod history;
pub mod operation;
pub mod render;
pub mod session;
pub mod types;

pub use chain::FilterChain;
pub use decode::decode;
pub use filters::ResampleFilter;
pub use history::HistoryManager;
pub use operation::{Category, Operation, OperationKind, ParameterRange};
pub use render::{Renderer, render};
pub use session::{EditCommand, EditSession};
pub use types::{Dimensions, EditError, Rgba, RgbaImage, SessionConfig};
