//! Output format selection by file extension.

use std::fmt;
use std::path::Path;

use crate::ExportError;

/// An encodable output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveFormat {
    /// Baseline JPEG. Alpha is dropped.
    Jpeg,
    /// Lossless PNG with alpha.
    Png,
    /// Single-frame GIF.
    Gif,
}

impl SaveFormat {
    /// Extensions accepted by [`from_extension`](Self::from_extension),
    /// lowercase and without the leading dot.
    pub const SUPPORTED_EXTENSIONS: [&'static str; 4] = ["jpg", "jpeg", "png", "gif"];

    /// Resolve a format from a file extension, ignoring case.
    ///
    /// A single leading dot is tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnsupportedFormat`] for any other extension.
    pub fn from_extension(extension: &str) -> Result<Self, ExportError> {
        let ext = extension.strip_prefix('.').unwrap_or(extension);
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "gif" => Ok(Self::Gif),
            _ => Err(ExportError::UnsupportedFormat(extension.to_string())),
        }
    }

    /// Resolve a format from the extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnsupportedFormat`] if the path has no
    /// extension or an unsupported one.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    /// Returns `true` if the format stores an alpha channel.
    #[must_use]
    pub const fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

impl fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpeg => f.write_str("JPEG"),
            Self::Png => f.write_str("PNG"),
            Self::Gif => f.write_str("GIF"),
        }
    }
}
