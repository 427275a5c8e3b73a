//! Writing rendered images to disk.

use std::fs;
use std::path::{Path, PathBuf};

use retouch_core::RgbaImage;
use retouch_export::{ExportError, SaveFormat};

/// Errors that can occur while saving an image.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The format could not be resolved or the encoder failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The encoded bytes could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Encode `image` in the format named by `path`'s extension and write it.
///
/// The format is resolved before anything is written. For an
/// unsupported extension an empty file already sitting at `path` (as a
/// save dialog may leave behind) is removed. If the write itself fails,
/// the partial file is removed.
///
/// # Errors
///
/// Returns [`SaveError::Export`] for an unsupported extension or an
/// encoder failure, and [`SaveError::Io`] if the file cannot be written.
pub fn save_image(path: &Path, image: &RgbaImage) -> Result<SaveFormat, SaveError> {
    let format = match SaveFormat::from_path(path) {
        Ok(format) => format,
        Err(err) => {
            remove_if_empty(path);
            return Err(err.into());
        }
    };

    let bytes = retouch_export::encode(image, format)?;
    if let Err(source) = fs::write(path, &bytes) {
        let _ = fs::remove_file(path);
        return Err(SaveError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    tracing::info!(
        path = %path.display(),
        %format,
        bytes = bytes.len(),
        "Image saved"
    );
    Ok(format)
}

fn remove_if_empty(path: &Path) {
    if fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() == 0) {
        tracing::debug!(path = %path.display(), "Removing empty file left at unsupported path");
        let _ = fs::remove_file(path);
    }
}
