//! Error types for the editing core.

use std::path::PathBuf;

use thiserror::Error;

use crate::editor::KindId;

/// Failures raised by the document surface, the overlays and image loading.
///
/// None of these are fatal: callers degrade to "overlay not shown" or
/// "edit not applied".
#[derive(Debug, Error)]
pub enum EditorError {
    /// The grip's tracked text position no longer ends in a placeholder.
    #[error("no inline object placeholder ends at text position {position}")]
    StaleSelection { position: usize },

    /// A position or search ran outside the text.
    #[error("text position {position} is outside the document (length {len})")]
    OutOfBoundsSelection { position: usize, len: usize },

    /// The image behind an inline object could not be read or decoded.
    #[error("failed to load image {}: {source}", path.display())]
    BitmapLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The kind id is not (or no longer) registered.
    #[error("inline object kind {0} is not registered")]
    UnknownKind(KindId),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
