//! Image content behind inline objects.
//!
//! Decoding goes through the `image` crate. A failed load does not abort
//! the insertion: the object keeps an [`ImageContent::Unavailable`] and is
//! drawn as an empty box.

mod loader;

pub use loader::{ImageCache, ImageLoader};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use ratatui_image::picker::Picker;

use crate::error::{EditorError, Result};
use crate::geometry::Size;

/// Largest size an image gets when first inserted.
pub const MAX_INITIAL_SIZE: Size = Size::new(320, 240);
/// Size of the empty box drawn for an image that failed to load.
pub const UNAVAILABLE_SIZE: Size = Size::new(160, 120);

/// The original pixels of an inline image, shared by every overlay that
/// shows it.
#[derive(Debug, Clone)]
pub enum ImageContent {
    Decoded(Arc<DynamicImage>),
    Unavailable { reason: String },
}

impl ImageContent {
    pub fn from_image(image: DynamicImage) -> Self {
        Self::Decoded(Arc::new(image))
    }

    /// Decode an in-memory image.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::BitmapLoad`] if the bytes are not a supported
    /// image format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes).map_err(|source| EditorError::BitmapLoad {
            path: PathBuf::from("<memory>"),
            source,
        })?;
        Ok(Self::from_image(image))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }

    /// Pixel size of the original image.
    pub fn natural_size(&self) -> Option<Size> {
        match self {
            Self::Decoded(image) => {
                let (w, h) = image.dimensions();
                Some(Size::new(w, h))
            }
            Self::Unavailable { .. } => None,
        }
    }

    /// Size a freshly inserted object should start with.
    pub fn initial_size(&self) -> Size {
        self.natural_size()
            .map_or(UNAVAILABLE_SIZE, |size| size.fit_within(MAX_INITIAL_SIZE))
    }

    /// Scale the original pixels to `size`.
    ///
    /// Always resamples from the original so repeated resizes do not
    /// accumulate artifacts.
    pub fn scaled(&self, size: Size) -> Option<RgbaImage> {
        let Self::Decoded(image) = self else {
            return None;
        };
        let width = size.width.max(1);
        let height = size.height.max(1);
        Some(image::imageops::resize(
            &**image,
            width,
            height,
            FilterType::Triangle,
        ))
    }
}

/// Read and decode an image file.
///
/// # Errors
///
/// Returns [`EditorError::BitmapLoad`] if the file is missing or corrupt.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| EditorError::BitmapLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Create a picker for terminal image rendering.
///
/// The picker detects terminal capabilities and chooses the best protocol.
pub fn create_picker(force_half_cell: bool) -> Option<Picker> {
    if force_half_cell {
        tracing::debug!("forced half-block image rendering");
        return Some(Picker::halfblocks());
    }

    // The stdio capability query can leave a reader thread attached to the
    // console input buffer on Windows.
    #[cfg(not(unix))]
    {
        return Some(Picker::halfblocks());
    }

    #[cfg(unix)]
    {
        match Picker::from_query_stdio() {
            Ok(picker) => {
                tracing::debug!(protocol = ?picker.protocol_type(), "terminal image protocol");
                Some(picker)
            }
            Err(err) => {
                tracing::warn!(error = ?err, "terminal query failed, using half-blocks");
                Some(Picker::halfblocks())
            }
        }
    }
}
