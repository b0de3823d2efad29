//! The editing surface with inline images.
//!
//! This module handles:
//! - Laying text out on a fixed cell grid with inline objects
//! - Mapping placeholder characters to registered images
//! - Evicting images whose placeholders were edited away

mod layout;
mod registry;
mod surface;

pub use layout::{
    CELL_HEIGHT, CELL_WIDTH, EMPTY_OBJECT_SIZE, Glyph, GlyphKind, LayoutLine, TextLayout,
};
pub use registry::{
    FIRST_KIND, ImageObjectHandler, InlineImageReference, InlineObjectHandler, ObjectRegistry,
};
pub use surface::{DocumentTextSurface, RescanPolicy, RescanReport};

use std::path::{Path, PathBuf};

/// Image file extensions that open as a picture rather than as text.
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "tiff", "tif", "ico", "avif",
];

/// What a file given on the command line seeds the surface with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    Text(String),
    /// The file is itself an image; start with it inserted.
    Picture(PathBuf),
}

/// Decide how to open `file_path`.
///
/// Image files become a single inline picture. Anything else is plain text
/// with `\r\n` line breaks normalised.
pub fn prepare_seed(
    file_path: &Path,
    content: impl FnOnce() -> std::io::Result<String>,
) -> std::io::Result<Seed> {
    if is_image_file(file_path) {
        return Ok(Seed::Picture(file_path.to_path_buf()));
    }
    Ok(Seed::Text(content()?.replace("\r\n", "\n")))
}

/// Returns true if the file extension is a recognized image format.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
