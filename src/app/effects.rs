use std::path::{Path, PathBuf};

use crate::app::{App, Message, Model, ToastLevel};
use crate::overlay::InlineImageOverlay;

/// Picture used when none was configured.
pub const DEFAULT_PICTURE: &str = "picture.jpg";

impl App {
    pub(super) fn handle_message_side_effects(model: &mut Model, msg: &Message) {
        if matches!(msg, Message::InsertPicture) {
            Self::insert_picture(model);
        }
    }

    /// Add the configured picture at the cursor.
    pub(super) fn insert_picture(model: &mut Model) {
        let working_dir = std::env::current_dir().unwrap_or_default();
        Self::insert_picture_relative_to(model, &working_dir);
    }

    /// Add the configured picture, with a relative path taken from
    /// `working_dir` rather than the seed file's folder.
    pub(super) fn insert_picture_relative_to(model: &mut Model, working_dir: &Path) {
        let path = model
            .image_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PICTURE));
        let path = if path.is_absolute() {
            path
        } else {
            working_dir.join(path)
        };
        Self::insert_picture_from(model, &path);
    }

    /// Add the picture at `path` at the cursor.
    ///
    /// A picture that fails to load is still inserted and drawn as an empty
    /// box; the failure is reported in a toast.
    pub(super) fn insert_picture_from(model: &mut Model, path: &Path) {
        let content = model.loader.content(path);
        let failure = match &content {
            crate::image::ImageContent::Unavailable { reason } => Some(reason.clone()),
            crate::image::ImageContent::Decoded(_) => None,
        };

        match model.surface.insert_image(InlineImageOverlay::new(content)) {
            Ok(reference) => {
                let kind = reference.kind_id();
                tracing::debug!(%kind, path = %path.display(), "picture added");
                super::update::after_edit(model);
                match failure {
                    Some(reason) => model.show_toast(ToastLevel::Warning, reason),
                    None => model.show_toast(
                        ToastLevel::Info,
                        format!("Added {}", path.display()),
                    ),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "picture insertion failed");
                model.show_toast(ToastLevel::Error, format!("Insert failed: {err}"));
            }
        }
    }
}
