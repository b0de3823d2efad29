//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use effects::DEFAULT_PICTURE;
pub use model::{Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::document::RescanPolicy;
use crate::geometry::PageSize;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: Option<PathBuf>,
    image_path: Option<PathBuf>,
    page: PageSize,
    rescan: RescanPolicy,
    images_enabled: bool,
    force_half_cell: bool,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application, seeded from `file_path` when given.
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            file_path,
            image_path: None,
            page: PageSize::default(),
            rescan: RescanPolicy::default(),
            images_enabled: true,
            force_half_cell: false,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Picture inserted by "add picture".
    #[must_use]
    pub fn with_image_path(mut self, path: Option<PathBuf>) -> Self {
        self.image_path = path;
        self
    }

    /// Canvas page size.
    #[must_use]
    pub const fn with_page(mut self, page: PageSize) -> Self {
        self.page = page;
        self
    }

    /// When placeholders are rescanned after an edit.
    #[must_use]
    pub const fn with_rescan(mut self, rescan: RescanPolicy) -> Self {
        self.rescan = rescan;
        self
    }

    /// Enable or disable inline image rendering.
    #[must_use]
    pub const fn with_images_enabled(mut self, enabled: bool) -> Self {
        self.images_enabled = enabled;
        self
    }

    /// Force image rendering to half-cell blocks.
    #[must_use]
    pub const fn with_force_half_cell(mut self, force: bool) -> Self {
        self.force_half_cell = force;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}

#[cfg(test)]
mod tests;
