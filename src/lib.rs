// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. overlay::InlineImageOverlay)
    clippy::module_name_repetitions
)]

//! # picpad
//!
//! A terminal text editor with resizable inline pictures.
//!
//! Pictures live in the text as a single object-replacement character
//! (U+FFFC) tagged with a kind id. The kind id keys an object registry
//! that knows how to measure and draw the picture, so the text itself
//! stays plain.
//!
//! ## Architecture
//!
//! picpad uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`editor`]: Text buffer with placeholder tags
//! - [`document`]: Layout, object registry and the text surface
//! - [`overlay`]: Inline pictures and the resize grip
//! - [`canvas`]: What is drawn over the text
//! - [`image`]: Picture loading and terminal protocols
//! - [`ui`]: Terminal UI components
//! - [`config`]: Saved command-line defaults

pub mod app;
pub mod canvas;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod image;
pub mod overlay;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::{DocumentTextSurface, RescanPolicy};
    pub use crate::editor::KindId;
    pub use crate::error::{EditorError, Result};
    pub use crate::ui::viewport::Viewport;
}
