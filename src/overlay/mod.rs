//! Canvas overlays drawn on top of the text.
//!
//! [`InlineImageOverlay`] shows an embedded image at its placeholder's
//! rect. [`SelectionGripOverlay`] is the resize handle shown while an image
//! is selected.

mod grip;
mod inline;

pub use grip::{GRIP_SIZE, GripState, Reinsertion, SelectionGripOverlay};
pub use inline::InlineImageOverlay;
