//! Text storage for the editing surface.
//!
//! Provides a rope-backed text buffer with cursor and selection management
//! and per-placeholder object tags, designed for integration into the TEA
//! architecture.

mod buffer;

pub use buffer::{Direction, TextBuffer};

/// The object replacement character marking an inline object in the text.
pub const PLACEHOLDER: char = '\u{FFFC}';

/// Identifies one inline object's draw/measure handler.
///
/// Attached to a placeholder character as its format tag. Ids are handed
/// out by the object registry and never reused by the same registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(u32);

impl KindId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// The id following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for KindId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
