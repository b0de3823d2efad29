//! Replacement-object registry.
//!
//! Maps each kind id to the inline image it stands for, together with the
//! draw/measure handler the layout engine calls for that kind.

use std::collections::{BTreeMap, BTreeSet};

use crate::editor::{KindId, PLACEHOLDER};
use crate::geometry::{Point, Rect, Size};
use crate::overlay::InlineImageOverlay;

/// First id handed out; matches the start of the user object range of
/// common rich-text engines.
pub const FIRST_KIND: KindId = KindId::new(0x1000);

/// Layout callbacks for one inline object kind.
pub trait InlineObjectHandler: std::fmt::Debug {
    /// Space to reserve in the text flow.
    fn intrinsic_size(&self, overlay: &InlineImageOverlay) -> Size;

    /// Called with the rect the layout allocated for the object.
    fn draw(&self, overlay: &mut InlineImageOverlay, rect: Rect);
}

/// Handler for inline images: reserves the overlay's current size and moves
/// the overlay onto the allocated rect.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageObjectHandler;

impl InlineObjectHandler for ImageObjectHandler {
    fn intrinsic_size(&self, overlay: &InlineImageOverlay) -> Size {
        overlay.size()
    }

    fn draw(&self, overlay: &mut InlineImageOverlay, rect: Rect) {
        overlay.set_geometry(rect);
    }
}

/// One embedded image: its kind id and the overlay showing it.
#[derive(Debug)]
pub struct InlineImageReference {
    kind_id: KindId,
    overlay: InlineImageOverlay,
}

impl InlineImageReference {
    pub const fn kind_id(&self) -> KindId {
        self.kind_id
    }

    /// The sentinel marking this object in the text.
    pub const fn placeholder_char(&self) -> char {
        PLACEHOLDER
    }

    pub const fn overlay(&self) -> &InlineImageOverlay {
        &self.overlay
    }

    pub const fn overlay_mut(&mut self) -> &mut InlineImageOverlay {
        &mut self.overlay
    }
}

#[derive(Debug)]
struct Entry {
    reference: InlineImageReference,
    handler: Box<dyn InlineObjectHandler>,
}

/// Kind id → inline image mapping.
///
/// The registry owns the id counter, so ids are unique for its lifetime.
#[derive(Debug)]
pub struct ObjectRegistry {
    entries: BTreeMap<KindId, Entry>,
    next_kind: KindId,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_kind: FIRST_KIND,
        }
    }

    /// Hand out a fresh kind id.
    pub const fn allocate_kind(&mut self) -> KindId {
        let kind = self.next_kind;
        self.next_kind = kind.next();
        kind
    }

    /// Register `overlay` under `kind` with its layout handler.
    pub fn register(
        &mut self,
        kind: KindId,
        overlay: InlineImageOverlay,
        handler: Box<dyn InlineObjectHandler>,
    ) -> &InlineImageReference {
        let entry = Entry {
            reference: InlineImageReference {
                kind_id: kind,
                overlay,
            },
            handler,
        };
        let entry = self.entries.entry(kind).insert_entry(entry).into_mut();
        &entry.reference
    }

    /// Remove `kind` and its handler, returning the reference.
    pub fn evict(&mut self, kind: KindId) -> Option<InlineImageReference> {
        self.entries.remove(&kind).map(|entry| entry.reference)
    }

    pub fn get(&self, kind: KindId) -> Option<&InlineImageReference> {
        self.entries.get(&kind).map(|entry| &entry.reference)
    }

    pub fn get_mut(&mut self, kind: KindId) -> Option<&mut InlineImageReference> {
        self.entries.get_mut(&kind).map(|entry| &mut entry.reference)
    }

    pub fn contains(&self, kind: KindId) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Every registered kind.
    pub fn kinds(&self) -> BTreeSet<KindId> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InlineImageReference> {
        self.entries.values().map(|entry| &entry.reference)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ask the handler for `kind` how much space to reserve.
    pub fn measure(&self, kind: KindId) -> Option<Size> {
        let entry = self.entries.get(&kind)?;
        Some(entry.handler.intrinsic_size(&entry.reference.overlay))
    }

    /// Hand the allocated rect to the handler for `kind`.
    ///
    /// Returns `false` if `kind` is not registered.
    pub fn draw(&mut self, kind: KindId, rect: Rect) -> bool {
        let Some(entry) = self.entries.get_mut(&kind) else {
            return false;
        };
        entry.handler.draw(&mut entry.reference.overlay, rect);
        true
    }

    /// The visible overlay under `point`, if any.
    pub fn kind_at_point(&self, point: Point) -> Option<KindId> {
        self.entries
            .values()
            .map(|entry| &entry.reference)
            .filter(|reference| reference.overlay.is_visible())
            .find(|reference| reference.overlay.geometry().contains(point))
            .map(InlineImageReference::kind_id)
    }
}
