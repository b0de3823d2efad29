use std::collections::{BTreeSet, VecDeque};
use std::ops::Range;

use crate::editor::{Direction, KindId, PLACEHOLDER, TextBuffer};
use crate::error::{EditorError, Result};
use crate::geometry::{Point, Rect, Size};
use crate::overlay::InlineImageOverlay;

use super::layout::{CELL_HEIGHT, CELL_WIDTH, EMPTY_OBJECT_SIZE, TextLayout};
use super::registry::{ImageObjectHandler, InlineImageReference, ObjectRegistry};

/// How many evicted references are kept around after a rescan.
const RETIRED_LIMIT: usize = 32;

/// When text edits trigger a placeholder rescan.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RescanPolicy {
    /// After every text mutation.
    #[default]
    #[value(name = "every-edit")]
    EveryEdit,
    /// Only when the text got shorter.
    #[value(name = "shrink")]
    ShrinkHeuristic,
}

impl RescanPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EveryEdit => "every-edit",
            Self::ShrinkHeuristic => "shrink",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "every-edit" | "every_edit" | "always" => Some(Self::EveryEdit),
            "shrink" | "shrink-heuristic" => Some(Self::ShrinkHeuristic),
            _ => None,
        }
    }
}

/// Kinds evicted by one rescan, in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RescanReport {
    pub evicted: Vec<KindId>,
}

impl RescanReport {
    pub fn is_empty(&self) -> bool {
        self.evicted.is_empty()
    }
}

/// Editable text with inline images.
///
/// Owns the text buffer, the object registry and the current layout. Every
/// mutation relays out the text, moves each image overlay onto its
/// placeholder's rect, and rescans placeholders per the [`RescanPolicy`].
/// Cursor and selection changes always rescan.
#[derive(Debug)]
pub struct DocumentTextSurface {
    buffer: TextBuffer,
    registry: ObjectRegistry,
    layout: TextLayout,
    page: Size,
    /// Width text wraps at; never wider than the page.
    wrap_width: u32,
    policy: RescanPolicy,
    /// Length after the last text change, for the shrink heuristic.
    last_len: usize,
    retired: VecDeque<InlineImageReference>,
}

impl DocumentTextSurface {
    pub fn new(page: Size, policy: RescanPolicy) -> Self {
        Self::with_text("", page, policy)
    }

    /// Surface seeded with plain text. Placeholders in `text` are untagged.
    pub fn with_text(text: &str, page: Size, policy: RescanPolicy) -> Self {
        let buffer = TextBuffer::from_text(text);
        let last_len = buffer.len_chars();
        let mut surface = Self {
            buffer,
            registry: ObjectRegistry::new(),
            layout: TextLayout::default(),
            page,
            wrap_width: page.width,
            policy,
            last_len,
            retired: VecDeque::new(),
        };
        surface.relayout();
        surface
    }

    // --- Accessors ---

    pub const fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub const fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub const fn layout(&self) -> &TextLayout {
        &self.layout
    }

    pub const fn page(&self) -> Size {
        self.page
    }

    pub const fn wrap_width(&self) -> u32 {
        self.wrap_width
    }

    /// Wrap text at `width` pixels, clamped to one cell and the page width.
    pub fn set_wrap_width(&mut self, width: u32) {
        let width = width.clamp(CELL_WIDTH, self.page.width.max(CELL_WIDTH));
        if width != self.wrap_width {
            self.wrap_width = width;
            self.relayout();
        }
    }

    pub const fn policy(&self) -> RescanPolicy {
        self.policy
    }

    pub const fn set_policy(&mut self, policy: RescanPolicy) {
        self.policy = policy;
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    pub const fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.buffer.selection()
    }

    /// References evicted by past rescans, most recent last.
    pub fn retired(&self) -> impl Iterator<Item = &InlineImageReference> {
        self.retired.iter()
    }

    pub fn retired_overlay(&self, kind: KindId) -> Option<&InlineImageOverlay> {
        self.retired
            .iter()
            .rev()
            .find(|reference| reference.kind_id() == kind)
            .map(InlineImageReference::overlay)
    }

    // --- Inline objects ---

    /// Register `overlay` under a fresh kind and insert its placeholder at
    /// `position`. The overlay is shown and laid out before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::OutOfBoundsSelection`] if `position` is past
    /// the end of the text. Nothing is registered in that case.
    pub fn insert_image_at(
        &mut self,
        position: usize,
        mut overlay: InlineImageOverlay,
    ) -> Result<&InlineImageReference> {
        let len = self.len_chars();
        if position > len {
            return Err(EditorError::OutOfBoundsSelection { position, len });
        }

        let kind = self.registry.allocate_kind();
        overlay.show();
        self.registry
            .register(kind, overlay, Box::new(ImageObjectHandler));
        self.edit(|buffer| buffer.insert_object_at(position, kind))?;
        tracing::debug!(%kind, position, "inserted inline image");

        self.registry.get(kind).ok_or(EditorError::UnknownKind(kind))
    }

    /// Insert an image at the cursor, replacing any selection.
    ///
    /// # Errors
    ///
    /// See [`Self::insert_image_at`].
    pub fn insert_image(&mut self, overlay: InlineImageOverlay) -> Result<&InlineImageReference> {
        self.edit(TextBuffer::delete_selection);
        self.insert_image_at(self.cursor(), overlay)
    }

    /// Evict every registered kind whose placeholder is no longer in the
    /// text. Evicted overlays are hidden and kept in [`Self::retired`].
    ///
    /// Running it twice in a row evicts nothing the second time.
    pub fn rescan_placeholders(&mut self) -> RescanReport {
        let present: BTreeSet<KindId> = self
            .buffer
            .placeholders()
            .into_iter()
            .filter_map(|(_, tag)| tag)
            .collect();
        let missing: Vec<KindId> = self
            .registry
            .kinds()
            .difference(&present)
            .copied()
            .collect();

        let mut report = RescanReport::default();
        for kind in missing {
            let Some(mut reference) = self.registry.evict(kind) else {
                continue;
            };
            reference.overlay_mut().hide();
            tracing::debug!(%kind, "evicted inline image");
            report.evicted.push(kind);
            self.retire(reference);
        }
        report
    }

    /// Text-changed hook. Rescans unless the shrink heuristic says the text
    /// did not get shorter.
    pub fn on_text_changed(&mut self) -> Option<RescanReport> {
        let len = self.len_chars();
        let shrunk = len < self.last_len;
        self.last_len = len;
        match self.policy {
            RescanPolicy::EveryEdit => Some(self.rescan_placeholders()),
            RescanPolicy::ShrinkHeuristic if shrunk => Some(self.rescan_placeholders()),
            RescanPolicy::ShrinkHeuristic => None,
        }
    }

    /// Cursor/selection-changed hook. Always rescans.
    pub fn on_selection_changed(&mut self) -> RescanReport {
        self.rescan_placeholders()
    }

    /// Nearest placeholder strictly before `position`.
    pub fn locate_placeholder_before(&self, position: usize) -> Option<usize> {
        let end = position.min(self.len_chars());
        (0..end)
            .rev()
            .find(|&offset| self.buffer.char_at(offset) == Some(PLACEHOLDER))
    }

    /// Whether the char just before `position` is a placeholder.
    pub fn placeholder_ends_at(&self, position: usize) -> bool {
        position
            .checked_sub(1)
            .and_then(|offset| self.buffer.char_at(offset))
            == Some(PLACEHOLDER)
    }

    /// The registered object whose placeholder sits at `offset`.
    pub fn reference_at(&self, offset: usize) -> Option<&InlineImageReference> {
        self.buffer
            .object_tag_at(offset)
            .and_then(|kind| self.registry.get(kind))
    }

    /// Offset of the placeholder tagged with `kind`.
    pub fn position_of(&self, kind: KindId) -> Option<usize> {
        self.buffer
            .placeholders()
            .into_iter()
            .find(|&(_, tag)| tag == Some(kind))
            .map(|(offset, _)| offset)
    }

    pub fn overlay(&self, kind: KindId) -> Option<&InlineImageOverlay> {
        self.registry.get(kind).map(InlineImageReference::overlay)
    }

    pub fn overlay_mut(&mut self, kind: KindId) -> Option<&mut InlineImageOverlay> {
        self.registry
            .get_mut(kind)
            .map(InlineImageReference::overlay_mut)
    }

    /// The visible image under `point`.
    pub fn object_at_point(&self, point: Point) -> Option<KindId> {
        self.registry.kind_at_point(point)
    }

    // --- Geometry ---

    /// Text position nearest to `point`.
    pub fn cursor_for_point(&self, point: Point) -> usize {
        self.layout.cursor_for_point(point)
    }

    pub fn caret_rect(&self) -> Rect {
        self.layout.caret_rect(self.cursor())
    }

    /// Height of the laid-out text, never less than one cell row.
    pub fn content_height(&self) -> u32 {
        self.layout.height().max(CELL_HEIGHT)
    }

    // --- Editing ---

    pub fn insert_char(&mut self, ch: char) {
        self.edit(|buffer| buffer.insert_char(ch));
    }

    pub fn insert_str(&mut self, text: &str) {
        self.edit(|buffer| buffer.insert_str(text));
    }

    pub fn split_line(&mut self) {
        self.edit(TextBuffer::split_line);
    }

    pub fn delete_back(&mut self) -> bool {
        self.edit(TextBuffer::delete_back)
    }

    pub fn delete_forward(&mut self) -> bool {
        self.edit(TextBuffer::delete_forward)
    }

    pub fn delete_selection(&mut self) -> bool {
        self.edit(TextBuffer::delete_selection)
    }

    /// Remove `range`, returning the removed text.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::OutOfBoundsSelection`] if `range` leaves the
    /// text.
    pub fn remove_range(&mut self, range: Range<usize>) -> Result<String> {
        self.edit(|buffer| buffer.remove(range))
    }

    /// Replace `range` with plain `text` as one edit.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::OutOfBoundsSelection`] if `range` leaves the
    /// text.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) -> Result<()> {
        self.edit(|buffer| {
            let start = range.start;
            buffer.remove(range)?;
            buffer.insert_at(start, text).map(|_| ())
        })
    }

    /// Drop everything from `len` on.
    ///
    /// # Errors
    ///
    /// Never fails for a `len` inside the text; kept fallible to match the
    /// other range edits.
    pub fn truncate(&mut self, len: usize) -> Result<String> {
        self.edit(|buffer| buffer.truncate(len))
    }

    // --- Cursor movement ---

    pub fn move_cursor(&mut self, direction: Direction, extend: bool) {
        self.edit(|buffer| buffer.move_cursor(direction, extend));
    }

    pub fn move_to(&mut self, offset: usize, extend: bool) {
        let offset = offset.min(self.len_chars());
        self.edit(|buffer| buffer.move_to(offset, extend));
    }

    pub fn move_home(&mut self, extend: bool) {
        self.edit(|buffer| buffer.move_home(extend));
    }

    pub fn move_end(&mut self, extend: bool) {
        self.edit(|buffer| buffer.move_end(extend));
    }

    pub fn move_word_left(&mut self, extend: bool) {
        self.edit(|buffer| buffer.move_word_left(extend));
    }

    pub fn move_word_right(&mut self, extend: bool) {
        self.edit(|buffer| buffer.move_word_right(extend));
    }

    pub fn move_to_start(&mut self, extend: bool) {
        self.edit(|buffer| buffer.move_to_start(extend));
    }

    pub fn move_to_end(&mut self, extend: bool) {
        self.edit(|buffer| buffer.move_to_end(extend));
    }

    pub fn select_all(&mut self) {
        self.edit(TextBuffer::select_all);
    }

    pub fn clear_selection(&mut self) {
        self.edit(TextBuffer::clear_selection);
    }

    // --- Private helpers ---

    /// Run a buffer operation, then fire the text-changed and
    /// selection-changed hooks for whatever it changed.
    fn edit<T>(&mut self, op: impl FnOnce(&mut TextBuffer) -> T) -> T {
        let revision = self.buffer.revision();
        let caret = (self.buffer.cursor(), self.buffer.selection());

        let out = op(&mut self.buffer);

        if self.buffer.revision() != revision {
            self.relayout();
            self.on_text_changed();
        }
        if (self.buffer.cursor(), self.buffer.selection()) != caret {
            self.on_selection_changed();
        }
        out
    }

    /// Lay the text out again and hand every image its new rect.
    fn relayout(&mut self) {
        let registry = &self.registry;
        let layout = TextLayout::compute(&self.buffer, self.wrap_width, |tag| {
            tag.and_then(|kind| registry.measure(kind))
                .unwrap_or(EMPTY_OBJECT_SIZE)
        });
        for (_, tag, rect) in layout.object_boxes() {
            if let Some(kind) = tag {
                self.registry.draw(kind, rect);
            }
        }
        self.layout = layout;
    }

    fn retire(&mut self, reference: InlineImageReference) {
        if self.retired.len() == RETIRED_LIMIT {
            self.retired.pop_front();
        }
        self.retired.push_back(reference);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageContent;

    const PAGE: Size = Size::new(595, 842);

    fn image(width: u32, height: u32) -> InlineImageOverlay {
        InlineImageOverlay::with_size(ImageContent::unavailable("test"), Size::new(width, height))
    }

    fn surface(text: &str) -> DocumentTextSurface {
        DocumentTextSurface::with_text(text, PAGE, RescanPolicy::EveryEdit)
    }

    #[test]
    fn test_insert_image_registers_and_lays_out() {
        let mut surface = surface("ab");
        let reference = surface.insert_image_at(1, image(40, 32)).unwrap();
        let kind = reference.kind_id();
        assert!(reference.overlay().is_visible());

        assert_eq!(surface.text(), "a\u{FFFC}b");
        assert_eq!(surface.buffer().object_tag_at(1), Some(kind));
        assert_eq!(surface.overlay(kind).unwrap().geometry(), Rect::new(8, 0, 40, 32));
        assert_eq!(surface.reference_at(1).unwrap().kind_id(), kind);
        assert_eq!(surface.position_of(kind), Some(1));
    }

    #[test]
    fn test_insert_image_past_end_registers_nothing() {
        let mut surface = surface("ab");
        let err = surface.insert_image_at(5, image(10, 10)).unwrap_err();
        assert!(matches!(
            err,
            EditorError::OutOfBoundsSelection { position: 5, len: 2 }
        ));
        assert!(surface.registry().is_empty());
        assert_eq!(surface.text(), "ab");
    }

    #[test]
    fn test_insert_image_at_cursor_replaces_selection() {
        let mut surface = surface("hello");
        surface.move_to(1, false);
        surface.move_to(4, true);
        let kind = surface.insert_image(image(8, 8)).unwrap().kind_id();
        assert_eq!(surface.text(), "h\u{FFFC}o");
        assert_eq!(surface.cursor(), 2);
        assert_eq!(surface.position_of(kind), Some(1));
    }

    #[test]
    fn test_deleting_placeholder_evicts_kind() {
        let mut surface = surface("ab");
        let kind = surface.insert_image_at(1, image(10, 10)).unwrap().kind_id();
        surface.remove_range(1..2).unwrap();

        assert!(!surface.registry().contains(kind));
        assert!(!surface.retired_overlay(kind).unwrap().is_visible());
        assert!(surface.rescan_placeholders().is_empty());
    }

    #[test]
    fn test_shrink_heuristic_skips_growth() {
        let mut surface = DocumentTextSurface::with_text("abc", PAGE, RescanPolicy::ShrinkHeuristic);
        let kind = surface.insert_image_at(1, image(10, 10)).unwrap().kind_id();

        // Same-length replacement of the placeholder: no rescan.
        surface.replace_range(1..2, "x").unwrap();
        assert!(surface.registry().contains(kind));

        let report = surface.rescan_placeholders();
        assert_eq!(report.evicted, vec![kind]);
    }

    #[test]
    fn test_cursor_move_triggers_rescan() {
        let mut surface = DocumentTextSurface::with_text("abc", PAGE, RescanPolicy::ShrinkHeuristic);
        let kind = surface.insert_image_at(1, image(10, 10)).unwrap().kind_id();
        surface.replace_range(1..2, "x").unwrap();
        assert!(surface.registry().contains(kind));

        surface.move_cursor(Direction::Right, false);
        assert!(!surface.registry().contains(kind));
    }

    #[test]
    fn test_locate_placeholder_before() {
        let surface = surface("a\u{FFFC}bc\u{FFFC}d");
        assert_eq!(surface.locate_placeholder_before(6), Some(4));
        assert_eq!(surface.locate_placeholder_before(4), Some(1));
        assert_eq!(surface.locate_placeholder_before(1), None);
        assert_eq!(surface.locate_placeholder_before(100), Some(4));
    }

    #[test]
    fn test_placeholder_ends_at() {
        let surface = surface("a\u{FFFC}");
        assert!(surface.placeholder_ends_at(2));
        assert!(!surface.placeholder_ends_at(1));
        assert!(!surface.placeholder_ends_at(0));
        assert!(!surface.placeholder_ends_at(9));
    }

    #[test]
    fn test_untagged_placeholder_is_inert() {
        let mut surface = surface("x\u{FFFC}y");
        assert!(surface.reference_at(1).is_none());
        assert!(surface.rescan_placeholders().is_empty());
        let boxes: Vec<_> = surface.layout().object_boxes().collect();
        assert_eq!(boxes, vec![(1, None, Rect::new(8, 0, 8, 16))]);
    }

    #[test]
    fn test_object_at_point_and_cursor_for_point() {
        let mut surface = surface("ab");
        let kind = surface.insert_image_at(1, image(40, 32)).unwrap().kind_id();
        assert_eq!(surface.object_at_point(Point::new(20, 10)), Some(kind));
        assert_eq!(surface.object_at_point(Point::new(2, 2)), None);
        assert_eq!(surface.cursor_for_point(Point::new(47, 31)), 2);
    }

    #[test]
    fn test_truncate_before_placeholder_evicts() {
        let mut surface = surface("abc");
        let kind = surface.insert_image_at(3, image(10, 10)).unwrap().kind_id();
        surface.truncate(2).unwrap();
        assert_eq!(surface.text(), "ab");
        assert!(!surface.registry().contains(kind));
    }

    #[test]
    fn test_retired_is_bounded() {
        let mut surface = surface("");
        for _ in 0..(RETIRED_LIMIT + 5) {
            surface.insert_image_at(0, image(4, 4)).unwrap();
            surface.remove_range(0..1).unwrap();
        }
        assert_eq!(surface.retired().count(), RETIRED_LIMIT);
    }

    #[test]
    fn test_wrap_width_is_clamped_to_page() {
        let mut surface = surface("abcdef");
        surface.set_wrap_width(10_000);
        assert_eq!(surface.wrap_width(), PAGE.width);

        surface.set_wrap_width(24);
        assert_eq!(surface.layout().lines().len(), 2);
        assert_eq!(surface.content_height(), 32);
    }

    #[test]
    fn test_rescan_policy_parse() {
        assert_eq!(RescanPolicy::parse("shrink"), Some(RescanPolicy::ShrinkHeuristic));
        assert_eq!(RescanPolicy::parse("Every-Edit"), Some(RescanPolicy::EveryEdit));
        assert_eq!(RescanPolicy::parse("sometimes"), None);
        assert_eq!(RescanPolicy::EveryEdit.as_str(), "every-edit");
    }
}
