//! Viewport management for scrolling.
//!
//! The [`Viewport`] struct tracks which terminal rows of the laid-out
//! document are on screen and handles all scroll operations.

use std::ops::Range;

/// Manages the visible portion of the document.
///
/// The viewport tracks:
/// - Document area dimensions (width, height) in cells
/// - Current scroll offset (in rows)
/// - Total document height in rows
///
/// # Example
///
/// ```
/// use picpad::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(80, 24, 100);
/// assert_eq!(vp.visible_range(), 0..24);
///
/// vp.scroll_down(10);
/// assert_eq!(vp.visible_range(), 10..34);
///
/// vp.ensure_visible(5);
/// assert_eq!(vp.offset(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    offset: usize,
    total_rows: usize,
}

impl Viewport {
    pub const fn new(width: u16, height: u16, total_rows: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            total_rows,
        }
    }

    /// First visible row.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Rows currently on screen, clamped to the document.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.offset;
        let end = (self.offset + self.height as usize).min(self.total_rows);
        start..end
    }

    /// Get the scroll percentage (0-100).
    pub fn scroll_percent(&self) -> u8 {
        let max_offset = self.max_offset();
        if max_offset == 0 {
            return 100;
        }

        // Percentage value always 0-100
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max_offset as f64) * 100.0).round() as u8
        }
    }

    pub const fn can_scroll_up(&self) -> bool {
        self.offset > 0
    }

    pub const fn can_scroll_down(&self) -> bool {
        self.offset < self.max_offset()
    }

    pub const fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    pub const fn page_up(&mut self) {
        self.scroll_up(self.height as usize);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height as usize);
    }

    /// Scroll the least amount that brings rows `row..row + span` into view.
    /// A span taller than the viewport shows its bottom row.
    pub fn ensure_span_visible(&mut self, row: usize, span: usize) {
        let span = span.max(1);
        let last = row + span - 1;
        let height = (self.height as usize).max(1);
        if last >= self.offset + height || (span > height && last < self.offset) {
            self.offset = last + 1 - height;
        } else if span <= height && row < self.offset {
            self.offset = row;
        }
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn ensure_visible(&mut self, row: usize) {
        self.ensure_span_visible(row, 1);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    /// Update the document height (after an edit or relayout).
    pub fn set_total_rows(&mut self, total: usize) {
        self.total_rows = total;
        self.offset = self.offset.min(self.max_offset());
    }

    const fn max_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.height as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_viewport_starts_at_top() {
        let vp = Viewport::new(80, 24, 100);
        assert_eq!(vp.offset(), 0);
        assert!(!vp.can_scroll_up());
        assert!(vp.can_scroll_down());
    }

    #[test]
    fn test_scroll_down_clamps_to_end() {
        let mut vp = Viewport::new(80, 24, 30);
        vp.scroll_down(100);
        assert_eq!(vp.offset(), 6);
        assert_eq!(vp.scroll_percent(), 100);
    }

    #[test]
    fn test_page_up_and_down() {
        let mut vp = Viewport::new(80, 10, 100);
        vp.page_down();
        assert_eq!(vp.offset(), 10);
        vp.page_up();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_ensure_visible_scrolls_minimally() {
        let mut vp = Viewport::new(80, 10, 100);
        vp.ensure_visible(15);
        assert_eq!(vp.offset(), 6);
        vp.ensure_visible(8);
        assert_eq!(vp.offset(), 6);
        vp.ensure_visible(2);
        assert_eq!(vp.offset(), 2);
    }

    #[test]
    fn test_ensure_span_visible_prefers_bottom_of_tall_span() {
        let mut vp = Viewport::new(80, 4, 100);
        vp.ensure_span_visible(10, 6);
        assert_eq!(vp.offset(), 12);
    }

    #[test]
    fn test_ensure_span_visible_tall_span_above_viewport() {
        let mut vp = Viewport::new(80, 4, 100);
        vp.scroll_down(40);
        vp.ensure_span_visible(10, 6);
        assert_eq!(vp.offset(), 12);
    }

    #[test]
    fn test_ensure_span_visible_short_span_above_viewport() {
        let mut vp = Viewport::new(80, 4, 100);
        vp.scroll_down(40);
        vp.ensure_span_visible(10, 2);
        assert_eq!(vp.offset(), 10);
    }

    #[test]
    fn test_shrinking_document_clamps_offset() {
        let mut vp = Viewport::new(80, 10, 100);
        vp.scroll_down(50);
        vp.set_total_rows(20);
        assert_eq!(vp.offset(), 10);
        vp.resize(80, 30);
        assert_eq!(vp.offset(), 0);
        assert_eq!(vp.visible_range(), 0..20);
    }

    #[test]
    fn test_empty_document_is_fully_scrolled() {
        let vp = Viewport::new(80, 10, 0);
        assert_eq!(vp.scroll_percent(), 100);
        assert!(vp.visible_range().is_empty());
    }
}
