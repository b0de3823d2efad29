//! Fixed-cell text layout.
//!
//! Every char occupies whole cells of `CELL_WIDTH` x `CELL_HEIGHT` pixels,
//! its advance taken from `unicode-width`. Inline objects occupy the size
//! their handler reports, sit on the line's bottom edge and stretch the line
//! to their height. Lines wrap at the page width.

use std::collections::HashMap;

use unicode_width::UnicodeWidthChar;

use crate::editor::{KindId, PLACEHOLDER, TextBuffer};
use crate::geometry::{Point, Rect, Size};

pub const CELL_WIDTH: u32 = 8;
pub const CELL_HEIGHT: u32 = 16;
const TAB_CELLS: u32 = 4;

/// Size reserved for a placeholder with no registered handler.
pub const EMPTY_OBJECT_SIZE: Size = Size::new(CELL_WIDTH, CELL_HEIGHT);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphKind {
    Text(char),
    Object(Option<KindId>),
}

/// One laid-out char.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub offset: usize,
    pub rect: Rect,
    pub kind: GlyphKind,
}

/// One visual row. A logical line becomes several rows when it wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutLine {
    /// Offset of the first char on the row.
    pub start: usize,
    /// Offset just past the last char on the row, line break excluded.
    pub end: usize,
    pub top: i32,
    pub height: u32,
    pub glyphs: Vec<Glyph>,
}

impl LayoutLine {
    pub fn bottom(&self) -> i32 {
        self.top + self.height as i32
    }

    /// X coordinate just past the last glyph.
    fn end_x(&self) -> i32 {
        self.glyphs.last().map_or(0, |glyph| glyph.rect.right())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLayout {
    lines: Vec<LayoutLine>,
    width: u32,
}

impl TextLayout {
    /// Lay out `buffer` at `width` pixels, asking `measure` for the size of
    /// each placeholder's object.
    pub fn compute(
        buffer: &TextBuffer,
        width: u32,
        mut measure: impl FnMut(Option<KindId>) -> Size,
    ) -> Self {
        let tags: HashMap<usize, Option<KindId>> = buffer.placeholders().into_iter().collect();
        let mut lines = Vec::new();
        let mut top = 0i32;

        for line_idx in 0..buffer.line_count() {
            let line_start = buffer.line_start(line_idx);
            let text = buffer.line_at(line_idx).unwrap_or_default();

            let mut row: Vec<(usize, GlyphKind, Size)> = Vec::new();
            let mut row_width = 0u32;
            let mut row_start = line_start;

            for (i, ch) in text.chars().enumerate() {
                let offset = line_start + i;
                let (kind, size) = if ch == PLACEHOLDER {
                    let tag = tags.get(&offset).copied().flatten();
                    (GlyphKind::Object(tag), measure(tag))
                } else {
                    (GlyphKind::Text(ch), Size::new(char_cells(ch) * CELL_WIDTH, CELL_HEIGHT))
                };

                if !row.is_empty() && row_width + size.width > width {
                    let line = place_row(row_start, &row, top);
                    top = line.bottom();
                    lines.push(line);
                    row.clear();
                    row_width = 0;
                    row_start = offset;
                }
                row_width += size.width;
                row.push((offset, kind, size));
            }

            let line = place_row(row_start, &row, top);
            top = line.bottom();
            lines.push(line);
        }

        Self { lines, width }
    }

    pub fn lines(&self) -> &[LayoutLine] {
        &self.lines
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Total height of the laid-out text.
    pub fn height(&self) -> u32 {
        self.lines.last().map_or(0, |line| line.bottom().max(0) as u32)
    }

    /// Every placeholder's allocated box, in text order.
    pub fn object_boxes(&self) -> impl Iterator<Item = (usize, Option<KindId>, Rect)> + '_ {
        self.lines
            .iter()
            .flat_map(|line| line.glyphs.iter())
            .filter_map(|glyph| match glyph.kind {
                GlyphKind::Object(tag) => Some((glyph.offset, tag, glyph.rect)),
                GlyphKind::Text(_) => None,
            })
    }

    /// Text position closest to `point`.
    ///
    /// A point on the right half of a glyph maps to the position after it.
    pub fn cursor_for_point(&self, point: Point) -> usize {
        let Some(line) = self
            .lines
            .iter()
            .find(|line| point.y < line.bottom())
            .or_else(|| self.lines.last())
        else {
            return 0;
        };

        line.glyphs
            .iter()
            .find(|glyph| point.x < glyph.rect.x + (glyph.rect.width / 2) as i32)
            .map_or(line.end, |glyph| glyph.offset)
    }

    /// Cell-sized caret box for the position `offset`, sitting on the
    /// baseline of its row.
    pub fn caret_rect(&self, offset: usize) -> Rect {
        let caret = |line: &LayoutLine, x: i32| {
            Rect::new(
                x,
                line.bottom() - CELL_HEIGHT as i32,
                CELL_WIDTH,
                CELL_HEIGHT,
            )
        };

        for (i, line) in self.lines.iter().enumerate() {
            if let Some(glyph) = line.glyphs.iter().find(|glyph| glyph.offset == offset) {
                return caret(line, glyph.rect.x);
            }
            let continues = self
                .lines
                .get(i + 1)
                .is_some_and(|next| next.start == offset);
            if offset == line.end && !continues {
                return caret(line, line.end_x());
            }
        }

        self.lines
            .last()
            .map_or(Rect::new(0, 0, CELL_WIDTH, CELL_HEIGHT), |line| {
                caret(line, line.end_x())
            })
    }
}

fn char_cells(ch: char) -> u32 {
    if ch == '\t' {
        return TAB_CELLS;
    }
    ch.width().unwrap_or(0) as u32
}

fn place_row(start: usize, row: &[(usize, GlyphKind, Size)], top: i32) -> LayoutLine {
    let height = row
        .iter()
        .map(|(_, _, size)| size.height)
        .max()
        .unwrap_or(0)
        .max(CELL_HEIGHT);
    let bottom = top + height as i32;

    let mut x = 0i32;
    let glyphs = row
        .iter()
        .map(|&(offset, kind, size)| {
            let rect = Rect::new(x, bottom - size.height as i32, size.width, size.height);
            x += size.width as i32;
            Glyph { offset, rect, kind }
        })
        .collect::<Vec<_>>();

    let end = glyphs.last().map_or(start, |glyph| glyph.offset + 1);
    LayoutLine {
        start,
        end,
        top,
        height,
        glyphs,
    }
}
