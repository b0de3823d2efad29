//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Scroll position and visible range management
//! - Mapping between canvas pixels and terminal cells
//!
//! One terminal cell stands for `CELL_WIDTH` x `CELL_HEIGHT` canvas pixels.
//! The document starts `DOCUMENT_LEFT_PADDING` columns from the left edge.

pub mod viewport;

mod images;
mod overlays;
mod render;
mod status;

pub use overlays::help_lines;
pub use render::{document_area, render};

use crate::document::{CELL_HEIGHT, CELL_WIDTH};
use crate::geometry::{Point, Rect as CanvasRect};

pub const DOCUMENT_LEFT_PADDING: u16 = 2;

/// Selection frame color.
pub const SELECTION_COLOR: ratatui::style::Color = ratatui::style::Color::Rgb(200, 100, 200);
/// Resize grip color.
pub const GRIP_COLOR: ratatui::style::Color = ratatui::style::Color::Rgb(120, 243, 80);

/// Cells covered by a canvas rect, in document coordinates: columns from the
/// left edge of the text, rows from the top of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub col: i64,
    pub row: i64,
    pub cols: u16,
    pub rows: u16,
}

impl CellSpan {
    /// Cells whose top-left pixel falls inside `rect`, at least one each way.
    pub fn of(rect: CanvasRect) -> Self {
        let cw = i64::from(CELL_WIDTH);
        let ch = i64::from(CELL_HEIGHT);
        let col = i64::from(rect.x).div_euclid(cw);
        let row = i64::from(rect.y).div_euclid(ch);
        let end_col = i64::from(rect.right()).div_euclid(cw).max(col + 1);
        let end_row = i64::from(rect.bottom()).div_euclid(ch).max(row + 1);
        Self {
            col,
            row,
            cols: u16::try_from(end_col - col).unwrap_or(u16::MAX),
            rows: u16::try_from(end_row - row).unwrap_or(u16::MAX),
        }
    }

    /// Clip to the visible part of the document area.
    ///
    /// Returns the on-screen rect and how many rows were cut off the top.
    pub fn on_screen(
        self,
        area: ratatui::layout::Rect,
        scroll: usize,
    ) -> Option<(ratatui::layout::Rect, u16)> {
        let scroll = i64::try_from(scroll).unwrap_or(i64::MAX);
        let top = self.row - scroll;
        let bottom = top + i64::from(self.rows);
        let right = self.col + i64::from(self.cols);
        let visible_top = top.max(0);
        let visible_bottom = bottom.min(i64::from(area.height));
        let visible_left = self.col.max(0);
        let visible_right = right.min(i64::from(area.width));
        if visible_top >= visible_bottom || visible_left >= visible_right {
            return None;
        }
        let to_u16 = |v: i64| u16::try_from(v).unwrap_or(u16::MAX);
        let rect = ratatui::layout::Rect::new(
            area.x + to_u16(visible_left),
            area.y + to_u16(visible_top),
            to_u16(visible_right - visible_left),
            to_u16(visible_bottom - visible_top),
        );
        Some((rect, to_u16(visible_top - top)))
    }
}

/// Canvas point at the center of the terminal cell `(column, row)`.
///
/// `area` is the document area and `scroll` the first visible row.
pub fn cell_center(column: u16, row: u16, area: ratatui::layout::Rect, scroll: usize) -> Point {
    let origin = cell_origin(column, row, area, scroll);
    origin.offset(
        i32::try_from(CELL_WIDTH / 2).unwrap_or(0),
        i32::try_from(CELL_HEIGHT / 2).unwrap_or(0),
    )
}

/// The canvas pixels covered by terminal cell `(column, row)`.
pub fn cell_canvas_rect(
    column: u16,
    row: u16,
    area: ratatui::layout::Rect,
    scroll: usize,
) -> CanvasRect {
    CanvasRect::from_origin_size(
        cell_origin(column, row, area, scroll),
        crate::geometry::Size::new(CELL_WIDTH, CELL_HEIGHT),
    )
}

fn cell_origin(column: u16, row: u16, area: ratatui::layout::Rect, scroll: usize) -> Point {
    let col = i64::from(column) - i64::from(area.x);
    let row = i64::from(row) - i64::from(area.y) + i64::try_from(scroll).unwrap_or(i64::MAX);
    let to_i32 = |v: i64| i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX });
    Point::new(
        to_i32(col * i64::from(CELL_WIDTH)),
        to_i32(row * i64::from(CELL_HEIGHT)),
    )
}

/// Number of terminal rows the document needs.
pub fn rows_for_height(height: u32) -> usize {
    height.div_ceil(CELL_HEIGHT) as usize
}
