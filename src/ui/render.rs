use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear};

use crate::app::Model;
use crate::document::{GlyphKind, LayoutLine};
use crate::overlay::GripState;

use super::{
    CellSpan, DOCUMENT_LEFT_PADDING, GRIP_COLOR, SELECTION_COLOR, images, overlays, status,
};

/// Drawn in place of a placeholder no object is registered for.
const ORPHAN_SYMBOL: &str = "\u{25a2}";

/// Where document text goes: everything but the status row, padded on the
/// left.
pub fn document_area(area: Rect) -> Rect {
    let padding = DOCUMENT_LEFT_PADDING.min(area.width);
    Rect {
        x: area.x + padding,
        y: area.y,
        width: area.width - padding,
        height: area.height.saturating_sub(1),
    }
}

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let doc_area = document_area(area);

    // Clear first so image cells from the previous frame do not leak.
    frame.render_widget(Clear, area);

    render_text(model, frame, doc_area);
    render_object_boxes(model, frame, doc_area);
    if model.images_enabled {
        images::render_images(model, frame, doc_area);
    }
    render_selection_frame(model, frame, doc_area);
    render_grip(model, frame, doc_area);

    let toast_active = model.active_toast().is_some();
    if toast_active && area.height >= 2 {
        let toast_area = Rect {
            y: area.y + area.height - 2,
            height: 1,
            ..area
        };
        status::render_toast_bar(model, frame, toast_area);
    }
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1.min(area.height),
        ..area
    };
    status::render_status_bar(model, frame, status_area);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    } else {
        place_caret(model, frame, doc_area);
    }
}

fn render_text(model: &Model, frame: &mut Frame, doc_area: Rect) {
    let scroll = model.viewport.offset();
    let selection = model.surface.selection();
    let buf = frame.buffer_mut();

    for line in visible_lines(model, doc_area) {
        for glyph in &line.glyphs {
            let GlyphKind::Text(ch) = glyph.kind else {
                continue;
            };
            if glyph.rect.width == 0 {
                continue;
            }
            let Some((cell, _)) = CellSpan::of(glyph.rect).on_screen(doc_area, scroll) else {
                continue;
            };
            let selected = selection
                .as_ref()
                .is_some_and(|range| range.contains(&glyph.offset));
            let style = if selected {
                Style::default().reversed()
            } else {
                Style::default()
            };
            let symbol = if ch == '\t' {
                " ".repeat(cell.width as usize)
            } else {
                ch.to_string()
            };
            // Text sits on the last row of its span.
            let y = cell.y + cell.height - 1;
            buf.set_stringn(cell.x, y, symbol, cell.width as usize, style);
        }
    }
}

/// Orphan placeholders and images without a terminal bitmap.
fn render_object_boxes(model: &Model, frame: &mut Frame, doc_area: Rect) {
    let scroll = model.viewport.offset();
    let selection = model.surface.selection();
    let dim = Style::default().fg(Color::DarkGray);

    for (offset, tag, rect) in model.surface.layout().object_boxes() {
        let Some((cell, clipped_top)) = CellSpan::of(rect).on_screen(doc_area, scroll) else {
            continue;
        };
        let selected = selection
            .as_ref()
            .is_some_and(|range| range.contains(&offset));
        let Some(kind) = tag else {
            let style = if selected { dim.reversed() } else { dim };
            let y = cell.y + cell.height - 1;
            frame
                .buffer_mut()
                .set_stringn(cell.x, y, ORPHAN_SYMBOL, 1, style);
            continue;
        };
        if model.images_enabled && model.image_protocols.contains_key(&kind) {
            continue;
        }

        let unavailable = model
            .surface
            .overlay(kind)
            .is_none_or(|overlay| overlay.is_empty_box());
        let borders = if clipped_top > 0 {
            Borders::ALL - Borders::TOP
        } else {
            Borders::ALL
        };
        let mut block = Block::default().borders(borders).border_style(dim);
        if unavailable && clipped_top == 0 && cell.width > 4 {
            block = block.title("?");
        }
        if selected {
            block = block.style(Style::default().reversed());
        }
        if cell.width < 2 || cell.height < 2 {
            frame
                .buffer_mut()
                .set_stringn(cell.x, cell.y, ORPHAN_SYMBOL, 1, dim);
        } else {
            frame.render_widget(block, cell);
        }
    }
}

fn render_selection_frame(model: &Model, frame: &mut Frame, doc_area: Rect) {
    let Some(selection) = model.canvas.selection_frame() else {
        return;
    };
    let Some((cell, clipped_top)) =
        CellSpan::of(selection).on_screen(doc_area, model.viewport.offset())
    else {
        return;
    };
    let borders = if clipped_top > 0 {
        Borders::ALL - Borders::TOP
    } else {
        Borders::ALL
    };
    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(SELECTION_COLOR));
    frame.render_widget(block, cell);
}

fn render_grip(model: &Model, frame: &mut Frame, doc_area: Rect) {
    let Some(grip) = model.canvas.active_grip() else {
        return;
    };
    if !model.canvas.contains(crate::canvas::CanvasItem::Grip) {
        return;
    }
    let Some((cell, _)) = CellSpan::of(grip.rect()).on_screen(doc_area, model.viewport.offset())
    else {
        return;
    };
    let symbol = match grip.state() {
        GripState::Armed | GripState::Dragging => "\u{25e2}",
        GripState::Idle | GripState::Resolved => " ",
    };
    let buf = frame.buffer_mut();
    for y in cell.top()..cell.bottom() {
        for x in cell.left()..cell.right() {
            buf[(x, y)].set_symbol(symbol).set_bg(GRIP_COLOR).set_fg(Color::Black);
        }
    }
}

fn place_caret(model: &Model, frame: &mut Frame, doc_area: Rect) {
    let caret = model.surface.caret_rect();
    if let Some((cell, _)) = CellSpan::of(caret).on_screen(doc_area, model.viewport.offset()) {
        frame.set_cursor_position((cell.x, cell.y + cell.height - 1));
    }
}

/// Rows of the layout that overlap the visible part of the document.
fn visible_lines<'a>(model: &'a Model, doc_area: Rect) -> impl Iterator<Item = &'a LayoutLine> {
    let cell_height = i64::from(crate::document::CELL_HEIGHT);
    let top = i64::try_from(model.viewport.offset()).unwrap_or(i64::MAX) * cell_height;
    let bottom = top + i64::from(doc_area.height) * cell_height;
    model
        .surface
        .layout()
        .lines()
        .iter()
        .filter(move |line| i64::from(line.bottom()) > top && i64::from(line.top) < bottom)
}
