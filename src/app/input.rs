use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;

use crate::app::{App, Message, Model};
use crate::editor::{Direction, KindId};
use crate::geometry::Point;
use crate::overlay::GripState;

use super::event_loop::ResizeDebouncer;

#[allow(clippy::cast_possible_wrap)]
const HALF_CELL: i32 = (crate::document::CELL_WIDTH / 2) as i32;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                tracing::trace!(width = w, height = h, "resize queued");
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }

        let grip_held = model
            .canvas
            .active_grip()
            .is_some_and(|grip| matches!(grip.state(), GripState::Armed | GripState::Dragging));

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if model.grip_under_cell(mouse.column, mouse.row) {
                    let point = model.canvas_point(mouse.column, mouse.row)?;
                    return Some(Message::GripPress(point));
                }
                let point = model.canvas_point(mouse.column, mouse.row)?;
                if let Some(kind) = image_under_cell(model, mouse.column, mouse.row) {
                    return Some(Message::ClickImage(kind));
                }
                // Aim at the cell's left edge so the caret lands before the
                // clicked char.
                Some(Message::ClickText(point.offset(-HALF_CELL, 0)))
            }
            MouseEventKind::Drag(MouseButton::Left) if grip_held => {
                Some(Message::GripDrag(clamped_point(model, mouse.column, mouse.row)))
            }
            MouseEventKind::Up(MouseButton::Left) if grip_held => Some(Message::GripRelease),
            MouseEventKind::ScrollDown => {
                if model.viewport.can_scroll_down() {
                    Some(Message::ScrollDown(3))
                } else {
                    None
                }
            }
            MouseEventKind::ScrollUp => {
                if model.viewport.can_scroll_up() {
                    Some(Message::ScrollUp(3))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: event::KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if model.help_visible {
            return match key.code {
                KeyCode::Up => Some(Message::HelpScrollUp),
                KeyCode::Down => Some(Message::HelpScrollDown),
                _ => Some(Message::HideHelp),
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            // Quit
            KeyCode::Char('q' | 'c') if ctrl => Some(Message::Quit),

            // Images
            KeyCode::Char('p') if ctrl => Some(Message::InsertPicture),
            KeyCode::F(2) => Some(Message::InsertPicture),
            KeyCode::Esc => Some(Message::CancelSelection),

            KeyCode::Char('a') if ctrl => Some(Message::SelectAll),
            KeyCode::F(1) => Some(Message::ToggleHelp),

            // Cursor
            KeyCode::Left if ctrl => Some(Message::MoveWordLeft(shift)),
            KeyCode::Right if ctrl => Some(Message::MoveWordRight(shift)),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left, shift)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right, shift)),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up, shift)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down, shift)),
            KeyCode::Home if ctrl => Some(Message::MoveToStart(shift)),
            KeyCode::End if ctrl => Some(Message::MoveToEnd(shift)),
            KeyCode::Home => Some(Message::MoveHome(shift)),
            KeyCode::End => Some(Message::MoveEnd(shift)),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),

            // Editing
            KeyCode::Enter => Some(Message::SplitLine),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Tab => Some(Message::InsertChar('\t')),
            KeyCode::Char(c) if !ctrl && !alt => Some(Message::InsertChar(c)),

            _ => None,
        }
    }

    pub(super) fn view(model: &mut Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

/// The registered image drawn under terminal cell `(column, row)`.
fn image_under_cell(model: &Model, column: u16, row: u16) -> Option<KindId> {
    let area = model.document_area();
    let cell = crate::ui::cell_canvas_rect(column, row, area, model.viewport.offset());
    model
        .surface
        .layout()
        .object_boxes()
        .filter_map(|(_, tag, rect)| tag.map(|kind| (kind, rect)))
        .find(|(kind, rect)| rect.intersects(&cell) && model.surface.registry().contains(*kind))
        .map(|(kind, _)| kind)
}

/// Canvas point under the cell, with the row held inside the document area
/// so drags past its edge keep tracking.
fn clamped_point(model: &Model, column: u16, row: u16) -> Point {
    let area = model.document_area();
    let last_row = area.y + area.height.saturating_sub(1);
    crate::ui::cell_center(
        column,
        row.clamp(area.y, last_row),
        area,
        model.viewport.offset(),
    )
}
