use crate::app::{Model, ToastLevel};
use crate::editor::{Direction, KindId};
use crate::error::EditorError;
use crate::geometry::Point;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a character at the cursor
    InsertChar(char),
    /// Add the configured picture at the cursor
    InsertPicture,
    /// Delete the char before the cursor (Backspace)
    DeleteBack,
    /// Delete the char at the cursor (Delete)
    DeleteForward,
    /// Split line at cursor (Enter)
    SplitLine,
    SelectAll,

    // Cursor; the flag extends the selection
    MoveCursor(Direction, bool),
    MoveHome(bool),
    MoveEnd(bool),
    MoveWordLeft(bool),
    MoveWordRight(bool),
    MoveToStart(bool),
    MoveToEnd(bool),

    // Mouse, in canvas coordinates
    /// Press on text: move the cursor there
    ClickText(Point),
    /// Press on an image: select it
    ClickImage(KindId),
    /// Press on the resize grip
    GripPress(Point),
    /// Pointer moved with the grip held
    GripDrag(Point),
    /// Grip let go
    GripRelease,
    /// Drop the selection frame and grip
    CancelSelection,

    // Navigation
    /// Scroll up by n rows
    ScrollUp(usize),
    /// Scroll down by n rows
    ScrollDown(usize),
    PageUp,
    PageDown,

    // Help
    ToggleHelp,
    HideHelp,
    HelpScrollUp,
    HelpScrollDown,

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,

    // Application
    /// Quit the application
    Quit,
}

impl Message {
    /// Whether this message drops the image selection before it runs.
    ///
    /// Everything a key press produces does; pointer handling on the
    /// selection itself, scrolling and window events do not.
    pub const fn cancels_selection(&self) -> bool {
        !matches!(
            self,
            Self::ClickImage(_)
                | Self::GripPress(_)
                | Self::GripDrag(_)
                | Self::GripRelease
                | Self::ScrollUp(_)
                | Self::ScrollDown(_)
                | Self::HelpScrollUp
                | Self::HelpScrollDown
                | Self::Resize(..)
                | Self::Redraw
                | Self::Quit
        )
    }
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here.
/// Loading pictures from disk is left to the side-effect handler.
pub fn update(mut model: Model, msg: Message) -> Model {
    if msg.cancels_selection() && model.canvas.cancel() {
        tracing::debug!(?msg, "selection cancelled");
    }

    match msg {
        // Editing
        Message::InsertChar(ch) => {
            model.surface.insert_char(ch);
            after_edit(&mut model);
        }
        Message::DeleteBack => {
            if model.surface.delete_back() {
                after_edit(&mut model);
            }
        }
        Message::DeleteForward => {
            if model.surface.delete_forward() {
                after_edit(&mut model);
            }
        }
        Message::SplitLine => {
            model.surface.split_line();
            after_edit(&mut model);
        }
        Message::SelectAll => model.surface.select_all(),

        // Cursor
        Message::MoveCursor(direction, extend) => {
            model.surface.move_cursor(direction, extend);
            model.scroll_to_caret();
        }
        Message::MoveHome(extend) => {
            model.surface.move_home(extend);
            model.scroll_to_caret();
        }
        Message::MoveEnd(extend) => {
            model.surface.move_end(extend);
            model.scroll_to_caret();
        }
        Message::MoveWordLeft(extend) => {
            model.surface.move_word_left(extend);
            model.scroll_to_caret();
        }
        Message::MoveWordRight(extend) => {
            model.surface.move_word_right(extend);
            model.scroll_to_caret();
        }
        Message::MoveToStart(extend) => {
            model.surface.move_to_start(extend);
            model.scroll_to_caret();
        }
        Message::MoveToEnd(extend) => {
            model.surface.move_to_end(extend);
            model.scroll_to_caret();
        }

        // Mouse
        Message::ClickText(point) => {
            let offset = model.surface.cursor_for_point(point);
            model.surface.move_to(offset, false);
        }
        Message::ClickImage(kind) => {
            if let Err(err) = model.canvas.select(kind, &mut model.surface) {
                tracing::warn!(error = %err, "image selection failed");
            }
        }
        Message::GripPress(point) => {
            if let Err(err) = model.canvas.press_grip(point, &model.surface) {
                model.show_toast(ToastLevel::Warning, format!("Resize unavailable: {err}"));
            }
        }
        Message::GripDrag(point) => match model.canvas.drag_grip(point, &mut model.surface) {
            Ok(Some(reinsertion)) => {
                model.image_protocols.remove(&reinsertion.previous);
                model.after_layout_change();
            }
            Ok(None) => {}
            Err(EditorError::StaleSelection { position }) => {
                tracing::warn!(position, "grip lost its placeholder, reinsertion skipped");
                model.after_layout_change();
            }
            Err(err) => {
                tracing::warn!(error = %err, "resize failed");
                model.show_toast(ToastLevel::Error, format!("Resize failed: {err}"));
                model.canvas.cancel();
            }
        },
        Message::GripRelease => {
            model.canvas.release_grip();
            model.prune_image_protocols();
        }

        // Navigation
        Message::ScrollUp(n) => model.viewport.scroll_up(n),
        Message::ScrollDown(n) => model.viewport.scroll_down(n),
        Message::PageUp => model.viewport.page_up(),
        Message::PageDown => model.viewport.page_down(),

        // Help
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
            model.help_scroll_offset = 0;
        }
        Message::HideHelp => {
            model.help_visible = false;
            model.help_scroll_offset = 0;
        }
        Message::HelpScrollUp => {
            model.help_scroll_offset = model.help_scroll_offset.saturating_sub(1);
        }
        Message::HelpScrollDown => {
            let max = crate::ui::help_lines(&model).len().saturating_sub(1);
            model.help_scroll_offset = (model.help_scroll_offset + 1).min(max);
        }

        // Window
        Message::Resize(width, height) => model.resize(width, height),

        // InsertPicture: handled in effects (reads the picture from disk)
        // CancelSelection: the selection was dropped above
        Message::InsertPicture | Message::CancelSelection | Message::Redraw => {}

        Message::Quit => {
            model.should_quit = true;
        }
    }

    model
}

pub(super) fn after_edit(model: &mut Model) {
    model.after_layout_change();
    model.scroll_to_caret();
}
