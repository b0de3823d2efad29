use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::overlay::GripState;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model.file_path.as_ref().and_then(|p| p.file_name()).map_or_else(
        || "untitled".to_string(),
        |s| s.to_string_lossy().to_string(),
    );

    let surface = &model.surface;
    let (line, col) = surface.buffer().line_col(surface.cursor());
    let images = surface.registry().len();
    let image_label = if images == 1 { "image" } else { "images" };

    let selection_info = model.canvas.active_grip().map_or_else(String::new, |grip| {
        let size = grip.frame().size();
        let state = match grip.state() {
            GripState::Idle => "",
            GripState::Armed => " armed",
            GripState::Dragging => " resizing",
            GripState::Resolved => " done",
        };
        format!("  [{} {}x{}{}]", grip.bound(), size.width, size.height, state)
    });

    let status = format!(
        " {}  Ln {}, Col {}  {} chars  {} {}{}  [{}%]  F1:help",
        filename,
        line + 1,
        col + 1,
        surface.len_chars(),
        images,
        image_label,
        selection_info,
        model.viewport.scroll_percent(),
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
