use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::tempdir;

use crate::document::{DocumentTextSurface, RescanPolicy};
use crate::editor::{Direction, KindId};
use crate::geometry::{PageSize, Point, Size};
use crate::image::ImageContent;
use crate::overlay::{GripState, InlineImageOverlay};

use super::event_loop::ResizeDebouncer;
use super::{App, Message, Model, ToastLevel, update};

fn create_test_model() -> Model {
    let surface = DocumentTextSurface::new(PageSize::A0.size(), RescanPolicy::EveryEdit);
    Model::new(surface, (80, 24))
}

/// Model holding one 24x32 image at offset 0, drawn at terminal cells
/// columns 2..5, rows 0..2.
fn create_image_model() -> (Model, KindId) {
    let mut model = create_test_model();
    let overlay =
        InlineImageOverlay::with_size(ImageContent::unavailable("test"), Size::new(24, 32));
    let kind = model.surface.insert_image_at(0, overlay).unwrap().kind_id();
    (model, kind)
}

fn write_png(dir: &std::path::Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 255])))
        .save(&path)
        .unwrap();
    path
}

fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

#[test]
fn test_typing_inserts_text() {
    let model = create_test_model();
    let model = update(model, Message::InsertChar('h'));
    let model = update(model, Message::InsertChar('i'));
    assert_eq!(model.surface.text(), "hi");
    assert_eq!(model.surface.cursor(), 2);
}

#[test]
fn test_backspace_over_image_evicts_it() {
    let (mut model, kind) = create_image_model();
    model.surface.move_to_end(false);
    let model = update(model, Message::DeleteBack);
    assert_eq!(model.surface.len_chars(), 0);
    assert!(!model.surface.registry().contains(kind));
    assert!(!model.surface.retired_overlay(kind).unwrap().is_visible());
}

#[test]
fn test_split_line_scrolls_caret_into_view() {
    let mut model = create_test_model();
    for _ in 0..40 {
        model = update(model, Message::SplitLine);
    }
    assert_eq!(model.viewport.total_rows(), 41);
    assert_eq!(model.viewport.offset(), 18);
}

#[test]
fn test_resize_rewraps_to_terminal_width() {
    let model = create_test_model();
    assert_eq!(model.surface.wrap_width(), 78 * 8);
    let model = update(model, Message::Resize(40, 10));
    assert_eq!(model.surface.wrap_width(), 38 * 8);
    assert_eq!(model.viewport.height(), 9);
    assert_eq!(model.viewport.width(), 38);
}

#[test]
fn test_click_image_selects_it() {
    let (model, kind) = create_image_model();
    let model = update(model, Message::ClickImage(kind));
    assert_eq!(model.canvas.selection_frame(), Some(crate::geometry::Rect::new(0, 0, 24, 32)));
    assert_eq!(model.canvas.active_grip().unwrap().bound(), kind);
}

#[test]
fn test_click_unknown_image_is_ignored() {
    let model = create_test_model();
    let model = update(model, Message::ClickImage(KindId::new(0x9999)));
    assert!(model.canvas.selection_frame().is_none());
}

#[test]
fn test_key_messages_cancel_selection() {
    let (model, kind) = create_image_model();
    let model = update(model, Message::ClickImage(kind));
    let model = update(model, Message::MoveCursor(Direction::Right, false));
    assert!(model.canvas.selection_frame().is_none());
    assert!(model.canvas.render_set().is_empty());
    assert!(model.surface.registry().contains(kind));
    assert_eq!(model.surface.len_chars(), 1);
}

#[test]
fn test_scrolling_keeps_selection() {
    let (model, kind) = create_image_model();
    let model = update(model, Message::ClickImage(kind));
    let model = update(model, Message::ScrollDown(1));
    assert!(model.canvas.selection_frame().is_some());
}

#[test]
fn test_cancels_selection_classification() {
    assert!(Message::CancelSelection.cancels_selection());
    assert!(Message::InsertChar('a').cancels_selection());
    assert!(Message::PageDown.cancels_selection());
    assert!(Message::ClickText(Point::new(0, 0)).cancels_selection());
    assert!(!Message::GripDrag(Point::new(0, 0)).cancels_selection());
    assert!(!Message::ScrollUp(3).cancels_selection());
    assert!(!Message::Resize(80, 24).cancels_selection());
}

#[test]
fn test_mouse_press_on_image_selects() {
    let (model, kind) = create_image_model();
    let msg = App::handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 3, 1), &model);
    assert_eq!(msg, Some(Message::ClickImage(kind)));
}

#[test]
fn test_mouse_press_on_text_moves_cursor() {
    let mut model = create_test_model();
    model.surface.insert_str("hello");
    let msg = App::handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 4, 0), &model);
    let Some(Message::ClickText(point)) = msg else {
        panic!("expected a text click, got {msg:?}");
    };
    let model = update(model, Message::ClickText(point));
    assert_eq!(model.surface.cursor(), 2);
}

#[test]
fn test_mouse_press_on_status_bar_is_ignored() {
    let model = create_test_model();
    let msg = App::handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 4, 23), &model);
    assert!(msg.is_none());
}

#[test]
fn test_drag_without_grip_is_ignored() {
    let model = create_test_model();
    let msg = App::handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 10, 5), &model);
    assert!(msg.is_none());
}

#[test]
fn test_grip_resize_flow() {
    let (model, kind) = create_image_model();
    let model = update(model, Message::ClickImage(kind));

    // The grip hangs off the frame's corner at canvas (24, 32).
    assert!(model.grip_under_cell(5, 2));
    let press = App::handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5, 2), &model)
        .unwrap();
    assert_eq!(press, Message::GripPress(Point::new(28, 40)));
    let model = update(model, press);
    assert_eq!(model.canvas.active_grip().unwrap().state(), GripState::Armed);
    assert_eq!(model.canvas.active_grip().unwrap().tracked_text_position(), Some(1));

    let drag = App::handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 10, 5), &model)
        .unwrap();
    assert_eq!(drag, Message::GripDrag(Point::new(68, 88)));
    let model = update(model, drag);

    assert_eq!(model.surface.len_chars(), 1);
    assert_eq!(model.surface.registry().len(), 1);
    assert!(!model.surface.registry().contains(kind));
    let current = model.canvas.active_grip().unwrap().bound();
    assert_ne!(current, kind);
    assert_eq!(model.surface.overlay(current).unwrap().size(), Size::new(68, 88));
    assert_eq!(model.viewport.total_rows(), 6);

    let release =
        App::handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 10, 5), &model).unwrap();
    assert_eq!(release, Message::GripRelease);
    let model = update(model, release);
    assert!(model.canvas.active_grip().is_none());
    assert!(model.canvas.render_set().is_empty());
    assert!(model.surface.overlay(current).unwrap().is_visible());
}

#[test]
fn test_stale_grip_skips_reinsertion() {
    let mut model = create_test_model();
    model.surface.insert_str("ab");
    let overlay =
        InlineImageOverlay::with_size(ImageContent::unavailable("test"), Size::new(24, 32));
    let kind = model.surface.insert_image_at(2, overlay).unwrap().kind_id();
    let model = update(model, Message::ClickImage(kind));
    let handle = model.canvas.active_grip().unwrap().rect();
    let mut model = update(model, Message::GripPress(handle.top_left()));
    assert_eq!(model.canvas.active_grip().unwrap().tracked_text_position(), Some(3));

    model.surface.move_to(0, false);
    model.surface.insert_str("x");
    let model = update(model, Message::GripDrag(Point::new(120, 80)));

    assert_eq!(model.surface.text(), "xab\u{FFFC}");
    assert!(model.surface.registry().contains(kind));
    let grip = model.canvas.active_grip().unwrap();
    assert_eq!(grip.state(), GripState::Dragging);
    assert_eq!(grip.bound(), kind);
}

#[test]
fn test_insert_picture_with_missing_file_inserts_empty_box() {
    let dir = tempdir().unwrap();
    let mut model = create_test_model();
    model.image_path = Some(dir.path().join("missing.png"));

    let model = update(model, Message::InsertPicture);
    let mut model = model;
    App::handle_message_side_effects(&mut model, &Message::InsertPicture);

    assert_eq!(model.surface.len_chars(), 1);
    assert_eq!(model.surface.registry().len(), 1);
    let reference = model.surface.reference_at(0).unwrap();
    assert!(reference.overlay().is_empty_box());
    assert!(matches!(model.active_toast(), Some((_, ToastLevel::Warning))));
}

#[test]
fn test_insert_picture_decodes_file() {
    let dir = tempdir().unwrap();
    let path = write_png(dir.path(), "dot.png");
    let mut model = create_test_model();
    model.surface.insert_str("ab");
    model.image_path = Some(path);

    App::handle_message_side_effects(&mut model, &Message::InsertPicture);

    assert_eq!(model.surface.text(), "ab\u{FFFC}");
    let overlay = model.surface.reference_at(2).unwrap().overlay();
    assert!(!overlay.is_empty_box());
    assert_eq!(overlay.size(), Size::new(4, 4));
    assert!(matches!(model.active_toast(), Some((_, ToastLevel::Info))));
}

#[test]
fn test_relative_picture_path_uses_working_dir_not_seed_folder() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    let notes = docs.join("notes.txt");
    std::fs::write(&notes, "hi").unwrap();
    write_png(dir.path(), "pic.png");

    let mut model = App::new(Some(notes))
        .with_image_path(Some(PathBuf::from("pic.png")))
        .build_model((80, 24))
        .unwrap();
    assert_eq!(model.loader.base_path(), docs.as_path());
    App::insert_picture_relative_to(&mut model, dir.path());

    let reference = model.surface.registry().iter().next().unwrap();
    assert!(!reference.overlay().is_empty_box());
    assert!(matches!(model.active_toast(), Some((_, ToastLevel::Info))));
}

#[test]
fn test_default_picture_uses_working_dir() {
    let dir = tempdir().unwrap();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([10, 200, 10])))
        .save(dir.path().join(super::DEFAULT_PICTURE))
        .unwrap();
    let mut model = create_test_model();
    model.loader = crate::image::ImageLoader::new(dir.path().join("elsewhere"));

    App::insert_picture_relative_to(&mut model, dir.path());

    assert!(!model.surface.reference_at(0).unwrap().overlay().is_empty_box());
}

#[test]
fn test_insert_picture_replaces_selection() {
    let mut model = create_test_model();
    model.surface.insert_str("abc");
    model.image_path = Some(PathBuf::from("/nonexistent/picture.png"));
    let mut model = update(model, Message::SelectAll);
    App::handle_message_side_effects(&mut model, &Message::InsertPicture);
    assert_eq!(model.surface.text(), "\u{FFFC}");
}

#[test]
fn test_build_model_seeds_text() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "one\r\ntwo").unwrap();

    let model = App::new(Some(path.clone()))
        .with_rescan(RescanPolicy::ShrinkHeuristic)
        .with_page(PageSize::A4)
        .build_model((80, 24))
        .unwrap();
    assert_eq!(model.surface.text(), "one\ntwo");
    assert_eq!(model.surface.policy(), RescanPolicy::ShrinkHeuristic);
    assert_eq!(model.surface.page(), PageSize::A4.size());
    assert_eq!(model.file_path, Some(path));
}

#[test]
fn test_build_model_opens_image_as_picture() {
    let dir = tempdir().unwrap();
    let path = write_png(dir.path(), "cat.png");

    let model = App::new(Some(path)).build_model((80, 24)).unwrap();
    assert_eq!(model.surface.text(), "\u{FFFC}");
    assert!(!model.surface.reference_at(0).unwrap().overlay().is_empty_box());
}

#[test]
fn test_build_model_missing_file_is_error() {
    let dir = tempdir().unwrap();
    let result = App::new(Some(dir.path().join("absent.txt"))).build_model((80, 24));
    assert!(result.is_err());
}

#[test]
fn test_build_model_without_file_is_empty() {
    let model = App::new(None)
        .with_images_enabled(false)
        .build_model((80, 24))
        .unwrap();
    assert_eq!(model.surface.len_chars(), 0);
    assert!(!model.images_enabled);
}

#[test]
fn test_handle_key_mapping() {
    let model = create_test_model();
    let cases = [
        (key(KeyCode::Char('x'), KeyModifiers::NONE), Some(Message::InsertChar('x'))),
        (key(KeyCode::Char('X'), KeyModifiers::SHIFT), Some(Message::InsertChar('X'))),
        (key(KeyCode::Char('p'), KeyModifiers::CONTROL), Some(Message::InsertPicture)),
        (key(KeyCode::F(2), KeyModifiers::NONE), Some(Message::InsertPicture)),
        (key(KeyCode::Char('q'), KeyModifiers::CONTROL), Some(Message::Quit)),
        (key(KeyCode::Char('c'), KeyModifiers::CONTROL), Some(Message::Quit)),
        (key(KeyCode::Char('a'), KeyModifiers::CONTROL), Some(Message::SelectAll)),
        (key(KeyCode::Esc, KeyModifiers::NONE), Some(Message::CancelSelection)),
        (key(KeyCode::F(1), KeyModifiers::NONE), Some(Message::ToggleHelp)),
        (key(KeyCode::Left, KeyModifiers::CONTROL), Some(Message::MoveWordLeft(false))),
        (
            key(KeyCode::Right, KeyModifiers::SHIFT),
            Some(Message::MoveCursor(Direction::Right, true)),
        ),
        (key(KeyCode::End, KeyModifiers::CONTROL), Some(Message::MoveToEnd(false))),
        (key(KeyCode::Enter, KeyModifiers::NONE), Some(Message::SplitLine)),
        (key(KeyCode::Tab, KeyModifiers::NONE), Some(Message::InsertChar('\t'))),
        (key(KeyCode::Char('z'), KeyModifiers::ALT), None),
    ];
    for (event, expected) in cases {
        assert_eq!(App::handle_key(event, &model), expected, "{event:?}");
    }
}

#[test]
fn test_help_keys() {
    let model = update(create_test_model(), Message::ToggleHelp);
    assert!(model.help_visible);
    assert_eq!(
        App::handle_key(key(KeyCode::Down, KeyModifiers::NONE), &model),
        Some(Message::HelpScrollDown)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('x'), KeyModifiers::NONE), &model),
        Some(Message::HideHelp)
    );
    let model = update(model, Message::HelpScrollDown);
    assert_eq!(model.help_scroll_offset, 1);
    let model = update(model, Message::HideHelp);
    assert!(!model.help_visible);
    assert_eq!(model.help_scroll_offset, 0);
}

#[test]
fn test_mouse_ignored_while_help_visible() {
    let (model, _) = create_image_model();
    let model = update(model, Message::ToggleHelp);
    let msg = App::handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 3, 1), &model);
    assert!(msg.is_none());
}

#[test]
fn test_dispatch_applies_message() {
    let mut model = create_test_model();
    let mut debouncer = ResizeDebouncer::new(100);
    let event = Event::Key(key(KeyCode::Char('a'), KeyModifiers::NONE));
    assert!(App::dispatch(&event, &mut model, 0, &mut debouncer));
    assert_eq!(model.surface.text(), "a");

    let resize = Event::Resize(100, 30);
    assert!(!App::dispatch(&resize, &mut model, 0, &mut debouncer));
    assert!(debouncer.is_pending());
}

#[test]
fn test_resize_debouncer_waits_for_delay() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(80, 24, 0);
    assert_eq!(debouncer.take_ready(50), None);
    debouncer.queue(100, 30, 60);
    assert_eq!(debouncer.take_ready(120), None);
    assert_eq!(debouncer.take_ready(160), Some((100, 30)));
    assert!(!debouncer.is_pending());
}

#[test]
fn test_quit_sets_flag() {
    let model = update(create_test_model(), Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_shrink_policy_keeps_entry_until_text_shrinks() {
    let surface = DocumentTextSurface::new(PageSize::A0.size(), RescanPolicy::ShrinkHeuristic);
    let mut model = Model::new(surface, (80, 24));
    let overlay =
        InlineImageOverlay::with_size(ImageContent::unavailable("test"), Size::new(16, 16));
    let kind = model.surface.insert_image_at(0, overlay).unwrap().kind_id();

    model.surface.select_all();
    let model = update(model, Message::DeleteBack);
    assert_eq!(model.surface.len_chars(), 0);
    assert!(!model.surface.registry().contains(kind));
}
