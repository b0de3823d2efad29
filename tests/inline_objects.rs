use std::collections::BTreeSet;

use proptest::prelude::*;

use picpad::canvas::{Canvas, CanvasId, CanvasItem};
use picpad::document::{DocumentTextSurface, RescanPolicy};
use picpad::editor::{KindId, PLACEHOLDER};
use picpad::geometry::{PageSize, Size};
use picpad::image::ImageContent;
use picpad::overlay::InlineImageOverlay;

fn surface(text: &str) -> DocumentTextSurface {
    DocumentTextSurface::with_text(text, PageSize::A4.size(), RescanPolicy::EveryEdit)
}

fn picture(width: u32, height: u32) -> InlineImageOverlay {
    InlineImageOverlay::with_size(ImageContent::unavailable("fixture"), Size::new(width, height))
}

fn insert(surface: &mut DocumentTextSurface, position: usize) -> KindId {
    surface
        .insert_image_at(position, picture(40, 30))
        .unwrap()
        .kind_id()
}

fn placeholder_count(surface: &DocumentTextSurface) -> usize {
    surface.text().chars().filter(|&ch| ch == PLACEHOLDER).count()
}

#[derive(Debug, Clone)]
enum Edit {
    Image(usize),
    Text(usize, String),
    Delete(usize),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        any::<usize>().prop_map(Edit::Image),
        (any::<usize>(), "[a-z \n]{1,4}").prop_map(|(at, text)| Edit::Text(at, text)),
        any::<usize>().prop_map(Edit::Delete),
    ]
}

proptest! {
    #[test]
    fn registry_tracks_placeholder_count(
        edits in prop::collection::vec(edit_strategy(), 0..24),
        shrink in any::<bool>(),
    ) {
        let mut surface = surface("seed text");
        if shrink {
            surface.set_policy(RescanPolicy::ShrinkHeuristic);
        }
        for edit in edits {
            let len = surface.len_chars();
            match edit {
                Edit::Image(at) => {
                    surface.insert_image_at(at % (len + 1), picture(16, 16)).unwrap();
                }
                Edit::Text(at, text) => {
                    surface.move_to(at % (len + 1), false);
                    surface.insert_str(&text);
                }
                Edit::Delete(at) if len > 0 => {
                    let at = at % len;
                    surface.remove_range(at..at + 1).unwrap();
                }
                Edit::Delete(_) => {}
            }
        }
        surface.rescan_placeholders();
        prop_assert_eq!(surface.registry().len(), placeholder_count(&surface));
        prop_assert_eq!(surface.registry().len(), surface.buffer().placeholder_count());
    }

    #[test]
    fn resize_keeps_count_and_rebinds_kind(
        prefix in "[a-z]{0,6}",
        dx in -20i32..80,
        dy in -20i32..80,
    ) {
        let mut surface = surface(&prefix);
        let mut canvas = Canvas::new(CanvasId::new(1), surface.page());
        let position = prefix.chars().count();
        let before = insert(&mut surface, position);
        let count = placeholder_count(&surface);

        canvas.select(before, &mut surface).unwrap();
        let frame = canvas.selection_frame().unwrap();
        canvas.press_grip(frame.bottom_right(), &surface).unwrap();
        let target = frame.bottom_right().offset(dx, dy);
        let reinsertion = canvas.drag_grip(target, &mut surface).unwrap().unwrap();

        prop_assert_eq!(placeholder_count(&surface), count);
        prop_assert_eq!(reinsertion.previous, before);
        prop_assert_ne!(reinsertion.current, before);
        prop_assert!(!surface.registry().contains(before));
        prop_assert!(surface.registry().contains(reinsertion.current));
        prop_assert_eq!(surface.buffer().object_tag_at(position), Some(reinsertion.current));
    }
}

#[test]
fn deleting_one_placeholder_evicts_only_its_kind() {
    let mut surface = surface("ab");
    let first = insert(&mut surface, 0);
    let second = insert(&mut surface, 2);
    let third = insert(&mut surface, 4);
    assert_eq!(surface.text(), "\u{FFFC}a\u{FFFC}b\u{FFFC}");

    surface.remove_range(2..3).unwrap();
    surface.rescan_placeholders();

    let kinds: BTreeSet<KindId> = surface.registry().kinds();
    assert_eq!(kinds, BTreeSet::from([first, third]));
    let retired = surface.retired_overlay(second).unwrap();
    assert!(!retired.is_visible());
    assert!(surface.overlay(first).is_some());
    assert!(surface.overlay(third).is_some());
}

#[test]
fn rescan_twice_is_idempotent() {
    let mut surface = surface("xyz");
    insert(&mut surface, 1);
    insert(&mut surface, 3);
    surface.set_policy(RescanPolicy::ShrinkHeuristic);
    surface.move_to(0, false);
    surface.insert_char('q');

    surface.rescan_placeholders();
    let kinds = surface.registry().kinds();
    let report = surface.rescan_placeholders();
    assert!(report.is_empty());
    assert_eq!(surface.registry().kinds(), kinds);
}

#[test]
fn insert_select_enlarge_then_cancel() {
    let mut surface = surface("");
    let mut canvas = Canvas::new(CanvasId::new(1), surface.page());
    let before = insert(&mut surface, 0);
    assert_eq!(surface.len_chars(), 1);
    assert_eq!(surface.registry().len(), 1);

    canvas.select(before, &mut surface).unwrap();
    let frame = canvas.selection_frame().unwrap();
    let original = surface.overlay(before).unwrap().size();
    canvas.press_grip(frame.bottom_right(), &surface).unwrap();
    let reinsertion = canvas
        .drag_grip(frame.bottom_right().offset(50, 50), &mut surface)
        .unwrap()
        .unwrap();
    canvas.release_grip();

    assert_eq!(surface.registry().len(), 1);
    let after = reinsertion.current;
    assert_ne!(after, before);
    assert_eq!(
        surface.overlay(after).unwrap().size(),
        Size::new(original.width + 50, original.height + 50)
    );

    canvas.select(after, &mut surface).unwrap();
    assert!(canvas.contains(CanvasItem::Grip));
    assert!(canvas.cancel());
    assert!(!canvas.contains(CanvasItem::Grip));
    assert!(!canvas.contains(CanvasItem::Selection));
    assert!(canvas.render_set().is_empty());
    assert_eq!(surface.registry().len(), 1);
    assert_eq!(surface.text(), "\u{FFFC}");
}

#[test]
fn deleting_leading_placeholder_keeps_the_shifted_one() {
    let mut surface = surface("");
    let first = insert(&mut surface, 0);
    let second = insert(&mut surface, 1);

    surface.remove_range(0..1).unwrap();
    surface.rescan_placeholders();

    assert_eq!(surface.registry().kinds(), BTreeSet::from([second]));
    assert!(!surface.registry().contains(first));
    assert_eq!(surface.buffer().object_tag_at(0), Some(second));
}

#[test]
fn selecting_another_image_replaces_the_grip() {
    let mut surface = surface("a");
    let mut canvas = Canvas::new(CanvasId::new(1), surface.page());
    let first = insert(&mut surface, 0);
    let second = insert(&mut surface, 2);

    canvas.select(first, &mut surface).unwrap();
    canvas.select(second, &mut surface).unwrap();

    assert_eq!(canvas.active_grip().unwrap().bound(), second);
    assert_eq!(canvas.render_set().iter().count(), 2);
}
