//! The presentation surface: the page, plus the transient selection items
//! drawn over it.

use crate::document::DocumentTextSurface;
use crate::editor::KindId;
use crate::error::{EditorError, Result};
use crate::geometry::{Point, Rect, Size};
use crate::overlay::{GripState, Reinsertion, SelectionGripOverlay};

/// Handle to a canvas. Overlays keep this instead of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasId(u32);

impl CanvasId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }
}

/// Transient items drawn over the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanvasItem {
    /// Frame around the selected image.
    Selection,
    /// Resize handle at the frame's corner.
    Grip,
}

/// Items currently rendered. Adding a present item or removing an absent
/// one is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSet {
    items: Vec<CanvasItem>,
}

impl RenderSet {
    /// Returns `true` if the item was not already present.
    pub fn add(&mut self, item: CanvasItem) -> bool {
        if self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Returns `true` if the item was present.
    pub fn remove(&mut self, item: CanvasItem) -> bool {
        let before = self.items.len();
        self.items.retain(|&present| present != item);
        self.items.len() != before
    }

    pub fn contains(&self, item: CanvasItem) -> bool {
        self.items.contains(&item)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = CanvasItem> + '_ {
        self.items.iter().copied()
    }
}

#[derive(Debug)]
pub struct Canvas {
    id: CanvasId,
    page: Size,
    render_set: RenderSet,
    active_grip: Option<SelectionGripOverlay>,
}

impl Canvas {
    pub fn new(id: CanvasId, page: Size) -> Self {
        Self {
            id,
            page,
            render_set: RenderSet::default(),
            active_grip: None,
        }
    }

    pub const fn id(&self) -> CanvasId {
        self.id
    }

    pub const fn page(&self) -> Size {
        self.page
    }

    pub const fn page_rect(&self) -> Rect {
        Rect::from_origin_size(Point::new(0, 0), self.page)
    }

    pub const fn render_set(&self) -> &RenderSet {
        &self.render_set
    }

    pub fn contains(&self, item: CanvasItem) -> bool {
        self.render_set.contains(item)
    }

    pub fn add_item(&mut self, item: CanvasItem) -> bool {
        self.render_set.add(item)
    }

    pub fn remove_item(&mut self, item: CanvasItem) -> bool {
        self.render_set.remove(item)
    }

    pub const fn active_grip(&self) -> Option<&SelectionGripOverlay> {
        self.active_grip.as_ref()
    }

    /// The selected image's frame, while something is selected.
    pub fn selection_frame(&self) -> Option<Rect> {
        self.contains(CanvasItem::Selection)
            .then(|| self.active_grip.as_ref().map(SelectionGripOverlay::frame))
            .flatten()
    }

    /// Show the selection frame and `grip`. A grip already bound to the same
    /// image is repositioned instead of replaced.
    pub fn show_grip(&mut self, grip: SelectionGripOverlay) {
        match self.active_grip.as_mut() {
            Some(active) if active.bound() == grip.bound() => active.reposition(grip.frame()),
            _ => self.active_grip = Some(grip),
        }
        self.render_set.add(CanvasItem::Selection);
        self.render_set.add(CanvasItem::Grip);
    }

    /// Select the image registered under `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownKind`] when `kind` is not registered.
    pub fn select(&mut self, kind: KindId, surface: &mut DocumentTextSurface) -> Result<()> {
        let overlay = surface
            .overlay_mut(kind)
            .ok_or(EditorError::UnknownKind(kind))?;
        overlay.on_primary_click(kind, self);
        Ok(())
    }

    /// Whether `point` is on the active grip's handle.
    pub fn grip_at(&self, point: Point) -> bool {
        self.contains(CanvasItem::Grip)
            && self
                .active_grip
                .as_ref()
                .is_some_and(|grip| grip.hit_test(point))
    }

    /// Press on the active grip. `Ok(None)` when there is no grip.
    ///
    /// # Errors
    ///
    /// Propagates [`SelectionGripOverlay::press`] failures.
    pub fn press_grip(
        &mut self,
        point: Point,
        surface: &DocumentTextSurface,
    ) -> Result<Option<usize>> {
        match self.active_grip.as_mut() {
            Some(grip) => grip.press(point, surface).map(Some),
            None => Ok(None),
        }
    }

    /// Drag the active grip. `Ok(None)` when there is no pressed grip.
    ///
    /// The pointer is held inside the page, so a drag never grows an image
    /// past the page's bottom-right corner.
    ///
    /// # Errors
    ///
    /// Propagates [`SelectionGripOverlay::drag`] failures.
    pub fn drag_grip(
        &mut self,
        point: Point,
        surface: &mut DocumentTextSurface,
    ) -> Result<Option<Reinsertion>> {
        let point = self.page_rect().clamp(point);
        match self.active_grip.as_mut() {
            Some(grip) => grip.drag(point, surface),
            None => Ok(None),
        }
    }

    /// Release the grip: both selection items leave the canvas.
    ///
    /// Returns `true` if a grip was active.
    pub fn release_grip(&mut self) -> bool {
        let Some(mut grip) = self.active_grip.take() else {
            return false;
        };
        grip.resolve();
        self.render_set.remove(CanvasItem::Selection);
        self.render_set.remove(CanvasItem::Grip);
        tracing::debug!(kind = %grip.bound(), "grip released");
        true
    }

    /// Move an idle grip's frame onto its image's current rect. The selection
    /// is dropped when the image is no longer registered.
    pub fn follow_layout(&mut self, surface: &DocumentTextSurface) {
        let Some(grip) = self.active_grip.as_mut() else {
            return;
        };
        match surface.overlay(grip.bound()) {
            Some(overlay) if grip.state() == GripState::Idle => {
                grip.reposition(overlay.geometry());
            }
            Some(_) => {}
            None => {
                self.cancel();
            }
        }
    }

    /// Drop the selection frame and grip. Returns `true` if either was shown.
    pub fn cancel(&mut self) -> bool {
        let had_grip = self.active_grip.take().is_some();
        let removed_selection = self.render_set.remove(CanvasItem::Selection);
        let removed_grip = self.render_set.remove(CanvasItem::Grip);
        had_grip || removed_selection || removed_grip
    }
}
