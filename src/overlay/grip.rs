use crate::document::DocumentTextSurface;
use crate::editor::KindId;
use crate::error::{EditorError, Result};
use crate::geometry::{Point, Rect, Size};

use super::InlineImageOverlay;

/// Side length of the square resize handle.
pub const GRIP_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripState {
    /// Shown, not pressed.
    Idle,
    /// Pressed; the placeholder position is resolved.
    Armed,
    /// At least one drag tick has been applied.
    Dragging,
    /// Released and removed from the canvas.
    Resolved,
}

/// A completed drag tick: the placeholder was swapped for a freshly
/// registered object at the new size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reinsertion {
    pub previous: KindId,
    pub current: KindId,
    /// Offset of the new placeholder.
    pub position: usize,
    pub rect: Rect,
}

/// Resize handle at the bottom-right corner of a selected inline image.
///
/// Press resolves which placeholder the image belongs to and remembers the
/// offset just after it. Each drag tick resizes the image and replaces the
/// placeholder with a new one carrying the new size, keeping that offset.
#[derive(Debug, Clone)]
pub struct SelectionGripOverlay {
    state: GripState,
    bound: KindId,
    /// The selected image's rect; its top-left stays put while dragging.
    frame: Rect,
    anchor_point: Option<Point>,
    tracked_text_position: Option<usize>,
}

impl SelectionGripOverlay {
    pub const fn new(bound: KindId, frame: Rect) -> Self {
        Self {
            state: GripState::Idle,
            bound,
            frame,
            anchor_point: None,
            tracked_text_position: None,
        }
    }

    pub const fn state(&self) -> GripState {
        self.state
    }

    /// Kind of the image the grip resizes.
    pub const fn bound(&self) -> KindId {
        self.bound
    }

    pub const fn frame(&self) -> Rect {
        self.frame
    }

    /// Where the press landed.
    pub const fn anchor_point(&self) -> Option<Point> {
        self.anchor_point
    }

    /// Offset just after the bound placeholder, once pressed.
    pub const fn tracked_text_position(&self) -> Option<usize> {
        self.tracked_text_position
    }

    /// The handle's own rect, hanging off the frame's bottom-right corner.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(
            self.frame.bottom_right(),
            Size::new(GRIP_SIZE, GRIP_SIZE),
        )
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.rect().contains(point)
    }

    /// Move the frame to follow a relaid-out image.
    pub const fn reposition(&mut self, frame: Rect) {
        self.frame = frame;
    }

    /// Press on the handle.
    ///
    /// Maps the frame's bottom-right pixel to a text position and searches
    /// backward from there for the placeholder. When that finds a placeholder
    /// belonging to another image, the bound kind's own position is used.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::OutOfBoundsSelection`] when no placeholder for
    /// the image is found. The grip is still armed; drags then resize the
    /// image without reinserting it.
    pub fn press(&mut self, point: Point, surface: &DocumentTextSurface) -> Result<usize> {
        self.anchor_point = Some(point);
        self.state = GripState::Armed;

        let corner = self.frame.bottom_right().offset(-1, -1);
        let cursor = surface.cursor_for_point(corner);
        let found = match surface.locate_placeholder_before(cursor) {
            Some(found) if surface.buffer().object_tag_at(found) == Some(self.bound) => {
                Some(found)
            }
            _ => surface.position_of(self.bound),
        };

        let Some(found) = found else {
            self.tracked_text_position = None;
            tracing::warn!(kind = %self.bound, cursor, "no placeholder for selected image");
            return Err(EditorError::OutOfBoundsSelection {
                position: cursor,
                len: surface.len_chars(),
            });
        };

        let tracked = found + 1;
        self.tracked_text_position = Some(tracked);
        tracing::debug!(kind = %self.bound, tracked, "grip armed");
        Ok(tracked)
    }

    /// One drag tick with the pointer at `point`.
    ///
    /// Returns `Ok(None)` when the grip was never pressed.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::StaleSelection`] when the tracked position no
    /// longer ends in a placeholder. The image is still resized and the grip
    /// stays in [`GripState::Dragging`].
    pub fn drag(
        &mut self,
        point: Point,
        surface: &mut DocumentTextSurface,
    ) -> Result<Option<Reinsertion>> {
        if matches!(self.state, GripState::Idle | GripState::Resolved) {
            return Ok(None);
        }
        self.state = GripState::Dragging;

        let rect = Rect::from_corners(self.frame.top_left(), point);
        self.frame = rect;
        let content = {
            let overlay = surface
                .overlay_mut(self.bound)
                .ok_or(EditorError::UnknownKind(self.bound))?;
            overlay.set_geometry(rect);
            overlay.content().clone()
        };

        let position = match self.tracked_text_position {
            Some(tracked) if surface.placeholder_ends_at(tracked) => tracked - 1,
            tracked => {
                let position = tracked.unwrap_or(0);
                tracing::debug!(kind = %self.bound, position, "stale grip position");
                return Err(EditorError::StaleSelection { position });
            }
        };

        let previous = self.bound;
        surface.remove_range(position..position + 1)?;
        let current = surface
            .insert_image_at(position, InlineImageOverlay::with_size(content, rect.size()))?
            .kind_id();
        surface.rescan_placeholders();
        self.bound = current;

        Ok(Some(Reinsertion {
            previous,
            current,
            position,
            rect,
        }))
    }

    pub const fn resolve(&mut self) {
        self.state = GripState::Resolved;
    }
}
