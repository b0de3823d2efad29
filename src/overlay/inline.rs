use image::RgbaImage;

use crate::canvas::{Canvas, CanvasId};
use crate::editor::KindId;
use crate::geometry::{Point, Rect, Size};
use crate::image::ImageContent;

use super::SelectionGripOverlay;

/// Visual stand-in for one embedded image, positioned on the canvas at the
/// rect the layout allocated for its placeholder.
pub struct InlineImageOverlay {
    geometry: Rect,
    content: ImageContent,
    /// Original pixels rescaled to the geometry's size.
    bitmap: Option<RgbaImage>,
    visible: bool,
    host: Option<CanvasId>,
}

impl InlineImageOverlay {
    /// Overlay at the content's initial size.
    pub fn new(content: ImageContent) -> Self {
        let size = content.initial_size();
        Self::with_size(content, size)
    }

    pub fn with_size(content: ImageContent, size: Size) -> Self {
        let bitmap = content.scaled(size);
        Self {
            geometry: Rect::from_origin_size(Point::default(), size),
            content,
            bitmap,
            visible: false,
            host: None,
        }
    }

    pub const fn geometry(&self) -> Rect {
        self.geometry
    }

    pub const fn size(&self) -> Size {
        self.geometry.size()
    }

    /// Move and resize the overlay. The bitmap is rescaled from the original
    /// when the size changes.
    pub fn set_geometry(&mut self, rect: Rect) {
        if rect.size() != self.geometry.size() {
            self.bitmap = self.content.scaled(rect.size());
        }
        self.geometry = rect;
    }

    pub fn resize(&mut self, size: Size) {
        self.set_geometry(Rect::from_origin_size(self.geometry.top_left(), size));
    }

    pub const fn content(&self) -> &ImageContent {
        &self.content
    }

    pub const fn bitmap(&self) -> Option<&RgbaImage> {
        self.bitmap.as_ref()
    }

    /// Drawn as an empty box because the image never loaded.
    pub const fn is_empty_box(&self) -> bool {
        !self.content.is_available()
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn show(&mut self) {
        self.visible = true;
    }

    pub const fn hide(&mut self) {
        self.visible = false;
    }

    /// The canvas this overlay last reported to.
    pub const fn host(&self) -> Option<CanvasId> {
        self.host
    }

    pub const fn attach_to(&mut self, canvas: CanvasId) {
        self.host = Some(canvas);
    }

    /// Primary-button press on the overlay: put a selection frame and a
    /// resize grip around it on `canvas`.
    pub fn on_primary_click(&mut self, kind: KindId, canvas: &mut Canvas) {
        self.attach_to(canvas.id());
        canvas.show_grip(SelectionGripOverlay::new(kind, self.geometry));
    }
}

impl std::fmt::Debug for InlineImageOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineImageOverlay")
            .field("geometry", &self.geometry)
            .field("available", &self.content.is_available())
            .field(
                "bitmap",
                &self.bitmap.as_ref().map(RgbaImage::dimensions),
            )
            .field("visible", &self.visible)
            .field("host", &self.host)
            .finish()
    }
}
