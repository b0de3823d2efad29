use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use image::DynamicImage;
use image::imageops::FilterType;
use ratatui::layout::Rect as CellRect;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;

use crate::canvas::{Canvas, CanvasId};
use crate::document::{CELL_WIDTH, DocumentTextSurface, RescanPolicy};
use crate::editor::KindId;
use crate::geometry::{PageSize, Point, Size};
use crate::image::ImageLoader;
use crate::overlay::InlineImageOverlay;
use crate::ui::viewport::Viewport;
use crate::ui::{CellSpan, cell_canvas_rect, cell_center, rows_for_height};

/// The canvas every model draws on.
const MAIN_CANVAS: CanvasId = CanvasId::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// Text, placeholders and the object registry
    pub surface: DocumentTextSurface,
    /// Selection frame and resize grip
    pub canvas: Canvas,
    /// Viewport managing scroll position
    pub viewport: Viewport,
    /// File the initial text came from
    pub file_path: Option<PathBuf>,
    /// Picture inserted by "add picture"
    pub image_path: Option<PathBuf>,
    /// Decoded pictures, cached by path
    pub loader: ImageLoader,
    /// Image picker for terminal rendering
    pub picker: Option<Picker>,
    /// Terminal protocols per image, with the size they were built for
    pub image_protocols: HashMap<KindId, (StatefulProtocol, Size)>,
    /// Whether images are drawn as pictures or as boxes
    pub images_enabled: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Whether help overlay is visible
    pub help_visible: bool,
    pub help_scroll_offset: usize,
    toast: Option<Toast>,
    terminal_size: (u16, u16),
    /// Whether the app should quit
    pub should_quit: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("image_path", &self.image_path)
            .field("len_chars", &self.surface.len_chars())
            .field("images", &self.surface.registry().len())
            .field("help_visible", &self.help_visible)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model around `surface` for a terminal of `terminal_size`.
    pub fn new(surface: DocumentTextSurface, terminal_size: (u16, u16)) -> Self {
        let canvas = Canvas::new(MAIN_CANVAS, surface.page());
        let mut model = Self {
            surface,
            canvas,
            viewport: Viewport::new(terminal_size.0, terminal_size.1.saturating_sub(1), 0),
            file_path: None,
            image_path: None,
            loader: ImageLoader::new(PathBuf::from(".")),
            picker: None,
            image_protocols: HashMap::new(),
            images_enabled: true,
            config_global_path: None,
            config_local_path: None,
            help_visible: false,
            help_scroll_offset: 0,
            toast: None,
            terminal_size,
            should_quit: false,
        };
        model.resize(terminal_size.0, terminal_size.1);
        model
    }

    /// Set the image picker.
    #[must_use]
    pub fn with_picker(mut self, picker: Option<Picker>) -> Self {
        self.picker = picker;
        self
    }

    /// The terminal area text is drawn in.
    pub fn document_area(&self) -> CellRect {
        crate::ui::document_area(CellRect::new(
            0,
            0,
            self.terminal_size.0,
            self.terminal_size.1,
        ))
    }

    /// Re-fit the document to a resized terminal.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        let area = self.document_area();
        self.viewport.resize(area.width, area.height);
        self.surface
            .set_wrap_width(u32::from(area.width.max(1)) * CELL_WIDTH);
        self.after_layout_change();
    }

    /// Keep the viewport, the selection frame and the protocol cache in step
    /// with a new layout.
    pub(super) fn after_layout_change(&mut self) {
        self.viewport
            .set_total_rows(rows_for_height(self.surface.content_height()));
        self.canvas.follow_layout(&self.surface);
        self.prune_image_protocols();
    }

    /// Scroll so the caret is on screen.
    pub(super) fn scroll_to_caret(&mut self) {
        let span = CellSpan::of(self.surface.caret_rect());
        let row = usize::try_from(span.row).unwrap_or(0);
        self.viewport.ensure_span_visible(row, usize::from(span.rows));
    }

    /// Canvas point under terminal cell `(column, row)`, or `None` outside
    /// the document area.
    pub fn canvas_point(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.document_area();
        (row >= area.y && row < area.bottom())
            .then(|| cell_center(column, row, area, self.viewport.offset()))
    }

    /// Whether terminal cell `(column, row)` touches the active grip.
    pub fn grip_under_cell(&self, column: u16, row: u16) -> bool {
        let area = self.document_area();
        if row < area.y || row >= area.bottom() {
            return false;
        }
        let cell = cell_canvas_rect(column, row, area, self.viewport.offset());
        self.canvas.contains(crate::canvas::CanvasItem::Grip)
            && self
                .canvas
                .active_grip()
                .is_some_and(|grip| grip.rect().intersects(&cell))
    }

    /// Build terminal protocols for images near the viewport.
    ///
    /// A protocol is rebuilt when its image's size changed since it was made.
    pub fn load_visible_images(&mut self) {
        if !self.images_enabled {
            return;
        }
        let Some(picker) = &self.picker else { return };
        let font_size = picker.font_size();

        // Load images within one viewport height of the visible rows.
        let lookahead = self.viewport.height() as usize;
        let visible = self.viewport.visible_range();
        let load_start = i64::try_from(visible.start.saturating_sub(lookahead)).unwrap_or(0);
        let load_end = i64::try_from(visible.end + lookahead).unwrap_or(i64::MAX);

        let candidates: Vec<_> = self
            .surface
            .layout()
            .object_boxes()
            .filter_map(|(_, tag, rect)| tag.map(|kind| (kind, rect)))
            .filter(|(_, rect)| {
                let span = CellSpan::of(*rect);
                span.row + i64::from(span.rows) > load_start && span.row < load_end
            })
            .collect();

        for (kind, rect) in candidates {
            if self
                .image_protocols
                .get(&kind)
                .is_some_and(|(_, size)| *size == rect.size())
            {
                continue;
            }
            let Some(bitmap) = self
                .surface
                .overlay(kind)
                .and_then(InlineImageOverlay::bitmap)
            else {
                continue;
            };

            let span = CellSpan::of(rect);
            let target_width = (u32::from(span.cols) * u32::from(font_size.0)).max(1);
            let target_height = (u32::from(span.rows) * u32::from(font_size.1)).max(1);
            let scaled =
                image::imageops::resize(bitmap, target_width, target_height, FilterType::Triangle);
            let protocol = picker.new_resize_protocol(DynamicImage::ImageRgba8(scaled));
            self.image_protocols.insert(kind, (protocol, rect.size()));
            tracing::debug!(
                %kind,
                cols = span.cols,
                rows = span.rows,
                "image protocol built"
            );
        }
    }

    /// Drop protocols of images that left the registry.
    pub fn prune_image_protocols(&mut self) {
        let registry = self.surface.registry();
        self.image_protocols
            .retain(|kind, _| registry.contains(*kind));
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        let surface = DocumentTextSurface::new(PageSize::default().size(), RescanPolicy::default());
        Self {
            canvas: Canvas::new(MAIN_CANVAS, surface.page()),
            surface,
            viewport: Viewport::new(80, 23, 1),
            file_path: None,
            image_path: None,
            loader: ImageLoader::new(PathBuf::from(".")),
            picker: None,
            image_protocols: HashMap::new(),
            images_enabled: true,
            config_global_path: None,
            config_local_path: None,
            help_visible: false,
            help_scroll_offset: 0,
            toast: None,
            terminal_size: (80, 24),
            should_quit: false,
        }
    }
}
