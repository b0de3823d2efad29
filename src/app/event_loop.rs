use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::document::{DocumentTextSurface, Seed, prepare_seed};
use crate::image::ImageLoader;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization, reading the seed file,
    /// or the event loop encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        // Create image picker BEFORE initializing terminal (queries stdio)
        let picker = if self.images_enabled {
            crate::image::create_picker(self.force_half_cell)
        } else {
            None
        };

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - picpad requires an interactive terminal")?;
        let size = terminal.size()?;

        let result = self
            .build_model((size.width, size.height))
            .map(|model| model.with_picker(picker))
            .and_then(|mut model| {
                execute!(stdout(), EnableMouseCapture)?;
                Self::event_loop(&mut terminal, &mut model)
            });

        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    /// The initial model for a terminal of `terminal_size`, seeded from the
    /// file given on the command line.
    pub(super) fn build_model(&self, terminal_size: (u16, u16)) -> Result<Model> {
        let page = self.page.size();
        let seed = match &self.file_path {
            Some(path) => prepare_seed(path, || std::fs::read_to_string(path))
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => Seed::Text(String::new()),
        };

        let (surface, picture) = match seed {
            Seed::Text(text) => (
                DocumentTextSurface::with_text(&text, page, self.rescan),
                None,
            ),
            Seed::Picture(path) => (DocumentTextSurface::new(page, self.rescan), Some(path)),
        };

        let mut model = Model::new(surface, terminal_size);
        model.file_path.clone_from(&self.file_path);
        model.image_path.clone_from(&self.image_path);
        model.loader = ImageLoader::new(
            self.file_path
                .as_ref()
                .and_then(|path| path.parent())
                .filter(|dir| !dir.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), std::path::Path::to_path_buf),
        );
        model.images_enabled = self.images_enabled;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        if let Some(path) = picture {
            let name = path.file_name().map_or_else(|| path.clone(), PathBuf::from);
            Self::insert_picture_from(&mut model, &name);
        }
        Ok(model)
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                tracing::debug!(width, height, "resize applied");
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if Self::dispatch(&event::read()?, model, event_ms, &mut resize_debouncer) {
                    needs_render = true;
                }

                // Coalesce key repeat and drag bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if Self::dispatch(&event::read()?, model, drain_ms, &mut resize_debouncer) {
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                model.load_visible_images();
                terminal.draw(|frame| Self::view(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }

    /// Map one event to a message and apply it. Returns `true` if a message
    /// was produced.
    pub(super) fn dispatch(
        event: &event::Event,
        model: &mut Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> bool {
        let Some(msg) = Self::handle_event(event, model, now_ms, resize_debouncer) else {
            return false;
        };
        tracing::trace!(?msg, "message");
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, &side_msg);
        true
    }
}
