//! Image loading and caching.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use image::DynamicImage;

use super::{ImageContent, load_image};
use crate::error::Result;

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<PathBuf, Arc<DynamicImage>>,
    order: VecDeque<PathBuf>,
}

/// Cache for decoded images, evicting the oldest entry when full.
#[derive(Debug, Default)]
pub struct ImageCache {
    inner: Mutex<CacheInner>,
    max_size: usize,
}

impl ImageCache {
    /// Create a new image cache with the given maximum number of entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            max_size,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Get an image from the cache.
    pub fn get(&self, path: &Path) -> Option<Arc<DynamicImage>> {
        self.lock().entries.get(path).cloned()
    }

    /// Insert an image into the cache.
    pub fn insert(&self, path: PathBuf, image: Arc<DynamicImage>) {
        let mut guard = self.lock();
        if guard.entries.insert(path.clone(), image).is_some() {
            return;
        }
        guard.order.push_back(path);

        while guard.entries.len() > self.max_size {
            let Some(oldest) = guard.order.pop_front() else {
                break;
            };
            guard.entries.remove(&oldest);
        }
    }

    /// Get the number of cached images.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear the cache.
    pub fn clear(&self) {
        let mut guard = self.lock();
        guard.entries.clear();
        guard.order.clear();
    }
}

/// Image loader with caching.
#[derive(Debug)]
pub struct ImageLoader {
    cache: ImageCache,
    base_path: PathBuf,
}

impl ImageLoader {
    /// Create a new image loader with the given base path for relative images.
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            cache: ImageCache::new(16),
            base_path,
        }
    }

    /// Load an image, using cache if available.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EditorError::BitmapLoad`] when the file cannot
    /// be read or decoded. Failures are not cached.
    pub fn load(&self, image_path: &Path) -> Result<Arc<DynamicImage>> {
        let full_path = self.resolve_path(image_path);
        if let Some(image) = self.cache.get(&full_path) {
            return Ok(image);
        }

        let image = Arc::new(load_image(&full_path)?);
        self.cache.insert(full_path, Arc::clone(&image));
        Ok(image)
    }

    /// Load an image as inline-object content, degrading to
    /// [`ImageContent::Unavailable`] on failure.
    pub fn content(&self, image_path: &Path) -> ImageContent {
        match self.load(image_path) {
            Ok(image) => ImageContent::Decoded(image),
            Err(err) => {
                tracing::warn!(error = %err, "inline image unavailable");
                ImageContent::unavailable(err.to_string())
            }
        }
    }

    /// Resolve a potentially relative path against the base path.
    fn resolve_path(&self, image_path: &Path) -> PathBuf {
        if image_path.is_absolute() {
            image_path.to_path_buf()
        } else {
            self.base_path.join(image_path)
        }
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub const fn cache(&self) -> &ImageCache {
        &self.cache
    }
}
