//! Playlist thumbnails: sizing from the display aspect ratio, compositing
//! under the current settings, and an MRU cache of the results.

use core::fmt;

use image::RgbaImage;

use crate::cache::ThumbnailCache;
use crate::compose::{ComposeError, compose};
use crate::geometry::Size;
use crate::settings::Settings;

/// Number of composited thumbnails kept by default.
pub const DEFAULT_CACHE_CAPACITY: usize = 4;

/// Thumbnail size for a display: fixed `height`, width following the
/// display's aspect ratio. Both dimensions are at least 1.
///
/// ```
/// use wallfit::{Size, thumbnail_size};
///
/// assert_eq!(thumbnail_size(Size::new(1920, 1080), 128), Size::new(228, 128));
/// ```
pub fn thumbnail_size(display: Size, height: u32) -> Size {
    let height = height.max(1);
    if display.is_empty() {
        return Size::new(height, height);
    }
    let width = (height as f64 * display.aspect()).round().max(1.0) as u32;
    Size::new(width, height)
}

/// Thumbnail failure: the source could not be loaded or composited.
#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError<E> {
    #[error("failed to load thumbnail source: {0}")]
    Load(E),
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Composites and caches thumbnails keyed by source identity.
pub struct Thumbnailer<K, const N: usize = DEFAULT_CACHE_CAPACITY> {
    settings: Settings,
    size: Size,
    cache: ThumbnailCache<K, RgbaImage, N>,
}

impl<K, const N: usize> fmt::Debug for Thumbnailer<K, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnailer")
            .field("settings", &self.settings)
            .field("size", &self.size)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl<K: PartialEq, const N: usize> Thumbnailer<K, N> {
    /// Create a thumbnailer for the given display size.
    ///
    /// `N` must be at least 1; a zero-capacity thumbnailer does not compile.
    pub fn new(settings: Settings, display: Size) -> Self {
        Self {
            size: thumbnail_size(display, settings.thumbnail_height),
            settings,
            cache: ThumbnailCache::new(),
        }
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Size every thumbnail is composited to.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Number of cached thumbnails.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Replace the settings. Cached thumbnails are dropped if anything that
    /// affects their pixels changed.
    pub fn set_settings(&mut self, settings: Settings, display: Size) {
        let size = thumbnail_size(display, settings.thumbnail_height);
        if settings != self.settings || size != self.size {
            tracing::debug!(%settings.policy, %settings.background, %size, "thumbnail settings changed");
            self.cache.clear();
        }
        self.settings = settings;
        self.size = size;
    }

    /// Drop every cached thumbnail.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Thumbnail for `key`, composited from `load()` on a cache miss.
    ///
    /// Failures are not cached; the next call for the same key retries.
    pub fn thumbnail<E: fmt::Display>(
        &mut self,
        key: K,
        load: impl FnOnce() -> Result<RgbaImage, E>,
    ) -> Result<&RgbaImage, ThumbnailError<E>> {
        let Settings {
            policy, background, ..
        } = self.settings;
        let size = self.size;
        self.cache.try_get_or_insert_with(key, || -> Result<RgbaImage, ThumbnailError<E>> {
            let source = load().map_err(|e| {
                tracing::warn!(error = %e, "thumbnail source unavailable");
                ThumbnailError::Load(e)
            })?;
            Ok(compose(source, size, policy, background)?.into_image())
        })
    }
}
