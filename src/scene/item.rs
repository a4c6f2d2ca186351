use std::path::Path;

use rand::SeedableRng;
use rand::seq::SliceRandom;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{CollageError, CollageResult};

/// Neutral fill behind the images.
pub const DEFAULT_BACKGROUND: Rgba8 = Rgba8::opaque(0xf5, 0xf5, 0xf5);

/// One user-supplied photo.
///
/// Only `theme` is expected to change after creation (see [`crate::attach_themes`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageSourceItem {
    /// Encoded image bytes as read from disk or received from the caller.
    pub bytes: Vec<u8>,
    /// Caption title.
    pub title: String,
    /// Optional theme tag, supplied directly or scraped from `bytes`.
    pub theme: Option<String>,
}

impl ImageSourceItem {
    /// Item with a title and no theme.
    pub fn new(bytes: Vec<u8>, title: impl Into<String>) -> Self {
        Self {
            bytes,
            title: title.into(),
            theme: None,
        }
    }

    /// Builder-style theme override.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    /// Read an image file; the title defaults to its file name.
    pub fn from_path(path: impl AsRef<Path>) -> CollageResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            CollageError::validation(format!("read image '{}': {e}", path.display()))
        })?;
        Ok(Self::new(bytes, default_title(path)))
    }

    /// Title when captions are enabled and it is non-empty.
    pub(crate) fn caption_title(&self) -> Option<&str> {
        Some(self.title.trim()).filter(|t| !t.is_empty())
    }

    /// Theme when present and non-empty.
    pub(crate) fn caption_theme(&self) -> Option<&str> {
        self.theme
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// File name of `path`, or the whole path when it has none.
pub fn default_title(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Return `true` when the extension names an image format the loader understands.
pub fn looks_like_image(path: &Path) -> bool {
    image::ImageFormat::from_path(path)
        .map(|f| f.reading_enabled())
        .unwrap_or(false)
}

/// Deterministically permute the working set.
///
/// The layout never reorders, so this is how a caller asks for a different arrangement.
pub fn shuffle_items(items: &mut [ImageSourceItem], seed: u64) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
}

/// Options for one collage build.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CollageOptions {
    /// Output width in pixels; every row is justified to this width.
    pub width: u32,
    /// Advisory height. The real output height comes from the layout.
    pub height: u32,
    /// Draw each item's title in its caption bar.
    pub show_titles: bool,
    /// Draw each item's theme tag in its caption bar.
    pub show_themes: bool,
    /// Surface fill drawn before any image.
    pub background: Rgba8,
}

impl Default for CollageOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            show_titles: false,
            show_themes: false,
            background: DEFAULT_BACKGROUND,
        }
    }
}

impl CollageOptions {
    /// Reject zero dimensions.
    pub fn validate(&self) -> CollageResult<()> {
        if self.width == 0 {
            return Err(CollageError::validation("collage width must be > 0"));
        }
        if self.height == 0 {
            return Err(CollageError::validation("collage height must be > 0"));
        }
        Ok(())
    }

    /// Caption lines enabled for `item`, top to bottom: theme above title.
    pub fn caption_lines<'a>(&self, item: &'a ImageSourceItem) -> Vec<&'a str> {
        let mut lines = Vec::with_capacity(2);
        if self.show_themes
            && let Some(theme) = item.caption_theme()
        {
            lines.push(theme);
        }
        if self.show_titles
            && let Some(title) = item.caption_title()
        {
            lines.push(title);
        }
        lines
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/item.rs"]
mod tests;
