//! Theme tags attached to source images.
//!
//! Extraction sits behind [`TagExtractor`] so the textual scrape in [`pattern`] can be replaced by
//! a structured metadata reader without touching layout or compositing.

use rayon::prelude::*;

use crate::scene::item::ImageSourceItem;

pub(crate) mod pattern;

/// Strategy that derives at most one theme tag from raw file bytes.
///
/// Implementations never fail: internal errors resolve to `None`.
pub trait TagExtractor: Send + Sync {
    /// Zero or one tag for `bytes`.
    fn extract_tag(&self, bytes: &[u8]) -> Option<String>;

    /// Same as [`TagExtractor::extract_tag`], as a list of 0 or 1 strings.
    fn extract(&self, bytes: &[u8]) -> Vec<String> {
        self.extract_tag(bytes).into_iter().collect()
    }
}

/// Run `extractor` over every item concurrently; results keep item order.
#[tracing::instrument(skip_all, fields(n = items.len()))]
pub fn extract_themes(items: &[ImageSourceItem], extractor: &dyn TagExtractor) -> Vec<Vec<String>> {
    items
        .par_iter()
        .map(|item| extractor.extract(&item.bytes))
        .collect()
}

/// Write each item's extracted tag onto it, clearing tags where nothing was found.
///
/// Call before a compositing pass with `show_themes` enabled.
pub fn attach_themes(items: &mut [ImageSourceItem], extractor: &dyn TagExtractor) {
    items.par_iter_mut().for_each(|item| {
        item.theme = extractor.extract_tag(&item.bytes);
    });
}

/// Drop every theme tag, e.g. when themes are switched off.
pub fn clear_themes(items: &mut [ImageSourceItem]) {
    for item in items {
        item.theme = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/mod.rs"]
mod tests;
