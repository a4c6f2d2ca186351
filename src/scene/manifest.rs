use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::foundation::error::{CollageError, CollageResult};
use crate::scene::item::{CollageOptions, ImageSourceItem, default_title};

/// One entry of a collage manifest.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestItem {
    /// Image path relative to the manifest's directory.
    pub source: String,
    /// Caption title; defaults to the source file name.
    #[serde(default)]
    pub title: Option<String>,
    /// Theme tag supplied up front.
    #[serde(default)]
    pub theme: Option<String>,
}

/// JSON description of a collage: options, optional caption font, and ordered items.
///
/// ```json
/// {
///   "options": { "width": 1024, "show_titles": true },
///   "font": "fonts/Inter.ttf",
///   "items": [ { "source": "a.jpg" }, { "source": "b.png", "title": "Beach" } ]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Build options.
    #[serde(default)]
    pub options: CollageOptions,
    /// Caption font path relative to the manifest's directory.
    #[serde(default)]
    pub font: Option<String>,
    /// Ordered items.
    pub items: Vec<ManifestItem>,
}

impl Manifest {
    /// Parse a manifest from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CollageResult<Self> {
        let manifest: Manifest = serde_json::from_reader(r)
            .map_err(|e| CollageError::validation(format!("parse collage manifest JSON: {e}")))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse a manifest from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CollageResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CollageError::validation(format!("open collage manifest '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check options and item paths without touching the filesystem.
    pub fn validate(&self) -> CollageResult<()> {
        self.options.validate()?;
        for item in &self.items {
            normalize_rel_path(&item.source)?;
        }
        if let Some(font) = &self.font {
            normalize_rel_path(font)?;
        }
        Ok(())
    }

    /// Read every item's bytes from `root`, preserving manifest order.
    pub fn load_items(&self, root: impl AsRef<Path>) -> CollageResult<Vec<ImageSourceItem>> {
        let root = root.as_ref();
        self.items
            .iter()
            .map(|entry| {
                let path = resolve(root, &entry.source)?;
                let bytes = std::fs::read(&path).map_err(|e| {
                    CollageError::validation(format!("read image '{}': {e}", path.display()))
                })?;
                Ok(ImageSourceItem {
                    bytes,
                    title: entry
                        .title
                        .clone()
                        .unwrap_or_else(|| default_title(&path)),
                    theme: entry.theme.clone(),
                })
            })
            .collect()
    }

    /// Read the caption font, when one is configured.
    pub fn load_font(&self, root: impl AsRef<Path>) -> CollageResult<Option<Vec<u8>>> {
        let Some(font) = &self.font else {
            return Ok(None);
        };
        let path = resolve(root.as_ref(), font)?;
        std::fs::read(&path).map(Some).map_err(|e| {
            CollageError::validation(format!("read caption font '{}': {e}", path.display()))
        })
    }
}

fn resolve(root: &Path, rel: &str) -> CollageResult<PathBuf> {
    Ok(root.join(normalize_rel_path(rel)?))
}

/// Normalize and validate manifest-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> CollageResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(CollageError::validation("manifest paths must be relative"));
    }
    if s.is_empty() {
        return Err(CollageError::validation("manifest path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CollageError::validation(
                "manifest paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CollageError::validation(
            "manifest path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/manifest.rs"]
mod tests;
