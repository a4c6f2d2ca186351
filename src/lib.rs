//! rowcollage assembles photos into one justified-row collage.
//!
//! - Decode every source concurrently ([`decode_all`]); any failure fails the build
//! - Pack them into rows exactly `width` wide ([`layout_justified`])
//! - Draw images and optional caption bars onto one surface, then encode as JPEG
//!   ([`build_collage`], [`CollageBuilder`])
//!
//! Theme tags can be scraped from raw file bytes through a [`TagExtractor`].
#![forbid(unsafe_code)]

mod assets;
mod encode;
mod foundation;
mod layout;
mod render;
mod scene;
mod session;
mod theme;

pub use crate::foundation::core::{Rect, Rgba8};
pub use crate::foundation::error::{CollageError, CollageResult};

pub use crate::assets::decode::{DecodeLimits, DecodedImage, decode_image};
pub use crate::encode::jpeg::{DEFAULT_JPEG_QUALITY, EncodedCollage, encode_jpeg};
pub use crate::layout::justified::{
    JustifiedLayout, LayoutRect, LayoutRow, REFERENCE_ROW_HEIGHT, aspect_ratios, layout_justified,
};
pub use crate::render::caption::{CaptionBox, CaptionLine, CaptionStyle, caption_box};
pub use crate::render::cpu::{CollageRaster, raster_height, render_collage};
pub use crate::scene::item::{
    CollageOptions, DEFAULT_BACKGROUND, ImageSourceItem, default_title, looks_like_image,
    shuffle_items,
};
pub use crate::scene::manifest::{Manifest, ManifestItem};
pub use crate::session::build::{
    BuildOpts, BuildOutcome, BuildTicket, CollageBuilder, PublishedCollage, build_collage,
    compose, decode_all,
};
pub use crate::theme::pattern::{DEFAULT_THEME_FIELD, PatternTagExtractor, extract_theme};
pub use crate::theme::{TagExtractor, attach_themes, clear_themes, extract_themes};
