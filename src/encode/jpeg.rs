use std::path::Path;

use anyhow::Context as _;
use base64::Engine as _;
use image::ImageEncoder as _;

use crate::foundation::error::{CollageError, CollageResult};
use crate::render::cpu::CollageRaster;

/// Quality used for collage output unless overridden.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

const JPEG_MIME: &str = "image/jpeg";

/// Final encoded collage. Nothing is written to disk unless the caller asks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedCollage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels, as produced by the layout.
    pub height: u32,
    /// Encoded JPEG bytes.
    pub bytes: Vec<u8>,
}

impl EncodedCollage {
    /// MIME type of `bytes`.
    pub fn mime_type(&self) -> &'static str {
        JPEG_MIME
    }

    /// `data:image/jpeg;base64,...` representation.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// Write `bytes` to `path`, creating parent directories.
    pub fn write_to(&self, path: impl AsRef<Path>) -> CollageResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("write collage '{}'", path.display()))?;
        Ok(())
    }
}

/// Encode a premultiplied raster as baseline JPEG.
///
/// Pixels are flattened over white first, since JPEG carries no alpha.
#[tracing::instrument(skip(raster), fields(width = raster.width, height = raster.height))]
pub fn encode_jpeg(raster: &CollageRaster, quality: u8) -> CollageResult<EncodedCollage> {
    if !(1..=100).contains(&quality) {
        return Err(CollageError::validation(format!(
            "jpeg quality must be in 1..=100, got {quality}"
        )));
    }
    let expected = (raster.width as usize)
        .saturating_mul(raster.height as usize)
        .saturating_mul(4);
    if raster.data.len() != expected {
        return Err(CollageError::encode("raster byte len mismatch"));
    }

    let rgb = flatten_premul_over_white(&raster.data);
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality)
        .write_image(
            &rgb,
            raster.width,
            raster.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| CollageError::encode(format!("jpeg encode: {e}")))?;

    Ok(EncodedCollage {
        width: raster.width,
        height: raster.height,
        bytes,
    })
}

fn flatten_premul_over_white(premul: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(premul.len() / 4 * 3);
    for px in premul.chunks_exact(4) {
        let inv = 255 - px[3];
        out.push(px[0].saturating_add(inv));
        out.push(px[1].saturating_add(inv));
        out.push(px[2].saturating_add(inv));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/jpeg.rs"]
mod tests;
