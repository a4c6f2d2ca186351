use std::io::Cursor;

use crate::foundation::error::{CollageError, CollageResult};

/// Caps applied to every decode so one hostile or huge input cannot stall a build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DecodeLimits {
    /// Maximum accepted source width in pixels.
    pub max_width: u32,
    /// Maximum accepted source height in pixels.
    pub max_height: u32,
    /// Maximum decoder allocation in bytes.
    pub max_alloc_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_width: 16_384,
            max_height: 16_384,
            max_alloc_bytes: 512 * 1024 * 1024,
        }
    }
}

impl DecodeLimits {
    fn to_image_limits(self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_image_width = Some(self.max_width);
        limits.max_image_height = Some(self.max_height);
        limits.max_alloc = Some(self.max_alloc_bytes);
        limits
    }
}

/// A source image decoded at its natural size.
///
/// The bitmap is owned by a single build and dropped once compositing finishes or fails.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Natural width in pixels (always > 0).
    pub width: u32,
    /// Natural height in pixels (always > 0).
    pub height: u32,
    /// Premultiplied RGBA8, tightly packed, row-major.
    pub rgba8_premul: Vec<u8>,
    /// Position of the originating item in the caller's list.
    pub source_index: usize,
}

impl DecodedImage {
    /// `width / height`, exactly as stored in the source.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Natural `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Decode raw encoded bytes into a [`DecodedImage`] without scaling.
///
/// Fails with [`CollageError::Decode`] when the bytes are not a complete, supported encoding or
/// when the image has a zero dimension.
pub fn decode_image(
    bytes: &[u8],
    source_index: usize,
    limits: DecodeLimits,
) -> CollageResult<DecodedImage> {
    let mut reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CollageError::decode(source_index, format!("sniff image format: {e}")))?;
    if reader.format().is_none() {
        return Err(CollageError::decode(
            source_index,
            "unrecognized image format",
        ));
    }
    reader.limits(limits.to_image_limits());

    let dyn_img = reader
        .decode()
        .map_err(|e| CollageError::decode(source_index, format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(CollageError::decode(
            source_index,
            format!("image has empty dimensions {width}x{height}"),
        ));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul,
        source_index,
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
