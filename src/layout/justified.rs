//! Justified-row packing.
//!
//! Images keep their input order. Each row is measured at a fixed reference height, then scaled
//! uniformly so that its images exactly span the target width. Rows stack with no gaps.

use crate::assets::decode::DecodedImage;
use crate::foundation::core::Rect;

/// Height at which rows are measured before being scaled to the target width.
pub const REFERENCE_ROW_HEIGHT: f64 = 150.0;

/// Placement of one image inside the collage.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutRect {
    /// Left edge.
    pub origin_x: f64,
    /// Top edge.
    pub origin_y: f64,
    /// Width.
    pub width: f64,
    /// Height, shared by every rect in the same row.
    pub height: f64,
    /// Index of the image this rect belongs to.
    pub source_index: usize,
}

impl LayoutRect {
    /// Right edge.
    pub fn max_x(&self) -> f64 {
        self.origin_x + self.width
    }

    /// Bottom edge.
    pub fn max_y(&self) -> f64 {
        self.origin_y + self.height
    }

    /// Same placement as a `kurbo` rectangle.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.origin_x, self.origin_y, self.max_x(), self.max_y())
    }
}

/// A closed row: rects `start..end` share `height` and start at `origin_y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutRow {
    /// First rect index in the row.
    pub start: usize,
    /// One past the last rect index in the row.
    pub end: usize,
    /// Top edge of the row.
    pub origin_y: f64,
    /// Row height after scaling.
    pub height: f64,
}

impl LayoutRow {
    /// Number of images in the row.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Rows are never produced empty; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Output of [`layout_justified`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JustifiedLayout {
    /// One rect per input image, in input order.
    pub rects: Vec<LayoutRect>,
    /// Rows top to bottom.
    pub rows: Vec<LayoutRow>,
    /// Width every row is justified to.
    pub width: f64,
}

impl JustifiedLayout {
    /// Sum of row heights: the true height of the collage.
    pub fn total_height(&self) -> f64 {
        self.rows.iter().map(|r| r.height).sum()
    }

    /// Rects belonging to `row`.
    pub fn row_rects(&self, row: &LayoutRow) -> &[LayoutRect] {
        &self.rects[row.start..row.end]
    }

    /// Number of placed images.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Return `true` when nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// Aspect ratios (`width / height`) of decoded images, in order.
pub fn aspect_ratios(images: &[DecodedImage]) -> Vec<f64> {
    images.iter().map(DecodedImage::aspect_ratio).collect()
}

/// Pack images with the given aspect ratios into rows exactly `target_width` wide.
///
/// `rows = ceil(sqrt(n))` and each row holds at most `ceil(n / rows)` images. A row also closes
/// as soon as its width at [`REFERENCE_ROW_HEIGHT`] reaches `target_width`, or at the last
/// image. Aspect ratios must be finite and > 0; the image loader guarantees this.
#[tracing::instrument(skip(aspect_ratios), fields(n = aspect_ratios.len()))]
pub fn layout_justified(aspect_ratios: &[f64], target_width: u32) -> JustifiedLayout {
    let width = f64::from(target_width);
    let n = aspect_ratios.len();
    let mut out = JustifiedLayout {
        rects: Vec::with_capacity(n),
        rows: Vec::new(),
        width,
    };
    if n == 0 {
        return out;
    }

    let (row_count, max_per_row) = row_budget(n);
    out.rows.reserve(row_count);

    let mut row_start = 0usize;
    let mut row_width_at_ref = 0.0f64;
    let mut y = 0.0f64;

    for (idx, &aspect) in aspect_ratios.iter().enumerate() {
        debug_assert!(aspect.is_finite() && aspect > 0.0);
        row_width_at_ref += REFERENCE_ROW_HEIGHT * aspect;
        let in_row = idx + 1 - row_start;

        let is_last = idx == n - 1;
        if row_width_at_ref >= width || is_last || in_row == max_per_row {
            let scale = width / row_width_at_ref;
            let row_height = REFERENCE_ROW_HEIGHT * scale;

            let mut x = 0.0f64;
            for (j, &a) in aspect_ratios[row_start..=idx].iter().enumerate() {
                let w = REFERENCE_ROW_HEIGHT * a * scale;
                out.rects.push(LayoutRect {
                    origin_x: x,
                    origin_y: y,
                    width: w,
                    height: row_height,
                    source_index: row_start + j,
                });
                x += w;
            }

            tracing::debug!(
                row = out.rows.len(),
                images = in_row,
                scale,
                row_height,
                "closed row"
            );
            out.rows.push(LayoutRow {
                start: row_start,
                end: idx + 1,
                origin_y: y,
                height: row_height,
            });

            y += row_height;
            row_start = idx + 1;
            row_width_at_ref = 0.0;
        }
    }

    out
}

/// `(rows, max_per_row)` for `n > 0` images.
pub(crate) fn row_budget(n: usize) -> (usize, usize) {
    let rows = (n as f64).sqrt().ceil() as usize;
    let rows = rows.max(1);
    (rows, n.div_ceil(rows))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/justified.rs"]
mod tests;
