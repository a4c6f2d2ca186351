use std::sync::Arc;

use crate::foundation::core::{Rect, Rgba8};
use crate::layout::justified::LayoutRect;

/// Typography and colours of caption bars.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionStyle {
    /// Caption font (TTF/OTF bytes). Without a font, bars are drawn but text is skipped.
    pub font: Option<Arc<Vec<u8>>>,
    /// Font size in pixels.
    pub font_size_px: f32,
    /// Height reserved for one line of text.
    pub line_height_px: f64,
    /// Padding above and below each line, and to the left and right of the text.
    pub padding_px: f64,
    /// Semi-opaque bar fill.
    pub bar_color: Rgba8,
    /// Text fill.
    pub text_color: Rgba8,
    /// Drop shadow fill.
    pub shadow_color: Rgba8,
    /// Drop shadow offset in pixels.
    pub shadow_offset: (f64, f64),
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font: None,
            font_size_px: 16.0,
            line_height_px: 24.0,
            padding_px: 8.0,
            bar_color: Rgba8::opaque(0, 0, 0).with_alpha_f32(0.6),
            text_color: Rgba8::opaque(255, 255, 255),
            shadow_color: Rgba8::opaque(0, 0, 0).with_alpha_f32(0.7),
            shadow_offset: (1.0, 1.0),
        }
    }
}

impl CaptionStyle {
    /// Style with the given caption font.
    pub fn with_font(mut self, font_bytes: Vec<u8>) -> Self {
        self.font = Some(Arc::new(font_bytes));
        self
    }

    /// Vertical space taken by one caption line including its padding.
    pub fn line_slot_height(&self) -> f64 {
        self.line_height_px + 2.0 * self.padding_px
    }

    /// Height of a bar holding `lines` lines; zero lines means no bar.
    pub fn bar_height(&self, lines: usize) -> f64 {
        self.line_slot_height() * lines as f64
    }
}

/// One positioned caption line.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionLine<'a> {
    /// Text to draw.
    pub text: &'a str,
    /// Slot the line is vertically centred in.
    pub slot: Rect,
    /// Horizontal centre of the text.
    pub center_x: f64,
    /// Text is clipped to this rectangle.
    pub clip: Rect,
}

/// Bar and lines for one image.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionBox<'a> {
    /// Bar rectangle, anchored to the bottom edge of the image rect.
    pub bar: Rect,
    /// Lines top to bottom.
    pub lines: Vec<CaptionLine<'a>>,
}

/// Place a caption bar for `lines` (top to bottom) inside `rect`.
///
/// Returns `None` when there is nothing to caption.
pub fn caption_box<'a>(
    rect: &LayoutRect,
    lines: &[&'a str],
    style: &CaptionStyle,
) -> Option<CaptionBox<'a>> {
    if lines.is_empty() {
        return None;
    }

    let image = rect.to_rect();
    let bar = Rect::new(
        image.x0,
        image.y1 - style.bar_height(lines.len()),
        image.x1,
        image.y1,
    );
    let slot_h = style.line_slot_height();
    let clip_x0 = (image.x0 + style.padding_px).min(image.center().x);
    let clip_x1 = (image.x1 - style.padding_px).max(image.center().x);

    let lines = lines
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let top = bar.y0 + slot_h * i as f64;
            let slot = Rect::new(bar.x0, top, bar.x1, top + slot_h);
            CaptionLine {
                text,
                slot,
                center_x: image.center().x,
                clip: Rect::new(clip_x0, slot.y0.max(image.y0), clip_x1, slot.y1),
            }
        })
        .collect();

    Some(CaptionBox { bar, lines })
}

#[cfg(test)]
#[path = "../../tests/unit/render/caption.rs"]
mod tests;
