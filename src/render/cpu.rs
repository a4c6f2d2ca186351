use std::sync::Arc;

use vello_cpu::kurbo::Shape;

use crate::assets::decode::DecodedImage;
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::{CollageError, CollageResult};
use crate::layout::justified::{JustifiedLayout, LayoutRect};
use crate::render::caption::{CaptionBox, CaptionStyle, caption_box};
use crate::scene::item::{CollageOptions, ImageSourceItem};

/// A composited collage as RGBA8 pixels.
///
/// `data` is **premultiplied alpha**, tightly packed, row-major.
#[derive(Clone, Debug)]
pub struct CollageRaster {
    /// Width in pixels; equals the requested collage width.
    pub width: u32,
    /// Height in pixels; derived from the layout.
    pub height: u32,
    /// Pixel bytes.
    pub data: Vec<u8>,
}

/// Raster height for a layout: the rounded sum of row heights, at least one pixel.
///
/// The layout never clamps height, so this can exceed what [`render_collage`] can draw: the CPU
/// surface is limited to 65535 pixels per side. A single very narrow portrait at a wide target
/// width gets there quickly (aspect 0.01 at width 1024 is about 102400 px tall).
pub fn raster_height(layout: &JustifiedLayout) -> u32 {
    (layout.total_height().round() as u32).max(1)
}

/// Draw every image into its rect, overlay captions, and return the raster.
///
/// `images` are consumed so their bitmaps are released as soon as they are drawn. Drawing is
/// sequential onto one surface.
///
/// # Errors
///
/// [`CollageError::Render`] when `options.width` or [`raster_height`] exceeds 65535, the largest
/// surface side vello_cpu supports. [`CollageError::Validation`] for an empty set or mismatched
/// inputs.
#[tracing::instrument(skip_all, fields(n = images.len(), width = options.width))]
pub fn render_collage(
    images: Vec<DecodedImage>,
    layout: &JustifiedLayout,
    items: &[ImageSourceItem],
    options: &CollageOptions,
    style: &CaptionStyle,
) -> CollageResult<CollageRaster> {
    options.validate()?;
    check_inputs(&images, layout, items)?;
    if images.is_empty() {
        return Err(CollageError::validation("collage needs at least one image"));
    }

    let width = options.width;
    let height = raster_height(layout);
    let w16 = to_u16(width, "collage width")?;
    let h16 = to_u16(height, "collage height")?;

    let mut text = caption_text(items, options, style)?;

    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    ctx.set_paint(options.background.to_cpu_color());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(width),
        f64::from(height),
    ));

    for (image, rect) in images.into_iter().zip(&layout.rects) {
        let item = &items[rect.source_index];
        draw_image(&mut ctx, image, rect)?;

        let lines = options.caption_lines(item);
        if let Some(caption) = caption_box(rect, &lines, style) {
            draw_caption(&mut ctx, rect, &caption, style, text.as_mut())?;
        }
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
    ctx.render_to_pixmap(&mut pixmap);

    Ok(CollageRaster {
        width,
        height,
        data: pixmap.data_as_u8_slice().to_vec(),
    })
}

fn check_inputs(
    images: &[DecodedImage],
    layout: &JustifiedLayout,
    items: &[ImageSourceItem],
) -> CollageResult<()> {
    if images.len() != layout.rects.len() || images.len() != items.len() {
        return Err(CollageError::validation(format!(
            "compositor input mismatch: {} images, {} rects, {} items",
            images.len(),
            layout.rects.len(),
            items.len()
        )));
    }
    for (i, (image, rect)) in images.iter().zip(&layout.rects).enumerate() {
        if rect.source_index != i || image.source_index != i {
            return Err(CollageError::validation(format!(
                "rect {i} refers to image {} (decoded as {})",
                rect.source_index, image.source_index
            )));
        }
    }
    Ok(())
}

fn caption_text(
    items: &[ImageSourceItem],
    options: &CollageOptions,
    style: &CaptionStyle,
) -> CollageResult<Option<TextLayoutEngine>> {
    let wants_text = items
        .iter()
        .any(|item| !options.caption_lines(item).is_empty());
    if !wants_text {
        return Ok(None);
    }
    match &style.font {
        Some(font) => Ok(Some(TextLayoutEngine::new(font)?)),
        None => {
            tracing::warn!("captions requested but no caption font configured; drawing bars only");
            Ok(None)
        }
    }
}

/// Scale `image` to exactly fill `rect`; aspect is already encoded by the layout.
fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    image: DecodedImage,
    rect: &LayoutRect,
) -> CollageResult<()> {
    let target_w = (rect.width.round() as u32).max(1);
    let target_h = (rect.height.round() as u32).max(1);

    let (src_w, src_h) = image.dimensions();
    let premul = image::RgbaImage::from_raw(src_w, src_h, image.rgba8_premul)
        .ok_or_else(|| CollageError::render("decoded bitmap byte len mismatch"))?;
    let resized = if (src_w, src_h) == (target_w, target_h) {
        premul
    } else {
        // Filtering premultiplied pixels keeps edges against transparency clean.
        image::imageops::resize(
            &premul,
            target_w,
            target_h,
            image::imageops::FilterType::Triangle,
        )
    };

    let pixmap = pixmap_from_premul_bytes(resized.as_raw(), target_w, target_h)?;
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };

    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_transform(
        vello_cpu::kurbo::Affine::translate((rect.origin_x, rect.origin_y))
            * vello_cpu::kurbo::Affine::scale_non_uniform(
                rect.width / f64::from(target_w),
                rect.height / f64::from(target_h),
            ),
    );
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(target_w),
        f64::from(target_h),
    ));
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    Ok(())
}

fn draw_caption(
    ctx: &mut vello_cpu::RenderContext,
    rect: &LayoutRect,
    caption: &CaptionBox<'_>,
    style: &CaptionStyle,
    text: Option<&mut TextLayoutEngine>,
) -> CollageResult<()> {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.push_clip_layer(&rect_to_cpu(rect.to_rect()).to_path(0.1));

    ctx.set_paint(style.bar_color.to_cpu_color());
    ctx.fill_rect(&rect_to_cpu(caption.bar));

    if let Some(engine) = text {
        let brush = brush_for(style.text_color);
        for line in &caption.lines {
            let layout = engine.layout_line(line.text, style.font_size_px, brush)?;
            let text_w = f64::from(layout.width());
            let text_h = f64::from(layout.height());
            let x = line.center_x - text_w * 0.5;
            let y = line.slot.center().y - text_h * 0.5;

            ctx.push_clip_layer(&rect_to_cpu(line.clip).to_path(0.1));
            let (dx, dy) = style.shadow_offset;
            fill_layout(ctx, engine.font(), &layout, x + dx, y + dy, style.shadow_color);
            fill_layout(ctx, engine.font(), &layout, x, y, style.text_color);
            ctx.pop_layer();
        }
    }

    ctx.pop_layer();
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    Ok(())
}

fn fill_layout(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    layout: &parley::Layout<TextBrushRgba8>,
    x: f64,
    y: f64,
    color: Rgba8,
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
    ctx.set_paint(color.to_cpu_color());
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

fn brush_for(c: Rgba8) -> TextBrushRgba8 {
    TextBrushRgba8 {
        r: c.r,
        g: c.g,
        b: c.b,
        a: c.a,
    }
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn to_u16(v: u32, what: &str) -> CollageResult<u16> {
    v.try_into()
        .map_err(|_| CollageError::render(format!("{what} {v} exceeds {}", u16::MAX)))
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CollageResult<vello_cpu::Pixmap> {
    let w = to_u16(width, "pixmap width")?;
    let h = to_u16(height, "pixmap height")?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CollageError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
