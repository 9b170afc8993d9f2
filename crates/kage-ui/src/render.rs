//! Rasterizes a detection set into the transparent overlay frame.

use std::sync::Arc;

use ab_glyph::{point, Font, FontArc, ScaleFont};
use image::{Rgba, RgbaImage};
use kage_types::{BoxRect, CoordinateSpace, DetectionSet, Point};

use crate::font::FontResolver;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("detections are still relative to the region at ({}, {})", .origin.x, .origin.y)]
    NotAbsolute { origin: Point },
}

#[derive(Debug, Clone, Copy)]
pub struct RenderStyle {
    pub box_alpha: u8,
    pub text_color: Rgba<u8>,
    pub text_inset: u32,
    pub font_size: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            box_alpha: 200,
            text_color: Rgba([255, 255, 255, 255]),
            text_inset: 2,
            font_size: 14.0,
        }
    }
}

pub struct OverlayRenderer {
    style: RenderStyle,
    fonts: Arc<FontResolver>,
}

impl OverlayRenderer {
    pub fn new(style: RenderStyle, fonts: Arc<FontResolver>) -> Self {
        Self { style, fonts }
    }

    /// Draw every detection onto a transparent canvas of the set's size.
    pub fn render(&self, set: &DetectionSet) -> Result<RgbaImage, RenderError> {
        if let CoordinateSpace::RegionRelative { origin } = set.space() {
            return Err(RenderError::NotAbsolute { origin });
        }

        let canvas = set.canvas();
        let mut frame = RgbaImage::new(canvas.width, canvas.height);
        if set.is_empty() {
            return Ok(frame);
        }

        let font = self.fonts.resolve(self.style.font_size);
        let inset = self.style.text_inset as f32;

        for item in set.items() {
            let bbox = item.bbox();
            fill_box(&mut frame, bbox, Rgba([0, 0, 0, self.style.box_alpha]));

            if let Some(face) = font.face() {
                draw_text(
                    &mut frame,
                    face,
                    (bbox.x1 as f32 + inset, bbox.y1 as f32 + inset),
                    &item.translated_text,
                    self.style.text_color,
                    font.size_px(),
                );
            }
        }

        Ok(frame)
    }
}

/// Overwrite the pixels of `bbox` (exclusive right/bottom), clipped to the frame.
pub fn fill_box(frame: &mut RgbaImage, bbox: BoxRect, color: Rgba<u8>) {
    let clamp_x = |v: i32| v.clamp(0, frame.width() as i32) as u32;
    let clamp_y = |v: i32| v.clamp(0, frame.height() as i32) as u32;
    let (x1, x2) = (clamp_x(bbox.x1), clamp_x(bbox.x2));
    let (y1, y2) = (clamp_y(bbox.y1), clamp_y(bbox.y2));

    for y in y1..y2 {
        for x in x1..x2 {
            frame.put_pixel(x, y, color);
        }
    }
}

/// Source-over blend. The result is never less opaque than the destination.
fn blend_pixel(frame: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    let [r, g, b, a] = color.0;
    if a == 0 {
        return;
    }
    let dst = frame.get_pixel(x, y).0;
    let src_a = a as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return;
    }
    let blend = |src: u8, dst: u8| {
        let src_f = src as f32 / 255.0;
        let dst_f = dst as f32 / 255.0;
        ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    let alpha = ((out_a * 255.0).round() as u8).max(dst[3]);
    frame.put_pixel(
        x,
        y,
        Rgba([blend(r, dst[0]), blend(g, dst[1]), blend(b, dst[2]), alpha]),
    );
}

/// Draw a single line of text with its top-left at `pos`.
fn draw_text(
    frame: &mut RgbaImage,
    font: &FontArc,
    pos: (f32, f32),
    text: &str,
    color: Rgba<u8>,
    size: f32,
) {
    if text.is_empty() {
        return;
    }
    let scaled = font.as_scaled(size);
    let mut caret = point(pos.0, pos.1 + scaled.ascent());
    let mut previous = None;

    for ch in text.chars() {
        if ch.is_control() {
            continue;
        }
        let mut glyph = scaled.scaled_glyph(ch);
        if let Some(prev) = previous {
            caret.x += scaled.kern(prev, glyph.id);
        }
        previous = Some(glyph.id);
        glyph.position = caret;
        caret.x += scaled.h_advance(glyph.id);

        let Some(outlined) = scaled.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        let (width, height) = (frame.width() as i32, frame.height() as i32);
        outlined.draw(|x, y, coverage| {
            let px = x as i32 + bounds.min.x as i32;
            let py = y as i32 + bounds.min.y as i32;
            if px >= 0 && py >= 0 && px < width && py < height {
                let alpha = (color.0[3] as f32 * coverage).round().clamp(0.0, 255.0) as u8;
                let [r, g, b, _] = color.0;
                blend_pixel(frame, px as u32, py as u32, Rgba([r, g, b, alpha]));
            }
        });
    }
}
