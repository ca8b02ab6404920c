//! Software rasterization of shapes into an RGBA buffer.
//!
//! Coverage comes from signed-distance functions evaluated per pixel:
//! negative inside, positive outside, anti-aliased over a one-pixel band.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use graphyx_core::shapes::{Color, Shape, ShapeStyle};
use image::RgbaImage;
use kurbo::{Affine, Point, Rect};
use log::warn;

/// Smoothstep between edge0 and edge1.
#[inline]
fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Anti-aliased coverage for a signed distance.
#[inline]
fn coverage(d: f64) -> f64 {
    smoothstep(0.5, -0.5, d)
}

/// SDF for a box centered at (cx, cy) with half-extents (hx, hy).
#[inline]
fn sdf_box(px: f64, py: f64, cx: f64, cy: f64, hx: f64, hy: f64) -> f64 {
    let dx = (px - cx).abs() - hx;
    let dy = (py - cy).abs() - hy;
    let outside = (dx.max(0.0).powi(2) + dy.max(0.0).powi(2)).sqrt();
    let inside = dx.max(dy).min(0.0);
    outside + inside
}

/// SDF for an axis-aligned ellipse (scaled-gradient approximation).
#[inline]
fn sdf_ellipse(px: f64, py: f64, cx: f64, cy: f64, rx: f64, ry: f64) -> f64 {
    let nx = (px - cx) / rx;
    let ny = (py - cy) / ry;
    let len = (nx * nx + ny * ny).sqrt();
    if len < 1e-8 {
        return -rx.min(ry);
    }
    let grad = (rx * rx * ny * ny + ry * ry * nx * nx).sqrt() / (rx * ry * len);
    (len - 1.0) / grad
}

/// Distance from a point to a line segment.
#[inline]
fn sdf_segment(px: f64, py: f64, a: Point, b: Point) -> f64 {
    let ex = b.x - a.x;
    let ey = b.y - a.y;
    let len_sq = ex * ex + ey * ey;
    if len_sq < f64::EPSILON {
        return ((px - a.x).powi(2) + (py - a.y).powi(2)).sqrt();
    }
    let t = (((px - a.x) * ex + (py - a.y) * ey) / len_sq).clamp(0.0, 1.0);
    let qx = a.x + t * ex;
    let qy = a.y + t * ey;
    ((px - qx).powi(2) + (py - qy).powi(2)).sqrt()
}

/// Source-over blend a color into one pixel.
#[inline]
fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, color: Color, cov: f64) {
    if cov <= 0.001 {
        return;
    }
    let alpha = f64::from(color.a) / 255.0 * cov;
    let px = img.get_pixel_mut(x, y);
    for (channel, src) in px.0.iter_mut().take(3).zip([color.r, color.g, color.b]) {
        let dst = f64::from(*channel);
        *channel = (f64::from(src) * alpha + dst * (1.0 - alpha)).round() as u8;
    }
    let dst_a = f64::from(px.0[3]) / 255.0;
    px.0[3] = ((alpha + dst_a * (1.0 - alpha)) * 255.0).round() as u8;
}

/// Clamp a screen-space rect to the image, returning pixel bounds.
fn clamp_region(img: &RgbaImage, bounds: Rect) -> Option<(u32, u32, u32, u32)> {
    let x0 = bounds.x0.floor().max(0.0) as u32;
    let y0 = bounds.y0.floor().max(0.0) as u32;
    let x1 = (bounds.x1.ceil().max(0.0) as u32).min(img.width());
    let y1 = (bounds.y1.ceil().max(0.0) as u32).min(img.height());
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

/// Paint a region by evaluating a signed-distance function per pixel.
fn paint_sdf(img: &mut RgbaImage, bounds: Rect, color: Color, sdf: impl Fn(f64, f64) -> f64) {
    let Some((x0, y0, x1, y1)) = clamp_region(img, bounds) else {
        return;
    };
    for y in y0..y1 {
        let py = f64::from(y) + 0.5;
        for x in x0..x1 {
            let px = f64::from(x) + 0.5;
            blend_pixel(img, x, y, color, coverage(sdf(px, py)));
        }
    }
}

/// Stroke a chain of segments in screen space.
fn stroke_segments(img: &mut RgbaImage, segments: &[(Point, Point)], half: f64, color: Color) {
    for &(a, b) in segments {
        let bounds = Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
            .inflate(half + 1.0, half + 1.0);
        paint_sdf(img, bounds, color, |px, py| sdf_segment(px, py, a, b) - half);
    }
}

fn paint_rect(img: &mut RgbaImage, rect: Rect, style: &ShapeStyle, half: f64) {
    let (cx, cy) = (rect.center().x, rect.center().y);
    let (hx, hy) = (rect.width() / 2.0, rect.height() / 2.0);
    let bounds = rect.inflate(half + 1.0, half + 1.0);
    if let Some(fill) = style.fill_color {
        paint_sdf(img, bounds, fill, |px, py| sdf_box(px, py, cx, cy, hx, hy));
    }
    paint_sdf(img, bounds, style.stroke_color, |px, py| {
        sdf_box(px, py, cx, cy, hx, hy).abs() - half
    });
}

fn paint_ellipse(img: &mut RgbaImage, center: Point, rx: f64, ry: f64, style: &ShapeStyle, half: f64) {
    let bounds = Rect::new(center.x - rx, center.y - ry, center.x + rx, center.y + ry)
        .inflate(half + 1.0, half + 1.0);
    // Degenerate radii collapse to a segment-like band
    let rx = rx.max(0.5);
    let ry = ry.max(0.5);
    if let Some(fill) = style.fill_color {
        paint_sdf(img, bounds, fill, |px, py| {
            sdf_ellipse(px, py, center.x, center.y, rx, ry)
        });
    }
    paint_sdf(img, bounds, style.stroke_color, |px, py| {
        sdf_ellipse(px, py, center.x, center.y, rx, ry).abs() - half
    });
}

fn paint_text(
    img: &mut RgbaImage,
    anchor: Point,
    content: &str,
    size: f64,
    color: Color,
    font: Option<&FontArc>,
) {
    let Some(font) = font else {
        warn!("no font configured, skipping text {content:?}");
        return;
    };
    let scale = PxScale::from(size as f32);
    let scaled = font.as_scaled(scale);
    let baseline = anchor.y as f32 + scaled.ascent();
    let mut caret = anchor.x as f32;
    for ch in content.chars() {
        let glyph_id = scaled.glyph_id(ch);
        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(caret, baseline));
        caret += scaled.h_advance(glyph_id);
        if let Some(outlined) = font.outline_glyph(glyph) {
            let px_bounds = outlined.px_bounds();
            let (w, h) = (img.width() as i32, img.height() as i32);
            outlined.draw(|gx, gy, cov| {
                let x = px_bounds.min.x as i32 + gx as i32;
                let y = px_bounds.min.y as i32 + gy as i32;
                if x >= 0 && x < w && y >= 0 && y < h {
                    blend_pixel(img, x as u32, y as u32, color, f64::from(cov));
                }
            });
        }
    }
}

/// Paint a shape through a world-to-screen transform.
///
/// The style is passed separately from the shape so the caller can show a
/// highlight without touching the shape's own style.
pub(crate) fn paint_shape(
    img: &mut RgbaImage,
    shape: &Shape,
    style: &ShapeStyle,
    transform: Affine,
    font: Option<&FontArc>,
) {
    let scale = transform.as_coeffs()[0];
    let half = (style.stroke_width * scale).max(1.0) / 2.0;
    match shape {
        Shape::Line(line) => {
            stroke_segments(
                img,
                &[(transform * line.start, transform * line.end)],
                half,
                style.stroke_color,
            );
        }
        Shape::Pencil(pencil) => match pencil.points.as_slice() {
            [] => {}
            [only] => {
                let center = transform * *only;
                let bounds = Rect::from_center_size(center, (half * 2.0, half * 2.0))
                    .inflate(1.0, 1.0);
                paint_sdf(img, bounds, style.stroke_color, |px, py| {
                    sdf_segment(px, py, center, center) - half
                });
            }
            pts => {
                let segments: Vec<_> = pts
                    .windows(2)
                    .map(|w| (transform * w[0], transform * w[1]))
                    .collect();
                stroke_segments(img, &segments, half, style.stroke_color);
            }
        },
        Shape::Rectangle(rect) => {
            let screen = transform.transform_rect_bbox(rect.as_rect());
            paint_rect(img, screen, style, half);
        }
        Shape::Ellipse(_) => {
            let screen = transform.transform_rect_bbox(shape.bounds());
            paint_ellipse(
                img,
                screen.center(),
                screen.width() / 2.0,
                screen.height() / 2.0,
                style,
                half,
            );
        }
        Shape::Text(text) => {
            paint_text(
                img,
                transform * text.anchor,
                &text.content,
                text.font.size * scale,
                style.stroke_color,
                font,
            );
        }
    }
}

/// Paint an opaque square stamp. Destructive: replaces whatever is beneath.
pub(crate) fn paint_erase_stamp(img: &mut RgbaImage, center: Point, radius: f64, color: Color) {
    let bounds = Rect::from_center_size(center, (radius * 2.0, radius * 2.0));
    let Some((x0, y0, x1, y1)) = clamp_region(img, bounds) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, image::Rgba([color.r, color.g, color.b, color.a]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphyx_core::shapes::Line;

    fn white_canvas(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn test_segment_sdf() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((sdf_segment(5.0, 4.0, a, b) - 4.0).abs() < 1e-9);
        assert!((sdf_segment(13.0, 4.0, a, b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_box_sdf_sign() {
        assert!(sdf_box(50.0, 50.0, 50.0, 50.0, 20.0, 20.0) < 0.0);
        assert!(sdf_box(80.0, 50.0, 50.0, 50.0, 20.0, 20.0) > 0.0);
    }

    #[test]
    fn test_stroke_paints_pixels() {
        let mut img = white_canvas(40, 40);
        let mut line = Line::new(Point::new(5.0, 20.0), Point::new(35.0, 20.0));
        line.style.stroke_color = Color::rgb(255, 0, 0);
        line.style.stroke_width = 4.0;
        let style = line.style.clone();
        paint_shape(
            &mut img,
            &Shape::Line(line),
            &style,
            Affine::IDENTITY,
            None,
        );
        let on = img.get_pixel(20, 20);
        assert_eq!(on.0[0], 255);
        assert!(on.0[1] < 10);
        // Far from the stroke the canvas is untouched
        assert_eq!(img.get_pixel(20, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_erase_stamp_overpaints() {
        let mut img = white_canvas(40, 40);
        let mut line = Line::new(Point::new(0.0, 20.0), Point::new(40.0, 20.0));
        line.style.stroke_color = Color::black();
        let style = line.style.clone();
        paint_shape(
            &mut img,
            &Shape::Line(line),
            &style,
            Affine::IDENTITY,
            None,
        );
        assert_ne!(img.get_pixel(20, 20).0, [255, 255, 255, 255]);

        paint_erase_stamp(&mut img, Point::new(20.0, 20.0), 10.0, Color::white());
        assert_eq!(img.get_pixel(20, 20).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_missing_font_skips_glyphs() {
        let mut img = white_canvas(40, 40);
        let text = graphyx_core::shapes::Text::new(Point::new(5.0, 5.0), "hi".to_string());
        let style = text.style.clone();
        paint_shape(
            &mut img,
            &Shape::Text(text),
            &style,
            Affine::IDENTITY,
            None,
        );
        // Nothing painted, nothing panicked
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }
}
