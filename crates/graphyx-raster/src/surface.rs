//! Headless raster implementation of the drawing surface.
//!
//! Items are retained in a display list in draw order; `compose` renders the
//! background raster and then every item through the viewport transform.
//! Eraser stamps are ordinary display items so they overpaint whatever was
//! drawn before them and are overpainted by whatever comes after.

use ab_glyph::FontArc;
use graphyx_core::shapes::{Color, Shape, ShapeStyle};
use graphyx_core::surface::{DrawSurface, SurfaceError, SurfaceHandle};
use graphyx_core::viewport::Viewport;
use image::RgbaImage;
use kurbo::{Point, Vec2};
use log::debug;

use crate::rasterize::{paint_erase_stamp, paint_shape};

/// One entry in the retained display list.
#[derive(Debug, Clone)]
enum DisplayItem {
    /// A rendered shape. The style is kept beside the shape so a restyle
    /// (the selection highlight) never mutates the shape itself.
    Shape {
        handle: SurfaceHandle,
        shape: Shape,
        style: ShapeStyle,
    },
    /// A destructive eraser mark. No handle; it can never be addressed,
    /// moved or deleted once stamped.
    EraseStamp { center: Point, radius: f64 },
}

/// Software-raster drawing surface.
#[derive(Debug)]
pub struct RasterSurface {
    background: RgbaImage,
    background_color: Color,
    items: Vec<DisplayItem>,
    next_handle: SurfaceHandle,
    viewport: Viewport,
    font: Option<FontArc>,
}

impl RasterSurface {
    /// Create a surface with a solid background.
    pub fn new(width: u32, height: u32, background_color: Color) -> Self {
        let pixel = image::Rgba([
            background_color.r,
            background_color.g,
            background_color.b,
            background_color.a,
        ]);
        Self {
            background: RgbaImage::from_pixel(width, height, pixel),
            background_color,
            items: Vec::new(),
            next_handle: 0,
            viewport: Viewport::new(),
            font: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.background.width()
    }

    pub fn height(&self) -> u32 {
        self.background.height()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Install the font used for text items. Without one, text is retained
    /// but its glyphs are skipped at compose time.
    pub fn set_font(&mut self, font: FontArc) {
        self.font = Some(font);
    }

    /// Number of live display items, eraser stamps included.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Replace the background raster. Display items are unaffected; only
    /// the pixels beneath them change.
    pub fn set_background(&mut self, raster: RgbaImage) {
        self.background = raster;
    }

    pub fn background(&self) -> &RgbaImage {
        &self.background
    }

    /// Render the background and the display list into a fresh raster.
    pub fn compose(&self) -> RgbaImage {
        let mut img = self.background.clone();
        let transform = self.viewport.transform();
        let scale = self.viewport.scale;
        for item in &self.items {
            match item {
                DisplayItem::Shape { shape, style, .. } => {
                    paint_shape(&mut img, shape, style, transform, self.font.as_ref());
                }
                DisplayItem::EraseStamp { center, radius } => {
                    paint_erase_stamp(
                        &mut img,
                        transform * *center,
                        radius * scale,
                        self.background_color,
                    );
                }
            }
        }
        img
    }

    fn item_mut(
        &mut self,
        handle: SurfaceHandle,
    ) -> Result<(&mut Shape, &mut ShapeStyle), SurfaceError> {
        self.items
            .iter_mut()
            .find_map(|item| match item {
                DisplayItem::Shape {
                    handle: h,
                    shape,
                    style,
                } if *h == handle => Some((shape, style)),
                _ => None,
            })
            .ok_or(SurfaceError::UnknownHandle(handle))
    }
}

impl DrawSurface for RasterSurface {
    fn draw(&mut self, shape: &Shape) -> SurfaceHandle {
        self.next_handle += 1;
        self.items.push(DisplayItem::Shape {
            handle: self.next_handle,
            shape: shape.clone(),
            style: shape.style().clone(),
        });
        self.next_handle
    }

    fn extend_path(
        &mut self,
        handle: SurfaceHandle,
        _from: Point,
        to: Point,
    ) -> Result<(), SurfaceError> {
        let (shape, _) = self.item_mut(handle)?;
        match shape {
            Shape::Pencil(pencil) => pencil.add_point(to),
            other => debug!("extend_path ignored for non-path item {:?}", other.id()),
        }
        Ok(())
    }

    fn move_by(&mut self, handle: SurfaceHandle, delta: Vec2) -> Result<(), SurfaceError> {
        let (shape, _) = self.item_mut(handle)?;
        shape.translate(delta);
        Ok(())
    }

    fn restyle(&mut self, handle: SurfaceHandle, style: &ShapeStyle) -> Result<(), SurfaceError> {
        let (_, item_style) = self.item_mut(handle)?;
        *item_style = style.clone();
        Ok(())
    }

    fn delete(&mut self, handle: SurfaceHandle) -> Result<(), SurfaceError> {
        let before = self.items.len();
        self.items.retain(|item| {
            !matches!(item, DisplayItem::Shape { handle: h, .. } if *h == handle)
        });
        if self.items.len() == before {
            return Err(SurfaceError::UnknownHandle(handle));
        }
        Ok(())
    }

    fn stamp_erase(&mut self, center: Point, radius: f64) {
        self.items.push(DisplayItem::EraseStamp { center, radius });
    }

    fn pan(&mut self, delta: Vec2) {
        self.viewport.pan(delta);
    }

    fn zoom(&mut self, factor: f64, center: Point) {
        self.viewport.zoom_at(center, factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphyx_core::shapes::Line;

    fn surface() -> RasterSurface {
        RasterSurface::new(60, 60, Color::white())
    }

    fn black_line(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
        let mut line = Line::new(Point::new(x0, y0), Point::new(x1, y1));
        line.style.stroke_width = 4.0;
        Shape::Line(line)
    }

    #[test]
    fn test_drawn_line_produces_stroke_pixels() {
        let mut surface = surface();
        surface.draw(&black_line(5.0, 30.0, 55.0, 30.0));
        let img = surface.compose();
        assert_eq!(img.get_pixel(30, 30).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(30, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_delete_removes_item() {
        let mut surface = surface();
        let handle = surface.draw(&black_line(5.0, 30.0, 55.0, 30.0));
        surface.delete(handle).unwrap();
        let img = surface.compose();
        assert_eq!(img.get_pixel(30, 30).0, [255, 255, 255, 255]);
        assert_eq!(
            surface.delete(handle),
            Err(SurfaceError::UnknownHandle(handle))
        );
    }

    #[test]
    fn test_erase_stamp_overpaints_earlier_items() {
        let mut surface = surface();
        surface.draw(&black_line(5.0, 30.0, 55.0, 30.0));
        surface.stamp_erase(Point::new(30.0, 30.0), 8.0);
        let img = surface.compose();
        // Under the stamp the line is gone
        assert_eq!(img.get_pixel(30, 30).0, [255, 255, 255, 255]);
        // Outside the stamp the line survives
        assert_eq!(img.get_pixel(10, 30).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_later_items_paint_over_stamps() {
        let mut surface = surface();
        surface.stamp_erase(Point::new(30.0, 30.0), 10.0);
        surface.draw(&black_line(5.0, 30.0, 55.0, 30.0));
        let img = surface.compose();
        assert_eq!(img.get_pixel(30, 30).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_restyle_changes_rendering_only() {
        let mut surface = surface();
        let shape = black_line(5.0, 30.0, 55.0, 30.0);
        let handle = surface.draw(&shape);
        let mut highlighted = shape.style().clone();
        highlighted.stroke_color = Color::rgb(0, 0, 255);
        surface.restyle(handle, &highlighted).unwrap();
        let img = surface.compose();
        assert_eq!(img.get_pixel(30, 30).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_move_by_shifts_pixels() {
        let mut surface = surface();
        let handle = surface.draw(&black_line(5.0, 10.0, 55.0, 10.0));
        surface.move_by(handle, Vec2::new(0.0, 20.0)).unwrap();
        let img = surface.compose();
        assert_eq!(img.get_pixel(30, 10).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(30, 30).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_pan_shifts_composition() {
        let mut surface = surface();
        surface.draw(&black_line(5.0, 10.0, 55.0, 10.0));
        surface.pan(Vec2::new(0.0, 20.0));
        let img = surface.compose();
        assert_eq!(img.get_pixel(30, 30).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_extend_path_grows_stroke() {
        let mut surface = surface();
        let pencil = graphyx_core::shapes::Pencil::from_points(vec![
            Point::new(5.0, 30.0),
            Point::new(20.0, 30.0),
        ]);
        let handle = surface.draw(&Shape::Pencil(pencil));
        surface
            .extend_path(handle, Point::new(20.0, 30.0), Point::new(50.0, 30.0))
            .unwrap();
        let img = surface.compose();
        assert_eq!(img.get_pixel(45, 30).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_unknown_handle_errors() {
        let mut surface = surface();
        assert_eq!(
            surface.restyle(99, &ShapeStyle::default()),
            Err(SurfaceError::UnknownHandle(99))
        );
        assert_eq!(
            surface.move_by(99, Vec2::ZERO),
            Err(SurfaceError::UnknownHandle(99))
        );
    }
}
