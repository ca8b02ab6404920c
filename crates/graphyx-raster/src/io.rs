//! Raster import/export.
//!
//! Persistence is raster-only: saving encodes the composed pixels, opening
//! decodes pixels into the background. Neither direction carries shape
//! records, so a reloaded drawing is a flat image.

use std::path::Path;

use image::{DynamicImage, ImageFormat};
use log::{info, warn};
use thiserror::Error;

use crate::surface::RasterSurface;

/// Errors from raster io.
#[derive(Debug, Error)]
pub enum RasterIoError {
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Save the composed raster as PNG.
pub fn save_png(surface: &RasterSurface, path: &Path) -> Result<(), RasterIoError> {
    let img = surface.compose();
    img.save_with_format(path, ImageFormat::Png)?;
    info!("saved {}x{} png to {}", img.width(), img.height(), path.display());
    Ok(())
}

/// Save the composed raster as JPEG. The alpha channel is dropped.
pub fn save_jpeg(surface: &RasterSurface, path: &Path) -> Result<(), RasterIoError> {
    let img = DynamicImage::ImageRgba8(surface.compose()).to_rgb8();
    img.save_with_format(path, ImageFormat::Jpeg)?;
    info!("saved {}x{} jpeg to {}", img.width(), img.height(), path.display());
    Ok(())
}

/// Save the composition to a path from a file dialog, picking the format
/// by extension (`.jpg`/`.jpeg` for JPEG, PNG otherwise).
///
/// A `None` path (dialog cancelled) and io failures are both treated as
/// user cancellation: the operation is absorbed, nothing is surfaced.
/// Returns whether a file was written.
pub fn export(surface: &RasterSurface, path: Option<&Path>) -> bool {
    let Some(path) = path else {
        return false;
    };
    let is_jpeg = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));
    let result = if is_jpeg {
        save_jpeg(surface, path)
    } else {
        save_png(surface, path)
    };
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!("export to {} aborted: {err}", path.display());
            false
        }
    }
}

/// Open a path from a file dialog into the surface background, absorbing
/// cancellation and decode failures. Returns whether the background changed.
pub fn import(surface: &mut RasterSurface, path: Option<&Path>) -> bool {
    let Some(path) = path else {
        return false;
    };
    match open_image(surface, path) {
        Ok(()) => true,
        Err(err) => {
            warn!("import from {} aborted: {err}", path.display());
            false
        }
    }
}

/// Load an image file into the surface background.
///
/// Only the background pixels are replaced; existing display items keep
/// rendering above them. Shape records are never reconstructed from a file.
pub fn open_image(surface: &mut RasterSurface, path: &Path) -> Result<(), RasterIoError> {
    let img = image::open(path)?.to_rgba8();
    info!("opened {}x{} image from {}", img.width(), img.height(), path.display());
    surface.set_background(img);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphyx_core::shapes::{Color, Line, Shape};
    use graphyx_core::surface::DrawSurface;
    use kurbo::Point;

    fn surface_with_line() -> RasterSurface {
        let mut surface = RasterSurface::new(50, 50, Color::white());
        let mut line = Line::new(Point::new(5.0, 25.0), Point::new(45.0, 25.0));
        line.style.stroke_width = 4.0;
        surface.draw(&Shape::Line(line));
        surface
    }

    #[test]
    fn test_png_roundtrip_is_background_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drawing.png");

        let surface = surface_with_line();
        save_png(&surface, &path).unwrap();

        let mut reloaded = RasterSurface::new(50, 50, Color::white());
        open_image(&mut reloaded, &path).unwrap();

        // The stroke pixels survive as background pixels
        assert_eq!(reloaded.background().get_pixel(25, 25).0, [0, 0, 0, 255]);
        // But no display items were reconstructed
        assert_eq!(reloaded.item_count(), 0);
        let composed = reloaded.compose();
        assert_eq!(composed.get_pixel(25, 25).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_open_keeps_existing_items_on_top() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backdrop.png");
        save_png(&surface_with_line(), &path).unwrap();

        let mut surface = RasterSurface::new(50, 50, Color::white());
        let mut vertical = Line::new(Point::new(10.0, 5.0), Point::new(10.0, 45.0));
        vertical.style.stroke_width = 4.0;
        vertical.style.stroke_color = Color::rgb(255, 0, 0);
        surface.draw(&Shape::Line(vertical));
        open_image(&mut surface, &path).unwrap();

        let img = surface.compose();
        // Background line from the file
        assert_eq!(img.get_pixel(25, 25).0, [0, 0, 0, 255]);
        // Retained item still renders above it
        assert_eq!(img.get_pixel(10, 10).0[0], 255);
        assert!(img.get_pixel(10, 10).0[1] < 10);
    }

    #[test]
    fn test_export_and_import_absorb_cancellation() {
        let mut surface = surface_with_line();
        // Cancelled dialogs
        assert!(!export(&surface, None));
        assert!(!import(&mut surface, None));
        // Unwritable path is absorbed, not surfaced
        assert!(!export(&surface, Some(Path::new("/nonexistent/dir/out.png"))));
        assert!(!import(&mut surface, Some(Path::new("/nonexistent/nope.png"))));
    }

    #[test]
    fn test_export_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let surface = surface_with_line();
        let jpeg = dir.path().join("out.JPG");
        let png = dir.path().join("out.png");
        assert!(export(&surface, Some(&jpeg)));
        assert!(export(&surface, Some(&png)));
        assert!(image::open(&jpeg).is_ok());
        assert!(image::open(&png).is_ok());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut surface = RasterSurface::new(10, 10, Color::white());
        let result = open_image(&mut surface, Path::new("/nonexistent/nope.png"));
        assert!(result.is_err());
    }

    #[test]
    fn test_save_jpeg_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drawing.jpg");
        save_jpeg(&surface_with_line(), &path).unwrap();
        assert!(path.exists());
    }
}
