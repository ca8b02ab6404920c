//! GraphyX Raster Backend
//!
//! Headless software-raster implementation of the GraphyX drawing surface:
//! retained display list, SDF rasterization, destructive eraser stamps, and
//! PNG/JPEG import/export of the composed image.

pub mod io;
mod rasterize;
pub mod surface;

pub use io::{export, import, open_image, save_jpeg, save_png, RasterIoError};
pub use surface::RasterSurface;
