//! Capability traits for the external collaborators.
//!
//! The core never talks to a toolkit directly. Rendering goes through
//! [`DrawSurface`], and the two modal dialogs the tools need are behind
//! [`ColorPicker`] and [`TextPrompt`]. Backends implement these; the core
//! only holds handles.

use crate::shapes::{Color, Shape, ShapeStyle};
use kurbo::{Point, Vec2};
use thiserror::Error;

/// Opaque token identifying a rendered item on a surface.
///
/// Issued by [`DrawSurface::draw`] and valid until [`DrawSurface::delete`].
pub type SurfaceHandle = u64;

/// Errors from surface operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// The handle does not refer to a live rendered item.
    #[error("unknown surface handle {0}")]
    UnknownHandle(SurfaceHandle),
}

/// A retained drawing surface.
///
/// Items stay painted until deleted. Implementations decide how (and when)
/// pixels actually appear; the core only sequences the calls.
pub trait DrawSurface {
    /// Render a shape and return its handle.
    fn draw(&mut self, shape: &Shape) -> SurfaceHandle;

    /// Extend a rendered freehand path by one segment.
    fn extend_path(&mut self, handle: SurfaceHandle, from: Point, to: Point)
        -> Result<(), SurfaceError>;

    /// Translate a rendered item.
    fn move_by(&mut self, handle: SurfaceHandle, delta: Vec2) -> Result<(), SurfaceError>;

    /// Replace the style of a rendered item without touching its geometry.
    fn restyle(&mut self, handle: SurfaceHandle, style: &ShapeStyle) -> Result<(), SurfaceError>;

    /// Remove a rendered item. The handle is dead afterwards.
    fn delete(&mut self, handle: SurfaceHandle) -> Result<(), SurfaceError>;

    /// Paint an opaque background-colored square stamp over whatever is
    /// beneath it. Destructive; produces no handle.
    fn stamp_erase(&mut self, center: Point, radius: f64);

    /// Translate the view.
    fn pan(&mut self, delta: Vec2);

    /// Scale the view about a fixed screen point.
    fn zoom(&mut self, factor: f64, center: Point);
}

/// Modal color selection dialog.
pub trait ColorPicker {
    /// Ask the user for a color. `None` means the dialog was cancelled.
    fn pick_color(&mut self) -> Option<Color>;
}

/// The result of a text-input dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub content: String,
    pub family: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// Modal text-input dialog.
pub trait TextPrompt {
    /// Ask the user for text and font attributes. `None` means cancelled;
    /// no shape is created in that case.
    fn prompt_text(&mut self) -> Option<TextRequest>;
}

/// In-memory surface that records every call, for exercising the core
/// without a real backend.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct TestSurface {
    next_handle: SurfaceHandle,
    items: std::collections::HashMap<SurfaceHandle, TestItem>,
    restyles: usize,
    redraws: usize,
    erase_stamps: Vec<(Point, f64)>,
    pan_total: Vec2,
}

#[cfg(test)]
#[derive(Debug)]
struct TestItem {
    style: ShapeStyle,
    extensions: Vec<(Point, Point)>,
    moved: Vec2,
}

#[cfg(test)]
impl TestSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_alive(&self, handle: SurfaceHandle) -> bool {
        self.items.contains_key(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.items.len()
    }

    pub fn style_of(&self, handle: SurfaceHandle) -> Option<ShapeStyle> {
        self.items.get(&handle).map(|i| i.style.clone())
    }

    pub fn extensions_of(&self, handle: SurfaceHandle) -> &[(Point, Point)] {
        self.items
            .get(&handle)
            .map(|i| i.extensions.as_slice())
            .unwrap_or(&[])
    }

    pub fn moved_of(&self, handle: SurfaceHandle) -> Option<Vec2> {
        self.items.get(&handle).map(|i| i.moved)
    }

    pub fn restyle_count(&self) -> usize {
        self.restyles
    }

    /// Total number of `draw` calls, including items since deleted.
    pub fn draw_count(&self) -> usize {
        self.redraws
    }

    pub fn erase_stamps(&self) -> &[(Point, f64)] {
        &self.erase_stamps
    }

    pub fn pan_total(&self) -> Vec2 {
        self.pan_total
    }
}

#[cfg(test)]
impl DrawSurface for TestSurface {
    fn draw(&mut self, shape: &Shape) -> SurfaceHandle {
        self.next_handle += 1;
        self.redraws += 1;
        self.items.insert(
            self.next_handle,
            TestItem {
                style: shape.style().clone(),
                extensions: Vec::new(),
                moved: Vec2::ZERO,
            },
        );
        self.next_handle
    }

    fn extend_path(
        &mut self,
        handle: SurfaceHandle,
        from: Point,
        to: Point,
    ) -> Result<(), SurfaceError> {
        let item = self
            .items
            .get_mut(&handle)
            .ok_or(SurfaceError::UnknownHandle(handle))?;
        item.extensions.push((from, to));
        Ok(())
    }

    fn move_by(&mut self, handle: SurfaceHandle, delta: Vec2) -> Result<(), SurfaceError> {
        let item = self
            .items
            .get_mut(&handle)
            .ok_or(SurfaceError::UnknownHandle(handle))?;
        item.moved += delta;
        Ok(())
    }

    fn restyle(&mut self, handle: SurfaceHandle, style: &ShapeStyle) -> Result<(), SurfaceError> {
        let item = self
            .items
            .get_mut(&handle)
            .ok_or(SurfaceError::UnknownHandle(handle))?;
        item.style = style.clone();
        self.restyles += 1;
        Ok(())
    }

    fn delete(&mut self, handle: SurfaceHandle) -> Result<(), SurfaceError> {
        self.items
            .remove(&handle)
            .map(|_| ())
            .ok_or(SurfaceError::UnknownHandle(handle))
    }

    fn stamp_erase(&mut self, center: Point, radius: f64) {
        self.erase_stamps.push((center, radius));
    }

    fn pan(&mut self, delta: Vec2) {
        self.pan_total += delta;
    }

    fn zoom(&mut self, _factor: f64, _center: Point) {}
}
