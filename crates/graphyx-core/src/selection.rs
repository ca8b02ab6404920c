//! Selection: picking a shape under the pointer and highlighting it.
//!
//! At most one shape is selected at a time. The highlight is applied only
//! through the surface; the stored style of the shape is never mutated, so
//! deselecting is just painting the stored style back.

use crate::shapes::{Color, ShapeId, ShapeStyle};
use crate::store::ShapeStore;
use crate::surface::{DrawSurface, SurfaceError};
use kurbo::Point;
use thiserror::Error;

/// Stroke color used to highlight the selected shape.
pub const HIGHLIGHT: Color = Color::rgb(0, 0, 255);

/// Default pick tolerance in world units.
pub const PICK_TOLERANCE: f64 = 5.0;

/// Errors from selection operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The id does not refer to a shape in the store.
    #[error("shape {0} is not in the store")]
    InvalidReference(ShapeId),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Capability for finding the shape nearest to a point.
pub trait SpatialIndex {
    /// The id of the shape nearest to `point`, or `None` if the store is
    /// empty.
    fn nearest(&self, point: Point, store: &ShapeStore) -> Option<ShapeId>;
}

/// Naive nearest-center index: a linear scan choosing the record whose
/// bounding-box center is closest to the query point.
///
/// This biases picking toward shape centers rather than outlines; for
/// overlapping shapes the one whose center is nearer wins even when the
/// pointer sits on the other's edge.
#[derive(Debug, Default)]
pub struct NearestCenterIndex;

impl SpatialIndex for NearestCenterIndex {
    fn nearest(&self, point: Point, store: &ShapeStore) -> Option<ShapeId> {
        let mut best: Option<(ShapeId, f64)> = None;
        for record in store.iter() {
            let center = record.shape.bounds().center();
            let dist = center.distance(point);
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((record.shape.id(), dist)),
            }
        }
        best.map(|(id, _)| id)
    }
}

/// Tracks the current selection and applies the highlight.
#[derive(Debug, Default)]
pub struct SelectionController {
    selected: Option<ShapeId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently selected shape, if any.
    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    /// Find the shape at a point, if any.
    ///
    /// The nearest candidate (by bounds center) is accepted when the point
    /// falls inside its bounding box inflated by `tolerance`. An empty
    /// store yields `None`.
    pub fn resolve(
        &self,
        point: Point,
        store: &ShapeStore,
        index: &dyn SpatialIndex,
        tolerance: f64,
    ) -> Option<ShapeId> {
        let candidate = index.nearest(point, store)?;
        let record = store.get(candidate)?;
        let hit_area = record.shape.bounds().inflate(tolerance, tolerance);
        hit_area.contains(point).then_some(candidate)
    }

    /// Select a shape, replacing any previous selection.
    ///
    /// The previous selection is restyled back to its stored style and the
    /// new one is painted with the highlight color. Selecting the already
    /// selected shape is a no-op.
    pub fn select(
        &mut self,
        id: ShapeId,
        store: &ShapeStore,
        surface: &mut dyn DrawSurface,
    ) -> Result<(), SelectionError> {
        if self.selected == Some(id) {
            return Ok(());
        }
        let record = store
            .get(id)
            .ok_or(SelectionError::InvalidReference(id))?;

        self.deselect(store, surface)?;

        let mut highlighted: ShapeStyle = record.shape.style().clone();
        highlighted.stroke_color = HIGHLIGHT;
        surface.restyle(record.handle, &highlighted)?;
        self.selected = Some(id);
        Ok(())
    }

    /// Clear the selection, restoring the stored style on the surface.
    ///
    /// If the selected shape has since been removed from the store there is
    /// nothing to restore; the selection is simply cleared.
    pub fn deselect(
        &mut self,
        store: &ShapeStore,
        surface: &mut dyn DrawSurface,
    ) -> Result<(), SelectionError> {
        if let Some(prev) = self.selected.take() {
            if let Some(record) = store.get(prev) {
                surface.restyle(record.handle, record.shape.style())?;
            }
        }
        Ok(())
    }

    /// Drop the selection without touching the surface. For callers that
    /// have already deleted the rendered item.
    pub fn clear(&mut self) {
        self.selected = None;
    }
}
