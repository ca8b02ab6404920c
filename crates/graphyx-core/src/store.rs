//! Shape store: the document model.
//!
//! Each committed shape is paired with the handle the drawing surface
//! returned when it was first rendered. The store is the single source of
//! truth for what exists; the surface only knows how to paint it.

use crate::shapes::{Shape, ShapeId};
use crate::surface::SurfaceHandle;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A record with this surface handle already exists.
    #[error("surface handle {0} is already registered")]
    DuplicateHandle(SurfaceHandle),
    /// A record with this shape id already exists.
    #[error("shape {0} is already registered")]
    DuplicateId(ShapeId),
    /// No record with the given shape id.
    #[error("shape {0} not found")]
    NotFound(ShapeId),
}

/// A committed shape together with its surface handle.
///
/// The handle is an opaque token owned by the surface. It is valid from the
/// moment the shape is first rendered until the shape is deleted; deleting
/// the shape removes the record in the same step, so the store never holds
/// a dangling handle.
#[derive(Debug, Clone)]
pub struct ShapeRecord {
    pub shape: Shape,
    pub handle: SurfaceHandle,
}

/// Insertion-ordered collection of shape records.
///
/// Records are unique by shape id and by surface handle. Iteration order is
/// insertion order, which is also the z-order the surface painted them in.
#[derive(Debug, Default)]
pub struct ShapeStore {
    records: Vec<ShapeRecord>,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Fails if the handle or the shape id is already
    /// registered.
    pub fn append(&mut self, shape: Shape, handle: SurfaceHandle) -> Result<(), StoreError> {
        if self.records.iter().any(|r| r.handle == handle) {
            return Err(StoreError::DuplicateHandle(handle));
        }
        if self.records.iter().any(|r| r.shape.id() == shape.id()) {
            return Err(StoreError::DuplicateId(shape.id()));
        }
        self.records.push(ShapeRecord { shape, handle });
        Ok(())
    }

    /// Remove the record for a shape id, returning it.
    ///
    /// Removing an id that is not present is an error rather than a no-op,
    /// so callers notice stale references instead of silently ignoring them.
    pub fn remove(&mut self, id: ShapeId) -> Result<ShapeRecord, StoreError> {
        let index = self
            .records
            .iter()
            .position(|r| r.shape.id() == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(self.records.remove(index))
    }

    /// Look up a record by shape id.
    pub fn get(&self, id: ShapeId) -> Option<&ShapeRecord> {
        self.records.iter().find(|r| r.shape.id() == id)
    }

    /// Look up a record mutably by shape id.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut ShapeRecord> {
        self.records.iter_mut().find(|r| r.shape.id() == id)
    }

    /// Look up a record by surface handle.
    pub fn get_by_handle(&self, handle: SurfaceHandle) -> Option<&ShapeRecord> {
        self.records.iter().find(|r| r.handle == handle)
    }

    /// Whether a shape id is present.
    pub fn contains(&self, id: ShapeId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ShapeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
