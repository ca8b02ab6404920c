//! GraphyX Core Library
//!
//! Platform-agnostic core for the GraphyX editor: shape model, shape store,
//! selection, tool session state machine, viewport math, and the capability
//! traits the rendering backend and dialogs implement.

pub mod selection;
pub mod session;
pub mod shapes;
pub mod store;
pub mod surface;
pub mod viewport;

pub use selection::{NearestCenterIndex, SelectionController, SelectionError, SpatialIndex};
pub use session::{PointerEvent, SessionError, Tool, ToolSession};
pub use shapes::{Color, Shape, ShapeId, ShapeStyle, ShapeTrait};
pub use store::{ShapeRecord, ShapeStore, StoreError};
pub use surface::{ColorPicker, DrawSurface, SurfaceError, SurfaceHandle, TextPrompt, TextRequest};
pub use viewport::Viewport;
