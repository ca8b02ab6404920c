//! Tool session: turns pointer events into store and surface operations.
//!
//! One session owns the active tool, the in-progress drag, the current
//! style for future shapes, and the selection. Rendering and dialogs are
//! reached only through the capability traits.

use crate::selection::{NearestCenterIndex, SelectionController, SelectionError, PICK_TOLERANCE};
use crate::shapes::{Color, Ellipse, FontSpec, Line, Pencil, Rectangle, Shape, ShapeStyle, Text};
use crate::store::{ShapeStore, StoreError};
use crate::surface::{DrawSurface, SurfaceError, SurfaceHandle, TextPrompt};
use kurbo::{Point, Vec2};
use log::debug;
use thiserror::Error;

/// Half-size of the square mark the eraser stamps per event.
pub const ERASER_RADIUS: f64 = 10.0;

/// Errors from session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// The active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// No drawing tool; pointer-down picks a selection.
    #[default]
    None,
    Line,
    Rectangle,
    Ellipse,
    Pencil,
    Eraser,
    Text,
    ZoomPan,
}

/// A pointer event in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
}

/// A shape being dragged out, already rendered but not yet committed.
#[derive(Debug)]
struct LiveShape {
    shape: Shape,
    handle: SurfaceHandle,
}

#[derive(Debug, Default)]
enum SessionState {
    #[default]
    Idle,
    Dragging {
        anchor: Point,
        last: Point,
        live: Option<LiveShape>,
    },
    /// Waiting on the text-input dialog. Entered and left within one
    /// pointer-down; the dialog is the only blocking call in the session.
    TextPending {
        anchor: Point,
    },
}

/// Editor session state machine.
#[derive(Debug, Default)]
pub struct ToolSession {
    tool: Tool,
    state: SessionState,
    style: ShapeStyle,
    selection: SelectionController,
    index: NearestCenterIndex,
}

impl ToolSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// The currently selected shape, if any.
    pub fn selected(&self) -> Option<crate::shapes::ShapeId> {
        self.selection.selected()
    }

    /// The style applied to shapes created from now on.
    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    /// Switch tools, aborting any drag in progress.
    pub fn set_tool(
        &mut self,
        tool: Tool,
        surface: &mut dyn DrawSurface,
    ) -> Result<(), SessionError> {
        if let SessionState::Dragging {
            live: Some(live), ..
        } = std::mem::take(&mut self.state)
        {
            surface.delete(live.handle)?;
        }
        self.state = SessionState::Idle;
        self.tool = tool;
        Ok(())
    }

    /// Set the stroke color for future shapes. Already committed shapes
    /// keep their color.
    pub fn set_color(&mut self, color: Color) {
        self.style.stroke_color = color;
    }

    /// Set the stroke width for future shapes.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.style.stroke_width = width;
    }

    /// Set the fill color for future shapes. `None` means no fill.
    pub fn set_fill_color(&mut self, fill: Option<Color>) {
        self.style.fill_color = fill;
    }

    /// Ask the color picker for a new stroke color. Cancel keeps the
    /// current color.
    pub fn choose_color(&mut self, picker: &mut dyn crate::surface::ColorPicker) {
        if let Some(color) = picker.pick_color() {
            self.set_color(color);
        }
    }

    /// Zoom the view about a screen point. Independent of the active tool.
    pub fn zoom_view(&mut self, factor: f64, center: Point, surface: &mut dyn DrawSurface) {
        surface.zoom(factor, center);
    }

    /// Dispatch a pointer event against the active tool.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        store: &mut ShapeStore,
        surface: &mut dyn DrawSurface,
        prompt: &mut dyn TextPrompt,
    ) -> Result<(), SessionError> {
        match event {
            PointerEvent::Down(point) => self.pointer_down(point, store, surface, prompt),
            PointerEvent::Move(point) => self.pointer_move(point, surface),
            PointerEvent::Up(point) => self.pointer_up(point, store),
        }
    }

    fn pointer_down(
        &mut self,
        point: Point,
        store: &mut ShapeStore,
        surface: &mut dyn DrawSurface,
        prompt: &mut dyn TextPrompt,
    ) -> Result<(), SessionError> {
        match self.tool {
            Tool::None => {
                match self
                    .selection
                    .resolve(point, store, &self.index, PICK_TOLERANCE)
                {
                    Some(id) => self.selection.select(id, store, surface)?,
                    None => self.selection.deselect(store, surface)?,
                }
            }
            Tool::Line => {
                let mut line = Line::new(point, point);
                line.style = self.style.clone();
                self.begin_drag(point, Shape::Line(line), surface);
            }
            Tool::Rectangle => {
                let mut rect = Rectangle::from_corners(point, point);
                rect.style = self.style.clone();
                self.begin_drag(point, Shape::Rectangle(rect), surface);
            }
            Tool::Ellipse => {
                let mut ellipse = Ellipse::from_corners(point, point);
                ellipse.style = self.style.clone();
                self.begin_drag(point, Shape::Ellipse(ellipse), surface);
            }
            // The stroke only comes into being on the first move
            Tool::Pencil => {
                self.state = SessionState::Dragging {
                    anchor: point,
                    last: point,
                    live: None,
                };
            }
            Tool::Eraser => {
                surface.stamp_erase(point, ERASER_RADIUS);
                self.state = SessionState::Dragging {
                    anchor: point,
                    last: point,
                    live: None,
                };
            }
            Tool::ZoomPan => {
                self.state = SessionState::Dragging {
                    anchor: point,
                    last: point,
                    live: None,
                };
            }
            Tool::Text => {
                self.state = SessionState::TextPending { anchor: point };
                let request = prompt.prompt_text();
                let anchor = match std::mem::take(&mut self.state) {
                    SessionState::TextPending { anchor } => anchor,
                    _ => point,
                };
                if let Some(request) = request {
                    let mut text = Text::new(anchor, request.content);
                    text.font = FontSpec {
                        family: request.family,
                        size: request.size,
                        bold: request.bold,
                        italic: request.italic,
                        underline: request.underline,
                    };
                    text.style = self.style.clone();
                    let shape = Shape::Text(text);
                    let handle = surface.draw(&shape);
                    store.append(shape, handle)?;
                } else {
                    debug!("text prompt cancelled, no shape created");
                }
            }
        }
        Ok(())
    }

    fn begin_drag(&mut self, anchor: Point, shape: Shape, surface: &mut dyn DrawSurface) {
        let handle = surface.draw(&shape);
        self.state = SessionState::Dragging {
            anchor,
            last: anchor,
            live: Some(LiveShape { shape, handle }),
        };
    }

    fn pointer_move(
        &mut self,
        point: Point,
        surface: &mut dyn DrawSurface,
    ) -> Result<(), SessionError> {
        let SessionState::Dragging { anchor, last, live } = &mut self.state else {
            return Ok(());
        };
        let anchor = *anchor;
        let prev = *last;
        *last = point;

        match self.tool {
            // Two-point shapes are retired and redrawn wholesale with the
            // recomputed geometry
            Tool::Line | Tool::Rectangle | Tool::Ellipse => {
                if let Some(live) = live {
                    match &mut live.shape {
                        Shape::Line(line) => line.end = point,
                        Shape::Rectangle(rect) => {
                            let fresh = Rectangle::from_corners(anchor, point);
                            rect.position = fresh.position;
                            rect.width = fresh.width;
                            rect.height = fresh.height;
                        }
                        Shape::Ellipse(ellipse) => {
                            let fresh = Ellipse::from_corners(anchor, point);
                            ellipse.center = fresh.center;
                            ellipse.radius_x = fresh.radius_x;
                            ellipse.radius_y = fresh.radius_y;
                        }
                        _ => {}
                    }
                    surface.delete(live.handle)?;
                    live.handle = surface.draw(&live.shape);
                }
            }
            // The pencil never rebuilds: the rendered path grows by the
            // last segment only
            Tool::Pencil => match live {
                Some(live) => {
                    if let Shape::Pencil(pencil) = &mut live.shape {
                        pencil.add_point(point);
                    }
                    surface.extend_path(live.handle, prev, point)?;
                }
                None => {
                    let mut pencil = Pencil::new(anchor);
                    pencil.style = self.style.clone();
                    pencil.add_point(point);
                    let shape = Shape::Pencil(pencil);
                    let handle = surface.draw(&shape);
                    *live = Some(LiveShape { shape, handle });
                }
            },
            Tool::Eraser => surface.stamp_erase(point, ERASER_RADIUS),
            Tool::ZoomPan => surface.pan(point - prev),
            Tool::None | Tool::Text => {}
        }
        Ok(())
    }

    fn pointer_up(&mut self, _point: Point, store: &mut ShapeStore) -> Result<(), SessionError> {
        if let SessionState::Dragging {
            live: Some(live), ..
        } = std::mem::take(&mut self.state)
        {
            // Zero-area drags commit too; the record exists even if it is
            // a single point
            store.append(live.shape, live.handle)?;
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Delete the selected shape: remove its record and its rendered item
    /// in one step. No-op when nothing is selected.
    pub fn delete_selected(
        &mut self,
        store: &mut ShapeStore,
        surface: &mut dyn DrawSurface,
    ) -> Result<(), SessionError> {
        let Some(id) = self.selection.selected() else {
            return Ok(());
        };
        let record = store.remove(id)?;
        surface.delete(record.handle)?;
        self.selection.clear();
        Ok(())
    }

    /// Translate the selected shape in the store and on the surface.
    /// No-op when nothing is selected.
    pub fn move_selected(
        &mut self,
        delta: Vec2,
        store: &mut ShapeStore,
        surface: &mut dyn DrawSurface,
    ) -> Result<(), SessionError> {
        let Some(id) = self.selection.selected() else {
            return Ok(());
        };
        let record = store
            .get_mut(id)
            .ok_or(SelectionError::InvalidReference(id))?;
        record.shape.translate(delta);
        surface.move_by(record.handle, delta)?;
        Ok(())
    }
}
