//! Text shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Font descriptor for a text item, as collected by the text-input dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Font family name.
    pub family: String,
    /// Size in pixels.
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl FontSpec {
    /// Default font size used when the dialog does not specify one.
    pub const DEFAULT_SIZE: f64 = 16.0;
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            size: Self::DEFAULT_SIZE,
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

/// A text item anchored at a point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Anchor point (top-left of the text box).
    pub anchor: Point,
    /// The text content.
    pub content: String,
    /// Font descriptor.
    pub font: FontSpec,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Text {
    /// Create a new text item.
    pub fn new(anchor: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            anchor,
            content,
            font: FontSpec::default(),
            style: ShapeStyle::default(),
        }
    }

    /// Approximate advance width per character as a fraction of the font size.
    const CHAR_ASPECT: f64 = 0.6;

    /// Approximate width of the laid-out text.
    pub fn approx_width(&self) -> f64 {
        self.content.chars().count() as f64 * self.font.size * Self::CHAR_ASPECT
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.anchor.x,
            self.anchor.y,
            self.anchor.x + self.approx_width(),
            self.anchor.y + self.font.size,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        self.anchor = affine * self.anchor;
        let coeffs = affine.as_coeffs();
        self.font.size *= coeffs[3].abs();
    }
}
