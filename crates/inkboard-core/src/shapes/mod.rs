//! Drawable object model for the canvas.

mod group;
mod image;
pub mod outline;
mod stroke;
mod text;
mod vector;

pub use group::Group;
pub use image::{ImageFormat, ImageObject, ImageSource};
pub use stroke::{Stroke, StrokeTool};
pub use text::{FontFamily, TextBlock};
pub use vector::{ShapeKind, VectorShape};

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    out[i] = v * 17;
                }
                Some(Self::new(out[0], out[1], out[2], 255))
            }
            6 => Some(Self::new(
                channel(hex.get(0..2)?)?,
                channel(hex.get(2..4)?)?,
                channel(hex.get(4..6)?)?,
                255,
            )),
            8 => Some(Self::new(
                channel(hex.get(0..2)?)?,
                channel(hex.get(2..4)?)?,
                channel(hex.get(4..6)?)?,
                channel(hex.get(6..8)?)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Multiply the alpha channel by `factor` (clamped to 0..=1).
    pub fn with_alpha_factor(&self, factor: f64) -> Self {
        let alpha = (self.a as f64 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a: alpha, ..*self }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stable identity of a drawable object.
///
/// Ids increase monotonically across a document and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh object ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocator whose first id is strictly greater than `max`.
    pub fn resume_after(max: ObjectId) -> Self {
        Self { next: max.0 + 1 }
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`IdAllocator::next_id`] will return.
    pub fn peek(&self) -> ObjectId {
        ObjectId(self.next)
    }

    /// Make sure no id at or below `id` is handed out again.
    pub fn reserve(&mut self, id: ObjectId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }
}

fn default_opacity() -> f64 {
    1.0
}

/// A drawable object: common fields plus the type-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub(crate) id: ObjectId,
    /// Rotation in radians about the center of the object's local bounds.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity (0.0 = transparent, 1.0 = opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Locked objects can be selected but not moved, edited or deleted.
    #[serde(default)]
    pub locked: bool,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

/// Type-specific payload of an [`Object`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    Stroke(Stroke),
    Shape(VectorShape),
    Text(TextBlock),
    Image(ImageObject),
    Group(Group),
}

impl Object {
    pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id,
            rotation: 0.0,
            opacity: 1.0,
            locked: false,
            kind,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Short type name, as shown in the layer panel.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            ObjectKind::Stroke(_) => "stroke",
            ObjectKind::Shape(shape) => shape.kind.name(),
            ObjectKind::Text(_) => "text",
            ObjectKind::Image(_) => "image",
            ObjectKind::Group(_) => "group",
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ObjectKind::Group(_))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            ObjectKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&VectorShape> {
        match &self.kind {
            ObjectKind::Shape(s) => Some(s),
            _ => None,
        }
    }

    /// Representative color. Groups report their first colored child.
    pub fn color(&self) -> Option<SerializableColor> {
        match &self.kind {
            ObjectKind::Stroke(s) => Some(s.color),
            ObjectKind::Shape(s) => Some(s.color),
            ObjectKind::Text(t) => Some(t.color),
            ObjectKind::Image(_) => None,
            ObjectKind::Group(g) => g.children.iter().find_map(Object::color),
        }
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        match &mut self.kind {
            ObjectKind::Stroke(s) => s.color = color,
            ObjectKind::Shape(s) => s.color = color,
            ObjectKind::Text(t) => t.color = color,
            ObjectKind::Image(_) => {}
            ObjectKind::Group(g) => g.children.iter_mut().for_each(|c| c.set_color(color)),
        }
    }

    /// Line width for strokes and shapes, font size for text.
    pub fn size(&self) -> Option<f64> {
        match &self.kind {
            ObjectKind::Stroke(s) => Some(s.size),
            ObjectKind::Shape(s) => Some(s.size),
            ObjectKind::Text(t) => Some(t.font_size),
            ObjectKind::Image(_) => None,
            ObjectKind::Group(g) => g.children.iter().find_map(Object::size),
        }
    }

    pub fn set_size(&mut self, size: f64) {
        match &mut self.kind {
            ObjectKind::Stroke(s) => s.size = size,
            ObjectKind::Shape(s) => s.size = size,
            ObjectKind::Text(t) => t.font_size = size,
            ObjectKind::Image(_) => {}
            ObjectKind::Group(g) => g.children.iter_mut().for_each(|c| c.set_size(size)),
        }
    }

    pub fn corner_radius(&self) -> Option<f64> {
        match &self.kind {
            ObjectKind::Shape(s) => Some(s.corner_radius),
            ObjectKind::Image(i) => Some(i.corner_radius),
            ObjectKind::Group(g) => g.children.iter().find_map(Object::corner_radius),
            _ => None,
        }
    }

    pub fn set_corner_radius(&mut self, radius: f64) {
        let radius = radius.clamp(0.0, 100.0);
        match &mut self.kind {
            ObjectKind::Shape(s) => s.corner_radius = radius,
            ObjectKind::Image(i) => i.corner_radius = radius,
            ObjectKind::Group(g) => g
                .children
                .iter_mut()
                .for_each(|c| c.set_corner_radius(radius)),
            _ => {}
        }
    }

    pub fn sides(&self) -> Option<u32> {
        match &self.kind {
            ObjectKind::Shape(s) => Some(s.sides),
            ObjectKind::Group(g) => g.children.iter().find_map(Object::sides),
            _ => None,
        }
    }

    pub fn set_sides(&mut self, sides: u32) {
        match &mut self.kind {
            ObjectKind::Shape(s) => s.sides = s.kind.clamp_sides(sides),
            ObjectKind::Group(g) => g.children.iter_mut().for_each(|c| c.set_sides(sides)),
            _ => {}
        }
    }

    pub fn fill(&self) -> Option<bool> {
        match &self.kind {
            ObjectKind::Shape(s) => Some(s.fill),
            ObjectKind::Group(g) => g.children.iter().find_map(Object::fill),
            _ => None,
        }
    }

    pub fn set_fill(&mut self, fill: bool) {
        match &mut self.kind {
            ObjectKind::Shape(s) => s.fill = fill,
            ObjectKind::Group(g) => g.children.iter_mut().for_each(|c| c.set_fill(fill)),
            _ => {}
        }
    }

    /// Give this object (and every nested child) fresh ids.
    pub fn regenerate_ids(&mut self, ids: &mut IdAllocator) {
        self.id = ids.next_id();
        if let ObjectKind::Group(g) = &mut self.kind {
            for child in &mut g.children {
                child.regenerate_ids(ids);
            }
        }
    }

    /// Largest id used by this object or any nested child.
    pub fn max_id(&self) -> ObjectId {
        match &self.kind {
            ObjectKind::Group(g) => g
                .children
                .iter()
                .map(Object::max_id)
                .fold(self.id, ObjectId::max),
            _ => self.id,
        }
    }
}
