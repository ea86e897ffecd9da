//! Parametric vector shapes defined by two opposite corners.

use super::SerializableColor;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Every parametric shape the canvas can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Line,
    Rect,
    Circle,
    Polygon,
    Triangle,
    Hexagon,
    Arrow,
    Pill,
    Diamond,
    Parallelogram,
    Trapezoid,
    TrapDown,
    Cross,
    Frame,
    Heart,
    Cloud,
    SpeechBubble,
    SpeechOval,
    Bookmark,
    Ribbon,
    Arch,
    Stadium,
    Star,
    Starburst,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 24] = [
        ShapeKind::Line,
        ShapeKind::Rect,
        ShapeKind::Circle,
        ShapeKind::Polygon,
        ShapeKind::Triangle,
        ShapeKind::Hexagon,
        ShapeKind::Arrow,
        ShapeKind::Pill,
        ShapeKind::Diamond,
        ShapeKind::Parallelogram,
        ShapeKind::Trapezoid,
        ShapeKind::TrapDown,
        ShapeKind::Cross,
        ShapeKind::Frame,
        ShapeKind::Heart,
        ShapeKind::Cloud,
        ShapeKind::SpeechBubble,
        ShapeKind::SpeechOval,
        ShapeKind::Bookmark,
        ShapeKind::Ribbon,
        ShapeKind::Arch,
        ShapeKind::Stadium,
        ShapeKind::Star,
        ShapeKind::Starburst,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Line => "line",
            ShapeKind::Rect => "rect",
            ShapeKind::Circle => "circle",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Arrow => "arrow",
            ShapeKind::Pill => "pill",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Parallelogram => "parallelogram",
            ShapeKind::Trapezoid => "trapezoid",
            ShapeKind::TrapDown => "trapdown",
            ShapeKind::Cross => "cross",
            ShapeKind::Frame => "frame",
            ShapeKind::Heart => "heart",
            ShapeKind::Cloud => "cloud",
            ShapeKind::SpeechBubble => "speechbubble",
            ShapeKind::SpeechOval => "speechoval",
            ShapeKind::Bookmark => "bookmark",
            ShapeKind::Ribbon => "ribbon",
            ShapeKind::Arch => "arch",
            ShapeKind::Stadium => "stadium",
            ShapeKind::Star => "star",
            ShapeKind::Starburst => "starburst",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Line-like shapes are always stroked, never filled.
    pub fn is_linear(&self) -> bool {
        matches!(self, ShapeKind::Line | ShapeKind::Arrow)
    }

    pub fn supports_fill(&self) -> bool {
        !self.is_linear()
    }

    pub fn default_sides(&self) -> u32 {
        match self {
            ShapeKind::Triangle => 3,
            ShapeKind::Polygon | ShapeKind::Star => 5,
            ShapeKind::Hexagon => 6,
            ShapeKind::Starburst => 12,
            _ => 4,
        }
    }

    /// Smallest vertex count that still makes sense for this kind.
    pub fn min_sides(&self) -> u32 {
        match self {
            ShapeKind::Starburst => 4,
            _ => 3,
        }
    }

    pub fn clamp_sides(&self, sides: u32) -> u32 {
        sides.clamp(self.min_sides(), 64)
    }
}

/// A parametric shape spanning the box between `start` and `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorShape {
    pub kind: ShapeKind,
    /// First corner (for lines and arrows, the tail).
    pub start: Point,
    /// Opposite corner (for lines and arrows, the head).
    pub end: Point,
    pub color: SerializableColor,
    /// Outline width.
    pub size: f64,
    pub fill: bool,
    /// Corner rounding, 0..=100 percent of the largest radius the shape allows.
    #[serde(default)]
    pub corner_radius: f64,
    /// Vertex count for the polygon and star families.
    pub sides: u32,
}

impl VectorShape {
    pub fn new(kind: ShapeKind, start: Point, end: Point) -> Self {
        Self {
            kind,
            start,
            end,
            color: SerializableColor::black(),
            size: 2.0,
            fill: false,
            corner_radius: 0.0,
            sides: kind.default_sides(),
        }
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    /// Normalized box `(min, min)..(max, max)` of the two corners.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    /// Whether the interior is painted (always false for line-like kinds).
    pub fn is_filled(&self) -> bool {
        self.fill && self.kind.supports_fill()
    }
}
