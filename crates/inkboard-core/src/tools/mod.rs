//! Tool selection and the style applied to newly drawn objects.

use crate::shapes::{FontFamily, SerializableColor, ShapeKind, StrokeTool, TextBlock};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pencil,
    Brush,
    Marker,
    Eraser,
    Text,
    Shape(ShapeKind),
}

impl ToolKind {
    /// Parse a tool name. Shape tools use the shape's own name (`"rect"`, `"star"`).
    pub fn from_name(name: &str) -> Option<Self> {
        let tool = match name {
            "select" => ToolKind::Select,
            "pencil" => ToolKind::Pencil,
            "brush" => ToolKind::Brush,
            "marker" => ToolKind::Marker,
            "eraser" => ToolKind::Eraser,
            "text" => ToolKind::Text,
            other => ToolKind::Shape(ShapeKind::from_name(other)?),
        };
        Some(tool)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pencil => "pencil",
            ToolKind::Brush => "brush",
            ToolKind::Marker => "marker",
            ToolKind::Eraser => "eraser",
            ToolKind::Text => "text",
            ToolKind::Shape(kind) => kind.name(),
        }
    }

    /// Freehand tool behind this tool, if any.
    pub fn stroke_tool(&self) -> Option<StrokeTool> {
        match self {
            ToolKind::Pencil => Some(StrokeTool::Pencil),
            ToolKind::Brush => Some(StrokeTool::Brush),
            ToolKind::Marker => Some(StrokeTool::Marker),
            ToolKind::Eraser => Some(StrokeTool::Eraser),
            _ => None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        !matches!(self, ToolKind::Select)
    }
}

/// Style applied to new objects; kept in sync with the property panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub color: SerializableColor,
    /// Line width for strokes and shape outlines.
    pub size: f64,
    pub opacity: f64,
    pub fill: bool,
    pub corner_radius: f64,
    /// Vertex count for polygons and stars; `None` uses the shape's default.
    pub sides: Option<u32>,
    pub font_size: f64,
    pub font_family: FontFamily,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            size: 2.0,
            opacity: 1.0,
            fill: false,
            corner_radius: 0.0,
            sides: None,
            font_size: TextBlock::DEFAULT_FONT_SIZE,
            font_family: FontFamily::default(),
        }
    }
}
