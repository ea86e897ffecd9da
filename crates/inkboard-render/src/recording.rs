//! A surface that records draw calls instead of rasterizing them.

use crate::surface::{PaintSurface, RasterImage};
use kurbo::{Affine, BezPath, Rect, Stroke};
use peniko::{Color, Fill};

/// One recorded draw call. Colors are stored as straight RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    Fill {
        style: Fill,
        transform: Affine,
        color: [u8; 4],
        path: BezPath,
    },
    Stroke {
        width: f64,
        transform: Affine,
        color: [u8; 4],
        path: BezPath,
    },
    Erase {
        width: f64,
        transform: Affine,
        path: BezPath,
    },
    Image {
        size: (u32, u32),
        dest: Rect,
        transform: Affine,
        opacity: f32,
    },
}

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

/// Surface that keeps a list of [`PaintCommand`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    pub commands: Vec<PaintCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl PaintSurface for RecordingSurface {
    fn fill(&mut self, style: Fill, transform: Affine, color: Color, path: &BezPath) {
        self.commands.push(PaintCommand::Fill {
            style,
            transform,
            color: rgba(color),
            path: path.clone(),
        });
    }

    fn stroke(&mut self, stroke: &Stroke, transform: Affine, color: Color, path: &BezPath) {
        self.commands.push(PaintCommand::Stroke {
            width: stroke.width,
            transform,
            color: rgba(color),
            path: path.clone(),
        });
    }

    fn erase(&mut self, stroke: &Stroke, transform: Affine, path: &BezPath) {
        self.commands.push(PaintCommand::Erase {
            width: stroke.width,
            transform,
            path: path.clone(),
        });
    }

    fn draw_image(
        &mut self,
        image: &RasterImage,
        dest: Rect,
        _clip: &BezPath,
        transform: Affine,
        opacity: f32,
    ) {
        self.commands.push(PaintCommand::Image {
            size: (image.width, image.height),
            dest,
            transform,
            opacity,
        });
    }
}
