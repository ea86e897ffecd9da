//! Paint surface abstraction.
//!
//! The shape painter only ever talks to a [`PaintSurface`], so the same code
//! drives the CPU rasterizer, a recording surface in tests, or a host canvas.

use kurbo::{Affine, BezPath, Rect, Stroke};
use peniko::{Color, Fill};

/// Decoded straight-alpha RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, 4 bytes per pixel.
    pub rgba: Vec<u8>,
}

impl RasterImage {
    /// Wrap raw pixels. Returns `None` if the buffer size doesn't match.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (rgba.len() == expected && width > 0 && height > 0).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    /// Straight-alpha color at a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.rgba.get(i..i + 4).and_then(|p| p.try_into().ok())
    }
}

/// A 2D target the painter can draw into.
///
/// All geometry is given in object space together with the transform that
/// maps it onto the surface.
pub trait PaintSurface {
    /// Fill `path` with a solid color.
    fn fill(&mut self, style: Fill, transform: Affine, color: Color, path: &BezPath);

    /// Stroke `path` with a solid color.
    fn stroke(&mut self, stroke: &Stroke, transform: Affine, color: Color, path: &BezPath);

    /// Clear everything under the stroked `path` to transparent.
    fn erase(&mut self, stroke: &Stroke, transform: Affine, path: &BezPath);

    /// Paint `image` stretched over `dest`, clipped to `clip`.
    fn draw_image(
        &mut self,
        image: &RasterImage,
        dest: Rect,
        clip: &BezPath,
        transform: Affine,
        opacity: f32,
    );
}
