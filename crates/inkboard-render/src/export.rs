//! Raster export: render a page to pixels and encode it as PNG.

use crate::error::{RenderError, RenderResult};
use crate::painter::Painter;
use crate::raster::RasterSurface;
use crate::surface::RasterImage;
use inkboard_core::document::{Background, Document};
use inkboard_core::scene::Scene;
use kurbo::{Affine, Rect};

/// Margin around the content when exporting content bounds.
pub const EXPORT_PADDING: f64 = 20.0;

/// Which part of the canvas to export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportArea {
    /// The bounds of every object, padded.
    Content,
    /// A fixed canvas-space rectangle, typically the visible viewport.
    Viewport(Rect),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub area: ExportArea,
    /// Output pixels per canvas unit (1 = 1x, 2 = 2x).
    pub scale: f64,
    pub padding: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            area: ExportArea::Content,
            scale: 1.0,
            padding: EXPORT_PADDING,
        }
    }
}

/// Render `scene` onto its background, or onto transparency when the
/// background is hidden.
pub fn render_scene(
    painter: &mut Painter,
    scene: &Scene,
    background: Background,
    options: &ExportOptions,
) -> RenderResult<RasterImage> {
    let region = match options.area {
        ExportArea::Content => {
            let bounds = scene.bounds().ok_or(RenderError::EmptyScene)?;
            bounds.inflate(options.padding, options.padding)
        }
        ExportArea::Viewport(rect) => rect.abs(),
    };
    let scale = if options.scale.is_finite() && options.scale > 0.0 {
        options.scale
    } else {
        1.0
    };
    let width = (region.width() * scale).ceil().max(1.0) as u32;
    let height = (region.height() * scale).ceil().max(1.0) as u32;

    let mut surface = RasterSurface::new(width, height)?;
    if background.visible {
        surface.clear(background.color.into());
    }
    let transform = Affine::scale(scale) * Affine::translate((-region.x0, -region.y0));
    painter.paint_scene(&mut surface, scene, transform);
    log::info!("Rendered {} objects to {width}x{height}", scene.len());
    Ok(surface.to_image())
}

/// Encode straight-alpha RGBA as an 8-bit PNG.
pub fn encode_png(image: &RasterImage) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width, image.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image.rgba)?;
        writer.finish()?;
    }
    Ok(png_data)
}

/// Render the active page of `document` and encode it as PNG.
pub fn export_png(
    painter: &mut Painter,
    document: &Document,
    options: &ExportOptions,
) -> RenderResult<Vec<u8>> {
    let image = render_scene(painter, document.scene(), document.background(), options)?;
    let png_data = encode_png(&image)?;
    log::info!("PNG export complete: {} bytes", png_data.len());
    Ok(png_data)
}
