//! Inkboard Render Library
//!
//! Paint-surface abstraction, shape painter and CPU rasterizer for Inkboard.
//! Rasterization uses tiny-skia, so export and tests need no GPU.

mod decode;
mod error;
mod export;
mod fonts;
mod painter;
mod raster;
mod recording;
mod surface;

pub use decode::{decode_image, image_source, load_image};
pub use error::{RenderError, RenderResult};
pub use export::{encode_png, export_png, render_scene, ExportArea, ExportOptions, EXPORT_PADDING};
pub use fonts::FontBook;
pub use painter::{Overlays, OverlayStyle, Painter, ERASER_WIDTH_FACTOR, MARKER_OPACITY_CEILING};
pub use raster::RasterSurface;
pub use recording::{PaintCommand, RecordingSurface};
pub use surface::{PaintSurface, RasterImage};
