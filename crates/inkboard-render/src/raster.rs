//! CPU raster surface backed by tiny-skia.

use crate::error::{RenderError, RenderResult};
use crate::surface::{PaintSurface, RasterImage};
use kurbo::{Affine, BezPath, Cap, Join, PathEl, Rect, Stroke};
use peniko::{Color, Fill};
use tiny_skia::{
    BlendMode, ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pattern,
    Pixmap, SpreadMode, StrokeDash, Transform,
};

/// An RGBA pixmap the painter draws into.
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl RasterSurface {
    /// Create a transparent surface. Fails on a zero or oversized dimension.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Surface(format!("Invalid surface size {width}x{height}")))?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fill the whole surface with `color`.
    pub fn clear(&mut self, color: Color) {
        let c = color.to_rgba8();
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a));
    }

    /// Straight-alpha color at a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        // Pixmap::pixel only bounds-checks the flat index.
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    /// Copy out the pixels as straight-alpha RGBA.
    pub fn to_image(&self) -> RasterImage {
        let rgba = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RasterImage {
            width: self.width(),
            height: self.height(),
            rgba,
        }
    }
}

fn to_sk_transform(transform: Affine) -> Transform {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn to_sk_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn to_sk_stroke(stroke: &Stroke) -> tiny_skia::Stroke {
    let line_cap = match stroke.start_cap {
        Cap::Butt => LineCap::Butt,
        Cap::Square => LineCap::Square,
        Cap::Round => LineCap::Round,
    };
    let line_join = match stroke.join {
        Join::Bevel => LineJoin::Bevel,
        Join::Miter => LineJoin::Miter,
        Join::Round => LineJoin::Round,
    };
    let dash = if stroke.dash_pattern.is_empty() {
        None
    } else {
        StrokeDash::new(
            stroke.dash_pattern.iter().map(|d| *d as f32).collect(),
            stroke.dash_offset as f32,
        )
    };
    tiny_skia::Stroke {
        width: stroke.width as f32,
        miter_limit: stroke.miter_limit as f32,
        line_cap,
        line_join,
        dash,
    }
}

fn solid_paint(color: Color) -> Paint<'static> {
    let c = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;
    paint
}

/// Premultiplied copy of a decoded image.
fn to_pixmap(image: &RasterImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width, image.height)?;
    for (dst, src) in pixmap
        .pixels_mut()
        .iter_mut()
        .zip(image.rgba.chunks_exact(4))
    {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Some(pixmap)
}

impl PaintSurface for RasterSurface {
    fn fill(&mut self, style: Fill, transform: Affine, color: Color, path: &BezPath) {
        let Some(path) = to_sk_path(path) else {
            return;
        };
        let rule = match style {
            Fill::NonZero => FillRule::Winding,
            Fill::EvenOdd => FillRule::EvenOdd,
        };
        self.pixmap
            .fill_path(&path, &solid_paint(color), rule, to_sk_transform(transform), None);
    }

    fn stroke(&mut self, stroke: &Stroke, transform: Affine, color: Color, path: &BezPath) {
        let Some(path) = to_sk_path(path) else {
            return;
        };
        self.pixmap.stroke_path(
            &path,
            &solid_paint(color),
            &to_sk_stroke(stroke),
            to_sk_transform(transform),
            None,
        );
    }

    fn erase(&mut self, stroke: &Stroke, transform: Affine, path: &BezPath) {
        let Some(path) = to_sk_path(path) else {
            return;
        };
        let mut paint = solid_paint(Color::BLACK);
        paint.blend_mode = BlendMode::Clear;
        self.pixmap.stroke_path(
            &path,
            &paint,
            &to_sk_stroke(stroke),
            to_sk_transform(transform),
            None,
        );
    }

    fn draw_image(
        &mut self,
        image: &RasterImage,
        dest: Rect,
        clip: &BezPath,
        transform: Affine,
        opacity: f32,
    ) {
        let (Some(source), Some(clip)) = (to_pixmap(image), to_sk_path(clip)) else {
            return;
        };
        let sx = dest.width() / image.width as f64;
        let sy = dest.height() / image.height as f64;
        let placement =
            Transform::from_row(sx as f32, 0.0, 0.0, sy as f32, dest.x0 as f32, dest.y0 as f32);
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.shader = Pattern::new(
            source.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            opacity.clamp(0.0, 1.0),
            placement,
        );
        self.pixmap.fill_path(
            &clip,
            &paint,
            FillRule::Winding,
            to_sk_transform(transform),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Line, Shape};

    fn rect_path(r: Rect) -> BezPath {
        r.to_path(0.1)
    }

    #[test]
    fn test_invalid_size() {
        assert!(matches!(RasterSurface::new(0, 10), Err(RenderError::Surface(_))));
    }

    #[test]
    fn test_fill_and_clear() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        surface.clear(Color::WHITE);
        surface.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            Color::from_rgba8(255, 0, 0, 255),
            &rect_path(Rect::new(5.0, 5.0, 15.0, 15.0)),
        );
        assert_eq!(surface.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(1, 1), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(20, 0), None);
        assert_eq!(surface.pixel(25, 3), None);
        assert_eq!(surface.pixel(0, 20), None);
    }

    #[test]
    fn test_transform_is_applied() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        surface.fill(
            Fill::NonZero,
            Affine::translate((10.0, 10.0)),
            Color::BLACK,
            &rect_path(Rect::new(0.0, 0.0, 5.0, 5.0)),
        );
        assert_eq!(surface.pixel(2, 2).map(|p| p[3]), Some(0));
        assert_eq!(surface.pixel(12, 12), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_erase_clears_pixels() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        surface.clear(Color::WHITE);
        let mut path = BezPath::new();
        path.extend(Line::new((0.0, 10.0), (20.0, 10.0)).path_elements(0.1));
        surface.erase(&Stroke::new(6.0), Affine::IDENTITY, &path);
        assert_eq!(surface.pixel(10, 10).map(|p| p[3]), Some(0));
        assert_eq!(surface.pixel(10, 1), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_draw_image_stretches_to_dest() {
        let image = RasterImage::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
        let dest = Rect::new(0.0, 0.0, 20.0, 10.0);
        let mut surface = RasterSurface::new(20, 10).unwrap();
        surface.draw_image(&image, dest, &rect_path(dest), Affine::IDENTITY, 1.0);

        let left = surface.pixel(2, 5).unwrap();
        assert!(left[0] > 240 && left[2] < 15, "{left:?}");
        let right = surface.pixel(17, 5).unwrap();
        assert!(right[2] > 240 && right[0] < 15, "{right:?}");

        let copy = surface.to_image();
        assert_eq!(copy.rgba.len(), 20 * 10 * 4);
        assert_eq!(copy.pixel(2, 5), Some(left));
    }

    #[test]
    fn test_raster_image_rejects_bad_buffer() {
        assert!(RasterImage::new(2, 2, vec![0; 15]).is_none());
        assert!(RasterImage::new(0, 0, Vec::new()).is_none());
    }
}
