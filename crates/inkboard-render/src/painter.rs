//! Shape painter: turns scene objects and editing overlays into surface calls.

use crate::decode::decode_image;
use crate::fonts::FontBook;
use crate::surface::{PaintSurface, RasterImage};
use inkboard_core::canvas::Canvas;
use inkboard_core::geometry::{pivot, rotated_corners};
use inkboard_core::scene::Scene;
use inkboard_core::selection::{HandleKind, SelectionFrame};
use inkboard_core::shapes::outline::{corner_arc_radius, shape_outline};
use inkboard_core::shapes::{
    ImageObject, ImageSource, Object, ObjectId, ObjectKind, SerializableColor, Stroke as InkStroke,
    StrokeTool, TextBlock, VectorShape,
};
use inkboard_core::snap::Guide;
use kurbo::{Affine, BezPath, Cap, Circle, Join, Line, Point, Rect, RoundedRect, Shape, Stroke};
use peniko::{Color, Fill};
use std::collections::HashMap;

/// Highest alpha a marker stroke is painted with.
pub const MARKER_OPACITY_CEILING: f64 = 0.5;

/// Eraser strokes clear a band twice as wide as their nominal size.
pub const ERASER_WIDTH_FACTOR: f64 = 2.0;

const PATH_TOLERANCE: f64 = 0.1;

/// Colors and sizes of the editing overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub selection_color: Color,
    pub marquee_fill: Color,
    pub guide_color: Color,
    pub placeholder_color: Color,
    /// Side of a square resize handle.
    pub handle_size: f64,
    /// Distance of the rotation handle above the frame.
    pub rotate_handle_offset: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            selection_color: Color::from_rgba8(59, 130, 246, 255),
            marquee_fill: Color::from_rgba8(59, 130, 246, 25),
            guide_color: Color::from_rgba8(236, 72, 153, 180),
            placeholder_color: Color::from_rgba8(255, 100, 100, 100),
            handle_size: 10.0,
            rotate_handle_offset: 25.0,
        }
    }
}

/// Transient visuals drawn above the scene.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlays<'a> {
    pub frame: Option<SelectionFrame>,
    pub marquee: Option<Rect>,
    pub guides: &'a [Guide],
    /// The object being drawn or typed, not yet in the scene.
    pub draft: Option<&'a Object>,
}

impl<'a> Overlays<'a> {
    pub fn from_canvas(canvas: &'a Canvas) -> Self {
        let interaction = canvas.interaction();
        Self {
            frame: canvas.selection_frame(),
            marquee: interaction.marquee_rect(),
            guides: interaction.guides(),
            draft: interaction.draft(),
        }
    }
}

/// Decoded pixels cached per image object.
#[derive(Debug, Clone)]
struct CachedImage {
    fingerprint: (u32, u32, usize),
    image: Option<RasterImage>,
}

fn fingerprint(source: &ImageSource) -> (u32, u32, usize) {
    (
        source.natural_width,
        source.natural_height,
        source.data_base64.len(),
    )
}

fn color(color: SerializableColor, alpha: f64) -> Color {
    Color::from(color).multiply_alpha(alpha.clamp(0.0, 1.0) as f32)
}

fn round_stroke(width: f64) -> Stroke {
    Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round)
}

/// Paints objects onto any [`PaintSurface`].
///
/// Output depends only on the object and the transform; the decode cache
/// never changes what gets drawn.
#[derive(Debug, Clone, Default)]
pub struct Painter {
    pub style: OverlayStyle,
    fonts: FontBook,
    images: HashMap<ObjectId, CachedImage>,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fonts(fonts: FontBook) -> Self {
        Self {
            fonts,
            ..Self::default()
        }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Forget decoded images.
    pub fn clear_cache(&mut self) {
        self.images.clear();
    }

    /// Paint one object. Rotated objects are drawn under a rotation about
    /// their local-bounds center; group children share the group's rotation.
    pub fn paint<S: PaintSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        object: &Object,
        transform: Affine,
    ) {
        self.paint_object(surface, object, transform, 1.0);
    }

    /// Paint every object back to front.
    pub fn paint_scene<S: PaintSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        scene: &Scene,
        transform: Affine,
    ) {
        for object in scene.ordered() {
            self.paint_object(surface, object, transform, 1.0);
        }
    }

    /// Paint the active page of `canvas` plus its editing overlays.
    pub fn paint_canvas<S: PaintSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        canvas: &Canvas,
        transform: Affine,
    ) {
        self.paint_scene(surface, canvas.document.scene(), transform);
        self.paint_overlays(surface, &Overlays::from_canvas(canvas), transform);
    }

    fn paint_object<S: PaintSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        object: &Object,
        transform: Affine,
        opacity: f64,
    ) {
        let transform = if object.rotation == 0.0 {
            transform
        } else {
            transform * Affine::rotate_about(object.rotation, pivot(object))
        };
        let alpha = opacity * object.opacity;
        match &object.kind {
            ObjectKind::Stroke(stroke) => paint_stroke(surface, stroke, transform, alpha),
            ObjectKind::Shape(shape) => paint_shape(surface, shape, transform, alpha),
            ObjectKind::Text(text) => self.paint_text(surface, text, transform, alpha),
            ObjectKind::Image(image) => {
                self.paint_image(surface, object.id(), image, transform, alpha)
            }
            ObjectKind::Group(group) => {
                for child in &group.children {
                    self.paint_object(surface, child, transform, alpha);
                }
            }
        }
    }

    fn paint_text<S: PaintSurface + ?Sized>(
        &self,
        surface: &mut S,
        text: &TextBlock,
        transform: Affine,
        alpha: f64,
    ) {
        if text.is_blank() {
            return;
        }
        match self.fonts.text_path(text) {
            Some(path) => surface.fill(Fill::NonZero, transform, color(text.color, alpha), &path),
            None => {
                // No face loaded: mark where the text sits.
                let bounds = Rect::new(
                    text.position.x,
                    text.position.y,
                    text.position.x + text.width().max(20.0),
                    text.position.y + text.height(),
                );
                surface.fill(
                    Fill::NonZero,
                    transform,
                    self.style.placeholder_color,
                    &bounds.to_path(PATH_TOLERANCE),
                );
            }
        }
    }

    fn decoded(&mut self, id: ObjectId, source: &ImageSource) -> Option<&RasterImage> {
        let print = fingerprint(source);
        let stale = self.images.get(&id).is_none_or(|c| c.fingerprint != print);
        if stale {
            let image = source
                .data()
                .and_then(|bytes| match decode_image(&bytes) {
                    Ok(image) => Some(image),
                    Err(e) => {
                        log::warn!("Failed to decode image {id}: {e}");
                        None
                    }
                });
            self.images.insert(
                id,
                CachedImage {
                    fingerprint: print,
                    image,
                },
            );
        }
        self.images.get(&id).and_then(|c| c.image.as_ref())
    }

    fn paint_image<S: PaintSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        id: ObjectId,
        image: &ImageObject,
        transform: Affine,
        alpha: f64,
    ) {
        let bounds = image.bounds();
        let clip = if image.corner_radius > 0.0 {
            RoundedRect::from_rect(bounds, corner_arc_radius(bounds, image.corner_radius))
                .to_path(PATH_TOLERANCE)
        } else {
            bounds.to_path(PATH_TOLERANCE)
        };
        match self.decoded(id, &image.source) {
            Some(raster) => surface.draw_image(raster, bounds, &clip, transform, alpha as f32),
            None => paint_image_placeholder(surface, bounds, transform),
        }
    }

    /// Draft object, marquee, alignment guides and the selection frame.
    pub fn paint_overlays<S: PaintSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        overlays: &Overlays<'_>,
        transform: Affine,
    ) {
        if let Some(draft) = overlays.draft {
            self.paint_object(surface, draft, transform, 1.0);
            if let ObjectKind::Text(text) = &draft.kind {
                self.paint_caret(surface, text, transform);
            }
        }
        if let Some(rect) = overlays.marquee {
            let path = rect.to_path(PATH_TOLERANCE);
            surface.fill(Fill::NonZero, transform, self.style.marquee_fill, &path);
            surface.stroke(&dashed(1.0), transform, self.style.selection_color, &path);
        }
        for guide in overlays.guides {
            let (a, b) = guide.endpoints();
            surface.stroke(&Stroke::new(1.0), transform, self.style.guide_color, &line_path(a, b));
        }
        if let Some(frame) = overlays.frame {
            self.paint_frame(surface, frame, transform);
        }
    }

    fn paint_caret<S: PaintSurface + ?Sized>(
        &self,
        surface: &mut S,
        text: &TextBlock,
        transform: Affine,
    ) {
        let row = text.lines.len().saturating_sub(1);
        let last = text.lines.last().map_or("", String::as_str);
        let width = self
            .fonts
            .measure_line(text.font_family, text.font_size, last)
            .unwrap_or_else(|| text.line_width(last));
        let x = text.position.x + width + 1.0;
        let top = text.position.y + row as f64 * text.line_height();
        surface.stroke(
            &Stroke::new(2.0),
            transform,
            Color::from_rgba8(100, 100, 100, 200),
            &line_path(Point::new(x, top), Point::new(x, top + text.font_size * 1.2)),
        );
    }

    fn paint_frame<S: PaintSurface + ?Sized>(
        &self,
        surface: &mut S,
        frame: SelectionFrame,
        transform: Affine,
    ) {
        let blue = self.style.selection_color;
        let corners = rotated_corners(frame.bounds, frame.rotation);
        let mut outline = BezPath::new();
        outline.move_to(corners[0]);
        for corner in &corners[1..] {
            outline.line_to(*corner);
        }
        outline.close_path();
        surface.stroke(&dashed(1.0), transform, blue, &outline);

        let handles = frame.handles(self.style.rotate_handle_offset);
        let top = handles
            .iter()
            .find(|h| h.kind == HandleKind::Resize(1))
            .map(|h| h.position);
        let half = self.style.handle_size / 2.0;
        for handle in &handles {
            let path = match handle.kind {
                HandleKind::Resize(_) => {
                    Rect::from_center_size(handle.position, (half * 2.0, half * 2.0))
                        .to_path(PATH_TOLERANCE)
                }
                HandleKind::Rotate => {
                    if let Some(top) = top {
                        let stem = line_path(top, handle.position);
                        surface.stroke(&Stroke::new(1.0), transform, blue, &stem);
                    }
                    Circle::new(handle.position, half).to_path(PATH_TOLERANCE)
                }
            };
            surface.fill(Fill::NonZero, transform, Color::WHITE, &path);
            surface.stroke(&Stroke::new(1.5), transform, blue, &path);
        }
    }
}

fn paint_stroke<S: PaintSurface + ?Sized>(
    surface: &mut S,
    stroke: &InkStroke,
    transform: Affine,
    alpha: f64,
) {
    let path = stroke.to_path();
    match stroke.tool {
        StrokeTool::Eraser => {
            surface.erase(&round_stroke(stroke.size * ERASER_WIDTH_FACTOR), transform, &path)
        }
        StrokeTool::Marker => surface.stroke(
            &round_stroke(stroke.size),
            transform,
            color(stroke.color, alpha.min(MARKER_OPACITY_CEILING)),
            &path,
        ),
        StrokeTool::Pencil | StrokeTool::Brush => surface.stroke(
            &round_stroke(stroke.size),
            transform,
            color(stroke.color, alpha),
            &path,
        ),
    }
}

fn paint_shape<S: PaintSurface + ?Sized>(
    surface: &mut S,
    shape: &VectorShape,
    transform: Affine,
    alpha: f64,
) {
    let outline = shape_outline(shape);
    let paint = color(shape.color, alpha);
    if shape.is_filled() {
        let rule = if outline.even_odd {
            Fill::EvenOdd
        } else {
            Fill::NonZero
        };
        surface.fill(rule, transform, paint, &outline.path);
    }
    if shape.size > 0.0 {
        let pen = Stroke::new(shape.size).with_join(Join::Round).with_caps(Cap::Round);
        surface.stroke(&pen, transform, paint, &outline.path);
    }
}

/// Gray box with a cross for images that failed to decode.
fn paint_image_placeholder<S: PaintSurface + ?Sized>(
    surface: &mut S,
    bounds: Rect,
    transform: Affine,
) {
    let rect_path = bounds.to_path(PATH_TOLERANCE);
    surface.fill(Fill::NonZero, transform, Color::from_rgba8(200, 200, 200, 255), &rect_path);
    let mut cross = BezPath::new();
    cross.move_to(Point::new(bounds.x0, bounds.y0));
    cross.line_to(Point::new(bounds.x1, bounds.y1));
    cross.move_to(Point::new(bounds.x1, bounds.y0));
    cross.line_to(Point::new(bounds.x0, bounds.y1));
    let pen = Stroke::new(2.0);
    surface.stroke(&pen, transform, Color::from_rgba8(150, 150, 150, 255), &cross);
    surface.stroke(&pen, transform, Color::from_rgba8(100, 100, 100, 255), &rect_path);
}

fn dashed(width: f64) -> Stroke {
    Stroke::new(width).with_dashes(0.0, [4.0, 4.0])
}

fn line_path(a: Point, b: Point) -> BezPath {
    Line::new(a, b).to_path(PATH_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::encode_png;
    use crate::recording::{PaintCommand, RecordingSurface};
    use inkboard_core::shapes::{Group, ImageFormat, ShapeKind};
    use inkboard_core::{Modifiers, ObjectId};

    fn rect_object(id: u64, fill: bool) -> Object {
        let shape =
            VectorShape::new(ShapeKind::Rect, Point::new(10.0, 10.0), Point::new(60.0, 60.0))
            .with_color(SerializableColor::new(255, 0, 0, 255))
            .with_size(4.0)
            .with_fill(fill);
        Object::new(ObjectId(id), ObjectKind::Shape(shape))
    }

    fn stroke_object(tool: StrokeTool) -> Object {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        let stroke = InkStroke::new(points, tool).with_size(3.0);
        Object::new(ObjectId(1), ObjectKind::Stroke(stroke))
    }

    fn record(object: &Object) -> Vec<PaintCommand> {
        let mut surface = RecordingSurface::new();
        Painter::new().paint(&mut surface, object, Affine::IDENTITY);
        surface.commands
    }

    #[test]
    fn test_outline_rect_is_stroked_only() {
        let commands = record(&rect_object(1, false));
        assert_eq!(commands.len(), 1);
        let PaintCommand::Stroke { width, color, .. } = &commands[0] else {
            panic!("expected a stroke, got {commands:?}");
        };
        assert_eq!(*width, 4.0);
        assert_eq!(*color, [255, 0, 0, 255]);
    }

    #[test]
    fn test_filled_rect_fills_then_strokes() {
        let commands = record(&rect_object(1, true));
        assert!(matches!(
            commands.as_slice(),
            [PaintCommand::Fill { style: Fill::NonZero, .. }, PaintCommand::Stroke { .. }]
        ));
    }

    #[test]
    fn test_line_ignores_fill() {
        let shape =
            VectorShape::new(ShapeKind::Line, Point::ZERO, Point::new(30.0, 0.0)).with_fill(true);
        let commands = record(&Object::new(ObjectId(1), ObjectKind::Shape(shape)));
        assert!(matches!(commands.as_slice(), [PaintCommand::Stroke { .. }]));
    }

    #[test]
    fn test_rotation_about_center() {
        let mut object = rect_object(1, false);
        object.rotation = 0.5;
        let commands = record(&object);
        let PaintCommand::Stroke { transform, .. } = &commands[0] else {
            panic!("expected a stroke");
        };
        assert_eq!(*transform, Affine::rotate_about(0.5, Point::new(35.0, 35.0)));
    }

    #[test]
    fn test_group_shares_rotation_and_opacity() {
        let mut group = Object::new(
            ObjectId(3),
            ObjectKind::Group(Group::new(vec![
                rect_object(1, false),
                stroke_object(StrokeTool::Pencil),
            ])),
        );
        group.rotation = 1.0;
        group.opacity = 0.5;
        let expected = Affine::rotate_about(1.0, pivot(&group));
        let commands = record(&group);
        assert_eq!(commands.len(), 2);
        for command in &commands {
            let PaintCommand::Stroke { transform, color, .. } = command else {
                panic!("expected strokes only");
            };
            assert_eq!(*transform, expected);
            assert!((127..=128).contains(&color[3]), "{color:?}");
        }
    }

    #[test]
    fn test_marker_opacity_ceiling() {
        let commands = record(&stroke_object(StrokeTool::Marker));
        let PaintCommand::Stroke { color, .. } = &commands[0] else {
            panic!("expected a stroke");
        };
        assert!(color[3] <= 128);
        let pencil = record(&stroke_object(StrokeTool::Pencil));
        assert!(matches!(&pencil[0], PaintCommand::Stroke { color, .. } if color[3] == 255));
    }

    #[test]
    fn test_eraser_is_double_width_and_destructive() {
        let commands = record(&stroke_object(StrokeTool::Eraser));
        assert!(matches!(
            commands.as_slice(),
            [PaintCommand::Erase { width, .. }] if *width == 6.0
        ));
    }

    #[test]
    fn test_paint_is_idempotent() {
        let object = rect_object(1, true);
        let mut painter = Painter::new();
        let mut first = RecordingSurface::new();
        let mut second = RecordingSurface::new();
        painter.paint(&mut first, &object, Affine::IDENTITY);
        painter.paint(&mut second, &object, Affine::IDENTITY);
        painter.paint(&mut second, &object, Affine::IDENTITY);
        assert_eq!(second.commands[..first.len()], first.commands[..]);
        assert_eq!(second.commands[first.len()..], first.commands[..]);
    }

    #[test]
    fn test_text_without_fonts_draws_placeholder() {
        let text = TextBlock::new(Point::new(5.0, 5.0), "hello");
        let commands = record(&Object::new(ObjectId(1), ObjectKind::Text(text)));
        assert!(matches!(commands.as_slice(), [PaintCommand::Fill { .. }]));

        let blank = TextBlock::new(Point::ZERO, "");
        assert!(record(&Object::new(ObjectId(2), ObjectKind::Text(blank))).is_empty());
    }

    #[test]
    fn test_image_paints_decoded_pixels() {
        let raster = RasterImage::new(2, 2, [0, 128, 0, 255].repeat(4)).unwrap();
        let png = encode_png(&raster).unwrap();
        let source = ImageSource::new(ImageFormat::Png, &png, 2, 2);
        let image = ImageObject::new(Point::new(10.0, 10.0), source);
        let commands = record(&Object::new(ObjectId(1), ObjectKind::Image(image)));
        assert!(matches!(
            commands.as_slice(),
            [PaintCommand::Image { size: (2, 2), dest, .. }]
                if *dest == Rect::new(10.0, 10.0, 12.0, 12.0)
        ));
    }

    #[test]
    fn test_broken_image_draws_placeholder() {
        let source = ImageSource::new(ImageFormat::Png, b"nope", 4, 4);
        let image = ImageObject::new(Point::ZERO, source);
        let commands = record(&Object::new(ObjectId(1), ObjectKind::Image(image)));
        assert_eq!(commands.len(), 3);
        assert!(!commands.iter().any(|c| matches!(c, PaintCommand::Image { .. })));
    }

    #[test]
    fn test_overlays_from_canvas() {
        let mut canvas = Canvas::new();
        canvas.set_tool("rect").unwrap();
        canvas.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE);
        canvas.pointer_move(Point::new(40.0, 40.0), Modifiers::NONE);
        canvas.pointer_up(Point::new(40.0, 40.0), Modifiers::NONE);
        canvas.set_tool("select").unwrap();
        canvas.select_all();

        // Marquee in progress on empty space, selection cleared.
        canvas.pointer_down(Point::new(100.0, 100.0), Modifiers::NONE);
        canvas.pointer_move(Point::new(150.0, 150.0), Modifiers::NONE);
        let overlays = Overlays::from_canvas(&canvas);
        assert!(overlays.frame.is_none());
        assert_eq!(overlays.marquee, Some(Rect::new(100.0, 100.0, 150.0, 150.0)));

        let mut surface = RecordingSurface::new();
        Painter::new().paint_canvas(&mut surface, &canvas, Affine::IDENTITY);
        // Scene stroke, then marquee fill and dashed outline.
        assert_eq!(surface.len(), 3);
    }

    #[test]
    fn test_selection_frame_overlay() {
        let overlays = Overlays {
            frame: Some(SelectionFrame {
                bounds: Rect::new(0.0, 0.0, 100.0, 50.0),
                rotation: 0.0,
            }),
            ..Overlays::default()
        };
        let mut surface = RecordingSurface::new();
        Painter::new().paint_overlays(&mut surface, &overlays, Affine::IDENTITY);
        // Frame outline, 9 handles (fill + stroke each), rotation stem.
        assert_eq!(surface.len(), 1 + 9 * 2 + 1);
    }
}
