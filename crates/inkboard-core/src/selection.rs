//! Selection frame, manipulation handles and the resize/rotate math behind them.

use crate::geometry::{
    local_bounds, pivot, rescale, rotate_point, rotate_vec, translate, union_bounds, MIN_FONT_SIZE,
};
use crate::shapes::{Object, ObjectKind};
use kurbo::{Point, Rect, Vec2};
use std::f64::consts::FRAC_PI_2;

/// Which handle of a selection frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// Resize handle, indexed clockwise from the top-left corner:
    /// 0 NW, 1 N, 2 NE, 3 E, 4 SE, 5 S, 6 SW, 7 W.
    Resize(usize),
    /// Rotation handle (above the top edge).
    Rotate,
}

/// Unit offsets of the eight resize handles from the frame center.
const HANDLE_FACTORS: [(f64, f64); 8] = [
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, -1.0),
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
    (-1.0, 1.0),
    (-1.0, 0.0),
];

fn handle_factor(index: usize) -> (f64, f64) {
    HANDLE_FACTORS[index % 8]
}

/// Point of `rect` at a handle position, un-rotated.
fn handle_point(rect: Rect, index: usize) -> Point {
    let (fx, fy) = handle_factor(index);
    let c = rect.center();
    Point::new(c.x + fx * rect.width() / 2.0, c.y + fy * rect.height() / 2.0)
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in canvas coordinates) hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// The box drawn around a selection, possibly rotated about its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionFrame {
    pub bounds: Rect,
    pub rotation: f64,
}

impl SelectionFrame {
    /// Frame of a single object: its local bounds under its own rotation.
    pub fn for_object(object: &Object) -> Self {
        Self {
            bounds: local_bounds(object),
            rotation: object.rotation,
        }
    }

    /// Frame of a multi-selection: the union of on-screen bounds, unrotated.
    pub fn for_objects<'a>(objects: impl IntoIterator<Item = &'a Object>) -> Option<Self> {
        union_bounds(objects).map(|bounds| Self {
            bounds,
            rotation: 0.0,
        })
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Position of the rotation handle.
    pub fn rotate_handle(&self, offset: f64) -> Point {
        let top = Point::new(self.bounds.center().x, self.bounds.y0 - offset);
        rotate_point(self.center(), top, self.rotation)
    }

    /// The eight resize handles followed by the rotation handle.
    pub fn handles(&self, rotate_offset: f64) -> Vec<Handle> {
        let c = self.center();
        let mut handles: Vec<Handle> = (0..8)
            .map(|i| {
                Handle::new(
                    rotate_point(c, handle_point(self.bounds, i), self.rotation),
                    HandleKind::Resize(i),
                )
            })
            .collect();
        handles.push(Handle::new(self.rotate_handle(rotate_offset), HandleKind::Rotate));
        handles
    }

    /// The handle under `point`, rotation handle first.
    pub fn handle_at(&self, point: Point, radius: f64, rotate_offset: f64) -> Option<HandleKind> {
        let handles = self.handles(rotate_offset);
        handles
            .iter()
            .rev()
            .find(|h| h.hit_test(point, radius))
            .map(|h| h.kind)
    }
}

/// New box after dragging resize handle `handle` of `base` by `delta`
/// (expressed in the box's own, un-rotated frame).
///
/// The opposite side stays put. With `keep_aspect` on a corner handle both
/// axes scale by the larger factor. Each dimension is floored at `min`, or
/// at the base dimension when that is already smaller (a flat line stays flat).
pub fn resize_box(base: Rect, handle: usize, delta: Vec2, keep_aspect: bool, min: f64) -> Rect {
    let (fx, fy) = handle_factor(handle);
    let raw_w = base.width() + fx * delta.x;
    let raw_h = base.height() + fy * delta.y;

    let (mut w, mut h) = (raw_w, raw_h);
    if keep_aspect && fx != 0.0 && fy != 0.0 && base.width() > 0.0 && base.height() > 0.0 {
        let s = (raw_w / base.width()).abs().max((raw_h / base.height()).abs());
        w = base.width() * s;
        h = base.height() * s;
    }
    if fx != 0.0 {
        w = w.max(min.min(base.width()));
    } else {
        w = base.width();
    }
    if fy != 0.0 {
        h = h.max(min.min(base.height()));
    } else {
        h = base.height();
    }

    let (x0, x1) = if fx < 0.0 {
        (base.x1 - w, base.x1)
    } else if fx > 0.0 {
        (base.x0, base.x0 + w)
    } else {
        (base.x0, base.x1)
    };
    let (y0, y1) = if fy < 0.0 {
        (base.y1 - h, base.y1)
    } else if fy > 0.0 {
        (base.y0, base.y0 + h)
    } else {
        (base.y0, base.y1)
    };
    Rect::new(x0, y0, x1, y1)
}

/// Smallest allowed width/height for resizing `object`.
pub fn min_resize_dimension(object: &Object, min_vector: f64, min_box: f64) -> f64 {
    match object.kind {
        ObjectKind::Image(_) | ObjectKind::Group(_) => min_box,
        _ => min_vector,
    }
}

/// Resize a single object from its pre-drag state `base`.
///
/// `delta` is the pointer movement in canvas space. The handle opposite the
/// grabbed one keeps its on-screen position even when the object is rotated.
pub fn resize_object(
    base: &Object,
    handle: usize,
    delta: Vec2,
    keep_aspect: bool,
    min: f64,
) -> Object {
    let theta = base.rotation;
    let old_bounds = local_bounds(base);
    let new_bounds = resize_box(
        old_bounds,
        handle,
        rotate_vec(delta, -theta),
        keep_aspect,
        min,
    );

    let mut object = base.clone();
    match &mut object.kind {
        // Font size follows the vertical change only; side handles leave it.
        ObjectKind::Text(text) => {
            let ratio = ratio(new_bounds.height(), old_bounds.height());
            text.font_size = (text.font_size * ratio).max(MIN_FONT_SIZE);
            text.position = Point::new(new_bounds.x0, new_bounds.y0);
        }
        ObjectKind::Image(image) => image.set_bounds(new_bounds),
        _ => rescale(&mut object, old_bounds, new_bounds),
    }

    // Pin the anchor (opposite handle) to its pre-drag screen position.
    let anchor = (handle + 4) % 8;
    let before = rotate_point(old_bounds.center(), handle_point(old_bounds, anchor), theta);
    let after_bounds = local_bounds(&object);
    let after = rotate_point(after_bounds.center(), handle_point(after_bounds, anchor), theta);
    translate(&mut object, before - after);
    object
}

fn ratio(new: f64, old: f64) -> f64 {
    if old.abs() < f64::EPSILON { 1.0 } else { new / old }
}

/// Resize every member of a multi-selection by mapping `frame` to the
/// resized frame.
pub fn resize_members(
    bases: &[Object],
    frame: Rect,
    handle: usize,
    delta: Vec2,
    keep_aspect: bool,
    min: f64,
) -> Vec<Object> {
    let target = resize_box(frame, handle, delta, keep_aspect, min);
    bases
        .iter()
        .map(|base| {
            let mut object = base.clone();
            rescale(&mut object, frame, target);
            object
        })
        .collect()
}

/// Rotation that makes the rotation handle point at `pointer`.
pub fn rotation_for_pointer(center: Point, pointer: Point) -> f64 {
    let d = pointer - center;
    d.y.atan2(d.x) + FRAC_PI_2
}

/// Rotate every member of a multi-selection about `pivot_point` by `delta`.
///
/// Each member's center orbits the pivot and its own rotation grows by `delta`.
pub fn rotate_members(bases: &[Object], pivot_point: Point, delta: f64) -> Vec<Object> {
    bases
        .iter()
        .map(|base| {
            let mut object = base.clone();
            let c = pivot(base);
            let moved = rotate_point(pivot_point, c, delta);
            translate(&mut object, moved - c);
            object.rotation = base.rotation + delta;
            object
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rotated_bounds;
    use crate::shapes::{
        ImageFormat, ImageObject, ImageSource, ObjectId, ShapeKind, TextBlock, VectorShape,
    };
    use std::f64::consts::{FRAC_PI_2, PI};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Object {
        Object::new(
            ObjectId(1),
            ObjectKind::Shape(VectorShape::new(
                ShapeKind::Rect,
                Point::new(x0, y0),
                Point::new(x1, y1),
            )),
        )
    }

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-6
    }

    #[test]
    fn test_handle_positions() {
        let frame = SelectionFrame {
            bounds: Rect::new(0.0, 0.0, 100.0, 50.0),
            rotation: 0.0,
        };
        let handles = frame.handles(25.0);
        assert_eq!(handles.len(), 9);
        assert_eq!(handles[0].position, Point::new(0.0, 0.0));
        assert_eq!(handles[3].position, Point::new(100.0, 25.0));
        assert_eq!(handles[4].position, Point::new(100.0, 50.0));
        assert_eq!(handles[8].position, Point::new(50.0, -25.0));
    }

    #[test]
    fn test_handle_at_prefers_rotate() {
        let frame = SelectionFrame {
            bounds: Rect::new(0.0, 0.0, 100.0, 10.0),
            rotation: 0.0,
        };
        // Rotation handle at (50, -5) overlaps the N handle at (50, 0).
        assert_eq!(frame.handle_at(Point::new(50.0, -4.0), 8.0, 5.0), Some(HandleKind::Rotate));
        assert_eq!(frame.handle_at(Point::new(98.0, 9.0), 8.0, 25.0), Some(HandleKind::Resize(4)));
        assert_eq!(frame.handle_at(Point::new(50.0, 50.0), 8.0, 25.0), None);
    }

    #[test]
    fn test_rotated_handles_follow_rotation() {
        let frame = SelectionFrame {
            bounds: Rect::new(-10.0, -10.0, 10.0, 10.0),
            rotation: FRAC_PI_2,
        };
        let rotate = frame.rotate_handle(25.0);
        assert!(close(rotate, Point::new(35.0, 0.0)));
    }

    #[test]
    fn test_resize_box_corner_anchors_opposite() {
        let base = Rect::new(10.0, 10.0, 60.0, 60.0);
        let r = resize_box(base, 4, Vec2::new(20.0, 10.0), false, 4.0);
        assert_eq!(r, Rect::new(10.0, 10.0, 80.0, 70.0));
        let r = resize_box(base, 0, Vec2::new(-10.0, 5.0), false, 4.0);
        assert_eq!(r, Rect::new(0.0, 15.0, 60.0, 60.0));
    }

    #[test]
    fn test_resize_box_edge_keeps_other_axis() {
        let base = Rect::new(0.0, 0.0, 40.0, 20.0);
        let r = resize_box(base, 5, Vec2::new(99.0, 10.0), false, 4.0);
        assert_eq!(r, Rect::new(0.0, 0.0, 40.0, 30.0));
    }

    #[test]
    fn test_resize_box_aspect_lock() {
        let base = Rect::new(0.0, 0.0, 100.0, 50.0);
        let r = resize_box(base, 4, Vec2::new(100.0, 0.0), true, 4.0);
        assert_eq!(r, Rect::new(0.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let base = rect(10.0, 10.0, 60.0, 60.0);
        let out = resize_object(&base, 3, Vec2::new(-100.0, 0.0), false, 4.0);
        let b = local_bounds(&out);
        assert!((b.width() - 4.0).abs() < 1e-9);
        assert_eq!(b.x0, 10.0);

        let source = ImageSource::new(ImageFormat::Png, &[], 100, 100);
        let image = Object::new(
            ObjectId(2),
            ObjectKind::Image(ImageObject::new(Point::ZERO, source)),
        );
        let out = resize_object(&image, 7, Vec2::new(500.0, 0.0), false, 10.0);
        assert!((local_bounds(&out).width() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_line_stays_flat() {
        let line = Object::new(
            ObjectId(1),
            ObjectKind::Shape(VectorShape::new(
                ShapeKind::Line,
                Point::new(0.0, 5.0),
                Point::new(50.0, 5.0),
            )),
        );
        let out = resize_object(&line, 4, Vec2::new(10.0, 10.0), false, 4.0);
        let b = local_bounds(&out);
        assert_eq!(b.height(), 0.0);
        assert!((b.width() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_resize_pins_anchor() {
        let mut base = rect(0.0, 0.0, 100.0, 50.0);
        base.rotation = PI / 6.0;
        let frame = SelectionFrame::for_object(&base);
        let anchor_before = frame.handles(25.0)[0].position;

        let out = resize_object(&base, 4, Vec2::new(30.0, 20.0), false, 4.0);
        let anchor_after = SelectionFrame::for_object(&out).handles(25.0)[0].position;
        assert!(close(anchor_before, anchor_after));
    }

    #[test]
    fn test_text_resize_scales_font_by_height() {
        let text = Object::new(
            ObjectId(1),
            ObjectKind::Text(TextBlock::new(Point::new(0.0, 0.0), "abc").with_font_size(10.0)),
        );
        // Height is 14; drag the bottom edge down by 14 to double it.
        let out = resize_object(&text, 5, Vec2::new(0.0, 14.0), false, 4.0);
        assert!((out.size().unwrap() - 20.0).abs() < 1e-9);
        // The top edge midpoint stays put, so the wider text grows both ways.
        let b = local_bounds(&out);
        assert!(close(b.origin(), Point::new(-9.0, 0.0)));
        assert!((b.width() - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_side_handle_keeps_font_size() {
        let text = Object::new(
            ObjectId(1),
            ObjectKind::Text(TextBlock::new(Point::new(0.0, 0.0), "abc").with_font_size(10.0)),
        );
        let out = resize_object(&text, 3, Vec2::new(20.0, 0.0), false, 4.0);
        assert_eq!(out.size(), Some(10.0));
        assert_eq!(local_bounds(&out), local_bounds(&text));
    }

    #[test]
    fn test_rotation_for_pointer() {
        let c = Point::new(0.0, 0.0);
        // Pointer straight above the center: no rotation.
        assert!(rotation_for_pointer(c, Point::new(0.0, -10.0)).abs() < 1e-9);
        // Pointer to the right: quarter turn.
        assert!((rotation_for_pointer(c, Point::new(10.0, 0.0)) - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_members_orbits_pivot() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let mut b = rect(90.0, 0.0, 100.0, 10.0);
        b.id = ObjectId(2);
        b.rotation = 0.2;
        let out = rotate_members(&[a, b], Point::new(50.0, 5.0), PI);
        assert!(close(pivot(&out[0]), Point::new(95.0, 5.0)));
        assert!(close(pivot(&out[1]), Point::new(5.0, 5.0)));
        assert!((out[0].rotation - PI).abs() < 1e-9);
        assert!((out[1].rotation - (0.2 + PI)).abs() < 1e-9);
    }

    #[test]
    fn test_resize_members_maps_frame() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let mut b = rect(30.0, 30.0, 40.0, 40.0);
        b.id = ObjectId(2);
        let frame = Rect::new(0.0, 0.0, 40.0, 40.0);
        let out = resize_members(&[a, b], frame, 4, Vec2::new(40.0, 40.0), false, 10.0);
        assert_eq!(rotated_bounds(&out[0]), Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(rotated_bounds(&out[1]), Rect::new(60.0, 60.0, 80.0, 80.0));
    }
}
