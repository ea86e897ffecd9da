//! Geometry kernel: rotation, bounds, rescaling and distances.
//!
//! Everything here is a pure function over [`Object`]s and kurbo primitives.

use crate::shapes::{Object, ObjectKind};
use kurbo::{Affine, Point, Rect, Vec2};

/// Smallest font size text can be scaled down to.
pub const MIN_FONT_SIZE: f64 = 6.0;

/// Rotate `point` about `center` by `angle` radians.
pub fn rotate_point(center: Point, point: Point, angle: f64) -> Point {
    if angle == 0.0 {
        return point;
    }
    Affine::rotate_about(angle, center) * point
}

/// Rotate a vector by `angle` radians.
pub fn rotate_vec(v: Vec2, angle: f64) -> Vec2 {
    if angle == 0.0 {
        return v;
    }
    let (s, c) = angle.sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

/// Distance from a point to a line segment (a→b).
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Un-rotated bounding box in the object's own coordinate space.
pub fn local_bounds(object: &Object) -> Rect {
    match &object.kind {
        ObjectKind::Stroke(stroke) => {
            let Some((first, rest)) = stroke.points.split_first() else {
                return Rect::ZERO;
            };
            let bounds = rest
                .iter()
                .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p));
            let pad = stroke.size / 2.0;
            bounds.inflate(pad, pad)
        }
        ObjectKind::Shape(shape) => shape.bounds(),
        ObjectKind::Text(text) => Rect::new(
            text.position.x,
            text.position.y,
            text.position.x + text.width(),
            text.position.y + text.height(),
        ),
        ObjectKind::Image(image) => image.bounds(),
        // Children's own rotations are not applied here.
        ObjectKind::Group(group) => group
            .children
            .iter()
            .map(local_bounds)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO),
    }
}

/// Center of the local bounds: the pivot for the object's rotation.
pub fn pivot(object: &Object) -> Point {
    local_bounds(object).center()
}

/// Axis-aligned box around `rect` rotated by `angle` about its center.
pub fn rotated_rect_bounds(rect: Rect, angle: f64) -> Rect {
    if angle == 0.0 {
        return rect;
    }
    let c = rect.center();
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
    .map(|p| rotate_point(c, p, angle));
    corners[1..]
        .iter()
        .fold(Rect::from_points(corners[0], corners[0]), |r, p| r.union_pt(*p))
}

/// On-screen footprint: local bounds rotated by the object's rotation.
pub fn rotated_bounds(object: &Object) -> Rect {
    rotated_rect_bounds(local_bounds(object), object.rotation)
}

/// Union of the rotated bounds of several objects.
pub fn union_bounds<'a>(objects: impl IntoIterator<Item = &'a Object>) -> Option<Rect> {
    objects
        .into_iter()
        .map(rotated_bounds)
        .reduce(|a, b| a.union(b))
}

/// The four corners of `rect` rotated about its center, clockwise from top-left.
pub fn rotated_corners(rect: Rect, angle: f64) -> [Point; 4] {
    let c = rect.center();
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
    .map(|p| rotate_point(c, p, angle))
}

/// Move every coordinate of `object` by `delta`.
pub fn translate(object: &mut Object, delta: Vec2) {
    match &mut object.kind {
        ObjectKind::Stroke(stroke) => stroke.points.iter_mut().for_each(|p| *p += delta),
        ObjectKind::Shape(shape) => {
            shape.start += delta;
            shape.end += delta;
        }
        ObjectKind::Text(text) => text.position += delta,
        ObjectKind::Image(image) => image.position += delta,
        ObjectKind::Group(group) => group
            .children
            .iter_mut()
            .for_each(|child| translate(child, delta)),
    }
}

/// Linear map from one box to another, with independent X/Y factors.
///
/// A degenerate source axis keeps a scale of 1 so coordinates never become NaN.
#[derive(Debug, Clone, Copy)]
pub struct BoxMap {
    from: Rect,
    to: Rect,
    pub sx: f64,
    pub sy: f64,
}

impl BoxMap {
    pub fn new(from: Rect, to: Rect) -> Self {
        let scale = |f: f64, t: f64| if f.abs() < f64::EPSILON { 1.0 } else { t / f };
        Self {
            from,
            to,
            sx: scale(from.width(), to.width()),
            sy: scale(from.height(), to.height()),
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.to.x0 + (p.x - self.from.x0) * self.sx,
            self.to.y0 + (p.y - self.from.y0) * self.sy,
        )
    }
}

/// Map every coordinate of `object` from `from` to `to`.
///
/// Text additionally scales its font by the larger factor, floored at
/// [`MIN_FONT_SIZE`]. Line widths are left alone.
pub fn rescale(object: &mut Object, from: Rect, to: Rect) {
    rescale_with(object, &BoxMap::new(from, to));
}

fn rescale_with(object: &mut Object, map: &BoxMap) {
    match &mut object.kind {
        ObjectKind::Stroke(stroke) => {
            stroke.points.iter_mut().for_each(|p| *p = map.apply(*p));
        }
        ObjectKind::Shape(shape) => {
            shape.start = map.apply(shape.start);
            shape.end = map.apply(shape.end);
        }
        ObjectKind::Text(text) => {
            text.position = map.apply(text.position);
            text.font_size = (text.font_size * map.sx.abs().max(map.sy.abs())).max(MIN_FONT_SIZE);
        }
        ObjectKind::Image(image) => {
            image.position = map.apply(image.position);
            image.width *= map.sx;
            image.height *= map.sy;
        }
        ObjectKind::Group(group) => group
            .children
            .iter_mut()
            .for_each(|child| rescale_with(child, map)),
    }
}

/// Normalize an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{
        Group, ImageFormat, ImageObject, ImageSource, ObjectId, ShapeKind, Stroke, StrokeTool,
        TextBlock, VectorShape,
    };
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPS: f64 = 1e-9;

    fn rect_obj(id: u64, x0: f64, y0: f64, x1: f64, y1: f64) -> Object {
        Object::new(
            ObjectId(id),
            ObjectKind::Shape(VectorShape::new(
                ShapeKind::Rect,
                Point::new(x0, y0),
                Point::new(x1, y1),
            )),
        )
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    fn close_rect(a: Rect, b: Rect) -> bool {
        close(Point::new(a.x0, a.y0), Point::new(b.x0, b.y0))
            && close(Point::new(a.x1, a.y1), Point::new(b.x1, b.y1))
    }

    #[test]
    fn test_rotate_point_identity_and_quarter_turn() {
        let c = Point::new(10.0, 10.0);
        let p = Point::new(20.0, 10.0);
        assert_eq!(rotate_point(c, p, 0.0), p);
        assert!(close(rotate_point(c, p, FRAC_PI_2), Point::new(10.0, 20.0)));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((distance_to_segment(Point::new(5.0, 3.0), a, b) - 3.0).abs() < EPS);
        assert!((distance_to_segment(Point::new(-3.0, 4.0), a, b) - 5.0).abs() < EPS);
        // Degenerate segment
        assert!((distance_to_segment(Point::new(3.0, 4.0), a, a) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_local_bounds_per_kind() {
        let stroke = Object::new(
            ObjectId(1),
            ObjectKind::Stroke(
                Stroke::new(
                    vec![Point::new(10.0, 10.0), Point::new(30.0, 20.0)],
                    StrokeTool::Pencil,
                )
                .with_size(4.0),
            ),
        );
        assert_eq!(local_bounds(&stroke), Rect::new(8.0, 8.0, 32.0, 22.0));

        let shape = rect_obj(2, 50.0, 60.0, 10.0, 20.0);
        assert_eq!(local_bounds(&shape), Rect::new(10.0, 20.0, 50.0, 60.0));

        let text = Object::new(
            ObjectId(3),
            ObjectKind::Text(TextBlock::new(Point::new(0.0, 0.0), "ab\nc").with_font_size(10.0)),
        );
        let tb = local_bounds(&text);
        assert!((tb.width() - 12.0).abs() < EPS);
        assert!((tb.height() - 28.0).abs() < EPS);

        let group = Object::new(
            ObjectId(4),
            ObjectKind::Group(Group::new(vec![
                rect_obj(5, 0.0, 0.0, 10.0, 10.0),
                rect_obj(6, 20.0, 20.0, 30.0, 40.0),
            ])),
        );
        assert_eq!(local_bounds(&group), Rect::new(0.0, 0.0, 30.0, 40.0));
    }

    #[test]
    fn test_group_bounds_ignore_child_rotation() {
        let mut tall = rect_obj(5, 0.0, 0.0, 100.0, 20.0);
        tall.rotation = FRAC_PI_2;
        let group = Object::new(
            ObjectId(4),
            ObjectKind::Group(Group::new(vec![tall, rect_obj(6, 200.0, 0.0, 220.0, 20.0)])),
        );
        assert_eq!(local_bounds(&group), Rect::new(0.0, 0.0, 220.0, 20.0));
        assert_eq!(pivot(&group), Point::new(110.0, 10.0));
    }

    #[test]
    fn test_rotated_bounds_zero_rotation_equals_local() {
        let obj = rect_obj(1, 10.0, 10.0, 50.0, 30.0);
        assert_eq!(rotated_bounds(&obj), local_bounds(&obj));
    }

    #[test]
    fn test_rotated_bounds_square_45() {
        let mut obj = rect_obj(1, -10.0, -10.0, 10.0, 10.0);
        obj.rotation = FRAC_PI_4;
        let r = rotated_bounds(&obj);
        let half_diag = 10.0 * 2f64.sqrt();
        assert!(close_rect(r, Rect::new(-half_diag, -half_diag, half_diag, half_diag)));
    }

    #[test]
    fn test_rescale_round_trip() {
        let b0 = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b1 = Rect::new(20.0, 10.0, 320.0, 60.0);

        let stroke = Object::new(
            ObjectId(1),
            ObjectKind::Stroke(Stroke::new(
                vec![Point::new(10.0, 5.0), Point::new(60.0, 45.0), Point::new(90.0, 20.0)],
                StrokeTool::Brush,
            )),
        );
        let shape = rect_obj(2, 10.0, 10.0, 90.0, 40.0);
        let group = Object::new(
            ObjectId(3),
            ObjectKind::Group(Group::new(vec![stroke.clone(), shape.clone()])),
        );

        for original in [stroke, shape, group] {
            let mut obj = original.clone();
            rescale(&mut obj, b0, b1);
            assert_ne!(obj, original);
            rescale(&mut obj, b1, b0);
            assert!(close_rect(local_bounds(&obj), local_bounds(&original)));
        }
    }

    #[test]
    fn test_rescale_text_uniform_round_trip() {
        let original = Object::new(
            ObjectId(1),
            ObjectKind::Text(TextBlock::new(Point::new(10.0, 10.0), "hello").with_font_size(20.0)),
        );
        let b0 = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b1 = Rect::new(0.0, 0.0, 200.0, 200.0);

        let mut obj = original.clone();
        rescale(&mut obj, b0, b1);
        match &obj.kind {
            ObjectKind::Text(t) => {
                assert!((t.font_size - 40.0).abs() < EPS);
                assert!(close(t.position, Point::new(20.0, 20.0)));
            }
            _ => unreachable!(),
        }
        rescale(&mut obj, b1, b0);
        assert_eq!(obj, original);
    }

    #[test]
    fn test_rescale_text_font_floor() {
        let mut obj = Object::new(
            ObjectId(1),
            ObjectKind::Text(TextBlock::new(Point::ZERO, "x").with_font_size(10.0)),
        );
        rescale(
            &mut obj,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(0.0, 0.0, 10.0, 10.0),
        );
        assert_eq!(obj.size(), Some(MIN_FONT_SIZE));
    }

    #[test]
    fn test_rescale_image_box() {
        let source = ImageSource::new(ImageFormat::Png, &[], 100, 50);
        let mut obj = Object::new(
            ObjectId(1),
            ObjectKind::Image(ImageObject::new(Point::new(0.0, 0.0), source)),
        );
        rescale(
            &mut obj,
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(10.0, 10.0, 60.0, 110.0),
        );
        assert_eq!(local_bounds(&obj), Rect::new(10.0, 10.0, 60.0, 110.0));
    }

    #[test]
    fn test_rescale_degenerate_axis_stays_finite() {
        let mut line = Object::new(
            ObjectId(1),
            ObjectKind::Shape(VectorShape::new(
                ShapeKind::Line,
                Point::new(0.0, 5.0),
                Point::new(10.0, 5.0),
            )),
        );
        rescale(
            &mut line,
            Rect::new(0.0, 5.0, 10.0, 5.0),
            Rect::new(0.0, 5.0, 20.0, 5.0),
        );
        let b = local_bounds(&line);
        assert!(b.x1.is_finite() && b.y1.is_finite());
        assert_eq!(b, Rect::new(0.0, 5.0, 20.0, 5.0));
    }

    #[test]
    fn test_translate_group() {
        let mut group = Object::new(
            ObjectId(1),
            ObjectKind::Group(Group::new(vec![rect_obj(2, 0.0, 0.0, 10.0, 10.0)])),
        );
        translate(&mut group, Vec2::new(5.0, -5.0));
        assert_eq!(local_bounds(&group), Rect::new(5.0, -5.0, 15.0, 5.0));
    }

    #[test]
    fn test_normalize_angle() {
        use std::f64::consts::PI;
        assert!((normalize_angle(2.5 * PI) - FRAC_PI_2).abs() < EPS);
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < EPS);
    }
}
