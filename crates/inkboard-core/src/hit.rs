//! Point and rectangle hit testing, rotation aware.

use crate::geometry::{distance_to_segment, local_bounds, pivot, rotate_point, rotated_bounds};
use crate::scene::Scene;
use crate::shapes::{Object, ObjectKind, ShapeKind};
use kurbo::{Point, Rect};

/// Whether `point` (canvas space) touches `object`.
///
/// The point is first brought into the object's un-rotated space. Concave
/// shapes use their bounding box rather than the exact outline.
pub fn hit_test(object: &Object, point: Point, pad: f64) -> bool {
    let local = rotate_point(pivot(object), point, -object.rotation);
    match &object.kind {
        ObjectKind::Stroke(stroke) => stroke.distance_to(local) <= stroke.size / 2.0 + pad,
        ObjectKind::Shape(shape) => match shape.kind {
            ShapeKind::Line | ShapeKind::Arrow => {
                distance_to_segment(local, shape.start, shape.end) <= shape.size + pad
            }
            ShapeKind::Rect if !shape.fill => {
                let b = shape.bounds();
                let corners = [
                    Point::new(b.x0, b.y0),
                    Point::new(b.x1, b.y0),
                    Point::new(b.x1, b.y1),
                    Point::new(b.x0, b.y1),
                ];
                (0..4).any(|i| {
                    distance_to_segment(local, corners[i], corners[(i + 1) % 4]) <= shape.size + pad
                })
            }
            _ => contains_inclusive(shape.bounds(), local),
        },
        ObjectKind::Text(_) | ObjectKind::Image(_) => {
            contains_inclusive(local_bounds(object), local)
        }
        ObjectKind::Group(group) => group.children.iter().any(|c| hit_test(c, local, pad)),
    }
}

fn contains_inclusive(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// The topmost object under `point`, if any.
pub fn find_topmost(scene: &Scene, point: Point, pad: f64) -> Option<&Object> {
    scene.ordered().rev().find(|o| hit_test(o, point, pad))
}

/// Marquee test: the object's on-screen box overlaps `rect`.
pub fn rect_intersects(object: &Object, rect: Rect) -> bool {
    let b = rotated_bounds(object);
    b.x0 <= rect.x1 && b.x1 >= rect.x0 && b.y0 <= rect.y1 && b.y1 >= rect.y0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Group, ObjectId, Stroke, StrokeTool, TextBlock, VectorShape};
    use std::f64::consts::FRAC_PI_2;

    fn shape(id: u64, kind: ShapeKind, a: (f64, f64), b: (f64, f64), fill: bool) -> Object {
        Object::new(
            ObjectId(id),
            ObjectKind::Shape(
                VectorShape::new(kind, Point::new(a.0, a.1), Point::new(b.0, b.1)).with_fill(fill),
            ),
        )
    }

    #[test]
    fn test_filled_rect_containment() {
        let rect = shape(1, ShapeKind::Rect, (10.0, 10.0), (50.0, 50.0), true);
        assert!(hit_test(&rect, Point::new(30.0, 30.0), 0.0));
        assert!(!hit_test(&rect, Point::new(200.0, 200.0), 0.0));
    }

    #[test]
    fn test_outline_rect_hits_edges_only() {
        let rect = shape(1, ShapeKind::Rect, (10.0, 10.0), (50.0, 50.0), false);
        assert!(!hit_test(&rect, Point::new(30.0, 30.0), 4.0));
        assert!(hit_test(&rect, Point::new(11.0, 30.0), 0.0));
        assert!(hit_test(&rect, Point::new(30.0, 55.0), 4.0));
    }

    #[test]
    fn test_star_uses_bounding_box() {
        let star = shape(1, ShapeKind::Star, (0.0, 0.0), (100.0, 100.0), false);
        // Corner of the box lies outside the star outline but inside the box.
        assert!(hit_test(&star, Point::new(2.0, 98.0), 0.0));
    }

    #[test]
    fn test_line_distance() {
        let line = shape(1, ShapeKind::Line, (0.0, 0.0), (100.0, 0.0), false);
        assert!(hit_test(&line, Point::new(50.0, 5.0), 4.0));
        assert!(!hit_test(&line, Point::new(50.0, 7.0), 4.0));
    }

    #[test]
    fn test_stroke_distance() {
        let stroke = Object::new(
            ObjectId(1),
            ObjectKind::Stroke(
                Stroke::new(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)], StrokeTool::Pencil)
                    .with_size(4.0),
            ),
        );
        assert!(hit_test(&stroke, Point::new(50.0, 2.0), 0.0));
        assert!(!hit_test(&stroke, Point::new(50.0, 3.0), 0.0));
    }

    #[test]
    fn test_rotated_hit() {
        // A 100x10 bar rotated a quarter turn becomes a 10x100 bar.
        let mut bar = shape(1, ShapeKind::Rect, (0.0, 45.0), (100.0, 55.0), true);
        bar.rotation = FRAC_PI_2;
        assert!(hit_test(&bar, Point::new(50.0, 5.0), 0.0));
        assert!(!hit_test(&bar, Point::new(5.0, 50.0), 0.0));
    }

    #[test]
    fn test_group_hits_children() {
        let group = Object::new(
            ObjectId(3),
            ObjectKind::Group(Group::new(vec![
                shape(1, ShapeKind::Circle, (0.0, 0.0), (10.0, 10.0), true),
                shape(2, ShapeKind::Circle, (90.0, 90.0), (100.0, 100.0), true),
            ])),
        );
        assert!(hit_test(&group, Point::new(95.0, 95.0), 0.0));
        assert!(!hit_test(&group, Point::new(50.0, 50.0), 0.0));
    }

    #[test]
    fn test_text_bbox() {
        let text = Object::new(
            ObjectId(1),
            ObjectKind::Text(TextBlock::new(Point::new(0.0, 0.0), "hello").with_font_size(10.0)),
        );
        assert!(hit_test(&text, Point::new(20.0, 7.0), 0.0));
        assert!(!hit_test(&text, Point::new(40.0, 7.0), 0.0));
    }

    #[test]
    fn test_find_topmost_prefers_last() {
        let scene = Scene::from_objects(vec![
            shape(1, ShapeKind::Rect, (0.0, 0.0), (50.0, 50.0), true),
            shape(2, ShapeKind::Rect, (25.0, 25.0), (75.0, 75.0), true),
        ]);
        let topmost = |p| find_topmost(&scene, p, 0.0).map(Object::id);
        assert_eq!(topmost(Point::new(30.0, 30.0)), Some(ObjectId(2)));
        assert_eq!(topmost(Point::new(10.0, 10.0)), Some(ObjectId(1)));
        assert!(find_topmost(&scene, Point::new(90.0, 90.0), 0.0).is_none());
    }

    #[test]
    fn test_rect_intersects_marquee() {
        let objs = [
            shape(1, ShapeKind::Rect, (0.0, 0.0), (10.0, 10.0), true),
            shape(2, ShapeKind::Rect, (20.0, 0.0), (30.0, 10.0), true),
            shape(3, ShapeKind::Rect, (40.0, 0.0), (50.0, 10.0), true),
        ];
        let marquee = Rect::new(15.0, -5.0, 35.0, 15.0);
        let hits: Vec<u64> = objs
            .iter()
            .filter(|o| rect_intersects(o, marquee))
            .map(|o| o.id().0)
            .collect();
        assert_eq!(hits, vec![2]);
    }
}
