//! Path construction for every [`ShapeKind`].
//!
//! Paths are built in canvas coordinates from the shape's normalized box.
//! Rotation is applied by the caller.

use super::{ShapeKind, VectorShape};
use kurbo::{Arc, BezPath, Ellipse, Point, Rect, RoundedRect, Shape as KurboShape, Vec2};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Flattening tolerance for conic primitives.
const PATH_TOLERANCE: f64 = 0.1;

/// A built outline plus how its interior should be filled.
#[derive(Debug, Clone)]
pub struct ShapeOutline {
    pub path: BezPath,
    /// Fill with the even-odd rule (shapes with holes).
    pub even_odd: bool,
}

impl ShapeOutline {
    fn nonzero(path: BezPath) -> Self {
        Self { path, even_odd: false }
    }
}

/// Corner arc radius for a box: a fraction of the smaller half-dimension.
pub fn corner_arc_radius(bounds: Rect, corner_radius: f64) -> f64 {
    bounds.width().min(bounds.height()) / 2.0 * (corner_radius.clamp(0.0, 100.0) / 100.0)
}

/// Inner:outer radius ratio for stars, tuned so few points stay chunky.
pub fn star_inner_ratio(points: u32) -> f64 {
    match points {
        0..=3 => 0.5,
        4 => 0.45,
        5 => 0.4,
        6 => 0.45,
        _ => 0.5,
    }
}

/// Inner:outer radius ratio for starbursts.
pub fn starburst_inner_ratio(points: u32) -> f64 {
    match points {
        0..=4 => 0.55,
        5..=8 => 0.65,
        _ => 0.75,
    }
}

/// Build the outline of a parametric shape.
pub fn shape_outline(shape: &VectorShape) -> ShapeOutline {
    let b = shape.bounds();
    let r = corner_arc_radius(b, shape.corner_radius);
    let (x0, y0, x1, y1) = (b.x0, b.y0, b.x1, b.y1);
    let (w, h) = (b.width(), b.height());
    let c = b.center();
    let p = Point::new;

    let path = match shape.kind {
        ShapeKind::Line => {
            let mut path = BezPath::new();
            path.move_to(shape.start);
            path.line_to(shape.end);
            path
        }
        ShapeKind::Arrow => arrow_path(shape.start, shape.end, shape.size),
        ShapeKind::Rect => RoundedRect::from_rect(b, r).to_path(PATH_TOLERANCE),
        ShapeKind::Circle => Ellipse::from_rect(b).to_path(PATH_TOLERANCE),
        ShapeKind::Pill => RoundedRect::from_rect(b, w.min(h) / 2.0).to_path(PATH_TOLERANCE),
        ShapeKind::Polygon => rounded_polygon(&ring(b, shape.sides.max(3), |_| 1.0), r),
        ShapeKind::Triangle => rounded_polygon(&[p(c.x, y0), p(x1, y1), p(x0, y1)], r),
        ShapeKind::Hexagon => {
            let q = w / 4.0;
            rounded_polygon(
                &[
                    p(x0 + q, y0),
                    p(x1 - q, y0),
                    p(x1, c.y),
                    p(x1 - q, y1),
                    p(x0 + q, y1),
                    p(x0, c.y),
                ],
                r,
            )
        }
        ShapeKind::Diamond => {
            rounded_polygon(&[p(c.x, y0), p(x1, c.y), p(c.x, y1), p(x0, c.y)], r)
        }
        ShapeKind::Parallelogram => {
            let s = w * 0.25;
            rounded_polygon(&[p(x0 + s, y0), p(x1, y0), p(x1 - s, y1), p(x0, y1)], r)
        }
        ShapeKind::Trapezoid => {
            let s = w * 0.25;
            rounded_polygon(&[p(x0 + s, y0), p(x1 - s, y0), p(x1, y1), p(x0, y1)], r)
        }
        ShapeKind::TrapDown => {
            let s = w * 0.25;
            rounded_polygon(&[p(x0, y0), p(x1, y0), p(x1 - s, y1), p(x0 + s, y1)], r)
        }
        ShapeKind::Cross => {
            let (tx, ty) = (w / 3.0, h / 3.0);
            let (ax, bx) = (x0 + tx, x1 - tx);
            let (ay, by) = (y0 + ty, y1 - ty);
            rounded_polygon(
                &[
                    p(ax, y0),
                    p(bx, y0),
                    p(bx, ay),
                    p(x1, ay),
                    p(x1, by),
                    p(bx, by),
                    p(bx, y1),
                    p(ax, y1),
                    p(ax, by),
                    p(x0, by),
                    p(x0, ay),
                    p(ax, ay),
                ],
                r,
            )
        }
        ShapeKind::Frame => {
            let inset = w.min(h) * 0.2;
            let inner = Rect::new(x0 + inset, y0 + inset, x1 - inset, y1 - inset);
            let inner_r = corner_arc_radius(inner, shape.corner_radius);
            let mut path = RoundedRect::from_rect(b, r).to_path(PATH_TOLERANCE);
            path.extend(RoundedRect::from_rect(inner, inner_r).path_elements(PATH_TOLERANCE));
            return ShapeOutline {
                path,
                even_odd: true,
            };
        }
        ShapeKind::Heart => heart_path(b),
        ShapeKind::Cloud => cloud_path(b),
        ShapeKind::SpeechBubble => {
            let by = y0 + h * 0.75;
            rounded_polygon(
                &[
                    p(x0, y0),
                    p(x1, y0),
                    p(x1, by),
                    p(x0 + w * 0.4, by),
                    p(x0 + w * 0.15, y1),
                    p(x0 + w * 0.2, by),
                    p(x0, by),
                ],
                r,
            )
        }
        ShapeKind::SpeechOval => speech_oval_path(b),
        ShapeKind::Bookmark => rounded_polygon(
            &[p(x0, y0), p(x1, y0), p(x1, y1), p(c.x, y1 - h * 0.25), p(x0, y1)],
            r,
        ),
        ShapeKind::Ribbon => {
            let n = w * 0.15;
            rounded_polygon(
                &[
                    p(x0, y0),
                    p(x1, y0),
                    p(x1 - n, c.y),
                    p(x1, y1),
                    p(x0, y1),
                    p(x0 + n, c.y),
                ],
                r,
            )
        }
        ShapeKind::Arch => arch_path(b),
        ShapeKind::Stadium => {
            let k = w * 0.15;
            let mut path = BezPath::new();
            path.move_to(p(x0 + k, y0));
            path.line_to(p(x1 - k, y0));
            path.quad_to(p(x1 + k, c.y), p(x1 - k, y1));
            path.line_to(p(x0 + k, y1));
            path.quad_to(p(x0 - k, c.y), p(x0 + k, y0));
            path.close_path();
            path
        }
        ShapeKind::Star => {
            let ratio = star_inner_ratio(shape.sides);
            rounded_polygon(&star_ring(b, shape.sides.max(3), ratio), r)
        }
        ShapeKind::Starburst => {
            let ratio = starburst_inner_ratio(shape.sides);
            rounded_polygon(&star_ring(b, shape.sides.max(4), ratio), r)
        }
    };
    ShapeOutline::nonzero(path)
}

/// `n` points on the ellipse inscribed in `b`, first one at the top.
fn ring(b: Rect, n: u32, radius: impl Fn(u32) -> f64) -> Vec<Point> {
    let c = b.center();
    let (rx, ry) = (b.width() / 2.0, b.height() / 2.0);
    (0..n)
        .map(|i| {
            let a = -FRAC_PI_2 + TAU * i as f64 / n as f64;
            let k = radius(i);
            Point::new(c.x + rx * k * a.cos(), c.y + ry * k * a.sin())
        })
        .collect()
}

/// Alternating outer/inner ring with `points` outer vertices.
fn star_ring(b: Rect, points: u32, inner_ratio: f64) -> Vec<Point> {
    ring(b, points * 2, |i| if i % 2 == 0 { 1.0 } else { inner_ratio })
}

/// Closed polygon whose corners are cut by quadratic arcs of `radius`.
pub fn rounded_polygon(points: &[Point], radius: f64) -> BezPath {
    let mut path = BezPath::new();
    let n = points.len();
    if n < 3 {
        return path;
    }
    if radius <= 0.0 {
        path.move_to(points[0]);
        for pt in &points[1..] {
            path.line_to(*pt);
        }
        path.close_path();
        return path;
    }

    let start = points[0].midpoint(points[1]);
    path.move_to(start);
    for i in 1..=n {
        let v = points[i % n];
        let prev = points[i - 1];
        let next = points[(i + 1) % n];
        let to_prev = prev - v;
        let to_next = next - v;
        let r = radius
            .min(to_prev.hypot() / 2.0)
            .min(to_next.hypot() / 2.0);
        if r <= f64::EPSILON {
            path.line_to(v);
            continue;
        }
        let a = v + unit(to_prev) * r;
        let b = v + unit(to_next) * r;
        path.line_to(a);
        path.quad_to(v, b);
    }
    path.close_path();
    path
}

fn unit(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len < f64::EPSILON { Vec2::ZERO } else { v / len }
}

/// Shaft plus an open two-wing head at `end`.
fn arrow_path(start: Point, end: Point, size: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(start);
    path.line_to(end);

    let shaft = end - start;
    let len = shaft.hypot();
    if len < f64::EPSILON {
        return path;
    }
    let head = (size * 4.0).max(12.0).min(len * 0.5);
    let dir = shaft / len;
    let angle = PI / 6.0;
    let wing = |a: f64| {
        let (s, c) = a.sin_cos();
        let back = Vec2::new(-dir.x * c + dir.y * s, -dir.x * s - dir.y * c);
        end + back * head
    };
    path.move_to(wing(angle));
    path.line_to(end);
    path.line_to(wing(-angle));
    path
}

fn heart_path(b: Rect) -> BezPath {
    let m = |u: f64, v: f64| Point::new(b.x0 + u * b.width(), b.y0 + v * b.height());
    let mut path = BezPath::new();
    path.move_to(m(0.5, 0.25));
    path.curve_to(m(0.5, 0.05), m(0.0, 0.0), m(0.0, 0.35));
    path.curve_to(m(0.0, 0.65), m(0.35, 0.8), m(0.5, 1.0));
    path.curve_to(m(0.65, 0.8), m(1.0, 0.65), m(1.0, 0.35));
    path.curve_to(m(1.0, 0.0), m(0.5, 0.05), m(0.5, 0.25));
    path.close_path();
    path
}

/// Scalloped ellipse: eight outward bulges around a shrunken base ring.
fn cloud_path(b: Rect) -> BezPath {
    const BUMPS: u32 = 8;
    const BASE: f64 = 0.8;
    const PEAK: f64 = 1.25;
    let c = b.center();
    let (rx, ry) = (b.width() / 2.0, b.height() / 2.0);
    let at = |a: f64, k: f64| Point::new(c.x + rx * k * a.cos(), c.y + ry * k * a.sin());

    let step = TAU / BUMPS as f64;
    let mut path = BezPath::new();
    path.move_to(at(0.0, BASE));
    for i in 0..BUMPS {
        let a0 = step * i as f64;
        path.quad_to(at(a0 + step / 2.0, PEAK), at(a0 + step, BASE));
    }
    path.close_path();
    path
}

/// Ellipse in the upper 80% of the box with a tail toward the lower left.
fn speech_oval_path(b: Rect) -> BezPath {
    let c = Point::new(b.center().x, b.y0 + b.height() * 0.4);
    let radii = Vec2::new(b.width() / 2.0, b.height() * 0.4);
    let on = |a: f64| Point::new(c.x + radii.x * a.cos(), c.y + radii.y * a.sin());
    let (ta, tb) = (100f64.to_radians(), 125f64.to_radians());

    let mut path = BezPath::new();
    path.move_to(on(ta));
    path.line_to(Point::new(b.x0 + b.width() * 0.15, b.y1));
    path.line_to(on(tb));
    let arc = Arc {
        center: c,
        radii,
        start_angle: tb,
        sweep_angle: TAU - (tb - ta),
        x_rotation: 0.0,
    };
    path.extend(arc.append_iter(PATH_TOLERANCE));
    path.close_path();
    path
}

/// Doorway: straight sides with a half-ellipse on top.
fn arch_path(b: Rect) -> BezPath {
    let rx = b.width() / 2.0;
    let ry = rx.min(b.height());
    let c = Point::new(b.center().x, b.y0 + ry);
    let mut path = BezPath::new();
    path.move_to(Point::new(b.x0, b.y1));
    path.line_to(Point::new(b.x0, c.y));
    let arc = Arc {
        center: c,
        radii: Vec2::new(rx, ry),
        start_angle: PI,
        sweep_angle: PI,
        x_rotation: 0.0,
    };
    path.extend(arc.append_iter(PATH_TOLERANCE));
    path.line_to(Point::new(b.x1, b.y1));
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(kind: ShapeKind) -> VectorShape {
        VectorShape::new(kind, Point::new(10.0, 20.0), Point::new(110.0, 80.0))
    }

    #[test]
    fn test_every_kind_builds_a_path() {
        for kind in ShapeKind::ALL {
            let outline = shape_outline(&shape(kind));
            assert!(!outline.path.elements().is_empty(), "{kind:?} produced no path");
        }
    }

    #[test]
    fn test_closed_shapes_stay_inside_box() {
        for kind in ShapeKind::ALL.into_iter().filter(|k| !k.is_linear()) {
            for corner_radius in [0.0, 50.0, 100.0] {
                let mut s = shape(kind);
                s.corner_radius = corner_radius;
                let bb = shape_outline(&s).path.bounding_box();
                let limit = s.bounds().inflate(1.0, 1.0);
                assert!(
                    limit.contains(Point::new(bb.x0, bb.y0))
                        && limit.contains(Point::new(bb.x1, bb.y1)),
                    "{kind:?} r={corner_radius} escaped its box: {bb:?}"
                );
            }
        }
    }

    #[test]
    fn test_frame_uses_even_odd() {
        assert!(shape_outline(&shape(ShapeKind::Frame)).even_odd);
        assert!(!shape_outline(&shape(ShapeKind::Rect)).even_odd);
    }

    #[test]
    fn test_corner_radius_fraction() {
        let b = Rect::new(0.0, 0.0, 100.0, 40.0);
        assert_eq!(corner_arc_radius(b, 0.0), 0.0);
        assert_eq!(corner_arc_radius(b, 50.0), 10.0);
        assert_eq!(corner_arc_radius(b, 100.0), 20.0);
        assert_eq!(corner_arc_radius(b, 250.0), 20.0);
    }

    #[test]
    fn test_star_ring_alternates() {
        let b = Rect::new(-10.0, -10.0, 10.0, 10.0);
        let pts = star_ring(b, 5, star_inner_ratio(5));
        assert_eq!(pts.len(), 10);
        let outer = pts[0].to_vec2().hypot();
        let inner = pts[1].to_vec2().hypot();
        assert!((outer - 10.0).abs() < 1e-9);
        assert!((inner - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_point_stars_are_not_needles() {
        assert!(star_inner_ratio(3) > star_inner_ratio(5));
        assert!(starburst_inner_ratio(4) >= 0.5);
    }

    #[test]
    fn test_rounded_polygon_sharp_when_radius_zero() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let path = rounded_polygon(&pts, 0.0);
        // move + 2 lines + close
        assert_eq!(path.elements().len(), 4);
    }
}
