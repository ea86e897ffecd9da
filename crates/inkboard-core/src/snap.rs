//! Angle constraints and alignment guides.

use kurbo::{Point, Rect};

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    if increment <= 0.0 {
        return angle_degrees;
    }
    let snapped = (angle_degrees / increment).round() * increment;
    // Normalize to 0-360
    if snapped < 0.0 {
        snapped + 360.0
    } else if snapped >= 360.0 {
        snapped - 360.0
    } else {
        snapped
    }
}

/// Snap a rotation given in radians to a step given in radians.
pub fn snap_rotation(angle: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return angle;
    }
    (angle / step).round() * step
}

/// Snap a line endpoint to angle increments from a start point.
/// This snaps the angle while preserving the distance from start.
pub fn snap_line_endpoint(start: Point, end: Point, increment_degrees: f64) -> Point {
    let delta = end - start;
    let distance = delta.hypot();

    // Handle zero-length case
    if distance < 0.001 {
        return end;
    }

    let angle = delta.y.atan2(delta.x).to_degrees();
    let snapped = snap_angle(angle, increment_degrees).to_radians();
    Point::new(
        start.x + distance * snapped.cos(),
        start.y + distance * snapped.sin(),
    )
}

/// Constrain the box from `start` to `end` to a square, keeping the drag direction.
pub fn constrain_square(start: Point, end: Point) -> Point {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let side = dx.abs().max(dy.abs());
    Point::new(
        start.x + side.copysign(if dx == 0.0 { 1.0 } else { dx }),
        start.y + side.copysign(if dy == 0.0 { 1.0 } else { dy }),
    )
}

/// Axis a guide line runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAxis {
    /// A vertical line at a fixed x.
    Vertical,
    /// A horizontal line at a fixed y.
    Horizontal,
}

/// An alignment guide between the moving selection and another object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub axis: GuideAxis,
    /// The x (vertical) or y (horizontal) coordinate of the line.
    pub position: f64,
    /// Extent along the line, covering both boxes.
    pub from: f64,
    pub to: f64,
}

impl Guide {
    /// End points of the guide line.
    pub fn endpoints(&self) -> (Point, Point) {
        match self.axis {
            GuideAxis::Vertical => (
                Point::new(self.position, self.from),
                Point::new(self.position, self.to),
            ),
            GuideAxis::Horizontal => (
                Point::new(self.from, self.position),
                Point::new(self.to, self.position),
            ),
        }
    }
}

fn x_anchors(r: Rect) -> [f64; 3] {
    [r.x0, (r.x0 + r.x1) / 2.0, r.x1]
}

fn y_anchors(r: Rect) -> [f64; 3] {
    [r.y0, (r.y0 + r.y1) / 2.0, r.y1]
}

/// Guides between `moving` and every box in `others` whose min, center or
/// max lies within `threshold` of the moving box's matching anchors.
///
/// Purely visual: nothing is moved.
pub fn alignment_guides(moving: Rect, others: &[Rect], threshold: f64) -> Vec<Guide> {
    let mut guides = Vec::new();
    for other in others {
        for m in x_anchors(moving) {
            for o in x_anchors(*other) {
                if (m - o).abs() <= threshold {
                    guides.push(Guide {
                        axis: GuideAxis::Vertical,
                        position: o,
                        from: moving.y0.min(other.y0),
                        to: moving.y1.max(other.y1),
                    });
                }
            }
        }
        for m in y_anchors(moving) {
            for o in y_anchors(*other) {
                if (m - o).abs() <= threshold {
                    guides.push(Guide {
                        axis: GuideAxis::Horizontal,
                        position: o,
                        from: moving.x0.min(other.x0),
                        to: moving.x1.max(other.x1),
                    });
                }
            }
        }
    }
    guides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_angle() {
        // Test snapping to 15° increments
        assert!((snap_angle(0.0, 15.0) - 0.0).abs() < 0.01);
        assert!((snap_angle(7.0, 15.0) - 0.0).abs() < 0.01);
        assert!((snap_angle(8.0, 15.0) - 15.0).abs() < 0.01);
        assert!((snap_angle(23.0, 15.0) - 30.0).abs() < 0.01);
        assert!((snap_angle(359.0, 15.0) - 0.0).abs() < 0.01);
        assert!((snap_angle(-10.0, 15.0) - 345.0).abs() < 0.01);
    }

    #[test]
    fn test_snap_line_endpoint_horizontal() {
        let end = snap_line_endpoint(Point::new(0.0, 0.0), Point::new(100.0, 5.0), 15.0);
        assert!((end.y - 0.0).abs() < 1e-9);
        assert!((end.x - 100.0f64.hypot(5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_snap_line_preserves_distance() {
        let start = Point::new(10.0, 10.0);
        let end = snap_line_endpoint(start, Point::new(80.0, 75.0), 15.0);
        let original = (Point::new(80.0, 75.0) - start).hypot();
        assert!(((end - start).hypot() - original).abs() < 1e-9);
        // 45 degrees
        assert!(((end.x - start.x) - (end.y - start.y)).abs() < 1e-9);
    }

    #[test]
    fn test_snap_rotation() {
        let step = 15f64.to_radians();
        assert!((snap_rotation(20f64.to_radians(), step) - step).abs() < 1e-9);
        assert_eq!(snap_rotation(0.3, 0.0), 0.3);
    }

    #[test]
    fn test_constrain_square() {
        assert_eq!(
            constrain_square(Point::new(0.0, 0.0), Point::new(30.0, -10.0)),
            Point::new(30.0, -30.0)
        );
        assert_eq!(
            constrain_square(Point::new(10.0, 10.0), Point::new(5.0, 30.0)),
            Point::new(-10.0, 30.0)
        );
    }

    #[test]
    fn test_alignment_guides() {
        let moving = Rect::new(0.0, 100.0, 50.0, 150.0);
        let other = Rect::new(2.0, 0.0, 12.0, 40.0);
        let guides = alignment_guides(moving, &[other], 6.0);
        // Left edges within 2: one vertical guide at the other's x0.
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].axis, GuideAxis::Vertical);
        assert_eq!(guides[0].position, 2.0);
        assert_eq!((guides[0].from, guides[0].to), (0.0, 150.0));

        let far = Rect::new(500.0, 500.0, 600.0, 600.0);
        assert!(alignment_guides(moving, &[far], 6.0).is_empty());
    }

    #[test]
    fn test_guides_on_both_axes() {
        let moving = Rect::new(0.0, 0.0, 10.0, 10.0);
        let other = Rect::new(0.0, 0.0, 10.0, 10.0);
        let guides = alignment_guides(moving, &[other], 1.0);
        assert_eq!(guides.iter().filter(|g| g.axis == GuideAxis::Vertical).count(), 3);
        assert_eq!(guides.iter().filter(|g| g.axis == GuideAxis::Horizontal).count(), 3);
    }
}
