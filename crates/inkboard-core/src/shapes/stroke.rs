//! Freehand strokes.

use super::SerializableColor;
use crate::geometry::distance_to_segment;
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};

/// Which freehand tool produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    #[default]
    Pencil,
    Brush,
    /// Painted with a reduced opacity ceiling.
    Marker,
    /// Never persisted; removes hit objects when the gesture commits.
    Eraser,
}

impl StrokeTool {
    pub fn name(&self) -> &'static str {
        match self {
            StrokeTool::Pencil => "pencil",
            StrokeTool::Brush => "brush",
            StrokeTool::Marker => "marker",
            StrokeTool::Eraser => "eraser",
        }
    }
}

/// A freehand stroke (ordered sample points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Sample points in canvas coordinates.
    pub points: Vec<Point>,
    pub color: SerializableColor,
    /// Line width.
    pub size: f64,
    pub tool: StrokeTool,
}

impl Stroke {
    pub fn new(points: Vec<Point>, tool: StrokeTool) -> Self {
        Self {
            points,
            color: SerializableColor::black(),
            size: 2.0,
            tool,
        }
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn add_point(&mut self, point: Point) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    /// Smallest distance from `point` to the stroke's centerline.
    pub fn distance_to(&self, point: Point) -> f64 {
        match self.points.as_slice() {
            [] => f64::INFINITY,
            [only] => only.distance(point),
            pts => pts
                .windows(2)
                .map(|w| distance_to_segment(point, w[0], w[1]))
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// Polyline through the sample points.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };
        path.move_to(*first);
        if rest.is_empty() {
            // Zero-length segment so round caps still paint a dot.
            path.line_to(*first);
        }
        for p in rest {
            path.line_to(*p);
        }
        path
    }

    /// Drop points that deviate less than `tolerance` from the simplified line.
    pub fn simplify(&mut self, tolerance: f64) {
        if self.points.len() < 3 {
            return;
        }
        self.points = rdp_simplify(&self.points, tolerance);
    }
}

/// Ramer-Douglas-Peucker line simplification.
fn rdp_simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;
    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = distance_to_segment(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = rdp_simplify(&points[..=max_index], tolerance);
        let right = rdp_simplify(&points[max_index..], tolerance);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}
