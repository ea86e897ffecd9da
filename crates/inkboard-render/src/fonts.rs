//! Font registry and text outlining with ab_glyph.

use crate::error::{RenderError, RenderResult};
use ab_glyph::{Font, FontArc, OutlineCurve, PxScale, ScaleFont};
use inkboard_core::shapes::{FontFamily, TextBlock};
use kurbo::{BezPath, Point};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Fonts available to the painter, keyed by family.
///
/// The first face registered doubles as the fallback for families that
/// have no face of their own.
#[derive(Clone, Default)]
pub struct FontBook {
    faces: HashMap<FontFamily, FontArc>,
    fallback: Option<FontArc>,
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook")
            .field("families", &self.faces.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fallback.is_none()
    }

    /// Register a TrueType/OpenType face for `family`.
    pub fn insert(&mut self, family: FontFamily, data: Vec<u8>) -> RenderResult<()> {
        let font = FontArc::try_from_vec(data).map_err(|e| RenderError::Font(e.to_string()))?;
        if self.fallback.is_none() {
            self.fallback = Some(font.clone());
        }
        self.faces.insert(family, font);
        Ok(())
    }

    /// Read a font file and register it for `family`.
    pub fn load(&mut self, family: FontFamily, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        self.insert(family, data)?;
        log::info!("Loaded {} font from {}", family.name(), path.display());
        Ok(())
    }

    /// Face for `family`, or the fallback.
    pub fn face(&self, family: FontFamily) -> Option<&FontArc> {
        self.faces.get(&family).or(self.fallback.as_ref())
    }

    /// Glyph outlines of every line of `block`, positioned in canvas space.
    /// `None` when no face is available.
    pub fn text_path(&self, block: &TextBlock) -> Option<BezPath> {
        let font = self.face(block.font_family)?;
        let scaled = font.as_scaled(PxScale::from(block.font_size as f32));
        let hs = scaled.h_scale_factor() as f64;
        let vs = scaled.v_scale_factor() as f64;
        let ascent = scaled.ascent() as f64;
        let glyph_height = (scaled.ascent() - scaled.descent()) as f64;
        let line_height = block.line_height();

        let mut path = BezPath::new();
        for (i, line) in block.lines.iter().enumerate() {
            let top = block.position.y + i as f64 * line_height;
            let baseline = top + (line_height - glyph_height) / 2.0 + ascent;
            let mut x = block.position.x;
            let mut previous = None;
            for ch in line.chars() {
                let id = font.glyph_id(ch);
                if let Some(prev) = previous {
                    x += scaled.kern(prev, id) as f64;
                }
                if let Some(outline) = font.outline(id) {
                    append_outline(&mut path, &outline.curves, Point::new(x, baseline), hs, vs);
                }
                x += scaled.h_advance(id) as f64;
                previous = Some(id);
            }
        }
        Some(path)
    }

    /// Advance width of `line` at `font_size`, if a face is available.
    pub fn measure_line(&self, family: FontFamily, font_size: f64, line: &str) -> Option<f64> {
        let font = self.face(family)?;
        let scaled = font.as_scaled(PxScale::from(font_size as f32));
        let mut width = 0.0;
        let mut previous = None;
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id) as f64;
            }
            width += scaled.h_advance(id) as f64;
            previous = Some(id);
        }
        Some(width)
    }
}

/// Append unscaled, y-up glyph curves to `path` with the pen at `origin`.
fn append_outline(path: &mut BezPath, curves: &[OutlineCurve], origin: Point, hs: f64, vs: f64) {
    let map =
        |p: ab_glyph::Point| Point::new(origin.x + p.x as f64 * hs, origin.y - p.y as f64 * vs);
    let mut pen: Option<Point> = None;
    for curve in curves {
        let (start, end) = match curve {
            OutlineCurve::Line(a, b) => (*a, *b),
            OutlineCurve::Quad(a, _, b) => (*a, *b),
            OutlineCurve::Cubic(a, _, _, b) => (*a, *b),
        };
        let start = map(start);
        if pen != Some(start) {
            if pen.is_some() {
                path.close_path();
            }
            path.move_to(start);
        }
        match curve {
            OutlineCurve::Line(_, b) => path.line_to(map(*b)),
            OutlineCurve::Quad(_, c, b) => path.quad_to(map(*c), map(*b)),
            OutlineCurve::Cubic(_, c1, c2, b) => path.curve_to(map(*c1), map(*c2), map(*b)),
        }
        pen = Some(map(end));
    }
    if pen.is_some() {
        path.close_path();
    }
}
