//! Embedded raster images.

use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Encoded format of stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// Encoded pixel data plus its natural size.
///
/// Built by the host after a successful decode, so an image object never
/// exists without dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    pub format: ImageFormat,
    /// Encoded bytes as base64, so the JSON form stays self-contained.
    pub data_base64: String,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl ImageSource {
    pub fn new(format: ImageFormat, data: &[u8], natural_width: u32, natural_height: u32) -> Self {
        Self {
            format,
            data_base64: STANDARD.encode(data),
            natural_width,
            natural_height,
        }
    }

    /// Decoded bytes, or `None` if the base64 payload is corrupt.
    pub fn data(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }
}

/// An image placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageObject {
    /// Top-left corner.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Corner clipping, 0..=100 percent of the smaller half-dimension.
    #[serde(default)]
    pub corner_radius: f64,
    pub source: ImageSource,
}

impl ImageObject {
    /// Image at its natural size.
    pub fn new(position: Point, source: ImageSource) -> Self {
        Self {
            position,
            width: source.natural_width as f64,
            height: source.natural_height as f64,
            corner_radius: 0.0,
            source,
        }
    }

    /// Scale down to fit within the given box, preserving aspect ratio.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        if self.width <= max_width && self.height <= max_height {
            return self;
        }
        let aspect = self.width / self.height.max(f64::EPSILON);
        if aspect > max_width / max_height {
            self.width = max_width;
            self.height = max_width / aspect;
        } else {
            self.height = max_height;
            self.width = max_height * aspect;
        }
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    pub fn set_bounds(&mut self, rect: Rect) {
        self.position = rect.origin();
        self.width = rect.width();
        self.height = rect.height();
    }
}
