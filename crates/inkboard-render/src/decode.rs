//! Decoding pasted and inserted images.

use crate::error::{RenderError, RenderResult};
use crate::surface::RasterImage;
use inkboard_core::shapes::{ImageFormat, ImageSource};
use std::path::Path;

/// Decode PNG, JPEG or WebP bytes to straight-alpha RGBA.
pub fn decode_image(bytes: &[u8]) -> RenderResult<RasterImage> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    RasterImage::new(width, height, decoded.into_raw())
        .ok_or_else(|| {
            RenderError::Surface(format!("Decoded image has no pixels ({width}x{height})"))
        })
}

/// Validate encoded bytes and wrap them as an [`ImageSource`] ready for
/// insertion. Nothing is created if the bytes don't decode.
pub fn image_source(bytes: &[u8]) -> RenderResult<ImageSource> {
    let raster = decode_image(bytes).inspect_err(|e| log::warn!("Image rejected: {e}"))?;
    let format = ImageFormat::from_magic_bytes(bytes)
        .ok_or_else(|| RenderError::Surface("Unrecognized image format".to_string()))?;
    Ok(ImageSource::new(format, bytes, raster.width, raster.height))
}

/// Read and validate an image file.
pub fn load_image(path: impl AsRef<Path>) -> RenderResult<ImageSource> {
    let bytes = std::fs::read(path.as_ref())?;
    image_source(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::encode_png;

    fn tiny_png() -> Vec<u8> {
        let image = RasterImage::new(3, 2, [10, 20, 30, 255].repeat(6)).unwrap();
        encode_png(&image).unwrap()
    }

    #[test]
    fn test_decode_png() {
        let raster = decode_image(&tiny_png()).unwrap();
        assert_eq!((raster.width, raster.height), (3, 2));
        assert_eq!(raster.pixel(2, 1), Some([10, 20, 30, 255]));
    }

    #[test]
    fn test_image_source_from_png() {
        let bytes = tiny_png();
        let source = image_source(&bytes).unwrap();
        assert_eq!(source.format, ImageFormat::Png);
        assert_eq!((source.natural_width, source.natural_height), (3, 2));
        assert_eq!(source.data(), Some(bytes));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(decode_image(b"not an image"), Err(RenderError::Decode(_))));
        assert!(image_source(b"\x89PNG\r\n\x1a\nbroken").is_err());
    }
}
