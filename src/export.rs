//! Document and raster export.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};

use crate::color::blend_over;
use crate::editor::Editor;
use crate::error::ExportError;
use crate::image_ops::encode_data_uri;
use crate::types::RasterFormat;

const JPEG_QUALITY: u8 = 90;
/// Largest raster edge, in pixels.
const MAX_EXPORT_SIDE: f64 = 16_384.0;
/// Largest raster area; 256 MiB of RGBA.
const MAX_EXPORT_PIXELS: f64 = 8_192.0 * 8_192.0;

/// Encode `image` in `format`. JPEG has no alpha, so it is flattened onto white.
pub fn encode_raster(image: RgbaImage, format: RasterFormat) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    match format {
        RasterFormat::Png | RasterFormat::Svg => {
            DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        }
        RasterFormat::Jpeg => {
            let mut flat = RgbaImage::from_pixel(image.width(), image.height(), Rgba([255, 255, 255, 255]));
            for (dst, src) in flat.pixels_mut().zip(image.pixels()) {
                blend_over(dst, *src, 1.0);
            }
            let rgb = DynamicImage::ImageRgba8(flat).to_rgb8();
            DynamicImage::ImageRgb8(rgb)
                .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Jpeg(JPEG_QUALITY))?;
        }
    }
    Ok(bytes)
}

impl Editor {
    /// Serialized document with pending text edits folded in.
    pub fn document_json(&self) -> Result<String, serde_json::Error> {
        let mut doc = self.scene.to_document();
        doc.normalize_text();
        doc.to_json()
    }

    pub fn to_document_json(&self) -> Result<String, ExportError> {
        if self.is_disposed() {
            return Err(ExportError::Disposed);
        }
        Ok(self.document_json()?)
    }

    /// Render the workspace at 1:1 and return it as a data URI.
    ///
    /// The view is reset to identity for the capture and re-fitted afterwards,
    /// whether or not encoding succeeds.
    pub fn to_raster_data_uri(&mut self, format: RasterFormat) -> Result<String, ExportError> {
        if self.is_disposed() {
            return Err(ExportError::Disposed);
        }
        let bounds = self.scene.workspace_bounds().ok_or(ExportError::EmptyWorkspace)?;
        if bounds.width() < 1.0 || bounds.height() < 1.0 {
            return Err(ExportError::EmptyWorkspace);
        }
        let (width, height) = (bounds.width().ceil(), bounds.height().ceil());
        let fits = width <= MAX_EXPORT_SIDE && height <= MAX_EXPORT_SIDE && width * height <= MAX_EXPORT_PIXELS;
        if !fits {
            return Err(ExportError::TooLarge { width, height });
        }
        self.viewport.reset_identity();
        let pixels = self.scene.rasterize(bounds);
        let encoded = encode_raster(pixels, format);
        self.auto_zoom();
        let bytes = encoded?;
        log::debug!("exported {} bytes as {:?}", bytes.len(), format);
        Ok(encode_data_uri(format.mime(), &bytes))
    }
}
