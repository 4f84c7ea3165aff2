//! PNG still-image encoding

use super::traits::{CaptureError, CaptureResult, EncodedImage, Raster, StillEncoder};

pub const PNG_MIME: &str = "image/png";

/// Encodes RGBA rasters as 8-bit PNG
#[derive(Debug, Default, Clone, Copy)]
pub struct PngEncoder;

impl StillEncoder for PngEncoder {
    fn encode(&self, raster: &Raster) -> CaptureResult<EncodedImage> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, raster.width, raster.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let mut writer = encoder
                .write_header()
                .map_err(|e| CaptureError::Encoding(format!("PNG header error: {}", e)))?;
            writer
                .write_image_data(&raster.data)
                .map_err(|e| CaptureError::Encoding(format!("PNG data error: {}", e)))?;
            writer
                .finish()
                .map_err(|e| CaptureError::Encoding(format!("PNG finish error: {}", e)))?;
        }

        Ok(EncodedImage {
            mime: PNG_MIME,
            bytes,
        })
    }
}
