//! Capture trait definitions
//!
//! Platform-agnostic traits for capture sources and still-image encoders.
//! Acquiring a real camera or screen is left to the host; it plugs in by
//! implementing [`FrameSource`].

use crate::recorder::events::SourceEndedNotifier;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Invalid raster: expected {expected} bytes for {width}x{height} RGBA, got {actual}")]
    InvalidRaster {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Kind of live signal a source produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Screen,
    Camera,
}

/// Information about a capture source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    /// Unique source ID
    pub id: String,

    /// Display name
    pub name: String,

    pub kind: SourceKind,
}

impl SourceInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

/// Video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Integer-divide both sides, never going below one pixel
    pub fn downscaled(&self, divisor: u32) -> Self {
        let divisor = divisor.max(1);
        Self {
            width: (self.width / divisor).max(1),
            height: (self.height / divisor).max(1),
        }
    }
}

/// An uncompressed RGBA8 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> CaptureResult<Self> {
        let raster = Self {
            width,
            height,
            data,
        };
        raster.validate()?;
        Ok(raster)
    }

    /// Fields are public, so hosts can build rasters whose buffer does not
    /// match the declared size
    pub fn validate(&self) -> CaptureResult<()> {
        let expected = (self.width as usize) * (self.height as usize) * 4;
        if self.width == 0 || self.height == 0 || self.data.len() != expected {
            return Err(CaptureError::InvalidRaster {
                width: self.width,
                height: self.height,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// A raster filled with a single RGBA colour
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Draw this raster into a new one of the target size using
    /// nearest-neighbour sampling
    pub fn resized(&self, target: Resolution) -> CaptureResult<Raster> {
        self.validate()?;
        if target == self.resolution() {
            return Ok(self.clone());
        }

        let width = target.width.max(1);
        let height = target.height.max(1);
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);

        for dy in 0..height {
            let src_y = ((dy as u64 * self.height as u64) / height as u64) as u32;
            let src_y = src_y.min(self.height - 1);
            for dx in 0..width {
                let src_x = ((dx as u64 * self.width as u64) / width as u64) as u32;
                let src_x = src_x.min(self.width - 1);
                let idx = ((src_y * self.width + src_x) * 4) as usize;
                data.extend_from_slice(&self.data[idx..idx + 4]);
            }
        }

        Ok(Raster {
            width,
            height,
            data,
        })
    }
}

/// An encoded still image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    /// Transport encoding used for frames held in memory
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64_STANDARD.encode(&self.bytes))
    }
}

/// A live video signal the capture timer samples from.
///
/// Sources do not push frames; the timer polls [`FrameSource::is_ready`] and
/// pulls the current raster when one is available.
pub trait FrameSource: Send + 'static {
    /// Describe this source for logs and session metadata
    fn info(&self) -> SourceInfo;

    /// Whether enough data is buffered to grab a frame right now
    fn is_ready(&self) -> bool;

    /// Current native frame dimensions, if known
    fn dimensions(&self) -> Option<Resolution>;

    /// Grab the current frame
    fn current_frame(&mut self) -> Option<Raster>;

    /// Register the notifier to fire when the source ends on its own
    /// (permission revoked, shared window closed)
    fn on_ended(&mut self, notifier: SourceEndedNotifier);

    /// Release the underlying device. Called once when a session ends.
    fn release(&mut self) {}
}

/// Still-image encoder (raster to binary)
pub trait StillEncoder: Send + Sync {
    fn encode(&self, raster: &Raster) -> CaptureResult<EncodedImage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_rejects_bad_length() {
        let err = Raster::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidRaster { expected: 16, actual: 15, .. }));
        assert!(Raster::new(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_resized_nearest_neighbour() {
        // 2x2 with one distinct colour per quadrant
        let data = [
            [255, 0, 0, 255],
            [0, 255, 0, 255],
            [0, 0, 255, 255],
            [255, 255, 255, 255],
        ]
        .concat();
        let raster = Raster::new(2, 2, data).unwrap();

        let up = raster.resized(Resolution::new(4, 4)).unwrap();
        assert_eq!(up.data.len(), 4 * 4 * 4);
        assert_eq!(&up.data[0..4], &[255, 0, 0, 255]);
        // bottom-right pixel samples the bottom-right quadrant
        assert_eq!(&up.data[up.data.len() - 4..], &[255, 255, 255, 255]);

        let down = raster.resized(Resolution::new(1, 1)).unwrap();
        assert_eq!(down.data, vec![255, 0, 0, 255]);
    }

    #[test]
    fn test_resized_rejects_mismatched_buffer() {
        let short = Raster {
            width: 8,
            height: 8,
            data: vec![0; 10],
        };
        assert!(matches!(
            short.resized(Resolution::new(4, 4)),
            Err(CaptureError::InvalidRaster { expected: 256, actual: 10, .. })
        ));

        let empty = Raster {
            width: 0,
            height: 0,
            data: Vec::new(),
        };
        assert!(empty.resized(Resolution::new(2, 2)).is_err());
    }

    #[test]
    fn test_downscaled_never_zero() {
        assert_eq!(Resolution::new(1920, 1080).downscaled(2), Resolution::new(960, 540));
        assert_eq!(Resolution::new(1, 1).downscaled(2), Resolution::new(1, 1));
        assert_eq!(Resolution::new(10, 10).downscaled(0), Resolution::new(10, 10));
    }

    #[test]
    fn test_data_url() {
        let image = EncodedImage {
            mime: "image/png",
            bytes: vec![1, 2, 3],
        };
        assert_eq!(image.to_data_url(), "data:image/png;base64,AQID");
    }
}
