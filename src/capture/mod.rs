//! Capture sources and still-image encoding
//!
//! Host platforms provide the live sources; this module defines the seams
//! they plug into plus a PNG encoder and a synthetic source.

pub mod still;
pub mod synthetic;
pub mod traits;

pub use still::PngEncoder;
pub use synthetic::{SyntheticControl, SyntheticSource};
pub use traits::{
    CaptureError, CaptureResult, EncodedImage, FrameSource, Raster, Resolution, SourceInfo,
    SourceKind, StillEncoder,
};
