//! Captured still frames
//!
//! The store is append-only while a session runs and is only emptied by an
//! explicit [`FrameStore::clear`].

use crate::capture::{CaptureResult, FrameSource, PngEncoder, Resolution, StillEncoder};
use crate::export::ExportError;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Frame store shared between the capture dispatcher and the command surface
pub type SharedFrameStore = Arc<Mutex<FrameStore>>;

/// One still image sampled from a capture source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub timestamp: DateTime<Utc>,
    /// `data:<mime>;base64,<payload>`
    pub image_data: String,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn iso_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Strip the data-URL prefix and decode the payload into raw image bytes
    pub fn image_bytes(&self) -> Result<Vec<u8>, ExportError> {
        Self::decode_data_url(&self.image_data)
    }

    pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, ExportError> {
        let payload = match data_url.split_once(";base64,") {
            Some((prefix, payload)) if prefix.starts_with("data:") => payload,
            _ => {
                return Err(ExportError::Decoding(
                    "image is not a base64 data URL".to_string(),
                ))
            }
        };

        BASE64_STANDARD
            .decode(payload)
            .map_err(|e| ExportError::Decoding(format!("Invalid base64 frame payload: {}", e)))
    }
}

pub struct FrameStore {
    frames: Vec<Frame>,
    encoder: Box<dyn StillEncoder>,
}

impl FrameStore {
    pub fn new(encoder: Box<dyn StillEncoder>) -> Self {
        Self {
            frames: Vec::new(),
            encoder,
        }
    }

    pub fn shared(encoder: Box<dyn StillEncoder>) -> SharedFrameStore {
        Arc::new(Mutex::new(Self::new(encoder)))
    }

    /// Sample the source's current frame into a `target`-sized still.
    ///
    /// Returns `Ok(None)` without touching the store when the source has no
    /// frame ready.
    pub fn capture(
        &mut self,
        source: &mut dyn FrameSource,
        target: Resolution,
        at: DateTime<Utc>,
    ) -> CaptureResult<Option<&Frame>> {
        if !source.is_ready() {
            return Ok(None);
        }
        let Some(raster) = source.current_frame() else {
            return Ok(None);
        };

        let scaled = raster.resized(target)?;
        let image = self.encoder.encode(&scaled)?;

        self.frames.push(Frame {
            timestamp: at,
            image_data: image.to_data_url(),
            width: scaled.width,
            height: scaled.height,
        });

        Ok(self.frames.last())
    }

    pub fn count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn clear(&mut self) {
        tracing::debug!("Clearing {} captured frames", self.frames.len());
        self.frames.clear();
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new(Box::new(PngEncoder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SyntheticSource;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_790_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_capture_appends_scaled_frame() {
        let mut store = FrameStore::default();
        let mut source = SyntheticSource::new(64, 32);

        let frame = store
            .capture(&mut source, Resolution::new(32, 16), at(0))
            .unwrap()
            .cloned()
            .unwrap();

        assert_eq!((frame.width, frame.height), (32, 16));
        assert!(frame.image_data.starts_with("data:image/png;base64,"));
        assert_eq!(store.count(), 1);

        let bytes = frame.image_bytes().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_capture_skips_when_not_ready() {
        let mut store = FrameStore::default();
        let mut source = SyntheticSource::new(8, 8);
        source.control().set_ready(false);

        let captured = store.capture(&mut source, Resolution::new(4, 4), at(0)).unwrap();
        assert!(captured.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_resets_store() {
        let mut store = FrameStore::default();
        let mut source = SyntheticSource::new(8, 8);
        store.capture(&mut source, Resolution::new(4, 4), at(0)).unwrap();
        store.capture(&mut source, Resolution::new(4, 4), at(1)).unwrap();
        assert_eq!(store.count(), 2);

        store.clear();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_image_bytes_rejects_plain_text() {
        let frame = Frame {
            timestamp: at(0),
            image_data: "not a data url".into(),
            width: 1,
            height: 1,
        };
        assert!(matches!(frame.image_bytes(), Err(ExportError::Decoding(_))));
    }
}
