//! Audio/video chunk recording
//!
//! Encoding happens in the host's media recorder; chunks it emits are
//! accumulated here and joined into one container blob on stop.

use crate::media::{MediaBlob, MediaError, MediaResult};
use serde::{Deserialize, Serialize};

pub const VIDEO_MIME_VP9: &str = "video/webm; codecs=vp9";
pub const VIDEO_MIME_WEBM: &str = "video/webm";
pub const AUDIO_MIME_WEBM: &str = "audio/webm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Pick the recording MIME type, preferring VP9 for video when the host
    /// supports it
    pub fn select_mime(&self, is_supported: impl Fn(&str) -> bool) -> &'static str {
        match self {
            MediaKind::Video if is_supported(VIDEO_MIME_VP9) => VIDEO_MIME_VP9,
            MediaKind::Video => VIDEO_MIME_WEBM,
            MediaKind::Audio => AUDIO_MIME_WEBM,
        }
    }

    /// Container type of the finished blob, without codec parameters
    fn container_mime(&self) -> &'static str {
        match self {
            MediaKind::Video => VIDEO_MIME_WEBM,
            MediaKind::Audio => AUDIO_MIME_WEBM,
        }
    }
}

/// Accumulates chunks for one recording at a time
#[derive(Debug)]
pub struct MediaRecorder {
    kind: MediaKind,
    mime: Option<&'static str>,
    chunks: Vec<Vec<u8>>,
}

impl MediaRecorder {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            mime: None,
            chunks: Vec::new(),
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_recording(&self) -> bool {
        self.mime.is_some()
    }

    /// MIME type negotiated for the current recording
    pub fn mime(&self) -> Option<&'static str> {
        self.mime
    }

    pub fn start(&mut self, mime: &'static str) -> MediaResult<()> {
        if self.is_recording() {
            return Err(MediaError::AlreadyRecording(self.kind));
        }
        self.chunks.clear();
        self.mime = Some(mime);
        tracing::info!("{:?} recording started ({})", self.kind, mime);
        Ok(())
    }

    /// Store a chunk emitted by the host encoder. Empty chunks are dropped.
    pub fn push_chunk(&mut self, chunk: Vec<u8>) -> MediaResult<()> {
        if !self.is_recording() {
            return Err(MediaError::NotRecording(self.kind));
        }
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
        Ok(())
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Join all chunks into one blob
    pub fn stop(&mut self) -> MediaResult<MediaBlob> {
        if self.mime.take().is_none() {
            return Err(MediaError::NotRecording(self.kind));
        }

        let chunks = std::mem::take(&mut self.chunks);
        let bytes = chunks.concat();
        tracing::info!(
            "{:?} recording stopped: {} chunks, {} bytes",
            self.kind,
            chunks.len(),
            bytes.len()
        );

        Ok(MediaBlob::new(self.kind.container_mime(), bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_mime() {
        assert_eq!(MediaKind::Video.select_mime(|_| true), VIDEO_MIME_VP9);
        assert_eq!(MediaKind::Video.select_mime(|_| false), VIDEO_MIME_WEBM);
        assert_eq!(MediaKind::Audio.select_mime(|_| true), AUDIO_MIME_WEBM);
    }

    #[test]
    fn test_chunks_joined_in_order() {
        let mut recorder = MediaRecorder::new(MediaKind::Audio);
        recorder.start(AUDIO_MIME_WEBM).unwrap();
        recorder.push_chunk(vec![1, 2]).unwrap();
        recorder.push_chunk(Vec::new()).unwrap();
        recorder.push_chunk(vec![3]).unwrap();
        assert_eq!(recorder.chunk_count(), 2);

        let blob = recorder.stop().unwrap();
        assert_eq!(blob.mime, "audio/webm");
        assert_eq!(blob.bytes, vec![1, 2, 3]);
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_vp9_blob_is_plain_webm() {
        let mut recorder = MediaRecorder::new(MediaKind::Video);
        recorder.start(VIDEO_MIME_VP9).unwrap();
        let blob = recorder.stop().unwrap();
        assert_eq!(blob.mime, "video/webm");
    }

    #[test]
    fn test_misuse_is_reported() {
        let mut recorder = MediaRecorder::new(MediaKind::Video);
        assert!(matches!(recorder.stop(), Err(MediaError::NotRecording(MediaKind::Video))));
        assert!(recorder.push_chunk(vec![1]).is_err());

        recorder.start(VIDEO_MIME_WEBM).unwrap();
        assert!(matches!(
            recorder.start(VIDEO_MIME_WEBM),
            Err(MediaError::AlreadyRecording(MediaKind::Video))
        ));
    }

    #[test]
    fn test_restart_clears_previous_chunks() {
        let mut recorder = MediaRecorder::new(MediaKind::Audio);
        recorder.start(AUDIO_MIME_WEBM).unwrap();
        recorder.push_chunk(vec![9; 4]).unwrap();
        recorder.stop().unwrap();

        recorder.start(AUDIO_MIME_WEBM).unwrap();
        recorder.push_chunk(vec![1]).unwrap();
        assert_eq!(recorder.stop().unwrap().bytes, vec![1]);
    }
}
