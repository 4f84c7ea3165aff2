//! Recorded media handling
//!
//! Container blobs produced by the recorders, WAV encoding and the format
//! conversion chains used when a recording is downloaded.

pub mod convert;
pub mod mp3;
pub mod wav;

pub use convert::{
    convert_audio, convert_video, recording_stem, video_stem, AudioFormat, ConversionMethod,
    ConvertedMedia, HoundDecoder, PcmDecoder, VideoFormat,
};
pub use mp3::{encode_mp3, Mp3Encoder, Mp3Stream, MP3_MIME};
pub use wav::{decode_wav, encode_wav, PcmAudio, WAV_MIME};

use crate::recorder::MediaKind;
use thiserror::Error;

/// A finished recording in its container format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl MediaBlob {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Media errors
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("{0:?} recording already in progress")]
    AlreadyRecording(MediaKind),

    #[error("No {0:?} recording in progress")]
    NotRecording(MediaKind),

    #[error("Invalid PCM audio: {0}")]
    InvalidPcm(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Conversion failed: {}", .0.join("; "))]
    Conversion(Vec<String>),
}

impl From<hound::Error> for MediaError {
    fn from(e: hound::Error) -> Self {
        MediaError::Encoding(e.to_string())
    }
}

pub type MediaResult<T> = Result<T, MediaError>;
