//! Format conversion for recorded media
//!
//! Each target format is a fallback chain that ends in a raw copy of the
//! original container, so a download is always produced.

use super::mp3::{encode_mp3, Mp3Encoder, MP3_MIME};
use super::wav::{decode_wav, encode_wav, PcmAudio, WAV_MIME};
use super::{MediaBlob, MediaError, MediaResult};
use crate::export::{Download, FallbackChain, Strategy};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Webm,
    Wav,
    Mp3,
    Ogg,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Webm => "webm",
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            AudioFormat::Webm => "audio/webm",
            AudioFormat::Wav => WAV_MIME,
            AudioFormat::Mp3 => MP3_MIME,
            AudioFormat::Ogg => "audio/ogg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    Webm,
    Mp4,
}

impl VideoFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            VideoFormat::Webm => "webm",
            VideoFormat::Mp4 => "mp4",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            VideoFormat::Webm => "video/webm",
            VideoFormat::Mp4 => "video/mp4",
        }
    }
}

/// How the output bytes relate to the recorded blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMethod {
    /// Re-encoded into the target format
    Transcoded,
    /// Bytes in another container under the target's MIME type and extension
    Relabeled,
    /// Original bytes under the original MIME type
    Passthrough,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedMedia {
    pub mime: String,
    pub extension: String,
    pub bytes: Vec<u8>,
    pub method: ConversionMethod,
}

impl ConvertedMedia {
    pub fn into_download(self, stem: &str) -> Download {
        Download {
            file_name: format!("{}.{}", stem, self.extension),
            mime: self.mime,
            bytes: self.bytes,
        }
    }
}

/// Decodes a container blob into PCM samples
#[async_trait]
pub trait PcmDecoder: Send + Sync {
    async fn decode(&self, blob: &MediaBlob) -> MediaResult<PcmAudio>;
}

/// Decoder for blobs that already hold RIFF/WAVE data
#[derive(Debug, Default, Clone, Copy)]
pub struct HoundDecoder;

#[async_trait]
impl PcmDecoder for HoundDecoder {
    async fn decode(&self, blob: &MediaBlob) -> MediaResult<PcmAudio> {
        decode_wav(&blob.bytes)
    }
}

/// `audio/webm; codecs=opus` -> `webm`
fn extension_for_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .and_then(|essence| essence.split('/').nth(1))
        .map(|subtype| subtype.trim().to_string())
        .filter(|subtype| !subtype.is_empty())
        .unwrap_or_else(|| "bin".to_string())
}

/// PCM written as 16-bit WAV, labelled as `mime`
struct WavEncode<'a> {
    decoded: &'a MediaResult<PcmAudio>,
    mime: &'static str,
    extension: &'static str,
    method: ConversionMethod,
}

impl Strategy<MediaBlob, ConvertedMedia, MediaError> for WavEncode<'_> {
    fn name(&self) -> &'static str {
        "wav-encode"
    }

    fn attempt(&self, _blob: &MediaBlob) -> MediaResult<ConvertedMedia> {
        let pcm = decoded_pcm(self.decoded)?;
        Ok(ConvertedMedia {
            mime: self.mime.to_string(),
            extension: self.extension.to_string(),
            bytes: encode_wav(pcm)?,
            method: self.method,
        })
    }
}

struct Mp3Encode<'a> {
    decoded: &'a MediaResult<PcmAudio>,
    encoder: Option<&'a dyn Mp3Encoder>,
}

impl Strategy<MediaBlob, ConvertedMedia, MediaError> for Mp3Encode<'_> {
    fn name(&self) -> &'static str {
        "mp3-encode"
    }

    fn attempt(&self, _blob: &MediaBlob) -> MediaResult<ConvertedMedia> {
        let encoder = self
            .encoder
            .ok_or_else(|| MediaError::Unsupported("no MP3 encoder configured".into()))?;
        let pcm = decoded_pcm(self.decoded)?;
        Ok(ConvertedMedia {
            mime: MP3_MIME.to_string(),
            extension: AudioFormat::Mp3.extension().to_string(),
            bytes: encode_mp3(pcm, encoder)?,
            method: ConversionMethod::Transcoded,
        })
    }
}

fn decoded_pcm(decoded: &MediaResult<PcmAudio>) -> MediaResult<&PcmAudio> {
    decoded
        .as_ref()
        .map_err(|e| MediaError::Decoding(e.to_string()))
}

struct Relabel {
    mime: &'static str,
    extension: &'static str,
}

impl Strategy<MediaBlob, ConvertedMedia, MediaError> for Relabel {
    fn name(&self) -> &'static str {
        "relabel"
    }

    fn attempt(&self, blob: &MediaBlob) -> MediaResult<ConvertedMedia> {
        tracing::warn!(
            "No encoder for {}, relabeling {} bytes of {}",
            self.mime,
            blob.len(),
            blob.mime
        );
        Ok(ConvertedMedia {
            mime: self.mime.to_string(),
            extension: self.extension.to_string(),
            bytes: blob.bytes.clone(),
            method: ConversionMethod::Relabeled,
        })
    }
}

struct Passthrough;

impl Strategy<MediaBlob, ConvertedMedia, MediaError> for Passthrough {
    fn name(&self) -> &'static str {
        "raw-copy"
    }

    fn attempt(&self, blob: &MediaBlob) -> MediaResult<ConvertedMedia> {
        Ok(ConvertedMedia {
            mime: blob.mime.clone(),
            extension: extension_for_mime(&blob.mime),
            bytes: blob.bytes.clone(),
            method: ConversionMethod::Passthrough,
        })
    }
}

fn run_chain(
    chain: FallbackChain<'_, MediaBlob, ConvertedMedia, MediaError>,
    blob: &MediaBlob,
) -> MediaResult<ConvertedMedia> {
    chain.run(blob).map(|attempted| attempted.value).map_err(|failures| {
        MediaError::Conversion(failures.iter().map(ToString::to_string).collect())
    })
}

/// Convert a recorded audio blob. WebM is returned as recorded; every other
/// target decodes to PCM first. OGG has no encoder and carries WAV data under
/// the OGG type. MP3 needs a host encoder.
pub async fn convert_audio(
    blob: &MediaBlob,
    format: AudioFormat,
    decoder: &dyn PcmDecoder,
    mp3: Option<&dyn Mp3Encoder>,
) -> MediaResult<ConvertedMedia> {
    if format == AudioFormat::Webm {
        return run_chain(FallbackChain::new().then(Passthrough), blob);
    }

    let decoded = decoder.decode(blob).await;
    let chain = match format {
        AudioFormat::Wav => FallbackChain::new().then(WavEncode {
            decoded: &decoded,
            mime: WAV_MIME,
            extension: AudioFormat::Wav.extension(),
            method: ConversionMethod::Transcoded,
        }),
        AudioFormat::Ogg => FallbackChain::new().then(WavEncode {
            decoded: &decoded,
            mime: AudioFormat::Ogg.mime(),
            extension: AudioFormat::Ogg.extension(),
            method: ConversionMethod::Relabeled,
        }),
        AudioFormat::Mp3 | AudioFormat::Webm => FallbackChain::new().then(Mp3Encode {
            decoded: &decoded,
            encoder: mp3,
        }),
    }
    .then(Passthrough);

    let converted = run_chain(chain, blob)?;
    tracing::debug!(
        "Audio converted to {:?}: {:?}, {} bytes",
        format,
        converted.method,
        converted.bytes.len()
    );
    Ok(converted)
}

pub fn convert_video(blob: &MediaBlob, format: VideoFormat) -> MediaResult<ConvertedMedia> {
    let chain = match format {
        VideoFormat::Webm => FallbackChain::new().then(Passthrough),
        VideoFormat::Mp4 => FallbackChain::new()
            .then(Relabel {
                mime: format.mime(),
                extension: format.extension(),
            })
            .then(Passthrough),
    };
    run_chain(chain, blob)
}

/// `recording_<unix millis>`
pub fn recording_stem(at: DateTime<Utc>) -> String {
    format!("recording_{}", at.timestamp_millis())
}

/// `video_<unix millis>`
pub fn video_stem(at: DateTime<Utc>) -> String {
    format!("video_{}", at.timestamp_millis())
}
