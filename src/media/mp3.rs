//! MP3 encoding through a host encoder
//!
//! No encoder ships with the crate. Hosts plug in a LAME binding (or any
//! block encoder with the same shape) through [`Mp3Encoder`]; this module
//! handles sample conversion and block feeding.

use super::wav::{float_to_i16, PcmAudio};
use super::{MediaError, MediaResult};

pub const MP3_MIME: &str = "audio/mpeg";
pub const MP3_BITRATE_KBPS: u32 = 128;
/// Samples per channel in one LAME frame
pub const MP3_BLOCK_SIZE: usize = 1152;

/// One running encode, fed 16-bit stereo blocks
pub trait Mp3Stream: Send {
    fn encode_buffer(&mut self, left: &[i16], right: &[i16]) -> MediaResult<Vec<u8>>;
    fn flush(&mut self) -> MediaResult<Vec<u8>>;
}

pub trait Mp3Encoder: Send + Sync {
    fn start(
        &self,
        channels: u16,
        sample_rate: u32,
        bitrate_kbps: u32,
    ) -> MediaResult<Box<dyn Mp3Stream>>;
}

/// Encode at 128 kbps in 1152-sample blocks. Mono input is fed as both
/// channels; channels past the second are dropped.
pub fn encode_mp3(pcm: &PcmAudio, encoder: &dyn Mp3Encoder) -> MediaResult<Vec<u8>> {
    let to_i16 = |channel: &Vec<f32>| channel.iter().map(|s| float_to_i16(*s)).collect::<Vec<_>>();
    let left = to_i16(&pcm.channels[0]);
    let right = pcm.channels.get(1).map(to_i16).unwrap_or_else(|| left.clone());
    let channels = pcm.channel_count().min(2) as u16;

    let mut stream = encoder.start(channels, pcm.sample_rate, MP3_BITRATE_KBPS)?;
    let mut out = Vec::new();
    for (l, r) in left.chunks(MP3_BLOCK_SIZE).zip(right.chunks(MP3_BLOCK_SIZE)) {
        out.extend(stream.encode_buffer(l, r)?);
    }
    out.extend(stream.flush()?);

    if out.is_empty() {
        return Err(MediaError::Encoding("MP3 encoder produced no data".into()));
    }
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records what it is fed and emits one marker byte per block
    #[derive(Default, Clone)]
    pub(crate) struct RecordingEncoder {
        pub started: Arc<Mutex<Option<(u16, u32, u32)>>>,
        pub blocks: Arc<Mutex<Vec<(Vec<i16>, Vec<i16>)>>>,
    }

    struct RecordingStream {
        blocks: Arc<Mutex<Vec<(Vec<i16>, Vec<i16>)>>>,
    }

    impl Mp3Stream for RecordingStream {
        fn encode_buffer(&mut self, left: &[i16], right: &[i16]) -> MediaResult<Vec<u8>> {
            self.blocks.lock().push((left.to_vec(), right.to_vec()));
            Ok(vec![0xFF])
        }

        fn flush(&mut self) -> MediaResult<Vec<u8>> {
            Ok(vec![0xFB])
        }
    }

    impl Mp3Encoder for RecordingEncoder {
        fn start(
            &self,
            channels: u16,
            sample_rate: u32,
            bitrate_kbps: u32,
        ) -> MediaResult<Box<dyn Mp3Stream>> {
            *self.started.lock() = Some((channels, sample_rate, bitrate_kbps));
            Ok(Box::new(RecordingStream {
                blocks: self.blocks.clone(),
            }))
        }
    }

    #[test]
    fn test_blocks_and_settings() {
        let encoder = RecordingEncoder::default();
        let pcm = PcmAudio::new(44100, vec![vec![0.5; 2500], vec![-1.0; 2500]]).unwrap();

        let bytes = encode_mp3(&pcm, &encoder).unwrap();

        assert_eq!(*encoder.started.lock(), Some((2, 44100, 128)));
        let blocks = encoder.blocks.lock();
        let sizes: Vec<_> = blocks.iter().map(|(l, _)| l.len()).collect();
        assert_eq!(sizes, vec![1152, 1152, 196]);
        assert_eq!(blocks[0].0[0], 16383);
        assert_eq!(blocks[0].1[0], -32768);
        assert_eq!(bytes, vec![0xFF, 0xFF, 0xFF, 0xFB]);
    }

    #[test]
    fn test_mono_feeds_both_channels() {
        let encoder = RecordingEncoder::default();
        let pcm = PcmAudio::new(8000, vec![vec![0.25; 10]]).unwrap();

        encode_mp3(&pcm, &encoder).unwrap();

        assert_eq!(*encoder.started.lock(), Some((1, 8000, 128)));
        let blocks = encoder.blocks.lock();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].0, blocks[0].1);
    }
}
