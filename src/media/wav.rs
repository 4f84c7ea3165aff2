//! 16-bit PCM WAV encoding

use super::{MediaError, MediaResult};
use std::io::Cursor;

pub const WAV_MIME: &str = "audio/wav";

/// Decoded audio, one sample vector per channel
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl PcmAudio {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> MediaResult<Self> {
        if sample_rate == 0 {
            return Err(MediaError::InvalidPcm("sample rate must be positive".into()));
        }
        if channels.is_empty() || channels.len() > u16::MAX as usize {
            return Err(MediaError::InvalidPcm(format!(
                "unsupported channel count {}",
                channels.len()
            )));
        }
        let frames = channels[0].len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(MediaError::InvalidPcm("channels differ in length".into()));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }
}

/// Clamp to [-1, 1] and scale asymmetrically onto the i16 range
pub fn float_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Interleave all channels into a 16-bit little-endian PCM WAV file
pub fn encode_wav(pcm: &PcmAudio) -> MediaResult<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: pcm.channel_count() as u16,
        sample_rate: pcm.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for frame in 0..pcm.frames() {
            for channel in &pcm.channels {
                writer.write_sample(float_to_i16(channel[frame]))?;
            }
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Read a WAV file back into per-channel float samples
pub fn decode_wav(bytes: &[u8]) -> MediaResult<PcmAudio> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| MediaError::Decoding(e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| MediaError::Decoding(e.to_string()))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| MediaError::Decoding(e.to_string()))?
        }
    };

    let channel_count = spec.channels.max(1) as usize;
    let mut channels = vec![Vec::with_capacity(interleaved.len() / channel_count); channel_count];
    for frame in interleaved.chunks_exact(channel_count) {
        for (channel, sample) in channels.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }

    PcmAudio::new(spec.sample_rate, channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_to_i16_scaling() {
        assert_eq!(float_to_i16(1.0), 32767);
        assert_eq!(float_to_i16(1.5), 32767);
        assert_eq!(float_to_i16(-1.0), -32768);
        assert_eq!(float_to_i16(-2.0), -32768);
        assert_eq!(float_to_i16(0.0), 0);
        assert_eq!(float_to_i16(0.5), 16383);
    }

    #[test]
    fn test_wav_header_layout() {
        let pcm = PcmAudio::new(8000, vec![vec![0.0, 0.5, -0.5], vec![1.0, -1.0, 0.0]]).unwrap();
        let bytes = encode_wav(&pcm).unwrap();

        assert_eq!(bytes.len(), 44 + 3 * 2 * 2);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize, bytes.len() - 8);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        // PCM, 2 channels, 8 kHz, 32000 bytes/s, block align 4, 16 bits
        assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 1);
        assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 2);
        assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 8000);
        assert_eq!(u32::from_le_bytes(bytes[28..32].try_into().unwrap()), 32000);
        assert_eq!(u16::from_le_bytes([bytes[32], bytes[33]]), 4);
        assert_eq!(u16::from_le_bytes([bytes[34], bytes[35]]), 16);
        assert_eq!(&bytes[36..40], b"data");

        // first interleaved frame: left 0, right 32767
        assert_eq!(i16::from_le_bytes([bytes[44], bytes[45]]), 0);
        assert_eq!(i16::from_le_bytes([bytes[46], bytes[47]]), 32767);
    }

    #[test]
    fn test_decode_recovers_samples() {
        let pcm = PcmAudio::new(16000, vec![vec![0.25, -0.25, 0.75]]).unwrap();
        let decoded = decode_wav(&encode_wav(&pcm).unwrap()).unwrap();

        assert_eq!(decoded.sample_rate, 16000);
        assert_eq!(decoded.channel_count(), 1);
        for (a, b) in decoded.channels[0].iter().zip(&pcm.channels[0]) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_invalid_pcm_rejected() {
        assert!(PcmAudio::new(0, vec![vec![0.0]]).is_err());
        assert!(PcmAudio::new(8000, vec![]).is_err());
        assert!(PcmAudio::new(8000, vec![vec![0.0], vec![]]).is_err());
    }

    #[test]
    fn test_decode_rejects_non_wav() {
        assert!(matches!(decode_wav(b"not a wav"), Err(MediaError::Decoding(_))));
    }
}
