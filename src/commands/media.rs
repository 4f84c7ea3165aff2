//! Camera, microphone and recording commands

use super::AppState;
use crate::capture::{CaptureError, FrameSource};
use crate::event_log::kind;
use crate::export::Download;
use crate::media::{
    convert_audio, convert_video, recording_stem, video_stem, AudioFormat, ConversionMethod,
    ConvertedMedia, MediaBlob, MediaResult, VideoFormat,
};
use crate::recorder::media::AUDIO_MIME_WEBM;
use crate::recorder::{MediaKind, MediaRecorder};

pub const CAMERA_CONNECTED: &str = "camera connected";
pub const CAMERA_DISCONNECTED: &str = "camera disconnected";
pub const CAMERA_STOPPED: &str = "camera stopped";
pub const VIDEO_STARTED: &str = "video recording started";
pub const VIDEO_COMPLETE: &str = "video recording complete";
pub const VIDEO_COMPLETE_WEBM: &str = "video recording complete (WebM format)";
pub const MIC_STARTED: &str = "microphone connected, recording started";
pub const AUDIO_COMPLETE: &str = "recording complete, playback ready";
pub const ALL_STOPPED: &str = "all capture stopped";

type Message = (&'static str, String);

/// Devices and recordings owned by the command surface
pub struct MediaState {
    camera: Option<Box<dyn FrameSource>>,
    video: MediaRecorder,
    audio: MediaRecorder,
    recorded_audio: Option<MediaBlob>,
    recorded_video: Option<ConvertedMedia>,
}

impl Default for MediaState {
    fn default() -> Self {
        Self {
            camera: None,
            video: MediaRecorder::new(MediaKind::Video),
            audio: MediaRecorder::new(MediaKind::Audio),
            recorded_audio: None,
            recorded_video: None,
        }
    }
}

impl MediaState {
    pub fn camera_connected(&self) -> bool {
        self.camera.is_some()
    }

    pub fn is_recording_video(&self) -> bool {
        self.video.is_recording()
    }

    pub fn is_recording_audio(&self) -> bool {
        self.audio.is_recording()
    }

    pub fn has_recorded_audio(&self) -> bool {
        self.recorded_audio.is_some()
    }

    pub fn has_recorded_video(&self) -> bool {
        self.recorded_video.is_some()
    }

    /// Stop the video recorder and keep the MP4-labelled result
    fn finish_video(&mut self) -> MediaResult<Message> {
        let blob = self.video.stop()?;
        let converted = convert_video(&blob, VideoFormat::Mp4)?;
        let message = if converted.method == ConversionMethod::Passthrough {
            VIDEO_COMPLETE_WEBM
        } else {
            VIDEO_COMPLETE
        };
        self.recorded_video = Some(converted);
        Ok((kind::VIDEO, message.to_string()))
    }

    fn finish_audio(&mut self) -> MediaResult<Message> {
        self.recorded_audio = Some(self.audio.stop()?);
        Ok((kind::AUDIO, AUDIO_COMPLETE.to_string()))
    }

    fn disconnect_camera(&mut self, messages: &mut Vec<Message>) -> MediaResult<()> {
        if self.video.is_recording() {
            messages.push(self.finish_video()?);
        }
        if let Some(mut camera) = self.camera.take() {
            camera.release();
            messages.push((kind::SYSTEM, CAMERA_STOPPED.to_string()));
        }
        Ok(())
    }

    /// Stop everything except screen capture, in widget order
    fn stop_devices(&mut self) -> MediaResult<Vec<Message>> {
        let mut messages = Vec::new();
        if self.video.is_recording() {
            messages.push(self.finish_video()?);
        }
        self.disconnect_camera(&mut messages)?;
        if self.audio.is_recording() {
            messages.push(self.finish_audio()?);
        }
        Ok(messages)
    }
}

fn log_all(state: &AppState, messages: Vec<Message>) {
    let mut log = state.log.lock();
    for (category, content) in messages {
        log.append(category, content);
    }
}

/// Connect `device`, or disconnect the current camera. Returns whether a
/// camera is connected afterwards.
///
/// Disconnecting finishes an active video recording first.
pub fn toggle_camera(state: &AppState, device: Box<dyn FrameSource>) -> Result<bool, String> {
    let mut media = state.media.lock();

    if media.camera.is_some() {
        let mut messages = Vec::new();
        let result = media.disconnect_camera(&mut messages);
        drop(media);
        log_all(state, messages);
        result.map_err(|e| e.to_string())?;
        return Ok(false);
    }

    let info = device.info();
    if !device.is_ready() {
        return Err(CaptureError::SourceUnavailable(format!("camera '{}'", info.name)).to_string());
    }

    let requested = state.config.recording.camera_resolution();
    match device.dimensions() {
        Some(actual) if actual != requested => tracing::info!(
            "Camera '{}' connected at {}x{} (requested {}x{})",
            info.name,
            actual.width,
            actual.height,
            requested.width,
            requested.height
        ),
        _ => tracing::info!("Camera '{}' connected", info.name),
    }
    media.camera = Some(device);
    drop(media);

    state.log_event(kind::SYSTEM, CAMERA_CONNECTED);
    Ok(true)
}

/// The camera track ended on the device side
pub fn camera_ended(state: &AppState) -> Result<(), String> {
    let Some(mut camera) = state.media.lock().camera.take() else {
        tracing::debug!("Camera ended while none connected");
        return Ok(());
    };
    camera.release();
    state.log_event(kind::SYSTEM, CAMERA_DISCONNECTED);
    Ok(())
}

/// Start recording the connected camera, or stop and keep the result.
/// Returns whether a recording is running afterwards.
pub fn toggle_video_recording(state: &AppState) -> Result<bool, String> {
    let mut media = state.media.lock();

    if media.video.is_recording() {
        let message = media.finish_video().map_err(|e| e.to_string())?;
        drop(media);
        log_all(state, vec![message]);
        return Ok(false);
    }

    if media.camera.is_none() {
        return Err("Connect a camera before recording video".to_string());
    }
    let mime = MediaKind::Video.select_mime(|m| state.config.recording.supports(m));
    media.video.start(mime).map_err(|e| e.to_string())?;
    media.recorded_video = None;
    drop(media);

    tracing::debug!(
        "Video bitrate {} bps",
        state.config.recording.video_bits_per_second
    );
    state.log_event(kind::VIDEO, VIDEO_STARTED);
    Ok(true)
}

pub fn push_video_chunk(state: &AppState, chunk: Vec<u8>) -> Result<(), String> {
    state
        .media
        .lock()
        .video
        .push_chunk(chunk)
        .map_err(|e| e.to_string())
}

/// Start or stop audio recording. `granted` is the host's microphone
/// permission answer. Returns whether recording afterwards.
pub fn toggle_microphone(state: &AppState, granted: bool) -> Result<bool, String> {
    let mut media = state.media.lock();

    if media.audio.is_recording() {
        let message = media.finish_audio().map_err(|e| e.to_string())?;
        drop(media);
        log_all(state, vec![message]);
        return Ok(false);
    }

    if !granted {
        return Err("Microphone permission denied".to_string());
    }
    media.audio.start(AUDIO_MIME_WEBM).map_err(|e| e.to_string())?;
    media.recorded_audio = None;
    drop(media);

    state.log_event(kind::AUDIO, MIC_STARTED);
    Ok(true)
}

pub fn push_audio_chunk(state: &AppState, chunk: Vec<u8>) -> Result<(), String> {
    state
        .media
        .lock()
        .audio
        .push_chunk(chunk)
        .map_err(|e| e.to_string())
}

/// Convert the last audio recording and hand it out as a download
pub async fn download_audio(state: &AppState, format: AudioFormat) -> Result<Download, String> {
    let blob = state
        .media
        .lock()
        .recorded_audio
        .clone()
        .ok_or_else(|| "No recording to download".to_string())?;

    let progress = match format {
        AudioFormat::Webm => "processing audio file".to_string(),
        _ => format!("converting to {} format", format.extension().to_uppercase()),
    };
    state.log_event(kind::SYSTEM, progress);

    let converted = convert_audio(&blob, format, state.decoder(), state.mp3_encoder())
        .await
        .map_err(|e| e.to_string())?;
    let download = converted.into_download(&recording_stem(state.clock.now()));

    state.log_event(kind::SYSTEM, format!("audio downloaded: {}", download.file_name));
    Ok(download)
}

pub fn download_video(state: &AppState) -> Result<Download, String> {
    let converted = state
        .media
        .lock()
        .recorded_video
        .clone()
        .ok_or_else(|| "No video to download".to_string())?;

    let download = converted.into_download(&video_stem(state.clock.now()));
    state.log_event(kind::SYSTEM, format!("video downloaded: {}", download.file_name));
    Ok(download)
}

/// Stop video recording, camera, microphone and screen capture
pub async fn stop_all(state: &AppState) -> Result<(), String> {
    let stopped = state.media.lock().stop_devices();
    let messages = stopped.map_err(|e| e.to_string())?;
    log_all(state, messages);

    state.capture.lock().await.stop().await;
    state.log_event(kind::SYSTEM, ALL_STOPPED);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SyntheticSource;
    use crate::media::mp3::tests::RecordingEncoder;
    use crate::media::{encode_wav, PcmAudio};

    fn camera() -> Box<dyn FrameSource> {
        Box::new(SyntheticSource::camera(64, 48))
    }

    fn contents(state: &AppState) -> Vec<String> {
        state
            .log
            .lock()
            .records()
            .iter()
            .map(|r| r.content.clone())
            .collect()
    }

    #[test]
    fn test_camera_toggle() {
        let state = AppState::default();
        assert!(toggle_camera(&state, camera()).unwrap());
        assert!(state.media.lock().camera_connected());
        assert!(!toggle_camera(&state, camera()).unwrap());
        assert!(!state.media.lock().camera_connected());
        assert_eq!(contents(&state), vec![CAMERA_CONNECTED, CAMERA_STOPPED]);
    }

    #[test]
    fn test_unready_camera_rejected() {
        let state = AppState::default();
        let source = SyntheticSource::camera(8, 8);
        source.control().set_ready(false);
        let err = toggle_camera(&state, Box::new(source)).unwrap_err();
        assert_eq!(err, "Source unavailable: camera 'Synthetic Camera'");
        assert!(state.log.lock().is_empty());
    }

    #[test]
    fn test_camera_ended() {
        let state = AppState::default();
        camera_ended(&state).unwrap();
        assert!(state.log.lock().is_empty());

        toggle_camera(&state, camera()).unwrap();
        camera_ended(&state).unwrap();
        assert!(!state.media.lock().camera_connected());
        assert_eq!(contents(&state).last().unwrap(), CAMERA_DISCONNECTED);
    }

    #[test]
    fn test_video_recording_requires_camera() {
        let state = AppState::default();
        assert!(toggle_video_recording(&state).is_err());
        assert!(download_video(&state).is_err());
    }

    #[test]
    fn test_video_recording_produces_mp4_download() {
        let state = AppState::default();
        toggle_camera(&state, camera()).unwrap();
        assert!(toggle_video_recording(&state).unwrap());
        push_video_chunk(&state, vec![1, 2]).unwrap();
        push_video_chunk(&state, vec![3]).unwrap();
        assert!(!toggle_video_recording(&state).unwrap());

        let download = download_video(&state).unwrap();
        assert!(download.file_name.starts_with("video_"));
        assert!(download.file_name.ends_with(".mp4"));
        assert_eq!(download.mime, "video/mp4");
        assert_eq!(download.bytes, vec![1, 2, 3]);
        assert!(contents(&state).contains(&VIDEO_COMPLETE.to_string()));
    }

    #[test]
    fn test_camera_disconnect_finishes_recording() {
        let state = AppState::default();
        toggle_camera(&state, camera()).unwrap();
        toggle_video_recording(&state).unwrap();
        toggle_camera(&state, camera()).unwrap();

        let media = state.media.lock();
        assert!(!media.is_recording_video());
        assert!(media.has_recorded_video());
        drop(media);
        assert_eq!(
            contents(&state),
            vec![CAMERA_CONNECTED, VIDEO_STARTED, VIDEO_COMPLETE, CAMERA_STOPPED]
        );
    }

    #[test]
    fn test_microphone_permission() {
        let state = AppState::default();
        assert_eq!(
            toggle_microphone(&state, false).unwrap_err(),
            "Microphone permission denied"
        );
        assert!(!state.media.lock().is_recording_audio());
    }

    #[tokio::test]
    async fn test_audio_download_as_wav() {
        let state = AppState::default();
        assert!(download_audio(&state, AudioFormat::Wav).await.is_err());

        assert!(toggle_microphone(&state, true).unwrap());
        let pcm = PcmAudio::new(8000, vec![vec![0.0, 0.5]]).unwrap();
        push_audio_chunk(&state, encode_wav(&pcm).unwrap()).unwrap();
        assert!(!toggle_microphone(&state, true).unwrap());

        let download = download_audio(&state, AudioFormat::Wav).await.unwrap();
        assert!(download.file_name.starts_with("recording_"));
        assert!(download.file_name.ends_with(".wav"));
        assert_eq!(download.mime, "audio/wav");
        assert_eq!(&download.bytes[0..4], b"RIFF");

        let log = contents(&state);
        assert!(log.contains(&"converting to WAV format".to_string()));
        assert!(log.last().unwrap().starts_with("audio downloaded: recording_"));
    }

    #[tokio::test]
    async fn test_audio_download_as_mp3() {
        let encoder = RecordingEncoder::default();
        let state = AppState::default().with_mp3_encoder(Box::new(encoder.clone()));

        toggle_microphone(&state, true).unwrap();
        let pcm = PcmAudio::new(8000, vec![vec![0.0, 0.5]]).unwrap();
        push_audio_chunk(&state, encode_wav(&pcm).unwrap()).unwrap();
        toggle_microphone(&state, true).unwrap();

        let download = download_audio(&state, AudioFormat::Mp3).await.unwrap();
        assert!(download.file_name.ends_with(".mp3"));
        assert_eq!(download.mime, "audio/mpeg");
        assert_eq!(download.bytes, vec![0xFF, 0xFB]);
        assert_eq!(*encoder.started.lock(), Some((1, 8000, 128)));
        assert!(contents(&state).contains(&"converting to MP3 format".to_string()));
    }

    #[tokio::test]
    async fn test_stop_all() {
        let state = AppState::default();
        toggle_camera(&state, camera()).unwrap();
        toggle_video_recording(&state).unwrap();
        toggle_microphone(&state, true).unwrap();

        stop_all(&state).await.unwrap();

        let media = state.media.lock();
        assert!(!media.camera_connected());
        assert!(!media.is_recording_video());
        assert!(!media.is_recording_audio());
        assert!(media.has_recorded_audio());
        drop(media);
        assert_eq!(contents(&state).last().unwrap(), ALL_STOPPED);
    }
}
