//! Command handlers
//!
//! The operation surface the UI calls. Every handler takes the shared
//! [`AppState`] and reports misuse as a user-facing `Err(String)`.

pub mod capture;
pub mod export;
pub mod input;
pub mod media;

use crate::capture::{PngEncoder, StillEncoder};
use crate::config::AppConfig;
use crate::event_log::{EventLog, LogRecord, SharedEventLog};
use crate::export::{ArchivePackager, ZipPackager};
use crate::frames::{FrameStore, SharedFrameStore};
use crate::input::InputTracker;
use crate::media::{HoundDecoder, Mp3Encoder, PcmDecoder};
use crate::recorder::CaptureTimer;
use crate::utils::{Clock, SystemClock};
use media::MediaState;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state shared by all commands
pub struct AppState {
    pub config: AppConfig,
    pub clock: Arc<dyn Clock>,
    pub log: SharedEventLog,
    pub frames: SharedFrameStore,
    pub capture: Mutex<CaptureTimer>,
    pub media: parking_lot::Mutex<MediaState>,
    pub input: InputTracker,
    decoder: Box<dyn PcmDecoder>,
    mp3_encoder: Option<Box<dyn Mp3Encoder>>,
    packager: Box<dyn ArchivePackager>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self::with_collaborators(
            config,
            Arc::new(SystemClock),
            Box::new(PngEncoder),
            Box::new(HoundDecoder),
            Box::new(ZipPackager),
        )
    }

    pub fn with_collaborators(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        encoder: Box<dyn StillEncoder>,
        decoder: Box<dyn PcmDecoder>,
        packager: Box<dyn ArchivePackager>,
    ) -> Self {
        let log = EventLog::shared(clock.clone());
        let frames = FrameStore::shared(encoder);
        let capture = CaptureTimer::new(
            log.clone(),
            frames.clone(),
            clock.clone(),
            config.timer_settings(),
        );
        let input = InputTracker::new(log.clone(), clock.clone());

        Self {
            config,
            clock,
            log,
            frames,
            capture: Mutex::new(capture),
            media: parking_lot::Mutex::new(MediaState::default()),
            input,
            decoder,
            mp3_encoder: None,
            packager,
        }
    }

    /// MP3 downloads fall back to the recorded container until one is set
    pub fn with_mp3_encoder(mut self, encoder: Box<dyn Mp3Encoder>) -> Self {
        self.mp3_encoder = Some(encoder);
        self
    }

    pub fn log_event(&self, kind: &str, content: impl Into<String>) -> LogRecord {
        self.log.lock().append(kind, content)
    }

    pub(crate) fn decoder(&self) -> &dyn PcmDecoder {
        self.decoder.as_ref()
    }

    pub(crate) fn mp3_encoder(&self) -> Option<&dyn Mp3Encoder> {
        self.mp3_encoder.as_deref()
    }

    pub(crate) fn packager(&self) -> &dyn ArchivePackager {
        self.packager.as_ref()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
