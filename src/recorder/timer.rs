//! Capture timer
//!
//! Samples a live source into the frame store at a fixed period. Each session
//! is driven by one dispatcher task that owns the source and handles ticks,
//! source-ended signals and stop requests strictly in arrival order.

use super::events::{CaptureEvent, CaptureNotice, SourceEndedNotifier};
use super::state::{CaptureSession, CaptureState, SessionSummary, StopReason};
use crate::capture::{FrameSource, Resolution};
use crate::event_log::{kind, SharedEventLog};
use crate::frames::SharedFrameStore;
use crate::utils::Clock;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use uuid::Uuid;

pub const DEFAULT_PERIOD: Duration = Duration::from_millis(1000);
pub const DEFAULT_DOWNSCALE: u32 = 2;

pub const STARTED_MESSAGE: &str = "screen share stream acquired";
pub const STOPPED_MESSAGE: &str = "screen capture stopped";
pub const FRAME_MESSAGE: &str = "screen frame captured";

/// Tick period and output scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    pub period: Duration,
    /// Frames are stored at `source size / downscale`
    pub downscale: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            downscale: DEFAULT_DOWNSCALE,
        }
    }
}

struct ActiveSession {
    info: CaptureSession,
    control: mpsc::UnboundedSender<CaptureEvent>,
    handle: JoinHandle<SessionSummary>,
}

/// Fixed-period frame sampler with an Idle/Running lifecycle
pub struct CaptureTimer {
    settings: TimerSettings,
    log: SharedEventLog,
    frames: SharedFrameStore,
    clock: Arc<dyn Clock>,
    state: Arc<RwLock<CaptureState>>,
    session: Option<ActiveSession>,
    event_tx: broadcast::Sender<CaptureNotice>,
}

impl CaptureTimer {
    pub fn new(
        log: SharedEventLog,
        frames: SharedFrameStore,
        clock: Arc<dyn Clock>,
        settings: TimerSettings,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            settings,
            log,
            frames,
            clock,
            state: Arc::new(RwLock::new(CaptureState::Idle)),
            session: None,
            event_tx,
        }
    }

    pub fn settings(&self) -> TimerSettings {
        self.settings
    }

    pub fn state(&self) -> CaptureState {
        *self.state.read()
    }

    pub fn is_running(&self) -> bool {
        self.state() == CaptureState::Running
    }

    /// Session metadata while running
    pub fn current_session(&self) -> Option<&CaptureSession> {
        if !self.is_running() {
            return None;
        }
        self.session.as_ref().map(|s| &s.info)
    }

    /// Subscribe to capture notices
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureNotice> {
        self.event_tx.subscribe()
    }

    /// Start sampling `source`. An active session is stopped first.
    pub async fn start(&mut self, mut source: Box<dyn FrameSource>) -> CaptureSession {
        if self.session.is_some() {
            tracing::info!("Capture session already present, stopping it first");
            self.stop().await;
        }

        let period = self.settings.period;
        let (control, rx) = mpsc::unbounded_channel();
        let info = CaptureSession {
            id: Uuid::new_v4(),
            started_at: self.clock.now(),
            source: source.info(),
            period_ms: period.as_millis() as u64,
        };

        source.on_ended(SourceEndedNotifier::new(info.id, control.clone()));

        self.log.lock().append(kind::SYSTEM, STARTED_MESSAGE);
        *self.state.write() = CaptureState::Running;

        // First tick fires one full period after start
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let dispatcher = SessionDispatcher {
            session: info.clone(),
            source,
            downscale: self.settings.downscale,
            log: self.log.clone(),
            frames: self.frames.clone(),
            clock: self.clock.clone(),
            state: self.state.clone(),
            event_tx: self.event_tx.clone(),
            ticks: 0,
            captured: 0,
            skipped: 0,
        };
        let handle = tokio::spawn(dispatcher.run(ticker, rx));

        let _ = self.event_tx.send(CaptureNotice::Started { session_id: info.id });
        tracing::info!(
            "Capture started: session {} on '{}' every {}ms",
            info.id,
            info.source.name,
            info.period_ms
        );

        self.session = Some(ActiveSession {
            info: info.clone(),
            control,
            handle,
        });
        info
    }

    /// Stop the current session and wait for its dispatcher to finish.
    ///
    /// Returns the summary of the session that was reaped, or `None` if there
    /// was nothing to stop. A session that already ended because its source
    /// went away is reaped without logging a second stop record.
    pub async fn stop(&mut self) -> Option<SessionSummary> {
        let Some(active) = self.session.take() else {
            tracing::debug!("Stop requested while idle");
            return None;
        };

        // Fails only if the dispatcher already exited on a source-ended signal
        let _ = active.control.send(CaptureEvent::Stop);

        match active.handle.await {
            Ok(summary) => Some(summary),
            Err(e) => {
                // The dispatcher died before it could finish the session
                tracing::error!("Capture task for session {} failed: {}", active.info.id, e);
                *self.state.write() = CaptureState::Idle;
                self.log.lock().append(kind::SYSTEM, STOPPED_MESSAGE);
                let _ = self.event_tx.send(CaptureNotice::Stopped {
                    session_id: active.info.id,
                    reason: StopReason::Requested,
                });
                None
            }
        }
    }

    /// Stop when running, start otherwise. Returns the resulting state.
    pub async fn toggle(&mut self, source: Box<dyn FrameSource>) -> CaptureState {
        if self.is_running() {
            self.stop().await;
        } else {
            self.start(source).await;
        }
        self.state()
    }
}

/// Owns one session's source and applies its events in order
struct SessionDispatcher {
    session: CaptureSession,
    source: Box<dyn FrameSource>,
    downscale: u32,
    log: SharedEventLog,
    frames: SharedFrameStore,
    clock: Arc<dyn Clock>,
    state: Arc<RwLock<CaptureState>>,
    event_tx: broadcast::Sender<CaptureNotice>,
    ticks: u64,
    captured: u64,
    skipped: u64,
}

impl SessionDispatcher {
    async fn run(
        mut self,
        mut ticker: Interval,
        mut rx: mpsc::UnboundedReceiver<CaptureEvent>,
    ) -> SessionSummary {
        loop {
            let event = tokio::select! {
                biased;
                // A closed channel means the timer was dropped
                event = rx.recv() => event.unwrap_or(CaptureEvent::Stop),
                _ = ticker.tick() => CaptureEvent::Tick,
            };

            if let Some(reason) = self.handle(event) {
                return self.finish(reason);
            }
        }
    }

    fn handle(&mut self, event: CaptureEvent) -> Option<StopReason> {
        match event {
            CaptureEvent::Tick => {
                self.on_tick();
                None
            }
            CaptureEvent::SourceEnded => {
                tracing::info!("Source '{}' ended", self.session.source.name);
                Some(StopReason::SourceEnded)
            }
            CaptureEvent::Stop => Some(StopReason::Requested),
        }
    }

    fn target_resolution(&self) -> Option<Resolution> {
        if !self.source.is_ready() {
            return None;
        }
        self.source
            .dimensions()
            .map(|native| native.downscaled(self.downscale))
    }

    fn on_tick(&mut self) {
        self.ticks += 1;

        let Some(target) = self.target_resolution() else {
            self.skipped += 1;
            tracing::trace!("Tick {}: source not ready", self.ticks);
            return;
        };

        let at = self.clock.now();
        let total = {
            let mut frames = self.frames.lock();
            let captured = frames
                .capture(self.source.as_mut(), target, at)
                .map(|frame| frame.is_some());
            match captured {
                Ok(true) => Some(frames.count()),
                Ok(false) => None,
                Err(e) => {
                    tracing::warn!("Tick {}: frame capture failed: {}", self.ticks, e);
                    None
                }
            }
        };

        let Some(total_frames) = total else {
            self.skipped += 1;
            return;
        };

        self.captured += 1;
        self.log.lock().append(kind::IMAGE_CAPTURE, FRAME_MESSAGE);
        let _ = self.event_tx.send(CaptureNotice::FrameCaptured {
            session_id: self.session.id,
            total_frames,
        });
        tracing::debug!(
            "Tick {}: captured {}x{} frame ({} total)",
            self.ticks,
            target.width,
            target.height,
            total_frames
        );
    }

    fn finish(mut self, reason: StopReason) -> SessionSummary {
        self.source.release();
        *self.state.write() = CaptureState::Idle;
        self.log.lock().append(kind::SYSTEM, STOPPED_MESSAGE);

        let _ = self.event_tx.send(CaptureNotice::Stopped {
            session_id: self.session.id,
            reason,
        });
        tracing::info!(
            "Capture stopped ({:?}): {} ticks, {} frames, {} skipped",
            reason,
            self.ticks,
            self.captured,
            self.skipped
        );

        SessionSummary {
            session: self.session,
            ticks: self.ticks,
            captured: self.captured,
            skipped: self.skipped,
            reason,
            stopped_at: self.clock.now(),
        }
    }
}
