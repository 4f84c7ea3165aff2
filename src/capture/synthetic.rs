//! Synthetic test-pattern source
//!
//! Stands in for a shared screen when no host capture is wired up: the demo
//! binary and the integration tests drive the capture timer with it.

use super::traits::{FrameSource, Raster, Resolution, SourceInfo, SourceKind};
use crate::recorder::events::SourceEndedNotifier;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Moving colour-bar pattern at a fixed resolution
pub struct SyntheticSource {
    info: SourceInfo,
    resolution: Resolution,
    ready: Arc<AtomicBool>,
    ended: Arc<EndState>,
    frame_index: u64,
}

#[derive(Default)]
struct EndState {
    notifier: Mutex<Option<SourceEndedNotifier>>,
    ended: AtomicBool,
}

/// Handle for flipping readiness and ending the source from outside
#[derive(Clone)]
pub struct SyntheticControl {
    ready: Arc<AtomicBool>,
    ended: Arc<EndState>,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_info(
            SourceInfo::new("synthetic-0", "Synthetic Screen", SourceKind::Screen),
            width,
            height,
        )
    }

    /// Same pattern presented as a camera device
    pub fn camera(width: u32, height: u32) -> Self {
        Self::with_info(
            SourceInfo::new("synthetic-cam-0", "Synthetic Camera", SourceKind::Camera),
            width,
            height,
        )
    }

    fn with_info(info: SourceInfo, width: u32, height: u32) -> Self {
        Self {
            info,
            resolution: Resolution::new(width.max(1), height.max(1)),
            ready: Arc::new(AtomicBool::new(true)),
            ended: Arc::new(EndState::default()),
            frame_index: 0,
        }
    }

    pub fn control(&self) -> SyntheticControl {
        SyntheticControl {
            ready: self.ready.clone(),
            ended: self.ended.clone(),
        }
    }

    fn pattern(&self) -> Raster {
        const BARS: [[u8; 4]; 4] = [
            [230, 57, 70, 255],
            [241, 250, 238, 255],
            [168, 218, 220, 255],
            [29, 53, 87, 255],
        ];
        let Resolution { width, height } = self.resolution;
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..height {
            for x in 0..width {
                let column = (x as u64 + self.frame_index) % width as u64;
                let bar = (column * BARS.len() as u64 / width as u64) as usize;
                data.extend_from_slice(&BARS[bar]);
            }
        }
        Raster {
            width,
            height,
            data,
        }
    }
}

impl SyntheticControl {
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Simulate the user closing the shared window
    pub fn end(&self) {
        if self.ended.ended.swap(true, Ordering::SeqCst) {
            return;
        }
        self.ready.store(false, Ordering::SeqCst);
        if let Some(notifier) = self.ended.notifier.lock().take() {
            notifier.notify();
        }
    }

    pub fn has_ended(&self) -> bool {
        self.ended.ended.load(Ordering::SeqCst)
    }
}

impl FrameSource for SyntheticSource {
    fn info(&self) -> SourceInfo {
        self.info.clone()
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst) && !self.ended.ended.load(Ordering::SeqCst)
    }

    fn dimensions(&self) -> Option<Resolution> {
        Some(self.resolution)
    }

    fn current_frame(&mut self) -> Option<Raster> {
        if !self.is_ready() {
            return None;
        }
        let raster = self.pattern();
        self.frame_index += 1;
        Some(raster)
    }

    fn on_ended(&mut self, notifier: SourceEndedNotifier) {
        *self.ended.notifier.lock() = Some(notifier);
    }

    fn release(&mut self) {
        self.ended.ended.store(true, Ordering::SeqCst);
        self.ended.notifier.lock().take();
        tracing::debug!("Synthetic source released");
    }
}
