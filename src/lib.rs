//! Info Capture - capture workbench backend.
//!
//! Timed screen snapshots, camera and microphone recording, an append-only
//! event log, and CSV/ZIP export of everything captured.

pub mod capture;
pub mod commands;
pub mod config;
pub mod event_log;
pub mod export;
pub mod frames;
pub mod input;
pub mod media;
pub mod recorder;
pub mod utils;

pub use commands::AppState;
pub use config::AppConfig;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
