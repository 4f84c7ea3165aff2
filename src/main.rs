use anyhow::Context;
use info_capture::capture::SyntheticSource;
use info_capture::commands::{capture, export};
use info_capture::{init_tracing, AppConfig, AppState};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_filter);

    tracing::info!("Starting Info Capture v{}", env!("CARGO_PKG_VERSION"));

    let seconds: u64 = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid duration in seconds: {arg}"))?,
        None => 5,
    };

    let state = AppState::new(config);

    let source = SyntheticSource::new(1280, 720);
    let session = capture::start_screen_capture(&state, Box::new(source))
        .await
        .map_err(anyhow::Error::msg)?;
    tracing::info!("Capturing session {} for {}s", session.id, seconds);

    tokio::time::sleep(Duration::from_secs(seconds)).await;

    if let Some(summary) = capture::stop_screen_capture(&state)
        .await
        .map_err(anyhow::Error::msg)?
    {
        tracing::info!(
            "Session finished: {} ticks, {} frames, {} skipped",
            summary.ticks,
            summary.captured,
            summary.skipped
        );
    }

    let report = export::save_exports(&state, None).map_err(anyhow::Error::msg)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
