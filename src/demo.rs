//! Scripted log producer so the console has something to show

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Emit one scripted event every `interval` until cancelled
pub async fn run(interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    let mut step: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                emit(step);
                step = step.wrapping_add(1);
            }
        }
    }
}

/// The rotation repeats messages on purpose so collapse mode has work to do
fn emit(step: u64) {
    let job = step % 7;
    match step % 12 {
        0 => info!("Loaded scene 'main_menu' in 184ms"),
        1 | 5 | 9 => info!(job, "Polling job queue"),
        2 => warn!(used_mb = 412, limit_mb = 512, "Texture cache above 80% capacity"),
        3 => info!(player = "p1", "Player connected"),
        4 => error!(
            target: "net",
            attempt = step / 12 + 1,
            "Connection refused: matchmaking.local:7777"
        ),
        6 => warn!("Frame time spike: 41ms"),
        7 => error!(
            "Unhandled exception in worker thread\ncaused by: index out of range (len 3, index 5)"
        ),
        8 => info!(player = "p1", "Player disconnected"),
        10 => warn!("Frame time spike: 41ms"),
        _ => error!(
            target: "net",
            attempt = step / 12 + 1,
            "Connection refused: matchmaking.local:7777"
        ),
    }
}
