// File: bumpbot-core/src/tasks/bump.rs

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::{BumpSettings, BumpTarget};
use crate::platforms::PlatformIntegration;
use crate::Error;

/// Runs bump cycles until the shutdown watch flips to `true`.
///
/// Each cycle walks `targets` in order. Every entry gets a fresh platform
/// from `make_platform`; its session is closed exactly once no matter how
/// far the entry got. A failing entry is logged and skipped — the next
/// cycle is the retry.
pub async fn run_bump_loop<F>(
    targets: Vec<BumpTarget>,
    settings: BumpSettings,
    mut shutdown_rx: watch::Receiver<bool>,
    mut make_platform: F,
) -> Result<(), Error>
where
    F: FnMut(&BumpTarget) -> Box<dyn PlatformIntegration + Send>,
{
    loop {
        if *shutdown_rx.borrow() {
            info!("Shutdown signaled; stopping bump loop.");
            return Ok(());
        }

        info!("Starting bump cycle for {} target(s)", targets.len());
        for (idx, target) in targets.iter().enumerate() {
            if *shutdown_rx.borrow() {
                info!("Shutdown signaled; stopping bump loop mid-cycle.");
                return Ok(());
            }

            let mut platform = make_platform(target);
            match bump_target(platform.as_mut(), target, &settings.command).await {
                Ok(()) => info!(
                    "Bump sent for '{}' (channel {})",
                    target.label(),
                    target.channel_id
                ),
                Err(e) => error!("Bump failed for '{}': {e}", target.label()),
            }

            // No delay after the last entry; the cycle delay takes over.
            if idx + 1 < targets.len()
                && wait_or_shutdown(settings.inter_target_delay, &mut shutdown_rx).await
            {
                info!("Shutdown signaled; stopping bump loop mid-cycle.");
                return Ok(());
            }
        }

        if let Ok(delay) = chrono::Duration::from_std(settings.cycle_delay) {
            info!(
                "Bump cycle complete. Next cycle at {}",
                (Utc::now() + delay).format("%Y-%m-%d %H:%M:%S")
            );
        }
        if wait_or_shutdown(settings.cycle_delay, &mut shutdown_rx).await {
            info!("Shutdown signaled; stopping bump loop.");
            return Ok(());
        }
    }
}

/// One entry: authenticate, connect, send. The session is always closed,
/// whichever step failed.
async fn bump_target(
    platform: &mut (dyn PlatformIntegration + Send),
    target: &BumpTarget,
    command: &str,
) -> Result<(), Error> {
    let outcome = try_bump(platform, target, command).await;
    if let Err(e) = platform.disconnect().await {
        warn!("Error closing session for '{}': {e}", target.label());
    }
    outcome
}

async fn try_bump(
    platform: &mut (dyn PlatformIntegration + Send),
    target: &BumpTarget,
    command: &str,
) -> Result<(), Error> {
    platform.authenticate().await?;
    platform.connect().await?;
    platform
        .send_message(&target.channel_id.to_string(), command)
        .await
}

/// Sleeps for `delay` unless shutdown is signaled first. Returns `true`
/// if the loop should stop.
async fn wait_or_shutdown(delay: Duration, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = sleep(delay) => *shutdown_rx.borrow(),
        changed = shutdown_rx.changed() => match changed {
            Ok(()) => *shutdown_rx.borrow(),
            // Sender gone means the process is tearing down.
            Err(_) => true,
        },
    }
}
