//! Watch command - Sync a journey periodically until interrupted

use std::path::Path;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::errors::{ParcoursError, Result};

use super::sync::{print_report, report_json};
use super::{print_json, Workspace};

/// Sweep the owner's dossiers every `interval` seconds.
///
/// A failing sweep is logged and the next one runs as scheduled. Ends with
/// `Interrupted` on Ctrl-C.
pub async fn run(cwd: Option<&Path>, owner: &str, interval: Option<u64>, json: bool) -> Result<()> {
    let workspace = Workspace::open(cwd)?;
    let journey = workspace.existing_journey(owner).await?;
    let sync = workspace.sync_service()?;

    let seconds = interval
        .unwrap_or_else(|| u64::from(workspace.config.sync.interval_seconds))
        .max(1);
    let mut ticker = tokio::time::interval(Duration::from_secs(seconds));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!("Watching journey {} every {}s", journey.id, seconds);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sync.sync_journey(journey.id).await {
                    Ok(report) if json => print_json(&report_json(&report))?,
                    Ok(report) => print_report(&report),
                    Err(e) => tracing::warn!("Sweep of journey {} failed: {}", journey.id, e),
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Stopping watch of journey {}", journey.id);
                return Err(ParcoursError::Interrupted);
            }
        }
    }
}
