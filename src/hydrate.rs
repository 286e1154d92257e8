//! Background cache hydration
//!
//! A hydration run refreshes the warning list of every known region and then
//! the detail of every listed warning, one at a time with a pause between
//! detail fetches, so user requests are answered from a warm cache.

use crate::service::WarningService;
use crate::types::WarningId;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Counts reported by one hydration run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HydrationSummary {
    /// Regions that listed at least one warning
    pub regions_with_warnings: usize,
    /// Regions that listed nothing or could not be listed
    pub regions_without_warnings: usize,
    /// Details fetched and cached
    pub details_fetched: usize,
    /// Details that were missing upstream or failed to decode
    pub details_failed: usize,
}

/// Refresh every region and warning detail once
///
/// Regions sharing a prefix list the same warnings; each detail is fetched
/// once per run. The run stops early when `cancel_token` is cancelled.
pub async fn hydrate_once(
    service: &WarningService,
    detail_delay: Duration,
    cancel_token: &CancellationToken,
) -> HydrationSummary {
    info!("Starting flood warning hydration");
    let mut summary = HydrationSummary::default();
    let mut seen: HashSet<WarningId> = HashSet::new();

    for region in service.regions().regions() {
        if cancel_token.is_cancelled() {
            break;
        }

        let ids = service.refresh_warnings(region).await;
        if ids.is_empty() {
            debug!(region, "No warnings to hydrate");
            summary.regions_without_warnings += 1;
            continue;
        }
        summary.regions_with_warnings += 1;

        for id in ids.iter() {
            if !seen.insert(id.clone()) {
                continue;
            }

            match service.refresh_warning_detail(id).await {
                Ok(Some(_)) => summary.details_fetched += 1,
                Ok(None) => summary.details_failed += 1,
                Err(e) => {
                    warn!(id = %id, error = %e, "Could not hydrate warning detail");
                    summary.details_failed += 1;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(detail_delay) => {}
                _ = cancel_token.cancelled() => {
                    debug!("Hydration cancelled between details");
                    return summary;
                }
            }
        }
    }

    info!(
        regions_with_warnings = summary.regions_with_warnings,
        regions_without_warnings = summary.regions_without_warnings,
        details_fetched = summary.details_fetched,
        details_failed = summary.details_failed,
        "Flood warning hydration complete"
    );
    summary
}

/// Run [`hydrate_once`] immediately and then every `period` until cancelled
pub fn spawn_hydrator(
    service: Arc<WarningService>,
    period: Duration,
    detail_delay: Duration,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    let period = period.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    hydrate_once(&service, detail_delay, &cancel_token).await;
                }
                _ = cancel_token.cancelled() => {
                    debug!("Hydrator cancelled");
                    break;
                }
            }
        }
    })
}
