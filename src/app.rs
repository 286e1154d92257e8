//! Process-wide wiring of the warning feed
//!
//! [`FloodWarnings`] owns the shared result cache and its sweeper task, the
//! [`WarningService`] built on top of it, the optional hydrator, and the
//! cancellation token that stops the background tasks and the API server.

use crate::cache::ResultCache;
use crate::config::Config;
use crate::error::Result;
use crate::gateway::RemoteGateway;
use crate::hydrate::{HydrationSummary, hydrate_once, spawn_hydrator};
use crate::region::RegionTable;
use crate::service::{CachedFeed, WarningService};
use crate::types::{WarningDetail, WarningId};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Flood warning feed with its cache and optional HTTP front end
pub struct FloodWarnings {
    /// Configuration the instance was built with
    pub config: Arc<Config>,
    service: Arc<WarningService>,
    cancel_token: CancellationToken,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    hydrator: Mutex<Option<JoinHandle<()>>>,
}

impl FloodWarnings {
    /// Build an instance talking FTP to the configured repository
    ///
    /// When called inside a Tokio runtime the cache sweeper starts
    /// immediately, as does the hydrator if `cache.hydrate` is set. Outside
    /// a runtime neither starts and expired entries are only dropped on read.
    pub fn new(config: Config) -> Self {
        let gateway = RemoteGateway::new(config.repository.clone());
        Self::with_gateway(config, gateway)
    }

    /// Build an instance around an existing gateway
    pub fn with_gateway(config: Config, gateway: RemoteGateway) -> Self {
        let cache: Arc<ResultCache<CachedFeed>> = Arc::new(ResultCache::new(&config.cache));
        let service = Arc::new(WarningService::new(
            gateway,
            Arc::clone(&cache),
            RegionTable::with_overrides(&config.regions),
            config.cache.result_ttl,
        ));
        let cancel_token = CancellationToken::new();

        let (sweeper, hydrator) = match tokio::runtime::Handle::try_current() {
            Ok(_) => {
                let sweeper = cache.spawn_sweeper(config.cache.check_period, cancel_token.clone());
                let hydrator = config.cache.hydrate.then(|| {
                    spawn_hydrator(
                        Arc::clone(&service),
                        config.cache.hydrate_interval,
                        config.cache.detail_delay,
                        cancel_token.clone(),
                    )
                });
                (Some(sweeper), hydrator)
            }
            Err(_) => {
                tracing::warn!("No Tokio runtime, cache sweeper and hydrator not started");
                (None, None)
            }
        };

        Self {
            config: Arc::new(config),
            service,
            cancel_token,
            sweeper: Mutex::new(sweeper),
            hydrator: Mutex::new(hydrator),
        }
    }

    /// The cache-first warning service
    pub fn service(&self) -> &Arc<WarningService> {
        &self.service
    }

    /// Identifiers of active warnings in `region`
    pub async fn list_warnings(&self, region: &str) -> Arc<Vec<WarningId>> {
        self.service.list_warnings(region).await
    }

    /// Detail of warning `id`, `None` if it is not published
    pub async fn get_warning_detail(&self, id: &str) -> Result<Option<Arc<WarningDetail>>> {
        self.service.get_warning_detail(id).await
    }

    /// Refresh every region and warning detail once, in the foreground
    pub async fn hydrate(&self) -> HydrationSummary {
        hydrate_once(&self.service, self.config.cache.detail_delay, &self.cancel_token).await
    }

    /// Serve the REST API until [`shutdown`](FloodWarnings::shutdown) is called
    pub async fn serve(&self) -> Result<()> {
        crate::api::start_api_server(
            Arc::clone(&self.service),
            Arc::clone(&self.config),
            self.cancel_token.clone(),
        )
        .await
    }

    /// Token cancelled by [`shutdown`](FloodWarnings::shutdown)
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Stop the API server and the background tasks
    pub async fn shutdown(&self) {
        tracing::info!("Initiating graceful shutdown");
        self.cancel_token.cancel();

        for (task, slot) in [("cache sweeper", &self.sweeper), ("hydrator", &self.hydrator)] {
            let handle = slot.lock().map(|mut guard| guard.take()).unwrap_or_default();
            if let Some(handle) = handle
                && let Err(e) = handle.await
            {
                tracing::warn!(task, error = %e, "Background task ended abnormally");
            }
        }
        tracing::info!("Shutdown complete");
    }
}
