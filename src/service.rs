//! Warning orchestrator
//!
//! [`WarningService`] answers the two public questions, "which warnings are
//! active in a region" and "what does one warning say", with cache-first
//! lookups. A cache miss opens one gateway connection for the whole call and
//! always closes it before returning.

use crate::cache::ResultCache;
use crate::config::Config;
use crate::error::Result;
use crate::gateway::{Connection, RemoteGateway};
use crate::parser::FloodWarningParser;
use crate::region::{RegionTable, normalize_region};
use crate::types::{WarningDetail, WarningId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Value stored in the shared result cache
#[derive(Clone, Debug)]
pub enum CachedFeed {
    /// Identifiers active in one region
    Warnings(Arc<Vec<WarningId>>),
    /// Decoded detail of one warning
    Detail(Arc<WarningDetail>),
}

/// Cache-first facade over the remote repository
#[derive(Clone, Debug)]
pub struct WarningService {
    gateway: RemoteGateway,
    cache: Arc<ResultCache<CachedFeed>>,
    regions: RegionTable,
    result_ttl: Duration,
}

impl WarningService {
    /// Build a service from its collaborators
    pub fn new(
        gateway: RemoteGateway,
        cache: Arc<ResultCache<CachedFeed>>,
        regions: RegionTable,
        result_ttl: Duration,
    ) -> Self {
        Self {
            gateway,
            cache,
            regions,
            result_ttl,
        }
    }

    /// Build a service talking FTP with settings from `config`
    pub fn from_config(config: &Config, cache: Arc<ResultCache<CachedFeed>>) -> Self {
        Self::new(
            RemoteGateway::new(config.repository.clone()),
            cache,
            RegionTable::with_overrides(&config.regions),
            config.cache.result_ttl,
        )
    }

    /// The shared result cache
    pub fn cache(&self) -> &Arc<ResultCache<CachedFeed>> {
        &self.cache
    }

    /// Regions this service can resolve
    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Identifiers of the warnings currently published for `region`
    ///
    /// An unmapped region, an unreachable repository or a failed listing
    /// yields an empty list that is not cached.
    pub async fn list_warnings(&self, region: &str) -> Arc<Vec<WarningId>> {
        let cache_key = warnings_cache_key(region);

        if let Some(CachedFeed::Warnings(ids)) = self.cache.get(&cache_key).await {
            info!(key = %cache_key, "Cache HIT");
            return ids;
        }
        info!(key = %cache_key, "Cache MISS, fetching from remote repository");
        self.refresh_warnings(region).await
    }

    /// Fetch the warning list of `region` from the repository and cache it
    ///
    /// Skips the cache lookup; failures leave any cached list untouched.
    pub async fn refresh_warnings(&self, region: &str) -> Arc<Vec<WarningId>> {
        if !self.regions.is_known(region) {
            info!(region = %region, "No warning prefix for region");
            return Arc::new(Vec::new());
        }
        let prefix = self.regions.resolve(region);

        let mut connection = match self.gateway.connect().await {
            Ok(connection) => connection,
            Err(e) => {
                error!(region = %region, error = %e, "Failed to retrieve warnings from remote repository");
                return Arc::new(Vec::new());
            }
        };
        let listed = connection.list_warning_identifiers(prefix).await;
        connection.close().await;

        let ids = match listed {
            Ok(ids) => Arc::new(ids),
            Err(e) => {
                error!(region = %region, error = %e, "Failed to list warnings on remote repository");
                return Arc::new(Vec::new());
            }
        };

        self.cache
            .set(
                warnings_cache_key(region),
                CachedFeed::Warnings(Arc::clone(&ids)),
                Some(self.result_ttl),
            )
            .await;
        info!(region = %region, count = ids.len(), "Fetched and cached warnings");
        ids
    }

    /// Decoded detail of warning `id`, or `None` if it is not published
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](crate::Error::Parse) when the structured
    /// document exists but cannot be decoded.
    pub async fn get_warning_detail(&self, id: &str) -> Result<Option<Arc<WarningDetail>>> {
        let id = WarningId::normalized(id);
        let cache_key = detail_cache_key(&id);

        if let Some(CachedFeed::Detail(detail)) = self.cache.get(&cache_key).await {
            info!(key = %cache_key, "Cache HIT");
            return Ok(Some(detail));
        }
        info!(key = %cache_key, "Cache MISS, fetching from remote repository");
        self.refresh_warning_detail(&id).await
    }

    /// Fetch the detail of `id` from the repository and cache it
    ///
    /// Skips the cache lookup. `id` is used as given, callers normalize it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](crate::Error::Parse) when the structured
    /// document exists but cannot be decoded.
    pub async fn refresh_warning_detail(&self, id: &WarningId) -> Result<Option<Arc<WarningDetail>>> {
        let mut connection = match self.gateway.connect().await {
            Ok(connection) => connection,
            Err(e) => {
                error!(id = %id, error = %e, "Failed to retrieve warning from remote repository");
                return Ok(None);
            }
        };
        let fetched = fetch_detail(&mut connection, id).await;
        connection.close().await;

        let Some(detail) = fetched? else {
            error!(id = %id, "Warning not found");
            return Ok(None);
        };

        let detail = Arc::new(detail);
        self.cache
            .set(
                detail_cache_key(id),
                CachedFeed::Detail(Arc::clone(&detail)),
                Some(self.result_ttl),
            )
            .await;
        info!(id = %id, "Fetched and cached warning detail");
        Ok(Some(detail))
    }
}

/// Download both documents of `id` over one connection and decode them
async fn fetch_detail(connection: &mut Connection, id: &WarningId) -> Result<Option<WarningDetail>> {
    let xml = match connection.download_structured_document(id).await {
        Some(xml) if !xml.trim().is_empty() => xml,
        _ => return Ok(None),
    };
    let text = connection.download_free_text_document(id).await;

    let info = FloodWarningParser::new(xml).warning_info()?;
    Ok(Some(WarningDetail::new(info, text)))
}

/// Cache key for a region's warning list, `warnings:<lower region>`
pub fn warnings_cache_key(region: &str) -> String {
    format!("warnings:{}", normalize_region(region).to_lowercase())
}

/// Cache key for one warning detail, `warning_detail:<UPPER id>`
pub fn detail_cache_key(id: &WarningId) -> String {
    format!("warning_detail:{}", id.as_str().to_uppercase())
}
