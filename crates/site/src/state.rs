//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use clipjoint_core::MasterId;

use crate::config::SiteConfig;
use crate::db::RepositoryError;
use crate::db::masters::MasterRepository;
use crate::models::catalog::Service;
use crate::services::moderation::{ModerationClient, ModerationError};

/// How long a master's service list may be served from cache.
///
/// Admin edits run in a separate process, so there is no cross-process
/// invalidation; a short TTL bounds how stale the booking form can get.
const SERVICES_CACHE_TTL: Duration = Duration::from_secs(60);

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("moderation client: {0}")]
    Moderation(#[from] ModerationError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    moderation: Option<ModerationClient>,
    services_cache: Cache<MasterId, Arc<Vec<Service>>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the moderation client cannot be built from the
    /// configuration.
    pub fn new(config: SiteConfig, pool: PgPool) -> Result<Self, StateError> {
        let moderation = config
            .moderation
            .as_ref()
            .map(ModerationClient::new)
            .transpose()?;

        let services_cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(SERVICES_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                moderation,
                services_cache,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the moderation client, if one is configured.
    #[must_use]
    pub fn moderation(&self) -> Option<&ModerationClient> {
        self.inner.moderation.as_ref()
    }

    /// The services a master offers, read through a short-lived cache.
    ///
    /// Existence of the master is the caller's concern; an unknown id
    /// yields an empty list here.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails on a cache miss.
    pub async fn master_services(
        &self,
        master_id: MasterId,
    ) -> Result<Arc<Vec<Service>>, RepositoryError> {
        if let Some(services) = self.inner.services_cache.get(&master_id).await {
            debug!(%master_id, "cache hit for master services");
            return Ok(services);
        }

        let services = MasterRepository::new(self.pool())
            .services_of(master_id)
            .await?;
        let services = Arc::new(services);

        self.inner
            .services_cache
            .insert(master_id, Arc::clone(&services))
            .await;

        Ok(services)
    }

    /// Drop every cached service list.
    ///
    /// Called after staff edit a service so renamed or repriced entries
    /// do not linger for the full TTL.
    pub fn invalidate_services(&self) {
        self.inner.services_cache.invalidate_all();
    }
}
