//! Application state and its PostgreSQL wiring.
//!
//! - `counter` - letter counters and the issuance log
//! - `registry` - letter types and study programs

mod counter;
mod registry;

pub use counter::PgCounterStore;
pub use registry::PgRegistryStore;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::jwt::DEFAULT_JWT_SECRET;
use crate::config::AppConfig;
use crate::counter::{CounterService, CounterStore, RetryPolicy};
use crate::registry::{RegistryService, RegistryStore};

#[derive(Clone)]
pub struct AppState {
    pub counters: CounterService,
    pub registry: RegistryService,
    /// HS256 secret shared with the portal's login service.
    pub jwt_secret: String,
}

impl AppState {
    /// Connect to PostgreSQL, apply migrations if enabled, and wire the services.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .min_connections(config.db_min_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .idle_timeout(Duration::from_secs(900))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&config.database_url)
            .await
            .context("failed to connect to DATABASE_URL")?;

        if config.run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run database migrations")?;
            log::info!("Database migrations applied");
        }

        Ok(Self::with_pool(pool, config))
    }

    pub fn with_pool(pool: PgPool, config: &AppConfig) -> Self {
        Self::with_stores(
            Arc::new(PgCounterStore::new(pool.clone())),
            Arc::new(PgRegistryStore::new(pool)),
            config.registry_cache_ttl,
            config.commit_retry,
        )
        .with_jwt_secret(config.jwt_secret.clone())
    }

    /// State over arbitrary stores, e.g. the in-memory ones in tests.
    pub fn with_stores(
        counter_store: Arc<dyn CounterStore>,
        registry_store: Arc<dyn RegistryStore>,
        registry_cache_ttl: Duration,
        retry: RetryPolicy,
    ) -> Self {
        let registry = RegistryService::new(registry_store, registry_cache_ttl);
        let counters = CounterService::new(counter_store, registry.clone(), retry);
        Self {
            counters,
            registry,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
        }
    }

    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }
}
