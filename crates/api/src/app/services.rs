use std::sync::Arc;

use talentbridge_infra::cache::{CacheProbe, NoopCacheProbe};
use talentbridge_infra::config::{AppConfig, StoreBackend};
use talentbridge_infra::mailer::{LogMailer, Mailer, SmtpMailer};
use talentbridge_infra::stores::{
    ApplicationStore, InMemoryStore, JobStore, PostgresStore, StoreHealth, UserStore,
};
use talentbridge_infra::tasks::{InMemoryTaskQueue, TaskQueue};

/// Wired infrastructure handed to the handlers.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub jobs: Arc<dyn JobStore>,
    pub applications: Arc<dyn ApplicationStore>,
    pub store_health: Arc<dyn StoreHealth>,
    pub cache: Arc<dyn CacheProbe>,
    pub notifications: Arc<dyn TaskQueue>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppServices {
    /// In-memory wiring for dev and tests, with an injectable mailer.
    pub fn in_memory_with(mailer: Arc<dyn Mailer>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            jobs: store.clone(),
            applications: store.clone(),
            store_health: store,
            cache: Arc::new(NoopCacheProbe),
            notifications: Arc::new(InMemoryTaskQueue::new()),
            mailer,
        }
    }

    pub fn in_memory() -> Self {
        Self::in_memory_with(Arc::new(LogMailer))
    }
}

/// Build services per the startup configuration.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(&smtp.url, &smtp.from)?),
        None => {
            tracing::warn!("SMTP not configured; outbound email goes to the log");
            Arc::new(LogMailer)
        }
    };

    match config.store_backend {
        StoreBackend::Memory => Ok(AppServices::in_memory_with(mailer)),
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("config validation guarantees DATABASE_URL for the postgres backend");

            let store = Arc::new(PostgresStore::connect(database_url).await?);
            store.migrate().await?;

            let cache = cache_probe(config)?;

            Ok(AppServices {
                users: store.clone(),
                jobs: store.clone(),
                applications: store.clone(),
                store_health: store,
                cache,
                notifications: Arc::new(InMemoryTaskQueue::new()),
                mailer,
            })
        }
    }
}

#[cfg(feature = "redis")]
fn cache_probe(config: &AppConfig) -> anyhow::Result<Arc<dyn CacheProbe>> {
    use talentbridge_infra::cache::RedisCacheProbe;

    match &config.redis_url {
        Some(url) => Ok(Arc::new(RedisCacheProbe::new(url)?)),
        None => Ok(Arc::new(NoopCacheProbe)),
    }
}

#[cfg(not(feature = "redis"))]
fn cache_probe(config: &AppConfig) -> anyhow::Result<Arc<dyn CacheProbe>> {
    if config.redis_url.is_some() {
        tracing::warn!("REDIS_URL set but the redis feature is disabled; cache probe is a no-op");
    }
    Ok(Arc::new(NoopCacheProbe))
}
