use std::sync::Arc;

use similar_items_api::{
    config::Config,
    db::{
        create_pool, create_redis_client, redis::CacheWriterHandle, Cache, CachedPeopleIndex,
        InMemoryLibrary, PgLibrary,
    },
    routes::{create_router, AppState},
    services::{DtoProjector, ItemStore, PeopleIndex},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let (store, (people, cache_writer)) = match &config.database_url {
        Some(database_url) => {
            let library = PgLibrary::new(create_pool(database_url).await?);
            library.migrate().await?;
            tracing::info!("Using PostgreSQL library");
            let store: Arc<dyn ItemStore> = Arc::new(library.clone());
            (store, cached_people(&config, library)?)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using an empty in-memory library");
            let library = InMemoryLibrary::new();
            let store: Arc<dyn ItemStore> = Arc::new(library.clone());
            (store, cached_people(&config, library)?)
        }
    };

    let projector = Arc::new(DtoProjector::new(store.clone()));
    let app = create_router(AppState::new(store, people, projector));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(cache_writer) = cache_writer {
        cache_writer.shutdown().await;
    }

    Ok(())
}

/// Wraps `index` in the Redis people cache when `REDIS_URL` is set
fn cached_people<P>(
    config: &Config,
    index: P,
) -> anyhow::Result<(Arc<dyn PeopleIndex>, Option<CacheWriterHandle>)>
where
    P: PeopleIndex + 'static,
{
    match &config.redis_url {
        Some(redis_url) => {
            let (cache, writer) = Cache::new(create_redis_client(redis_url)?);
            tracing::info!(ttl = config.people_cache_ttl, "Caching people lookups in Redis");
            let people = CachedPeopleIndex::new(index, cache, config.people_cache_ttl);
            Ok((Arc::new(people), Some(writer)))
        }
        None => Ok((Arc::new(index), None)),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
