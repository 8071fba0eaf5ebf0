pub mod commands;
pub mod modules;
#[cfg(feature = "postgres")]
mod schema;
pub mod shared;

use commands::{build_router, AppState};
use modules::{
    catalog::{
        application::ReviewService,
        domain::{ItemRepository, ReviewRepository},
        infrastructure::{InMemoryStore, SeedData},
    },
    jobs::{BackgroundWorker, InMemoryJobQueue, JobRepository, WorkerConfig},
    rankings::{
        application::{RankAssigner, RankingQueryService},
        domain::{CategoryIndex, RankStore},
        infrastructure::load_taxonomy,
    },
    ratings::{AggregationEvents, RatingAggregator},
};
use shared::{
    errors::AppResult,
    utils::logger::init_logger,
    AppConfig,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Storage ports the services are wired against
#[derive(Clone)]
pub struct Stores {
    pub items: Arc<dyn ItemRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub ranks: Arc<dyn RankStore>,
    pub jobs: Arc<dyn JobRepository>,
}

impl Stores {
    pub fn in_memory(job_max_attempts: u32) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            items: store.clone(),
            reviews: store.clone(),
            ranks: store,
            jobs: Arc::new(InMemoryJobQueue::new(job_max_attempts)),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(database: shared::Database, job_max_attempts: u32) -> Self {
        use modules::catalog::infrastructure::persistence::{
            ItemRepositoryImpl, ReviewRepositoryImpl,
        };
        use modules::jobs::JobRepositoryImpl;
        use modules::rankings::infrastructure::RankStoreImpl;

        Self {
            items: Arc::new(ItemRepositoryImpl::new(database.clone())),
            reviews: Arc::new(ReviewRepositoryImpl::new(database.clone())),
            ranks: Arc::new(RankStoreImpl::new(database.clone())),
            jobs: Arc::new(JobRepositoryImpl::new(database, job_max_attempts)),
        }
    }

    /// PostgreSQL when a database URL is configured and the feature is built in,
    /// otherwise the in-memory store.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let max_attempts = config.maintenance.job_max_attempts;

        #[cfg(feature = "postgres")]
        if let Some(url) = &config.database_url {
            let database = shared::Database::connect(url)?;
            database.run_migrations()?;
            return Ok(Self::postgres(database, max_attempts));
        }

        #[cfg(not(feature = "postgres"))]
        if config.database_url.is_some() {
            warn!("DATABASE_URL is set but the postgres feature is not enabled; using the in-memory store");
        }

        Ok(Self::in_memory(max_attempts))
    }
}

/// Wire every service against the given stores. Nothing is started.
pub async fn build_state(config: &AppConfig, stores: Stores) -> AppResult<AppState> {
    let taxonomy = load_taxonomy(config.taxonomy_path.as_deref()).await?;
    let categories = Arc::new(CategoryIndex::new(taxonomy));
    let events = Arc::new(AggregationEvents::new(config.maintenance.reassign_after_events));

    let aggregator = Arc::new(RatingAggregator::new(
        stores.items.clone(),
        stores.reviews.clone(),
        &config.rating,
        config.maintenance.retry.clone(),
        events.clone(),
    ));
    let assigner = Arc::new(RankAssigner::new(stores.ranks.clone(), events));
    let rankings = Arc::new(RankingQueryService::new(
        stores.items.clone(),
        stores.ranks,
        categories,
        config.rating.trusted_review_threshold,
    ));
    let reviews = Arc::new(ReviewService::new(
        stores.items,
        stores.reviews,
        stores.jobs.clone(),
    ));
    let worker = Arc::new(BackgroundWorker::new(
        stores.jobs,
        aggregator.clone(),
        assigner.clone(),
        WorkerConfig {
            poll_interval: config.maintenance.poll_interval,
            reassign_interval: config.maintenance.reassign_interval,
            retry: config.maintenance.retry.clone(),
        },
    ));

    Ok(AppState {
        rankings,
        reviews,
        aggregator,
        assigner,
        worker,
        pages: config.pages,
        started_at: Instant::now(),
    })
}

/// Build the services, load seed data into an empty catalog, and publish the
/// first rank table.
pub async fn bootstrap(config: &AppConfig, stores: Stores) -> AppResult<AppState> {
    let items = stores.items.clone();
    let reviews = stores.reviews.clone();
    let state = build_state(config, stores).await?;

    if let Some(path) = &config.seed_path {
        if items.list_ids().await?.is_empty() {
            let seed = SeedData::from_path(path).await?;
            seed.apply(
                items.as_ref(),
                reviews.as_ref(),
                config.rating.default_prior_mean,
            )
            .await?;
        } else {
            info!("Catalog already populated, skipping seed file {}", path.display());
        }
    }

    state.aggregator.recompute_all().await?;
    let report = state.worker.maintenance_cycle().await?;
    info!(
        generation = report.reassignment.generation,
        ranked = report.reassignment.ranked_count,
        "Initial rank table published (prior mean {:.3})",
        report.prior_mean
    );

    Ok(state)
}

async fn shutdown_signal(cancel: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {}", e);
            }
        }
        _ = cancel.cancelled() => {}
    }
    info!("Shutdown signal received");
}

pub async fn run() -> anyhow::Result<()> {
    init_logger();

    let config = AppConfig::from_env()?;
    let stores = Stores::from_config(&config)?;
    let state = bootstrap(&config, stores).await?;

    let worker = state.worker.clone();
    let handles = worker.start();

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal(worker.cancellation_token()))
        .await?;

    worker.stop();
    for result in futures::future::join_all(handles).await {
        if let Err(e) = result {
            warn!("Worker task ended abnormally: {}", e);
        }
    }

    info!("Shutdown complete");
    Ok(())
}
