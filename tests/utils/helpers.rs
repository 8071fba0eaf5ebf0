/// Test helper functions and service builders
use super::factories::ItemFactory;
use rpg_rankings_lib::commands::AppState;
use rpg_rankings_lib::modules::{
    catalog::{
        domain::{Item, ItemRepository, Rating, Review, ReviewRepository},
        infrastructure::InMemoryStore,
    },
    jobs::{BackgroundWorker, InMemoryJobQueue},
};
use rpg_rankings_lib::shared::{utils::retry::RetryConfig, AppConfig};
use rpg_rankings_lib::{build_state, Stores};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct TestServices {
    pub store: Arc<InMemoryStore>,
    pub queue: Arc<InMemoryJobQueue>,
    pub state: AppState,
}

/// Configuration tuned for tests: no retry delays and a fast job poll
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.maintenance.poll_interval = Duration::from_millis(10);
    config.maintenance.retry = RetryConfig::immediate(2);
    config
}

/// Build all services against a fresh in-memory store
pub async fn build_test_services() -> TestServices {
    build_test_services_with(test_config()).await
}

pub async fn build_test_services_with(config: AppConfig) -> TestServices {
    let store = Arc::new(InMemoryStore::new());
    let queue = Arc::new(InMemoryJobQueue::new(config.maintenance.job_max_attempts));

    let stores = Stores {
        items: store.clone(),
        reviews: store.clone(),
        ranks: store.clone(),
        jobs: queue.clone(),
    };
    let state = build_state(&config, stores)
        .await
        .expect("services should build from the default config");

    TestServices {
        store,
        queue,
        state,
    }
}

impl TestServices {
    /// Insert an item built by the factory and return its id
    pub async fn add_item(&self, factory: ItemFactory) -> Uuid {
        let item = factory.build();
        let id = item.id;
        ItemRepository::insert(self.store.as_ref(), item)
            .await
            .expect("item insert");
        id
    }

    /// Current stored state of an item that must exist
    pub async fn item(&self, id: Uuid) -> Item {
        ItemRepository::find_by_id(self.store.as_ref(), id)
            .await
            .expect("item lookup")
            .expect("item exists")
    }

    /// Attach reviews straight to the store, bypassing the job queue
    pub async fn add_reviews(&self, item_id: Uuid, ratings: &[f64]) {
        for &value in ratings {
            let rating = Rating::new(value).expect("valid rating");
            let review = Review::new(item_id, Uuid::new_v4(), rating, "");
            ReviewRepository::insert(self.store.as_ref(), review)
                .await
                .expect("review insert");
        }
    }

    /// Add an item with reviews and bring its aggregate up to date
    pub async fn add_rated_item(&self, factory: ItemFactory, ratings: &[f64]) -> Uuid {
        let id = self.add_item(factory).await;
        self.add_reviews(id, ratings).await;
        self.state
            .aggregator
            .recompute(id)
            .await
            .expect("recompute");
        id
    }
}

/// Run worker loops for a short while, then stop them
pub async fn run_worker_for_duration(worker: Arc<BackgroundWorker>, duration: Duration) {
    let handles = worker.start();
    tokio::time::sleep(duration).await;
    worker.stop();
    for handle in handles {
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;
    }
}
