use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::log_debug;
use crate::modules::catalog::domain::{Item, ItemRepository, ItemView};
use crate::modules::rankings::domain::{CategoryIndex, CategorySummary, RankStore, RankTable};
use crate::shared::application::{PaginatedResult, PaginationParams, Query};
use crate::shared::errors::{AppError, AppResult};

/// One page of a filtered ranking
pub type RankedPage = PaginatedResult<ItemView>;

#[derive(Debug, Clone)]
pub struct RankingQuery {
    pub category_id: String,
    pub subcategory_id: Option<String>,
    pub page: PaginationParams,
}

impl RankingQuery {
    pub fn new(
        category_id: impl Into<String>,
        subcategory_id: Option<String>,
        page: PaginationParams,
    ) -> Self {
        Self {
            category_id: category_id.into(),
            // An empty subcategory parameter means "none"
            subcategory_id: subcategory_id.filter(|s| !s.trim().is_empty()),
            page,
        }
    }
}

/// Read-only view over the published rank table.
///
/// Every page is built from exactly one table generation. Rank positions may
/// lag by one aggregation cycle behind the latest raw ratings.
pub struct RankingQueryService {
    items: Arc<dyn ItemRepository>,
    ranks: Arc<dyn RankStore>,
    categories: Arc<CategoryIndex>,
    trusted_review_threshold: u32,
}

impl RankingQueryService {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        ranks: Arc<dyn RankStore>,
        categories: Arc<CategoryIndex>,
        trusted_review_threshold: u32,
    ) -> Self {
        Self {
            items,
            ranks,
            categories,
            trusted_review_threshold,
        }
    }

    pub fn categories(&self) -> Vec<CategorySummary> {
        self.categories.summaries()
    }

    /// Display record of one item joined with its current rank position
    pub async fn item_view(&self, item_id: Uuid) -> AppResult<ItemView> {
        let item = self
            .items
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {}", item_id)))?;
        let table = self.ranks.current().await?;
        Ok(item.view(table.position(&item_id), self.trusted_review_threshold))
    }

    /// Items for `ids` keyed by identity, in no particular order
    async fn load(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Item>> {
        Ok(self
            .items
            .find_many(ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect())
    }

    fn views(&self, ordered: Vec<Item>, table: &RankTable) -> Vec<ItemView> {
        ordered
            .into_iter()
            .map(|item| item.view(table.position(&item.id), self.trusted_review_threshold))
            .collect()
    }
}

#[async_trait]
impl Query<RankingQuery, RankedPage> for RankingQueryService {
    async fn execute(&self, query: RankingQuery) -> AppResult<RankedPage> {
        let filter = self
            .categories
            .resolve(&query.category_id, query.subcategory_id.as_deref())?;
        let table = self.ranks.current().await?;
        let ranked = table.ordered_ids();

        let page = if filter.is_identity() {
            // Only the requested slice needs loading
            let slice = PaginatedResult::from_ordered(ranked.to_vec(), &query.page);
            let mut loaded = self.load(&slice.items).await?;
            let items: Vec<Item> = slice
                .items
                .iter()
                .filter_map(|id| loaded.remove(id))
                .collect();
            PaginatedResult {
                items: self.views(items, &table),
                total_count: slice.total_count,
                has_more: slice.has_more,
            }
        } else {
            let mut loaded = self.load(ranked).await?;
            let matching: Vec<Item> = ranked
                .iter()
                .filter_map(|id| loaded.remove(id))
                .filter(|item| filter.matches(&item.attributes))
                .collect();
            PaginatedResult::from_ordered(matching, &query.page)
                .map(|item| item.view(table.position(&item.id), self.trusted_review_threshold))
        };

        log_debug!(
            category = %filter.category_id(),
            subcategory = ?filter.subcategory_id(),
            generation = table.generation(),
            total = page.total_count,
            returned = page.items.len(),
            "Ranking query served"
        );
        Ok(page)
    }
}
