use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use super::models::{ItemModel, NewItemModel};
use crate::modules::catalog::domain::{Item, ItemRepository, RatingAggregate};
use crate::schema::items;
use crate::shared::errors::AppResult;
use crate::shared::Database;

pub struct ItemRepositoryImpl {
    db: Database,
}

impl ItemRepositoryImpl {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemRepository for ItemRepositoryImpl {
    async fn insert(&self, item: Item) -> AppResult<()> {
        let model = NewItemModel::from(item);
        self.db
            .run(move |conn| {
                diesel::insert_into(items::table)
                    .values(&model)
                    .on_conflict(items::id)
                    .do_nothing()
                    .execute(conn)?;
                Ok(())
            })
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Item>> {
        self.db
            .run(move |conn| {
                let model = items::table
                    .find(id)
                    .select(ItemModel::as_select())
                    .first(conn)
                    .optional()?;
                Ok(model.map(Item::from))
            })
            .await
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Item>> {
        let ids = ids.to_vec();
        self.db
            .run(move |conn| {
                let models = items::table
                    .filter(items::id.eq_any(ids))
                    .select(ItemModel::as_select())
                    .load(conn)?;
                Ok(models.into_iter().map(Item::from).collect())
            })
            .await
    }

    async fn list_ids(&self) -> AppResult<Vec<Uuid>> {
        self.db
            .run(|conn| Ok(items::table.select(items::id).load::<Uuid>(conn)?))
            .await
    }

    async fn save_aggregate(&self, id: Uuid, aggregate: RatingAggregate) -> AppResult<bool> {
        let review_count = i32::try_from(aggregate.review_count).unwrap_or(i32::MAX);
        self.db
            .run(move |conn| {
                let updated = diesel::update(items::table.find(id))
                    .set((
                        items::review_count.eq(review_count),
                        items::average_rating.eq(aggregate.average_rating),
                        items::bayesian_rating.eq(aggregate.bayesian_rating),
                        items::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;
                Ok(updated > 0)
            })
            .await
    }

    async fn rated_averages(&self) -> AppResult<Vec<f64>> {
        self.db
            .run(|conn| {
                Ok(items::table
                    .filter(items::review_count.gt(0))
                    .select(items::average_rating)
                    .load::<f64>(conn)?)
            })
            .await
    }
}
