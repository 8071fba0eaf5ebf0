use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use super::models::{rating_from_tenths, ReviewModel};
use crate::modules::catalog::domain::{Rating, Review, ReviewRepository};
use crate::schema::reviews;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::Database;

pub struct ReviewRepositoryImpl {
    db: Database,
}

impl ReviewRepositoryImpl {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewRepository for ReviewRepositoryImpl {
    async fn insert(&self, review: Review) -> AppResult<()> {
        let model = ReviewModel::from(&review);
        self.db
            .run(move |conn| {
                match diesel::insert_into(reviews::table).values(&model).execute(conn) {
                    Ok(_) => Ok(()),
                    Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                        Err(AppError::NotFound(format!("item {}", model.item_id)))
                    }
                    Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Err(
                        AppError::InvalidInput(format!("review {} already exists", model.id)),
                    ),
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    async fn update(&self, review: Review) -> AppResult<()> {
        let model = ReviewModel::from(&review);
        self.db
            .run(move |conn| {
                let updated = diesel::update(
                    reviews::table
                        .find(model.id)
                        .filter(reviews::item_id.eq(model.item_id)),
                )
                .set((
                    reviews::rating_tenths.eq(model.rating_tenths),
                    reviews::body.eq(&model.body),
                    reviews::updated_at.eq(model.updated_at),
                ))
                .execute(conn)?;

                if updated == 0 {
                    return Err(AppError::NotFound(format!("review {}", model.id)));
                }
                Ok(())
            })
            .await
    }

    async fn delete(&self, review_id: Uuid) -> AppResult<Option<Review>> {
        self.db
            .run(move |conn| {
                let removed = diesel::delete(reviews::table.find(review_id))
                    .returning(ReviewModel::as_returning())
                    .get_result(conn)
                    .optional()?;
                removed.map(Review::try_from).transpose()
            })
            .await
    }

    async fn find_by_id(&self, review_id: Uuid) -> AppResult<Option<Review>> {
        self.db
            .run(move |conn| {
                let model = reviews::table
                    .find(review_id)
                    .select(ReviewModel::as_select())
                    .first(conn)
                    .optional()?;
                model.map(Review::try_from).transpose()
            })
            .await
    }

    async fn ratings_for_item(&self, item_id: Uuid) -> AppResult<Vec<Rating>> {
        self.db
            .run(move |conn| {
                let tenths = reviews::table
                    .filter(reviews::item_id.eq(item_id))
                    .select(reviews::rating_tenths)
                    .load::<i16>(conn)?;
                tenths.into_iter().map(rating_from_tenths).collect()
            })
            .await
    }
}
