use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::modules::catalog::domain::{Item, ItemAttributes, Rating, RatingAggregate, Review};
use crate::schema::{items, reviews};
use crate::shared::errors::{AppError, AppResult};

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemModel {
    pub id: Uuid,
    pub title: String,
    pub genre: String,
    pub product_type: String,
    pub system: Option<String>,
    pub publisher: Option<String>,
    pub year_published: Option<i32>,
    pub theme: Option<String>,
    pub adventure_type: Option<String>,
    pub review_count: i32,
    pub average_rating: f64,
    pub bayesian_rating: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = items)]
pub struct NewItemModel {
    pub id: Uuid,
    pub title: String,
    pub genre: String,
    pub product_type: String,
    pub system: Option<String>,
    pub publisher: Option<String>,
    pub year_published: Option<i32>,
    pub theme: Option<String>,
    pub adventure_type: Option<String>,
    pub review_count: i32,
    pub average_rating: f64,
    pub bayesian_rating: f64,
}

impl From<ItemModel> for Item {
    fn from(model: ItemModel) -> Self {
        Item {
            id: model.id,
            attributes: ItemAttributes {
                title: model.title,
                genre: model.genre,
                product_type: model.product_type,
                system: model.system,
                publisher: model.publisher,
                year_published: model.year_published,
                theme: model.theme,
                adventure_type: model.adventure_type,
            },
            aggregate: RatingAggregate {
                review_count: u32::try_from(model.review_count).unwrap_or(0),
                average_rating: model.average_rating,
                bayesian_rating: model.bayesian_rating,
            },
        }
    }
}

impl From<Item> for NewItemModel {
    fn from(item: Item) -> Self {
        let attrs = item.attributes;
        NewItemModel {
            id: item.id,
            title: attrs.title,
            genre: attrs.genre,
            product_type: attrs.product_type,
            system: attrs.system,
            publisher: attrs.publisher,
            year_published: attrs.year_published,
            theme: attrs.theme,
            adventure_type: attrs.adventure_type,
            review_count: i32::try_from(item.aggregate.review_count).unwrap_or(i32::MAX),
            average_rating: item.aggregate.average_rating,
            bayesian_rating: item.aggregate.bayesian_rating,
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewModel {
    pub id: Uuid,
    pub item_id: Uuid,
    pub reviewer_id: Uuid,
    pub rating_tenths: i16,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored tenths back into a validated rating
pub fn rating_from_tenths(tenths: i16) -> AppResult<Rating> {
    let tenths = u8::try_from(tenths)
        .map_err(|_| AppError::DatabaseError(format!("stored rating {} out of range", tenths)))?;
    Rating::from_tenths(tenths)
}

impl TryFrom<ReviewModel> for Review {
    type Error = AppError;

    fn try_from(model: ReviewModel) -> AppResult<Self> {
        Ok(Review {
            id: model.id,
            item_id: model.item_id,
            reviewer_id: model.reviewer_id,
            rating: rating_from_tenths(model.rating_tenths)?,
            body: model.body,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Review> for ReviewModel {
    fn from(review: &Review) -> Self {
        ReviewModel {
            id: review.id,
            item_id: review.item_id,
            reviewer_id: review.reviewer_id,
            rating_tenths: i16::from(review.rating.tenths()),
            body: review.body.clone(),
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}
