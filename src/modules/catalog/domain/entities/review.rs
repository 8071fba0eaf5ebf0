use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::catalog::domain::value_objects::Rating;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub item_id: Uuid,
    pub reviewer_id: Uuid,
    pub rating: Rating,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(item_id: Uuid, reviewer_id: Uuid, rating: Rating, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            item_id,
            reviewer_id,
            rating,
            body: body.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an edit; the owning item and reviewer never change.
    pub fn revise(&mut self, rating: Option<Rating>, body: Option<String>) -> bool {
        let mut changed = false;
        if let Some(rating) = rating {
            changed |= self.rating != rating;
            self.rating = rating;
        }
        if let Some(body) = body {
            changed |= self.body != body;
            self.body = body;
        }
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }
}
