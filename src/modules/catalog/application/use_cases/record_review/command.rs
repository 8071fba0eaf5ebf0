use uuid::Uuid;

/// A review mutation coming from the review-management collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewCommand {
    Submit {
        item_id: Uuid,
        reviewer_id: Uuid,
        rating: f64,
        body: String,
    },
    Edit {
        review_id: Uuid,
        rating: Option<f64>,
        body: Option<String>,
    },
    Delete {
        review_id: Uuid,
    },
}

impl ReviewCommand {
    pub fn submit(item_id: Uuid, reviewer_id: Uuid, rating: f64, body: impl Into<String>) -> Self {
        ReviewCommand::Submit {
            item_id,
            reviewer_id,
            rating,
            body: body.into(),
        }
    }

    pub fn edit(review_id: Uuid, rating: Option<f64>, body: Option<String>) -> Self {
        ReviewCommand::Edit {
            review_id,
            rating,
            body,
        }
    }

    pub fn delete(review_id: Uuid) -> Self {
        ReviewCommand::Delete { review_id }
    }
}
