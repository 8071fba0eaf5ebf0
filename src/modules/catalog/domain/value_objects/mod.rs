pub mod item_attributes;
pub mod rating;
pub mod rating_aggregate;

pub use item_attributes::{Attribute, ItemAttributes};
pub use rating::Rating;
pub use rating_aggregate::RatingAggregate;
