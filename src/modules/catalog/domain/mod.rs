pub mod entities;
pub mod repositories;
pub mod value_objects;

// Re-exports for easy access
pub use entities::{Item, ItemView, Review};
pub use repositories::{ItemRepository, ReviewRepository};
pub use value_objects::{Attribute, ItemAttributes, Rating, RatingAggregate};
