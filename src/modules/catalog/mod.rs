/// Catalog items and their reviews
///
/// Items carry static descriptive attributes plus the rating aggregate that
/// the ratings module maintains. Reviews are written through `ReviewService`.
pub mod application;
pub mod commands;
pub mod domain;
pub mod infrastructure;

pub use application::{ReviewCommand, ReviewCommandResult, ReviewService};
pub use domain::{Item, ItemRepository, ItemView, Rating, Review, ReviewRepository};
pub use infrastructure::{InMemoryStore, SeedData};
