pub mod item;
pub mod review;

pub use item::{Item, ItemView};
pub use review::Review;
