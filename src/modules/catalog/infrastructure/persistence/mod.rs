pub mod item_repository_impl;
pub mod models;
pub mod review_repository_impl;

pub use item_repository_impl::ItemRepositoryImpl;
pub use review_repository_impl::ReviewRepositoryImpl;
