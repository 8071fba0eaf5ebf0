#[cfg(feature = "postgres")]
pub mod persistence;
pub mod taxonomy_loader;

#[cfg(feature = "postgres")]
pub use persistence::RankStoreImpl;
pub use taxonomy_loader::{load_taxonomy, parse_taxonomy};
