pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod models;
#[cfg(feature = "postgres")]
pub mod repository;

pub use in_memory::InMemoryJobQueue;
#[cfg(feature = "postgres")]
pub use repository::JobRepositoryImpl;
