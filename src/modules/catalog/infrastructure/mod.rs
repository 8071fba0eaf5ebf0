pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod persistence;
pub mod seed;

pub use in_memory::InMemoryStore;
pub use seed::{SeedData, SeedSummary};
