/// Shared infrastructure concerns
///
/// This module contains infrastructure implementations that are shared across
/// multiple bounded contexts (modules).
#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "postgres")]
pub use database::Database;
