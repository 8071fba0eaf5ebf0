pub mod health;
pub mod registry;
pub mod state;

pub use registry::build_router;
pub use state::AppState;
