pub mod use_cases;

pub use use_cases::{ReviewAction, ReviewCommand, ReviewCommandResult, ReviewService};
