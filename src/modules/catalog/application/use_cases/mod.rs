pub mod record_review;

pub use record_review::{ReviewAction, ReviewCommand, ReviewCommandResult, ReviewService};
