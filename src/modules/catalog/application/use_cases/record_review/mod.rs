mod command;
mod handler;
mod result;

pub use command::ReviewCommand;
pub use handler::ReviewService;
pub use result::{ReviewAction, ReviewCommandResult};
