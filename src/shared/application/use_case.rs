/// Base traits for command and query handlers
///
/// Every write path (review mutations, recompute triggers) is a `UseCase`;
/// every read path over published state is a `Query`.
///
/// # Example
///
/// ```rust,ignore
/// struct ReviewService {
///     reviews: Arc<dyn ReviewRepository>,
///     jobs: Arc<dyn JobRepository>,
/// }
///
/// #[async_trait]
/// impl UseCase<ReviewCommand, ReviewCommandResult> for ReviewService {
///     async fn execute(&self, command: ReviewCommand) -> AppResult<ReviewCommandResult> {
///         // persist the review, then queue a recompute for its item
///     }
/// }
/// ```
use async_trait::async_trait;

use crate::shared::errors::AppResult;

/// Base trait for use cases (command handlers)
#[async_trait]
pub trait UseCase<TCommand, TResult> {
    /// Execute the use case with the given command
    async fn execute(&self, command: TCommand) -> AppResult<TResult>;
}

/// Base trait for queries (query handlers)
#[async_trait]
pub trait Query<TQuery, TResult> {
    /// Execute the query
    async fn execute(&self, query: TQuery) -> AppResult<TResult>;
}
