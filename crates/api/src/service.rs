use crate::ApiResult;
use crate::models::{DocQuery, IndexStats, QueryResult};
use async_trait::async_trait;

/// Entry point every front end (CLI, shell, tests) talks to.
#[async_trait]
pub trait DocumentationService: Send + Sync {
    /// Run the one-time indexing pass, or load a persisted index for the
    /// same snapshot when one exists.
    async fn prepare(&self) -> ApiResult<IndexStats>;

    /// Execute a query against the ready index.
    async fn query(&self, query: &DocQuery) -> ApiResult<QueryResult>;

    /// Persist the current index next to the other cached indices.
    async fn save(&self) -> ApiResult<()>;

    /// Drop the graph and every derived cache.
    async fn reset(&self) -> ApiResult<()>;
}
