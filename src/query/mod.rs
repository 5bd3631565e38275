//! Ordering and pagination over a query-builder capability.
//!
//! [`OrderSpec`] turns `"title,-releaseDate"` into ordered clauses and applies them to any
//! [`QueryBuilder`]. [`paginate`] computes the page window and metadata from entity counts, and
//! [`deferred_join_pagination`] hands that window to the builder, which applies it to primary-key
//! selection before any join fans rows out.

mod order;
mod pagination;

pub use order::*;
pub use pagination::*;

use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// What the ordering and pagination core needs from a query builder.
///
/// `order_by` is cumulative: each call adds a sort key after the ones already present. An unknown
/// or empty field fails here, as a query-construction error, never later during execution.
#[async_trait]
pub trait QueryBuilder: Send + Sync {
    fn order_by(&mut self, field: &str, direction: OrderDirection) -> Result<&mut Self, AppError>;

    /// Maximum number of entities returned.
    fn limit(&mut self, n: u64) -> &mut Self;

    /// Number of entities skipped.
    fn offset(&mut self, n: u64) -> &mut Self;

    fn window(&mut self, window: PageWindow) -> &mut Self {
        self.offset(window.offset).limit(window.limit)
    }

    /// Count of distinct entities matching the query, ignoring order, limit, offset and joins.
    async fn get_count(&self) -> Result<u64, AppError>;

    async fn execute(&self) -> Result<Vec<Value>, AppError>;
}
