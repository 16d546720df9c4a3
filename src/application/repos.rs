//! Catalog source trait describing where product queries are answered.

use async_trait::async_trait;

use crate::application::error::QueryError;
use crate::application::pagination::ResultPage;
use crate::domain::filters::FilterSpec;
use crate::domain::product::RatingSummary;

/// A backend able to answer catalog queries: the in-memory stub or the
/// remote HTTP transport.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_products(&self, filters: &FilterSpec) -> Result<ResultPage, QueryError>;

    async fn product_rating(&self, product_id: i64) -> Result<RatingSummary, QueryError>;
}
