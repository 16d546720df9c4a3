//! Product query service and the filter/sort/paginate algorithm behind it.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tracing::{debug, instrument};

use crate::application::error::QueryError;
use crate::application::pagination::{ResultPage, paginate};
use crate::application::repos::CatalogSource;
use crate::domain::filters::{FilterSpec, SortField};
use crate::domain::product::{Product, ProductSummary, RatingSummary};

const METRIC_QUERY_MS: &str = "vetrina_query_ms";

/// Project, filter by rating floor, stable-sort, then paginate.
pub fn query_products(products: &[Product], filters: &FilterSpec) -> ResultPage {
    let mut rows: Vec<ProductSummary> = products
        .iter()
        .map(Product::summary)
        .filter(|row| row.avg_rating >= filters.min_rating())
        .collect();

    let ordering = filters.ordering();
    let field = ordering.field();
    let descending = ordering.is_descending();
    // `sort_by` is stable: equal keys keep their input order.
    rows.sort_by(|a, b| {
        let ord = compare_by(field, a, b);
        if descending { ord.reverse() } else { ord }
    });

    paginate(rows, filters.page(), filters.page_size())
}

fn compare_by(field: SortField, a: &ProductSummary, b: &ProductSummary) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Price => a.price.cmp(&b.price),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Image => a.image.cmp(&b.image),
        SortField::AvgRating => a.avg_rating.total_cmp(&b.avg_rating),
        SortField::Unknown => Ordering::Equal,
    }
}

/// Look up the rating summary of one product.
pub fn rating_of(products: &[Product], product_id: i64) -> Result<RatingSummary, QueryError> {
    products
        .iter()
        .find(|product| product.id == product_id)
        .map(Product::rating_summary)
        .ok_or_else(QueryError::product_not_found)
}

/// Entry point for catalog queries. Errors from the source pass through
/// unchanged.
pub struct ProductQueryService {
    source: Arc<dyn CatalogSource>,
}

impl ProductQueryService {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    #[instrument(skip(self, filters), fields(filters = %filters))]
    pub async fn query(&self, filters: &FilterSpec) -> Result<ResultPage, QueryError> {
        let started_at = Instant::now();
        let result = self.source.list_products(filters).await;
        histogram!(
            METRIC_QUERY_MS,
            "op" => "list_products",
            "outcome" => if result.is_ok() { "ok" } else { "error" }
        )
        .record(started_at.elapsed().as_secs_f64() * 1000.0);

        if let Ok(page) = &result {
            debug!(count = page.count, returned = page.len(), "Catalog query answered");
        }
        result
    }

    #[instrument(skip(self))]
    pub async fn query_rating(&self, product_id: i64) -> Result<RatingSummary, QueryError> {
        let started_at = Instant::now();
        let result = self.source.product_rating(product_id).await;
        histogram!(
            METRIC_QUERY_MS,
            "op" => "product_rating",
            "outcome" => if result.is_ok() { "ok" } else { "error" }
        )
        .record(started_at.elapsed().as_secs_f64() * 1000.0);
        result
    }
}
