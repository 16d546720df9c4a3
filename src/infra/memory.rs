//! In-process catalog backend with optional simulated latency.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::application::error::QueryError;
use crate::application::pagination::ResultPage;
use crate::application::query::{query_products, rating_of};
use crate::application::repos::CatalogSource;
use crate::domain::error::DomainError;
use crate::domain::filters::FilterSpec;
use crate::domain::product::{Product, RatingSummary};
use crate::domain::seed::{seed_products, validate_catalog};

#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    products: Arc<Vec<Product>>,
    latency: Duration,
}

impl InMemoryCatalog {
    /// Build a catalog over `products`, rejecting invalid or duplicate rows.
    pub fn new(products: Vec<Product>) -> Result<Self, DomainError> {
        validate_catalog(&products)?;
        Ok(Self {
            products: Arc::new(products),
            latency: Duration::ZERO,
        })
    }

    /// The built-in sample catalog.
    pub fn seeded() -> Self {
        Self {
            products: Arc::new(seed_products()),
            latency: Duration::ZERO,
        }
    }

    /// Delay every answer by `latency`, emulating a network round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn list_products(&self, filters: &FilterSpec) -> Result<ResultPage, QueryError> {
        self.simulate_latency().await;
        let page = query_products(&self.products, filters);
        debug!(filters = %filters, count = page.count, "In-memory catalog answered");
        Ok(page)
    }

    async fn product_rating(&self, product_id: i64) -> Result<RatingSummary, QueryError> {
        self.simulate_latency().await;
        rating_of(&self.products, product_id)
    }
}
