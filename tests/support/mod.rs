//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::Semaphore;
use vetrina::application::error::QueryError;
use vetrina::application::pagination::ResultPage;
use vetrina::application::query::{ProductQueryService, query_products, rating_of};
use vetrina::application::repos::CatalogSource;
use vetrina::cache::{CacheConfig, ManualClock, ProductCache};
use vetrina::domain::filters::FilterSpec;
use vetrina::domain::product::{Product, RatingSummary};
use vetrina::domain::seed::seed_products;

pub const T0: OffsetDateTime = datetime!(2024-06-01 09:00 UTC);

/// A catalog whose answers can be held back, failed or delayed per page.
pub struct ScriptedCatalog {
    products: Mutex<Vec<Product>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    gated: AtomicBool,
    gate: Semaphore,
    failing: AtomicBool,
    page_delays: Mutex<HashMap<u32, Duration>>,
}

impl ScriptedCatalog {
    pub fn new(products: Vec<Product>) -> Arc<Self> {
        Arc::new(Self {
            products: Mutex::new(products),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
            failing: AtomicBool::new(false),
            page_delays: Mutex::new(HashMap::new()),
        })
    }

    pub fn seeded() -> Arc<Self> {
        Self::new(seed_products())
    }

    /// Number of `list_products` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, filters: &FilterSpec) -> usize {
        let canonical = filters.canonical();
        self.seen
            .lock()
            .expect("seen lock")
            .iter()
            .filter(|seen| **seen == canonical)
            .count()
    }

    /// While gated, every new listing call waits for [`ScriptedCatalog::release`].
    pub fn set_gated(&self, gated: bool) {
        self.gated.store(gated, Ordering::SeqCst);
    }

    pub fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn delay_page(&self, page: u32, delay: Duration) {
        self.page_delays
            .lock()
            .expect("delay lock")
            .insert(page, delay);
    }

    pub fn replace_products(&self, products: Vec<Product>) {
        *self.products.lock().expect("products lock") = products;
    }
}

#[async_trait]
impl CatalogSource for ScriptedCatalog {
    async fn list_products(&self, filters: &FilterSpec) -> Result<ResultPage, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .expect("seen lock")
            .push(filters.canonical());

        if self.gated.load(Ordering::SeqCst) {
            self.gate.acquire().await.expect("gate open").forget();
        }
        let delay = self
            .page_delays
            .lock()
            .expect("delay lock")
            .get(&filters.page())
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(QueryError::transport(Some(503), "catalog unavailable"));
        }

        let products = self.products.lock().expect("products lock").clone();
        Ok(query_products(&products, filters))
    }

    async fn product_rating(&self, product_id: i64) -> Result<RatingSummary, QueryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(QueryError::transport(Some(503), "catalog unavailable"));
        }
        let products = self.products.lock().expect("products lock").clone();
        rating_of(&products, product_id)
    }
}

pub fn cache_over(
    source: Arc<ScriptedCatalog>,
    duration_seconds: u64,
) -> (ProductCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let service = Arc::new(ProductQueryService::new(source));
    let config = CacheConfig::default().with_duration_seconds(duration_seconds);
    (ProductCache::with_clock(config, service, clock.clone()), clock)
}

pub fn product(id: i64, price_cents: i64, ratings: &[u8]) -> Product {
    Product {
        id,
        name: format!("Product {id}"),
        price: Decimal::new(price_cents, 2),
        created_at: T0 - time::Duration::days(30 - id),
        image: format!("/static/products/{id}.webp"),
        ratings: ratings.to_vec(),
        stock: 10,
        discount: None,
    }
}

/// Let spawned tasks run until `condition` holds.
pub async fn settle_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached after yielding");
}

pub fn ids(page: &ResultPage) -> Vec<i64> {
    page.results.iter().map(|row| row.id).collect()
}
