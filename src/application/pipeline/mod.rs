//! Products pipeline: decides per filter change whether to serve from the
//! cache, serve and revalidate, or fetch, and publishes the visible state.

mod state;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::application::error::QueryError;
use crate::application::pagination::ResultPage;
use crate::cache::ProductCache;
use crate::domain::filters::FilterSpec;
use crate::domain::product::RatingSummary;

pub use state::{LoadStatus, ProductsAction, ProductsState, RatingState};

/// What [`ProductsPipeline::load_products`] did.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Fetched from the backend and shown.
    Fetched,
    /// Served from a fresh cache entry; the handle tracks the background
    /// revalidation it started.
    ServedFromCache { revalidation: JoinHandle<()> },
    /// A newer load started before this one finished; its result was dropped.
    Superseded,
    Failed(QueryError),
}

#[derive(Clone)]
pub struct ProductsPipeline {
    cache: ProductCache,
    state: Arc<watch::Sender<ProductsState>>,
    tickets: Arc<AtomicU64>,
}

impl ProductsPipeline {
    pub fn new(cache: ProductCache, initial_filters: FilterSpec) -> Self {
        let (sender, _) = watch::channel(ProductsState::new(initial_filters));
        Self {
            cache,
            state: Arc::new(sender),
            tickets: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn cache(&self) -> &ProductCache {
        &self.cache
    }

    /// Snapshot of the visible state.
    pub fn state(&self) -> ProductsState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProductsState> {
        self.state.subscribe()
    }

    /// Apply one action and notify subscribers if it was accepted.
    pub fn dispatch(&self, action: ProductsAction) -> bool {
        let name = action.name();
        let applied = self.state.send_if_modified(|state| state.apply(action));
        if !applied {
            debug!(action = name, "Discarded action for superseded state");
        }
        applied
    }

    /// Show the products for `filters`.
    ///
    /// A fresh cache entry is shown at once and revalidated in the
    /// background. A stale or missing entry is fetched in the foreground.
    /// Only the most recent load may change the visible list.
    #[instrument(skip(self, filters), fields(filters = %filters))]
    pub async fn load_products(&self, filters: FilterSpec) -> LoadOutcome {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let cached = self.cache.peek(&filters);

        if let Some(cached) = cached.as_ref().filter(|cached| cached.fresh) {
            let page = cached.data.clone();
            let fetched_at = cached.fetched_at;
            let load_filters = filters.clone();
            self.state.send_modify(move |state| {
                state.apply(ProductsAction::LoadProducts {
                    filters: load_filters,
                    ticket,
                });
                state.apply(ProductsAction::LoadProductsSuccess {
                    ticket,
                    page,
                    fetched_at: Some(fetched_at),
                });
                state.apply(ProductsAction::MarkCacheFresh);
            });
            debug!(ticket, "Served products from fresh cache");
            let revalidation = self.spawn_revalidation(filters, ticket);
            return LoadOutcome::ServedFromCache { revalidation };
        }

        self.dispatch(ProductsAction::LoadProducts {
            filters: filters.clone(),
            ticket,
        });
        if cached.is_some() {
            self.dispatch(ProductsAction::MarkCacheStale);
            self.dispatch(ProductsAction::StartRevalidating {
                filters: filters.clone(),
                ticket,
            });
        }

        match self.cache.refresh(&filters).await {
            Ok(refreshed) => {
                let fetched_at = self.cache.config().enabled.then_some(refreshed.fetched_at);
                let applied = self.dispatch(ProductsAction::LoadProductsSuccess {
                    ticket,
                    page: refreshed.data,
                    fetched_at,
                });
                if applied {
                    info!(ticket, count = self.state.borrow().count, "Products loaded");
                    LoadOutcome::Fetched
                } else {
                    LoadOutcome::Superseded
                }
            }
            Err(err) => {
                let applied = self.dispatch(ProductsAction::LoadProductsFailure {
                    ticket,
                    error: err.clone(),
                });
                if applied {
                    warn!(ticket, error = %err, "Products load failed");
                    LoadOutcome::Failed(err)
                } else {
                    LoadOutcome::Superseded
                }
            }
        }
    }

    fn spawn_revalidation(&self, filters: FilterSpec, ticket: u64) -> JoinHandle<()> {
        self.dispatch(ProductsAction::StartRevalidating {
            filters: filters.clone(),
            ticket,
        });
        let pipeline = self.clone();
        tokio::spawn(async move {
            let action = match pipeline.cache.revalidate(&filters).await {
                Ok(Some(refreshed)) => ProductsAction::RevalidateSuccess {
                    filters,
                    ticket,
                    page: refreshed.data,
                    fetched_at: refreshed.fetched_at,
                },
                // Skipped or failed: the cache already logged it.
                Ok(None) | Err(_) => ProductsAction::StopRevalidating { filters, ticket },
            };
            pipeline.dispatch(action);
        })
    }

    /// Load the rating of one product, independent of the product list.
    #[instrument(skip(self))]
    pub async fn load_rating(&self, product_id: i64) -> Result<RatingSummary, QueryError> {
        self.dispatch(ProductsAction::LoadRating { product_id });
        match self.cache.service().query_rating(product_id).await {
            Ok(summary) => {
                self.dispatch(ProductsAction::LoadRatingSuccess {
                    summary: summary.clone(),
                });
                Ok(summary)
            }
            Err(err) => {
                self.dispatch(ProductsAction::LoadRatingFailure {
                    product_id,
                    error: err.clone(),
                });
                Err(err)
            }
        }
    }

    /// Passive read through the cache without touching the visible state.
    pub async fn get_products_with_cache(
        &self,
        filters: &FilterSpec,
    ) -> Result<ResultPage, QueryError> {
        self.cache.get(filters).await
    }

    pub fn invalidate_cache(&self, filters: &FilterSpec) -> bool {
        let removed = self.cache.invalidate(filters);
        if removed && self.state.borrow().filters == *filters {
            self.dispatch(ProductsAction::SetCacheTimestamp(None));
        }
        removed
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        self.dispatch(ProductsAction::SetCacheTimestamp(None));
    }
}
