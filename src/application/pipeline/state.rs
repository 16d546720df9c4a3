//! Visible products state and the actions that drive it.

use serde::Serialize;
use time::OffsetDateTime;

use crate::application::error::QueryError;
use crate::application::pagination::ResultPage;
use crate::domain::filters::FilterSpec;
use crate::domain::product::{ProductSummary, RatingSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RatingState {
    pub product_id: Option<i64>,
    pub summary: Option<RatingSummary>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductsState {
    pub filters: FilterSpec,
    pub products: Vec<ProductSummary>,
    pub count: u64,
    pub status: LoadStatus,
    pub loading: bool,
    pub error: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub cache_timestamp: Option<OffsetDateTime>,
    pub is_stale: bool,
    pub revalidating: bool,
    /// Ticket of the most recent foreground load. Responses carrying any
    /// other ticket are discarded.
    pub active_ticket: u64,
    pub rating: RatingState,
}

impl ProductsState {
    pub fn new(filters: FilterSpec) -> Self {
        Self {
            filters,
            products: Vec::new(),
            count: 0,
            status: LoadStatus::Idle,
            loading: false,
            error: None,
            cache_timestamp: None,
            is_stale: false,
            revalidating: false,
            active_ticket: 0,
            rating: RatingState::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProductsAction {
    LoadProducts {
        filters: FilterSpec,
        ticket: u64,
    },
    LoadProductsSuccess {
        ticket: u64,
        page: ResultPage,
        fetched_at: Option<OffsetDateTime>,
    },
    LoadProductsFailure {
        ticket: u64,
        error: QueryError,
    },
    LoadRating {
        product_id: i64,
    },
    LoadRatingSuccess {
        summary: RatingSummary,
    },
    LoadRatingFailure {
        product_id: i64,
        error: QueryError,
    },
    /// Revalidation actions carry the ticket of the load that started them
    /// and are discarded once a newer load took over.
    StartRevalidating {
        filters: FilterSpec,
        ticket: u64,
    },
    RevalidateSuccess {
        filters: FilterSpec,
        ticket: u64,
        page: ResultPage,
        fetched_at: OffsetDateTime,
    },
    /// The background refresh ended without new data (failed or skipped).
    StopRevalidating {
        filters: FilterSpec,
        ticket: u64,
    },
    SetCacheTimestamp(Option<OffsetDateTime>),
    MarkCacheStale,
    MarkCacheFresh,
}

impl ProductsAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadProducts { .. } => "load_products",
            Self::LoadProductsSuccess { .. } => "load_products_success",
            Self::LoadProductsFailure { .. } => "load_products_failure",
            Self::LoadRating { .. } => "load_rating",
            Self::LoadRatingSuccess { .. } => "load_rating_success",
            Self::LoadRatingFailure { .. } => "load_rating_failure",
            Self::StartRevalidating { .. } => "start_revalidating",
            Self::RevalidateSuccess { .. } => "revalidate_success",
            Self::StopRevalidating { .. } => "stop_revalidating",
            Self::SetCacheTimestamp(_) => "set_cache_timestamp",
            Self::MarkCacheStale => "mark_cache_stale",
            Self::MarkCacheFresh => "mark_cache_fresh",
        }
    }
}

impl ProductsState {
    /// Apply one action. Returns `false` when the action was discarded as
    /// belonging to a superseded load or a filter set no longer shown.
    pub fn apply(&mut self, action: ProductsAction) -> bool {
        match action {
            ProductsAction::LoadProducts { filters, ticket } => {
                self.filters = filters;
                self.active_ticket = ticket;
                self.status = LoadStatus::Loading;
                self.loading = true;
                self.error = None;
                self.revalidating = false;
                true
            }
            ProductsAction::LoadProductsSuccess {
                ticket,
                page,
                fetched_at,
            } => {
                if ticket != self.active_ticket {
                    return false;
                }
                self.count = page.count;
                self.products = page.results;
                self.status = LoadStatus::Loaded;
                self.loading = false;
                self.error = None;
                self.revalidating = false;
                if let Some(fetched_at) = fetched_at {
                    self.cache_timestamp = Some(fetched_at);
                    self.is_stale = false;
                }
                true
            }
            ProductsAction::LoadProductsFailure { ticket, error } => {
                if ticket != self.active_ticket {
                    return false;
                }
                self.status = LoadStatus::Failed;
                self.loading = false;
                self.revalidating = false;
                self.error = Some(error.to_string());
                true
            }
            ProductsAction::LoadRating { product_id } => {
                if self.rating.product_id != Some(product_id) {
                    self.rating.summary = None;
                }
                self.rating.product_id = Some(product_id);
                self.rating.loading = true;
                self.rating.error = None;
                true
            }
            ProductsAction::LoadRatingSuccess { summary } => {
                if self.rating.product_id != Some(summary.product_id) {
                    return false;
                }
                self.rating.summary = Some(summary);
                self.rating.loading = false;
                self.rating.error = None;
                true
            }
            ProductsAction::LoadRatingFailure { product_id, error } => {
                if self.rating.product_id != Some(product_id) {
                    return false;
                }
                self.rating.loading = false;
                self.rating.error = Some(error.to_string());
                true
            }
            ProductsAction::StartRevalidating { filters, ticket } => {
                if !self.owns_revalidation(&filters, ticket) {
                    return false;
                }
                self.revalidating = true;
                true
            }
            ProductsAction::RevalidateSuccess {
                filters,
                ticket,
                page,
                fetched_at,
            } => {
                if !self.owns_revalidation(&filters, ticket) {
                    return false;
                }
                self.count = page.count;
                self.products = page.results;
                self.cache_timestamp = Some(fetched_at);
                self.is_stale = false;
                self.revalidating = false;
                true
            }
            ProductsAction::StopRevalidating { filters, ticket } => {
                if !self.owns_revalidation(&filters, ticket) {
                    return false;
                }
                self.revalidating = false;
                true
            }
            ProductsAction::SetCacheTimestamp(timestamp) => {
                self.cache_timestamp = timestamp;
                true
            }
            ProductsAction::MarkCacheStale => {
                self.is_stale = true;
                true
            }
            ProductsAction::MarkCacheFresh => {
                self.is_stale = false;
                true
            }
        }
    }

    fn owns_revalidation(&self, filters: &FilterSpec, ticket: u64) -> bool {
        ticket == self.active_ticket && *filters == self.filters
    }
}
