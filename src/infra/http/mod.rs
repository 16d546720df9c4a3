mod error;
mod handlers;
mod middleware;
mod state;

pub use error::{ApiError, ErrorReport};
pub use middleware::RequestContext;
pub use state::CatalogState;

use axum::{Router, middleware as axum_middleware, routing::get};

/// Routes of the catalog HTTP surface.
pub fn build_router(state: CatalogState) -> Router {
    Router::new()
        .route("/products", get(handlers::list_products))
        .route("/products/{id}/rating", get(handlers::product_rating))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
