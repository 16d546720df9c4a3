use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use vetrina_api_types::{ProductListResponse, ProductsQuery, RatingResponse};

use crate::application::error::QueryError;
use crate::domain::filters::FilterSpec;

use super::error::ApiError;
use super::state::CatalogState;

pub async fn list_products(
    State(state): State<CatalogState>,
    Query(params): Query<ProductsQuery>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let filters = FilterSpec::from_params(
        params.page.as_deref(),
        params.page_size.as_deref(),
        params.min_rating.as_deref(),
        params.ordering.as_deref(),
        state.default_page_size,
    );

    let page = state
        .service
        .query(&filters)
        .await
        .map_err(|err| ApiError::from_query("infra::http::list_products", err))?;
    Ok(Json(page.into()))
}

pub async fn product_rating(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<Json<RatingResponse>, ApiError> {
    let source = "infra::http::product_rating";
    // A non-numeric id cannot name a product.
    let product_id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::from_query(source, QueryError::product_not_found()))?;

    let summary = state
        .service
        .query_rating(product_id)
        .await
        .map_err(|err| ApiError::from_query(source, err))?;
    Ok(Json(summary.into()))
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
