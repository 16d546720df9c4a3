//! Conversions between domain types and the transport types in
//! `vetrina_api_types`.

use vetrina_api_types as api;

use crate::application::pagination::ResultPage;
use crate::domain::product::{ProductSummary, RatingSummary};

impl From<ProductSummary> for api::ProductSummary {
    fn from(row: ProductSummary) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            created_at: row.created_at,
            image: row.image,
            avg_rating: row.avg_rating,
        }
    }
}

impl From<api::ProductSummary> for ProductSummary {
    fn from(row: api::ProductSummary) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            created_at: row.created_at,
            image: row.image,
            avg_rating: row.avg_rating,
        }
    }
}

impl From<ResultPage> for api::ProductListResponse {
    fn from(page: ResultPage) -> Self {
        Self {
            count: page.count,
            results: page.results.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<api::ProductListResponse> for ResultPage {
    fn from(body: api::ProductListResponse) -> Self {
        ResultPage::new(
            body.count,
            body.results.into_iter().map(Into::into).collect(),
        )
    }
}

impl From<RatingSummary> for api::RatingResponse {
    fn from(summary: RatingSummary) -> Self {
        Self {
            product_id: summary.product_id,
            avg_rating: summary.avg_rating,
            count: summary.count,
        }
    }
}

impl From<api::RatingResponse> for RatingSummary {
    fn from(body: api::RatingResponse) -> Self {
        Self {
            product_id: body.product_id,
            avg_rating: body.avg_rating,
            count: body.count,
        }
    }
}
