//! Catalog source backed by a remote Vetrina HTTP service.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use vetrina_api_types::{ErrorBody, ProductListResponse, RatingResponse};

use crate::application::error::QueryError;
use crate::application::pagination::ResultPage;
use crate::application::repos::CatalogSource;
use crate::domain::filters::FilterSpec;
use crate::domain::product::RatingSummary;

use super::error::InfraError;

#[derive(Clone, Debug)]
pub struct HttpCatalog {
    client: Client,
    base: Url,
}

impl HttpCatalog {
    pub fn new(base_url: &str) -> Result<Self, InfraError> {
        let base = Url::parse(base_url)
            .and_then(|url| url.join("/"))
            .map_err(|err| InfraError::configuration(format!("invalid remote.base_url: {err}")))?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| InfraError::http(err.to_string()))?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("vetrina/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, QueryError> {
        self.base
            .join(path)
            .map_err(|err| QueryError::transport(None, format!("invalid url `{path}`: {err}")))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        not_found: fn(String) -> QueryError,
    ) -> Result<T, QueryError> {
        debug!(%url, "Requesting remote catalog");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| QueryError::transport(err.status().map(|s| s.as_u16()), err.to_string()))?;
        Self::handle(resp, not_found).await
    }

    async fn handle<T: DeserializeOwned>(
        resp: Response,
        not_found: fn(String) -> QueryError,
    ) -> Result<T, QueryError> {
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| QueryError::transport(Some(status.as_u16()), err.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|body| body.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(not_found(message));
        }
        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            warn!(status = status.as_u16(), body = %text, "Remote catalog returned an error");
            return Err(QueryError::transport(
                Some(status.as_u16()),
                format!("status {status} body {text}"),
            ));
        }

        serde_json::from_slice(&bytes).map_err(|err| {
            QueryError::transport(Some(status.as_u16()), format!("failed to parse body: {err}"))
        })
    }
}

fn rating_not_found(message: String) -> QueryError {
    if message.trim().is_empty() {
        QueryError::product_not_found()
    } else {
        QueryError::not_found(message)
    }
}

fn listing_not_found(message: String) -> QueryError {
    QueryError::transport(Some(StatusCode::NOT_FOUND.as_u16()), message)
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn list_products(&self, filters: &FilterSpec) -> Result<ResultPage, QueryError> {
        let mut url = self.url("products")?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in filters.query_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        let body: ProductListResponse = self.get(url, listing_not_found).await?;
        Ok(body.into())
    }

    async fn product_rating(&self, product_id: i64) -> Result<RatingSummary, QueryError> {
        let url = self.url(&format!("products/{product_id}/rating"))?;
        let body: RatingResponse = self.get(url, rating_not_found).await?;
        Ok(body.into())
    }
}
