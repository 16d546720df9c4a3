//! Remote catalog client against a mocked and a live transport.

use std::sync::Arc;

use httpmock::MockServer;
use tokio::net::TcpListener;
use vetrina::application::error::QueryError;
use vetrina::application::pipeline::{LoadOutcome, LoadStatus, ProductsPipeline};
use vetrina::application::query::ProductQueryService;
use vetrina::application::repos::CatalogSource;
use vetrina::cache::{CacheConfig, ProductCache};
use vetrina::domain::filters::{FilterSpec, SortOrder};
use vetrina::infra::http::{CatalogState, build_router};
use vetrina::infra::memory::InMemoryCatalog;
use vetrina::infra::remote::HttpCatalog;

#[tokio::test]
async fn listing_sends_every_filter_as_query_param() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/products")
            .query_param("page", "2")
            .query_param("page_size", "3")
            .query_param("min_rating", "4.5")
            .query_param("ordering", "-rating");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"count":4,"results":[{"id":9,"name":"Cedar Scented Candle","price":18.0,"created_at":"2024-05-06T07:50:00Z","image":"/static/products/9.webp","avg_rating":4.8}]}"#);
    });

    let catalog = HttpCatalog::new(&server.base_url()).expect("valid base url");
    let filters = FilterSpec::new(3)
        .with_page(2)
        .with_min_rating(4.5)
        .with_ordering(SortOrder::parse("-rating"));
    let page = catalog.list_products(&filters).await.expect("listing");

    mock.assert();
    assert_eq!(page.count, 4);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, 9);
    assert!((page.results[0].avg_rating - 4.8).abs() < 1e-9);
}

#[tokio::test]
async fn rating_404_maps_to_not_found_with_server_message() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/products/999/rating");
        then.status(404)
            .header("content-type", "application/json")
            .body(r#"{"message":"Product not found"}"#);
    });

    let catalog = HttpCatalog::new(&server.base_url()).expect("valid base url");
    let err = catalog.product_rating(999).await.expect_err("missing product");

    mock.assert();
    assert_eq!(err, QueryError::product_not_found());
}

#[tokio::test]
async fn server_errors_map_to_transport_with_status() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/products");
        then.status(500).body("boom");
    });

    let catalog = HttpCatalog::new(&server.base_url()).expect("valid base url");
    let err = catalog
        .list_products(&FilterSpec::new(12))
        .await
        .expect_err("server error");

    mock.assert();
    assert!(matches!(err, QueryError::Transport { status: Some(500), .. }));
}

#[tokio::test]
async fn unparseable_body_is_a_transport_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/products/1/rating");
        then.status(200)
            .header("content-type", "application/json")
            .body("not json");
    });

    let catalog = HttpCatalog::new(&server.base_url()).expect("valid base url");
    let err = catalog.product_rating(1).await.expect_err("bad body");
    assert!(matches!(err, QueryError::Transport { status: Some(200), .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pipeline_over_live_transport_matches_local_query() {
    let local = Arc::new(ProductQueryService::new(Arc::new(InMemoryCatalog::seeded())));
    let router = build_router(CatalogState::new(local.clone(), 12));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    let remote = HttpCatalog::new(&format!("http://{addr}")).expect("valid base url");
    let service = Arc::new(ProductQueryService::new(Arc::new(remote)));
    let cache = ProductCache::new(CacheConfig::default(), service);
    let filters = FilterSpec::new(5).with_ordering(SortOrder::parse("rating"));
    let pipeline = ProductsPipeline::new(cache, filters.clone());

    let outcome = pipeline.load_products(filters.clone()).await;
    assert!(matches!(outcome, LoadOutcome::Fetched));

    let state = pipeline.state();
    assert_eq!(state.status, LoadStatus::Loaded);
    let expected = local.query(&filters).await.expect("local query");
    assert_eq!(state.count, expected.count);
    assert_eq!(state.products.len(), expected.results.len());
    for (remote, local) in state.products.iter().zip(&expected.results) {
        assert_eq!(remote.id, local.id);
        assert_eq!(remote.created_at, local.created_at);
        assert!((remote.avg_rating - local.avg_rating).abs() < 1e-9);
    }

    let err = pipeline.load_rating(999).await.expect_err("missing product");
    assert_eq!(err, QueryError::product_not_found());

    server.abort();
}
