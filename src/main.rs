use std::{process, sync::Arc};

use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;
use vetrina::{
    application::{
        error::AppError,
        pipeline::{LoadOutcome, ProductsPipeline},
        query::ProductQueryService,
        repos::CatalogSource,
    },
    cache::{CacheConfig, ProductCache},
    config,
    domain::filters::FilterSpec,
    infra::{
        error::InfraError,
        http::{self, CatalogState},
        memory::InMemoryCatalog,
        remote::HttpCatalog,
        telemetry,
    },
};
use vetrina_api_types::RatingResponse;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Browse(args) => run_browse(settings, args).await,
        config::Command::Rating(args) => run_rating(settings, args.id).await,
    }
}

fn stub_catalog(settings: &config::Settings) -> InMemoryCatalog {
    InMemoryCatalog::seeded().with_latency(settings.catalog.simulated_latency)
}

fn build_pipeline(settings: &config::Settings) -> Result<ProductsPipeline, AppError> {
    let source: Arc<dyn CatalogSource> = match settings.remote.base_url.as_ref() {
        Some(url) => {
            info!(base_url = %url, "Using remote catalog");
            Arc::new(HttpCatalog::new(url.as_str())?)
        }
        None => Arc::new(stub_catalog(settings)),
    };

    let service = Arc::new(ProductQueryService::new(source));
    let cache = ProductCache::new(CacheConfig::from(&settings.cache), service);
    let initial = FilterSpec::new(settings.catalog.default_page_size.get());
    Ok(ProductsPipeline::new(cache, initial))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let service = Arc::new(ProductQueryService::new(Arc::new(stub_catalog(&settings))));
    let state = CatalogState::new(service, settings.catalog.default_page_size.get());
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        addr = %settings.server.addr,
        latency_ms = settings.catalog.simulated_latency.as_millis(),
        "Catalog listening"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))
}

async fn run_browse(settings: config::Settings, args: config::BrowseArgs) -> Result<(), AppError> {
    let pipeline = build_pipeline(&settings)?;
    let filters = FilterSpec::from_params(
        args.page.as_deref(),
        args.page_size.as_deref(),
        args.min_rating.as_deref(),
        args.ordering.as_deref(),
        settings.catalog.default_page_size.get(),
    );

    match pipeline.load_products(filters).await {
        LoadOutcome::Failed(err) => return Err(err.into()),
        LoadOutcome::ServedFromCache { revalidation } => {
            if let Err(err) = revalidation.await {
                return Err(AppError::unexpected(format!("revalidation task failed: {err}")));
            }
        }
        LoadOutcome::Fetched | LoadOutcome::Superseded => {}
    }

    print_json(&pipeline.state())
}

async fn run_rating(settings: config::Settings, product_id: i64) -> Result<(), AppError> {
    let pipeline = build_pipeline(&settings)?;
    let summary = pipeline.load_rating(product_id).await?;
    print_json(&RatingResponse::from(summary))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to render output: {err}")))?;
    println!("{rendered}");
    Ok(())
}
