use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina storefront catalog")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve the catalog HTTP endpoints over the in-memory stub.
    Serve(Box<ServeArgs>),
    /// Load one page of products through the pipeline and print the state.
    Browse(BrowseArgs),
    /// Load the rating summary of one product.
    Rating(RatingArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CatalogOverrides {
    /// Override the page size used when a query does not name one.
    #[arg(long = "catalog-default-page-size", value_name = "COUNT")]
    pub default_page_size: Option<u32>,

    /// Override the simulated backend latency.
    #[arg(long = "catalog-simulated-latency-ms", value_name = "MILLIS")]
    pub simulated_latency_ms: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(flatten)]
    pub catalog: CatalogOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ClientOverrides {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(flatten)]
    pub catalog: CatalogOverrides,

    /// Query a remote Vetrina service instead of the in-memory stub.
    #[arg(long = "remote-base-url", value_name = "URL")]
    pub remote_base_url: Option<String>,

    /// Toggle the product cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the cache freshness window.
    #[arg(long = "cache-duration-seconds", value_name = "SECONDS")]
    pub cache_duration_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub overrides: ClientOverrides,

    /// 1-indexed page to load.
    #[arg(long, value_name = "PAGE")]
    pub page: Option<String>,

    /// Rows per page.
    #[arg(long = "page-size", value_name = "COUNT")]
    pub page_size: Option<String>,

    /// Minimum average rating, 0 to 5.
    #[arg(long = "min-rating", value_name = "RATING")]
    pub min_rating: Option<String>,

    /// Sort field, `-` prefix for descending (e.g. `-price`, `rating`).
    #[arg(long, value_name = "FIELD", allow_hyphen_values = true)]
    pub ordering: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct RatingArgs {
    #[command(flatten)]
    pub overrides: ClientOverrides,

    /// Product identifier.
    #[arg(value_name = "ID")]
    pub id: i64,
}
