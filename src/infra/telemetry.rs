use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

const SERVICE_NAME: &str = "vetrina";

/// Dependencies whose chatter stays at `warn` unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: [&str; 4] = ["hyper", "hyper_util", "reqwest", "h2"];

/// Install a global tracing subscriber using the provided logging settings.
///
/// `RUST_LOG` replaces the configured directives entirely when it is set.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(logging.level)));

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })?;

    info!(
        target: "vetrina::telemetry",
        service = SERVICE_NAME,
        version = env!("CARGO_PKG_VERSION"),
        format = ?logging.format,
        level = %logging.level,
        "Telemetry initialised"
    );
    Ok(())
}

fn default_directives(level: LevelFilter) -> String {
    let mut directives = level.to_string();
    for target in QUIET_TARGETS {
        directives.push_str(&format!(",{target}={}", level.min(LevelFilter::WARN)));
    }
    directives
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "vetrina_cache_hit_total",
            Unit::Count,
            "Total number of reads answered by a fresh cache entry."
        );
        describe_counter!(
            "vetrina_cache_miss_total",
            Unit::Count,
            "Total number of reads that found no cache entry."
        );
        describe_counter!(
            "vetrina_cache_stale_total",
            Unit::Count,
            "Total number of reads answered by a stale cache entry."
        );
        describe_counter!(
            "vetrina_cache_revalidate_total",
            Unit::Count,
            "Total number of background revalidations started."
        );
        describe_counter!(
            "vetrina_cache_revalidate_failed_total",
            Unit::Count,
            "Total number of background revalidations that failed."
        );
        describe_histogram!(
            "vetrina_query_ms",
            Unit::Milliseconds,
            "Catalog query latency in milliseconds."
        );
    });
}
