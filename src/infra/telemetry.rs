use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr so the `sitemap` and `check` commands can write their
/// output to stdout.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub(crate) fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "storefront_cache_hit_total",
            Unit::Count,
            "Total number of cache reads served from memory."
        );
        describe_counter!(
            "storefront_cache_miss_total",
            Unit::Count,
            "Total number of cache reads that found an empty slot."
        );
        describe_counter!(
            "storefront_cache_invalidate_total",
            Unit::Count,
            "Total number of cache entries dropped by invalidation."
        );
        describe_histogram!(
            "storefront_upstream_fetch_ms",
            Unit::Milliseconds,
            "Latency of backend fetches in milliseconds."
        );
        describe_counter!(
            "storefront_upstream_error_total",
            Unit::Count,
            "Total number of failed backend fetches."
        );
    });
}
