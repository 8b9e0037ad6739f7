use std::{io, sync::Once};

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
/// Logs go to stderr; stdout is reserved for command output.
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
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(io::stderr)
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

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "roster_remote_fetch_total",
            Unit::Count,
            "Total number of roster feed fetches started."
        );
        describe_counter!(
            "roster_remote_fetch_failed_total",
            Unit::Count,
            "Total number of roster loads that ended in an error."
        );
        describe_histogram!(
            "roster_remote_fetch_ms",
            Unit::Milliseconds,
            "Roster feed fetch and mapping latency in milliseconds."
        );
        describe_counter!(
            "roster_follow_toggle_total",
            Unit::Count,
            "Total number of follow toggles by result."
        );
        describe_counter!(
            "roster_sessions_invalidated_total",
            Unit::Count,
            "Total number of paging sessions invalidated by follow toggles."
        );
    });
}
