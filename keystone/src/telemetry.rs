use metrics_exporter_statsd::StatsdBuilder;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LoggingConfig, MetricsConfig};
use crate::errors::KeystoneError;

const METRICS_PREFIX: &str = "keystone";

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// The returned guard flushes pending sentry events on drop and must be held
/// for the lifetime of the process.
pub fn init_logging(
    logging: &LoggingConfig,
) -> Result<Option<sentry::ClientInitGuard>, KeystoneError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)?,
    };

    let guard = match &logging.sentry_dsn {
        Some(dsn) => Some(sentry::init(sentry::ClientOptions {
            dsn: Some(dsn.parse()?),
            release: sentry::release_name!(),
            ..Default::default()
        })),
        None => None,
    };
    let sentry_layer = guard
        .as_ref()
        .map(|_| sentry::integrations::tracing::layer());

    // stdout is reserved for command output
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_layer)
        .try_init()?;

    Ok(guard)
}

/// Installs the statsd recorder when metrics are configured; metrics are
/// dropped otherwise.
pub fn init_metrics(metrics: Option<&MetricsConfig>) -> Result<(), KeystoneError> {
    let Some(config) = metrics else {
        tracing::debug!("No metrics backend configured");
        return Ok(());
    };

    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .build(Some(METRICS_PREFIX))?;
    metrics::set_global_recorder(recorder).map_err(|_| KeystoneError::RecorderAlreadySet)?;

    shared::metrics_defs::describe_all(anonymous_user::ALL_METRICS);
    shared::metrics_defs::describe_all(channel_config::ALL_METRICS);

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "Sending metrics to statsd"
    );
    Ok(())
}
