use anonymous_user::{AnonymousUserError, ValidationError};
use channel_config::ResolveError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum KeystoneError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("missing configuration section: {0}")]
    MissingSection(String),

    #[error("invalid anonymous user options: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    AnonymousUser(#[from] AnonymousUserError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("could not serialize service config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("could not install logger: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("invalid sentry dsn: {0}")]
    SentryDsn(#[from] sentry::types::ParseDsnError),

    #[error("could not build statsd recorder: {0}")]
    Statsd(#[from] metrics_exporter_statsd::StatsdError),

    #[error("a metrics recorder is already installed")]
    RecorderAlreadySet,
}
