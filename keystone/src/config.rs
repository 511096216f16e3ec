use anonymous_user::{AnonymousUserConfig, AnonymousUserOptions, ValidationError};
use serde::Deserialize;
use serde_yaml::Value;
use std::fs::File;

#[derive(Deserialize, Debug, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct LoggingConfig {
    /// Used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    pub sentry_dsn: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            sentry_dsn: None,
        }
    }
}

#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct AnonymousUserServerConfig {
    pub listener: Listener,
    #[serde(flatten)]
    pub middleware: AnonymousUserConfig,
}

impl AnonymousUserServerConfig {
    pub fn options(&self) -> Result<AnonymousUserOptions, ConfigError> {
        Ok(self.middleware.clone().into_options()?)
    }
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub anonymous_user: Option<AnonymousUserServerConfig>,
    /// The whole document, for sections bound on demand such as gRPC channel policies.
    #[serde(skip)]
    pub raw: Value,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let raw: Value = serde_yaml::from_reader(file)?;

        let mut config: Config = serde_yaml::from_value(raw.clone())?;
        config.raw = raw;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(anonymous_user) = &self.anonymous_user {
            anonymous_user.listener.validate()?;
            anonymous_user.options()?;
        }
        Ok(())
    }

    pub fn logging(&self) -> LoggingConfig {
        match &self.common.logging {
            Some(logging) => LoggingConfig {
                level: logging.level.clone(),
                sentry_dsn: logging.sentry_dsn.clone(),
            },
            None => LoggingConfig::default(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid port")]
    InvalidPort,
    #[error("invalid anonymous_user config: {0}")]
    InvalidAnonymousUser(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            logging:
                level: debug
                sentry_dsn: https://key@sentry.example.com/1
            anonymous_user:
                listener:
                    host: 0.0.0.0
                    port: 8080
                claim_type: urn:visitor:id
                cookie_name: visitor
                expires_days: 30
                secure: true
            grpc_channel:
                Default:
                    RetryPolicy:
                        MaxAttempts: 3
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        config.validate().expect("valid config");

        assert_eq!(
            config.common.metrics,
            Some(MetricsConfig {
                statsd_host: "127.0.0.1".into(),
                statsd_port: 8125,
            })
        );
        assert_eq!(config.logging().level, "debug");

        let anonymous_user = config.anonymous_user.as_ref().expect("anonymous_user");
        assert_eq!(anonymous_user.listener.port, 8080);

        let options = anonymous_user.options().unwrap();
        assert_eq!(options.cookie_name, "visitor");
        assert_eq!(options.claim_type, "urn:visitor:id");
        assert_eq!(options.expires, Duration::from_secs(30 * 86_400));
        assert!(options.secure);
        assert!(options.skip_authenticated);

        assert!(config.raw.get("grpc_channel").is_some());
    }

    #[test]
    fn minimal_config() {
        let tmp = write_tmp_file("grpc_channel: {}\n");
        let config = Config::from_file(tmp.path()).expect("load config");

        assert!(config.validate().is_ok());
        assert!(config.anonymous_user.is_none());
        assert_eq!(config.logging(), LoggingConfig::default());
    }

    #[test]
    fn validation_errors() {
        let yaml = r#"
            anonymous_user:
                listener:
                    host: 0.0.0.0
                    port: 0
                claim_type: urn:visitor:id
            "#;
        let config = Config::from_file(write_tmp_file(yaml).path()).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPort)));

        let yaml = r#"
            anonymous_user:
                listener:
                    host: 0.0.0.0
                    port: 8080
                claim_type: ""
            "#;
        let config = Config::from_file(write_tmp_file(yaml).path()).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAnonymousUser(ValidationError::MissingClaimType))
        ));
    }

    #[test]
    fn load_and_parse_errors() {
        let missing = std::path::Path::new("/nonexistent/keystone.yaml");
        assert!(matches!(
            Config::from_file(missing),
            Err(ConfigError::LoadError(_))
        ));

        // claim_type is required
        let yaml = r#"
            anonymous_user:
                listener:
                    host: 0.0.0.0
                    port: 8080
            "#;
        assert!(matches!(
            Config::from_file(write_tmp_file(yaml).path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
