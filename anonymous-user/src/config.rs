use http::{HeaderMap, Method, Uri};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::codec::{Base64CookieCodec, CookieCodec};
use crate::errors::ValidationError;

pub const DEFAULT_COOKIE_NAME: &str = "tid";

/// Roughly ten years.
pub const DEFAULT_EXPIRES_DAYS: u64 = 3652;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// The parts of a request an identifier factory may look at.
#[derive(Debug, Clone, Copy)]
pub struct RequestHead<'a> {
    pub method: &'a Method,
    pub uri: &'a Uri,
    pub headers: &'a HeaderMap,
}

pub type IdentifierFactory = Arc<dyn Fn(&RequestHead<'_>) -> String + Send + Sync>;

/// Runtime options of the middleware.
///
/// Built from [`AnonymousUserConfig`] or with [`AnonymousUserOptions::new`], then
/// customised through the `with_*` methods. Never mutated once the middleware is built.
#[derive(Clone)]
pub struct AnonymousUserOptions {
    /// Name of the cookie carrying the encoded identifier.
    pub cookie_name: String,
    /// Lifetime of a newly issued cookie, counted from the moment it is issued.
    pub expires: Duration,
    /// Type name of the claim holding the identifier.
    pub claim_type: String,
    /// Only accept and issue the cookie over a secure transport.
    pub secure: bool,
    /// Leave requests from authenticated principals untouched.
    pub skip_authenticated: bool,
    pub identifier_factory: IdentifierFactory,
    pub codec: Arc<dyn CookieCodec>,
}

impl AnonymousUserOptions {
    pub fn new(claim_type: impl Into<String>) -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            expires: Duration::from_secs(DEFAULT_EXPIRES_DAYS * SECONDS_PER_DAY),
            claim_type: claim_type.into(),
            secure: false,
            skip_authenticated: true,
            identifier_factory: Arc::new(|_| uuid::Uuid::new_v4().to_string()),
            codec: Arc::new(Base64CookieCodec),
        }
    }

    pub fn with_codec(mut self, codec: impl CookieCodec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn with_identifier_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&RequestHead<'_>) -> String + Send + Sync + 'static,
    {
        self.identifier_factory = Arc::new(factory);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.claim_type.trim().is_empty() {
            return Err(ValidationError::MissingClaimType);
        }
        if self.cookie_name.trim().is_empty() {
            return Err(ValidationError::EmptyCookieName);
        }
        Ok(())
    }
}

impl fmt::Debug for AnonymousUserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnonymousUserOptions")
            .field("cookie_name", &self.cookie_name)
            .field("expires", &self.expires)
            .field("claim_type", &self.claim_type)
            .field("secure", &self.secure)
            .field("skip_authenticated", &self.skip_authenticated)
            .finish_non_exhaustive()
    }
}

/// Middleware configuration as read from the config file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AnonymousUserConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_expires_days")]
    pub expires_days: u64,
    /// Required, there is no built-in claim type.
    pub claim_type: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_skip_authenticated")]
    pub skip_authenticated: bool,
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_expires_days() -> u64 {
    DEFAULT_EXPIRES_DAYS
}

fn default_skip_authenticated() -> bool {
    true
}

impl AnonymousUserConfig {
    /// Converts into validated options using the default codec and identifier factory.
    pub fn into_options(self) -> Result<AnonymousUserOptions, ValidationError> {
        let options = AnonymousUserOptions {
            cookie_name: self.cookie_name,
            expires: Duration::from_secs(self.expires_days.saturating_mul(SECONDS_PER_DAY)),
            claim_type: self.claim_type,
            secure: self.secure,
            skip_authenticated: self.skip_authenticated,
            ..AnonymousUserOptions::new("")
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AnonymousUserOptions::new("anonymous-id");
        assert_eq!(options.cookie_name, "tid");
        assert_eq!(options.expires, Duration::from_secs(3652 * 86_400));
        assert!(!options.secure);
        assert!(options.skip_authenticated);
        assert!(options.validate().is_ok());

        let head = RequestHead {
            method: &Method::GET,
            uri: &Uri::from_static("/"),
            headers: &HeaderMap::new(),
        };
        let first = (options.identifier_factory)(&head);
        let second = (options.identifier_factory)(&head);
        assert!(uuid::Uuid::parse_str(&first).is_ok());
        assert_ne!(first, second);
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            AnonymousUserOptions::new("").validate().unwrap_err(),
            ValidationError::MissingClaimType
        ));
        assert!(matches!(
            AnonymousUserOptions::new("  ").validate().unwrap_err(),
            ValidationError::MissingClaimType
        ));

        let mut options = AnonymousUserOptions::new("anonymous-id");
        options.cookie_name = String::new();
        assert!(matches!(
            options.validate().unwrap_err(),
            ValidationError::EmptyCookieName
        ));
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
claim_type: "urn:visitor:id"
secure: true
expires_days: 30
"#;
        let config: AnonymousUserConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cookie_name, "tid");
        assert!(config.skip_authenticated);

        let options = config.into_options().unwrap();
        assert_eq!(options.claim_type, "urn:visitor:id");
        assert!(options.secure);
        assert_eq!(options.expires, Duration::from_secs(30 * 86_400));
    }

    #[test]
    fn test_config_requires_claim_type() {
        // Missing field
        assert!(serde_yaml::from_str::<AnonymousUserConfig>("cookie_name: tid").is_err());

        // Present but empty
        let config: AnonymousUserConfig = serde_yaml::from_str("claim_type: ''").unwrap();
        assert!(matches!(
            config.into_options().unwrap_err(),
            ValidationError::MissingClaimType
        ));
    }

    #[test]
    fn test_custom_factory() {
        let options = AnonymousUserOptions::new("anonymous-id")
            .with_identifier_factory(|head| format!("visitor-{}", head.uri.path()));
        let head = RequestHead {
            method: &Method::GET,
            uri: &Uri::from_static("/home"),
            headers: &HeaderMap::new(),
        };
        assert_eq!((options.identifier_factory)(&head), "visitor-/home");
    }
}
