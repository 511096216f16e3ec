use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Configuration key targeting every method of every service.
pub const FALLBACK_CONFIGURATION_KEY_NAME: &str = "Default";

const SEPARATOR: char = '/';

/// Pattern of the methods a policy applies to.
///
/// - `service` and `method` set: one method of one service.
/// - only `service` set: every method of that service.
/// - neither set ([`MethodName::DEFAULT`]): every method of every service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl MethodName {
    pub const DEFAULT: MethodName = MethodName {
        service: None,
        method: None,
    };

    pub fn service(service: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
            method: None,
        }
    }

    pub fn method(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
            method: Some(method.into()),
        }
    }

    /// Parses a configuration key. Every string maps to some pattern.
    ///
    /// The key is split on the first `/`: `Service/Method` targets one method and
    /// `Service` targets a whole service. Without a `/`, a key equal to
    /// [`FALLBACK_CONFIGURATION_KEY_NAME`] in any casing is the default pattern.
    pub fn parse(key: &str) -> Self {
        match key.split_once(SEPARATOR) {
            Some((service, method)) => Self::method(service, method),
            None if key.eq_ignore_ascii_case(FALLBACK_CONFIGURATION_KEY_NAME) => Self::DEFAULT,
            None => Self::service(key),
        }
    }

    pub fn is_default(&self) -> bool {
        self.service.is_none() && self.method.is_none()
    }
}

impl FromStr for MethodName {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for MethodName {
    fn from(key: &str) -> Self {
        Self::parse(key)
    }
}

impl From<String> for MethodName {
    fn from(key: String) -> Self {
        Self::parse(&key)
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.service, &self.method) {
            (Some(service), Some(method)) => write!(f, "{service}{SEPARATOR}{method}"),
            (Some(service), None) => f.write_str(service),
            (None, Some(method)) => write!(f, "{SEPARATOR}{method}"),
            (None, None) => f.write_str(FALLBACK_CONFIGURATION_KEY_NAME),
        }
    }
}
