// Just enough cookie handling for a single named cookie: reading it from the
// request `Cookie` headers and rendering `Set-Cookie` directives.

use chrono::{DateTime, Utc};
use http::header::{COOKIE, HeaderMap, HeaderValue, SET_COOKIE};
use http::{Request, uri::Scheme};

use crate::errors::AnonymousUserError;

const DELETED_EXPIRES: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Transport details of the connection a request arrived on, inserted into the
/// request extensions by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub secure: bool,
}

/// Whether the request arrived over a secure transport.
///
/// Relies on [`ConnectionInfo`] when present and falls back to the URI scheme.
pub fn is_secure<B>(req: &Request<B>) -> bool {
    match req.extensions().get::<ConnectionInfo>() {
        Some(info) => info.secure,
        None => req.uri().scheme() == Some(&Scheme::HTTPS),
    }
}

/// Returns the value of the first cookie called `name` across all `Cookie` headers.
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| strip_quotes(value.trim()))
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Formats a timestamp as an IMF-fixdate, the format of the `Expires` attribute.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum CookieDirective {
    Set {
        name: String,
        value: String,
        expires: DateTime<Utc>,
        secure: bool,
    },
    Delete {
        name: String,
    },
}

impl CookieDirective {
    fn render(&self) -> String {
        match self {
            CookieDirective::Set {
                name,
                value,
                expires,
                secure,
            } => {
                let mut header = format!("{name}={value}; Expires={}; Path=/", http_date(*expires));
                if *secure {
                    header.push_str("; Secure");
                }
                header
            }
            CookieDirective::Delete { name } => {
                format!("{name}=; Expires={DELETED_EXPIRES}; Path=/")
            }
        }
    }
}

/// Cookie changes to apply to the response once the inner service has produced it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseCookies {
    directives: Vec<CookieDirective>,
}

impl ResponseCookies {
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        expires: DateTime<Utc>,
        secure: bool,
    ) {
        self.directives.push(CookieDirective::Set {
            name: name.into(),
            value: value.into(),
            expires,
            secure,
        });
    }

    pub fn delete(&mut self, name: impl Into<String>) {
        self.directives
            .push(CookieDirective::Delete { name: name.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Rendered `Set-Cookie` header values, in the order they were added.
    pub fn header_values(&self) -> Vec<String> {
        self.directives.iter().map(CookieDirective::render).collect()
    }

    /// Appends one `Set-Cookie` header per directive.
    pub fn write_to(&self, headers: &mut HeaderMap) -> Result<(), AnonymousUserError> {
        for value in self.header_values() {
            headers.append(SET_COOKIE, HeaderValue::from_str(&value)?);
        }
        Ok(())
    }
}
