use chrono::{DateTime, TimeDelta, Utc};
use http::Request;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AnonymousUserOptions, RequestHead};
use crate::cookies::{ResponseCookies, find_cookie, is_secure};
use crate::errors::{AnonymousUserError, ValidationError};
use crate::metrics_defs::{COOKIE_EVICTED, IDENTITY_ISSUED, IDENTITY_RESTORED, REQUEST_SKIPPED};
use crate::principal::{Claim, Principal};

/// Derives the anonymous identity of a request and attaches it as a claim.
#[derive(Clone, Debug)]
pub struct IdentityAssigner {
    options: Arc<AnonymousUserOptions>,
}

impl IdentityAssigner {
    /// Fails when the options are unusable so that a misconfigured service never starts.
    pub fn new(options: AnonymousUserOptions) -> Result<Self, ValidationError> {
        options.validate()?;
        Ok(Self {
            options: Arc::new(options),
        })
    }

    pub fn options(&self) -> &AnonymousUserOptions {
        &self.options
    }

    /// Attaches the anonymous identity claim to the request's [`Principal`].
    ///
    /// The identity is recovered from the cookie when one is present and minted
    /// otherwise. Returns the cookie changes the response must carry: a new
    /// cookie for a freshly minted identity, a deletion for a secure-only cookie
    /// received over an insecure transport, nothing in every other case.
    pub async fn process<B>(
        &self,
        req: &mut Request<B>,
    ) -> Result<ResponseCookies, AnonymousUserError> {
        let options = self.options.as_ref();
        let mut cookies = ResponseCookies::default();

        if let Some(principal) = req.extensions().get::<Principal>() {
            // Already processed, e.g. the middleware is stacked twice.
            if principal.has_claim(&options.claim_type) {
                tracing::debug!(claim_type = %options.claim_type, "Anonymous claim already present");
                return Ok(cookies);
            }

            if options.skip_authenticated && principal.is_authenticated() {
                shared::counter!(REQUEST_SKIPPED, "reason" => "authenticated").increment(1);
                return Ok(cookies);
            }
        }

        let encoded = find_cookie(req.headers(), &options.cookie_name).map(str::to_owned);

        if options.secure && !is_secure(req) {
            if encoded.as_deref().is_some_and(|v| !v.trim().is_empty()) {
                tracing::debug!(cookie = %options.cookie_name, "Evicting secure cookie sent over an insecure transport");
                shared::counter!(COOKIE_EVICTED).increment(1);
                cookies.delete(options.cookie_name.as_str());
            } else {
                shared::counter!(REQUEST_SKIPPED, "reason" => "insecure").increment(1);
            }
            return Ok(cookies);
        }

        let decoded = match encoded.as_deref() {
            Some(value) => options.codec.decode(value).await?,
            None => None,
        };

        let identifier = match decoded.filter(|v| !v.trim().is_empty()) {
            Some(identifier) => {
                shared::counter!(IDENTITY_RESTORED).increment(1);
                identifier
            }
            None => {
                let identifier = (options.identifier_factory)(&RequestHead {
                    method: req.method(),
                    uri: req.uri(),
                    headers: req.headers(),
                });

                match options.codec.encode(&identifier).await? {
                    Some(token) => cookies.set(
                        options.cookie_name.as_str(),
                        token,
                        expiry_from_now(options.expires),
                        options.secure,
                    ),
                    None => tracing::warn!("Identifier factory produced a blank identifier, no cookie issued"),
                }

                tracing::debug!(cookie = %options.cookie_name, "Issued new anonymous identity");
                shared::counter!(IDENTITY_ISSUED).increment(1);
                identifier
            }
        };

        let claim = Claim::new(options.claim_type.as_str(), identifier);
        match req.extensions_mut().get_mut::<Principal>() {
            Some(principal) => principal.merge_claim(claim),
            None => {
                let mut principal = Principal::default();
                principal.merge_claim(claim);
                req.extensions_mut().insert(principal);
            }
        }

        Ok(cookies)
    }
}

fn expiry_from_now(lifetime: Duration) -> DateTime<Utc> {
    let now = Utc::now();
    TimeDelta::from_std(lifetime)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
