//! Assigns anonymous visitors a durable identity.
//!
//! The identifier travels in a cookie (named `tid` by default) encoded by a
//! [`CookieCodec`], and is exposed to downstream handlers as a [`Claim`] on the
//! request's [`Principal`].

mod assigner;
pub mod codec;
pub mod config;
pub mod cookies;
pub mod errors;
mod metrics_defs;
mod middleware;
pub mod principal;

pub use assigner::IdentityAssigner;
pub use codec::{Base64CookieCodec, CookieCodec};
pub use config::{AnonymousUserConfig, AnonymousUserOptions, RequestHead};
pub use cookies::{ConnectionInfo, ResponseCookies};
pub use errors::{AnonymousUserError, CodecError, ValidationError};
pub use metrics_defs::ALL_METRICS;
pub use middleware::{AnonymousUserLayer, AnonymousUserService};
pub use principal::{Claim, ClaimsIdentity, Identity, OpaqueIdentity, Principal};
