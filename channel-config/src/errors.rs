use thiserror::Error;

use crate::method_name::MethodName;

/// Errors raised while resolving method policies from configuration.
///
/// Both variants point at a configuration mistake and abort the resolution
/// call; no partial result is returned.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("a retry policy can't be combined with a hedging policy (method {method}, section {path:?})")]
    ConflictingPolicies { method: MethodName, path: String },

    #[error("could not bind {path:?}: {source}")]
    Bind {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
