use serde::de::DeserializeOwned;

use crate::errors::ResolveError;
use crate::method_name::MethodName;
use crate::metrics_defs::{METHOD_CONFIG_RESOLVED, POLICY_CONFLICT};
use crate::policy::{HedgingPolicy, RetryPolicy};
use crate::section::ConfigSection;
use crate::service_config::ChannelPolicyMutation;

pub const RETRY_POLICY_SECTION: &str = "RetryPolicy";
pub const HEDGING_POLICY_SECTION: &str = "HedgingPolicy";

/// Resolves one mutation per child of `section`, in enumeration order.
///
/// Each child key is parsed with [`MethodName::parse`]. Children without a
/// recognised policy are skipped. A child carrying both policies fails the
/// whole call.
pub fn resolve_service_methods(
    section: &ConfigSection<'_>,
) -> Result<Vec<ChannelPolicyMutation>, ResolveError> {
    let mut mutations = Vec::new();

    for child in section.children() {
        let method_name = MethodName::parse(child.key());
        if let Some(mutation) = resolve_service_method(method_name, &child)? {
            mutations.push(mutation);
        }
    }

    tracing::debug!(
        section = section.path(),
        method_configs = mutations.len(),
        "Resolved service method policies"
    );
    Ok(mutations)
}

/// Resolves the policy found directly under `section` for `method_name`.
///
/// Returns `None` when neither a `RetryPolicy` nor a `HedgingPolicy` is configured.
pub fn resolve_service_method(
    method_name: impl Into<MethodName>,
    section: &ConfigSection<'_>,
) -> Result<Option<ChannelPolicyMutation>, ResolveError> {
    let method_name = method_name.into();

    let retry_policy = load_policy::<RetryPolicy>(section, RETRY_POLICY_SECTION)?;
    let hedging_policy = load_policy::<HedgingPolicy>(section, HEDGING_POLICY_SECTION)?;

    let mutation = match (retry_policy, hedging_policy) {
        (None, None) => {
            tracing::debug!(method = %method_name, section = section.path(), "No policy configured");
            return Ok(None);
        }
        (Some(policy), None) => ChannelPolicyMutation::retry(method_name, policy),
        (None, Some(policy)) => ChannelPolicyMutation::hedging(method_name, policy),
        (Some(_), Some(_)) => {
            shared::counter!(POLICY_CONFLICT).increment(1);
            return Err(ResolveError::ConflictingPolicies {
                method: method_name,
                path: section.path().to_string(),
            });
        }
    };

    shared::counter!(METHOD_CONFIG_RESOLVED, "policy" => mutation.policy().kind()).increment(1);
    Ok(Some(mutation))
}

/// Resolves the fallback policy applying to every method, read from the
/// `RetryPolicy`/`HedgingPolicy` children of `section` itself.
pub fn resolve_default_service_method(
    section: &ConfigSection<'_>,
) -> Result<Option<ChannelPolicyMutation>, ResolveError> {
    resolve_service_method(MethodName::DEFAULT, section)
}

fn load_policy<T: DeserializeOwned>(
    section: &ConfigSection<'_>,
    name: &str,
) -> Result<Option<T>, ResolveError> {
    let policy_section = section.get_section(name);
    policy_section.bind().map_err(|source| ResolveError::Bind {
        path: policy_section.path().to_string(),
        source,
    })
}
