use serde::Serialize;

use crate::method_name::MethodName;
use crate::policy::{HedgingPolicy, RetryPolicy};

/// Per-method configuration entry, serialized in the gRPC service config form.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodConfig {
    #[serde(rename = "name")]
    pub names: Vec<MethodName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hedging_policy: Option<HedgingPolicy>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ServiceConfig {
    #[serde(rename = "methodConfig")]
    pub method_configs: Vec<MethodConfig>,
}

/// The subset of channel options this crate configures.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelOptions {
    pub service_config: Option<ServiceConfig>,
}

/// The one policy a mutation carries.
#[derive(Clone, Debug, PartialEq)]
pub enum MethodPolicy {
    Retry(RetryPolicy),
    Hedging(HedgingPolicy),
}

impl MethodPolicy {
    pub fn kind(&self) -> &'static str {
        match self {
            MethodPolicy::Retry(_) => "retry",
            MethodPolicy::Hedging(_) => "hedging",
        }
    }
}

/// Attaches one policy to one method pattern of a channel.
///
/// Applying appends a new method config; existing entries, including ones
/// targeting the same pattern, are left alone.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelPolicyMutation {
    method_name: MethodName,
    policy: MethodPolicy,
}

impl ChannelPolicyMutation {
    pub fn retry(method_name: impl Into<MethodName>, policy: RetryPolicy) -> Self {
        Self {
            method_name: method_name.into(),
            policy: MethodPolicy::Retry(policy),
        }
    }

    pub fn hedging(method_name: impl Into<MethodName>, policy: HedgingPolicy) -> Self {
        Self {
            method_name: method_name.into(),
            policy: MethodPolicy::Hedging(policy),
        }
    }

    pub fn method_name(&self) -> &MethodName {
        &self.method_name
    }

    pub fn policy(&self) -> &MethodPolicy {
        &self.policy
    }

    pub fn method_config(&self) -> MethodConfig {
        let (retry_policy, hedging_policy) = match &self.policy {
            MethodPolicy::Retry(policy) => (Some(policy.clone()), None),
            MethodPolicy::Hedging(policy) => (None, Some(policy.clone())),
        };

        MethodConfig {
            names: vec![self.method_name.clone()],
            retry_policy,
            hedging_policy,
        }
    }

    pub fn apply(&self, options: &mut ChannelOptions) {
        options
            .service_config
            .get_or_insert_with(ServiceConfig::default)
            .method_configs
            .push(self.method_config());
    }
}
