use crate::errors::ResolveError;
use crate::method_name::MethodName;
use crate::policy::{HedgingPolicy, RetryPolicy};
use crate::resolver::{resolve_default_service_method, resolve_service_method, resolve_service_methods};
use crate::section::ConfigSection;
use crate::service_config::{ChannelOptions, ChannelPolicyMutation};

/// Anything that accepts channel option mutations.
///
/// Mutations are recorded in order; applying them later to a [`ChannelOptions`]
/// appends one method config per mutation.
pub trait ChannelBuilder {
    fn configure_channel(&mut self, mutation: ChannelPolicyMutation);
}

impl ChannelBuilder for ChannelOptions {
    fn configure_channel(&mut self, mutation: ChannelPolicyMutation) {
        mutation.apply(self);
    }
}

/// Collects mutations and produces the resulting [`ChannelOptions`] on demand.
#[derive(Clone, Debug, Default)]
pub struct ChannelOptionsBuilder {
    mutations: Vec<ChannelPolicyMutation>,
}

impl ChannelOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mutations(&self) -> &[ChannelPolicyMutation] {
        &self.mutations
    }

    pub fn build(&self) -> ChannelOptions {
        let mut options = ChannelOptions::default();
        for mutation in &self.mutations {
            mutation.apply(&mut options);
        }
        options
    }
}

impl ChannelBuilder for ChannelOptionsBuilder {
    fn configure_channel(&mut self, mutation: ChannelPolicyMutation) {
        self.mutations.push(mutation);
    }
}

/// Registers retry and hedging policies on a [`ChannelBuilder`].
///
/// The `configure_*` methods read policies from configuration. They resolve
/// everything first and only then touch the builder, so an error leaves it as
/// it was.
pub trait ServiceMethodConfigExt: ChannelBuilder + Sized {
    /// Registers a policy for every child of `section` that carries one.
    fn configure_service_methods(
        &mut self,
        section: &ConfigSection<'_>,
    ) -> Result<&mut Self, ResolveError> {
        for mutation in resolve_service_methods(section)? {
            self.configure_channel(mutation);
        }
        Ok(self)
    }

    fn configure_service_method(
        &mut self,
        method_name: impl Into<MethodName>,
        section: &ConfigSection<'_>,
    ) -> Result<&mut Self, ResolveError> {
        if let Some(mutation) = resolve_service_method(method_name, section)? {
            self.configure_channel(mutation);
        }
        Ok(self)
    }

    fn configure_default_service_method(
        &mut self,
        section: &ConfigSection<'_>,
    ) -> Result<&mut Self, ResolveError> {
        if let Some(mutation) = resolve_default_service_method(section)? {
            self.configure_channel(mutation);
        }
        Ok(self)
    }

    fn set_service_method_retry_policy(
        &mut self,
        method_name: impl Into<MethodName>,
        policy: RetryPolicy,
    ) -> &mut Self {
        self.configure_channel(ChannelPolicyMutation::retry(method_name, policy));
        self
    }

    fn set_service_method_hedging_policy(
        &mut self,
        method_name: impl Into<MethodName>,
        policy: HedgingPolicy,
    ) -> &mut Self {
        self.configure_channel(ChannelPolicyMutation::hedging(method_name, policy));
        self
    }

    fn set_default_retry_policy(&mut self, policy: RetryPolicy) -> &mut Self {
        self.set_service_method_retry_policy(MethodName::DEFAULT, policy)
    }

    fn set_default_hedging_policy(&mut self, policy: HedgingPolicy) -> &mut Self {
        self.set_service_method_hedging_policy(MethodName::DEFAULT, policy)
    }
}

impl<T: ChannelBuilder> ServiceMethodConfigExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::StatusCode;
    use crate::service_config::MethodPolicy;
    use serde_yaml::Value;
    use std::time::Duration;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts: Some(max_attempts),
            retryable_status_codes: vec![StatusCode::Unavailable],
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn test_configure_service_methods() {
        let value = parse(
            r#"
grpc_channel:
  Default:
    RetryPolicy: {MaxAttempts: 3, RetryableStatusCodes: [UNAVAILABLE]}
  greet.Greeter/SayHello:
    HedgingPolicy: {MaxAttempts: 2, HedgingDelay: 100ms}
"#,
        );
        let root = ConfigSection::root(&value);

        let mut builder = ChannelOptionsBuilder::new();
        builder
            .configure_service_methods(&root.get_section("grpc_channel"))
            .unwrap();

        let method_configs = builder.build().service_config.unwrap().method_configs;
        assert_eq!(method_configs.len(), 2);
        assert_eq!(method_configs[0].names, vec![MethodName::DEFAULT]);
        assert_eq!(method_configs[0].retry_policy, Some(retry(3)));
        assert_eq!(
            method_configs[1].names,
            vec![MethodName::method("greet.Greeter", "SayHello")]
        );
        assert_eq!(
            method_configs[1].hedging_policy,
            Some(HedgingPolicy {
                max_attempts: Some(2),
                hedging_delay: Some(Duration::from_millis(100)),
                non_fatal_status_codes: vec![],
            })
        );
    }

    #[test]
    fn test_conflict_leaves_builder_unchanged() {
        let value = parse(
            r#"
grpc_channel:
  First:
    RetryPolicy: {MaxAttempts: 2}
  Second:
    RetryPolicy: {MaxAttempts: 2}
    HedgingPolicy: {MaxAttempts: 2}
"#,
        );
        let root = ConfigSection::root(&value);

        let mut builder = ChannelOptionsBuilder::new();
        builder.set_default_retry_policy(retry(1));

        let result = builder.configure_service_methods(&root.get_section("grpc_channel"));
        assert!(matches!(result, Err(ResolveError::ConflictingPolicies { .. })));
        assert_eq!(builder.mutations().len(), 1);
        assert!(builder.mutations()[0].method_name().is_default());
    }

    #[test]
    fn test_configure_single_and_default_method() {
        let value = parse(
            r#"
retry:
  RetryPolicy: {MaxAttempts: 5}
hedging:
  HedgingPolicy: {MaxAttempts: 4}
nothing:
  Foo: Bar
"#,
        );
        let root = ConfigSection::root(&value);

        let mut options = ChannelOptions::default();
        options
            .configure_service_method("Foo/Bar", &root.get_section("retry"))
            .unwrap()
            .configure_default_service_method(&root.get_section("hedging"))
            .unwrap()
            .configure_default_service_method(&root.get_section("nothing"))
            .unwrap();

        let method_configs = options.service_config.unwrap().method_configs;
        assert_eq!(method_configs.len(), 2);
        assert_eq!(method_configs[0].names, vec![MethodName::method("Foo", "Bar")]);
        assert_eq!(
            method_configs[0].retry_policy.as_ref().and_then(|p| p.max_attempts),
            Some(5)
        );
        assert_eq!(method_configs[1].names, vec![MethodName::DEFAULT]);
        assert_eq!(
            method_configs[1].hedging_policy.as_ref().and_then(|p| p.max_attempts),
            Some(4)
        );
    }

    #[test]
    fn test_nothing_configured_keeps_service_config_unset() {
        let value = parse("grpc_channel:\n  Foo: Bar\n");
        let root = ConfigSection::root(&value);

        let mut options = ChannelOptions::default();
        options
            .configure_service_methods(&root.get_section("grpc_channel"))
            .unwrap();
        assert!(options.service_config.is_none());
    }

    #[test]
    fn test_programmatic_setters() {
        let hedging = HedgingPolicy {
            max_attempts: Some(2),
            ..HedgingPolicy::default()
        };

        let mut builder = ChannelOptionsBuilder::new();
        builder
            .set_default_retry_policy(retry(3))
            .set_default_hedging_policy(hedging.clone())
            .set_service_method_retry_policy("Foo", retry(4))
            .set_service_method_hedging_policy(MethodName::method("Foo", "Bar"), hedging.clone());

        let kinds: Vec<_> = builder
            .mutations()
            .iter()
            .map(|m| (m.method_name().to_string(), m.policy().kind()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("Default".to_string(), "retry"),
                ("Default".to_string(), "hedging"),
                ("Foo".to_string(), "retry"),
                ("Foo/Bar".to_string(), "hedging"),
            ]
        );
        assert_eq!(
            builder.mutations()[3].policy(),
            &MethodPolicy::Hedging(hedging)
        );

        // Building twice yields the same options
        assert_eq!(builder.build(), builder.build());
        assert_eq!(builder.build().service_config.unwrap().method_configs.len(), 4);
    }
}
