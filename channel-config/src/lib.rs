//! Binds retry and hedging policies from configuration onto gRPC channel options.
//!
//! Each child of a configuration section targets a method pattern:
//!
//! - `Service/Method` configures a single method of a service.
//! - `Service` configures all methods of a service.
//! - `Default` (any casing) configures all methods of all services.
//!
//! A child may carry a `RetryPolicy` or a `HedgingPolicy`, never both.
//!
//! ```yaml
//! grpc_channel:
//!   Default:
//!     RetryPolicy:
//!       MaxAttempts: 3
//!       InitialBackoff: 0.5s
//!       MaxBackoff: 5s
//!       BackoffMultiplier: 2
//!       RetryableStatusCodes: [UNAVAILABLE]
//!   greet.Greeter/SayHello:
//!     HedgingPolicy:
//!       MaxAttempts: 2
//!       HedgingDelay: 100ms
//! ```

mod builder;
mod duration;
pub mod errors;
mod method_name;
mod metrics_defs;
mod policy;
mod resolver;
mod section;
mod service_config;

pub use builder::{ChannelBuilder, ChannelOptionsBuilder, ServiceMethodConfigExt};
pub use errors::ResolveError;
pub use method_name::{FALLBACK_CONFIGURATION_KEY_NAME, MethodName};
pub use metrics_defs::ALL_METRICS;
pub use policy::{HedgingPolicy, RetryPolicy, StatusCode};
pub use resolver::{
    HEDGING_POLICY_SECTION, RETRY_POLICY_SECTION, resolve_default_service_method,
    resolve_service_method, resolve_service_methods,
};
pub use section::ConfigSection;
pub use service_config::{
    ChannelOptions, ChannelPolicyMutation, MethodConfig, MethodPolicy, ServiceConfig,
};
