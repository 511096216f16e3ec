use channel_config::{ChannelOptions, ChannelOptionsBuilder, ConfigSection, ServiceMethodConfigExt};
use serde_yaml::Value;

use crate::errors::KeystoneError;

pub const DEFAULT_SECTION: &str = "grpc_channel";

/// Resolves the policies under `section` of the config document.
///
/// With `default_only`, only the section's own `RetryPolicy`/`HedgingPolicy`
/// are read and applied to every method.
pub fn resolve_channel_options(
    raw: &Value,
    section: &str,
    default_only: bool,
) -> Result<ChannelOptions, KeystoneError> {
    let root = ConfigSection::root(raw);
    let section = root.get_section(section);
    if !section.exists() {
        return Err(KeystoneError::MissingSection(section.path().to_string()));
    }

    let mut builder = ChannelOptionsBuilder::new();
    if default_only {
        builder.configure_default_service_method(&section)?;
    } else {
        builder.configure_service_methods(&section)?;
    }

    tracing::info!(
        section = section.path(),
        method_configs = builder.mutations().len(),
        "Resolved channel options"
    );
    Ok(builder.build())
}

/// Renders the gRPC service config JSON. An empty `methodConfig` list is
/// printed when nothing was configured.
pub fn render(options: &ChannelOptions) -> Result<String, KeystoneError> {
    let service_config = options.service_config.clone().unwrap_or_default();
    Ok(serde_json::to_string_pretty(&service_config)?)
}
