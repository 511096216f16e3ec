use shared::metrics_defs::{MetricDef, MetricType};

pub const METHOD_CONFIG_RESOLVED: MetricDef = MetricDef {
    name: "channel_config.method_config.resolved",
    metric_type: MetricType::Counter,
    description: "Method configs produced from configuration. Tagged with policy.",
};

pub const POLICY_CONFLICT: MetricDef = MetricDef {
    name: "channel_config.policy.conflict",
    metric_type: MetricType::Counter,
    description: "Configuration nodes rejected for carrying both a retry and a hedging policy",
};

pub const ALL_METRICS: &[MetricDef] = &[METHOD_CONFIG_RESOLVED, POLICY_CONFLICT];
