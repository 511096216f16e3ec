use shared::metrics_defs::{MetricDef, MetricType};

pub const IDENTITY_ISSUED: MetricDef = MetricDef {
    name: "anonymous_user.identity.issued",
    metric_type: MetricType::Counter,
    description: "New anonymous identifiers minted and sent back as a cookie",
};

pub const IDENTITY_RESTORED: MetricDef = MetricDef {
    name: "anonymous_user.identity.restored",
    metric_type: MetricType::Counter,
    description: "Anonymous identifiers recovered from an existing cookie",
};

pub const COOKIE_EVICTED: MetricDef = MetricDef {
    name: "anonymous_user.cookie.evicted",
    metric_type: MetricType::Counter,
    description: "Secure-only cookies deleted because the request used an insecure transport",
};

pub const REQUEST_SKIPPED: MetricDef = MetricDef {
    name: "anonymous_user.request.skipped",
    metric_type: MetricType::Counter,
    description: "Requests left untouched. Tagged with reason.",
};

pub const ALL_METRICS: &[MetricDef] = &[
    IDENTITY_ISSUED,
    IDENTITY_RESTORED,
    COOKIE_EVICTED,
    REQUEST_SKIPPED,
];
