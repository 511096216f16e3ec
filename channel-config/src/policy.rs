use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::duration;

/// gRPC status codes, as referenced by retry and hedging policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

const ALL_STATUS_CODES: [StatusCode; 17] = [
    StatusCode::Ok,
    StatusCode::Cancelled,
    StatusCode::Unknown,
    StatusCode::InvalidArgument,
    StatusCode::DeadlineExceeded,
    StatusCode::NotFound,
    StatusCode::AlreadyExists,
    StatusCode::PermissionDenied,
    StatusCode::ResourceExhausted,
    StatusCode::FailedPrecondition,
    StatusCode::Aborted,
    StatusCode::OutOfRange,
    StatusCode::Unimplemented,
    StatusCode::Internal,
    StatusCode::Unavailable,
    StatusCode::DataLoss,
    StatusCode::Unauthenticated,
];

impl StatusCode {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| ALL_STATUS_CODES.get(i).copied())
    }

    /// Canonical name used in gRPC service configs.
    pub const fn as_str(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Cancelled => "CANCELLED",
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::AlreadyExists => "ALREADY_EXISTS",
            StatusCode::PermissionDenied => "PERMISSION_DENIED",
            StatusCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Aborted => "ABORTED",
            StatusCode::OutOfRange => "OUT_OF_RANGE",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unavailable => "UNAVAILABLE",
            StatusCode::DataLoss => "DATA_LOSS",
            StatusCode::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusCode {
    type Err = String;

    /// Accepts any casing, with or without underscores: `DEADLINE_EXCEEDED`,
    /// `DeadlineExceeded` and `deadlineexceeded` are the same code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        ALL_STATUS_CODES
            .iter()
            .copied()
            .find(|code| {
                code.as_str()
                    .chars()
                    .filter(|c| *c != '_')
                    .map(|c| c.to_ascii_lowercase())
                    .eq(wanted.chars())
            })
            .ok_or_else(|| format!("unknown status code: {s:?}"))
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct StatusCodeVisitor;

impl Visitor<'_> for StatusCodeVisitor {
    type Value = StatusCode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a gRPC status code name or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<StatusCode, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<StatusCode, E> {
        StatusCode::from_code(v).ok_or_else(|| E::custom(format!("unknown status code: {v}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<StatusCode, E> {
        u64::try_from(v)
            .ok()
            .and_then(StatusCode::from_code)
            .ok_or_else(|| E::custom(format!("unknown status code: {v}")))
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StatusCodeVisitor)
    }
}

/// Retry policy attached to a method pattern. Passed through to the channel untouched.
///
/// Keys bind in PascalCase, camelCase, snake_case or the lowercase form
/// produced by [`ConfigSection::bind`](crate::ConfigSection::bind).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    #[serde(
        default,
        alias = "MaxAttempts",
        alias = "max_attempts",
        alias = "maxattempts",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_attempts: Option<u32>,

    #[serde(
        default,
        alias = "InitialBackoff",
        alias = "initial_backoff",
        alias = "initialbackoff",
        with = "duration::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_backoff: Option<Duration>,

    #[serde(
        default,
        alias = "MaxBackoff",
        alias = "max_backoff",
        alias = "maxbackoff",
        with = "duration::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_backoff: Option<Duration>,

    #[serde(
        default,
        alias = "BackoffMultiplier",
        alias = "backoff_multiplier",
        alias = "backoffmultiplier",
        skip_serializing_if = "Option::is_none"
    )]
    pub backoff_multiplier: Option<f64>,

    #[serde(
        default,
        alias = "RetryableStatusCodes",
        alias = "retryable_status_codes",
        alias = "retryablestatuscodes"
    )]
    pub retryable_status_codes: Vec<StatusCode>,
}

/// Hedging policy attached to a method pattern. Passed through to the channel untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgingPolicy {
    #[serde(
        default,
        alias = "MaxAttempts",
        alias = "max_attempts",
        alias = "maxattempts",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_attempts: Option<u32>,

    #[serde(
        default,
        alias = "HedgingDelay",
        alias = "hedging_delay",
        alias = "hedgingdelay",
        with = "duration::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub hedging_delay: Option<Duration>,

    #[serde(
        default,
        alias = "NonFatalStatusCodes",
        alias = "non_fatal_status_codes",
        alias = "nonfatalstatuscodes"
    )]
    pub non_fatal_status_codes: Vec<StatusCode>,
}
