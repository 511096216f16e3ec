// Durations in policies follow the protobuf JSON form ("1.5s") when written out.
// When read, the millisecond form ("100ms"), time spans ("00:00:01.5") and bare
// numbers of seconds are accepted as well.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;
use std::time::Duration;

pub fn parse(input: &str) -> Result<Duration, String> {
    let s = input.trim();

    let parsed = if let Some(ms) = s.strip_suffix("ms") {
        parse_seconds(ms).map(|secs| secs / 1000.0)
    } else if let Some(secs) = s.strip_suffix('s') {
        parse_seconds(secs)
    } else if s.contains(':') {
        parse_time_span(s)
    } else {
        parse_seconds(s)
    };

    parsed
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| format!("invalid duration: {input:?}"))
}

fn parse_seconds(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|secs| secs.is_finite())
}

// [d.]hh:mm:ss[.fffffff]
fn parse_time_span(s: &str) -> Option<f64> {
    let mut parts = s.split(':');
    let (hours, minutes, seconds) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let hours = match hours.split_once('.') {
        Some((days, hours)) => days
            .parse::<u64>()
            .ok()?
            .checked_mul(24)?
            .checked_add(hours.parse::<u64>().ok()?)?,
        None => hours.parse::<u64>().ok()?,
    };
    let minutes = minutes.parse::<u64>().ok().filter(|m| *m < 60)?;
    let seconds = parse_seconds(seconds).filter(|s| *s < 60.0)?;

    let whole = hours.checked_mul(3600)?.checked_add(minutes * 60)?;
    Some(whole as f64 + seconds)
}

pub fn format(duration: &Duration) -> String {
    let secs = duration.as_secs();
    let nanos = duration.subsec_nanos();

    if nanos == 0 {
        format!("{secs}s")
    } else if nanos % 1_000_000 == 0 {
        format!("{secs}.{:03}s", nanos / 1_000_000)
    } else if nanos % 1_000 == 0 {
        format!("{secs}.{:06}s", nanos / 1_000)
    } else {
        format!("{secs}.{nanos:09}s")
    }
}

struct DurationVisitor;

impl Visitor<'_> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration such as \"1.5s\", \"250ms\", \"00:00:01\" or a number of seconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
        parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
        Ok(Duration::from_secs(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
        u64::try_from(v)
            .map(Duration::from_secs)
            .map_err(|_| E::custom(format!("negative duration: {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Duration, E> {
        Duration::try_from_secs_f64(v).map_err(E::custom)
    }
}

struct DurationValue(Duration);

impl<'de> Deserialize<'de> for DurationValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DurationVisitor).map(DurationValue)
    }
}

/// Serde adapter for `Option<Duration>` fields.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_str(&format(duration)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Option::<DurationValue>::deserialize(deserializer).map(|value| value.map(|v| v.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse("1s"), Ok(Duration::from_secs(1)));
        assert_eq!(parse("1.5s"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse("00:00:01.5"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse("01:02:03"), Ok(Duration::from_secs(3723)));
        assert_eq!(parse("1.00:00:00"), Ok(Duration::from_secs(86_400)));
        assert_eq!(parse("2"), Ok(Duration::from_secs(2)));
    }

    #[test]
    fn test_parse_errors() {
        for input in [
            "",
            "s",
            "abc",
            "-1s",
            "00:61:00",
            "1:2:3:4",
            "NaNs",
            "infs",
            "999999999999999999.00:00:00",
            "18446744073709551615:00:00",
        ] {
            assert!(parse(input).is_err(), "{input:?} should not parse");
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(format(&Duration::from_secs(5)), "5s");
        assert_eq!(format(&Duration::from_millis(1500)), "1.500s");
        assert_eq!(format(&Duration::from_micros(250)), "0.000250s");
        assert_eq!(format(&Duration::from_nanos(1)), "0.000000001s");
    }
}
