//! Timestamp helpers shared by the domain model and the storage backends
//!
//! Timestamps are kept at microsecond precision and serialized in a fixed-width
//! RFC 3339 form (`2026-10-18T09:30:00.000000Z`), so the lexical order of the
//! stored strings equals their chronological order. Document stores can then
//! sort on `createdAt` without a native date type.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer, de};

/// Current time truncated to microseconds
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Next modification time after `previous`
///
/// Returns the current time, or `previous` plus one microsecond when the clock
/// has not moved past it, so `updated_at` strictly increases on every mutation.
pub fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current > previous {
        current
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Format a timestamp in the fixed-width stored form
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse<E: de::Error>(raw: &str) -> Result<DateTime<Utc>, E> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc).trunc_subsecs(6))
        .map_err(|e| E::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw)
}

/// Same encoding for nullable timestamps (`null` ⇔ `None`)
pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => serializer.serialize_some(&super::format(t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse(&raw).map(Some),
            None => Ok(None),
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
///
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    option::deserialize(deserializer).map(Some)
}
