//! # Temporal Types — Canonical Wire Timestamps
//!
//! Defines `Timestamp`, the canonical form of every datetime-valued field
//! (`published`, `updated`, `startTime`, `endTime`, `deleted`).
//!
//! ## Canonicalization Rule
//!
//! Wire payloads may carry any RFC 3339 offset (`Z`, `+00:00`, `-04:00`).
//! Ingestion converts to UTC; rendering always uses the `Z` suffix.
//! Sub-second precision is payload and survives the round trip, so
//! `2026-01-15T08:00:00.123-04:00` canonicalizes to
//! `2026-01-15T12:00:00.123Z` and re-validates to the same instant.
//!
//! ## Vocabulary Reference
//!
//! <https://www.w3.org/TR/activitystreams-core/#dates>

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A datetime-valued field could not be parsed as RFC 3339.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid RFC 3339 timestamp {input:?}: {detail}")]
pub struct TimestampParseError {
    /// The rejected input string.
    pub input: String,
    /// Parser detail from chrono.
    pub detail: String,
}

/// A UTC timestamp with canonical `Z`-suffix rendering.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`.
/// - [`Timestamp::parse()`] — from an RFC 3339 string with any offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse a timestamp from an RFC 3339 string, accepting any offset
    /// and converting to UTC.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid RFC 3339.
    pub fn parse(s: &str) -> Result<Self, TimestampParseError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| TimestampParseError {
            input: s.to_string(),
            detail: e.to_string(),
        })?;
        Ok(Self(dt.with_timezone(&Utc)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as RFC 3339 with `Z` suffix.
    ///
    /// Whole-second instants render without a fraction
    /// (`2026-01-15T12:00:00Z`); sub-second instants keep millisecond,
    /// microsecond, or nanosecond digits as needed.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

// Manual serde impls pin the canonical string form. Deriving would accept
// exactly what chrono accepts but emit whatever chrono's default emits,
// which is not guaranteed to keep the Z suffix across versions.
impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Timestamp::parse(&s).map_err(serde::de::Error::custom)
    }
}
