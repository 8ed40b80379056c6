//! Millisecond-precision UTC timestamps in the `YYYY-MM-DDTHH:MM:SS.mmmZ` form.
//!
//! Every timestamp is truncated to milliseconds when it is created or parsed,
//! so a value survives a save/load cycle unchanged.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::Serializer;

/// Years outside this range do not format as a four-digit RFC 3339 year.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` day read as midnight UTC.
///
/// Values whose UTC year falls outside 0000..=9999 are rejected, since they
/// could not be written back in the same form.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc).trunc_subsecs(3)),
        Err(_) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|midnight| Utc.from_utc_datetime(&midnight)),
    };
    parsed.filter(|ts| YEAR_RANGE.contains(&ts.year()))
}

pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

pub fn serialize_optional<S>(
    ts: &Option<DateTime<Utc>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match ts {
        Some(ts) => serializer.serialize_str(&format(ts)),
        None => serializer.serialize_none(),
    }
}
