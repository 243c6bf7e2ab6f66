//! DATE and DATETIME2(7) payloads.
//!
//! Both use a day count since 0001-01-01 (proleptic Gregorian), stored as the
//! low three bytes of a little-endian `i32`. DATETIME2 prefixes it with the
//! low five bytes of a little-endian `u64` count of 100ns ticks since midnight.

use crate::error::ValueError;
use crate::value::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const TICKS_PER_SECOND: u64 = 10_000_000;
const NANOS_PER_TICK: u64 = 100;
/// Day count of 9999-12-31, the last date SQL Server stores.
const MAX_DAYS: i32 = 3_652_058;

/// Days between 0001-01-01 and `date`.
pub fn days_since_epoch(date: NaiveDate) -> i32 {
    // num_days_from_ce() counts 0001-01-01 as day 1.
    date.num_days_from_ce() - 1
}

/// 100-nanosecond ticks since midnight.
pub fn ticks_since_midnight(time: NaiveTime) -> u64 {
    u64::from(time.num_seconds_from_midnight()) * TICKS_PER_SECOND
        + u64::from(time.nanosecond()) / NANOS_PER_TICK
}

/// The 3-byte day count; dates outside 0001-01-01..=9999-12-31 would wrap.
fn date_bytes(date: NaiveDate) -> Result<[u8; 3], ValueError> {
    let days = days_since_epoch(date);
    if !(0..=MAX_DAYS).contains(&days) {
        return Err(ValueError::coercion(format!(
            "date {} is outside the SQL Server range 0001-01-01..9999-12-31",
            date
        )));
    }
    let b = days.to_le_bytes();
    Ok([b[0], b[1], b[2]])
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let t = s.trim();
    t.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M").ok())
        .or_else(|| parse_date(t).map(|d| d.and_time(NaiveTime::MIN)))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn to_date(value: &Value) -> Result<NaiveDate, ValueError> {
    match value {
        Value::Date(d) => Ok(*d),
        Value::DateTime(dt) => Ok(dt.date()),
        Value::Text(s) => parse_date(s)
            .or_else(|| parse_datetime(s).map(|dt| dt.date()))
            .ok_or_else(|| ValueError::coercion(format!("cannot parse {:?} as DATE", s))),
        other => Err(ValueError::coercion(format!(
            "cannot convert {} value to DATE",
            other.kind()
        ))),
    }
}

fn to_datetime(value: &Value) -> Result<NaiveDateTime, ValueError> {
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
        Value::Text(s) => parse_datetime(s)
            .ok_or_else(|| ValueError::coercion(format!("cannot parse {:?} as DATETIME2", s))),
        other => Err(ValueError::coercion(format!(
            "cannot convert {} value to DATETIME2",
            other.kind()
        ))),
    }
}

pub(super) fn date(value: &Value) -> Result<[u8; 3], ValueError> {
    date_bytes(to_date(value)?)
}

pub(super) fn datetime2(value: &Value) -> Result<[u8; 8], ValueError> {
    let dt = to_datetime(value)?;
    // chrono carries a leap second as nanosecond() >= 1e9.
    if dt.time().nanosecond() >= 1_000_000_000 {
        return Err(ValueError::coercion(format!(
            "leap second in {} has no DATETIME2 representation",
            dt
        )));
    }
    let ticks = ticks_since_midnight(dt.time()).to_le_bytes();
    let date = date_bytes(dt.date())?;
    let mut out = [0u8; 8];
    out[..5].copy_from_slice(&ticks[..5]);
    out[5..].copy_from_slice(&date);
    Ok(out)
}
