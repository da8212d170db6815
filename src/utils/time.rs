use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Timestamps are stored in the log as local wall-clock time with second resolution.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a timestamp to a string in cafelog.
pub fn format_timestamp(moment: NaiveDateTime) -> String {
    moment.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .with_context(|| format!("Illegal timestamp in log {value:?}"))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .with_context(|| format!("Illegal date in log {value:?}"))
}

/// Whole minutes between two moments. Partial minutes are dropped and a negative span, which can
/// only come from the wall clock moving backwards, counts as zero.
pub fn whole_minutes_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    ((end - start).num_seconds() / 60).max(0)
}
