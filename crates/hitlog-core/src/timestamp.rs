// Timestamp normalization for both log grammars
// Access log: 10/Oct/2023:13:55:36 -0700
// Error log:  Tue Oct 10 13:55:36.123456 2023 (no zone, read in the configured offset)

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

const ACCESS_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";
const ERROR_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Seconds in one timeline bucket
pub const BUCKET_SECONDS: i64 = 3600;

/// Turns native log timestamps into epoch seconds.
///
/// Unparsable input yields the time the run started instead of an error, so a
/// bad timestamp misplaces one record on the timeline but never drops it.
#[derive(Debug, Clone)]
pub struct TimestampNormalizer {
    run_started: i64,
    offset: FixedOffset,
    fraction: Regex,
}

impl TimestampNormalizer {
    pub fn new(run_started: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            run_started: run_started.timestamp(),
            offset,
            fraction: Regex::new(r"\.\d+").unwrap(),
        }
    }

    pub fn run_started(&self) -> i64 {
        self.run_started
    }

    /// Access timestamp, falling back to run start
    pub fn access(&self, raw: &str) -> i64 {
        self.parse_access(raw).unwrap_or(self.run_started)
    }

    /// Error timestamp, falling back to run start
    pub fn error(&self, raw: &str) -> i64 {
        self.parse_error(raw).unwrap_or(self.run_started)
    }

    pub fn parse_access(&self, raw: &str) -> Option<i64> {
        DateTime::parse_from_str(raw, ACCESS_FORMAT)
            .ok()
            .map(|dt| dt.timestamp())
    }

    pub fn parse_error(&self, raw: &str) -> Option<i64> {
        // sub-second precision is not needed for hourly buckets
        let stripped = self.fraction.replace_all(raw, "");
        let naive = NaiveDateTime::parse_from_str(&stripped, ERROR_FORMAT).ok()?;
        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.timestamp())
    }
}

/// Start of the hour containing `timestamp`
pub fn bucket_start(timestamp: i64) -> i64 {
    timestamp.div_euclid(BUCKET_SECONDS) * BUCKET_SECONDS
}

/// "YYYY-MM-DD HH:MM:SS" in the given offset
pub fn format_timestamp(timestamp: i64, offset: &FixedOffset) -> String {
    format_with(timestamp, offset, "%Y-%m-%d %H:%M:%S")
}

/// "YYYY-MM-DD HH:00:00" in the given offset, used for timeline labels
pub fn format_hour(timestamp: i64, offset: &FixedOffset) -> String {
    format_with(timestamp, offset, "%Y-%m-%d %H:00:00")
}

fn format_with(timestamp: i64, offset: &FixedOffset, pattern: &str) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => dt.with_timezone(offset).format(pattern).to_string(),
        None => timestamp.to_string(),
    }
}
