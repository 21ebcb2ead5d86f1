// CSV export of the raw per-event records
// Headers are written explicitly so an empty access log still yields a header row.

use crate::error::AnalyzerError;
use crate::timestamp::format_timestamp;
use crate::{AccessEvent, ErrorEvent};
use chrono::FixedOffset;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ACCESS_TABLE: &str = "access_stats.csv";
pub const ERROR_TABLE: &str = "error_stats.csv";

/// Longest message kept in the error table, in characters
pub const MESSAGE_LIMIT: usize = 200;

const ACCESS_HEADERS: [&str; 6] = ["Page", "IP", "Timestamp", "Browser", "Status", "Method"];
const ERROR_HEADERS: [&str; 4] = ["Timestamp", "Level", "IP", "Message"];

#[derive(Debug, Serialize)]
struct AccessRow<'a> {
    page: &'a str,
    ip: &'a str,
    timestamp: String,
    browser: &'static str,
    status: &'a str,
    method: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorRow<'a> {
    timestamp: String,
    level: &'a str,
    ip: &'a str,
    message: &'a str,
}

/// Write one row per access event, in encounter order
pub fn export_access(
    output_dir: &Path,
    events: &[AccessEvent],
    offset: &FixedOffset,
) -> Result<PathBuf, AnalyzerError> {
    let path = output_dir.join(ACCESS_TABLE);
    let rows = events.iter().map(|e| AccessRow {
        page: &e.request_path,
        ip: &e.client_address,
        timestamp: format_timestamp(e.timestamp, offset),
        browser: e.browser_category.label(),
        status: &e.status_code,
        method: &e.http_method,
    });

    write_table(&path, &ACCESS_HEADERS, rows)?;
    debug!(path = %path.display(), rows = events.len(), "Wrote access table");
    Ok(path)
}

/// Write one row per error event; nothing is written when there are none
pub fn export_errors(
    output_dir: &Path,
    events: &[ErrorEvent],
    offset: &FixedOffset,
) -> Result<Option<PathBuf>, AnalyzerError> {
    if events.is_empty() {
        return Ok(None);
    }

    let path = output_dir.join(ERROR_TABLE);
    let rows = events.iter().map(|e| ErrorRow {
        timestamp: format_timestamp(e.timestamp, offset),
        level: &e.severity_level,
        ip: &e.client_address,
        message: truncate_chars(&e.message, MESSAGE_LIMIT),
    });

    write_table(&path, &ERROR_HEADERS, rows)?;
    debug!(path = %path.display(), rows = events.len(), "Wrote error table");
    Ok(Some(path))
}

/// First `max` characters of `s`, never splitting a character
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn write_table<I, R>(path: &Path, headers: &[&str], rows: I) -> Result<(), AnalyzerError>
where
    I: IntoIterator<Item = R>,
    R: Serialize,
{
    let table_err = |source: csv::Error| AnalyzerError::Table {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(table_err)?;

    writer.write_record(headers).map_err(table_err)?;
    for row in rows {
        writer.serialize(row).map_err(table_err)?;
    }

    writer.flush().map_err(|source| AnalyzerError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BrowserCategory;
    use chrono::{Offset, Utc};
    use std::fs;

    fn access(path: &str) -> AccessEvent {
        AccessEvent {
            client_address: "10.0.0.1".to_string(),
            timestamp: 1_696_971_336,
            http_method: "POST".to_string(),
            request_path: path.to_string(),
            protocol: "HTTP/1.1".to_string(),
            status_code: "201".to_string(),
            response_size: 5,
            referer: "-".to_string(),
            raw_user_agent: "Bot".to_string(),
            browser_category: BrowserCategory::BotCrawler,
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_access_table_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_access(dir.path(), &[access("/x,y"), access("/z")], &Utc.fix()).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "Page,IP,Timestamp,Browser,Status,Method");
        assert_eq!(lines[1], r#""/x,y",10.0.0.1,2023-10-10 20:55:36,Bot/Crawler,201,POST"#);
        assert_eq!(lines[2], "/z,10.0.0.1,2023-10-10 20:55:36,Bot/Crawler,201,POST");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_access_table_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_access(dir.path(), &[], &Utc.fix()).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), vec!["Page,IP,Timestamp,Browser,Status,Method"]);
    }

    #[test]
    fn test_error_table_skipped_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(export_errors(dir.path(), &[], &Utc.fix()).unwrap().is_none());
        assert!(!dir.path().join(ERROR_TABLE).exists());
    }

    #[test]
    fn test_error_table_truncates_message() {
        let dir = tempfile::tempdir().unwrap();
        let event = ErrorEvent {
            timestamp: 0,
            severity_level: "php:warning".to_string(),
            client_address: "unknown".to_string(),
            message: "x".repeat(250),
        };
        let path = export_errors(dir.path(), &[event], &Utc.fix()).unwrap().unwrap();

        let mut reader = csv::Reader::from_path(path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["Timestamp", "Level", "IP", "Message"]);
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "1970-01-01 00:00:00");
        assert_eq!(&row[1], "php:warning");
        assert_eq!(row[3].len(), MESSAGE_LIMIT);
    }

    #[test]
    fn test_tables_are_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        export_access(dir.path(), &[access("/a"), access("/b")], &Utc.fix()).unwrap();
        let path = export_access(dir.path(), &[access("/c")], &Utc.fix()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap().lines().count(), 2);
    }
}
